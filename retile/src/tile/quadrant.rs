//! Quadrants of a parent tile and their child coordinates.
//!
//! Zooming in on tile `(x, y)` yields four tiles in the next level. The
//! tiling scheme stores the axes swapped between the file name of the parent
//! and the children, so the children of `(x, y)` are:
//!
//! ```text
//!  2y,   2x    |  2y+1, 2x
//! ---------------------------
//!  2y,   2x+1  |  2y+1, 2x+1
//! ```
//!
//! For example `(81, 197)` splits into `394_162`, `395_162`, `394_163` and
//! `395_163`.

use super::{TileCoord, QUADRANT_SIZE};

/// One quarter of a parent tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quadrant {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Quadrant {
    /// All four quadrants, row by row.
    pub const ALL: [Quadrant; 4] = [
        Quadrant::TopLeft,
        Quadrant::TopRight,
        Quadrant::BottomLeft,
        Quadrant::BottomRight,
    ];

    /// Returns true for the two right-hand quadrants.
    pub fn is_right(self) -> bool {
        matches!(self, Quadrant::TopRight | Quadrant::BottomRight)
    }

    /// Returns true for the two lower quadrants.
    pub fn is_bottom(self) -> bool {
        matches!(self, Quadrant::BottomLeft | Quadrant::BottomRight)
    }

    /// Pixel offset `(dx, dy)` of this quadrant's sub-rectangle within the parent.
    pub fn offset(self) -> (u32, u32) {
        let dx = if self.is_right() { QUADRANT_SIZE } else { 0 };
        let dy = if self.is_bottom() { QUADRANT_SIZE } else { 0 };
        (dx, dy)
    }

    /// Bits added to the doubled parent coordinates: `(dest_x_bit, dest_y_bit)`.
    pub fn coordinate_delta(self) -> (u32, u32) {
        (u32::from(self.is_right()), u32::from(self.is_bottom()))
    }

    /// Coordinates of the child tile this quadrant of `parent` becomes.
    ///
    /// `dest_x = 2 * parent.y + right`, `dest_y = 2 * parent.x + bottom`.
    ///
    /// Returns `None` if the child coordinate does not fit in a `u32`.
    ///
    /// # Example
    ///
    /// ```
    /// use retile::tile::{Quadrant, TileCoord};
    ///
    /// let parent = TileCoord::new(5, 9);
    /// assert_eq!(Quadrant::TopLeft.child_of(parent), Some(TileCoord::new(18, 10)));
    /// assert_eq!(Quadrant::BottomRight.child_of(parent), Some(TileCoord::new(19, 11)));
    /// ```
    pub fn child_of(self, parent: TileCoord) -> Option<TileCoord> {
        let (dx, dy) = self.coordinate_delta();
        let x = parent.y.checked_mul(2)?.checked_add(dx)?;
        let y = parent.x.checked_mul(2)?.checked_add(dy)?;
        Some(TileCoord::new(x, y))
    }

    /// Short label used in log output.
    pub fn label(self) -> &'static str {
        match self {
            Quadrant::TopLeft => "top-left",
            Quadrant::TopRight => "top-right",
            Quadrant::BottomLeft => "bottom-left",
            Quadrant::BottomRight => "bottom-right",
        }
    }
}
