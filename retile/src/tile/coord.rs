//! Tile coordinates within a zoom level.

use std::fmt;

use super::TILE_EXTENSION;

/// Position of a tile within one zoom level.
///
/// The coordinates are the two integers of the tile file name `{x}_{y}.png`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    /// First component of the file name.
    pub x: u32,
    /// Second component of the file name.
    pub y: u32,
}

impl TileCoord {
    /// Create a new tile coordinate.
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Returns the file name of this tile (`{x}_{y}.png`).
    ///
    /// # Example
    ///
    /// ```
    /// use retile::tile::TileCoord;
    ///
    /// assert_eq!(TileCoord::new(18, 10).file_name(), "18_10.png");
    /// ```
    pub fn file_name(&self) -> String {
        format!("{}_{}.{}", self.x, self.y, TILE_EXTENSION)
    }

    /// Returns the coordinate one zoom level up that this tile was split from,
    /// in the next-level coordinate frame (`x / 2`, `y / 2`).
    ///
    /// Because splitting swaps the axes (see [`super::Quadrant::child_of`]),
    /// the parent of a child produced from `(x, y)` is `(y, x)`.
    pub fn parent(&self) -> TileCoord {
        TileCoord {
            x: self.x / 2,
            y: self.y / 2,
        }
    }

    /// Returns this coordinate with both components exchanged.
    pub fn transposed(&self) -> TileCoord {
        TileCoord {
            x: self.y,
            y: self.x,
        }
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name() {
        assert_eq!(TileCoord::new(5, 9).file_name(), "5_9.png");
        assert_eq!(TileCoord::new(0, 0).file_name(), "0_0.png");
    }

    #[test]
    fn test_display() {
        assert_eq!(TileCoord::new(197, 81).to_string(), "197_81");
    }

    #[test]
    fn test_parent_halves_components() {
        assert_eq!(TileCoord::new(18, 10).parent(), TileCoord::new(9, 5));
        assert_eq!(TileCoord::new(19, 11).parent(), TileCoord::new(9, 5));
    }

    #[test]
    fn test_transposed() {
        assert_eq!(TileCoord::new(5, 9).transposed(), TileCoord::new(9, 5));
    }

    #[test]
    fn test_ordering_is_x_then_y() {
        let mut coords = vec![
            TileCoord::new(2, 0),
            TileCoord::new(1, 5),
            TileCoord::new(1, 2),
        ];
        coords.sort();
        assert_eq!(
            coords,
            vec![
                TileCoord::new(1, 2),
                TileCoord::new(1, 5),
                TileCoord::new(2, 0)
            ]
        );
    }
}
