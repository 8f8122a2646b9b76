//! Tile addressing for XYZ tile pyramids.
//!
//! A tile set is a directory tree with one `Z{n}` directory per zoom level.
//! Each zoom level directory holds one PNG file per tile, named `{x}_{y}.png`:
//!
//! ```text
//! tiles/
//! ├── Z5/
//! │   ├── 5_9.png
//! │   └── 5_10.png
//! └── Z6/
//!     ├── 18_10.png
//!     └── ...
//! ```
//!
//! Retiling splits every tile of level `n` into four quadrants, each of which
//! becomes one tile of level `n + 1`. See [`Quadrant`] for the coordinate
//! mapping.

mod coord;
mod name;
mod quadrant;

pub use coord::TileCoord;
pub use name::{is_tile_name, parse_tile_name, TileNameError};
pub use quadrant::Quadrant;

/// Width and height of every tile, in pixels.
pub const TILE_SIZE: u32 = 256;

/// Width and height of one quadrant of a tile, in pixels.
pub const QUADRANT_SIZE: u32 = TILE_SIZE / 2;

/// File extension of tile images.
pub const TILE_EXTENSION: &str = "png";

/// Byte size of the fully transparent placeholder tiles written by gdal2tiles.
pub const BLANK_TILE_SIZE: u64 = 334;

/// Returns the directory name of a zoom level (`Z{level}`).
///
/// # Example
///
/// ```
/// use retile::tile::level_dir_name;
///
/// assert_eq!(level_dir_name(11), "Z11");
/// ```
pub fn level_dir_name(level: u32) -> String {
    format!("Z{}", level)
}
