//! Retile - regenerate the next zoom levels of an XYZ tile pyramid
//!
//! Starting from an existing zoom level of a tile set on disk, each tile is
//! cut into four quadrants and every quadrant is scaled up into one tile of
//! the next level. Blank placeholder tiles are pruned before each level is
//! split, so they never propagate.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use retile::storage::DiskStoreProvider;
//! use retile::{RetileConfig, Retiler};
//! use tokio_util::sync::CancellationToken;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RetileConfig::from_file("retile.json".as_ref())?;
//! config.validate()?;
//!
//! let provider = Arc::new(DiskStoreProvider::new(&config.base_tile_path));
//! let retiler = Retiler::new(provider, &config.options)?;
//! let summary = retiler.run(&config.request(), &CancellationToken::new())?;
//! println!("{} tiles written", summary.tiles_written());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod level;
pub mod logging;
pub mod orchestrator;
pub mod prune;
pub mod split;
pub mod storage;
pub mod tile;

pub use config::{ConfigError, RetileConfig, RetileOptions};
pub use error::RetileError;
pub use level::{DecodePolicy, LevelSummary, ZoomLevelBuilder};
pub use orchestrator::{RetileRequest, RetileSummary, Retiler, TileSetSummary};
pub use split::ResampleFilter;

/// Version of the retile library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
