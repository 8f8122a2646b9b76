//! Tile set storage.
//!
//! ```text
//! ┌─────────────────────┐
//! │  ZoomLevelBuilder   │
//! │  BlankTilePruner    │
//! │                     │
//! │   &dyn TileStore    │
//! └──────────┬──────────┘
//!            │
//!       ┌────┴──────────┐
//!       ▼               ▼
//! ┌──────────────┐ ┌────────────────┐
//! │DiskTileStore │ │MemoryTileStore │
//! └──────────────┘ └────────────────┘
//! ```
//!
//! A [`StoreProvider`] opens the store of each tile set named in a retile
//! request.

mod disk;
mod memory;
mod traits;

pub use disk::{DiskStoreProvider, DiskTileStore};
pub use memory::{MemoryStoreProvider, MemoryTileStore};
pub use traits::{StorageError, StorageResult, StoreProvider, TileStore};
