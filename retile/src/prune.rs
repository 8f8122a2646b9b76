//! Removal of blank placeholder tiles.
//!
//! gdal2tiles writes a fully transparent placeholder for every tile position
//! with no data. All of them have the same byte size, so they can be found
//! without decoding. A blank parent always produces four blank children, so
//! pruning each level before it is split keeps blanks from spreading down
//! the pyramid.

use tracing::debug;

use crate::storage::{StorageResult, TileStore};
use crate::tile::BLANK_TILE_SIZE;

/// Result of pruning one zoom level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneSummary {
    /// Number of tiles looked at.
    pub tiles_examined: usize,
    /// Number of blank tiles deleted.
    pub tiles_removed: usize,
    /// Bytes freed by the deletions.
    pub bytes_freed: u64,
}

/// Deletes tiles whose byte size equals the blank placeholder size.
#[derive(Debug, Clone, Copy)]
pub struct BlankTilePruner {
    blank_size: u64,
}

impl Default for BlankTilePruner {
    fn default() -> Self {
        Self::new(BLANK_TILE_SIZE)
    }
}

impl BlankTilePruner {
    /// Create a pruner that treats tiles of exactly `blank_size` bytes as blank.
    pub fn new(blank_size: u64) -> Self {
        Self { blank_size }
    }

    /// Byte size of a blank tile.
    pub fn blank_size(&self) -> u64 {
        self.blank_size
    }

    /// Delete every blank tile of `level`.
    ///
    /// Files that are not tiles are never touched, whatever their size.
    ///
    /// # Errors
    ///
    /// Fails if the level cannot be listed or a tile cannot be inspected or
    /// deleted. Tiles deleted before the failure stay deleted.
    pub fn prune(&self, store: &dyn TileStore, level: u32) -> StorageResult<PruneSummary> {
        let mut summary = PruneSummary::default();

        for tile in store.list_tiles(level)? {
            summary.tiles_examined += 1;

            if store.tile_size(level, tile)? != self.blank_size {
                continue;
            }

            store.delete_tile(level, tile)?;
            summary.tiles_removed += 1;
            summary.bytes_freed += self.blank_size;
            debug!(level, x = tile.x, y = tile.y, "Removed blank tile");
        }

        Ok(summary)
    }
}
