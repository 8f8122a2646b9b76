//! Building one zoom level from the level above it.
//!
//! For level `n` the builder:
//!
//! 1. prunes the blank tiles of `n`,
//! 2. lists the tiles left in `n`,
//! 3. splits each of them into four tiles of `n + 1`.
//!
//! Tiles are processed in batches so only `batch_size` decoded images are
//! alive at once. With a thread pool, the tiles of a batch are split in
//! parallel; children of different source tiles never share a coordinate,
//! so parallel writes never collide. The target level is created on the
//! first write, behind a mutex.
//!
//! The first error stops the level: no tile is started after it. The
//! cancellation token is checked before each batch and before each tile.

use std::sync::Arc;

use parking_lot::Mutex;
use rayon::prelude::*;
use rayon::ThreadPool;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::prune::BlankTilePruner;
use crate::split::{SplitError, TileSplitter};
use crate::storage::{StorageError, TileStore};
use crate::tile::TileCoord;

/// Default number of source tiles decoded per batch.
pub const DEFAULT_BATCH_SIZE: usize = 64;

/// What to do with a tile that cannot be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DecodePolicy {
    /// Fail the level.
    #[default]
    Abort,
    /// Log a warning and leave the tile's children out.
    Skip,
}

/// Errors that can occur while building a zoom level.
#[derive(Debug, Error)]
pub enum LevelError {
    /// Listing, reading, writing or deleting failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A source tile could not be split.
    #[error("failed to split tile {tile}: {source}")]
    Split {
        tile: TileCoord,
        #[source]
        source: SplitError,
    },

    /// The run was cancelled before the level was complete.
    #[error("cancelled while building zoom level {level}")]
    Cancelled { level: u32 },
}

/// Result of building one zoom level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LevelSummary {
    /// Source level.
    pub level: u32,
    /// Level that was written.
    pub target_level: u32,
    /// Blank tiles deleted from the source level.
    pub blank_tiles_removed: usize,
    /// Tiles left in the source level after pruning.
    pub source_tiles: usize,
    /// Tiles written to the target level.
    pub tiles_written: usize,
    /// Source tiles skipped because they could not be decoded.
    pub tiles_skipped: usize,
}

/// Outcome of one source tile.
enum TileOutcome {
    Written(usize),
    Skipped,
}

/// Builds zoom level `n + 1` from zoom level `n`.
#[derive(Clone)]
pub struct ZoomLevelBuilder {
    pruner: BlankTilePruner,
    splitter: TileSplitter,
    decode_policy: DecodePolicy,
    batch_size: usize,
    pool: Option<Arc<ThreadPool>>,
}

impl Default for ZoomLevelBuilder {
    fn default() -> Self {
        Self::new(BlankTilePruner::default(), TileSplitter::default())
    }
}

impl ZoomLevelBuilder {
    /// Create a sequential builder.
    pub fn new(pruner: BlankTilePruner, splitter: TileSplitter) -> Self {
        Self {
            pruner,
            splitter,
            decode_policy: DecodePolicy::default(),
            batch_size: DEFAULT_BATCH_SIZE,
            pool: None,
        }
    }

    /// Set the decode error policy.
    pub fn with_decode_policy(mut self, policy: DecodePolicy) -> Self {
        self.decode_policy = policy;
        self
    }

    /// Set how many source tiles are decoded per batch (minimum 1).
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Split the tiles of each batch in parallel on `pool`.
    pub fn with_thread_pool(mut self, pool: Arc<ThreadPool>) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Returns the decode error policy.
    pub fn decode_policy(&self) -> DecodePolicy {
        self.decode_policy
    }

    /// Returns the batch size.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Build `level + 1` from `level`.
    ///
    /// # Errors
    ///
    /// Fails on the first storage error, on the first split error (unless
    /// the tile is corrupt and the policy is [`DecodePolicy::Skip`]), or
    /// with [`LevelError::Cancelled`] if `cancel` fires before a tile is started.
    /// Tiles already written stay in place.
    pub fn build(
        &self,
        store: &dyn TileStore,
        level: u32,
        cancel: &CancellationToken,
    ) -> Result<LevelSummary, LevelError> {
        let target_level = level + 1;
        info!(
            tile_set = %store.location().display(),
            level,
            target_level,
            "Building zoom level"
        );

        let pruned = self.pruner.prune(store, level)?;
        if pruned.tiles_removed > 0 {
            info!(
                level,
                removed = pruned.tiles_removed,
                bytes = pruned.bytes_freed,
                "Removed blank tiles"
            );
        }

        let tiles = store.list_tiles(level)?;
        let mut summary = LevelSummary {
            level,
            target_level,
            blank_tiles_removed: pruned.tiles_removed,
            source_tiles: tiles.len(),
            ..LevelSummary::default()
        };

        let level_ready = Mutex::new(false);
        for batch in tiles.chunks(self.batch_size) {
            if cancel.is_cancelled() {
                return Err(LevelError::Cancelled { level });
            }

            for outcome in self.split_batch(store, level, batch, &level_ready, cancel)? {
                match outcome {
                    TileOutcome::Written(count) => summary.tiles_written += count,
                    TileOutcome::Skipped => summary.tiles_skipped += 1,
                }
            }
        }

        info!(
            level,
            target_level,
            source_tiles = summary.source_tiles,
            written = summary.tiles_written,
            skipped = summary.tiles_skipped,
            "Zoom level complete"
        );
        Ok(summary)
    }

    /// Split one batch, stopping at the first error.
    ///
    /// On a pool, tiles already in flight when another tile fails still
    /// finish, but no new tile is started.
    fn split_batch(
        &self,
        store: &dyn TileStore,
        level: u32,
        batch: &[TileCoord],
        level_ready: &Mutex<bool>,
        cancel: &CancellationToken,
    ) -> Result<Vec<TileOutcome>, LevelError> {
        let process =
            |tile: &TileCoord| self.process_tile(store, level, *tile, level_ready, cancel);

        match &self.pool {
            Some(pool) => pool.install(|| batch.par_iter().map(process).collect()),
            None => batch.iter().map(process).collect(),
        }
    }

    fn process_tile(
        &self,
        store: &dyn TileStore,
        level: u32,
        tile: TileCoord,
        level_ready: &Mutex<bool>,
        cancel: &CancellationToken,
    ) -> Result<TileOutcome, LevelError> {
        if cancel.is_cancelled() {
            return Err(LevelError::Cancelled { level });
        }

        let target_level = level + 1;
        debug!(target_zoom = target_level, x = tile.x, y = tile.y, "Splitting tile");

        let data = store.read_tile(level, tile)?;
        let children = match self.splitter.split(tile, &data) {
            Ok(children) => children,
            Err(e) if e.is_corrupt_source() && self.decode_policy == DecodePolicy::Skip => {
                warn!(level, x = tile.x, y = tile.y, error = %e, "Skipping corrupt tile");
                return Ok(TileOutcome::Skipped);
            }
            Err(source) => return Err(LevelError::Split { tile, source }),
        };
        drop(data);

        ensure_level_once(store, target_level, level_ready)?;
        for child in &children {
            store.write_tile(target_level, child.coord, &child.data)?;
            debug!(
                target_zoom = target_level,
                x = child.coord.x,
                y = child.coord.y,
                quadrant = child.quadrant.label(),
                "Wrote tile"
            );
        }
        Ok(TileOutcome::Written(children.len()))
    }
}

/// Create `level` the first time any tile needs it.
fn ensure_level_once(
    store: &dyn TileStore,
    level: u32,
    ready: &Mutex<bool>,
) -> Result<(), StorageError> {
    let mut ready = ready.lock();
    if !*ready {
        store.ensure_level(level)?;
        *ready = true;
    }
    Ok(())
}
