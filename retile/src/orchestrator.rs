//! Running a retile request across tile sets and zoom levels.
//!
//! Tile sets are processed one after the other, in request order. Within a
//! tile set, zoom levels are built strictly in increasing order, since each
//! level is read from the output of the one before it. The first error stops
//! the whole run.

use std::ops::Range;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::RetileOptions;
use crate::error::RetileError;
use crate::level::{LevelSummary, ZoomLevelBuilder};
use crate::prune::BlankTilePruner;
use crate::split::TileSplitter;
use crate::storage::{StoreProvider, TileStore};

/// The tile sets and zoom levels to retile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetileRequest {
    tile_sets: Vec<String>,
    start_level: u32,
    end_level: u32,
}

impl RetileRequest {
    /// Create a request building levels `start_level + 1 ..= end_level` of
    /// every tile set.
    pub fn new(tile_sets: Vec<String>, start_level: u32, end_level: u32) -> Self {
        Self {
            tile_sets,
            start_level,
            end_level,
        }
    }

    /// Tile sets in processing order.
    pub fn tile_sets(&self) -> &[String] {
        &self.tile_sets
    }

    /// First source level (inclusive).
    pub fn start_level(&self) -> u32 {
        self.start_level
    }

    /// Source level bound (exclusive).
    pub fn end_level(&self) -> u32 {
        self.end_level
    }

    /// Source levels to split. Empty when `start_level >= end_level`.
    pub fn levels(&self) -> Range<u32> {
        self.start_level..self.end_level
    }

    /// Returns true if no level will be built.
    pub fn is_empty(&self) -> bool {
        self.levels().is_empty()
    }
}

/// What happened to one tile set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileSetSummary {
    /// The tile set path, as given in the request.
    pub tile_set: String,
    /// One entry per level built, in order.
    pub levels: Vec<LevelSummary>,
    /// First level that was not built because the level before it came out
    /// empty.
    pub stopped_before: Option<u32>,
}

impl TileSetSummary {
    fn new(tile_set: &str) -> Self {
        Self {
            tile_set: tile_set.to_string(),
            levels: Vec::new(),
            stopped_before: None,
        }
    }

    pub fn blank_tiles_removed(&self) -> usize {
        self.levels.iter().map(|l| l.blank_tiles_removed).sum()
    }

    pub fn tiles_written(&self) -> usize {
        self.levels.iter().map(|l| l.tiles_written).sum()
    }

    pub fn tiles_skipped(&self) -> usize {
        self.levels.iter().map(|l| l.tiles_skipped).sum()
    }
}

/// What happened in a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetileSummary {
    /// One entry per tile set, in request order.
    pub tile_sets: Vec<TileSetSummary>,
}

impl RetileSummary {
    /// Total number of levels built.
    pub fn levels_built(&self) -> usize {
        self.tile_sets.iter().map(|t| t.levels.len()).sum()
    }

    pub fn blank_tiles_removed(&self) -> usize {
        self.tile_sets.iter().map(|t| t.blank_tiles_removed()).sum()
    }

    pub fn tiles_written(&self) -> usize {
        self.tile_sets.iter().map(|t| t.tiles_written()).sum()
    }

    pub fn tiles_skipped(&self) -> usize {
        self.tile_sets.iter().map(|t| t.tiles_skipped()).sum()
    }
}

/// Retiles the tile sets of a [`StoreProvider`].
pub struct Retiler {
    provider: Arc<dyn StoreProvider>,
    builder: ZoomLevelBuilder,
}

impl Retiler {
    /// Create a retiler configured by `options`.
    ///
    /// # Errors
    ///
    /// Returns [`RetileError::ThreadPool`] if `options.threads` is not 1 and
    /// the worker pool cannot be started.
    pub fn new(
        provider: Arc<dyn StoreProvider>,
        options: &RetileOptions,
    ) -> Result<Self, RetileError> {
        let mut builder = ZoomLevelBuilder::new(
            BlankTilePruner::new(options.blank_tile_size),
            TileSplitter::new(options.filter),
        )
        .with_decode_policy(options.on_decode_error)
        .with_batch_size(options.batch_size);

        if options.threads != 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(options.threads)
                .thread_name(|i| format!("retile-worker-{}", i))
                .build()
                .map_err(|e| RetileError::ThreadPool(e.to_string()))?;
            builder = builder.with_thread_pool(Arc::new(pool));
        }

        Ok(Self::with_builder(provider, builder))
    }

    /// Create a retiler around an existing level builder.
    pub fn with_builder(provider: Arc<dyn StoreProvider>, builder: ZoomLevelBuilder) -> Self {
        Self { provider, builder }
    }

    /// Run `request` to completion.
    ///
    /// # Errors
    ///
    /// Stops at the first tile set that fails. Levels already written stay
    /// on disk; running the same request again regenerates them.
    pub fn run(
        &self,
        request: &RetileRequest,
        cancel: &CancellationToken,
    ) -> Result<RetileSummary, RetileError> {
        let mut summary = RetileSummary::default();

        if request.is_empty() {
            info!(
                start = request.start_level(),
                end = request.end_level(),
                "Start level is not below end level, nothing to do"
            );
            return Ok(summary);
        }

        for tile_set in request.tile_sets() {
            summary
                .tile_sets
                .push(self.run_tile_set(tile_set, request.levels(), cancel)?);
        }

        info!(
            tile_sets = summary.tile_sets.len(),
            levels = summary.levels_built(),
            blank_removed = summary.blank_tiles_removed(),
            written = summary.tiles_written(),
            skipped = summary.tiles_skipped(),
            "Retile complete"
        );
        Ok(summary)
    }

    fn run_tile_set(
        &self,
        tile_set: &str,
        levels: Range<u32>,
        cancel: &CancellationToken,
    ) -> Result<TileSetSummary, RetileError> {
        info!(tile_set, start = levels.start, end = levels.end, "Retiling tile set");

        let store: Arc<dyn TileStore> =
            self.provider
                .open(tile_set)
                .map_err(|source| RetileError::Storage {
                    tile_set: tile_set.to_string(),
                    source,
                })?;

        let mut summary = TileSetSummary::new(tile_set);
        let end = levels.end;
        for level in levels {
            if cancel.is_cancelled() {
                return Err(RetileError::Cancelled {
                    tile_set: tile_set.to_string(),
                    level,
                });
            }

            let built = self
                .builder
                .build(store.as_ref(), level, cancel)
                .map_err(|e| RetileError::from_level(tile_set, level, e))?;
            summary.levels.push(built);

            let next = level + 1;
            if next < end && built.tiles_written == 0 && !store.level_exists(next) {
                info!(
                    tile_set,
                    level = next,
                    "Zoom level {} has no tiles, skipping remaining levels",
                    level
                );
                summary.stopped_before = Some(next);
                break;
            }
        }

        Ok(summary)
    }
}
