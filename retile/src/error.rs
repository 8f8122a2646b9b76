//! Top-level error type returned by [`crate::Retiler`].

use thiserror::Error;

use crate::config::ConfigError;
use crate::level::LevelError;
use crate::split::SplitError;
use crate::storage::StorageError;
use crate::tile::TileCoord;

/// Errors that stop a retile run.
#[derive(Debug, Error)]
pub enum RetileError {
    /// The configuration was rejected before anything was touched.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// A filesystem operation failed.
    #[error("tile set '{tile_set}': {source}")]
    Storage {
        tile_set: String,
        #[source]
        source: StorageError,
    },

    /// A source tile could not be split.
    #[error("tile set '{tile_set}': failed to split tile {tile} of zoom level {level}: {source}")]
    Split {
        tile_set: String,
        level: u32,
        tile: TileCoord,
        #[source]
        source: SplitError,
    },

    /// The run was cancelled.
    #[error("tile set '{tile_set}': cancelled at zoom level {level}")]
    Cancelled { tile_set: String, level: u32 },

    /// The worker thread pool could not be created.
    #[error("failed to create thread pool: {0}")]
    ThreadPool(String),
}

impl RetileError {
    /// Attach the tile set and level to an error from the level builder.
    pub(crate) fn from_level(tile_set: &str, level: u32, err: LevelError) -> Self {
        let tile_set = tile_set.to_string();
        match err {
            LevelError::Storage(source) => RetileError::Storage { tile_set, source },
            LevelError::Split { tile, source } => RetileError::Split {
                tile_set,
                level,
                tile,
                source,
            },
            LevelError::Cancelled { level } => RetileError::Cancelled { tile_set, level },
        }
    }

    /// Returns true if the run stopped because it was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RetileError::Cancelled { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::PathBuf;

    #[test]
    fn test_storage_error_names_tile_set_and_path() {
        let err = RetileError::from_level(
            "sets/alpha",
            5,
            LevelError::Storage(StorageError::ListFailed {
                path: PathBuf::from("/tiles/sets/alpha/Z5"),
                source: io::Error::new(io::ErrorKind::NotFound, "missing"),
            }),
        );

        let message = err.to_string();
        assert!(message.contains("sets/alpha"));
        assert!(message.contains("/tiles/sets/alpha/Z5"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_split_error_keeps_level_and_tile() {
        let err = RetileError::from_level(
            "a",
            3,
            LevelError::Split {
                tile: TileCoord::new(5, 9),
                source: SplitError::InvalidDimensions {
                    width: 1,
                    height: 1,
                },
            },
        );

        assert!(matches!(
            err,
            RetileError::Split {
                level: 3,
                tile: TileCoord { x: 5, y: 9 },
                ..
            }
        ));
        assert!(err.to_string().contains("5_9"));
    }

    #[test]
    fn test_cancelled() {
        let err = RetileError::from_level("a", 7, LevelError::Cancelled { level: 7 });
        assert!(err.is_cancelled());
        assert_eq!(err.to_string(), "tile set 'a': cancelled at zoom level 7");
        assert!(!RetileError::ThreadPool("x".into()).is_cancelled());
    }
}
