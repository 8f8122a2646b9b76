//! Core traits for tile storage.
//!
//! The directory tree of a tile set is its only index: a tile exists at a
//! level if and only if its file exists in that level's directory. The
//! [`TileStore`] trait wraps every access to that tree so the retiling logic
//! can run against the real filesystem or an in-memory fake.
//!
//! # Design Principles
//!
//! - **One store per tile set**: levels are addressed by number, tiles by coordinate
//! - **Raw bytes**: stores never decode images
//! - **Idempotent level creation**: `ensure_level` may be called from many threads
//! - **Dyn-compatible**: used as `Arc<dyn TileStore>`

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::tile::{parse_tile_name, TileCoord};

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur while accessing a tile set.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The tile set root does not exist.
    #[error("tile set not found: {}", .0.display())]
    TileSetNotFound(PathBuf),

    /// A zoom level directory could not be listed.
    #[error("failed to list {}: {source}", path.display())]
    ListFailed { path: PathBuf, source: io::Error },

    /// A tile's metadata could not be read.
    #[error("failed to stat {}: {source}", path.display())]
    StatFailed { path: PathBuf, source: io::Error },

    /// A tile could not be read.
    #[error("failed to read {}: {source}", path.display())]
    ReadFailed { path: PathBuf, source: io::Error },

    /// A tile could not be written.
    #[error("failed to write {}: {source}", path.display())]
    WriteFailed { path: PathBuf, source: io::Error },

    /// A tile could not be deleted.
    #[error("failed to delete {}: {source}", path.display())]
    DeleteFailed { path: PathBuf, source: io::Error },

    /// A zoom level directory could not be created.
    #[error("failed to create directory {}: {source}", path.display())]
    CreateLevelFailed { path: PathBuf, source: io::Error },
}

impl StorageError {
    /// Returns the path the failed operation was acting on.
    pub fn path(&self) -> &Path {
        match self {
            StorageError::TileSetNotFound(path) => path,
            StorageError::ListFailed { path, .. }
            | StorageError::StatFailed { path, .. }
            | StorageError::ReadFailed { path, .. }
            | StorageError::WriteFailed { path, .. }
            | StorageError::DeleteFailed { path, .. }
            | StorageError::CreateLevelFailed { path, .. } => path,
        }
    }
}

/// Access to the zoom levels of one tile set.
///
/// All implementations must be `Send + Sync`; tiles of one level may be
/// split in parallel against the same store.
pub trait TileStore: Send + Sync {
    /// Location of the tile set, for log output and error messages.
    fn location(&self) -> &Path;

    /// Returns true if the directory of `level` exists.
    fn level_exists(&self, level: u32) -> bool;

    /// List the names of all files in the directory of `level`.
    ///
    /// The result includes files that are not tiles. Use [`list_tiles`]
    /// to get only the tiles.
    ///
    /// # Errors
    ///
    /// Fails if the level directory does not exist or cannot be read.
    ///
    /// [`list_tiles`]: TileStore::list_tiles
    fn list_entries(&self, level: u32) -> StorageResult<Vec<String>>;

    /// List the tiles of `level`, sorted by coordinate.
    ///
    /// Entries that are not tile file names are skipped.
    fn list_tiles(&self, level: u32) -> StorageResult<Vec<TileCoord>> {
        let mut tiles: Vec<TileCoord> = self
            .list_entries(level)?
            .iter()
            .filter_map(|name| parse_tile_name(name).ok())
            .collect();
        tiles.sort_unstable();
        Ok(tiles)
    }

    /// Size of a tile file in bytes.
    fn tile_size(&self, level: u32, tile: TileCoord) -> StorageResult<u64>;

    /// Read the encoded bytes of a tile.
    fn read_tile(&self, level: u32, tile: TileCoord) -> StorageResult<Vec<u8>>;

    /// Write the encoded bytes of a tile, replacing any existing tile.
    ///
    /// The level must already exist (see [`ensure_level`]).
    ///
    /// [`ensure_level`]: TileStore::ensure_level
    fn write_tile(&self, level: u32, tile: TileCoord, data: &[u8]) -> StorageResult<()>;

    /// Delete a tile.
    fn delete_tile(&self, level: u32, tile: TileCoord) -> StorageResult<()>;

    /// Create the directory of `level` if it does not exist yet.
    ///
    /// Calling this concurrently or repeatedly is safe.
    fn ensure_level(&self, level: u32) -> StorageResult<()>;
}

/// Opens the store of a tile set by its path relative to a base location.
pub trait StoreProvider: Send + Sync {
    /// Open the tile set at `tile_set`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::TileSetNotFound`] if the tile set does not exist.
    fn open(&self, tile_set: &str) -> StorageResult<Arc<dyn TileStore>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_display() {
        let err = StorageError::ReadFailed {
            path: PathBuf::from("/tiles/Z5/1_2.png"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "failed to read /tiles/Z5/1_2.png: denied");
    }

    #[test]
    fn test_storage_error_path() {
        let err = StorageError::CreateLevelFailed {
            path: PathBuf::from("/tiles/Z6"),
            source: io::Error::new(io::ErrorKind::Other, "disk full"),
        };
        assert_eq!(err.path(), Path::new("/tiles/Z6"));

        let err = StorageError::TileSetNotFound(PathBuf::from("/missing"));
        assert_eq!(err.path(), Path::new("/missing"));
        assert_eq!(err.to_string(), "tile set not found: /missing");
    }

    #[test]
    fn test_storage_error_source_is_io_error() {
        use std::error::Error;

        let err = StorageError::ListFailed {
            path: PathBuf::from("/tiles/Z5"),
            source: io::Error::new(io::ErrorKind::NotFound, "missing"),
        };
        assert!(err.source().is_some());
    }

    #[test]
    fn test_trait_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn TileStore>();
        assert_send_sync::<dyn StoreProvider>();
    }
}
