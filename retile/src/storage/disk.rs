//! Tile storage on the local filesystem.
//!
//! Layout: `{base}/{tile_set}/Z{level}/{x}_{y}.png`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::traits::{StorageError, StorageResult, StoreProvider, TileStore};
use crate::tile::{level_dir_name, TileCoord};

/// A tile set stored as a directory tree.
#[derive(Debug, Clone)]
pub struct DiskTileStore {
    root: PathBuf,
}

impl DiskTileStore {
    /// Create a store for the tile set rooted at `root`.
    ///
    /// The root is not checked; see [`DiskStoreProvider::open`] for a
    /// checked constructor.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path of a zoom level directory.
    pub fn level_path(&self, level: u32) -> PathBuf {
        self.root.join(level_dir_name(level))
    }

    /// Path of a tile file.
    pub fn tile_path(&self, level: u32, tile: TileCoord) -> PathBuf {
        self.level_path(level).join(tile.file_name())
    }
}

impl TileStore for DiskTileStore {
    fn location(&self) -> &Path {
        &self.root
    }

    fn level_exists(&self, level: u32) -> bool {
        self.level_path(level).is_dir()
    }

    fn list_entries(&self, level: u32) -> StorageResult<Vec<String>> {
        let path = self.level_path(level);
        let list_failed = |source| StorageError::ListFailed {
            path: path.clone(),
            source,
        };

        let mut names = Vec::new();
        for entry in fs::read_dir(&path).map_err(list_failed)? {
            let entry = entry.map_err(list_failed)?;
            // Sub-directories are never tiles
            if !entry.path().is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        Ok(names)
    }

    fn tile_size(&self, level: u32, tile: TileCoord) -> StorageResult<u64> {
        let path = self.tile_path(level, tile);
        fs::metadata(&path)
            .map(|meta| meta.len())
            .map_err(|source| StorageError::StatFailed { path, source })
    }

    fn read_tile(&self, level: u32, tile: TileCoord) -> StorageResult<Vec<u8>> {
        let path = self.tile_path(level, tile);
        fs::read(&path).map_err(|source| StorageError::ReadFailed { path, source })
    }

    fn write_tile(&self, level: u32, tile: TileCoord, data: &[u8]) -> StorageResult<()> {
        let path = self.tile_path(level, tile);

        // Write atomically via temp file so an interrupted run never leaves a
        // truncated tile behind. The temp name is not a tile name.
        let temp_path = path.with_extension("png.tmp");
        let write = || -> io::Result<()> {
            fs::write(&temp_path, data)?;
            fs::rename(&temp_path, &path)
        };

        write().map_err(|source| {
            let _ = fs::remove_file(&temp_path);
            StorageError::WriteFailed {
                path: path.clone(),
                source,
            }
        })
    }

    fn delete_tile(&self, level: u32, tile: TileCoord) -> StorageResult<()> {
        let path = self.tile_path(level, tile);
        fs::remove_file(&path).map_err(|source| StorageError::DeleteFailed { path, source })
    }

    fn ensure_level(&self, level: u32) -> StorageResult<()> {
        let path = self.level_path(level);
        // create_dir_all succeeds when the directory already exists
        fs::create_dir_all(&path).map_err(|source| StorageError::CreateLevelFailed { path, source })
    }
}

/// Opens tile sets below a base directory.
#[derive(Debug, Clone)]
pub struct DiskStoreProvider {
    base_path: PathBuf,
}

impl DiskStoreProvider {
    /// Create a provider for tile sets below `base_path`.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Returns the base directory.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

impl StoreProvider for DiskStoreProvider {
    fn open(&self, tile_set: &str) -> StorageResult<Arc<dyn TileStore>> {
        let root = self.base_path.join(tile_set);
        if !root.is_dir() {
            return Err(StorageError::TileSetNotFound(root));
        }
        Ok(Arc::new(DiskTileStore::new(root)))
    }
}
