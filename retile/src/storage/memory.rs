//! In-memory tile storage.
//!
//! Holds every level of a tile set in a map guarded by a `parking_lot`
//! lock. Used by tests and dry runs; it behaves like [`super::DiskTileStore`]
//! for missing levels and missing tiles.

use std::collections::{BTreeMap, HashMap};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use super::traits::{StorageError, StorageResult, StoreProvider, TileStore};
use crate::tile::{level_dir_name, TileCoord};

/// Files of one level, keyed by file name.
type LevelFiles = BTreeMap<String, Vec<u8>>;

/// A tile set held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryTileStore {
    location: PathBuf,
    levels: RwLock<BTreeMap<u32, LevelFiles>>,
}

impl MemoryTileStore {
    /// Create an empty store. `location` only appears in messages.
    pub fn new(location: impl Into<PathBuf>) -> Self {
        Self {
            location: location.into(),
            levels: RwLock::new(BTreeMap::new()),
        }
    }

    /// Insert a raw file into a level, creating the level if needed.
    ///
    /// Unlike [`TileStore::write_tile`], the name does not have to be a tile
    /// name; this is how tests seed metadata files.
    pub fn insert_file(&self, level: u32, name: impl Into<String>, data: Vec<u8>) {
        self.levels
            .write()
            .entry(level)
            .or_default()
            .insert(name.into(), data);
    }

    /// Returns the raw contents of a file, if present.
    pub fn file(&self, level: u32, name: &str) -> Option<Vec<u8>> {
        self.levels
            .read()
            .get(&level)
            .and_then(|files| files.get(name).cloned())
    }

    /// Number of files (tiles or not) in a level.
    pub fn file_count(&self, level: u32) -> usize {
        self.levels.read().get(&level).map_or(0, |files| files.len())
    }

    fn level_path(&self, level: u32) -> PathBuf {
        self.location.join(level_dir_name(level))
    }

    fn tile_path(&self, level: u32, tile: TileCoord) -> PathBuf {
        self.level_path(level).join(tile.file_name())
    }

    fn not_found(what: &str) -> io::Error {
        io::Error::new(io::ErrorKind::NotFound, format!("{} does not exist", what))
    }
}

impl TileStore for MemoryTileStore {
    fn location(&self) -> &Path {
        &self.location
    }

    fn level_exists(&self, level: u32) -> bool {
        self.levels.read().contains_key(&level)
    }

    fn list_entries(&self, level: u32) -> StorageResult<Vec<String>> {
        self.levels
            .read()
            .get(&level)
            .map(|files| files.keys().cloned().collect())
            .ok_or_else(|| StorageError::ListFailed {
                path: self.level_path(level),
                source: Self::not_found("level"),
            })
    }

    fn tile_size(&self, level: u32, tile: TileCoord) -> StorageResult<u64> {
        self.levels
            .read()
            .get(&level)
            .and_then(|files| files.get(&tile.file_name()))
            .map(|data| data.len() as u64)
            .ok_or_else(|| StorageError::StatFailed {
                path: self.tile_path(level, tile),
                source: Self::not_found("tile"),
            })
    }

    fn read_tile(&self, level: u32, tile: TileCoord) -> StorageResult<Vec<u8>> {
        self.file(level, &tile.file_name())
            .ok_or_else(|| StorageError::ReadFailed {
                path: self.tile_path(level, tile),
                source: Self::not_found("tile"),
            })
    }

    fn write_tile(&self, level: u32, tile: TileCoord, data: &[u8]) -> StorageResult<()> {
        let mut levels = self.levels.write();
        let files = levels
            .get_mut(&level)
            .ok_or_else(|| StorageError::WriteFailed {
                path: self.tile_path(level, tile),
                source: Self::not_found("level"),
            })?;
        files.insert(tile.file_name(), data.to_vec());
        Ok(())
    }

    fn delete_tile(&self, level: u32, tile: TileCoord) -> StorageResult<()> {
        let removed = self
            .levels
            .write()
            .get_mut(&level)
            .and_then(|files| files.remove(&tile.file_name()));

        match removed {
            Some(_) => Ok(()),
            None => Err(StorageError::DeleteFailed {
                path: self.tile_path(level, tile),
                source: Self::not_found("tile"),
            }),
        }
    }

    fn ensure_level(&self, level: u32) -> StorageResult<()> {
        self.levels.write().entry(level).or_default();
        Ok(())
    }
}

/// Provides in-memory tile sets registered by name.
#[derive(Debug, Default)]
pub struct MemoryStoreProvider {
    tile_sets: Mutex<HashMap<String, Arc<MemoryTileStore>>>,
}

impl MemoryStoreProvider {
    /// Create a provider with no tile sets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an empty tile set and return its store.
    ///
    /// Registering an existing name returns the existing store.
    pub fn add_tile_set(&self, name: &str) -> Arc<MemoryTileStore> {
        let mut tile_sets = self.tile_sets.lock();
        Arc::clone(
            tile_sets
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(MemoryTileStore::new(name))),
        )
    }

    /// Returns the store of a registered tile set.
    pub fn tile_set(&self, name: &str) -> Option<Arc<MemoryTileStore>> {
        self.tile_sets.lock().get(name).cloned()
    }
}

impl StoreProvider for MemoryStoreProvider {
    fn open(&self, tile_set: &str) -> StorageResult<Arc<dyn TileStore>> {
        match self.tile_set(tile_set) {
            Some(store) => Ok(store as Arc<dyn TileStore>),
            None => Err(StorageError::TileSetNotFound(PathBuf::from(tile_set))),
        }
    }
}
