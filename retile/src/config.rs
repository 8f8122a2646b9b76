//! Retile configuration.
//!
//! The configuration is a JSON record:
//!
//! ```json
//! {
//!   "baseTilePath": "/data/tiles",
//!   "retilePaths": ["world", "europe"],
//!   "startZoomLevel": 5,
//!   "endZoomLevel": 8,
//!   "options": { "threads": 4, "filter": "triangle" }
//! }
//! ```
//!
//! `options` and every field inside it are optional. Everything is checked
//! by [`RetileConfig::validate`] before any tile is touched.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::level::{DecodePolicy, DEFAULT_BATCH_SIZE};
use crate::orchestrator::RetileRequest;
use crate::split::ResampleFilter;
use crate::tile::BLANK_TILE_SIZE;

/// Errors that can occur while loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The JSON is malformed, has a wrongly typed field, or is missing a
    /// required field.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("baseTilePath must not be empty")]
    EmptyBasePath,

    #[error("retilePaths must contain at least one path")]
    NoRetilePaths,

    /// A retile path is empty or absolute.
    #[error("retilePaths[{index}] must be a non-empty relative path, got '{path}'")]
    InvalidRetilePath { index: usize, path: String },

    #[error("batchSize must be at least 1")]
    InvalidBatchSize,
}

/// Tuning options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct RetileOptions {
    /// Byte size of a blank placeholder tile.
    pub blank_tile_size: u64,

    /// Filter used to scale quadrants up.
    pub filter: ResampleFilter,

    /// Worker threads per zoom level. 1 runs on the calling thread,
    /// 0 uses one thread per CPU.
    pub threads: usize,

    /// Source tiles decoded per batch.
    pub batch_size: usize,

    /// What to do with a tile that cannot be decoded.
    pub on_decode_error: DecodePolicy,
}

impl Default for RetileOptions {
    fn default() -> Self {
        Self {
            blank_tile_size: BLANK_TILE_SIZE,
            filter: ResampleFilter::default(),
            threads: 1,
            batch_size: DEFAULT_BATCH_SIZE,
            on_decode_error: DecodePolicy::default(),
        }
    }
}

/// The configuration record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RetileConfig {
    /// Directory the retile paths are relative to.
    pub base_tile_path: PathBuf,

    /// Tile sets to retile, in order.
    pub retile_paths: Vec<String>,

    /// First level to split (inclusive).
    pub start_zoom_level: u32,

    /// Level to stop at (exclusive): the last level written is this one.
    pub end_zoom_level: u32,

    #[serde(default)]
    pub options: RetileOptions,
}

impl RetileConfig {
    /// Load a configuration from a JSON file.
    ///
    /// The result is not validated; call [`RetileConfig::validate`] after
    /// applying any overrides.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents)
    }

    /// Parse a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check the configuration.
    ///
    /// `startZoomLevel >= endZoomLevel` is valid; it means there is nothing
    /// to do.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_tile_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyBasePath);
        }
        if self.retile_paths.is_empty() {
            return Err(ConfigError::NoRetilePaths);
        }
        for (index, path) in self.retile_paths.iter().enumerate() {
            if path.is_empty() || Path::new(path).is_absolute() {
                return Err(ConfigError::InvalidRetilePath {
                    index,
                    path: path.clone(),
                });
            }
        }
        if self.options.batch_size == 0 {
            return Err(ConfigError::InvalidBatchSize);
        }
        Ok(())
    }

    /// Returns the request this configuration describes.
    pub fn request(&self) -> RetileRequest {
        RetileRequest::new(
            self.retile_paths.clone(),
            self.start_zoom_level,
            self.end_zoom_level,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "baseTilePath": "/data/tiles",
        "retilePaths": ["world", "europe/north"],
        "startZoomLevel": 5,
        "endZoomLevel": 7
    }"#;

    #[test]
    fn test_parse_minimal() {
        let config = RetileConfig::from_json(MINIMAL).unwrap();

        assert_eq!(config.base_tile_path, PathBuf::from("/data/tiles"));
        assert_eq!(config.retile_paths, vec!["world", "europe/north"]);
        assert_eq!(config.start_zoom_level, 5);
        assert_eq!(config.end_zoom_level, 7);
        assert_eq!(config.options, RetileOptions::default());
        config.validate().unwrap();
    }

    #[test]
    fn test_default_options() {
        let options = RetileOptions::default();
        assert_eq!(options.blank_tile_size, 334);
        assert_eq!(options.filter, ResampleFilter::Nearest);
        assert_eq!(options.threads, 1);
        assert_eq!(options.batch_size, 64);
        assert_eq!(options.on_decode_error, DecodePolicy::Abort);
    }

    #[test]
    fn test_parse_options() {
        let config = RetileConfig::from_json(
            r#"{
                "baseTilePath": "t",
                "retilePaths": ["a"],
                "startZoomLevel": 0,
                "endZoomLevel": 3,
                "options": {
                    "threads": 0,
                    "filter": "lanczos3",
                    "onDecodeError": "skip"
                }
            }"#,
        )
        .unwrap();

        assert_eq!(config.options.threads, 0);
        assert_eq!(config.options.filter, ResampleFilter::Lanczos3);
        assert_eq!(config.options.on_decode_error, DecodePolicy::Skip);
        assert_eq!(config.options.batch_size, 64);
    }

    #[test]
    fn test_missing_field_is_a_parse_error() {
        let result = RetileConfig::from_json(
            r#"{"baseTilePath": "t", "retilePaths": ["a"], "startZoomLevel": 1}"#,
        );
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_negative_level_is_a_parse_error() {
        let result = RetileConfig::from_json(
            r#"{"baseTilePath": "t", "retilePaths": ["a"], "startZoomLevel": -1, "endZoomLevel": 2}"#,
        );
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let result = RetileConfig::from_json(
            r#"{"baseTilePath": "t", "retilePaths": ["a"], "startZoomLevel": 1, "endZoomLevel": 2, "zoom": 3}"#,
        );
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_validate_rejects_empty_paths() {
        let mut config = RetileConfig::from_json(MINIMAL).unwrap();
        config.retile_paths.clear();
        assert!(matches!(config.validate(), Err(ConfigError::NoRetilePaths)));

        config.retile_paths = vec!["ok".into(), "".into()];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRetilePath { index: 1, .. })
        ));

        config.retile_paths = vec!["ok".into()];
        config.base_tile_path = PathBuf::new();
        assert!(matches!(config.validate(), Err(ConfigError::EmptyBasePath)));
    }

    #[test]
    fn test_validate_rejects_absolute_retile_path() {
        let mut config = RetileConfig::from_json(MINIMAL).unwrap();
        config.retile_paths = vec!["/abs".into()];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRetilePath { index: 0, .. })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_batch_size() {
        let mut config = RetileConfig::from_json(MINIMAL).unwrap();
        config.options.batch_size = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidBatchSize)
        ));
    }

    #[test]
    fn test_start_not_below_end_is_valid() {
        let mut config = RetileConfig::from_json(MINIMAL).unwrap();
        config.start_zoom_level = 9;
        config.end_zoom_level = 9;
        config.validate().unwrap();
        assert!(config.request().is_empty());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("retile.json");
        fs::write(&path, MINIMAL).unwrap();

        let config = RetileConfig::from_file(&path).unwrap();
        assert_eq!(config.request().tile_sets(), ["world", "europe/north"]);
    }

    #[test]
    fn test_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = RetileConfig::from_file(&dir.path().join("absent.json"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
