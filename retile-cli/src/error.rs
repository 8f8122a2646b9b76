//! CLI error handling with user-friendly messages.

use std::fmt;
use std::process;

use retile::storage::StorageError;
use retile::{ConfigError, RetileError};

/// CLI-specific errors.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration could not be loaded or is invalid
    Config(ConfigError),
    /// Failed to install the Ctrl+C handler
    SignalHandler(String),
    /// The retile run failed
    Retile(RetileError),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        for hint in self.hints() {
            eprintln!("{}", hint);
        }

        process::exit(1)
    }

    fn hints(&self) -> Vec<&'static str> {
        match self {
            CliError::Retile(RetileError::Storage {
                source: StorageError::TileSetNotFound(_),
                ..
            }) => vec![
                "",
                "Retile paths are relative to baseTilePath. Check both in the config file.",
            ],
            CliError::Retile(RetileError::Storage {
                source: StorageError::ListFailed { .. },
                ..
            }) => vec![
                "",
                "The start zoom level directory (Z<n>) must exist in every tile set.",
            ],
            CliError::Retile(RetileError::Split { source, .. }) if source.is_corrupt_source() => {
                vec![
                    "",
                    "Use --skip-corrupt to leave corrupt tiles out instead of stopping.",
                ]
            }
            CliError::Retile(RetileError::Cancelled { .. }) => vec![
                "",
                "Levels written so far are kept. Run the same command again to regenerate them.",
            ],
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::SignalHandler(msg) => write!(f, "Failed to set signal handler: {}", msg),
            CliError::Retile(e) => write!(f, "Retile failed: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::Retile(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e)
    }
}

impl From<RetileError> for CliError {
    fn from(e: RetileError) -> Self {
        match e {
            RetileError::Config(e) => CliError::Config(e),
            other => CliError::Retile(other),
        }
    }
}
