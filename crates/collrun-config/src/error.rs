//! Configuration errors.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config not found at {}", .0.display())]
    NotFound(PathBuf),

    #[error("Unable to parse JSON at {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Configuration validation errors:\n{}", .0.join("\n"))]
    Validation(Vec<String>),

    #[error("No collections specified")]
    NoCollections,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
