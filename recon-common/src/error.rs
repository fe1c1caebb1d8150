//! Common error types for the reconciliation workspace

use std::path::PathBuf;
use thiserror::Error;

/// Common result type for recon operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the recon crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// TOML file could not be parsed
    #[error("Parse TOML failed for {}: {source}", .path.display())]
    TomlParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Value could not be serialized to TOML
    #[error("Serialize TOML failed: {0}")]
    TomlWrite(#[from] toml::ser::Error),
}
