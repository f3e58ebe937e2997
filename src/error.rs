//! Error types for the periodic sync system.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reconciling the target tree against the source tree
#[derive(Debug, Error)]
pub enum SyncError {
    /// A root could not be listed. Abandons the whole pass.
    #[error("Failed to scan {root:?}: {source}")]
    Scan {
        root: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A single create/delete/copy/hash operation failed.
    #[error("{op} failed for {path:?}: {source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "Hash mismatch for {path:?} after {attempts} overwrite attempt(s): source {source_hash}, target {target_hash}"
    )]
    VerificationMismatch {
        path: PathBuf,
        attempts: u32,
        source_hash: String,
        target_hash: String,
    },
}

impl SyncError {
    pub(crate) fn io(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SyncError::Io {
            op,
            path: path.into(),
            source,
        }
    }
}

/// Setup errors: configuration loading, validation and logging initialization
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}
