//! Configuration System
//!
//! Layered configuration for the sync daemon: built-in defaults, an optional
//! TOML file, `PERIODIC_SYNC_*` environment variables, then CLI flags.
//! [`SyncConfig::resolve`] validates the merged result and canonicalizes the
//! two roots before the scheduler starts.

use crate::error::ConfigError;
use crate::logging::LoggingConfig;
use crate::sync::ReconcileOptions;
use crate::tree::hasher::DEFAULT_CHUNK_SIZE;
use crate::tree::path::{canonicalize_root, overlaps};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

mod facade;
mod merge_policy;
mod sources;

pub use facade::{ConfigLoader, Overrides};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Directory whose content is mirrored
    #[serde(default)]
    pub source: PathBuf,

    /// Directory made identical to `source`. Its extra content is deleted.
    #[serde(default)]
    pub target: PathBuf,

    /// Seconds between the starts of two consecutive passes
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Overwrite+rehash attempts per file before reporting a mismatch
    #[serde(default = "default_verify_attempts")]
    pub verify_attempts: u32,

    /// Read size for content hashing
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    #[serde(default)]
    pub logging: LoggingConfig,
}

pub(crate) fn default_interval_secs() -> u64 {
    10
}

pub(crate) fn default_verify_attempts() -> u32 {
    crate::sync::DEFAULT_VERIFY_ATTEMPTS
}

pub(crate) fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::new(),
            target: PathBuf::new(),
            interval_secs: default_interval_secs(),
            verify_attempts: default_verify_attempts(),
            chunk_size: default_chunk_size(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Source(String),
    Target(String),
    Roots(String),
    Interval(String),
    Tuning(String),
    LogFile(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Source(msg) => write!(f, "Input path: {}", msg),
            ValidationError::Target(msg) => write!(f, "Output path: {}", msg),
            ValidationError::Roots(msg) => write!(f, "Paths: {}", msg),
            ValidationError::Interval(msg) => write!(f, "Time interval: {}", msg),
            ValidationError::Tuning(msg) => write!(f, "Tuning: {}", msg),
            ValidationError::LogFile(msg) => write!(f, "Log file: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl SyncConfig {
    /// Validate the configuration against the filesystem
    ///
    /// Reports every problem found rather than stopping at the first.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        let source = check_root(&self.source, "--input-path").map_err(ValidationError::Source);
        let target = check_root(&self.target, "--output-path").map_err(ValidationError::Target);

        match (&source, &target) {
            (Ok(source), Ok(target)) if source == target => {
                errors.push(ValidationError::Roots(format!(
                    "input and output are the same directory '{}'",
                    source.display()
                )));
            }
            (Ok(source), Ok(target)) if overlaps(source, target) => {
                errors.push(ValidationError::Roots(format!(
                    "'{}' and '{}' are nested inside one another",
                    source.display(),
                    target.display()
                )));
            }
            _ => {}
        }
        if let Err(e) = source {
            errors.push(e);
        }
        if let Err(e) = target {
            errors.push(e);
        }

        if self.interval_secs < 1 {
            errors.push(ValidationError::Interval(
                "must be at least 1 second".to_string(),
            ));
        }
        if self.verify_attempts < 1 {
            errors.push(ValidationError::Tuning(
                "verify_attempts must be at least 1".to_string(),
            ));
        }
        if self.chunk_size < 1 {
            errors.push(ValidationError::Tuning(
                "chunk_size must be at least 1 byte".to_string(),
            ));
        }

        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::LogFile(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate and return the configuration with canonical roots
    pub fn resolve(mut self) -> Result<Self, ConfigError> {
        self.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ConfigError::Invalid(error_msgs.join("\n"))
        })?;

        self.source = canonicalize_root(&self.source)
            .map_err(|e| ConfigError::Invalid(format!("Input path: {}", e)))?;
        self.target = canonicalize_root(&self.target)
            .map_err(|e| ConfigError::Invalid(format!("Output path: {}", e)))?;
        Ok(self)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn reconcile_options(&self) -> ReconcileOptions {
        ReconcileOptions {
            chunk_size: self.chunk_size,
            verify_attempts: self.verify_attempts,
        }
    }
}

fn check_root(path: &std::path::Path, flag: &str) -> Result<PathBuf, String> {
    if path.as_os_str().is_empty() {
        return Err(format!("required, pass {} or set it in the config file", flag));
    }
    if !path.is_dir() {
        return Err(format!(
            "'{}' does not exist or is not a directory",
            path.display()
        ));
    }
    canonicalize_root(path).map_err(|e| format!("'{}': {}", path.display(), e))
}
