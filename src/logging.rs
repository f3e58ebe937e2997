//! Logging System
//!
//! Structured logging through the `tracing` crate. Every pass decision is
//! emitted as an event; this module routes events to the console, to a log
//! file, or to both, with RFC 3339 timestamps and a level prefix.
//!
//! The subscriber is installed for the lifetime of the returned [`LogGuard`]
//! rather than process-wide, and the log file is flushed when the guard drops.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::layer::Layered;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

/// Environment variable holding a full filter directive, e.g. `periodic_sync=debug`
pub const LOG_FILTER_ENV: &str = "PERIODIC_SYNC_LOG";

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error, off
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: json, text (default: text)
    #[serde(default = "default_format")]
    pub format: String,

    /// Output destination: stdout, file, both (default: both)
    #[serde(default = "default_output")]
    pub output: String,

    /// Log file path (if output includes the file)
    #[serde(default = "default_log_file")]
    pub file: PathBuf,

    /// Keep existing log content instead of truncating at startup
    #[serde(default)]
    pub append: bool,

    /// Enable colored console output (text format only)
    #[serde(default = "default_true")]
    pub color: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "text".to_string()
}

fn default_output() -> String {
    "both".to_string()
}

fn default_log_file() -> PathBuf {
    PathBuf::from("periodic-sync.log")
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_format(),
            output: default_output(),
            file: default_log_file(),
            append: false,
            color: default_true(),
        }
    }
}

impl LoggingConfig {
    /// Check format, output and, when the file is used, that its directory exists
    pub fn validate(&self) -> Result<(), String> {
        parse_format(&self.format)?;
        let output = parse_output_destinations(&self.output)?;

        if output.file {
            if self.file.as_os_str().is_empty() {
                return Err("log file path cannot be empty".to_string());
            }
            let parent = match self.file.parent() {
                Some(p) if !p.as_os_str().is_empty() => p,
                _ => Path::new("."),
            };
            if !parent.is_dir() {
                return Err(format!(
                    "invalid path for the log file '{}', directory '{}' does not exist",
                    self.file.display(),
                    parent.display()
                ));
            }
        }
        Ok(())
    }
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Text,
    Json,
}

/// Output destinations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OutputDestinations {
    stdout: bool,
    file: bool,
}

fn parse_format(format: &str) -> Result<Format, String> {
    match format {
        "text" => Ok(Format::Text),
        "json" => Ok(Format::Json),
        _ => Err(format!(
            "Invalid log format: {} (must be 'json' or 'text')",
            format
        )),
    }
}

fn parse_output_destinations(output: &str) -> Result<OutputDestinations, String> {
    match output {
        "stdout" => Ok(OutputDestinations {
            stdout: true,
            file: false,
        }),
        "file" => Ok(OutputDestinations {
            stdout: false,
            file: true,
        }),
        "both" => Ok(OutputDestinations {
            stdout: true,
            file: true,
        }),
        _ => Err(format!(
            "Invalid log output: {} (must be 'stdout', 'file', or 'both')",
            output
        )),
    }
}

/// Keeps the logging subscriber installed and the log file open
///
/// Dropping it uninstalls the subscriber and flushes the file.
pub struct LogGuard {
    _default: DefaultGuard,
    file: Option<Arc<Mutex<File>>>,
}

impl LogGuard {
    pub fn flush(&self) {
        if let Some(file) = &self.file {
            if let Ok(mut file) = file.lock() {
                let _ = file.flush();
                let _ = file.sync_all();
            }
        }
    }
}

impl Drop for LogGuard {
    fn drop(&mut self) {
        self.flush();
    }
}

type Base = Layered<EnvFilter, Registry>;

/// Shared file handle usable as a `MakeWriter`
#[derive(Clone)]
struct SharedFile(Arc<Mutex<File>>);

impl Write for SharedFile {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self.0.lock() {
            Ok(mut file) => file.write(buf),
            Err(poisoned) => poisoned.into_inner().write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self.0.lock() {
            Ok(mut file) => file.flush(),
            Err(poisoned) => poisoned.into_inner().flush(),
        }
    }
}

/// Initialize the logging system
///
/// Priority order (highest to lowest) for the filter:
/// 1. `PERIODIC_SYNC_LOG` environment variable
/// 2. `config.level`
pub fn init_logging(config: &LoggingConfig) -> Result<LogGuard, ConfigError> {
    let filter = build_env_filter(config)?;
    let format = parse_format(&config.format).map_err(ConfigError::Logging)?;
    let output = parse_output_destinations(&config.output).map_err(ConfigError::Logging)?;

    let mut layers: Vec<Box<dyn Layer<Base> + Send + Sync>> = Vec::new();
    let mut file_handle = None;

    if output.stdout {
        let layer: Box<dyn Layer<Base> + Send + Sync> = match format {
            Format::Json => fmt::layer()
                .json()
                .with_target(true)
                .with_timer(ChronoUtc::rfc_3339())
                .with_writer(std::io::stdout)
                .boxed(),
            Format::Text => fmt::layer()
                .with_target(false)
                .with_timer(ChronoUtc::rfc_3339())
                .with_ansi(config.color)
                .with_writer(std::io::stdout)
                .boxed(),
        };
        layers.push(layer);
    }

    if output.file {
        let file = open_log_file(&config.file, config.append)?;
        let shared = Arc::new(Mutex::new(file));
        let writer = SharedFile(Arc::clone(&shared));
        let make_writer = move || writer.clone();
        let layer: Box<dyn Layer<Base> + Send + Sync> = match format {
            Format::Json => fmt::layer()
                .json()
                .with_target(true)
                .with_timer(ChronoUtc::rfc_3339())
                .with_writer(make_writer)
                .boxed(),
            Format::Text => fmt::layer()
                .with_target(false)
                .with_timer(ChronoUtc::rfc_3339())
                .with_ansi(false)
                .with_writer(make_writer)
                .boxed(),
        };
        layers.push(layer);
        file_handle = Some(shared);
    }

    let default = Registry::default().with(filter).with(layers).set_default();

    Ok(LogGuard {
        _default: default,
        file: file_handle,
    })
}

/// Open the log file, truncating it unless `append` is set
fn open_log_file(path: &Path, append: bool) -> Result<File, ConfigError> {
    let mut options = std::fs::OpenOptions::new();
    options.create(true);
    if append {
        options.append(true);
    } else {
        options.write(true).truncate(true);
    }
    options.open(path).map_err(|e| {
        ConfigError::Logging(format!("Failed to open log file {:?}: {}", path, e))
    })
}

/// Build environment filter from config or environment variables
fn build_env_filter(config: &LoggingConfig) -> Result<EnvFilter, ConfigError> {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_FILTER_ENV) {
        return Ok(filter);
    }

    EnvFilter::try_new(config.level.as_str())
        .map_err(|e| ConfigError::Logging(format!("Invalid log level '{}': {}", config.level, e)))
}
