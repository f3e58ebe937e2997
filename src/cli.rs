//! CLI domain: argument parsing and mapping of flags onto configuration keys.

mod parse;

pub use parse::Cli;

use crate::config::{ConfigLoader, Overrides, SyncConfig};
use crate::error::ConfigError;

impl Cli {
    /// Configuration overrides for every flag that was given
    ///
    /// `--log-level` wins over `--debug` when both are present.
    pub fn overrides(&self) -> Overrides {
        let mut overrides = Overrides::new();
        let path = |p: &std::path::PathBuf| p.to_string_lossy().into_owned();

        if let Some(ref p) = self.input_path {
            overrides.push(("source", path(p)));
        }
        if let Some(ref p) = self.output_path {
            overrides.push(("target", path(p)));
        }
        if let Some(secs) = self.time_interval {
            overrides.push(("interval_secs", secs.to_string()));
        }
        if let Some(ref p) = self.log_file_path {
            overrides.push(("logging.file", path(p)));
        }
        if let Some(attempts) = self.verify_attempts {
            overrides.push(("verify_attempts", attempts.to_string()));
        }
        if let Some(size) = self.chunk_size {
            overrides.push(("chunk_size", size.to_string()));
        }
        if self.debug {
            overrides.push(("logging.level", "debug".to_string()));
        }
        if let Some(ref level) = self.log_level {
            overrides.push(("logging.level", level.clone()));
        }
        if let Some(ref format) = self.log_format {
            overrides.push(("logging.format", format.clone()));
        }
        if let Some(ref output) = self.log_output {
            overrides.push(("logging.output", output.clone()));
        }
        overrides
    }

    /// Load, merge and validate the configuration for this invocation
    pub fn load_config(&self) -> Result<SyncConfig, ConfigError> {
        ConfigLoader::load_with_overrides(self.config.as_deref(), &self.overrides())?.resolve()
    }
}
