//! Config loading entry point: merges defaults, file, environment and overrides.

use super::merge_policy::{apply_overrides, builder_with_defaults};
use super::sources;
use super::SyncConfig;
use crate::error::ConfigError;
use std::path::Path;
use tracing::debug;

/// Explicit key/value overrides, applied last (e.g. from CLI flags)
pub type Overrides = Vec<(&'static str, String)>;

/// Loads [`SyncConfig`] from all sources
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration: defaults, then `config_file` if given, then environment
    pub fn load(config_file: Option<&Path>) -> Result<SyncConfig, ConfigError> {
        Self::load_with_overrides(config_file, &Overrides::new())
    }

    /// Load configuration with explicit overrides taking highest precedence
    pub fn load_with_overrides(
        config_file: Option<&Path>,
        overrides: &Overrides,
    ) -> Result<SyncConfig, ConfigError> {
        let mut builder = builder_with_defaults()?;

        if let Some(path) = config_file {
            debug!(config_path = %path.display(), "Loading config file");
            builder = sources::file::add_to_builder(builder, path)?;
        }

        builder = sources::env::add_to_builder(builder);
        builder = apply_overrides(builder, overrides)?;

        let config: SyncConfig = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Load a config file with no environment or override layers
    pub fn load_from_file(config_file: &Path) -> Result<SyncConfig, ConfigError> {
        let builder = sources::file::add_to_builder(builder_with_defaults()?, config_file)?;
        Ok(builder.build()?.try_deserialize()?)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self
    }
}
