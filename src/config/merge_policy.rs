//! Merge rules: defaults, override order.

use config::builder::DefaultState;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("interval_secs", super::default_interval_secs() as i64)?
        .set_default("verify_attempts", super::default_verify_attempts() as i64)?
        .set_default("chunk_size", super::default_chunk_size() as i64)?
        .set_default("logging.level", "info")?
        .set_default("logging.format", "text")?
        .set_default("logging.output", "both")?
        .set_default("logging.file", "periodic-sync.log")
}

/// Apply explicit overrides (CLI flags), which win over every other source.
pub fn apply_overrides(
    mut builder: ConfigBuilder<DefaultState>,
    overrides: &[(&'static str, String)],
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    for (key, value) in overrides {
        builder = builder.set_override(*key, value.as_str())?;
    }
    Ok(builder)
}
