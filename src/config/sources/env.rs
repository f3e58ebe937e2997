//! Environment source: `PERIODIC_SYNC_<KEY>`, with `__` separating nested keys
//! (e.g. `PERIODIC_SYNC_LOGGING__LEVEL=debug`).

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::Environment;

pub const ENV_PREFIX: &str = "PERIODIC_SYNC";

pub fn add_to_builder(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    )
}
