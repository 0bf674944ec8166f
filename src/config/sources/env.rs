//! Environment source: CONVERGENT_BUCKET_TYPES__MAPS=documents and so on.

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::Environment;

pub fn add_to_builder(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix("CONVERGENT")
            .prefix_separator("_")
            .separator("__"),
    )
}
