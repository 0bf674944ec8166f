//! Configuration System
//!
//! Layered client configuration: built-in defaults, then the user's global
//! file, then an explicit file, then `CONVERGENT_*` environment variables.

use crate::error::{CrdtError, Result};
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

mod merge;
mod sources;

pub use sources::global_file::global_config_path;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Bucket type used when a root is created without an explicit one
    #[serde(default)]
    pub bucket_types: BucketTypes,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Default bucket type per root datatype
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketTypes {
    #[serde(default = "default_counters")]
    pub counters: String,

    #[serde(default = "default_sets")]
    pub sets: String,

    #[serde(default = "default_maps")]
    pub maps: String,
}

fn default_counters() -> String {
    "counters".to_string()
}

fn default_sets() -> String {
    "sets".to_string()
}

fn default_maps() -> String {
    "maps".to_string()
}

impl Default for BucketTypes {
    fn default() -> Self {
        Self {
            counters: default_counters(),
            sets: default_sets(),
            maps: default_maps(),
        }
    }
}

impl BucketTypes {
    fn validate(&self) -> std::result::Result<(), String> {
        for (datatype, bucket_type) in [
            ("counters", &self.counters),
            ("sets", &self.sets),
            ("maps", &self.maps),
        ] {
            if bucket_type.trim().is_empty() {
                return Err(format!("bucket type for {} cannot be empty", datatype));
            }
        }
        Ok(())
    }
}

impl ClientConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        if let Err(e) = self.bucket_types.validate() {
            errors.push(e);
        }
        if let Err(e) = self.logging.validate() {
            errors.push(e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(CrdtError::Config(format!(
                "Configuration validation failed:\n{}",
                errors.join("\n")
            )))
        }
    }
}

/// Loads [`ClientConfig`] from all configured sources
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load from defaults, the global file, `explicit` if given, and the
    /// environment. Later sources win.
    pub fn load(explicit: Option<&Path>) -> Result<ClientConfig> {
        let builder = merge::merge_policy::builder_with_defaults()?;
        let builder = sources::global_file::add_to_builder(builder)?;
        let builder = match explicit {
            Some(path) => sources::explicit_file::add_to_builder(builder, path)?,
            None => builder,
        };
        let builder = sources::env::add_to_builder(builder);

        let config: ClientConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load a single file on top of defaults, ignoring the global file and
    /// the environment.
    pub fn load_from_file(path: &Path) -> Result<ClientConfig> {
        let builder = merge::merge_policy::builder_with_defaults()?;
        let builder = sources::explicit_file::add_to_builder(builder, path)?;
        let config: ClientConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}
