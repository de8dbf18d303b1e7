//! CLI settings
//!
//! Layered with the `config` crate: an optional TOML file, then `KVBATCH_`
//! environment variables (`__` separates nested keys, so `store.url` is
//! `KVBATCH_STORE__URL`). A `.env` file in the working directory is loaded
//! into the environment first.

use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use kvbatch_core::logging_facility::Profile;
use kvbatch_core::{ExError, ExErrorKind};
use serde::Deserialize;

/// Default settings file, looked up in the working directory without extension
const DEFAULT_FILE: &str = "kvbatch";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub log: LogSettings,
    pub store: StoreSettings,
    pub output: OutputSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// `development` or `production`
    pub profile: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            profile: "development".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Redis URL; the in-memory store is used when absent
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub json: bool,
}

impl Settings {
    /// Load settings for this process
    ///
    /// With `path`, that file must exist. Without it, `kvbatch.toml` in the
    /// working directory is read if present.
    ///
    /// # Errors
    ///
    /// Returns an `ERR_CONFIG` error if a file cannot be read or a value has
    /// the wrong type.
    pub fn load(path: Option<&Path>) -> Result<Self, ExError> {
        dotenvy::dotenv().ok();
        Self::from_sources(path, environment())
            .map_err(|err| ExError::new(ExErrorKind::Config).with_message(err.to_string()))
    }

    fn from_sources(path: Option<&Path>, env: Environment) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_FILE).required(false),
        };

        Config::builder()
            .add_source(file)
            .add_source(env)
            .build()?
            .try_deserialize()
    }

    /// Logging profile, falling back to development for unknown names
    pub fn log_profile(&self) -> Profile {
        self.log.profile.parse().unwrap_or(Profile::Development)
    }
}

fn environment() -> Environment {
    Environment::with_prefix("KVBATCH")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}
