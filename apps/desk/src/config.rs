use std::path::Path;

use anyhow::Context;
use config::{Config, Environment, File};
use registry::{IntakeLimits, RegistryOptions};
use serde::Deserialize;
use storage::{normalize_database_url, StorageKeys, DEFAULT_KEY_PREFIX};

const DEFAULT_CONFIG_NAME: &str = "temu-balik";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub database_url: String,
    pub key_prefix: String,
    pub max_image_bytes: usize,
    pub max_image_width: u32,
    pub jpeg_quality: u8,
}

impl Default for Settings {
    fn default() -> Self {
        let limits = IntakeLimits::default();
        Self {
            database_url: "sqlite://./data/temu-balik.db".into(),
            key_prefix: DEFAULT_KEY_PREFIX.into(),
            max_image_bytes: limits.max_image_bytes,
            max_image_width: limits.max_image_width,
            jpeg_quality: limits.jpeg_quality,
        }
    }
}

impl Settings {
    pub fn registry_options(&self) -> RegistryOptions {
        RegistryOptions {
            keys: StorageKeys::with_prefix(&self.key_prefix),
            limits: IntakeLimits {
                max_image_bytes: self.max_image_bytes,
                max_image_width: self.max_image_width,
                jpeg_quality: self.jpeg_quality,
            },
        }
    }

    /// Database URL ready for `Storage::new`; blank falls back to the default.
    pub fn prepared_database_url(&self) -> String {
        if self.database_url.trim().is_empty() {
            return Settings::default().database_url;
        }
        normalize_database_url(&self.database_url)
    }
}

/// Defaults, then the config file, then `APP__*` environment variables.
///
/// Without an explicit path the file is optional and looked up as
/// `temu-balik.{toml,json,...}` in the working directory.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let defaults = Settings::default();
    let file = match path {
        Some(path) => File::from(path).required(true),
        None => File::with_name(DEFAULT_CONFIG_NAME).required(false),
    };

    Config::builder()
        .set_default("database_url", defaults.database_url)?
        .set_default("key_prefix", defaults.key_prefix)?
        .set_default("max_image_bytes", defaults.max_image_bytes as i64)?
        .set_default("max_image_width", i64::from(defaults.max_image_width))?
        .set_default("jpeg_quality", i64::from(defaults.jpeg_quality))?
        .add_source(file)
        .add_source(
            Environment::with_prefix("APP")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("failed to read configuration")?
        .try_deserialize()
        .context("invalid configuration")
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
