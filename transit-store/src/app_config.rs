use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use transit_core::{KeyValueStorage, ValidityWindow};

use crate::{FileStorage, MemoryStorage};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub storage: StorageConfig,
    #[serde(default)]
    pub validity: ValidityConfig,
    #[serde(default)]
    pub checkout: CheckoutConfig,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    File,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    #[serde(default = "default_directory")]
    pub directory: PathBuf,
}

fn default_directory() -> PathBuf {
    PathBuf::from("data")
}

#[derive(Debug, Deserialize, Clone)]
pub struct ValidityConfig {
    #[serde(default = "default_window_seconds")]
    pub window_seconds: u64,
}

fn default_window_seconds() -> u64 { 3600 }

impl Default for ValidityConfig {
    fn default() -> Self {
        Self { window_seconds: default_window_seconds() }
    }
}

impl ValidityConfig {
    pub fn window(&self) -> ValidityWindow {
        ValidityWindow::from_seconds(self.window_seconds)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CheckoutConfig {
    /// Seconds allowed on the payment screen
    #[serde(default = "default_payment_window")]
    pub payment_window_seconds: u64,
}

fn default_payment_window() -> u64 { 164 }

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            payment_window_seconds: default_payment_window(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        Self::load_from(Path::new("config"), &run_mode)
    }

    /// Layer `<dir>/default`, `<dir>/<run_mode>`, `<dir>/local`, then the environment
    pub fn load_from(dir: &Path, run_mode: &str) -> Result<Self, config::ConfigError> {
        let file = |name: &str| dir.join(name).to_string_lossy().into_owned();

        let s = config::Config::builder()
            .add_source(config::File::with_name(&file("default")))
            // Per-environment overrides, optional
            .add_source(config::File::with_name(&file(run_mode)).required(false))
            // Machine-local overrides, not checked in
            .add_source(config::File::with_name(&file("local")).required(false))
            // Eg. `TRANSIT__STORAGE__BACKEND=memory`
            .add_source(config::Environment::with_prefix("TRANSIT").separator("__"))
            .build()?;

        s.try_deserialize()
    }

    /// Build the configured storage backend
    pub fn open_storage(&self) -> Arc<dyn KeyValueStorage> {
        match self.storage.backend {
            StorageBackend::Memory => Arc::new(MemoryStorage::new()),
            StorageBackend::File => Arc::new(FileStorage::new(self.storage.directory.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_toml(raw: &str) -> Config {
        config::Config::builder()
            .add_source(config::File::from_str(raw, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults_fill_missing_sections() {
        let config = from_toml("[storage]\nbackend = \"memory\"\n");

        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.storage.directory, PathBuf::from("data"));
        assert_eq!(config.validity.window(), ValidityWindow::ONE_HOUR);
        assert_eq!(config.checkout.payment_window_seconds, 164);
    }

    #[test]
    fn test_overrides() {
        let config = from_toml(concat!(
            "[storage]\nbackend = \"file\"\ndirectory = \"/tmp/wallet\"\n\n",
            "[validity]\nwindow_seconds = 1800\n",
        ));

        assert_eq!(config.storage.backend, StorageBackend::File);
        assert_eq!(config.validity.window().as_millis(), 1_800_000);
    }

    #[test]
    fn test_file_and_env_layering() {
        let dir = tempfile::TempDir::new().unwrap();
        let write = |name: &str, body: &str| std::fs::write(dir.path().join(name), body).unwrap();
        write("default.toml", "[storage]\nbackend = \"file\"\ndirectory = \"data\"\n");
        write("testing.toml", "[validity]\nwindow_seconds = 1800\n");
        write("local.toml", "[checkout]\npayment_window_seconds = 100\n");

        env::set_var("TRANSIT__STORAGE__BACKEND", "memory");
        // Single underscore after the prefix is not picked up
        env::set_var("TRANSIT_STORAGE__DIRECTORY", "/elsewhere");
        let loaded = Config::load_from(dir.path(), "testing");
        env::remove_var("TRANSIT__STORAGE__BACKEND");
        env::remove_var("TRANSIT_STORAGE__DIRECTORY");

        let config = loaded.unwrap();
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.storage.directory, PathBuf::from("data"));
        assert_eq!(config.validity.window().as_millis(), 1_800_000);
        assert_eq!(config.checkout.payment_window_seconds, 100);
    }

    #[test]
    fn test_missing_default_file_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(Config::load_from(dir.path(), "development").is_err());
    }
}
