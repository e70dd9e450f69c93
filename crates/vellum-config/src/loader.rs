//! Configuration discovery and loading.
//!
//! Precedence, lowest first: built-in defaults, the config file, environment
//! variables. Command-line flags are applied by the binary on top.

use crate::config::VellumConfig;
use crate::error::{ConfigError, ConfigResult};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File name looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "vellum.toml";

/// Loads [`VellumConfig`] from disk and the environment.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, `./vellum.toml` and then the
    /// user config directory are tried; when neither exists the defaults are
    /// used. Environment overrides are applied last and the result validated.
    pub async fn load(explicit: Option<&Path>) -> ConfigResult<VellumConfig> {
        let mut config = match explicit {
            Some(path) => Self::load_file(path).await?,
            None => match Self::discover().await {
                Some(path) => Self::load_file(&path).await?,
                None => {
                    debug!("No config file found, using defaults");
                    VellumConfig::default()
                }
            },
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse a config file without applying environment overrides.
    pub async fn load_file(path: &Path) -> ConfigResult<VellumConfig> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        let config: VellumConfig = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: Some(path.to_path_buf()),
            source: e,
        })?;

        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Candidate config file locations, in lookup order.
    pub fn candidates() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("vellum").join("config.toml"));
        }
        paths
    }

    async fn discover() -> Option<PathBuf> {
        for candidate in Self::candidates() {
            if tokio::fs::try_exists(&candidate).await.unwrap_or(false) {
                return Some(candidate);
            }
        }
        None
    }
}
