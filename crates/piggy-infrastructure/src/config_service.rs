//! Configuration service implementation.
//!
//! Loads [`ClientConfig`] from `config.toml` and applies environment
//! overrides.

use crate::paths::PiggyPaths;
use piggy_core::config::ClientConfig;
use piggy_core::error::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Overrides the config file location.
pub const ENV_CONFIG_PATH: &str = "PIGGY_CONFIG";
/// Overrides `api.base_url`.
pub const ENV_API_BASE_URL: &str = "PIGGY_API_BASE_URL";
/// Overrides `logging.level`.
pub const ENV_LOG: &str = "PIGGY_LOG";

/// Configuration service that loads and caches the client configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<ClientConfig>>>,
}

impl ConfigService {
    /// Resolves the config path from `PIGGY_CONFIG`, else the default location.
    pub fn new() -> Result<Self> {
        let path = match std::env::var_os(ENV_CONFIG_PATH) {
            Some(path) => PathBuf::from(path),
            None => PiggyPaths::default().config_file()?,
        };
        Ok(Self::with_path(path))
    }

    /// Creates a service reading from a custom path.
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            path,
            config: Arc::new(RwLock::new(None)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the configuration with environment overrides applied.
    ///
    /// The first successful load is cached.
    pub fn get_config(&self) -> Result<ClientConfig> {
        if let Ok(read_lock) = self.config.read() {
            if let Some(cached) = read_lock.as_ref() {
                return Ok(cached.clone());
            }
        }

        let mut loaded = Self::load_file(&self.path)?;
        apply_env_overrides(&mut loaded, |name| std::env::var(name).ok());

        if let Ok(mut write_lock) = self.config.write() {
            *write_lock = Some(loaded.clone());
        }

        Ok(loaded)
    }

    /// Reads the file; a missing or empty file yields the defaults.
    fn load_file(path: &Path) -> Result<ClientConfig> {
        if !path.exists() {
            tracing::debug!("[ConfigService] No config at {:?}, using defaults", path);
            return Ok(ClientConfig::default());
        }

        let content = fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(ClientConfig::default());
        }

        ClientConfig::from_toml_str(&content)
    }
}

/// Applies `PIGGY_*` overrides using `lookup` to read variables.
pub fn apply_env_overrides<F>(config: &mut ClientConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(base_url) = lookup(ENV_API_BASE_URL).filter(|v| !v.trim().is_empty()) {
        config.api.base_url = base_url;
    }
    if let Some(level) = lookup(ENV_LOG).filter(|v| !v.trim().is_empty()) {
        config.logging.level = Some(level);
    }
}
