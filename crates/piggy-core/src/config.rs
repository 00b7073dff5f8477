//! Client configuration model (`config.toml`).

use crate::password::PasswordPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Root of `config.toml`. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub password: PasswordPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL the `/api/auth/*` paths are appended to.
    pub base_url: String,
    /// Per-request transport timeout.
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Overrides the default token file location.
    pub token_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `piggy_application=debug`.
    pub level: Option<String>,
}

impl ClientConfig {
    /// Parses a config document. Missing sections take their defaults.
    pub fn from_toml_str(content: &str) -> crate::error::Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        let config = ClientConfig::from_toml_str("").unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.api.base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.password.min_length, 8);
    }

    #[test]
    fn test_partial_sections() {
        let config = ClientConfig::from_toml_str(
            r#"
            [api]
            base_url = "https://piggy.example.com"

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.api.base_url, "https://piggy.example.com");
        assert_eq!(config.api.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.logging.level.as_deref(), Some("debug"));
        assert!(config.storage.token_file.is_none());
    }

    #[test]
    fn test_invalid_toml_is_serialization_error() {
        let err = ClientConfig::from_toml_str("[api\nbase_url = ").unwrap_err();
        assert!(err.is_serialization());
    }
}
