//! Unified path management for piggy configuration and credential files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/piggy/             # Config directory (platform config dir)
//! ├── config.toml              # Client configuration
//! └── tokens.json              # Durable token store (mode 600 on Unix)
//! ```

use std::path::PathBuf;

const APP_DIR_NAME: &str = "piggy";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Platform config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot determine config directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for piggy_core::PiggyError {
    fn from(e: PathError) -> Self {
        piggy_core::PiggyError::config(e.to_string())
    }
}

/// Unified path management for piggy.
///
/// Paths resolve under a base directory: the platform config directory by
/// default, or an explicit one (tests, `--config-dir`).
#[derive(Debug, Clone)]
pub struct PiggyPaths {
    base: Option<PathBuf>,
}

impl PiggyPaths {
    /// Creates a path resolver. `None` uses the platform config directory.
    pub fn new(base: Option<PathBuf>) -> Self {
        Self { base }
    }

    /// Returns the piggy configuration directory.
    ///
    /// # Returns
    ///
    /// - `Ok(PathBuf)`: Path to config directory (e.g., `~/.config/piggy/`)
    /// - `Err(PathError::ConfigDirNotFound)`: Could not determine directory
    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base {
            Some(base) => Ok(base.clone()),
            None => dirs::config_dir()
                .map(|dir| dir.join(APP_DIR_NAME))
                .ok_or(PathError::ConfigDirNotFound),
        }
    }

    /// Returns the path to config.toml.
    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    /// Returns the path to the durable token store.
    ///
    /// # Security Note
    ///
    /// The file holds bearer credentials; it is written with mode 600.
    pub fn token_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("tokens.json"))
    }
}

impl Default for PiggyPaths {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_dir() {
        // Platform dirs may be unavailable in minimal CI containers.
        if let Ok(config_dir) = PiggyPaths::default().config_dir() {
            assert!(config_dir.ends_with("piggy"));
        }
    }

    #[test]
    fn test_files_under_explicit_base() {
        let paths = PiggyPaths::new(Some(PathBuf::from("/tmp/piggy-test")));
        let config_file = paths.config_file().unwrap();
        let token_file = paths.token_file().unwrap();

        assert!(config_file.ends_with("config.toml"));
        assert!(token_file.ends_with("tokens.json"));
        assert!(config_file.starts_with("/tmp/piggy-test"));
        assert!(token_file.starts_with("/tmp/piggy-test"));
    }
}
