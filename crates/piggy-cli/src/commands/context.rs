//! Composition root: configuration, logging and the session manager.

use anyhow::{Context, Result};
use piggy_application::SessionManager;
use piggy_core::config::ClientConfig;
use piggy_infrastructure::{ConfigService, FileTokenStore, PiggyPaths};
use piggy_interaction::HttpAuthApi;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const DEFAULT_LOG_FILTER: &str = "warn";

/// Command-line options that shape the environment.
#[derive(Debug, Clone, Default)]
pub struct GlobalArgs {
    pub config_dir: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub api_url: Option<String>,
    pub token_file: Option<PathBuf>,
}

impl GlobalArgs {
    fn paths(&self) -> PiggyPaths {
        PiggyPaths::new(self.config_dir.clone())
    }
}

/// Loads the configuration and applies command-line overrides.
///
/// Precedence: flags, then `PIGGY_*` variables, then `config.toml`.
pub fn load_config(args: &GlobalArgs) -> Result<ClientConfig> {
    let service = match (&args.config, &args.config_dir) {
        (Some(path), _) => ConfigService::with_path(path.clone()),
        (None, Some(_)) => ConfigService::with_path(
            args.paths()
                .config_file()
                .context("Failed to resolve config file")?,
        ),
        (None, None) => ConfigService::new().context("Failed to resolve config file")?,
    };

    let mut config = service
        .get_config()
        .with_context(|| format!("Failed to load config from {}", service.path().display()))?;

    if let Some(api_url) = &args.api_url {
        config.api.base_url = api_url.clone();
    }
    if let Some(token_file) = &args.token_file {
        config.storage.token_file = Some(token_file.clone());
    }

    Ok(config)
}

/// Installs the stderr subscriber.
///
/// The filter comes from `--log-level`, else `PIGGY_LOG` / `logging.level`,
/// else `warn`. An invalid filter falls back to `warn`.
pub fn init_logging(cli_level: Option<&str>, config: &ClientConfig) {
    let level = cli_level
        .or(config.logging.level.as_deref())
        .unwrap_or(DEFAULT_LOG_FILTER);
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

/// Wires the HTTP client and the durable token file into a session manager.
pub fn build_session_manager(args: &GlobalArgs, config: &ClientConfig) -> Result<SessionManager> {
    let token_file = match &config.storage.token_file {
        Some(path) => path.clone(),
        None => args
            .paths()
            .token_file()
            .context("Failed to resolve token file")?,
    };
    tracing::debug!("Token file: {}", token_file.display());
    tracing::debug!("API: {}", config.api.base_url);

    let api = HttpAuthApi::from_config(&config.api);
    let durable = FileTokenStore::with_path(token_file);

    Ok(SessionManager::new(Arc::new(api), Arc::new(durable)))
}
