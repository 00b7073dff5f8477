use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

use commands::context::{self, GlobalArgs};

#[derive(Parser)]
#[command(name = "piggy")]
#[command(version, about = "Piggy CLI - sign in to the Piggy finance API", long_about = None)]
struct Cli {
    /// Directory holding config.toml and tokens.json
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// Path to the configuration file (overrides PIGGY_CONFIG)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Base URL of the Piggy API
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Path to the durable token file
    #[arg(long, global = true)]
    token_file: Option<PathBuf>,

    /// Log filter (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Restore the stored session and show who is signed in
    Status,

    /// Sign in with a username or email
    Login {
        /// Username or email
        identifier: String,

        #[arg(long, env = "PIGGY_PASSWORD", hide_env_values = true)]
        password: String,

        /// Do not save the session; also signs out any remembered session
        #[arg(long)]
        no_remember: bool,
    },

    /// Create an account and sign in
    Register {
        username: String,

        email: String,

        #[arg(long, env = "PIGGY_PASSWORD", hide_env_values = true)]
        password: String,

        /// Repeat the password; must match
        #[arg(long)]
        confirm: Option<String>,
    },

    /// Sign out and forget stored credentials
    Logout,

    /// Change the password of the signed-in user
    ChangePassword {
        #[arg(long, env = "PIGGY_PASSWORD", hide_env_values = true)]
        current: String,

        #[arg(long, env = "PIGGY_NEW_PASSWORD", hide_env_values = true)]
        new: String,
    },

    /// Request a password reset email
    ForgotPassword { email: String },

    /// Set a new password with a reset token
    ResetPassword {
        /// Token from the reset email
        token: String,

        #[arg(long, env = "PIGGY_NEW_PASSWORD", hide_env_values = true)]
        new: String,

        /// Repeat the new password; must match
        #[arg(long)]
        confirm: Option<String>,
    },

    /// Score a password locally without contacting the server
    PasswordStrength { password: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = GlobalArgs {
        config_dir: cli.config_dir,
        config: cli.config,
        api_url: cli.api_url,
        token_file: cli.token_file,
    };
    let config = context::load_config(&args)?;
    context::init_logging(cli.log_level.as_deref(), &config);

    let manager = context::build_session_manager(&args, &config)?;

    match cli.command {
        Commands::Status => commands::auth::status(&manager).await?,
        Commands::Login {
            identifier,
            password,
            no_remember,
        } => commands::auth::login(&manager, &identifier, &password, !no_remember).await?,
        Commands::Register {
            username,
            email,
            password,
            confirm,
        } => {
            commands::auth::register(
                &manager,
                &config,
                &username,
                &email,
                &password,
                confirm.as_deref(),
            )
            .await?
        }
        Commands::Logout => commands::auth::logout(&manager).await,
        Commands::ChangePassword { current, new } => {
            commands::password::change(&manager, &config, &current, &new).await?
        }
        Commands::ForgotPassword { email } => commands::password::forgot(&manager, &email).await?,
        Commands::ResetPassword {
            token,
            new,
            confirm,
        } => {
            commands::password::reset(&manager, &config, &token, &new, confirm.as_deref()).await?
        }
        Commands::PasswordStrength { password } => commands::password::strength(&config, &password),
    }

    Ok(())
}
