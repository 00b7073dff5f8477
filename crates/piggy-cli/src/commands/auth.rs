use anyhow::{Context, Result};
use piggy_application::SessionManager;
use piggy_core::auth::{InitOutcome, UnauthenticatedReason};
use piggy_core::config::ClientConfig;
use piggy_core::user::UserProfile;

pub async fn status(manager: &SessionManager) -> Result<()> {
    match manager.initialize().await {
        InitOutcome::Verified(user) => print_user("Signed in", &user),
        InitOutcome::RefreshedAndVerified(user) => {
            print_user("Signed in (access token renewed)", &user)
        }
        InitOutcome::Unauthenticated(reason) => {
            println!("Not signed in.");
            if let Some(hint) = describe(reason) {
                println!("  {}", hint);
            }
        }
    }
    Ok(())
}

pub async fn login(
    manager: &SessionManager,
    identifier: &str,
    password: &str,
    remember_me: bool,
) -> Result<()> {
    let user = manager
        .login(identifier, password, remember_me)
        .await
        .context("Login failed")?;

    print_user("✅ Signed in", &user);
    if !remember_me {
        println!(
            "\n⚠️  --no-remember: credentials were not saved and any remembered session was signed out."
        );
    }
    Ok(())
}

pub async fn register(
    manager: &SessionManager,
    config: &ClientConfig,
    username: &str,
    email: &str,
    password: &str,
    confirm: Option<&str>,
) -> Result<()> {
    match confirm {
        Some(confirm) => config.password.validate_with_confirmation(password, confirm)?,
        None => config.password.validate(password)?,
    }

    let user = manager
        .register(username, email, password)
        .await
        .context("Registration failed")?;

    print_user("✅ Account created", &user);
    Ok(())
}

pub async fn logout(manager: &SessionManager) {
    manager.logout().await;
    println!("Signed out.");
}

fn print_user(headline: &str, user: &UserProfile) {
    println!("{} as {}", headline, user.username);
    println!("  id:      {}", user.id);
    println!("  email:   {}", user.email);
    println!("  created: {}", format_created(user));
}

fn format_created(user: &UserProfile) -> String {
    user.created_at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

fn describe(reason: UnauthenticatedReason) -> Option<&'static str> {
    match reason {
        UnauthenticatedReason::NoStoredSession => None,
        UnauthenticatedReason::NoRefreshToken
        | UnauthenticatedReason::RefreshRejected
        | UnauthenticatedReason::ReverifyRejected => {
            Some("The stored session has expired. Run `piggy login` again.")
        }
        UnauthenticatedReason::StorageFailure => {
            Some("The token file could not be read; stored credentials were discarded.")
        }
    }
}
