use anyhow::{Context, Result};
use piggy_application::SessionManager;
use piggy_core::config::ClientConfig;

pub async fn change(
    manager: &SessionManager,
    config: &ClientConfig,
    current: &str,
    new: &str,
) -> Result<()> {
    config.password.validate(new)?;

    // Renews an expired access token before it is used.
    manager.initialize().await;
    manager
        .change_password(current, new)
        .await
        .context("Password change failed")?;

    println!("✅ Password changed.");
    Ok(())
}

pub async fn forgot(manager: &SessionManager, email: &str) -> Result<()> {
    manager
        .forgot_password(email)
        .await
        .context("Password reset request failed")?;

    println!("If an account exists for {}, a reset link has been sent.", email);
    Ok(())
}

pub async fn reset(
    manager: &SessionManager,
    config: &ClientConfig,
    token: &str,
    new: &str,
    confirm: Option<&str>,
) -> Result<()> {
    match confirm {
        Some(confirm) => config.password.validate_with_confirmation(new, confirm)?,
        None => config.password.validate(new)?,
    }

    manager
        .reset_password(token, new)
        .await
        .context("Password reset failed")?;

    println!("✅ Password reset. You can now sign in with the new password.");
    Ok(())
}

pub fn strength(config: &ClientConfig, password: &str) {
    let strength = config.password.strength(password);
    println!(
        "Strength: {} ({}/{}, {}%)",
        strength.level(),
        strength.score,
        piggy_core::password::PasswordStrength::MAX_SCORE,
        strength.percent()
    );
    match config.password.validate(password) {
        Ok(()) => println!("Meets the password requirements."),
        Err(violation) => println!("Does not meet the requirements: {}", violation),
    }
}
