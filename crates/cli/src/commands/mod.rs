//! Subcommand implementations.

pub mod migrate;
pub mod store;
pub mod user;

use law_office::config::ConfigError;
use law_office::{Database, OfficeConfig, OfficeError, Session, open_store};
use secrecy::SecretString;
use thiserror::Error;

/// Errors reported by `lo-cli`.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Office(#[from] OfficeError),

    /// Wrong password, unknown or deactivated account.
    #[error("Login failed for {0}")]
    LoginFailed(String),

    #[error("Could not read password: {0}")]
    Prompt(#[from] std::io::Error),

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("No such user: {0}")]
    UnknownUser(String),

    #[error("Restore discards every change made since the snapshot; rerun with --yes to confirm")]
    RestoreNotConfirmed,

    #[error("Backup failed; see the log for details")]
    BackupFailed,

    #[error("Restore failed; the store was left unchanged")]
    RestoreFailed,
}

/// Open the configured store, running first-run setup if needed.
pub async fn open() -> Result<(OfficeConfig, Database), CliError> {
    let config = OfficeConfig::from_env()?;
    let db = open_store(&config).await?;
    Ok((config, db))
}

/// Open the store and log in as `username`, or as the bootstrap account.
///
/// The password comes from `LAW_OFFICE_PASSWORD` or an interactive prompt.
pub async fn login(username: Option<&str>) -> Result<(Database, Session), CliError> {
    let (config, db) = open().await?;
    let username = username.unwrap_or(&config.bootstrap_admin.username);

    let password = secret_from_env_or_prompt(
        "LAW_OFFICE_PASSWORD",
        &format!("Password for {username}: "),
    )?;

    let mut session = Session::new();
    if !session.authenticate(&db, username, &password).await {
        return Err(CliError::LoginFailed(username.to_owned()));
    }
    Ok((db, session))
}

/// Read a secret from `var`, or prompt for it on the terminal.
pub fn secret_from_env_or_prompt(var: &str, prompt: &str) -> Result<SecretString, CliError> {
    if let Ok(value) = std::env::var(var)
        && !value.is_empty()
    {
        return Ok(SecretString::from(value));
    }
    Ok(SecretString::from(rpassword::prompt_password(prompt)?))
}

/// Read a new password from `LAW_OFFICE_NEW_PASSWORD`, or prompt twice.
pub fn new_password(username: &str) -> Result<SecretString, CliError> {
    if let Ok(value) = std::env::var("LAW_OFFICE_NEW_PASSWORD")
        && !value.is_empty()
    {
        return Ok(SecretString::from(value));
    }

    let first = rpassword::prompt_password(format!("New password for {username}: "))?;
    let second = rpassword::prompt_password("Repeat new password: ")?;
    if first != second {
        return Err(CliError::PasswordMismatch);
    }
    Ok(SecretString::from(first))
}
