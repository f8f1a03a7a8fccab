//! Office configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `LAW_OFFICE_DATA_DIR` - Root data directory (default: `data`)
//! - `LAW_OFFICE_DATABASE` - SQLite store path (default: `<data>/law_office.db`)
//! - `LAW_OFFICE_BACKUP_DIR` - Snapshot directory (default: `<data>/backups`)
//! - `LAW_OFFICE_ADMIN_USERNAME` - First-run administrator (default: `admin`)
//! - `LAW_OFFICE_ADMIN_PASSWORD` - First-run administrator password (default: `admin123`)
//! - `LAW_OFFICE_ADMIN_EMAIL` - First-run administrator email (default: `admin@lawoffice.com`)
//!
//! The bootstrap administrator exists only so that a fresh install can be
//! logged into. Its default password is public; the operator must change it.

use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use law_office_core::Email;

const DEFAULT_DATA_DIR: &str = "data";
const DATABASE_FILE_NAME: &str = "law_office.db";
const BACKUPS_DIR_NAME: &str = "backups";

/// Username of the first-run administrator.
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
/// Password of the first-run administrator. Publicly known.
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";
const DEFAULT_ADMIN_EMAIL: &str = "admin@lawoffice.com";
const DEFAULT_ADMIN_FULL_NAME: &str = "System Administrator";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Office store configuration.
#[derive(Debug, Clone)]
pub struct OfficeConfig {
    /// SQLite database file.
    pub database_path: PathBuf,
    /// Directory that receives timestamped snapshots.
    pub backups_dir: PathBuf,
    /// Account provisioned when the store has no users.
    pub bootstrap_admin: BootstrapAdmin,
}

/// First-run administrator account.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct BootstrapAdmin {
    pub username: String,
    pub password: SecretString,
    pub full_name: String,
    pub email: Option<Email>,
}

impl std::fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("full_name", &self.full_name)
            .field("email", &self.email)
            .finish()
    }
}

impl BootstrapAdmin {
    /// Whether the password is still the publicly documented default.
    #[must_use]
    pub fn uses_default_password(&self) -> bool {
        self.password.expose_secret() == DEFAULT_ADMIN_PASSWORD
    }
}

impl Default for BootstrapAdmin {
    fn default() -> Self {
        Self {
            username: DEFAULT_ADMIN_USERNAME.to_owned(),
            password: SecretString::from(DEFAULT_ADMIN_PASSWORD),
            full_name: DEFAULT_ADMIN_FULL_NAME.to_owned(),
            email: Some(Email::from_stored(DEFAULT_ADMIN_EMAIL.to_owned())),
        }
    }
}

impl OfficeConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads a `.env` file first if one is present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if a variable is set but unusable.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let data_dir = optional_env("LAW_OFFICE_DATA_DIR")
            .map_or_else(|| PathBuf::from(DEFAULT_DATA_DIR), PathBuf::from);
        let mut config = Self::in_dir(&data_dir);

        if let Some(path) = optional_env("LAW_OFFICE_DATABASE") {
            config.database_path = PathBuf::from(path);
        }
        if let Some(path) = optional_env("LAW_OFFICE_BACKUP_DIR") {
            config.backups_dir = PathBuf::from(path);
        }

        if let Some(username) = optional_env("LAW_OFFICE_ADMIN_USERNAME") {
            config.bootstrap_admin.username = username;
        }
        if let Some(password) = optional_env("LAW_OFFICE_ADMIN_PASSWORD") {
            config.bootstrap_admin.password = SecretString::from(password);
        }
        if let Some(email) = optional_env("LAW_OFFICE_ADMIN_EMAIL") {
            let email = Email::parse(&email).map_err(|e| {
                ConfigError::InvalidEnvVar("LAW_OFFICE_ADMIN_EMAIL".to_owned(), e.to_string())
            })?;
            config.bootstrap_admin.email = Some(email);
        }

        Ok(config)
    }

    /// Standard layout rooted at `data_dir`, with the default bootstrap account.
    #[must_use]
    pub fn in_dir(data_dir: &Path) -> Self {
        Self {
            database_path: data_dir.join(DATABASE_FILE_NAME),
            backups_dir: data_dir.join(BACKUPS_DIR_NAME),
            bootstrap_admin: BootstrapAdmin::default(),
        }
    }
}

/// Read an environment variable, treating empty values as unset.
fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
