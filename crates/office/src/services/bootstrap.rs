//! First-run setup.

use law_office_core::Role;

use super::auth::hash_password;
use crate::config::OfficeConfig;
use crate::db::Database;
use crate::error::OfficeError;
use crate::models::NewUser;

/// Open the store and make sure it can be logged into.
///
/// When the store has no accounts at all, the configured bootstrap
/// administrator is created. Existing stores are never touched, even if the
/// bootstrap account was deactivated or renamed.
///
/// # Errors
///
/// Returns `OfficeError::Storage` if the store cannot be opened or migrated,
/// and `OfficeError::Validation` if the bootstrap account is unusable.
pub async fn open_store(config: &OfficeConfig) -> Result<Database, OfficeError> {
    let db = Database::open(config).await?;
    ensure_admin(&db, config).await?;
    Ok(db)
}

async fn ensure_admin(db: &Database, config: &OfficeConfig) -> Result<(), OfficeError> {
    if db.users().count().await? > 0 {
        return Ok(());
    }

    let admin = &config.bootstrap_admin;
    let password_hash = hash_password(&admin.password)?;
    let user = NewUser {
        username: admin.username.clone(),
        password: admin.password.clone(),
        full_name: admin.full_name.clone(),
        role: Role::Administrator,
        email: admin.email.clone(),
        phone: None,
    };
    let created = db.users().create(&user, &password_hash).await?;

    if admin.uses_default_password() {
        tracing::warn!(
            username = %created.username,
            "Created default administrator with the well-known password; change it now"
        );
    } else {
        tracing::warn!(
            username = %created.username,
            "Created bootstrap administrator from configuration"
        );
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;
    use tempfile::TempDir;

    use super::*;
    use crate::config::DEFAULT_ADMIN_USERNAME;
    use crate::services::auth::Session;

    #[tokio::test]
    async fn test_first_open_creates_admin() {
        let dir = TempDir::new().unwrap();
        let config = OfficeConfig::in_dir(dir.path());
        let db = open_store(&config).await.unwrap();

        let admin = db
            .users()
            .get_by_username(DEFAULT_ADMIN_USERNAME)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(admin.role, Role::Administrator);
        assert!(admin.is_active);

        let mut session = Session::new();
        assert!(session.authenticate(&db, "admin", &SecretString::from("admin123")).await);
        assert!(session.gate().is_admin());
    }

    #[tokio::test]
    async fn test_reopen_does_not_add_accounts() {
        let dir = TempDir::new().unwrap();
        let config = OfficeConfig::in_dir(dir.path());

        let db = open_store(&config).await.unwrap();
        db.close().await;
        let db = open_store(&config).await.unwrap();

        assert_eq!(db.users().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_configured_bootstrap_account() {
        let dir = TempDir::new().unwrap();
        let mut config = OfficeConfig::in_dir(dir.path());
        config.bootstrap_admin.username = "root".to_owned();
        config.bootstrap_admin.password = SecretString::from("s3cret-enough");

        let db = open_store(&config).await.unwrap();

        let mut session = Session::new();
        assert!(!session.authenticate(&db, "admin", &SecretString::from("admin123")).await);
        assert!(session.authenticate(&db, "root", &SecretString::from("s3cret-enough")).await);
    }
}
