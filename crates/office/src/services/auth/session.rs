//! The local login session.
//!
//! There is one session per process and it is an ordinary owned value: the
//! caller creates it, passes it by reference to every operation, and drops
//! it at exit. Nothing is persisted.

use secrecy::SecretString;

use super::password::verify_password;
use super::{AuthError, Gate};
use crate::db::Database;
use crate::error::OfficeError;
use crate::models::CurrentUser;

/// Holder of the authenticated user, if any.
#[derive(Debug, Default)]
pub struct Session {
    current: Option<CurrentUser>,
}

impl Session {
    /// A session with nobody logged in.
    #[must_use]
    pub const fn new() -> Self {
        Self { current: None }
    }

    /// Log in as `username`.
    ///
    /// Any previous login is cleared first, so a failed attempt always leaves
    /// the session empty. Deactivated accounts cannot log in. Returns whether
    /// the login succeeded; the reason for a failure is only logged.
    pub async fn authenticate(
        &mut self,
        db: &Database,
        username: &str,
        password: &SecretString,
    ) -> bool {
        self.current = None;

        match check_credentials(db, username, password).await {
            Ok(user) => {
                tracing::info!(
                    user_id = %user.id,
                    username = %user.username,
                    role = %user.role,
                    "User logged in"
                );
                self.current = Some(user);
                true
            }
            Err(AuthError::InvalidCredentials) => {
                tracing::warn!(username, "Login rejected");
                false
            }
            Err(e) => {
                tracing::error!(username, error = %e, "Login failed");
                false
            }
        }
    }

    /// Clear the session. Safe to call when nobody is logged in.
    pub fn logout(&mut self) {
        if let Some(user) = self.current.take() {
            tracing::info!(user_id = %user.id, username = %user.username, "User logged out");
        }
    }

    /// Whether someone is logged in.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    /// The logged-in user as of login time.
    #[must_use]
    pub const fn current_user(&self) -> Option<&CurrentUser> {
        self.current.as_ref()
    }

    /// Permission checks for this session.
    #[must_use]
    pub const fn gate(&self) -> Gate<'_> {
        Gate::new(self)
    }

    /// The logged-in user, or `Unauthenticated`.
    pub(crate) fn require_user(&self) -> Result<&CurrentUser, OfficeError> {
        self.current.as_ref().ok_or(OfficeError::Unauthenticated)
    }

    #[cfg(test)]
    pub(crate) const fn signed_in(user: CurrentUser) -> Self {
        Self {
            current: Some(user),
        }
    }
}

async fn check_credentials(
    db: &Database,
    username: &str,
    password: &SecretString,
) -> Result<CurrentUser, AuthError> {
    let (user, password_hash) = db
        .users()
        .get_active_credentials(username)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    if !verify_password(password, &password_hash)? {
        return Err(AuthError::InvalidCredentials);
    }

    Ok(user.into())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tempfile::TempDir;

    use law_office_core::Role;

    use super::*;
    use crate::config::OfficeConfig;
    use crate::models::NewUser;
    use crate::services::auth::hash_password;

    async fn store_with(username: &str, password: &str, role: Role) -> (TempDir, Database) {
        let dir = TempDir::new().unwrap();
        let db = Database::open(&OfficeConfig::in_dir(dir.path())).await.unwrap();
        let password = SecretString::from(password);
        let hash = hash_password(&password).unwrap();
        db.users()
            .create(
                &NewUser {
                    username: username.to_owned(),
                    password,
                    full_name: "Alice Example".to_owned(),
                    role,
                    email: None,
                    phone: Some("555-0199".to_owned()),
                },
                &hash,
            )
            .await
            .unwrap();
        (dir, db)
    }

    #[tokio::test]
    async fn test_login_snapshot_and_logout() {
        let (_dir, db) = store_with("alice", "pw123", Role::Lawyer).await;
        let mut session = Session::new();

        assert!(session.authenticate(&db, "alice", &SecretString::from("pw123")).await);
        let user = session.current_user().unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(user.role, Role::Lawyer);
        assert_eq!(user.phone.as_deref(), Some("555-0199"));

        session.logout();
        assert!(!session.is_authenticated());
        session.logout();
    }

    #[tokio::test]
    async fn test_failed_attempt_clears_previous_login() {
        let (_dir, db) = store_with("alice", "pw123", Role::Lawyer).await;
        let mut session = Session::new();
        assert!(session.authenticate(&db, "alice", &SecretString::from("pw123")).await);

        assert!(!session.authenticate(&db, "alice", &SecretString::from("wrong")).await);
        assert!(session.current_user().is_none());
    }

    #[tokio::test]
    async fn test_unknown_user_and_case_sensitivity() {
        let (_dir, db) = store_with("alice", "pw123", Role::Lawyer).await;
        let mut session = Session::new();

        assert!(!session.authenticate(&db, "ALICE", &SecretString::from("pw123")).await);
        assert!(!session.authenticate(&db, "nobody", &SecretString::from("pw123")).await);
    }

    #[tokio::test]
    async fn test_snapshot_ignores_later_edits() {
        let (_dir, db) = store_with("alice", "pw123", Role::Lawyer).await;
        let mut session = Session::new();
        assert!(session.authenticate(&db, "alice", &SecretString::from("pw123")).await);

        let id = session.current_user().unwrap().id;
        let changes = crate::models::UserChanges {
            full_name: Some("Alice Renamed".to_owned()),
            ..Default::default()
        };
        db.users().update(id, &changes, None).await.unwrap();

        assert_eq!(session.current_user().unwrap().full_name, "Alice Example");
    }
}
