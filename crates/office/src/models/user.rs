//! User domain types.
//!
//! None of these types carry the password hash. The hash only ever leaves
//! the users repository as an opaque string handed to the password verifier.

use chrono::{DateTime, Utc};
use secrecy::SecretString;

use law_office_core::{Email, Role, UserId};

/// An office account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    /// Login name. Unique among all accounts ever created.
    pub username: String,
    pub full_name: String,
    pub role: Role,
    pub email: Option<Email>,
    pub phone: Option<String>,
    /// False once the account has been deactivated.
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Snapshot of the logged-in user, taken at login time.
///
/// Later edits to the account are not reflected until the next login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: UserId,
    pub username: String,
    pub full_name: String,
    pub role: Role,
    pub email: Option<Email>,
    pub phone: Option<String>,
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            full_name: user.full_name,
            role: user.role,
            email: user.email,
            phone: user.phone,
        }
    }
}

/// Input for creating an account.
#[derive(Debug)]
pub struct NewUser {
    pub username: String,
    pub password: SecretString,
    pub full_name: String,
    pub role: Role,
    pub email: Option<Email>,
    pub phone: Option<String>,
}

/// Fields to change on an existing account. `None` leaves a field alone.
///
/// `email` and `phone` are doubly optional: `Some(None)` clears the value.
#[derive(Debug, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub role: Option<Role>,
    pub email: Option<Option<Email>>,
    pub phone: Option<Option<String>>,
    pub is_active: Option<bool>,
    /// New plaintext password; hashed before it is stored.
    pub password: Option<SecretString>,
}

impl UserChanges {
    /// Whether no field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.full_name.is_none()
            && self.role.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.is_active.is_none()
            && self.password.is_none()
    }

    /// Whether the change alters what the account is allowed to do.
    #[must_use]
    pub const fn touches_privileges(&self) -> bool {
        self.role.is_some() || self.is_active.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_changes_are_empty() {
        assert!(UserChanges::default().is_empty());
    }

    #[test]
    fn test_clearing_phone_is_a_change() {
        let changes = UserChanges {
            phone: Some(None),
            ..UserChanges::default()
        };
        assert!(!changes.is_empty());
        assert!(!changes.touches_privileges());
    }

    #[test]
    fn test_role_and_active_touch_privileges() {
        let role = UserChanges {
            role: Some(Role::Administrator),
            ..UserChanges::default()
        };
        let active = UserChanges {
            is_active: Some(false),
            ..UserChanges::default()
        };
        assert!(role.touches_privileges());
        assert!(active.touches_privileges());
    }
}
