//! User directory: account management behind the authorization gate.

use secrecy::SecretString;

use law_office_core::{Email, Role, UserId};

use super::auth::{Session, hash_password, validate_password};
use crate::db::Database;
use crate::error::OfficeError;
use crate::models::{NewUser, User, UserChanges};

/// Account operations performed on behalf of a session.
pub struct UserDirectory<'a> {
    db: &'a Database,
}

impl<'a> UserDirectory<'a> {
    #[must_use]
    pub const fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Create an account and return its id.
    ///
    /// # Errors
    ///
    /// - `Unauthenticated` / `Forbidden` unless an administrator is logged in
    /// - `Validation` for a blank username, full name or password
    /// - `Conflict` if the username exists, including on a deactivated account
    pub async fn create_user(
        &self,
        session: &Session,
        user: &NewUser,
    ) -> Result<UserId, OfficeError> {
        let gate = session.gate();
        let actor = gate.require(gate.can_manage_users(), "create user")?;

        validate_password(&user.password)?;
        let password_hash = hash_password(&user.password)?;
        let created = self.db.users().create(user, &password_hash).await?;

        tracing::info!(
            user_id = %created.id,
            username = %created.username,
            role = %created.role,
            created_by = %actor.id,
            "User created"
        );

        Ok(created.id)
    }

    /// Convenience wrapper over [`Self::create_user`] taking loose fields.
    ///
    /// # Errors
    ///
    /// See [`Self::create_user`].
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        session: &Session,
        username: &str,
        password: SecretString,
        full_name: &str,
        role: Role,
        email: Option<Email>,
        phone: Option<&str>,
    ) -> Result<UserId, OfficeError> {
        let user = NewUser {
            username: username.to_owned(),
            password,
            full_name: full_name.to_owned(),
            role,
            email,
            phone: phone.map(str::to_owned),
        };
        self.create_user(session, &user).await
    }

    /// Apply `changes` to account `id`.
    ///
    /// Administrators may change any account. Other users may change their
    /// own profile and password, but not their role or active flag. Nobody
    /// can deactivate their own account. Returns `false` if `changes` is
    /// empty or the account does not exist.
    ///
    /// # Errors
    ///
    /// - `Unauthenticated` without a login
    /// - `Forbidden` for edits outside the rules above
    /// - `Validation` / `Conflict` for bad or taken values
    pub async fn update_user(
        &self,
        session: &Session,
        id: UserId,
        changes: &UserChanges,
    ) -> Result<bool, OfficeError> {
        let gate = session.gate();
        let actor = session.require_user()?;

        if !gate.can_manage_users() {
            if actor.id != id {
                gate.require(false, "update another user")?;
            }
            if changes.touches_privileges() {
                gate.require(false, "change own role or active flag")?;
            }
        }

        if actor.id == id && changes.is_active == Some(false) {
            return Err(OfficeError::Forbidden("deactivate own account"));
        }

        if changes.is_empty() {
            return Ok(false);
        }

        let password_hash = match &changes.password {
            Some(password) => {
                validate_password(password)?;
                Some(hash_password(password)?)
            }
            None => None,
        };

        let updated = self
            .db
            .users()
            .update(id, changes, password_hash.as_deref())
            .await?;

        if updated {
            tracing::info!(
                user_id = %id,
                updated_by = %actor.id,
                password_changed = password_hash.is_some(),
                "User updated"
            );
        }

        Ok(updated)
    }

    /// Deactivate account `id`. Returns `false` if it does not exist.
    ///
    /// # Errors
    ///
    /// `Unauthenticated` / `Forbidden` unless an administrator is logged in;
    /// `Forbidden` when the administrator targets their own account.
    pub async fn deactivate_user(
        &self,
        session: &Session,
        id: UserId,
    ) -> Result<bool, OfficeError> {
        let gate = session.gate();
        let actor = gate.require(gate.can_manage_users(), "deactivate user")?;
        if actor.id == id {
            return Err(OfficeError::Forbidden("deactivate own account"));
        }

        let deactivated = self.db.users().deactivate(id).await?;
        if deactivated {
            tracing::info!(user_id = %id, deactivated_by = %actor.id, "User deactivated");
        }
        Ok(deactivated)
    }

    /// # Errors
    ///
    /// `Unauthenticated` without a login.
    pub async fn find_by_id(
        &self,
        session: &Session,
        id: UserId,
    ) -> Result<Option<User>, OfficeError> {
        session.require_user()?;
        Ok(self.db.users().get_by_id(id).await?)
    }

    /// # Errors
    ///
    /// `Unauthenticated` without a login.
    pub async fn find_by_username(
        &self,
        session: &Session,
        username: &str,
    ) -> Result<Option<User>, OfficeError> {
        session.require_user()?;
        Ok(self.db.users().get_by_username(username).await?)
    }

    /// Active accounts ordered by full name.
    ///
    /// # Errors
    ///
    /// `Unauthenticated` without a login.
    pub async fn list_active(&self, session: &Session) -> Result<Vec<User>, OfficeError> {
        session.require_user()?;
        Ok(self.db.users().list_active().await?)
    }

    /// Active accounts that can be assigned cases (lawyers and administrators).
    ///
    /// # Errors
    ///
    /// `Unauthenticated` without a login.
    pub async fn list_lawyers(&self, session: &Session) -> Result<Vec<User>, OfficeError> {
        session.require_user()?;
        Ok(self.db.users().list_lawyers().await?)
    }

    /// Whether `candidate` is free, ignoring account `excluding`.
    ///
    /// # Errors
    ///
    /// `Unauthenticated` without a login.
    pub async fn is_username_available(
        &self,
        session: &Session,
        candidate: &str,
        excluding: Option<UserId>,
    ) -> Result<bool, OfficeError> {
        session.require_user()?;
        let taken = self
            .db
            .users()
            .is_username_taken(candidate.trim(), excluding)
            .await?;
        Ok(!taken)
    }
}
