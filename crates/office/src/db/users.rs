//! User repository for database operations.
//!
//! Accounts are never deleted; [`UserRepository::deactivate`] flips the
//! `is_active` flag. Usernames stay reserved after deactivation.

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use law_office_core::{Email, Role, UserId};

use super::schema::Table;
use super::{
    RepositoryError, constraint_error, optional_text, parse_stored, require_unique, required_text,
};
use crate::models::{NewUser, User, UserChanges};

/// Internal row type for database queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    full_name: String,
    role: String,
    email: Option<String>,
    phone: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = row
            .email
            .as_deref()
            .map(Email::parse)
            .transpose()
            .map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
            })?;

        Ok(Self {
            id: UserId::new(row.id),
            username: row.username,
            full_name: row.full_name,
            role: parse_stored::<Role>(&row.role)?,
            email,
            phone: row.phone,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Row with the stored password hash, used only for login.
#[derive(Debug, sqlx::FromRow)]
struct CredentialRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a user by ID, active or not.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, username, full_name, role, email, phone, is_active,
                   created_at, updated_at
            FROM users
            WHERE id = ?
            ",
        )
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get a user by exact (case-sensitive) username, active or not.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, username, full_name, role, email, phone, is_active,
                   created_at, updated_at
            FROM users
            WHERE username = ?
            ",
        )
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get an active user together with their stored password hash.
    ///
    /// Deactivated accounts are treated as missing.
    pub(crate) async fn get_active_credentials(
        &self,
        username: &str,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, CredentialRow>(
            r"
            SELECT id, username, full_name, role, email, phone, is_active,
                   created_at, updated_at, password_hash
            FROM users
            WHERE username = ? AND is_active = 1
            ",
        )
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some((row.user.try_into()?, row.password_hash)))
    }

    /// List active users ordered by full name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_active(&self) -> Result<Vec<User>, RepositoryError> {
        let rows = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, username, full_name, role, email, phone, is_active,
                   created_at, updated_at
            FROM users
            WHERE is_active = 1
            ORDER BY full_name
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// List active users who can be assigned cases (lawyers and administrators).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_lawyers(&self) -> Result<Vec<User>, RepositoryError> {
        let mut users = self.list_active().await?;
        users.retain(|user| user.role.can_be_assigned_cases());
        Ok(users)
    }

    /// Count all accounts, including deactivated ones.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// Whether `username` is used by any account other than `excluding`.
    ///
    /// Deactivated accounts keep their username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn is_username_taken(
        &self,
        username: &str,
        excluding: Option<UserId>,
    ) -> Result<bool, RepositoryError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE username = ? AND id IS NOT ?")
                .bind(username)
                .bind(excluding.map(|id| id.as_i64()))
                .fetch_one(self.pool)
                .await?;
        Ok(count > 0)
    }

    /// Create a user with an already hashed password.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` if the username or full name is
    /// blank, and `RepositoryError::Conflict` if the username exists.
    pub async fn create(
        &self,
        user: &NewUser,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let username = required_text("username", &user.username)?;
        let full_name = required_text("full_name", &user.full_name)?;
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        require_unique(&mut *tx, Table::Users, "username", &username, None).await?;

        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO users (username, password_hash, full_name, role, email, phone,
                               is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, 1, ?, ?)
            RETURNING id, username, full_name, role, email, phone, is_active,
                      created_at, updated_at
            ",
        )
        .bind(&username)
        .bind(password_hash)
        .bind(&full_name)
        .bind(user.role.as_str())
        .bind(user.email.as_ref().map(Email::as_str))
        .bind(optional_text(user.phone.as_deref()))
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| constraint_error(e, ("username", username.as_str())))?;

        tx.commit().await?;

        row.try_into()
    }

    /// Apply `changes` to a user.
    ///
    /// `password_hash` replaces the stored hash when present. Returns `false`
    /// if there is nothing to change or the user does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` for a blank username or full
    /// name, and `RepositoryError::Conflict` if the new username is taken.
    pub async fn update(
        &self,
        id: UserId,
        changes: &UserChanges,
        password_hash: Option<&str>,
    ) -> Result<bool, RepositoryError> {
        if changes.is_empty() && password_hash.is_none() {
            return Ok(false);
        }

        let username = changes
            .username
            .as_deref()
            .map(|u| required_text("username", u))
            .transpose()?;
        let full_name = changes
            .full_name
            .as_deref()
            .map(|n| required_text("full_name", n))
            .transpose()?;

        let mut tx = self.pool.begin().await?;

        if let Some(username) = &username {
            require_unique(&mut *tx, Table::Users, "username", username, Some(id.as_i64())).await?;
        }

        let mut query: QueryBuilder<'_, Sqlite> = QueryBuilder::new("UPDATE users SET ");
        let mut set = query.separated(", ");
        if let Some(username) = &username {
            set.push("username = ").push_bind_unseparated(username.clone());
        }
        if let Some(full_name) = &full_name {
            set.push("full_name = ").push_bind_unseparated(full_name.clone());
        }
        if let Some(role) = changes.role {
            set.push("role = ").push_bind_unseparated(role.as_str());
        }
        if let Some(email) = &changes.email {
            set.push("email = ")
                .push_bind_unseparated(email.as_ref().map(|e| e.as_str().to_owned()));
        }
        if let Some(phone) = &changes.phone {
            set.push("phone = ")
                .push_bind_unseparated(optional_text(phone.as_deref()));
        }
        if let Some(is_active) = changes.is_active {
            set.push("is_active = ").push_bind_unseparated(is_active);
        }
        if let Some(hash) = password_hash {
            set.push("password_hash = ").push_bind_unseparated(hash.to_owned());
        }
        set.push("updated_at = ").push_bind_unseparated(Utc::now());
        query.push(" WHERE id = ").push_bind(id.as_i64());

        let result = query
            .build()
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                constraint_error(e, ("username", username.as_deref().unwrap_or_default()))
            })?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deactivate a user. The row is kept.
    ///
    /// Returns `false` if the user does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn deactivate(&self, id: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("UPDATE users SET is_active = 0, updated_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(id.as_i64())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
