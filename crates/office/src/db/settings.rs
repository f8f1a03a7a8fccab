//! Settings repository for database operations.
//!
//! Manages key-value application settings.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use super::{RepositoryError, required_text};
use crate::models::Setting;

#[derive(Debug, sqlx::FromRow)]
struct SettingRow {
    key: String,
    value: Option<String>,
    description: Option<String>,
    updated_at: DateTime<Utc>,
}

impl From<SettingRow> for Setting {
    fn from(row: SettingRow) -> Self {
        Self {
            key: row.key,
            value: row.value,
            description: row.description,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for settings database operations.
pub struct SettingsRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SettingsRepository<'a> {
    /// Create a new settings repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a setting by key.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, key: &str) -> Result<Option<Setting>, RepositoryError> {
        let row = sqlx::query_as::<_, SettingRow>(
            "SELECT key, value, description, updated_at FROM settings WHERE key = ?",
        )
        .bind(key)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// List all settings by key.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Setting>, RepositoryError> {
        let rows = sqlx::query_as::<_, SettingRow>(
            "SELECT key, value, description, updated_at FROM settings ORDER BY key",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Set a setting value (upsert).
    ///
    /// A `None` description keeps the existing one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` for a blank key and
    /// `RepositoryError::Database` if the query fails.
    pub async fn set(
        &self,
        key: &str,
        value: Option<&str>,
        description: Option<&str>,
    ) -> Result<Setting, RepositoryError> {
        let key = required_text("key", key)?;

        let row = sqlx::query_as::<_, SettingRow>(
            r"
            INSERT INTO settings (key, value, description, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (key) DO UPDATE
            SET value = excluded.value,
                description = COALESCE(excluded.description, settings.description),
                updated_at = excluded.updated_at
            RETURNING key, value, description, updated_at
            ",
        )
        .bind(&key)
        .bind(value)
        .bind(description)
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Delete a setting.
    ///
    /// Returns `false` if the key did not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, key: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM settings WHERE key = ?")
            .bind(key)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tempfile::TempDir;

    use crate::config::OfficeConfig;
    use crate::db::Database;

    #[tokio::test]
    async fn test_upsert_keeps_description() {
        let dir = TempDir::new().unwrap();
        let db = Database::open(&OfficeConfig::in_dir(dir.path())).await.unwrap();
        let repo = db.settings();

        repo.set("office_name", Some("Smith & Co"), Some("Shown on invoices"))
            .await
            .unwrap();
        let updated = repo.set("office_name", Some("Smith, Jones & Co"), None).await.unwrap();

        assert_eq!(updated.value.as_deref(), Some("Smith, Jones & Co"));
        assert_eq!(updated.description.as_deref(), Some("Shown on invoices"));
        assert_eq!(repo.list().await.unwrap().len(), 1);

        assert!(repo.delete("office_name").await.unwrap());
        assert!(repo.get("office_name").await.unwrap().is_none());
    }
}
