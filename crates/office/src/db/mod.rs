//! Database operations for the office SQLite store.
//!
//! # Tables
//!
//! - `users` - Office accounts (soft-deleted through `is_active`)
//! - `clients` - People and companies the office represents
//! - `cases` - Legal cases, each owned by one client
//! - `tasks` - To-dos, optionally tied to a case or client
//! - `appointments` - Calendar entries
//! - `documents` - Metadata for stored files
//! - `invoices` - Billing records
//! - `case_sessions` - Court hearings of a case
//! - `settings` - Key/value application settings
//!
//! # Migrations
//!
//! Migrations live in `crates/office/migrations/` and are applied every time
//! the store is opened.
//!
//! # Transactions
//!
//! Every write runs in one transaction. Reference and uniqueness checks
//! happen inside the same transaction as the write, and the transaction is
//! rolled back when its guard is dropped on an early return.

pub mod appointments;
mod backup;
pub mod case_sessions;
pub mod cases;
pub mod clients;
pub mod documents;
pub mod invoices;
pub mod schema;
pub mod settings;
pub mod tasks;
pub mod users;

use std::path::{Path, PathBuf};
use std::time::Duration;

use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::SqliteConnection;
use thiserror::Error;

use crate::config::OfficeConfig;
use crate::error::ValidationError;

pub use appointments::AppointmentRepository;
pub use case_sessions::CaseSessionRepository;
pub use cases::CaseRepository;
pub use clients::ClientRepository;
pub use documents::DocumentRepository;
pub use invoices::InvoiceRepository;
pub use schema::{DeletePolicy, ForeignKey, Table};
pub use settings::SettingsRepository;
pub use tasks::TaskRepository;
pub use users::UserRepository;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration failed.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// File system error (store directory, snapshots).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Unique constraint violation.
    #[error("{field} already exists: {value}")]
    Conflict { field: &'static str, value: String },

    /// Missing reference or delete blocked by dependent rows.
    #[error("integrity violation: {0}")]
    Integrity(String),

    /// Input rejected before writing.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
}

/// Handle to the office store.
///
/// Owns the connection pool. The pool holds a single connection, so at most
/// one operation touches the file at a time.
#[derive(Debug)]
pub struct Database {
    pool: SqlitePool,
    path: PathBuf,
    backups_dir: PathBuf,
}

impl Database {
    /// Open (creating if missing) the store and apply pending migrations.
    ///
    /// This does not provision any account; see
    /// [`crate::services::open_store`] for first-run setup.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Io` if the store directory cannot be created,
    /// `RepositoryError::Database` if the file cannot be opened, and
    /// `RepositoryError::Migration` if the schema cannot be applied.
    pub async fn open(config: &OfficeConfig) -> Result<Self, RepositoryError> {
        if let Some(parent) = config.database_path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let pool = create_pool(&config.database_path).await?;
        MIGRATOR.run(&pool).await?;

        tracing::info!(path = %config.database_path.display(), "Opened office store");

        Ok(Self {
            pool,
            path: config.database_path.clone(),
            backups_dir: config.backups_dir.clone(),
        })
    }

    /// The underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Location of the store file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory that receives timestamped snapshots.
    #[must_use]
    pub fn backups_dir(&self) -> &Path {
        &self.backups_dir
    }

    #[must_use]
    pub const fn users(&self) -> UserRepository<'_> {
        UserRepository::new(&self.pool)
    }

    #[must_use]
    pub const fn clients(&self) -> ClientRepository<'_> {
        ClientRepository::new(&self.pool)
    }

    #[must_use]
    pub const fn cases(&self) -> CaseRepository<'_> {
        CaseRepository::new(&self.pool)
    }

    #[must_use]
    pub const fn tasks(&self) -> TaskRepository<'_> {
        TaskRepository::new(&self.pool)
    }

    #[must_use]
    pub const fn appointments(&self) -> AppointmentRepository<'_> {
        AppointmentRepository::new(&self.pool)
    }

    #[must_use]
    pub const fn documents(&self) -> DocumentRepository<'_> {
        DocumentRepository::new(&self.pool)
    }

    #[must_use]
    pub const fn invoices(&self) -> InvoiceRepository<'_> {
        InvoiceRepository::new(&self.pool)
    }

    #[must_use]
    pub const fn case_sessions(&self) -> CaseSessionRepository<'_> {
        CaseSessionRepository::new(&self.pool)
    }

    #[must_use]
    pub const fn settings(&self) -> SettingsRepository<'_> {
        SettingsRepository::new(&self.pool)
    }

    /// Close the pool, waiting for the connection to be released.
    pub async fn close(self) {
        self.pool.close().await;
    }
}

/// Create the SQLite pool for `path`.
///
/// Foreign keys are enforced on every connection. The rollback journal
/// (instead of WAL) keeps the whole store in the single file that backups
/// copy.
async fn create_pool(path: &Path) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Delete);

    SqlitePoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
}

// =============================================================================
// Shared constraint helpers
// =============================================================================

/// Whether a row with `id` exists in `table`.
pub(crate) async fn row_exists(
    conn: &mut SqliteConnection,
    table: Table,
    id: i64,
) -> Result<bool, sqlx::Error> {
    let sql = format!("SELECT COUNT(*) FROM {} WHERE id = ?", table.name());
    let count: i64 = sqlx::query_scalar(&sql).bind(id).fetch_one(conn).await?;
    Ok(count > 0)
}

/// Fail with `Integrity` unless `id` exists in `table`.
pub(crate) async fn require_reference(
    conn: &mut SqliteConnection,
    table: Table,
    id: i64,
) -> Result<(), RepositoryError> {
    if row_exists(conn, table, id).await? {
        Ok(())
    } else {
        Err(RepositoryError::Integrity(format!(
            "{} {id} does not exist",
            table.label()
        )))
    }
}

/// Fail with `Integrity` unless every present reference exists.
pub(crate) async fn require_optional_reference(
    conn: &mut SqliteConnection,
    table: Table,
    id: Option<i64>,
) -> Result<(), RepositoryError> {
    match id {
        Some(id) => require_reference(conn, table, id).await,
        None => Ok(()),
    }
}

/// Fail with `Conflict` if `column = value` is already used by another row.
pub(crate) async fn require_unique(
    conn: &mut SqliteConnection,
    table: Table,
    column: &'static str,
    value: &str,
    excluding: Option<i64>,
) -> Result<(), RepositoryError> {
    let sql = format!(
        "SELECT COUNT(*) FROM {} WHERE {column} = ? AND id IS NOT ?",
        table.name()
    );
    let count: i64 = sqlx::query_scalar(&sql)
        .bind(value)
        .bind(excluding)
        .fetch_one(conn)
        .await?;

    if count > 0 {
        return Err(RepositoryError::Conflict {
            field: column,
            value: value.to_owned(),
        });
    }
    Ok(())
}

/// Translate constraint failures raised by SQLite itself.
///
/// Application checks run first; this covers whatever slips past them.
pub(crate) fn constraint_error(
    err: sqlx::Error,
    unique: (&'static str, &str),
) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            return RepositoryError::Conflict {
                field: unique.0,
                value: unique.1.to_owned(),
            };
        }
        if db_err.is_foreign_key_violation() {
            return RepositoryError::Integrity(db_err.message().to_owned());
        }
        if db_err.is_check_violation()
            || matches!(db_err.kind(), sqlx::error::ErrorKind::NotNullViolation)
        {
            return RepositoryError::Validation(ValidationError::new(
                "record",
                db_err.message().to_owned(),
            ));
        }
    }
    RepositoryError::Database(err)
}

/// Trim a required text field.
pub(crate) fn required_text(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::required(field));
    }
    Ok(value.to_owned())
}

/// Trim an optional text field, mapping blank input to `None`.
pub(crate) fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

/// Parse a stored enumeration value, reporting corruption on failure.
pub(crate) fn parse_stored<T>(raw: &str) -> Result<T, RepositoryError>
where
    T: std::str::FromStr<Err = law_office_core::UnknownVariant>,
{
    raw.parse()
        .map_err(|e: law_office_core::UnknownVariant| {
            RepositoryError::DataCorruption(format!("{e} in database"))
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use law_office_core::{CaseStatus, ClientId};
    use tempfile::TempDir;

    use crate::models::{CaseFields, ClientFields};

    async fn open_with_case() -> (TempDir, Database, ClientId) {
        let dir = TempDir::new().unwrap();
        let db = Database::open(&OfficeConfig::in_dir(dir.path())).await.unwrap();
        let client = db
            .clients()
            .create(
                &ClientFields {
                    name: "Acme".to_owned(),
                    ..ClientFields::default()
                },
                None,
            )
            .await
            .unwrap();
        db.cases()
            .create(&CaseFields::new("C-1", "Acme v. Beta", client.id), None)
            .await
            .unwrap();
        (dir, db, client.id)
    }

    #[test]
    fn test_required_text_trims() {
        assert_eq!(
            required_text("title", "  Smith v. Jones ").ok(),
            Some("Smith v. Jones".to_owned())
        );
        assert_eq!(
            required_text("title", "   "),
            Err(ValidationError::required("title"))
        );
    }

    #[test]
    fn test_optional_text_blank_is_none() {
        assert_eq!(optional_text(Some("  ")), None);
        assert_eq!(optional_text(None), None);
        assert_eq!(optional_text(Some(" x ")), Some("x".to_owned()));
    }

    #[test]
    fn test_parse_stored_reports_corruption() {
        assert!(matches!(parse_stored::<CaseStatus>("open"), Ok(CaseStatus::Open)));
        assert!(matches!(
            parse_stored::<CaseStatus>("archived"),
            Err(RepositoryError::DataCorruption(_))
        ));
    }

    #[tokio::test]
    async fn test_store_rejects_unknown_status() {
        let (_dir, db, _client) = open_with_case().await;

        let err = sqlx::query("UPDATE cases SET status = 'archived' WHERE case_number = 'C-1'")
            .execute(db.pool())
            .await
            .unwrap_err();
        assert!(matches!(
            constraint_error(err, ("case_number", "C-1")),
            RepositoryError::Validation(_)
        ));

        let case = db.cases().get_by_number("C-1").await.unwrap().unwrap();
        assert_eq!(case.status, CaseStatus::Open);
    }

    #[tokio::test]
    async fn test_store_restricts_client_delete_with_case() {
        let (_dir, db, client) = open_with_case().await;

        let err = sqlx::query("DELETE FROM clients WHERE id = ?")
            .bind(client.as_i64())
            .execute(db.pool())
            .await
            .unwrap_err();
        assert!(matches!(
            constraint_error(err, ("national_id", "")),
            RepositoryError::Integrity(_)
        ));
        assert!(db.clients().get(client).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_store_rejects_duplicate_case_number() {
        let (_dir, db, client) = open_with_case().await;

        let err = sqlx::query(
            "INSERT INTO cases (case_number, title, client_id, created_at, updated_at)
             VALUES ('C-1', 'Copy', ?, '2026-10-19T00:00:00Z', '2026-10-19T00:00:00Z')",
        )
        .bind(client.as_i64())
        .execute(db.pool())
        .await
        .unwrap_err();

        let mapped = constraint_error(err, ("case_number", "C-1"));
        assert!(matches!(
            mapped,
            RepositoryError::Conflict { field: "case_number", ref value } if value == "C-1"
        ));
        assert_eq!(db.cases().list_by_client(client).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_store_rejects_missing_required_column() {
        let (_dir, db, _client) = open_with_case().await;

        let err = sqlx::query(
            "INSERT INTO clients (name, created_at, updated_at)
             VALUES (NULL, '2026-10-19T00:00:00Z', '2026-10-19T00:00:00Z')",
        )
        .execute(db.pool())
        .await
        .unwrap_err();
        assert!(matches!(
            constraint_error(err, ("national_id", "")),
            RepositoryError::Validation(_)
        ));
    }
}
