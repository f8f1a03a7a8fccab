//! Case repository for database operations.
//!
//! A case always belongs to an existing client, and its case number is
//! unique across the store. Cases are deleted physically, but only while no
//! task, appointment, document, invoice or hearing references them.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;

use law_office_core::{CaseId, CaseStatus, ClientId, UserId};

use super::schema::{Table, ensure_no_dependents};
use super::{
    RepositoryError, constraint_error, optional_text, parse_stored, require_optional_reference,
    require_reference, require_unique, required_text, row_exists,
};
use crate::models::{Case, CaseFields, CaseSummary};

/// Internal row type for database queries.
#[derive(Debug, sqlx::FromRow)]
struct CaseRow {
    id: i64,
    case_number: String,
    title: String,
    client_id: i64,
    court_name: Option<String>,
    case_type: Option<String>,
    opponent_name: Option<String>,
    status: String,
    assigned_lawyer_id: Option<i64>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    description: Option<String>,
    created_by: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CaseRow> for Case {
    type Error = RepositoryError;

    fn try_from(row: CaseRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: CaseId::new(row.id),
            case_number: row.case_number,
            title: row.title,
            client_id: ClientId::new(row.client_id),
            court_name: row.court_name,
            case_type: row.case_type,
            opponent_name: row.opponent_name,
            status: parse_stored::<CaseStatus>(&row.status)?,
            assigned_lawyer_id: row.assigned_lawyer_id.map(UserId::new),
            start_date: row.start_date,
            end_date: row.end_date,
            description: row.description,
            created_by: row.created_by.map(UserId::new),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CaseSummaryRow {
    #[sqlx(flatten)]
    case: CaseRow,
    client_name: String,
    lawyer_name: Option<String>,
}

impl TryFrom<CaseSummaryRow> for CaseSummary {
    type Error = RepositoryError;

    fn try_from(row: CaseSummaryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            case: row.case.try_into()?,
            client_name: row.client_name,
            lawyer_name: row.lawyer_name,
        })
    }
}

/// Trimmed, validated case input.
struct Validated {
    case_number: String,
    title: String,
    court_name: Option<String>,
    case_type: Option<String>,
    opponent_name: Option<String>,
    description: Option<String>,
}

impl Validated {
    fn from_fields(fields: &CaseFields) -> Result<Self, RepositoryError> {
        Ok(Self {
            case_number: required_text("case_number", &fields.case_number)?,
            title: required_text("title", &fields.title)?,
            court_name: optional_text(fields.court_name.as_deref()),
            case_type: optional_text(fields.case_type.as_deref()),
            opponent_name: optional_text(fields.opponent_name.as_deref()),
            description: optional_text(fields.description.as_deref()),
        })
    }
}

/// Repository for case database operations.
pub struct CaseRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CaseRepository<'a> {
    /// Create a new case repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a case by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: CaseId) -> Result<Option<Case>, RepositoryError> {
        let row = sqlx::query_as::<_, CaseRow>(
            r"
            SELECT id, case_number, title, client_id, court_name, case_type, opponent_name,
                   status, assigned_lawyer_id, start_date, end_date, description,
                   created_by, created_at, updated_at
            FROM cases
            WHERE id = ?
            ",
        )
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get a case by its case number.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_number(&self, case_number: &str) -> Result<Option<Case>, RepositoryError> {
        let row = sqlx::query_as::<_, CaseRow>(
            r"
            SELECT id, case_number, title, client_id, court_name, case_type, opponent_name,
                   status, assigned_lawyer_id, start_date, end_date, description,
                   created_by, created_at, updated_at
            FROM cases
            WHERE case_number = ?
            ",
        )
        .bind(case_number.trim())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// List all cases, newest first, with client and lawyer names.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<CaseSummary>, RepositoryError> {
        let rows = sqlx::query_as::<_, CaseSummaryRow>(
            r"
            SELECT c.id, c.case_number, c.title, c.client_id, c.court_name, c.case_type,
                   c.opponent_name, c.status, c.assigned_lawyer_id, c.start_date, c.end_date,
                   c.description, c.created_by, c.created_at, c.updated_at,
                   cl.name AS client_name, u.full_name AS lawyer_name
            FROM cases c
            JOIN clients cl ON cl.id = c.client_id
            LEFT JOIN users u ON u.id = c.assigned_lawyer_id
            ORDER BY c.created_at DESC, c.id DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Find cases whose number, title or client name contains `term`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search(&self, term: &str) -> Result<Vec<CaseSummary>, RepositoryError> {
        let pattern = format!("%{}%", term.trim());

        let rows = sqlx::query_as::<_, CaseSummaryRow>(
            r"
            SELECT c.id, c.case_number, c.title, c.client_id, c.court_name, c.case_type,
                   c.opponent_name, c.status, c.assigned_lawyer_id, c.start_date, c.end_date,
                   c.description, c.created_by, c.created_at, c.updated_at,
                   cl.name AS client_name, u.full_name AS lawyer_name
            FROM cases c
            JOIN clients cl ON cl.id = c.client_id
            LEFT JOIN users u ON u.id = c.assigned_lawyer_id
            WHERE c.case_number LIKE ?1 OR c.title LIKE ?1 OR cl.name LIKE ?1
            ORDER BY c.created_at DESC, c.id DESC
            ",
        )
        .bind(pattern)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// List the cases of one client, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_client(&self, client_id: ClientId) -> Result<Vec<Case>, RepositoryError> {
        let rows = sqlx::query_as::<_, CaseRow>(
            r"
            SELECT id, case_number, title, client_id, court_name, case_type, opponent_name,
                   status, assigned_lawyer_id, start_date, end_date, description,
                   created_by, created_at, updated_at
            FROM cases
            WHERE client_id = ?
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(client_id.as_i64())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Create a case.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` for a blank case number or title,
    /// `RepositoryError::Integrity` if the client or assigned lawyer does not
    /// exist, and `RepositoryError::Conflict` if the case number is taken.
    pub async fn create(
        &self,
        fields: &CaseFields,
        created_by: Option<UserId>,
    ) -> Result<Case, RepositoryError> {
        let input = Validated::from_fields(fields)?;
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        require_reference(&mut *tx, Table::Clients, fields.client_id.as_i64()).await?;
        require_optional_reference(
            &mut *tx,
            Table::Users,
            fields.assigned_lawyer_id.map(|id| id.as_i64()),
        )
        .await?;
        require_unique(&mut *tx, Table::Cases, "case_number", &input.case_number, None).await?;

        let row = sqlx::query_as::<_, CaseRow>(
            r"
            INSERT INTO cases (case_number, title, client_id, court_name, case_type,
                               opponent_name, status, assigned_lawyer_id, start_date,
                               end_date, description, created_by, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id, case_number, title, client_id, court_name, case_type, opponent_name,
                      status, assigned_lawyer_id, start_date, end_date, description,
                      created_by, created_at, updated_at
            ",
        )
        .bind(&input.case_number)
        .bind(&input.title)
        .bind(fields.client_id.as_i64())
        .bind(&input.court_name)
        .bind(&input.case_type)
        .bind(&input.opponent_name)
        .bind(fields.status.as_str())
        .bind(fields.assigned_lawyer_id.map(|id| id.as_i64()))
        .bind(fields.start_date)
        .bind(fields.end_date)
        .bind(&input.description)
        .bind(created_by.map(|id| id.as_i64()))
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| constraint_error(e, ("case_number", input.case_number.as_str())))?;

        tx.commit().await?;

        row.try_into()
    }

    /// Replace a case's editable fields.
    ///
    /// # Errors
    ///
    /// Same as [`CaseRepository::create`], plus `RepositoryError::NotFound`
    /// if the case does not exist.
    pub async fn update(&self, id: CaseId, fields: &CaseFields) -> Result<Case, RepositoryError> {
        let input = Validated::from_fields(fields)?;

        let mut tx = self.pool.begin().await?;

        if !row_exists(&mut *tx, Table::Cases, id.as_i64()).await? {
            return Err(RepositoryError::NotFound("case"));
        }
        require_reference(&mut *tx, Table::Clients, fields.client_id.as_i64()).await?;
        require_optional_reference(
            &mut *tx,
            Table::Users,
            fields.assigned_lawyer_id.map(|id| id.as_i64()),
        )
        .await?;
        require_unique(
            &mut *tx,
            Table::Cases,
            "case_number",
            &input.case_number,
            Some(id.as_i64()),
        )
        .await?;

        let row = sqlx::query_as::<_, CaseRow>(
            r"
            UPDATE cases
            SET case_number = ?, title = ?, client_id = ?, court_name = ?, case_type = ?,
                opponent_name = ?, status = ?, assigned_lawyer_id = ?, start_date = ?,
                end_date = ?, description = ?, updated_at = ?
            WHERE id = ?
            RETURNING id, case_number, title, client_id, court_name, case_type, opponent_name,
                      status, assigned_lawyer_id, start_date, end_date, description,
                      created_by, created_at, updated_at
            ",
        )
        .bind(&input.case_number)
        .bind(&input.title)
        .bind(fields.client_id.as_i64())
        .bind(&input.court_name)
        .bind(&input.case_type)
        .bind(&input.opponent_name)
        .bind(fields.status.as_str())
        .bind(fields.assigned_lawyer_id.map(|id| id.as_i64()))
        .bind(fields.start_date)
        .bind(fields.end_date)
        .bind(&input.description)
        .bind(Utc::now())
        .bind(id.as_i64())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| constraint_error(e, ("case_number", input.case_number.as_str())))?;

        tx.commit().await?;

        row.try_into()
    }

    /// Delete a case that nothing references.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the case does not exist and
    /// `RepositoryError::Integrity` while dependent rows exist.
    pub async fn delete(&self, id: CaseId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        if !row_exists(&mut *tx, Table::Cases, id.as_i64()).await? {
            return Err(RepositoryError::NotFound("case"));
        }
        ensure_no_dependents(&mut *tx, Table::Cases, id.as_i64()).await?;

        sqlx::query("DELETE FROM cases WHERE id = ?")
            .bind(id.as_i64())
            .execute(&mut *tx)
            .await
            .map_err(|e| constraint_error(e, ("id", "")))?;

        tx.commit().await?;

        Ok(())
    }
}
