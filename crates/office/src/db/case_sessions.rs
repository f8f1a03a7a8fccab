//! Court hearing repository for database operations.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sqlx::SqlitePool;

use law_office_core::{CaseId, CaseSessionId, HearingStatus, UserId};

use super::schema::Table;
use super::{RepositoryError, constraint_error, optional_text, parse_stored, require_reference};
use crate::models::{CaseSession, CaseSessionFields};

/// Internal row type for database queries.
#[derive(Debug, sqlx::FromRow)]
struct CaseSessionRow {
    id: i64,
    case_id: i64,
    session_date: NaiveDateTime,
    court_name: Option<String>,
    session_type: Option<String>,
    status: String,
    notes: Option<String>,
    next_session_date: Option<NaiveDateTime>,
    created_by: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CaseSessionRow> for CaseSession {
    type Error = RepositoryError;

    fn try_from(row: CaseSessionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: CaseSessionId::new(row.id),
            case_id: CaseId::new(row.case_id),
            session_date: row.session_date,
            court_name: row.court_name,
            session_type: row.session_type,
            status: parse_stored::<HearingStatus>(&row.status)?,
            notes: row.notes,
            next_session_date: row.next_session_date,
            created_by: row.created_by.map(UserId::new),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for hearing database operations.
pub struct CaseSessionRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CaseSessionRepository<'a> {
    /// Create a new hearing repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a hearing by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: CaseSessionId) -> Result<Option<CaseSession>, RepositoryError> {
        let row = sqlx::query_as::<_, CaseSessionRow>(
            r"
            SELECT id, case_id, session_date, court_name, session_type, status, notes,
                   next_session_date, created_by, created_at, updated_at
            FROM case_sessions
            WHERE id = ?
            ",
        )
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// List the hearings of a case in date order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_case(&self, case_id: CaseId) -> Result<Vec<CaseSession>, RepositoryError> {
        let rows = sqlx::query_as::<_, CaseSessionRow>(
            r"
            SELECT id, case_id, session_date, court_name, session_type, status, notes,
                   next_session_date, created_by, created_at, updated_at
            FROM case_sessions
            WHERE case_id = ?
            ORDER BY session_date, id
            ",
        )
        .bind(case_id.as_i64())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// List scheduled hearings on or after `from`, soonest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_upcoming(
        &self,
        from: NaiveDate,
    ) -> Result<Vec<CaseSession>, RepositoryError> {
        let rows = sqlx::query_as::<_, CaseSessionRow>(
            r"
            SELECT id, case_id, session_date, court_name, session_type, status, notes,
                   next_session_date, created_by, created_at, updated_at
            FROM case_sessions
            WHERE status = ? AND date(session_date) >= date(?)
            ORDER BY session_date, id
            ",
        )
        .bind(HearingStatus::Scheduled.as_str())
        .bind(from)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Record a hearing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Integrity` if the case does not exist.
    pub async fn create(
        &self,
        fields: &CaseSessionFields,
        created_by: Option<UserId>,
    ) -> Result<CaseSession, RepositoryError> {
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        require_reference(&mut *tx, Table::Cases, fields.case_id.as_i64()).await?;

        let row = sqlx::query_as::<_, CaseSessionRow>(
            r"
            INSERT INTO case_sessions (case_id, session_date, court_name, session_type, status,
                                       notes, next_session_date, created_by, created_at,
                                       updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id, case_id, session_date, court_name, session_type, status, notes,
                      next_session_date, created_by, created_at, updated_at
            ",
        )
        .bind(fields.case_id.as_i64())
        .bind(fields.session_date)
        .bind(optional_text(fields.court_name.as_deref()))
        .bind(optional_text(fields.session_type.as_deref()))
        .bind(fields.status.as_str())
        .bind(optional_text(fields.notes.as_deref()))
        .bind(fields.next_session_date)
        .bind(created_by.map(|id| id.as_i64()))
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| constraint_error(e, ("case_id", "")))?;

        tx.commit().await?;

        row.try_into()
    }

    /// Replace a hearing's editable fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Integrity` if the case does not exist and
    /// `RepositoryError::NotFound` if the hearing does not exist.
    pub async fn update(
        &self,
        id: CaseSessionId,
        fields: &CaseSessionFields,
    ) -> Result<CaseSession, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        require_reference(&mut *tx, Table::Cases, fields.case_id.as_i64()).await?;

        let row = sqlx::query_as::<_, CaseSessionRow>(
            r"
            UPDATE case_sessions
            SET case_id = ?, session_date = ?, court_name = ?, session_type = ?, status = ?,
                notes = ?, next_session_date = ?, updated_at = ?
            WHERE id = ?
            RETURNING id, case_id, session_date, court_name, session_type, status, notes,
                      next_session_date, created_by, created_at, updated_at
            ",
        )
        .bind(fields.case_id.as_i64())
        .bind(fields.session_date)
        .bind(optional_text(fields.court_name.as_deref()))
        .bind(optional_text(fields.session_type.as_deref()))
        .bind(fields.status.as_str())
        .bind(optional_text(fields.notes.as_deref()))
        .bind(fields.next_session_date)
        .bind(Utc::now())
        .bind(id.as_i64())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| constraint_error(e, ("case_id", "")))?
        .ok_or(RepositoryError::NotFound("hearing"))?;

        tx.commit().await?;

        row.try_into()
    }

    /// Delete a hearing. Nothing references hearings.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the hearing does not exist.
    pub async fn delete(&self, id: CaseSessionId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM case_sessions WHERE id = ?")
            .bind(id.as_i64())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound("hearing"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::config::OfficeConfig;
    use crate::db::Database;
    use crate::models::{CaseFields, ClientFields};

    async fn open_with_case() -> (TempDir, Database, CaseId) {
        let dir = TempDir::new().unwrap();
        let db = Database::open(&OfficeConfig::in_dir(dir.path())).await.unwrap();
        let client = db
            .clients()
            .create(
                &ClientFields {
                    name: "Litigant".to_owned(),
                    ..ClientFields::default()
                },
                None,
            )
            .await
            .unwrap();
        let case = db
            .cases()
            .create(&CaseFields::new("S-1", "Hearings", client.id), None)
            .await
            .unwrap();
        (dir, db, case.id)
    }

    fn on(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 12, day)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    #[tokio::test]
    async fn test_hearing_requires_existing_case() {
        let (_dir, db, _case) = open_with_case().await;
        let err = db
            .case_sessions()
            .create(&CaseSessionFields::new(CaseId::new(31), on(1)), None)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Integrity(_)));
    }

    #[tokio::test]
    async fn test_postponing_updates_status_and_next_date() {
        let (_dir, db, case) = open_with_case().await;
        let hearing = db
            .case_sessions()
            .create(&CaseSessionFields::new(case, on(1)), None)
            .await
            .unwrap();
        assert_eq!(hearing.status, HearingStatus::Scheduled);

        let mut fields = CaseSessionFields::new(case, on(1));
        fields.status = HearingStatus::Postponed;
        fields.next_session_date = Some(on(15));
        let updated = db.case_sessions().update(hearing.id, &fields).await.unwrap();

        assert_eq!(updated.status, HearingStatus::Postponed);
        assert_eq!(updated.next_session_date, Some(on(15)));
    }

    #[tokio::test]
    async fn test_upcoming_only_lists_scheduled() {
        let (_dir, db, case) = open_with_case().await;
        let repo = db.case_sessions();
        repo.create(&CaseSessionFields::new(case, on(20)), None).await.unwrap();
        repo.create(&CaseSessionFields::new(case, on(2)), None).await.unwrap();
        let mut done = CaseSessionFields::new(case, on(10));
        done.status = HearingStatus::Completed;
        repo.create(&done, None).await.unwrap();

        let from = NaiveDate::from_ymd_opt(2026, 12, 5).unwrap();
        let upcoming = repo.list_upcoming(from).await.unwrap();
        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].session_date, on(20));
        assert_eq!(repo.list_by_case(case).await.unwrap().len(), 3);
    }
}
