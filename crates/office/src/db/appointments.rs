//! Appointment repository for database operations.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};

use law_office_core::{AppointmentId, AppointmentStatus, CaseId, ClientId, UserId};

use super::schema::Table;
use super::{
    RepositoryError, constraint_error, optional_text, parse_stored, require_optional_reference,
    required_text,
};
use crate::error::ValidationError;
use crate::models::{Appointment, AppointmentFields};

/// Internal row type for database queries.
#[derive(Debug, sqlx::FromRow)]
struct AppointmentRow {
    id: i64,
    title: String,
    description: Option<String>,
    case_id: Option<i64>,
    client_id: Option<i64>,
    appointment_date: NaiveDateTime,
    duration: i64,
    location: Option<String>,
    attendees: Option<String>,
    status: String,
    reminder_sent: bool,
    created_by: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AppointmentRow> for Appointment {
    type Error = RepositoryError;

    fn try_from(row: AppointmentRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: AppointmentId::new(row.id),
            title: row.title,
            description: row.description,
            case_id: row.case_id.map(CaseId::new),
            client_id: row.client_id.map(ClientId::new),
            appointment_date: row.appointment_date,
            duration: row.duration,
            location: row.location,
            attendees: row.attendees,
            status: parse_stored::<AppointmentStatus>(&row.status)?,
            reminder_sent: row.reminder_sent,
            created_by: row.created_by.map(UserId::new),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn validate(fields: &AppointmentFields) -> Result<String, RepositoryError> {
    let title = required_text("title", &fields.title)?;
    if fields.duration <= 0 {
        return Err(ValidationError::new("duration", "must be a positive number of minutes").into());
    }
    Ok(title)
}

async fn check_references(
    conn: &mut SqliteConnection,
    fields: &AppointmentFields,
) -> Result<(), RepositoryError> {
    require_optional_reference(
        &mut *conn,
        Table::Cases,
        fields.case_id.map(|id| id.as_i64()),
    )
    .await?;
    require_optional_reference(
        &mut *conn,
        Table::Clients,
        fields.client_id.map(|id| id.as_i64()),
    )
    .await
}

/// Repository for appointment database operations.
pub struct AppointmentRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AppointmentRepository<'a> {
    /// Create a new appointment repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get an appointment by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: AppointmentId) -> Result<Option<Appointment>, RepositoryError> {
        let row = sqlx::query_as::<_, AppointmentRow>(
            r"
            SELECT id, title, description, case_id, client_id, appointment_date, duration,
                   location, attendees, status, reminder_sent, created_by, created_at,
                   updated_at
            FROM appointments
            WHERE id = ?
            ",
        )
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// List appointments in chronological order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Appointment>, RepositoryError> {
        let rows = sqlx::query_as::<_, AppointmentRow>(
            r"
            SELECT id, title, description, case_id, client_id, appointment_date, duration,
                   location, attendees, status, reminder_sent, created_by, created_at,
                   updated_at
            FROM appointments
            ORDER BY appointment_date, id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// List appointments starting on `day`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_on(&self, day: NaiveDate) -> Result<Vec<Appointment>, RepositoryError> {
        let rows = sqlx::query_as::<_, AppointmentRow>(
            r"
            SELECT id, title, description, case_id, client_id, appointment_date, duration,
                   location, attendees, status, reminder_sent, created_by, created_at,
                   updated_at
            FROM appointments
            WHERE date(appointment_date) = date(?)
            ORDER BY appointment_date, id
            ",
        )
        .bind(day)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Create an appointment.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` for a blank title or a
    /// non-positive duration, and `RepositoryError::Integrity` if a referenced
    /// case or client does not exist.
    pub async fn create(
        &self,
        fields: &AppointmentFields,
        created_by: Option<UserId>,
    ) -> Result<Appointment, RepositoryError> {
        let title = validate(fields)?;
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        check_references(&mut *tx, fields).await?;

        let row = sqlx::query_as::<_, AppointmentRow>(
            r"
            INSERT INTO appointments (title, description, case_id, client_id, appointment_date,
                                      duration, location, attendees, status, reminder_sent,
                                      created_by, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id, title, description, case_id, client_id, appointment_date, duration,
                      location, attendees, status, reminder_sent, created_by, created_at,
                      updated_at
            ",
        )
        .bind(&title)
        .bind(optional_text(fields.description.as_deref()))
        .bind(fields.case_id.map(|id| id.as_i64()))
        .bind(fields.client_id.map(|id| id.as_i64()))
        .bind(fields.appointment_date)
        .bind(fields.duration)
        .bind(optional_text(fields.location.as_deref()))
        .bind(optional_text(fields.attendees.as_deref()))
        .bind(fields.status.as_str())
        .bind(fields.reminder_sent)
        .bind(created_by.map(|id| id.as_i64()))
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| constraint_error(e, ("title", title.as_str())))?;

        tx.commit().await?;

        row.try_into()
    }

    /// Replace an appointment's editable fields.
    ///
    /// # Errors
    ///
    /// Same as [`AppointmentRepository::create`], plus
    /// `RepositoryError::NotFound` if the appointment does not exist.
    pub async fn update(
        &self,
        id: AppointmentId,
        fields: &AppointmentFields,
    ) -> Result<Appointment, RepositoryError> {
        let title = validate(fields)?;

        let mut tx = self.pool.begin().await?;

        check_references(&mut *tx, fields).await?;

        let row = sqlx::query_as::<_, AppointmentRow>(
            r"
            UPDATE appointments
            SET title = ?, description = ?, case_id = ?, client_id = ?, appointment_date = ?,
                duration = ?, location = ?, attendees = ?, status = ?, reminder_sent = ?,
                updated_at = ?
            WHERE id = ?
            RETURNING id, title, description, case_id, client_id, appointment_date, duration,
                      location, attendees, status, reminder_sent, created_by, created_at,
                      updated_at
            ",
        )
        .bind(&title)
        .bind(optional_text(fields.description.as_deref()))
        .bind(fields.case_id.map(|id| id.as_i64()))
        .bind(fields.client_id.map(|id| id.as_i64()))
        .bind(fields.appointment_date)
        .bind(fields.duration)
        .bind(optional_text(fields.location.as_deref()))
        .bind(optional_text(fields.attendees.as_deref()))
        .bind(fields.status.as_str())
        .bind(fields.reminder_sent)
        .bind(Utc::now())
        .bind(id.as_i64())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| constraint_error(e, ("title", title.as_str())))?
        .ok_or(RepositoryError::NotFound("appointment"))?;

        tx.commit().await?;

        row.try_into()
    }

    /// Delete an appointment. Nothing references appointments.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the appointment does not exist.
    pub async fn delete(&self, id: AppointmentId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM appointments WHERE id = ?")
            .bind(id.as_i64())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound("appointment"));
        }
        Ok(())
    }
}
