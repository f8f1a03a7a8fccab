//! Task repository for database operations.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};

use law_office_core::{CaseId, ClientId, TaskId, TaskPriority, TaskStatus, UserId};

use super::schema::Table;
use super::{
    RepositoryError, constraint_error, optional_text, parse_stored, require_optional_reference,
    required_text,
};
use crate::models::{Task, TaskFields};

/// Internal row type for database queries.
#[derive(Debug, sqlx::FromRow)]
struct TaskRow {
    id: i64,
    title: String,
    description: Option<String>,
    case_id: Option<i64>,
    client_id: Option<i64>,
    assigned_to: Option<i64>,
    priority: String,
    status: String,
    due_date: Option<NaiveDate>,
    reminder_date: Option<NaiveDateTime>,
    created_by: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TaskRow> for Task {
    type Error = RepositoryError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: TaskId::new(row.id),
            title: row.title,
            description: row.description,
            case_id: row.case_id.map(CaseId::new),
            client_id: row.client_id.map(ClientId::new),
            assigned_to: row.assigned_to.map(UserId::new),
            priority: parse_stored::<TaskPriority>(&row.priority)?,
            status: parse_stored::<TaskStatus>(&row.status)?,
            due_date: row.due_date,
            reminder_date: row.reminder_date,
            created_by: row.created_by.map(UserId::new),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Check every reference a task makes.
async fn check_references(
    conn: &mut SqliteConnection,
    fields: &TaskFields,
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
    .await?;
    require_optional_reference(
        &mut *conn,
        Table::Users,
        fields.assigned_to.map(|id| id.as_i64()),
    )
    .await
}

/// Repository for task database operations.
pub struct TaskRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> TaskRepository<'a> {
    /// Create a new task repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a task by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: TaskId) -> Result<Option<Task>, RepositoryError> {
        let row = sqlx::query_as::<_, TaskRow>(
            r"
            SELECT id, title, description, case_id, client_id, assigned_to, priority, status,
                   due_date, reminder_date, created_by, created_at, updated_at
            FROM tasks
            WHERE id = ?
            ",
        )
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// List all tasks, soonest due first. Tasks without a due date come last.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Task>, RepositoryError> {
        let rows = sqlx::query_as::<_, TaskRow>(
            r"
            SELECT id, title, description, case_id, client_id, assigned_to, priority, status,
                   due_date, reminder_date, created_by, created_at, updated_at
            FROM tasks
            ORDER BY due_date IS NULL, due_date, id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// List the pending and in-progress tasks assigned to a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_open_for(&self, user: UserId) -> Result<Vec<Task>, RepositoryError> {
        let rows = sqlx::query_as::<_, TaskRow>(
            r"
            SELECT id, title, description, case_id, client_id, assigned_to, priority, status,
                   due_date, reminder_date, created_by, created_at, updated_at
            FROM tasks
            WHERE assigned_to = ? AND status IN (?, ?)
            ORDER BY due_date IS NULL, due_date, id
            ",
        )
        .bind(user.as_i64())
        .bind(TaskStatus::Pending.as_str())
        .bind(TaskStatus::InProgress.as_str())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// List the tasks of one case.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_case(&self, case_id: CaseId) -> Result<Vec<Task>, RepositoryError> {
        let rows = sqlx::query_as::<_, TaskRow>(
            r"
            SELECT id, title, description, case_id, client_id, assigned_to, priority, status,
                   due_date, reminder_date, created_by, created_at, updated_at
            FROM tasks
            WHERE case_id = ?
            ORDER BY due_date IS NULL, due_date, id
            ",
        )
        .bind(case_id.as_i64())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Create a task.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` for a blank title and
    /// `RepositoryError::Integrity` if a referenced case, client or assignee
    /// does not exist.
    pub async fn create(
        &self,
        fields: &TaskFields,
        created_by: Option<UserId>,
    ) -> Result<Task, RepositoryError> {
        let title = required_text("title", &fields.title)?;
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        check_references(&mut *tx, fields).await?;

        let row = sqlx::query_as::<_, TaskRow>(
            r"
            INSERT INTO tasks (title, description, case_id, client_id, assigned_to, priority,
                               status, due_date, reminder_date, created_by, created_at,
                               updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id, title, description, case_id, client_id, assigned_to, priority, status,
                      due_date, reminder_date, created_by, created_at, updated_at
            ",
        )
        .bind(&title)
        .bind(optional_text(fields.description.as_deref()))
        .bind(fields.case_id.map(|id| id.as_i64()))
        .bind(fields.client_id.map(|id| id.as_i64()))
        .bind(fields.assigned_to.map(|id| id.as_i64()))
        .bind(fields.priority.as_str())
        .bind(fields.status.as_str())
        .bind(fields.due_date)
        .bind(fields.reminder_date)
        .bind(created_by.map(|id| id.as_i64()))
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| constraint_error(e, ("title", title.as_str())))?;

        tx.commit().await?;

        row.try_into()
    }

    /// Replace a task's editable fields.
    ///
    /// # Errors
    ///
    /// Same as [`TaskRepository::create`], plus `RepositoryError::NotFound`
    /// if the task does not exist.
    pub async fn update(&self, id: TaskId, fields: &TaskFields) -> Result<Task, RepositoryError> {
        let title = required_text("title", &fields.title)?;

        let mut tx = self.pool.begin().await?;

        check_references(&mut *tx, fields).await?;

        let row = sqlx::query_as::<_, TaskRow>(
            r"
            UPDATE tasks
            SET title = ?, description = ?, case_id = ?, client_id = ?, assigned_to = ?,
                priority = ?, status = ?, due_date = ?, reminder_date = ?, updated_at = ?
            WHERE id = ?
            RETURNING id, title, description, case_id, client_id, assigned_to, priority, status,
                      due_date, reminder_date, created_by, created_at, updated_at
            ",
        )
        .bind(&title)
        .bind(optional_text(fields.description.as_deref()))
        .bind(fields.case_id.map(|id| id.as_i64()))
        .bind(fields.client_id.map(|id| id.as_i64()))
        .bind(fields.assigned_to.map(|id| id.as_i64()))
        .bind(fields.priority.as_str())
        .bind(fields.status.as_str())
        .bind(fields.due_date)
        .bind(fields.reminder_date)
        .bind(Utc::now())
        .bind(id.as_i64())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| constraint_error(e, ("title", title.as_str())))?
        .ok_or(RepositoryError::NotFound("task"))?;

        tx.commit().await?;

        row.try_into()
    }

    /// Set only the status of a task.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the task does not exist.
    pub async fn set_status(&self, id: TaskId, status: TaskStatus) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE tasks SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(Utc::now())
            .bind(id.as_i64())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound("task"));
        }
        Ok(())
    }

    /// Delete a task. Nothing references tasks.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the task does not exist.
    pub async fn delete(&self, id: TaskId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id.as_i64())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound("task"));
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

    async fn open() -> (TempDir, Database) {
        let dir = TempDir::new().unwrap();
        let db = Database::open(&OfficeConfig::in_dir(dir.path())).await.unwrap();
        (dir, db)
    }

    fn titled(title: &str) -> TaskFields {
        TaskFields {
            title: title.to_owned(),
            ..TaskFields::default()
        }
    }

    #[tokio::test]
    async fn test_create_with_defaults() {
        let (_dir, db) = open().await;
        let task = db.tasks().create(&titled("File motion"), None).await.unwrap();

        assert_eq!(task.priority, TaskPriority::Medium);
        assert_eq!(task.status, TaskStatus::Pending);
    }

    #[tokio::test]
    async fn test_dangling_case_reference_rejected() {
        let (_dir, db) = open().await;
        let fields = TaskFields {
            case_id: Some(CaseId::new(5)),
            ..titled("Orphan")
        };

        let err = db.tasks().create(&fields, None).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Integrity(_)));
    }

    #[tokio::test]
    async fn test_list_orders_by_due_date_nulls_last() {
        let (_dir, db) = open().await;
        let date = |d| NaiveDate::from_ymd_opt(2026, 11, d);
        for (title, due) in [("later", date(20)), ("none", None), ("sooner", date(3))] {
            let fields = TaskFields {
                due_date: due,
                ..titled(title)
            };
            db.tasks().create(&fields, None).await.unwrap();
        }

        let titles: Vec<String> = db
            .tasks()
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["sooner", "later", "none"]);
    }

    #[tokio::test]
    async fn test_set_status_and_delete() {
        let (_dir, db) = open().await;
        let task = db.tasks().create(&titled("Call court"), None).await.unwrap();

        db.tasks().set_status(task.id, TaskStatus::Completed).await.unwrap();
        let done = db.tasks().get(task.id).await.unwrap().unwrap();
        assert_eq!(done.status, TaskStatus::Completed);

        db.tasks().delete(task.id).await.unwrap();
        assert!(matches!(
            db.tasks().delete(task.id).await,
            Err(RepositoryError::NotFound("task"))
        ));
    }
}
