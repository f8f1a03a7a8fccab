//! Task domain types.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use law_office_core::{CaseId, ClientId, TaskId, TaskPriority, TaskStatus, UserId};

/// A to-do item, optionally tied to a case or client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: Option<String>,
    pub case_id: Option<CaseId>,
    pub client_id: Option<ClientId>,
    pub assigned_to: Option<UserId>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub due_date: Option<NaiveDate>,
    pub reminder_date: Option<NaiveDateTime>,
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editable task fields, used for both create and update.
#[derive(Debug, Clone, Default)]
pub struct TaskFields {
    pub title: String,
    pub description: Option<String>,
    pub case_id: Option<CaseId>,
    pub client_id: Option<ClientId>,
    pub assigned_to: Option<UserId>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub due_date: Option<NaiveDate>,
    pub reminder_date: Option<NaiveDateTime>,
}
