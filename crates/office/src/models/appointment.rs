//! Appointment domain types.

use chrono::{DateTime, NaiveDateTime, Utc};

use law_office_core::{AppointmentId, AppointmentStatus, CaseId, ClientId, UserId};

/// Length of an appointment when none is given, in minutes.
pub const DEFAULT_DURATION_MINUTES: i64 = 60;

/// A calendar entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appointment {
    pub id: AppointmentId,
    pub title: String,
    pub description: Option<String>,
    pub case_id: Option<CaseId>,
    pub client_id: Option<ClientId>,
    pub appointment_date: NaiveDateTime,
    /// Length in minutes. Always positive.
    pub duration: i64,
    pub location: Option<String>,
    pub attendees: Option<String>,
    pub status: AppointmentStatus,
    pub reminder_sent: bool,
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editable appointment fields, used for both create and update.
#[derive(Debug, Clone)]
pub struct AppointmentFields {
    pub title: String,
    pub description: Option<String>,
    pub case_id: Option<CaseId>,
    pub client_id: Option<ClientId>,
    pub appointment_date: NaiveDateTime,
    pub duration: i64,
    pub location: Option<String>,
    pub attendees: Option<String>,
    pub status: AppointmentStatus,
    pub reminder_sent: bool,
}

impl AppointmentFields {
    /// A scheduled appointment of the default length.
    #[must_use]
    pub fn new(title: impl Into<String>, appointment_date: NaiveDateTime) -> Self {
        Self {
            title: title.into(),
            description: None,
            case_id: None,
            client_id: None,
            appointment_date,
            duration: DEFAULT_DURATION_MINUTES,
            location: None,
            attendees: None,
            status: AppointmentStatus::default(),
            reminder_sent: false,
        }
    }
}
