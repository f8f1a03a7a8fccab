//! Court hearing types.

use chrono::{DateTime, NaiveDateTime, Utc};

use law_office_core::{CaseId, CaseSessionId, HearingStatus, UserId};

/// A court hearing of a case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseSession {
    pub id: CaseSessionId,
    pub case_id: CaseId,
    pub session_date: NaiveDateTime,
    pub court_name: Option<String>,
    pub session_type: Option<String>,
    pub status: HearingStatus,
    pub notes: Option<String>,
    /// Date the court adjourned to, if any.
    pub next_session_date: Option<NaiveDateTime>,
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editable hearing fields, used for both create and update.
#[derive(Debug, Clone)]
pub struct CaseSessionFields {
    pub case_id: CaseId,
    pub session_date: NaiveDateTime,
    pub court_name: Option<String>,
    pub session_type: Option<String>,
    pub status: HearingStatus,
    pub notes: Option<String>,
    pub next_session_date: Option<NaiveDateTime>,
}

impl CaseSessionFields {
    #[must_use]
    pub fn new(case_id: CaseId, session_date: NaiveDateTime) -> Self {
        Self {
            case_id,
            session_date,
            court_name: None,
            session_type: None,
            status: HearingStatus::default(),
            notes: None,
            next_session_date: None,
        }
    }
}
