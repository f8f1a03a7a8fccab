//! Case domain types.

use chrono::{DateTime, NaiveDate, Utc};

use law_office_core::{CaseId, CaseStatus, ClientId, UserId};

/// A legal case. Always owned by an existing client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Case {
    pub id: CaseId,
    /// Court or office reference. Globally unique.
    pub case_number: String,
    pub title: String,
    pub client_id: ClientId,
    pub court_name: Option<String>,
    pub case_type: Option<String>,
    pub opponent_name: Option<String>,
    pub status: CaseStatus,
    pub assigned_lawyer_id: Option<UserId>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A case row in listings, joined with display names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseSummary {
    pub case: Case,
    pub client_name: String,
    /// `None` when no lawyer is assigned.
    pub lawyer_name: Option<String>,
}

/// Editable case fields, used for both create and update.
#[derive(Debug, Clone)]
pub struct CaseFields {
    pub case_number: String,
    pub title: String,
    pub client_id: ClientId,
    pub court_name: Option<String>,
    pub case_type: Option<String>,
    pub opponent_name: Option<String>,
    pub status: CaseStatus,
    pub assigned_lawyer_id: Option<UserId>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub description: Option<String>,
}

impl CaseFields {
    /// Minimal fields for a new open case.
    #[must_use]
    pub fn new(
        case_number: impl Into<String>,
        title: impl Into<String>,
        client_id: ClientId,
    ) -> Self {
        Self {
            case_number: case_number.into(),
            title: title.into(),
            client_id,
            court_name: None,
            case_type: None,
            opponent_name: None,
            status: CaseStatus::default(),
            assigned_lawyer_id: None,
            start_date: None,
            end_date: None,
            description: None,
        }
    }
}
