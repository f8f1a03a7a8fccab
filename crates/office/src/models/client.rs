//! Client domain types.

use chrono::{DateTime, Utc};

use law_office_core::{ClientId, Email, UserId};

/// A person or company the office represents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Client {
    pub id: ClientId,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<Email>,
    /// National identity number. Unique when present.
    pub national_id: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A client row in listings, with the number of cases it owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSummary {
    pub client: Client,
    pub case_count: i64,
}

/// Editable client fields, used for both create and update.
#[derive(Debug, Clone, Default)]
pub struct ClientFields {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<Email>,
    pub national_id: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
}
