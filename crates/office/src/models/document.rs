//! Document metadata types.
//!
//! File contents live outside the store; only the metadata is recorded here.

use chrono::{DateTime, Utc};

use law_office_core::{CaseId, ClientId, DocumentId, UserId};

/// Metadata for a stored file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: DocumentId,
    /// Name of the file on disk.
    pub filename: String,
    /// Name the file was uploaded with.
    pub original_filename: String,
    pub file_path: String,
    /// Size in bytes.
    pub file_size: Option<i64>,
    pub file_type: Option<String>,
    pub case_id: Option<CaseId>,
    pub client_id: Option<ClientId>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<String>,
    pub uploaded_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

/// Input for recording a new document.
#[derive(Debug, Clone, Default)]
pub struct NewDocument {
    pub filename: String,
    pub original_filename: String,
    pub file_path: String,
    pub file_size: Option<i64>,
    pub file_type: Option<String>,
    pub case_id: Option<CaseId>,
    pub client_id: Option<ClientId>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<String>,
}
