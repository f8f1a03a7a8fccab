//! Document metadata repository.
//!
//! Document rows are written once and never edited. Deleting a row does not
//! touch the file it describes.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use law_office_core::{CaseId, ClientId, DocumentId, UserId};

use super::schema::Table;
use super::{
    RepositoryError, constraint_error, optional_text, require_optional_reference, required_text,
};
use crate::error::ValidationError;
use crate::models::{Document, NewDocument};

/// Internal row type for database queries.
#[derive(Debug, sqlx::FromRow)]
struct DocumentRow {
    id: i64,
    filename: String,
    original_filename: String,
    file_path: String,
    file_size: Option<i64>,
    file_type: Option<String>,
    case_id: Option<i64>,
    client_id: Option<i64>,
    title: Option<String>,
    description: Option<String>,
    tags: Option<String>,
    uploaded_by: Option<i64>,
    created_at: DateTime<Utc>,
}

impl From<DocumentRow> for Document {
    fn from(row: DocumentRow) -> Self {
        Self {
            id: DocumentId::new(row.id),
            filename: row.filename,
            original_filename: row.original_filename,
            file_path: row.file_path,
            file_size: row.file_size,
            file_type: row.file_type,
            case_id: row.case_id.map(CaseId::new),
            client_id: row.client_id.map(ClientId::new),
            title: row.title,
            description: row.description,
            tags: row.tags,
            uploaded_by: row.uploaded_by.map(UserId::new),
            created_at: row.created_at,
        }
    }
}

/// Repository for document metadata.
pub struct DocumentRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> DocumentRepository<'a> {
    /// Create a new document repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a document by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: DocumentId) -> Result<Option<Document>, RepositoryError> {
        let row = sqlx::query_as::<_, DocumentRow>(
            r"
            SELECT id, filename, original_filename, file_path, file_size, file_type, case_id,
                   client_id, title, description, tags, uploaded_by, created_at
            FROM documents
            WHERE id = ?
            ",
        )
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// List the documents attached to a case, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_case(&self, case_id: CaseId) -> Result<Vec<Document>, RepositoryError> {
        let rows = sqlx::query_as::<_, DocumentRow>(
            r"
            SELECT id, filename, original_filename, file_path, file_size, file_type, case_id,
                   client_id, title, description, tags, uploaded_by, created_at
            FROM documents
            WHERE case_id = ?
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(case_id.as_i64())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// List the documents attached to a client, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_client(
        &self,
        client_id: ClientId,
    ) -> Result<Vec<Document>, RepositoryError> {
        let rows = sqlx::query_as::<_, DocumentRow>(
            r"
            SELECT id, filename, original_filename, file_path, file_size, file_type, case_id,
                   client_id, title, description, tags, uploaded_by, created_at
            FROM documents
            WHERE client_id = ?
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(client_id.as_i64())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Record a document.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` for blank file names or path or a
    /// negative size, and `RepositoryError::Integrity` if a referenced case or
    /// client does not exist.
    pub async fn create(
        &self,
        doc: &NewDocument,
        uploaded_by: Option<UserId>,
    ) -> Result<Document, RepositoryError> {
        let filename = required_text("filename", &doc.filename)?;
        let original_filename = required_text("original_filename", &doc.original_filename)?;
        let file_path = required_text("file_path", &doc.file_path)?;
        if doc.file_size.is_some_and(|size| size < 0) {
            return Err(ValidationError::new("file_size", "cannot be negative").into());
        }

        let mut tx = self.pool.begin().await?;

        require_optional_reference(
            &mut *tx,
            Table::Cases,
            doc.case_id.map(|id| id.as_i64()),
        )
        .await?;
        require_optional_reference(
            &mut *tx,
            Table::Clients,
            doc.client_id.map(|id| id.as_i64()),
        )
        .await?;

        let row = sqlx::query_as::<_, DocumentRow>(
            r"
            INSERT INTO documents (filename, original_filename, file_path, file_size, file_type,
                                   case_id, client_id, title, description, tags, uploaded_by,
                                   created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id, filename, original_filename, file_path, file_size, file_type, case_id,
                      client_id, title, description, tags, uploaded_by, created_at
            ",
        )
        .bind(&filename)
        .bind(&original_filename)
        .bind(&file_path)
        .bind(doc.file_size)
        .bind(optional_text(doc.file_type.as_deref()))
        .bind(doc.case_id.map(|id| id.as_i64()))
        .bind(doc.client_id.map(|id| id.as_i64()))
        .bind(optional_text(doc.title.as_deref()))
        .bind(optional_text(doc.description.as_deref()))
        .bind(optional_text(doc.tags.as_deref()))
        .bind(uploaded_by.map(|id| id.as_i64()))
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| constraint_error(e, ("filename", filename.as_str())))?;

        tx.commit().await?;

        Ok(row.into())
    }

    /// Delete a document's metadata.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the document does not exist.
    pub async fn delete(&self, id: DocumentId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM documents WHERE id = ?")
            .bind(id.as_i64())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound("document"));
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
    use crate::models::{ClientFields, NewDocument};

    async fn open() -> (TempDir, Database) {
        let dir = TempDir::new().unwrap();
        let db = Database::open(&OfficeConfig::in_dir(dir.path())).await.unwrap();
        (dir, db)
    }

    fn contract() -> NewDocument {
        NewDocument {
            filename: "a1b2.pdf".to_owned(),
            original_filename: "Contract.pdf".to_owned(),
            file_path: "documents/a1b2.pdf".to_owned(),
            file_size: Some(2048),
            ..NewDocument::default()
        }
    }

    #[tokio::test]
    async fn test_document_blocks_client_delete_until_removed() {
        let (_dir, db) = open().await;
        let client = db
            .clients()
            .create(
                &ClientFields {
                    name: "Holder".to_owned(),
                    ..ClientFields::default()
                },
                None,
            )
            .await
            .unwrap();
        let doc = db
            .documents()
            .create(
                &NewDocument {
                    client_id: Some(client.id),
                    ..contract()
                },
                None,
            )
            .await
            .unwrap();

        assert_eq!(db.documents().list_by_client(client.id).await.unwrap().len(), 1);
        assert!(matches!(
            db.clients().delete(client.id).await,
            Err(RepositoryError::Integrity(_))
        ));

        db.documents().delete(doc.id).await.unwrap();
        db.clients().delete(client.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_negative_size_rejected() {
        let (_dir, db) = open().await;
        let doc = NewDocument {
            file_size: Some(-1),
            ..contract()
        };
        assert!(matches!(
            db.documents().create(&doc, None).await,
            Err(RepositoryError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_path_rejected() {
        let (_dir, db) = open().await;
        let doc = NewDocument {
            file_path: String::new(),
            ..contract()
        };
        assert!(matches!(
            db.documents().create(&doc, None).await,
            Err(RepositoryError::Validation(_))
        ));
    }
}
