//! Client repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use law_office_core::{ClientId, Email, UserId};

use super::schema::{Table, ensure_no_dependents};
use super::{
    RepositoryError, constraint_error, optional_text, require_unique, required_text, row_exists,
};
use crate::models::{Client, ClientFields, ClientSummary};

/// Internal row type for database queries.
#[derive(Debug, sqlx::FromRow)]
struct ClientRow {
    id: i64,
    name: String,
    phone: Option<String>,
    email: Option<String>,
    national_id: Option<String>,
    address: Option<String>,
    notes: Option<String>,
    created_by: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ClientRow> for Client {
    type Error = RepositoryError;

    fn try_from(row: ClientRow) -> Result<Self, Self::Error> {
        let email = row
            .email
            .as_deref()
            .map(Email::parse)
            .transpose()
            .map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
            })?;

        Ok(Self {
            id: ClientId::new(row.id),
            name: row.name,
            phone: row.phone,
            email,
            national_id: row.national_id,
            address: row.address,
            notes: row.notes,
            created_by: row.created_by.map(UserId::new),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ClientSummaryRow {
    #[sqlx(flatten)]
    client: ClientRow,
    case_count: i64,
}

impl TryFrom<ClientSummaryRow> for ClientSummary {
    type Error = RepositoryError;

    fn try_from(row: ClientSummaryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            client: row.client.try_into()?,
            case_count: row.case_count,
        })
    }
}

/// Trimmed, validated client input.
struct Validated {
    name: String,
    phone: Option<String>,
    email: Option<String>,
    national_id: Option<String>,
    address: Option<String>,
    notes: Option<String>,
}

impl Validated {
    fn from_fields(fields: &ClientFields) -> Result<Self, RepositoryError> {
        Ok(Self {
            name: required_text("name", &fields.name)?,
            phone: optional_text(fields.phone.as_deref()),
            email: fields.email.as_ref().map(|e| e.as_str().to_owned()),
            national_id: optional_text(fields.national_id.as_deref()),
            address: optional_text(fields.address.as_deref()),
            notes: optional_text(fields.notes.as_deref()),
        })
    }

    fn national_id(&self) -> &str {
        self.national_id.as_deref().unwrap_or_default()
    }
}

/// Repository for client database operations.
pub struct ClientRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ClientRepository<'a> {
    /// Create a new client repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a client by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ClientId) -> Result<Option<Client>, RepositoryError> {
        let row = sqlx::query_as::<_, ClientRow>(
            r"
            SELECT id, name, phone, email, national_id, address, notes,
                   created_by, created_at, updated_at
            FROM clients
            WHERE id = ?
            ",
        )
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// List all clients by name, each with its number of cases.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<ClientSummary>, RepositoryError> {
        let rows = sqlx::query_as::<_, ClientSummaryRow>(
            r"
            SELECT c.id, c.name, c.phone, c.email, c.national_id, c.address, c.notes,
                   c.created_by, c.created_at, c.updated_at,
                   COUNT(cs.id) AS case_count
            FROM clients c
            LEFT JOIN cases cs ON cs.client_id = c.id
            GROUP BY c.id
            ORDER BY c.name, c.id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Find clients whose name, phone, email or national ID contains `term`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search(&self, term: &str) -> Result<Vec<Client>, RepositoryError> {
        let pattern = format!("%{}%", term.trim());

        let rows = sqlx::query_as::<_, ClientRow>(
            r"
            SELECT id, name, phone, email, national_id, address, notes,
                   created_by, created_at, updated_at
            FROM clients
            WHERE name LIKE ?1 OR phone LIKE ?1 OR email LIKE ?1 OR national_id LIKE ?1
            ORDER BY name, id
            ",
        )
        .bind(pattern)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Create a client.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` if the name is blank and
    /// `RepositoryError::Conflict` if the national ID is already recorded.
    pub async fn create(
        &self,
        fields: &ClientFields,
        created_by: Option<UserId>,
    ) -> Result<Client, RepositoryError> {
        let input = Validated::from_fields(fields)?;
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        if let Some(national_id) = &input.national_id {
            require_unique(&mut *tx, Table::Clients, "national_id", national_id, None).await?;
        }

        let row = sqlx::query_as::<_, ClientRow>(
            r"
            INSERT INTO clients (name, phone, email, national_id, address, notes,
                                 created_by, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id, name, phone, email, national_id, address, notes,
                      created_by, created_at, updated_at
            ",
        )
        .bind(&input.name)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.national_id)
        .bind(&input.address)
        .bind(&input.notes)
        .bind(created_by.map(|id| id.as_i64()))
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| constraint_error(e, ("national_id", input.national_id())))?;

        tx.commit().await?;

        row.try_into()
    }

    /// Replace a client's editable fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the client does not exist,
    /// `RepositoryError::Validation` if the name is blank and
    /// `RepositoryError::Conflict` if the national ID belongs to another client.
    pub async fn update(
        &self,
        id: ClientId,
        fields: &ClientFields,
    ) -> Result<Client, RepositoryError> {
        let input = Validated::from_fields(fields)?;

        let mut tx = self.pool.begin().await?;

        if let Some(national_id) = &input.national_id {
            require_unique(
                &mut *tx,
                Table::Clients,
                "national_id",
                national_id,
                Some(id.as_i64()),
            )
            .await?;
        }

        let row = sqlx::query_as::<_, ClientRow>(
            r"
            UPDATE clients
            SET name = ?, phone = ?, email = ?, national_id = ?, address = ?, notes = ?,
                updated_at = ?
            WHERE id = ?
            RETURNING id, name, phone, email, national_id, address, notes,
                      created_by, created_at, updated_at
            ",
        )
        .bind(&input.name)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.national_id)
        .bind(&input.address)
        .bind(&input.notes)
        .bind(Utc::now())
        .bind(id.as_i64())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| constraint_error(e, ("national_id", input.national_id())))?
        .ok_or(RepositoryError::NotFound("client"))?;

        tx.commit().await?;

        row.try_into()
    }

    /// Delete a client that nothing references.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the client does not exist and
    /// `RepositoryError::Integrity` if cases, tasks, appointments, documents
    /// or invoices still reference it.
    pub async fn delete(&self, id: ClientId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        if !row_exists(&mut *tx, Table::Clients, id.as_i64()).await? {
            return Err(RepositoryError::NotFound("client"));
        }
        ensure_no_dependents(&mut *tx, Table::Clients, id.as_i64()).await?;

        sqlx::query("DELETE FROM clients WHERE id = ?")
            .bind(id.as_i64())
            .execute(&mut *tx)
            .await
            .map_err(|e| constraint_error(e, ("id", "")))?;

        tx.commit().await?;

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
    use crate::models::CaseFields;

    async fn open() -> (TempDir, Database) {
        let dir = TempDir::new().unwrap();
        let db = Database::open(&OfficeConfig::in_dir(dir.path())).await.unwrap();
        (dir, db)
    }

    fn named(name: &str) -> ClientFields {
        ClientFields {
            name: name.to_owned(),
            ..ClientFields::default()
        }
    }

    #[tokio::test]
    async fn test_create_trims_and_blanks_become_none() {
        let (_dir, db) = open().await;
        let fields = ClientFields {
            name: "  Acme Ltd ".to_owned(),
            phone: Some("   ".to_owned()),
            ..ClientFields::default()
        };

        let client = db.clients().create(&fields, None).await.unwrap();
        assert_eq!(client.name, "Acme Ltd");
        assert_eq!(client.phone, None);
    }

    #[tokio::test]
    async fn test_national_id_unique_when_present() {
        let (_dir, db) = open().await;
        let repo = db.clients();
        let with_id = |name: &str| ClientFields {
            national_id: Some("29001011234567".to_owned()),
            ..named(name)
        };

        repo.create(&named("No Id One"), None).await.unwrap();
        repo.create(&named("No Id Two"), None).await.unwrap();
        let first = repo.create(&with_id("First"), None).await.unwrap();

        let err = repo.create(&with_id("Second"), None).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict { field: "national_id", .. }));

        // Saving the owner with its own national ID is fine.
        repo.update(first.id, &with_id("First Renamed")).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_blocked_by_case() {
        let (_dir, db) = open().await;
        let client = db.clients().create(&named("Blocked"), None).await.unwrap();
        db.cases()
            .create(&CaseFields::new("C-1", "Matter", client.id), None)
            .await
            .unwrap();

        let err = db.clients().delete(client.id).await.unwrap_err();
        match err {
            RepositoryError::Integrity(message) => assert!(message.contains("1 case(s)")),
            other => panic!("expected integrity error, got {other:?}"),
        }
        assert!(db.clients().get(client.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_unreferenced_and_missing() {
        let (_dir, db) = open().await;
        let client = db.clients().create(&named("Gone"), None).await.unwrap();

        db.clients().delete(client.id).await.unwrap();
        assert!(db.clients().get(client.id).await.unwrap().is_none());
        assert!(matches!(
            db.clients().delete(client.id).await,
            Err(RepositoryError::NotFound("client"))
        ));
    }

    #[tokio::test]
    async fn test_list_counts_cases_and_search() {
        let (_dir, db) = open().await;
        let acme = db.clients().create(&named("Acme"), None).await.unwrap();
        db.clients().create(&named("Zenith"), None).await.unwrap();
        db.cases()
            .create(&CaseFields::new("A-1", "One", acme.id), None)
            .await
            .unwrap();
        db.cases()
            .create(&CaseFields::new("A-2", "Two", acme.id), None)
            .await
            .unwrap();

        let listed = db.clients().list().await.unwrap();
        let counts: Vec<(&str, i64)> = listed
            .iter()
            .map(|s| (s.client.name.as_str(), s.case_count))
            .collect();
        assert_eq!(counts, vec![("Acme", 2), ("Zenith", 0)]);

        let found = db.clients().search("eni").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Zenith");
    }

    #[tokio::test]
    async fn test_update_missing_client() {
        let (_dir, db) = open().await;
        let err = db
            .clients()
            .update(ClientId::new(42), &named("Nobody"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound("client")));
    }
}
