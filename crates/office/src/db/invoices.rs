//! Invoice repository for database operations.
//!
//! Amounts are stored as decimal text. The total is always derived from the
//! amount and tax on write.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{SqliteConnection, SqlitePool};

use law_office_core::{Amount, CaseId, ClientId, InvoiceId, InvoiceStatus, UserId};

use super::schema::Table;
use super::{
    RepositoryError, constraint_error, optional_text, parse_stored, require_optional_reference,
    require_reference, require_unique, required_text,
};
use crate::models::{Invoice, InvoiceFields};

/// Internal row type for database queries.
#[derive(Debug, sqlx::FromRow)]
struct InvoiceRow {
    id: i64,
    invoice_number: String,
    client_id: i64,
    case_id: Option<i64>,
    amount: String,
    tax_amount: String,
    total_amount: String,
    description: Option<String>,
    issue_date: NaiveDate,
    due_date: Option<NaiveDate>,
    status: String,
    payment_date: Option<NaiveDate>,
    payment_method: Option<String>,
    notes: Option<String>,
    created_by: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_amount(raw: &str) -> Result<Amount, RepositoryError> {
    raw.parse::<Amount>()
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid amount in database: {e}")))
}

impl TryFrom<InvoiceRow> for Invoice {
    type Error = RepositoryError;

    fn try_from(row: InvoiceRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: InvoiceId::new(row.id),
            invoice_number: row.invoice_number,
            client_id: ClientId::new(row.client_id),
            case_id: row.case_id.map(CaseId::new),
            amount: parse_amount(&row.amount)?,
            tax_amount: parse_amount(&row.tax_amount)?,
            total_amount: parse_amount(&row.total_amount)?,
            description: row.description,
            issue_date: row.issue_date,
            due_date: row.due_date,
            status: parse_stored::<InvoiceStatus>(&row.status)?,
            payment_date: row.payment_date,
            payment_method: row.payment_method,
            notes: row.notes,
            created_by: row.created_by.map(UserId::new),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

async fn check_references(
    conn: &mut SqliteConnection,
    fields: &InvoiceFields,
) -> Result<(), RepositoryError> {
    require_reference(&mut *conn, Table::Clients, fields.client_id.as_i64()).await?;
    require_optional_reference(&mut *conn, Table::Cases, fields.case_id.map(|id| id.as_i64())).await
}

/// Repository for invoice database operations.
pub struct InvoiceRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> InvoiceRepository<'a> {
    /// Create a new invoice repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get an invoice by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails and
    /// `RepositoryError::DataCorruption` if a stored amount is unreadable.
    pub async fn get(&self, id: InvoiceId) -> Result<Option<Invoice>, RepositoryError> {
        let row = sqlx::query_as::<_, InvoiceRow>(
            r"
            SELECT id, invoice_number, client_id, case_id, amount, tax_amount, total_amount,
                   description, issue_date, due_date, status, payment_date, payment_method,
                   notes, created_by, created_at, updated_at
            FROM invoices
            WHERE id = ?
            ",
        )
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// List all invoices, most recently issued first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Invoice>, RepositoryError> {
        let rows = sqlx::query_as::<_, InvoiceRow>(
            r"
            SELECT id, invoice_number, client_id, case_id, amount, tax_amount, total_amount,
                   description, issue_date, due_date, status, payment_date, payment_method,
                   notes, created_by, created_at, updated_at
            FROM invoices
            ORDER BY issue_date DESC, id DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// List the invoices of one client, most recently issued first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_client(
        &self,
        client_id: ClientId,
    ) -> Result<Vec<Invoice>, RepositoryError> {
        let rows = sqlx::query_as::<_, InvoiceRow>(
            r"
            SELECT id, invoice_number, client_id, case_id, amount, tax_amount, total_amount,
                   description, issue_date, due_date, status, payment_date, payment_method,
                   notes, created_by, created_at, updated_at
            FROM invoices
            WHERE client_id = ?
            ORDER BY issue_date DESC, id DESC
            ",
        )
        .bind(client_id.as_i64())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// List sent and overdue invoices, oldest due first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_outstanding(&self) -> Result<Vec<Invoice>, RepositoryError> {
        let rows = sqlx::query_as::<_, InvoiceRow>(
            r"
            SELECT id, invoice_number, client_id, case_id, amount, tax_amount, total_amount,
                   description, issue_date, due_date, status, payment_date, payment_method,
                   notes, created_by, created_at, updated_at
            FROM invoices
            WHERE status IN (?, ?)
            ORDER BY due_date IS NULL, due_date, id
            ",
        )
        .bind(InvoiceStatus::Sent.as_str())
        .bind(InvoiceStatus::Overdue.as_str())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Create an invoice.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` for a blank invoice number or a
    /// total too large to store,
    /// `RepositoryError::Integrity` if the client or case does not exist, and
    /// `RepositoryError::Conflict` if the invoice number is taken.
    pub async fn create(
        &self,
        fields: &InvoiceFields,
        created_by: Option<UserId>,
    ) -> Result<Invoice, RepositoryError> {
        let number = required_text("invoice_number", &fields.invoice_number)?;
        let total = fields.total()?;
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        check_references(&mut *tx, fields).await?;
        require_unique(&mut *tx, Table::Invoices, "invoice_number", &number, None).await?;

        let row = sqlx::query_as::<_, InvoiceRow>(
            r"
            INSERT INTO invoices (invoice_number, client_id, case_id, amount, tax_amount,
                                  total_amount, description, issue_date, due_date, status,
                                  payment_date, payment_method, notes, created_by,
                                  created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id, invoice_number, client_id, case_id, amount, tax_amount, total_amount,
                      description, issue_date, due_date, status, payment_date, payment_method,
                      notes, created_by, created_at, updated_at
            ",
        )
        .bind(&number)
        .bind(fields.client_id.as_i64())
        .bind(fields.case_id.map(|id| id.as_i64()))
        .bind(fields.amount.to_string())
        .bind(fields.tax_amount.to_string())
        .bind(total.to_string())
        .bind(optional_text(fields.description.as_deref()))
        .bind(fields.issue_date)
        .bind(fields.due_date)
        .bind(fields.status.as_str())
        .bind(fields.payment_date)
        .bind(optional_text(fields.payment_method.as_deref()))
        .bind(optional_text(fields.notes.as_deref()))
        .bind(created_by.map(|id| id.as_i64()))
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| constraint_error(e, ("invoice_number", number.as_str())))?;

        tx.commit().await?;

        row.try_into()
    }

    /// Replace an invoice's editable fields.
    ///
    /// # Errors
    ///
    /// Same as [`InvoiceRepository::create`], plus `RepositoryError::NotFound`
    /// if the invoice does not exist.
    pub async fn update(
        &self,
        id: InvoiceId,
        fields: &InvoiceFields,
    ) -> Result<Invoice, RepositoryError> {
        let number = required_text("invoice_number", &fields.invoice_number)?;
        let total = fields.total()?;

        let mut tx = self.pool.begin().await?;

        check_references(&mut *tx, fields).await?;
        require_unique(
            &mut *tx,
            Table::Invoices,
            "invoice_number",
            &number,
            Some(id.as_i64()),
        )
        .await?;

        let row = sqlx::query_as::<_, InvoiceRow>(
            r"
            UPDATE invoices
            SET invoice_number = ?, client_id = ?, case_id = ?, amount = ?, tax_amount = ?,
                total_amount = ?, description = ?, issue_date = ?, due_date = ?, status = ?,
                payment_date = ?, payment_method = ?, notes = ?, updated_at = ?
            WHERE id = ?
            RETURNING id, invoice_number, client_id, case_id, amount, tax_amount, total_amount,
                      description, issue_date, due_date, status, payment_date, payment_method,
                      notes, created_by, created_at, updated_at
            ",
        )
        .bind(&number)
        .bind(fields.client_id.as_i64())
        .bind(fields.case_id.map(|id| id.as_i64()))
        .bind(fields.amount.to_string())
        .bind(fields.tax_amount.to_string())
        .bind(total.to_string())
        .bind(optional_text(fields.description.as_deref()))
        .bind(fields.issue_date)
        .bind(fields.due_date)
        .bind(fields.status.as_str())
        .bind(fields.payment_date)
        .bind(optional_text(fields.payment_method.as_deref()))
        .bind(optional_text(fields.notes.as_deref()))
        .bind(Utc::now())
        .bind(id.as_i64())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| constraint_error(e, ("invoice_number", number.as_str())))?
        .ok_or(RepositoryError::NotFound("invoice"))?;

        tx.commit().await?;

        row.try_into()
    }

    /// Record payment of an invoice.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the invoice does not exist.
    pub async fn mark_paid(
        &self,
        id: InvoiceId,
        payment_date: NaiveDate,
        payment_method: Option<&str>,
    ) -> Result<Invoice, RepositoryError> {
        let row = sqlx::query_as::<_, InvoiceRow>(
            r"
            UPDATE invoices
            SET status = ?, payment_date = ?, payment_method = ?, updated_at = ?
            WHERE id = ?
            RETURNING id, invoice_number, client_id, case_id, amount, tax_amount, total_amount,
                      description, issue_date, due_date, status, payment_date, payment_method,
                      notes, created_by, created_at, updated_at
            ",
        )
        .bind(InvoiceStatus::Paid.as_str())
        .bind(payment_date)
        .bind(optional_text(payment_method))
        .bind(Utc::now())
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound("invoice"))?;

        row.try_into()
    }

    /// Delete an invoice. Nothing references invoices.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the invoice does not exist.
    pub async fn delete(&self, id: InvoiceId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM invoices WHERE id = ?")
            .bind(id.as_i64())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound("invoice"));
        }
        Ok(())
    }
}
