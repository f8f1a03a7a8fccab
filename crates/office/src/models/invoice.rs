//! Invoice domain types.

use chrono::{DateTime, NaiveDate, Utc};

use law_office_core::{Amount, CaseId, ClientId, InvoiceId, InvoiceStatus, UserId};

use crate::error::ValidationError;

/// A billing record for a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoice {
    pub id: InvoiceId,
    /// Globally unique.
    pub invoice_number: String,
    pub client_id: ClientId,
    pub case_id: Option<CaseId>,
    pub amount: Amount,
    pub tax_amount: Amount,
    /// Always `amount + tax_amount`.
    pub total_amount: Amount,
    pub description: Option<String>,
    pub issue_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub status: InvoiceStatus,
    pub payment_date: Option<NaiveDate>,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editable invoice fields, used for both create and update.
///
/// The total is derived on write.
#[derive(Debug, Clone)]
pub struct InvoiceFields {
    pub invoice_number: String,
    pub client_id: ClientId,
    pub case_id: Option<CaseId>,
    pub amount: Amount,
    pub tax_amount: Amount,
    pub description: Option<String>,
    pub issue_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub status: InvoiceStatus,
    pub payment_date: Option<NaiveDate>,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
}

impl InvoiceFields {
    /// A draft invoice with no tax.
    #[must_use]
    pub fn new(
        invoice_number: impl Into<String>,
        client_id: ClientId,
        amount: Amount,
        issue_date: NaiveDate,
    ) -> Self {
        Self {
            invoice_number: invoice_number.into(),
            client_id,
            case_id: None,
            amount,
            tax_amount: Amount::ZERO,
            description: None,
            issue_date,
            due_date: None,
            status: InvoiceStatus::default(),
            payment_date: None,
            payment_method: None,
            notes: None,
        }
    }

    /// Amount plus tax.
    ///
    /// # Errors
    ///
    /// Returns a `tax_amount` validation error if the sum overflows.
    pub fn total(&self) -> Result<Amount, ValidationError> {
        self.amount
            .checked_add(self.tax_amount)
            .ok_or_else(|| ValidationError::new("tax_amount", "total amount is too large"))
    }
}
