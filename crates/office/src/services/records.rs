//! Gated access to the office records.
//!
//! Every operation takes the caller's [`Session`]. Clients, tasks,
//! appointments, documents and hearings are open to any logged-in user.
//! Case writes need `can_manage_cases`; every invoice operation needs
//! `can_view_financial_reports`; settings writes are for administrators.
//! Creators are always taken from the session.

use chrono::NaiveDate;

use law_office_core::{
    AppointmentId, CaseId, CaseSessionId, ClientId, DocumentId, InvoiceId, TaskId, TaskStatus,
};

use super::auth::Session;
use crate::db::Database;
use crate::error::OfficeError;
use crate::models::{
    Appointment, AppointmentFields, Case, CaseFields, CaseSession, CaseSessionFields, CaseSummary,
    Client, ClientFields, ClientSummary, Document, Invoice, InvoiceFields, NewDocument, Setting,
    Task, TaskFields,
};

/// Record operations performed on behalf of a session.
pub struct RecordService<'a> {
    db: &'a Database,
}

impl<'a> RecordService<'a> {
    #[must_use]
    pub const fn new(db: &'a Database) -> Self {
        Self { db }
    }

    // =========================================================================
    // Clients
    // =========================================================================

    /// All clients with their case counts, ordered by name.
    ///
    /// # Errors
    ///
    /// `Unauthenticated` without a login.
    pub async fn list_clients(&self, session: &Session) -> Result<Vec<ClientSummary>, OfficeError> {
        session.require_user()?;
        Ok(self.db.clients().list().await?)
    }

    /// Clients whose name, phone, email or national id contains `term`.
    ///
    /// # Errors
    ///
    /// `Unauthenticated` without a login.
    pub async fn search_clients(
        &self,
        session: &Session,
        term: &str,
    ) -> Result<Vec<Client>, OfficeError> {
        session.require_user()?;
        Ok(self.db.clients().search(term).await?)
    }

    /// # Errors
    ///
    /// `Unauthenticated` without a login.
    pub async fn get_client(
        &self,
        session: &Session,
        id: ClientId,
    ) -> Result<Option<Client>, OfficeError> {
        session.require_user()?;
        Ok(self.db.clients().get(id).await?)
    }

    /// # Errors
    ///
    /// `Validation` for a blank name or bad email, `Conflict` for a taken
    /// national id.
    pub async fn create_client(
        &self,
        session: &Session,
        fields: &ClientFields,
    ) -> Result<Client, OfficeError> {
        let actor = session.require_user()?;
        let client = self.db.clients().create(fields, Some(actor.id)).await?;
        tracing::info!(client_id = %client.id, created_by = %actor.id, "Client created");
        Ok(client)
    }

    /// # Errors
    ///
    /// As [`Self::create_client`], plus `NotFound`.
    pub async fn update_client(
        &self,
        session: &Session,
        id: ClientId,
        fields: &ClientFields,
    ) -> Result<Client, OfficeError> {
        session.require_user()?;
        Ok(self.db.clients().update(id, fields).await?)
    }

    /// Delete a client that nothing references any more.
    ///
    /// # Errors
    ///
    /// `Integrity` while cases, tasks, appointments, documents or invoices
    /// still reference the client; `NotFound` if it does not exist.
    pub async fn delete_client(&self, session: &Session, id: ClientId) -> Result<(), OfficeError> {
        let actor = session.require_user()?;
        self.db.clients().delete(id).await?;
        tracing::info!(client_id = %id, deleted_by = %actor.id, "Client deleted");
        Ok(())
    }

    // =========================================================================
    // Cases
    // =========================================================================

    /// Cases with client and lawyer names, newest first.
    ///
    /// # Errors
    ///
    /// `Unauthenticated` without a login.
    pub async fn list_cases(&self, session: &Session) -> Result<Vec<CaseSummary>, OfficeError> {
        session.require_user()?;
        Ok(self.db.cases().list().await?)
    }

    /// Cases whose number, title or client name contains `term`.
    ///
    /// # Errors
    ///
    /// `Unauthenticated` without a login.
    pub async fn search_cases(
        &self,
        session: &Session,
        term: &str,
    ) -> Result<Vec<CaseSummary>, OfficeError> {
        session.require_user()?;
        Ok(self.db.cases().search(term).await?)
    }

    /// # Errors
    ///
    /// `Unauthenticated` without a login.
    pub async fn cases_for_client(
        &self,
        session: &Session,
        client_id: ClientId,
    ) -> Result<Vec<Case>, OfficeError> {
        session.require_user()?;
        Ok(self.db.cases().list_by_client(client_id).await?)
    }

    /// # Errors
    ///
    /// `Unauthenticated` without a login.
    pub async fn get_case(
        &self,
        session: &Session,
        id: CaseId,
    ) -> Result<Option<Case>, OfficeError> {
        session.require_user()?;
        Ok(self.db.cases().get(id).await?)
    }

    /// # Errors
    ///
    /// `Unauthenticated` without a login.
    pub async fn get_case_by_number(
        &self,
        session: &Session,
        case_number: &str,
    ) -> Result<Option<Case>, OfficeError> {
        session.require_user()?;
        Ok(self.db.cases().get_by_number(case_number).await?)
    }

    /// Open a case.
    ///
    /// # Errors
    ///
    /// - `Forbidden` for secretaries
    /// - `Integrity` if the client or assigned lawyer does not exist
    /// - `Conflict` if the case number is taken
    pub async fn create_case(
        &self,
        session: &Session,
        fields: &CaseFields,
    ) -> Result<Case, OfficeError> {
        let gate = session.gate();
        let actor = gate.require(gate.can_manage_cases(), "create case")?;
        let case = self.db.cases().create(fields, Some(actor.id)).await?;
        tracing::info!(
            case_id = %case.id,
            case_number = %case.case_number,
            created_by = %actor.id,
            "Case created"
        );
        Ok(case)
    }

    /// # Errors
    ///
    /// As [`Self::create_case`], plus `NotFound`.
    pub async fn update_case(
        &self,
        session: &Session,
        id: CaseId,
        fields: &CaseFields,
    ) -> Result<Case, OfficeError> {
        let gate = session.gate();
        gate.require(gate.can_manage_cases(), "update case")?;
        Ok(self.db.cases().update(id, fields).await?)
    }

    /// Delete a case with no tasks, appointments, documents, invoices or
    /// hearings.
    ///
    /// # Errors
    ///
    /// `Forbidden` for secretaries, `Integrity` while dependents exist,
    /// `NotFound` if the case does not exist.
    pub async fn delete_case(&self, session: &Session, id: CaseId) -> Result<(), OfficeError> {
        let gate = session.gate();
        let actor = gate.require(gate.can_manage_cases(), "delete case")?;
        self.db.cases().delete(id).await?;
        tracing::info!(case_id = %id, deleted_by = %actor.id, "Case deleted");
        Ok(())
    }

    // =========================================================================
    // Tasks
    // =========================================================================

    /// # Errors
    ///
    /// `Unauthenticated` without a login.
    pub async fn list_tasks(&self, session: &Session) -> Result<Vec<Task>, OfficeError> {
        session.require_user()?;
        Ok(self.db.tasks().list().await?)
    }

    /// Unfinished tasks assigned to the logged-in user.
    ///
    /// # Errors
    ///
    /// `Unauthenticated` without a login.
    pub async fn my_open_tasks(&self, session: &Session) -> Result<Vec<Task>, OfficeError> {
        let actor = session.require_user()?;
        Ok(self.db.tasks().list_open_for(actor.id).await?)
    }

    /// # Errors
    ///
    /// `Unauthenticated` without a login.
    pub async fn tasks_for_case(
        &self,
        session: &Session,
        case_id: CaseId,
    ) -> Result<Vec<Task>, OfficeError> {
        session.require_user()?;
        Ok(self.db.tasks().list_by_case(case_id).await?)
    }

    /// # Errors
    ///
    /// `Unauthenticated` without a login.
    pub async fn get_task(
        &self,
        session: &Session,
        id: TaskId,
    ) -> Result<Option<Task>, OfficeError> {
        session.require_user()?;
        Ok(self.db.tasks().get(id).await?)
    }

    /// # Errors
    ///
    /// `Validation` for a blank title, `Integrity` for a missing case,
    /// client or assignee.
    pub async fn create_task(
        &self,
        session: &Session,
        fields: &TaskFields,
    ) -> Result<Task, OfficeError> {
        let actor = session.require_user()?;
        let task = self.db.tasks().create(fields, Some(actor.id)).await?;
        tracing::info!(task_id = %task.id, created_by = %actor.id, "Task created");
        Ok(task)
    }

    /// # Errors
    ///
    /// As [`Self::create_task`], plus `NotFound`.
    pub async fn update_task(
        &self,
        session: &Session,
        id: TaskId,
        fields: &TaskFields,
    ) -> Result<Task, OfficeError> {
        session.require_user()?;
        Ok(self.db.tasks().update(id, fields).await?)
    }

    /// # Errors
    ///
    /// `NotFound` if the task does not exist.
    pub async fn set_task_status(
        &self,
        session: &Session,
        id: TaskId,
        status: TaskStatus,
    ) -> Result<(), OfficeError> {
        session.require_user()?;
        Ok(self.db.tasks().set_status(id, status).await?)
    }

    /// # Errors
    ///
    /// `NotFound` if the task does not exist.
    pub async fn delete_task(&self, session: &Session, id: TaskId) -> Result<(), OfficeError> {
        session.require_user()?;
        Ok(self.db.tasks().delete(id).await?)
    }

    // =========================================================================
    // Appointments
    // =========================================================================

    /// # Errors
    ///
    /// `Unauthenticated` without a login.
    pub async fn list_appointments(
        &self,
        session: &Session,
    ) -> Result<Vec<Appointment>, OfficeError> {
        session.require_user()?;
        Ok(self.db.appointments().list().await?)
    }

    /// Appointments starting on `day`, earliest first.
    ///
    /// # Errors
    ///
    /// `Unauthenticated` without a login.
    pub async fn appointments_on(
        &self,
        session: &Session,
        day: NaiveDate,
    ) -> Result<Vec<Appointment>, OfficeError> {
        session.require_user()?;
        Ok(self.db.appointments().list_on(day).await?)
    }

    /// # Errors
    ///
    /// `Unauthenticated` without a login.
    pub async fn get_appointment(
        &self,
        session: &Session,
        id: AppointmentId,
    ) -> Result<Option<Appointment>, OfficeError> {
        session.require_user()?;
        Ok(self.db.appointments().get(id).await?)
    }

    /// # Errors
    ///
    /// `Validation` for a blank title or non-positive duration, `Integrity`
    /// for a missing case or client.
    pub async fn create_appointment(
        &self,
        session: &Session,
        fields: &AppointmentFields,
    ) -> Result<Appointment, OfficeError> {
        let actor = session.require_user()?;
        let appointment = self.db.appointments().create(fields, Some(actor.id)).await?;
        tracing::info!(
            appointment_id = %appointment.id,
            created_by = %actor.id,
            "Appointment created"
        );
        Ok(appointment)
    }

    /// # Errors
    ///
    /// As [`Self::create_appointment`], plus `NotFound`.
    pub async fn update_appointment(
        &self,
        session: &Session,
        id: AppointmentId,
        fields: &AppointmentFields,
    ) -> Result<Appointment, OfficeError> {
        session.require_user()?;
        Ok(self.db.appointments().update(id, fields).await?)
    }

    /// # Errors
    ///
    /// `NotFound` if the appointment does not exist.
    pub async fn delete_appointment(
        &self,
        session: &Session,
        id: AppointmentId,
    ) -> Result<(), OfficeError> {
        session.require_user()?;
        Ok(self.db.appointments().delete(id).await?)
    }

    // =========================================================================
    // Documents
    // =========================================================================

    /// # Errors
    ///
    /// `Unauthenticated` without a login.
    pub async fn documents_for_case(
        &self,
        session: &Session,
        case_id: CaseId,
    ) -> Result<Vec<Document>, OfficeError> {
        session.require_user()?;
        Ok(self.db.documents().list_by_case(case_id).await?)
    }

    /// # Errors
    ///
    /// `Unauthenticated` without a login.
    pub async fn documents_for_client(
        &self,
        session: &Session,
        client_id: ClientId,
    ) -> Result<Vec<Document>, OfficeError> {
        session.require_user()?;
        Ok(self.db.documents().list_by_client(client_id).await?)
    }

    /// # Errors
    ///
    /// `Unauthenticated` without a login.
    pub async fn get_document(
        &self,
        session: &Session,
        id: DocumentId,
    ) -> Result<Option<Document>, OfficeError> {
        session.require_user()?;
        Ok(self.db.documents().get(id).await?)
    }

    /// Record document metadata. The file itself is managed by the caller.
    ///
    /// # Errors
    ///
    /// `Validation` for blank names or a negative size, `Integrity` for a
    /// missing case or client.
    pub async fn add_document(
        &self,
        session: &Session,
        doc: &NewDocument,
    ) -> Result<Document, OfficeError> {
        let actor = session.require_user()?;
        let document = self.db.documents().create(doc, Some(actor.id)).await?;
        tracing::info!(document_id = %document.id, uploaded_by = %actor.id, "Document recorded");
        Ok(document)
    }

    /// # Errors
    ///
    /// `NotFound` if the document does not exist.
    pub async fn delete_document(
        &self,
        session: &Session,
        id: DocumentId,
    ) -> Result<(), OfficeError> {
        session.require_user()?;
        Ok(self.db.documents().delete(id).await?)
    }

    // =========================================================================
    // Invoices
    // =========================================================================

    /// # Errors
    ///
    /// `Forbidden` for secretaries.
    pub async fn list_invoices(&self, session: &Session) -> Result<Vec<Invoice>, OfficeError> {
        let gate = session.gate();
        gate.require(gate.can_view_financial_reports(), "view invoices")?;
        Ok(self.db.invoices().list().await?)
    }

    /// Invoices that are neither paid nor cancelled.
    ///
    /// # Errors
    ///
    /// `Forbidden` for secretaries.
    pub async fn outstanding_invoices(
        &self,
        session: &Session,
    ) -> Result<Vec<Invoice>, OfficeError> {
        let gate = session.gate();
        gate.require(gate.can_view_financial_reports(), "view invoices")?;
        Ok(self.db.invoices().list_outstanding().await?)
    }

    /// # Errors
    ///
    /// `Forbidden` for secretaries.
    pub async fn invoices_for_client(
        &self,
        session: &Session,
        client_id: ClientId,
    ) -> Result<Vec<Invoice>, OfficeError> {
        let gate = session.gate();
        gate.require(gate.can_view_financial_reports(), "view invoices")?;
        Ok(self.db.invoices().list_by_client(client_id).await?)
    }

    /// # Errors
    ///
    /// `Forbidden` for secretaries.
    pub async fn get_invoice(
        &self,
        session: &Session,
        id: InvoiceId,
    ) -> Result<Option<Invoice>, OfficeError> {
        let gate = session.gate();
        gate.require(gate.can_view_financial_reports(), "view invoices")?;
        Ok(self.db.invoices().get(id).await?)
    }

    /// Issue an invoice. The total is always amount plus tax.
    ///
    /// # Errors
    ///
    /// - `Forbidden` for secretaries
    /// - `Integrity` for a missing client or case
    /// - `Conflict` if the invoice number is taken
    pub async fn create_invoice(
        &self,
        session: &Session,
        fields: &InvoiceFields,
    ) -> Result<Invoice, OfficeError> {
        let gate = session.gate();
        let actor = gate.require(gate.can_view_financial_reports(), "create invoice")?;
        let invoice = self.db.invoices().create(fields, Some(actor.id)).await?;
        tracing::info!(
            invoice_id = %invoice.id,
            invoice_number = %invoice.invoice_number,
            total = %invoice.total_amount,
            created_by = %actor.id,
            "Invoice created"
        );
        Ok(invoice)
    }

    /// # Errors
    ///
    /// As [`Self::create_invoice`], plus `NotFound`.
    pub async fn update_invoice(
        &self,
        session: &Session,
        id: InvoiceId,
        fields: &InvoiceFields,
    ) -> Result<Invoice, OfficeError> {
        let gate = session.gate();
        gate.require(gate.can_view_financial_reports(), "update invoice")?;
        Ok(self.db.invoices().update(id, fields).await?)
    }

    /// # Errors
    ///
    /// `Forbidden` for secretaries, `NotFound` if the invoice does not exist.
    pub async fn mark_invoice_paid(
        &self,
        session: &Session,
        id: InvoiceId,
        payment_date: NaiveDate,
        payment_method: Option<&str>,
    ) -> Result<Invoice, OfficeError> {
        let gate = session.gate();
        let actor = gate.require(gate.can_view_financial_reports(), "record payment")?;
        let invoice = self.db.invoices().mark_paid(id, payment_date, payment_method).await?;
        tracing::info!(invoice_id = %id, recorded_by = %actor.id, "Invoice paid");
        Ok(invoice)
    }

    /// # Errors
    ///
    /// `Forbidden` for secretaries, `NotFound` if the invoice does not exist.
    pub async fn delete_invoice(
        &self,
        session: &Session,
        id: InvoiceId,
    ) -> Result<(), OfficeError> {
        let gate = session.gate();
        gate.require(gate.can_view_financial_reports(), "delete invoice")?;
        Ok(self.db.invoices().delete(id).await?)
    }

    // =========================================================================
    // Hearings
    // =========================================================================

    /// # Errors
    ///
    /// `Unauthenticated` without a login.
    pub async fn hearings_for_case(
        &self,
        session: &Session,
        case_id: CaseId,
    ) -> Result<Vec<CaseSession>, OfficeError> {
        session.require_user()?;
        Ok(self.db.case_sessions().list_by_case(case_id).await?)
    }

    /// Hearings on or after `from`, earliest first.
    ///
    /// # Errors
    ///
    /// `Unauthenticated` without a login.
    pub async fn upcoming_hearings(
        &self,
        session: &Session,
        from: NaiveDate,
    ) -> Result<Vec<CaseSession>, OfficeError> {
        session.require_user()?;
        Ok(self.db.case_sessions().list_upcoming(from).await?)
    }

    /// # Errors
    ///
    /// `Unauthenticated` without a login.
    pub async fn get_hearing(
        &self,
        session: &Session,
        id: CaseSessionId,
    ) -> Result<Option<CaseSession>, OfficeError> {
        session.require_user()?;
        Ok(self.db.case_sessions().get(id).await?)
    }

    /// # Errors
    ///
    /// `Integrity` if the case does not exist.
    pub async fn schedule_hearing(
        &self,
        session: &Session,
        fields: &CaseSessionFields,
    ) -> Result<CaseSession, OfficeError> {
        let actor = session.require_user()?;
        let hearing = self.db.case_sessions().create(fields, Some(actor.id)).await?;
        tracing::info!(hearing_id = %hearing.id, case_id = %hearing.case_id, "Hearing scheduled");
        Ok(hearing)
    }

    /// # Errors
    ///
    /// `Integrity` if the case does not exist, `NotFound` for the hearing.
    pub async fn update_hearing(
        &self,
        session: &Session,
        id: CaseSessionId,
        fields: &CaseSessionFields,
    ) -> Result<CaseSession, OfficeError> {
        session.require_user()?;
        Ok(self.db.case_sessions().update(id, fields).await?)
    }

    /// # Errors
    ///
    /// `NotFound` if the hearing does not exist.
    pub async fn delete_hearing(
        &self,
        session: &Session,
        id: CaseSessionId,
    ) -> Result<(), OfficeError> {
        session.require_user()?;
        Ok(self.db.case_sessions().delete(id).await?)
    }

    // =========================================================================
    // Settings
    // =========================================================================

    /// # Errors
    ///
    /// `Unauthenticated` without a login.
    pub async fn get_setting(
        &self,
        session: &Session,
        key: &str,
    ) -> Result<Option<Setting>, OfficeError> {
        session.require_user()?;
        Ok(self.db.settings().get(key).await?)
    }

    /// # Errors
    ///
    /// `Unauthenticated` without a login.
    pub async fn list_settings(&self, session: &Session) -> Result<Vec<Setting>, OfficeError> {
        session.require_user()?;
        Ok(self.db.settings().list().await?)
    }

    /// Insert or replace a setting. A `None` description keeps the old one.
    ///
    /// # Errors
    ///
    /// `Forbidden` unless an administrator is logged in, `Validation` for a
    /// blank key.
    pub async fn set_setting(
        &self,
        session: &Session,
        key: &str,
        value: Option<&str>,
        description: Option<&str>,
    ) -> Result<Setting, OfficeError> {
        let gate = session.gate();
        gate.require(gate.is_admin(), "change settings")?;
        Ok(self.db.settings().set(key, value, description).await?)
    }

    /// Returns `false` if the key was not set.
    ///
    /// # Errors
    ///
    /// `Forbidden` unless an administrator is logged in.
    pub async fn delete_setting(&self, session: &Session, key: &str) -> Result<bool, OfficeError> {
        let gate = session.gate();
        gate.require(gate.is_admin(), "change settings")?;
        Ok(self.db.settings().delete(key).await?)
    }
}
