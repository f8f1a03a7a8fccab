//! Domain models for the office store.
//!
//! Values returned by repositories are snapshots; changing them does not
//! change the store.

pub mod appointment;
pub mod case;
pub mod case_session;
pub mod client;
pub mod document;
pub mod invoice;
pub mod setting;
pub mod task;
pub mod user;

pub use appointment::{Appointment, AppointmentFields};
pub use case::{Case, CaseFields, CaseSummary};
pub use case_session::{CaseSession, CaseSessionFields};
pub use client::{Client, ClientFields, ClientSummary};
pub use document::{Document, NewDocument};
pub use invoice::{Invoice, InvoiceFields};
pub use setting::Setting;
pub use task::{Task, TaskFields};
pub use user::{CurrentUser, NewUser, User, UserChanges};
