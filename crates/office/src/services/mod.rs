//! Caller-facing operations for the office store.
//!
//! # Services
//!
//! - [`auth`] - Password hashing, the login [`Session`] and the [`Gate`]
//! - [`UserDirectory`] - Account management
//! - [`RecordService`] - Clients, cases, tasks, appointments, documents,
//!   invoices, hearings and settings
//! - [`open_store`] - Open a store and provision the first administrator
//! - [`maintenance`] - Backup and restore
//!
//! Every operation takes the caller's session and returns [`OfficeError`]
//! values; raw storage errors never cross this boundary.
//!
//! [`OfficeError`]: crate::error::OfficeError

pub mod auth;
mod bootstrap;
pub mod maintenance;
mod records;
mod users;

pub use auth::{AuthError, Gate, Session};
pub use bootstrap::open_store;
pub use records::RecordService;
pub use users::UserDirectory;
