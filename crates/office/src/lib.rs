//! Law office records core.
//!
//! Local, single-operator storage for a law office: user accounts with
//! role-based access, client and case records with their tasks,
//! appointments, documents, invoices and hearings, and file-level
//! backup/restore of the SQLite store.
//!
//! ```rust,ignore
//! let config = OfficeConfig::from_env()?;
//! let db = open_store(&config).await?;
//!
//! let mut session = Session::new();
//! if session.authenticate(&db, "alice", &password).await {
//!     let cases = RecordService::new(&db).list_cases(&session).await?;
//! }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

pub use config::OfficeConfig;
pub use db::Database;
pub use error::OfficeError;
pub use services::{Gate, RecordService, Session, UserDirectory, open_store};
