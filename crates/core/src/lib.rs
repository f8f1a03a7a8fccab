//! Law Office Core - Shared types library.
//!
//! This crate provides the domain vocabulary used by the records library
//! (`law-office`) and the operator CLI (`lo-cli`):
//!
//! - Newtype ids for every persisted entity
//! - The closed [`Role`] set and its rank table
//! - Status enumerations for cases, tasks, appointments, invoices and hearings
//! - Validated value types ([`Email`], [`Amount`])
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access. Every
//! enumeration carries its stored text form (`as_str`) and parses it back
//! with `FromStr`, so the storage layer never compares raw strings.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
