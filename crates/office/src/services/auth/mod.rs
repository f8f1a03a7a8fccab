//! Authentication and authorization.
//!
//! - [`password`]: Argon2id hashing and verification
//! - [`Session`]: the single local login
//! - [`Gate`]: role-based capability checks over a session

mod error;
mod gate;
pub mod password;
mod session;

pub use error::AuthError;
pub use gate::Gate;
pub use password::{hash_password, validate_password, verify_password};
pub use session::Session;
