//! Password hashing with Argon2id.
//!
//! Digests are PHC strings (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`), so
//! the salt and cost parameters travel with the hash and verification needs
//! nothing else.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use secrecy::{ExposeSecret, SecretString};

use super::AuthError;

/// Reject passwords that cannot be used.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` for an empty or all-whitespace password.
pub fn validate_password(password: &SecretString) -> Result<(), AuthError> {
    if password.expose_secret().trim().is_empty() {
        return Err(AuthError::WeakPassword("password cannot be empty".to_owned()));
    }
    Ok(())
}

/// Hash a password using Argon2id with a fresh random salt.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &SecretString) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.expose_secret().as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored hash in constant time.
///
/// Returns `Ok(false)` on a mismatch.
///
/// # Errors
///
/// Returns `AuthError::MalformedHash` if `hash` cannot be parsed and
/// `AuthError::PasswordHash` if verification itself fails.
pub fn verify_password(password: &SecretString, hash: &str) -> Result<bool, AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::MalformedHash)?;
    let argon2 = Argon2::default();

    match argon2.verify_password(password.expose_secret().as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(_) => Err(AuthError::PasswordHash),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn secret(s: &str) -> SecretString {
        SecretString::from(s)
    }

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password(&secret("pw123")).unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password(&secret("pw123"), &hash).unwrap());
        assert!(!verify_password(&secret("pw124"), &hash).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let first = hash_password(&secret("same")).unwrap();
        let second = hash_password(&secret("same")).unwrap();
        assert_ne!(first, second);
        assert!(verify_password(&secret("same"), &second).unwrap());
    }

    #[test]
    fn test_hash_never_contains_plaintext() {
        let hash = hash_password(&secret("plaintext-marker")).unwrap();
        assert!(!hash.contains("plaintext-marker"));
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        assert!(matches!(
            verify_password(&secret("x"), "not-a-phc-string"),
            Err(AuthError::MalformedHash)
        ));
    }

    #[test]
    fn test_blank_password_rejected() {
        assert!(matches!(
            validate_password(&secret("   ")),
            Err(AuthError::WeakPassword(_))
        ));
        assert!(validate_password(&secret("pw123")).is_ok());
    }
}
