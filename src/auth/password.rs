//! Argon2id hashing for account passwords.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

use crate::auth::error::AccountError;

/// PHC string for the stored `password` column, with a fresh random salt.
pub fn hash_password(plain: &str) -> Result<String, AccountError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!(error = %e, "password hashing failed");
            AccountError::Hashing(e.to_string())
        })
}

/// `Ok(false)` on a wrong password; `Err` only when the stored hash is unreadable.
pub fn verify_password(plain: &str, stored: &str) -> Result<bool, AccountError> {
    let parsed = PasswordHash::new(stored).map_err(|e| {
        error!(error = %e, "stored password hash is malformed");
        AccountError::Hashing(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_hash_is_phc_and_salted() {
        let first = hash_password("salmon-season-2024").unwrap();
        let second = hash_password("salmon-season-2024").unwrap();
        assert!(first.starts_with("$argon2id$"));
        assert_ne!(first, second);
        assert!(verify_password("salmon-season-2024", &first).unwrap());
        assert!(verify_password("salmon-season-2024", &second).unwrap());
        assert!(!verify_password("trout-season", &first).unwrap());
    }

    #[test]
    fn unreadable_stored_hash_is_a_hashing_error() {
        let err = verify_password("anything", "").unwrap_err();
        assert!(matches!(err, AccountError::Hashing(_)));
        assert!(err.to_string().starts_with("password hashing failed"));
    }
}
