//! Argon2 password hashing.
//!
//! Stored passwords are PHC strings (`$argon2id$v=19$...`) carrying their own
//! salt and parameters. Verification never falls back to comparing raw text.

use argon2::password_hash::{self, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use rand::rngs::OsRng;

use crate::AuthError;

pub const PASSWORD_MIN_CHARS: usize = 2;
pub const PASSWORD_MAX_CHARS: usize = 20;

/// Hash a raw password with a fresh random salt.
pub fn hash_password(raw: &str) -> Result<String, AuthError> {
    let len = raw.chars().count();
    if !(PASSWORD_MIN_CHARS..=PASSWORD_MAX_CHARS).contains(&len) {
        return Err(AuthError::InvalidPassword(format!(
            "password must be {PASSWORD_MIN_CHARS}-{PASSWORD_MAX_CHARS} characters"
        )));
    }

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(raw.as_bytes(), &salt)
        .map_err(|e| AuthError::Hash(e.to_string()))?;
    Ok(hash.to_string())
}

/// Check `raw` against a stored PHC string.
///
/// `Ok(false)` means the password is wrong. A stored value that is not a
/// valid PHC string is an error, not a mismatch.
pub fn verify_password(raw: &str, phc: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(phc).map_err(|e| AuthError::Hash(e.to_string()))?;
    match Argon2::default().verify_password(raw.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::Hash(e.to_string())),
    }
}
