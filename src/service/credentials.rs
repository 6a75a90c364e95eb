//! Password hashing and temporary credential generation.
//!
//! Argon2 is CPU-bound, so the async wrappers move it onto tokio's
//! blocking pool.

use argon2::Config;
use rand::Rng;
use rand::distributions::Alphanumeric;

use crate::error::BookingError;

const TEMPORARY_PASSWORD_LEN: usize = 16;

/// Minimum accepted length for user-chosen passwords.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Generates a random alphanumeric one-time password.
#[must_use]
pub fn temporary_password() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TEMPORARY_PASSWORD_LEN)
        .map(char::from)
        .collect()
}

/// Hashes `password` with a fresh random salt.
///
/// # Errors
///
/// Returns [`BookingError::Internal`] if hashing fails.
pub fn hash_password(password: &str) -> Result<String, BookingError> {
    let salt: [u8; 32] = rand::thread_rng().r#gen();
    argon2::hash_encoded(password.as_bytes(), &salt, &Config::default())
        .map_err(|e| BookingError::Internal(format!("password hashing failed: {e}")))
}

/// Checks `password` against an encoded hash.
///
/// # Errors
///
/// Returns [`BookingError::Internal`] if the stored hash is malformed.
pub fn verify_password(encoded: &str, password: &str) -> Result<bool, BookingError> {
    argon2::verify_encoded(encoded, password.as_bytes())
        .map_err(|e| BookingError::Internal(format!("password verification failed: {e}")))
}

/// [`hash_password`] on the blocking pool.
///
/// # Errors
///
/// Returns [`BookingError::Internal`] if hashing fails or the task panics.
pub async fn hash_password_blocking(password: String) -> Result<String, BookingError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| BookingError::Internal(e.to_string()))?
}

/// [`verify_password`] on the blocking pool.
///
/// # Errors
///
/// Returns [`BookingError::Internal`] if verification fails or the task
/// panics.
pub async fn verify_password_blocking(
    encoded: String,
    password: String,
) -> Result<bool, BookingError> {
    tokio::task::spawn_blocking(move || verify_password(&encoded, &password))
        .await
        .map_err(|e| BookingError::Internal(e.to_string()))?
}

/// Rejects passwords that are too short to be chosen by a person.
///
/// # Errors
///
/// Returns [`BookingError::InvalidRequest`] below [`MIN_PASSWORD_LEN`].
pub fn check_password_strength(password: &str) -> Result<(), BookingError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(BookingError::InvalidRequest(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}
