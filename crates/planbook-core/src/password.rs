use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};

use crate::error::CoreError;

/// Hashes a password with Argon2id and a random salt.
pub fn hash_password(password: &str) -> Result<String, CoreError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CoreError::PasswordHash(e.to_string()))
}

/// Checks a password against a stored Argon2 hash.
///
/// A mismatch is `InvalidCredentials`; an unparseable stored hash is `PasswordHash`.
pub fn verify_password(password: &str, password_hash: &str) -> Result<(), CoreError> {
    let parsed_hash =
        PasswordHash::new(password_hash).map_err(|e| CoreError::PasswordHash(e.to_string()))?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|err| {
            tracing::trace!(%err, "password verification failed");
            CoreError::InvalidCredentials
        })
}
