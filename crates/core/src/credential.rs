//! Credential hashing with Argon2id.

use argon2::Argon2;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use rand::RngCore;

const SALT_BYTES: usize = 16;

/// Hash a password into a PHC string with a fresh random salt.
pub fn hash_password(password: &str) -> crate::Result<String> {
    let mut salt_bytes = [0u8; SALT_BYTES];
    rand::rng().fill_bytes(&mut salt_bytes);
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| crate::Error::CredentialHash(e.to_string()))?;
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| crate::Error::CredentialHash(e.to_string()))
}

/// Verify a password against a stored PHC string.
///
/// A malformed stored hash is reported as a mismatch; callers only need to
/// know whether the credentials check out.
pub fn verify_password(password: &str, password_hash: &str) -> crate::Result<()> {
    let parsed = PasswordHash::new(password_hash).map_err(|_| crate::Error::CredentialMismatch)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| crate::Error::CredentialMismatch)
}
