//! Session tokens.
//!
//! A session token is an opaque bearer secret handed to the client at login.
//! Only its SHA-256 digest is persisted, so a leaked sessions table does not
//! leak usable credentials.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::fmt;

/// Number of random bytes behind every token (256 bits).
pub const TOKEN_BYTES: usize = 32;

/// Upper bound on the encoded length accepted from clients.
const MAX_TOKEN_LEN: usize = 256;

/// An opaque session token as seen by clients.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Generate a fresh token from the OS CSPRNG.
    pub fn generate() -> Self {
        let mut bytes = [0u8; TOKEN_BYTES];
        rand::rng().fill_bytes(&mut bytes);
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Wrap a client-supplied token.
    ///
    /// Only the shape is checked; whether the token names a live session is
    /// decided by the session store.
    pub fn parse(raw: &str) -> crate::Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(crate::Error::InvalidToken("empty token".to_string()));
        }
        if raw.len() > MAX_TOKEN_LEN {
            return Err(crate::Error::InvalidToken(format!(
                "token too long: {} bytes (max: {})",
                raw.len(),
                MAX_TOKEN_LEN
            )));
        }
        Ok(Self(raw.to_string()))
    }

    /// The token as sent to the client.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Digest stored in the sessions table.
    pub fn digest(&self) -> String {
        hash_token(&self.0)
    }

    /// Consume into the raw string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SessionToken").field(&"<redacted>").finish()
    }
}

/// Hash a token for storage lookup (lowercase hex SHA-256).
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    let result = hasher.finalize();
    result.iter().map(|b| format!("{b:02x}")).collect()
}
