//! Process-wide signing key material.
//!
//! The secret is decoded exactly once at startup and the resulting key
//! material is shared read-only for the process lifetime. Key bytes are
//! never printed; Debug output is redacted.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use jsonwebtoken::{DecodingKey, EncodingKey};
use std::fmt;

/// HMAC-SHA-256 key material built from the configured secret.
#[derive(Clone)]
pub struct KeyMaterial {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl KeyMaterial {
    /// Build key material from a configured secret.
    ///
    /// Lenient decode to tolerate configuration variance: the secret is
    /// first treated as standard base64; if that fails its literal UTF-8
    /// bytes are used. Called once at startup, never per request.
    pub fn from_secret(secret: &str) -> Self {
        let bytes = STANDARD
            .decode(secret.trim())
            .unwrap_or_else(|_| secret.as_bytes().to_vec());

        Self {
            encoding: EncodingKey::from_secret(&bytes),
            decoding: DecodingKey::from_secret(&bytes),
        }
    }

    pub fn encoding(&self) -> &EncodingKey {
        &self.encoding
    }

    pub fn decoding(&self) -> &DecodingKey {
        &self.decoding
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("encoding", &"[REDACTED]")
            .field("decoding", &"[REDACTED]")
            .finish()
    }
}
