//! Builder patterns for test token construction.
//!
//! Builds tokens with arbitrary claim shapes — legacy role-claim keys,
//! expired timestamps, missing claims — signed with any secret, so tests
//! can exercise every verification path without touching the production
//! issuance code.

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Map, Value};

/// Default signing secret used by the test harness.
pub const TEST_SECRET: &str = "cw-test-signing-secret";

/// Builder for test tokens.
///
/// # Example
/// ```rust,ignore
/// let token = TestTokenBuilder::new()
///     .for_subject("alice@curbwatch.io")
///     .with_roles("ROLE_ADMIN")
///     .expires_in(3600)
///     .build();
/// ```
pub struct TestTokenBuilder {
    sub: String,
    iat: i64,
    exp: i64,
    extra: Map<String, Value>,
    algorithm: Algorithm,
}

impl TestTokenBuilder {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            sub: "test-subject".to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(3600)).timestamp(),
            extra: Map::new(),
            algorithm: Algorithm::HS256,
        }
    }

    /// Set the subject (email for access tokens, numeric id for refresh).
    pub fn for_subject(mut self, subject: &str) -> Self {
        self.sub = subject.to_string();
        self
    }

    /// Set the canonical roles claim (`auth` key, comma-joined).
    pub fn with_roles(self, roles: &str) -> Self {
        self.with_claim("auth", json!(roles))
    }

    /// Set an arbitrary claim (e.g. legacy `roles`/`role` keys).
    pub fn with_claim(mut self, key: &str, value: Value) -> Self {
        self.extra.insert(key.to_string(), value);
        self
    }

    /// Set expiration relative to now (negative for already-expired).
    pub fn expires_in(mut self, seconds: i64) -> Self {
        self.exp = (Utc::now() + Duration::seconds(seconds)).timestamp();
        self
    }

    /// Set the issued-at timestamp.
    pub fn issued_at(mut self, timestamp: i64) -> Self {
        self.iat = timestamp;
        self
    }

    /// Sign with a non-HS256 algorithm (for unsupported-algorithm tests).
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Sign with the harness default secret.
    pub fn build(self) -> String {
        self.build_with_secret(TEST_SECRET)
    }

    /// Sign with an explicit secret (literal bytes).
    pub fn build_with_secret(self, secret: &str) -> String {
        let mut claims = Map::new();
        claims.insert("sub".to_string(), json!(self.sub));
        claims.insert("iat".to_string(), json!(self.iat));
        claims.insert("exp".to_string(), json!(self.exp));
        for (key, value) in self.extra {
            claims.insert(key, value);
        }

        encode(
            &Header::new(self.algorithm),
            &Value::Object(claims),
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("test token signing should not fail")
    }
}

impl Default for TestTokenBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Corrupt the signature segment of a token by flipping its last byte.
pub fn tamper_signature(token: &str) -> String {
    let mut tampered = token.to_string();
    let last = tampered.pop().expect("token should not be empty");
    tampered.push(if last == 'A' { 'B' } else { 'A' });
    tampered
}
