//! Token issuance and verification.
//!
//! Tokens are self-contained HS256 JWTs. Expiry is deliberately NOT part of
//! the decode step: a token that fails only the expiry check is surfaced as
//! `TokenError::Expired` with its claims still readable, because the
//! refresh flow needs the subject out of an expired access token.
//!
//! # Security
//!
//! - Tokens are size-checked before parsing
//! - Only HS256 is accepted; other algorithms are `Unsupported`
//! - Expiry is checked against a fixed per-process clock-skew tolerance

use chrono::Utc;
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, Header, Validation};
use thiserror::Error;

use crate::auth::claims::Claims;
use crate::auth::keys::KeyMaterial;
use crate::errors::ApiError;
use crate::models::Role;

/// Maximum accepted token size in bytes. Oversized tokens are rejected
/// before any base64 or signature work.
pub const MAX_TOKEN_SIZE_BYTES: usize = 4096;

/// Verification failure taxonomy.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Not decodable as a token at all (structure, base64, JSON).
    #[error("malformed token")]
    Malformed,

    /// Structure is fine but the signature does not verify.
    #[error("invalid token signature")]
    InvalidSignature,

    /// Signed with an algorithm this service does not accept.
    #[error("unsupported token algorithm")]
    Unsupported,

    /// Signature verifies but expiry is past the skew tolerance. Carries
    /// the decoded claims for flows that still need the subject.
    #[error("expired token")]
    Expired(Box<Claims>),
}

impl From<TokenError> for ApiError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Malformed => ApiError::MalformedToken,
            TokenError::InvalidSignature => ApiError::InvalidSignature,
            TokenError::Unsupported => ApiError::UnsupportedTokenFormat,
            TokenError::Expired(_) => ApiError::ExpiredToken,
        }
    }
}

/// Claims whose signature and expiry have both been checked.
#[derive(Debug, Clone)]
pub struct VerifiedClaims {
    claims: Claims,
}

impl VerifiedClaims {
    pub fn subject(&self) -> &str {
        &self.claims.sub
    }

    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    /// The normalized roles claim, if present.
    pub fn roles_claim(&self) -> Option<String> {
        self.claims.normalized_roles()
    }

    /// True iff a non-blank roles claim is present.
    ///
    /// This is the functional boundary between access and refresh tokens:
    /// refresh tokens are minted without a roles claim, so one presented
    /// where an access token is expected must be rejected.
    pub fn is_access_token(&self) -> bool {
        self.roles_claim().is_some()
    }
}

/// Issues and verifies signed tokens.
///
/// Holds the process-wide key material plus the lifetimes and skew
/// tolerance fixed at startup. Read-only after construction; shared across
/// request tasks without locking.
#[derive(Clone, Debug)]
pub struct TokenCodec {
    keys: KeyMaterial,
    access_ttl_seconds: u64,
    refresh_ttl_seconds: u64,
    clock_skew_seconds: i64,
}

impl TokenCodec {
    pub fn new(
        keys: KeyMaterial,
        access_ttl_seconds: u64,
        refresh_ttl_seconds: u64,
        clock_skew_seconds: i64,
    ) -> Self {
        Self {
            keys,
            access_ttl_seconds,
            refresh_ttl_seconds,
            clock_skew_seconds,
        }
    }

    pub fn access_ttl_seconds(&self) -> u64 {
        self.access_ttl_seconds
    }

    /// Issue an access token for a subject (email) and role set.
    ///
    /// The roles claim is written under the canonical `auth` key as a
    /// comma-joined, `ROLE_`-prefixed, duplicate-free list.
    pub fn issue_access_token(&self, subject: &str, roles: &[Role]) -> Result<String, ApiError> {
        let mut authorities: Vec<&str> = Vec::with_capacity(roles.len());
        for role in roles {
            if !authorities.contains(&role.authority()) {
                authorities.push(role.authority());
            }
        }

        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: subject.to_string(),
            iat: now,
            exp: now + self.access_ttl_seconds as i64,
            auth: Some(serde_json::Value::String(authorities.join(","))),
            roles: None,
            role: None,
        };

        self.sign(&claims)
    }

    /// Issue a refresh token for a numeric user id.
    ///
    /// No roles claim, by design: its absence is what marks the token as a
    /// refresh token.
    pub fn issue_refresh_token(&self, user_id: i64) -> Result<String, ApiError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now,
            exp: now + self.refresh_ttl_seconds as i64,
            auth: None,
            roles: None,
            role: None,
        };

        self.sign(&claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String, ApiError> {
        encode(&Header::new(Algorithm::HS256), claims, self.keys.encoding()).map_err(|e| {
            tracing::error!(target: "cw.auth.codec", error = %e, "failed to sign token");
            ApiError::Database(format!("token signing failed: {e}"))
        })
    }

    /// Decode and check a token.
    ///
    /// Signature, structure and algorithm failures map onto the taxonomy;
    /// a token past `exp + clock_skew` comes back as `Expired` carrying
    /// its claims. A token within the skew window is accepted.
    pub fn verify(&self, token: &str) -> Result<VerifiedClaims, TokenError> {
        if token.len() > MAX_TOKEN_SIZE_BYTES {
            return Err(TokenError::Malformed);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is handled below so expired claims stay readable.
        validation.validate_exp = false;

        let data = decode::<Claims>(token, self.keys.decoding(), &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                    TokenError::Unsupported
                }
                _ => TokenError::Malformed,
            }
        })?;

        let now = Utc::now().timestamp();
        if now > data.claims.exp + self.clock_skew_seconds {
            return Err(TokenError::Expired(Box::new(data.claims)));
        }

        Ok(VerifiedClaims {
            claims: data.claims,
        })
    }
}
