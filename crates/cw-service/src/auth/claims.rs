//! Token claims and legacy role-claim normalization.
//!
//! Historical issuers wrote the role claim under different keys (`auth`,
//! `roles`, `role`) and in different shapes (comma-joined string or JSON
//! array). The normalizer folds all of them into one canonical form so the
//! authorization layer never sees issuer-specific variance.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::models::ROLE_PREFIX;

/// Role-claim candidate keys, in priority order. The first present,
/// non-null value wins.
const ROLE_CLAIM_KEYS: [&str; 3] = ["auth", "roles", "role"];

/// Claims carried in a Curbwatch token body.
///
/// Access tokens carry `sub` (email), timestamps and a roles claim under
/// `auth`. Refresh tokens carry `sub` (numeric user id) and timestamps
/// only; the absence of a roles claim is the token-kind discriminator.
/// The legacy `roles`/`role` fields exist so tokens minted by historical
/// issuers still verify.
#[derive(Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: email for access tokens, numeric user id for refresh
    /// tokens. Redacted in Debug output.
    pub sub: String,

    /// Issued-at timestamp (Unix epoch seconds).
    pub iat: i64,

    /// Expiration timestamp (Unix epoch seconds).
    pub exp: i64,

    /// Canonical roles claim (comma-joined, `ROLE_`-prefixed names).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<Value>,

    /// Legacy roles claim shape.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Value>,

    /// Legacy single-role claim shape.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Value>,
}

/// Custom Debug implementation that redacts the `sub` field.
impl fmt::Debug for Claims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Claims")
            .field("sub", &"[REDACTED]")
            .field("iat", &self.iat)
            .field("exp", &self.exp)
            .field("auth", &self.auth)
            .field("roles", &self.roles)
            .field("role", &self.role)
            .finish()
    }
}

impl Claims {
    /// The normalized roles claim, if any (see [`normalized_roles`]).
    pub fn normalized_roles(&self) -> Option<String> {
        normalized_roles(self)
    }
}

/// Force a role name to carry the authority prefix.
pub fn with_authority_prefix(name: &str) -> String {
    let name = name.trim();
    if name.len() >= ROLE_PREFIX.len()
        && name
            .get(..ROLE_PREFIX.len())
            .is_some_and(|p| p.eq_ignore_ascii_case(ROLE_PREFIX))
    {
        name.to_string()
    } else {
        format!("{ROLE_PREFIX}{name}")
    }
}

/// Extract a canonical comma-joined role list from a claim set.
///
/// Candidate keys are tried in priority order; the first present, non-null
/// value is converted — a delimited string or a sequence of strings both
/// yield the same canonical form, with every name forced to carry the
/// `ROLE_` prefix. Returns `None` when no candidate key holds a usable
/// value, which signals a refresh or legacy token with no authorization
/// use.
pub fn normalized_roles(claims: &Claims) -> Option<String> {
    for key in ROLE_CLAIM_KEYS {
        let value = match key {
            "auth" => claims.auth.as_ref(),
            "roles" => claims.roles.as_ref(),
            _ => claims.role.as_ref(),
        };

        let Some(value) = value else { continue };

        let names: Vec<String> = match value {
            Value::String(s) => s
                .split(',')
                .map(|name| name.trim())
                .filter(|name| !name.is_empty())
                .map(with_authority_prefix)
                .collect(),
            Value::Array(items) => items
                .iter()
                .filter_map(|item| item.as_str())
                .map(|name| name.trim())
                .filter(|name| !name.is_empty())
                .map(with_authority_prefix)
                .collect(),
            // null or an unusable shape: fall through to the next candidate
            _ => continue,
        };

        if !names.is_empty() {
            return Some(names.join(","));
        }
    }

    None
}
