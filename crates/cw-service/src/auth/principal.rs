//! Principal resolution.
//!
//! Turns verified access-token claims into an authenticated `Principal`,
//! consulting the user directory so account changes made after token
//! issuance (deactivation, role revocation) take effect immediately.

use std::str::FromStr;
use std::sync::Arc;

use crate::auth::codec::VerifiedClaims;
use crate::errors::ApiError;
use crate::models::{Principal, Role};
use crate::repositories::UserDirectory;

/// Resolves verified claims into a per-request principal.
#[derive(Clone)]
pub struct PrincipalResolver {
    directory: Arc<dyn UserDirectory>,
}

impl PrincipalResolver {
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self { directory }
    }

    /// Resolve a principal from verified claims.
    ///
    /// Fails with `WrongTokenKind` when the claims lack a roles claim (a
    /// refresh token presented where an access token is expected), with
    /// `UnknownSubject` when the directory has no record for the subject,
    /// and with the underlying directory error on I/O failure — callers
    /// treat all three as authentication failures.
    ///
    /// The role set is the normalized claim roles mapped onto the closed
    /// enumeration (unknown names dropped with a log), then intersected
    /// with the directory's current role: the directory can narrow a
    /// token's grant after issuance but never widen it.
    pub async fn resolve(&self, verified: &VerifiedClaims) -> Result<Principal, ApiError> {
        let Some(roles_claim) = verified.roles_claim() else {
            return Err(ApiError::WrongTokenKind);
        };

        let user = self
            .directory
            .find_by_email(verified.subject())
            .await?
            .ok_or(ApiError::UnknownSubject)?;

        let mut roles: Vec<Role> = Vec::new();
        for name in roles_claim.split(',') {
            match Role::from_str(name) {
                Ok(role) => {
                    if !roles.contains(&role) {
                        roles.push(role);
                    }
                }
                Err(unknown) => {
                    tracing::warn!(
                        target: "cw.auth.principal",
                        role = %unknown.0,
                        "dropping unrecognized role name from token claim"
                    );
                }
            }
        }

        let before = roles.len();
        roles.retain(|role| *role == user.role);
        if roles.len() < before {
            tracing::warn!(
                target: "cw.auth.principal",
                current_role = %user.role,
                "token carried roles the directory no longer grants"
            );
        }

        Ok(Principal {
            user_id: user.user_id,
            email: user.email,
            roles,
        })
    }
}
