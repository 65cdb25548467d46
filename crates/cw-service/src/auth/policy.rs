//! Path-based authorization policy and authentication exemptions.
//!
//! Both tables are plain, inspectable data built once at startup and read
//! concurrently without locking. Policy evaluation is deterministic and
//! side-effect free: first matching entry governs, and the implicit
//! default requires any authenticated principal.

use axum::http::Method;
use thiserror::Error;

use crate::models::{Principal, Role};

/// What a policy entry demands of the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Any authenticated principal.
    Authenticated,
    /// A specific role.
    Role(Role),
}

/// One ordered policy entry: path prefix, optional method set, requirement.
#[derive(Debug, Clone)]
pub struct PolicyEntry {
    prefix: &'static str,
    methods: Option<&'static [Method]>,
    requirement: Requirement,
}

/// Why a request was denied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    /// No authenticated principal on a route that needs one.
    NoCredential,
    /// Authenticated, but the required role is missing.
    InsufficientRole { required: Role },
}

/// Authorization decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

/// Ordered path/method → required-role table.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    entries: Vec<PolicyEntry>,
}

impl AccessPolicy {
    /// The shipped policy table.
    ///
    /// Administrative paths require ADMIN; deleting a report requires
    /// ADMIN; everything else non-exempt requires an authenticated
    /// principal (the implicit default).
    pub fn standard() -> Self {
        const DELETE_ONLY: &[Method] = &[Method::DELETE];
        Self {
            entries: vec![
                PolicyEntry {
                    prefix: "/api/admin",
                    methods: None,
                    requirement: Requirement::Role(Role::Admin),
                },
                PolicyEntry {
                    prefix: "/api/reports",
                    methods: Some(DELETE_ONLY),
                    requirement: Requirement::Role(Role::Admin),
                },
            ],
        }
    }

    /// Evaluate the table for a request.
    ///
    /// `principal` is `None` for anonymous requests. First matching entry
    /// governs; no match falls back to "authentication required, no
    /// specific role".
    pub fn authorize(
        &self,
        principal: Option<&Principal>,
        path: &str,
        method: &Method,
    ) -> Decision {
        let requirement = self
            .entries
            .iter()
            .find(|entry| {
                path.starts_with(entry.prefix)
                    && entry
                        .methods
                        .map_or(true, |methods| methods.contains(method))
            })
            .map(|entry| entry.requirement)
            .unwrap_or(Requirement::Authenticated);

        match (requirement, principal) {
            (_, None) => Decision::Deny(DenyReason::NoCredential),
            (Requirement::Authenticated, Some(_)) => Decision::Allow,
            (Requirement::Role(required), Some(p)) => {
                if p.has_role(required) {
                    Decision::Allow
                } else {
                    Decision::Deny(DenyReason::InsufficientRole { required })
                }
            }
        }
    }
}

/// One exemption rule: optional method set plus a path prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExemptRule {
    methods: Option<Vec<Method>>,
    prefix: String,
}

#[derive(Debug, Error)]
pub enum ExemptionParseError {
    #[error("empty exemption entry")]
    EmptyEntry,

    #[error("invalid method '{0}' in exemption entry")]
    InvalidMethod(String),

    #[error("exemption path '{0}' must start with '/'")]
    InvalidPath(String),
}

/// Authentication exemption allow-list.
///
/// Exempt requests bypass token handling and authorization entirely. The
/// list is configuration, not code: review it whenever a new public
/// endpoint is added. `OPTIONS` preflight requests are always exempt
/// because browsers send them without credentials.
#[derive(Debug, Clone)]
pub struct ExemptionList {
    rules: Vec<ExemptRule>,
}

impl ExemptionList {
    /// The shipped exemption list: auth endpoints, public report
    /// submission/listing, public CCTV reads, static uploads, health and
    /// metrics.
    pub fn standard() -> Self {
        let entry = |methods: Option<Vec<Method>>, prefix: &str| ExemptRule {
            methods,
            prefix: prefix.to_string(),
        };
        Self {
            rules: vec![
                entry(Some(vec![Method::POST]), "/api/auth/login"),
                entry(Some(vec![Method::POST]), "/api/auth/signup"),
                entry(Some(vec![Method::POST]), "/api/auth/email-check"),
                entry(Some(vec![Method::POST]), "/api/auth/logout"),
                entry(Some(vec![Method::POST]), "/api/auth/refresh"),
                entry(Some(vec![Method::GET, Method::POST]), "/api/reports"),
                entry(Some(vec![Method::GET]), "/api/cctvs"),
                entry(Some(vec![Method::GET]), "/uploads"),
                entry(Some(vec![Method::GET]), "/health"),
                entry(Some(vec![Method::GET]), "/metrics"),
            ],
        }
    }

    /// Parse an override list from configuration.
    ///
    /// Comma-separated entries of the form `"METHOD|METHOD /prefix"` or
    /// just `"/prefix"` (any method):
    ///
    /// ```text
    /// POST /api/auth/login,GET|POST /api/reports,/health
    /// ```
    pub fn parse(spec: &str) -> Result<Self, ExemptionParseError> {
        let mut rules = Vec::new();

        for raw in spec.split(',') {
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }

            let (methods, prefix) = match raw.split_once(' ') {
                Some((methods_part, path_part)) => {
                    let methods = methods_part
                        .split('|')
                        .map(|m| parse_method(m.trim()))
                        .collect::<Result<Vec<_>, _>>()?;
                    (Some(methods), path_part.trim())
                }
                None => (None, raw),
            };

            if !prefix.starts_with('/') {
                return Err(ExemptionParseError::InvalidPath(prefix.to_string()));
            }

            rules.push(ExemptRule {
                methods,
                prefix: prefix.to_string(),
            });
        }

        if rules.is_empty() {
            return Err(ExemptionParseError::EmptyEntry);
        }

        Ok(Self { rules })
    }

    /// Whether a request bypasses authentication.
    pub fn is_exempt(&self, method: &Method, path: &str) -> bool {
        if *method == Method::OPTIONS {
            return true;
        }

        self.rules.iter().any(|rule| {
            path.starts_with(&rule.prefix)
                && rule
                    .methods
                    .as_ref()
                    .map_or(true, |methods| methods.contains(method))
        })
    }
}

/// Strict method-name parse. `http::Method` itself accepts arbitrary
/// extension tokens, which is too lenient for a security allow-list.
fn parse_method(name: &str) -> Result<Method, ExemptionParseError> {
    match name.to_ascii_uppercase().as_str() {
        "GET" => Ok(Method::GET),
        "POST" => Ok(Method::POST),
        "PUT" => Ok(Method::PUT),
        "PATCH" => Ok(Method::PATCH),
        "DELETE" => Ok(Method::DELETE),
        "HEAD" => Ok(Method::HEAD),
        "OPTIONS" => Ok(Method::OPTIONS),
        _ => Err(ExemptionParseError::InvalidMethod(name.to_string())),
    }
}
