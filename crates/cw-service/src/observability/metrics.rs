//! Metrics definitions for the Curbwatch service.
//!
//! All metrics follow Prometheus naming conventions with a `cw_` prefix
//! and `_total` suffix for counters.
//!
//! # Cardinality
//!
//! Labels are bounded to prevent cardinality explosion:
//! - `status`: 2 values (success, error)
//! - `reason`: fixed set from the verification taxonomy
//! - `kind`: 2 values (access, refresh)
//! - `outcome`: 3 values (allow, deny_unauthenticated, deny_forbidden)

use metrics::counter;

/// Record a token issuance.
///
/// Metric: `cw_token_issuance_total`
/// Labels: `kind`, `status`
pub fn record_token_issuance(kind: &str, status: &str) {
    counter!("cw_token_issuance_total", "kind" => kind.to_string(), "status" => status.to_string())
        .increment(1);
}

/// Record a token validation outcome.
///
/// Metric: `cw_token_validations_total`
/// Labels: `status`, `reason`
pub fn record_token_validation(status: &str, reason: Option<&str>) {
    let reason = reason.unwrap_or("none");
    counter!("cw_token_validations_total", "status" => status.to_string(), "reason" => reason.to_string())
        .increment(1);
}

/// Record an authorization decision.
///
/// Metric: `cw_authz_decisions_total`
/// Labels: `outcome`
pub fn record_authz_decision(outcome: &str) {
    counter!("cw_authz_decisions_total", "outcome" => outcome.to_string()).increment(1);
}
