//! Authentication and authorization core.
//!
//! # Components
//!
//! - `keys` - Process-wide signing key material (one-time secret decode)
//! - `claims` - Token claims and legacy role-claim normalization
//! - `codec` - Token issuance and verification
//! - `policy` - Path-based access policy and exemption allow-list
//! - `principal` - Verified claims → per-request principal

pub mod claims;
pub mod codec;
pub mod keys;
pub mod policy;
pub mod principal;

pub use claims::Claims;
pub use codec::{TokenCodec, TokenError, VerifiedClaims};
pub use keys::KeyMaterial;
pub use policy::{AccessPolicy, Decision, DenyReason, ExemptionList};
pub use principal::PrincipalResolver;
