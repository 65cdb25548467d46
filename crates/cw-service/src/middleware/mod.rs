//! HTTP middleware layers.
//!
//! # Components
//!
//! - `auth` - Request authentication and policy enforcement

pub mod auth;

pub use auth::authenticate;
