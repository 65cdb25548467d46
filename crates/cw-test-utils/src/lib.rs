//! # Curbwatch Test Utilities
//!
//! Shared test utilities for the Curbwatch service.
//!
//! This crate provides:
//! - Test token builders (arbitrary claim shapes, any secret)
//! - In-memory collaborator fakes (user directory, reports, CCTV)
//! - An in-process router harness driving the real middleware stack
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cw_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() {
//!     let backend = TestBackend::with_defaults();
//!     backend.users.add_user("alice@curbwatch.io", "pw", Role::Admin);
//!
//!     let token = TestTokenBuilder::new()
//!         .for_subject("alice@curbwatch.io")
//!         .with_roles("ROLE_ADMIN")
//!         .build();
//!     // drive backend.router with tower::ServiceExt::oneshot
//! }
//! ```

pub mod fakes;
pub mod harness;
pub mod token_builders;

// Re-export commonly used items
pub use fakes::{InMemoryCctvCatalog, InMemoryReportStore, InMemoryUserDirectory};
pub use harness::{TestBackend, TestBackendBuilder};
pub use token_builders::{tamper_signature, TestTokenBuilder, TEST_SECRET};
