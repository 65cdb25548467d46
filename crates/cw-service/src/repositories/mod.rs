//! Collaborator access layer.
//!
//! Each collaborator is a trait seam with a Postgres implementation; the
//! auth subsystem and handlers depend only on the traits.

pub mod cctvs;
pub mod reports;
pub mod users;

pub use cctvs::{CctvCatalog, PgCctvCatalog};
pub use reports::{PgReportStore, ReportStore};
pub use users::{PgUserDirectory, UserDirectory};
