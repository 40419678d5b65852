//! Report jobs: the persisted record of one asynchronous generation.
//!
//! ## Design
//!
//! - A report is inserted in `processing` and is visible to queries at once
//! - It moves to `completed` or `failed` exactly once, written by its own runner
//! - Each store operation is independent; no multi-row transactions
//!
//! ## Components
//!
//! - `Report`: the persisted record
//! - `ReportStore`: persistence seam (in-memory or Postgres)

pub mod postgres;
pub mod store;
pub mod types;

pub use postgres::PostgresReportStore;
pub use store::{InMemoryReportStore, ReportStore, ReportStoreError};
pub use types::{REPORT_TYPE, Report, ReportOutcome, ReportStatus};
