//! Infrastructure layer: report persistence, patient data access, the
//! background report runner, request admission, and configuration.

pub mod ai;
pub mod config;
pub mod jobs;
pub mod rate_limit;
pub mod records;
pub mod reports;

pub use config::{AppConfig, ConfigError};
pub use rate_limit::{Admission, RateGovernor, RateLimitConfig, RateSweeperHandle};
pub use reports::{PatientInfo, ReportService, ReportServiceError, ReportView};
