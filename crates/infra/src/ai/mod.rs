//! AI runners: detached tasks that turn a submitted report into a terminal
//! outcome. They never touch the request path; their only output is the store.

pub mod report_runner;

pub use report_runner::{ReportRequest, ReportRunner, RunError};
