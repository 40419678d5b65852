//! Core report types.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use medthing_core::{Patient, PatientId, ReportId};

/// The only report kind this service produces.
pub const REPORT_TYPE: &str = "Comprehensive Health Assessment";

/// Report lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    /// Accepted but not yet handed to a runner
    Pending,
    /// A runner owns the report
    Processing,
    /// Generation succeeded; the body is populated
    Completed,
    /// Generation failed; the summary holds the diagnostic
    Failed,
}

impl ReportStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ReportStatus::Completed | ReportStatus::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "pending",
            ReportStatus::Processing => "processing",
            ReportStatus::Completed => "completed",
            ReportStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ReportStatus::Pending),
            "processing" => Ok(ReportStatus::Processing),
            "completed" => Ok(ReportStatus::Completed),
            "failed" => Ok(ReportStatus::Failed),
            other => Err(format!("unknown report status: {other}")),
        }
    }
}

/// A persisted report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: ReportId,
    pub patient_id: PatientId,
    /// Copied from the patient at creation time.
    pub patient_name: String,
    pub report_type: String,
    pub status: ReportStatus,
    /// Empty until terminal. Holds the diagnostic when failed.
    pub summary: String,
    /// Canonical JSON body; only set when completed.
    pub content: Option<String>,
    /// Set at insertion, never changed.
    pub generated_at: DateTime<Utc>,
}

impl Report {
    /// A fresh report for `patient`, already owned by a runner.
    pub fn processing(patient: &Patient) -> Self {
        Self {
            id: ReportId::new(),
            patient_id: patient.id,
            patient_name: patient.name.clone(),
            report_type: REPORT_TYPE.to_string(),
            status: ReportStatus::Processing,
            summary: String::new(),
            content: None,
            generated_at: Utc::now(),
        }
    }

    /// Apply a terminal outcome. Callers must check the current status first.
    pub fn apply(&mut self, outcome: ReportOutcome) {
        self.status = outcome.status();
        match outcome {
            ReportOutcome::Completed { summary, body } => {
                self.summary = summary;
                self.content = Some(body);
            }
            ReportOutcome::Failed { diagnostic } => {
                self.summary = diagnostic;
                self.content = None;
            }
        }
    }
}

/// Terminal result written by a runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutcome {
    Completed { summary: String, body: String },
    Failed { diagnostic: String },
}

impl ReportOutcome {
    pub fn failed(diagnostic: impl Into<String>) -> Self {
        Self::Failed {
            diagnostic: diagnostic.into(),
        }
    }

    pub fn status(&self) -> ReportStatus {
        match self {
            ReportOutcome::Completed { .. } => ReportStatus::Completed,
            ReportOutcome::Failed { .. } => ReportStatus::Failed,
        }
    }

    pub fn summary(&self) -> &str {
        match self {
            ReportOutcome::Completed { summary, .. } => summary,
            ReportOutcome::Failed { diagnostic } => diagnostic,
        }
    }

    pub fn body(&self) -> Option<&str> {
        match self {
            ReportOutcome::Completed { body, .. } => Some(body),
            ReportOutcome::Failed { .. } => None,
        }
    }
}
