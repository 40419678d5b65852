//! Report submission and query.
//!
//! `submit` validates the patient, inserts a `processing` report and detaches
//! a runner; it never waits on the provider. `get` projects a stored report
//! into the client view and tolerates missing or malformed parts.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use medthing_ai::{ReportPayload, ReportSection};
use medthing_core::{PatientId, ReportId, age_from_birth_date};

use crate::ai::{ReportRequest, ReportRunner};
use crate::jobs::{Report, ReportStatus, ReportStore, ReportStoreError};
use crate::records::{DirectoryError, PatientDirectory};

#[derive(Debug, thiserror::Error)]
pub enum ReportServiceError {
    #[error("patient not found: {0}")]
    PatientNotFound(PatientId),
    #[error("report not found: {0}")]
    ReportNotFound(ReportId),
    #[error(transparent)]
    Store(#[from] ReportStoreError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

/// Patient attributes denormalized into a report view at read time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientInfo {
    pub age: i32,
    pub gender: String,
    pub date_of_birth: String,
}

/// Client-facing projection of a report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportView {
    pub id: ReportId,
    pub patient_id: PatientId,
    pub patient_name: String,
    pub patient_info: PatientInfo,
    pub report_type: String,
    pub summary: String,
    pub sections: Vec<ReportSection>,
    pub recommendations: Vec<String>,
    pub generated_at: chrono::DateTime<Utc>,
    pub status: ReportStatus,
}

#[derive(Clone)]
pub struct ReportService {
    store: Arc<dyn ReportStore>,
    directory: Arc<dyn PatientDirectory>,
    runner: ReportRunner,
}

impl ReportService {
    pub fn new(
        store: Arc<dyn ReportStore>,
        directory: Arc<dyn PatientDirectory>,
        runner: ReportRunner,
    ) -> Self {
        Self {
            store,
            directory,
            runner,
        }
    }

    /// Start generation for `patient_id` and return the new report id.
    pub async fn submit(&self, patient_id: PatientId) -> Result<ReportId, ReportServiceError> {
        let (id, _detached) = self.submit_with_handle(patient_id).await?;
        Ok(id)
    }

    /// Like [`submit`](Self::submit) but hands back the runner's task so
    /// callers can await completion.
    pub async fn submit_with_handle(
        &self,
        patient_id: PatientId,
    ) -> Result<(ReportId, JoinHandle<()>), ReportServiceError> {
        let patient = self
            .directory
            .fetch_profile(patient_id)
            .await?
            .ok_or(ReportServiceError::PatientNotFound(patient_id))?;

        let report = Report::processing(&patient);
        let id = self.store.insert(report).await?;
        info!(report_id = %id, patient_id = %patient_id, "report generation started");

        let handle = self.runner.spawn(ReportRequest {
            report_id: id,
            patient,
        });
        Ok((id, handle))
    }

    pub async fn get(&self, id: ReportId) -> Result<ReportView, ReportServiceError> {
        self.get_on(id, Utc::now().date_naive()).await
    }

    /// Project report `id` with the patient's age computed as of `today`.
    pub async fn get_on(&self, id: ReportId, today: NaiveDate) -> Result<ReportView, ReportServiceError> {
        let report = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(ReportServiceError::ReportNotFound(id))?;

        let patient_info = self.patient_info(&report, today).await;
        let (sections, recommendations) = project_body(&report);

        Ok(ReportView {
            id: report.id,
            patient_id: report.patient_id,
            patient_name: report.patient_name,
            patient_info,
            report_type: report.report_type,
            summary: report.summary,
            sections,
            recommendations,
            generated_at: report.generated_at,
            status: report.status,
        })
    }

    /// Stored reports, most recent first.
    pub async fn list(&self, limit: usize) -> Result<Vec<Report>, ReportServiceError> {
        Ok(self.store.list(limit).await?)
    }

    async fn patient_info(&self, report: &Report, today: NaiveDate) -> PatientInfo {
        let patient = match self.directory.fetch_profile(report.patient_id).await {
            Ok(Some(p)) => p,
            Ok(None) => {
                warn!(report_id = %report.id, patient_id = %report.patient_id, "patient no longer exists");
                return PatientInfo::default();
            }
            Err(err) => {
                warn!(report_id = %report.id, error = %err, "failed to load patient for report view");
                return PatientInfo::default();
            }
        };

        let age = age_from_birth_date(&patient.date_of_birth, today).unwrap_or_else(|err| {
            warn!(patient_id = %patient.id, error = %err, "unparseable birth date; reporting age 0");
            0
        });

        PatientInfo {
            age,
            gender: patient.gender,
            date_of_birth: patient.date_of_birth,
        }
    }
}

fn project_body(report: &Report) -> (Vec<ReportSection>, Vec<String>) {
    let Some(body) = report.content.as_deref() else {
        return (Vec::new(), Vec::new());
    };
    match ReportPayload::parse(body) {
        Ok(payload) => (
            payload.sections().unwrap_or_default(),
            payload.recommendations().unwrap_or_default(),
        ),
        Err(err) => {
            warn!(report_id = %report.id, error = %err, "stored report body is not valid JSON");
            (Vec::new(), Vec::new())
        }
    }
}
