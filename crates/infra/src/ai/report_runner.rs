use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{Instrument, error, info, info_span, warn};

use medthing_ai::{ContentGenerator, GeneratedReport, GenerationError, ReportInput, generate_report};
use medthing_core::{Patient, ReportId};

use crate::jobs::{ReportOutcome, ReportStore};
use crate::records::{DirectoryError, PatientDirectory};

/// Work item handed to the runner at submission time.
///
/// `patient` is the profile captured when the report was created; later
/// edits to the record do not affect this run.
#[derive(Debug, Clone)]
pub struct ReportRequest {
    pub report_id: ReportId,
    pub patient: Patient,
}

/// Why a run failed. `Display` is the diagnostic stored on the report.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("database error fetching {collection}")]
    InputResolution {
        collection: &'static str,
        #[source]
        source: DirectoryError,
    },
    #[error(transparent)]
    Generation(#[from] GenerationError),
}

impl RunError {
    fn input(collection: &'static str) -> impl FnOnce(DirectoryError) -> Self {
        move |source| RunError::InputResolution { collection, source }
    }
}

/// Executes report generations in the background.
///
/// Each submission gets its own task. There is no queue, no concurrency cap,
/// and no retry; a run ends with exactly one terminal write or a logged
/// store failure.
#[derive(Clone)]
pub struct ReportRunner {
    store: Arc<dyn ReportStore>,
    directory: Arc<dyn PatientDirectory>,
    generator: Arc<dyn ContentGenerator>,
}

impl ReportRunner {
    pub fn new(
        store: Arc<dyn ReportStore>,
        directory: Arc<dyn PatientDirectory>,
        generator: Arc<dyn ContentGenerator>,
    ) -> Self {
        Self {
            store,
            directory,
            generator,
        }
    }

    /// Detach a run for `request`. The handle may be dropped.
    pub fn spawn(&self, request: ReportRequest) -> JoinHandle<()> {
        let runner = self.clone();
        let span = info_span!(
            "report_run",
            report_id = %request.report_id,
            patient_id = %request.patient.id
        );
        tokio::spawn(async move { runner.run(request).await }.instrument(span))
    }

    /// Run to completion and record the outcome.
    pub async fn run(&self, request: ReportRequest) {
        let report_id = request.report_id;
        let outcome = match self.execute(request.patient).await {
            Ok(GeneratedReport { summary, body }) => {
                info!(summary_len = summary.len(), "report generation completed");
                ReportOutcome::Completed { summary, body }
            }
            Err(err) => {
                error!(error = %err, "report generation failed");
                ReportOutcome::failed(err.to_string())
            }
        };

        if let Err(err) = self.store.update_status_and_result(report_id, outcome).await {
            // Nobody is waiting on this task; the log is the only trace.
            warn!(error = %err, "failed to record report outcome");
        }
    }

    async fn execute(&self, patient: Patient) -> Result<GeneratedReport, RunError> {
        let id = patient.id;
        let (medications, appointments, metrics) = tokio::join!(
            self.directory.fetch_medications(id),
            self.directory.fetch_appointments(id),
            self.directory.fetch_metrics(id),
        );

        let input = ReportInput {
            patient,
            medications: medications.map_err(RunError::input("medications"))?,
            appointments: appointments.map_err(RunError::input("appointments"))?,
            metrics: metrics.map_err(RunError::input("health metrics"))?,
        };

        Ok(generate_report(self.generator.as_ref(), &input).await?)
    }
}
