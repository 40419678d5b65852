//! Service wiring: picks storage backends and the content generator.

use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use medthing_ai::{ContentGenerator, GeminiClient};
use medthing_infra::ai::ReportRunner;
use medthing_infra::jobs::{InMemoryReportStore, PostgresReportStore, ReportStore};
use medthing_infra::records::{InMemoryPatientDirectory, PatientDirectory, PostgresPatientDirectory};
use medthing_infra::{AppConfig, RateGovernor, RateLimitConfig, ReportService};

#[derive(Clone)]
pub struct AppServices {
    pub reports: ReportService,
    pub governor: Arc<RateGovernor>,
}

impl AppServices {
    pub fn new(
        store: Arc<dyn ReportStore>,
        directory: Arc<dyn PatientDirectory>,
        generator: Arc<dyn ContentGenerator>,
        rate_limit: RateLimitConfig,
    ) -> Self {
        let runner = ReportRunner::new(store.clone(), directory.clone(), generator);
        Self {
            reports: ReportService::new(store, directory, runner),
            governor: Arc::new(RateGovernor::new(rate_limit)),
        }
    }
}

/// Build services from configuration.
///
/// `DATABASE_URL` selects Postgres for both stores; otherwise everything is
/// in memory, optionally seeded from `MEDTHING_SEED_FILE`.
pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let generator: Arc<dyn ContentGenerator> = Arc::new(GeminiClient::new(config.gemini.clone()));

    let (store, directory): (Arc<dyn ReportStore>, Arc<dyn PatientDirectory>) =
        match &config.database_url {
            Some(url) => {
                let pool = PgPoolOptions::new()
                    .max_connections(10)
                    .connect(url)
                    .await
                    .context("failed to connect to DATABASE_URL")?;
                let store = PostgresReportStore::new(pool.clone());
                store.ensure_schema().await.context("failed to prepare reports table")?;
                info!("using postgres-backed stores");
                (Arc::new(store), Arc::new(PostgresPatientDirectory::new(pool)))
            }
            None => {
                let directory = match &config.seed_file {
                    Some(path) => {
                        let d = InMemoryPatientDirectory::from_seed_file(path)?;
                        info!(patients = d.patient_count(), path = %path.display(), "loaded seed data");
                        d
                    }
                    None => InMemoryPatientDirectory::new(),
                };
                info!("using in-memory stores");
                (InMemoryReportStore::arc(), Arc::new(directory))
            }
        };

    Ok(AppServices::new(store, directory, generator, config.rate_limit))
}
