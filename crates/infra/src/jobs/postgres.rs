//! Postgres-backed report store.
//!
//! The terminal transition is a single conditional `UPDATE ... WHERE status
//! NOT IN ('completed', 'failed')`, so two writers can never both succeed.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tracing::instrument;

use medthing_core::{PatientId, ReportId};

use super::store::{ReportStore, ReportStoreError};
use super::types::{Report, ReportOutcome, ReportStatus};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS reports (
    id            UUID PRIMARY KEY,
    patient_id    UUID NOT NULL,
    patient_name  TEXT NOT NULL,
    report_type   TEXT NOT NULL,
    status        TEXT NOT NULL,
    summary       TEXT NOT NULL DEFAULT '',
    content       TEXT,
    generated_at  TIMESTAMPTZ NOT NULL
)
"#;

#[derive(Clone)]
pub struct PostgresReportStore {
    pool: Arc<PgPool>,
}

impl PostgresReportStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Create the `reports` table if it does not exist.
    pub async fn ensure_schema(&self) -> Result<(), ReportStoreError> {
        sqlx::query(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }
}

#[async_trait]
impl ReportStore for PostgresReportStore {
    #[instrument(skip(self, report), fields(report_id = %report.id))]
    async fn insert(&self, report: Report) -> Result<ReportId, ReportStoreError> {
        sqlx::query(
            r#"
            INSERT INTO reports
                (id, patient_id, patient_name, report_type, status, summary, content, generated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(report.id.as_uuid())
        .bind(report.patient_id.as_uuid())
        .bind(&report.patient_name)
        .bind(&report.report_type)
        .bind(report.status.as_str())
        .bind(&report.summary)
        .bind(report.content.as_deref())
        .bind(report.generated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ReportStoreError::AlreadyExists(report.id)
            } else {
                map_sqlx_error("insert", e)
            }
        })?;
        Ok(report.id)
    }

    #[instrument(skip(self, outcome), fields(report_id = %id, status = %outcome.status()))]
    async fn update_status_and_result(
        &self,
        id: ReportId,
        outcome: ReportOutcome,
    ) -> Result<(), ReportStoreError> {
        let updated = sqlx::query(
            r#"
            UPDATE reports
               SET status = $2, summary = $3, content = $4
             WHERE id = $1 AND status NOT IN ('completed', 'failed')
            "#,
        )
        .bind(id.as_uuid())
        .bind(outcome.status().as_str())
        .bind(outcome.summary())
        .bind(outcome.body())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_status_and_result", e))?
        .rows_affected();

        if updated == 1 {
            return Ok(());
        }
        match self.find_by_id(id).await? {
            None => Err(ReportStoreError::NotFound(id)),
            Some(existing) => Err(ReportStoreError::AlreadyTerminal {
                id,
                status: existing.status,
            }),
        }
    }

    async fn find_by_id(&self, id: ReportId) -> Result<Option<Report>, ReportStoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, patient_id, patient_name, report_type, status, summary, content, generated_at
              FROM reports
             WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_by_id", e))?;

        row.map(|r| report_from_row(&r)).transpose()
    }

    async fn list(&self, limit: usize) -> Result<Vec<Report>, ReportStoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, patient_id, patient_name, report_type, status, summary, content, generated_at
              FROM reports
             ORDER BY generated_at DESC, id DESC
             LIMIT $1
            "#,
        )
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list", e))?;

        rows.iter().map(report_from_row).collect()
    }
}

fn report_from_row(row: &sqlx::postgres::PgRow) -> Result<Report, ReportStoreError> {
    let read = |e: sqlx::Error| ReportStoreError::Storage(format!("failed to read report row: {e}"));

    let status: String = row.try_get("status").map_err(read)?;
    let generated_at: DateTime<Utc> = row.try_get("generated_at").map_err(read)?;
    Ok(Report {
        id: ReportId::from_uuid(row.try_get("id").map_err(read)?),
        patient_id: PatientId::from_uuid(row.try_get("patient_id").map_err(read)?),
        patient_name: row.try_get("patient_name").map_err(read)?,
        report_type: row.try_get("report_type").map_err(read)?,
        status: status
            .parse::<ReportStatus>()
            .map_err(ReportStoreError::Storage)?,
        summary: row.try_get("summary").map_err(read)?,
        content: row.try_get("content").map_err(read)?,
        generated_at,
    })
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> ReportStoreError {
    match err {
        sqlx::Error::PoolClosed => {
            ReportStoreError::Storage(format!("connection pool closed in {operation}"))
        }
        other => ReportStoreError::Storage(format!("sqlx error in {operation}: {other}")),
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        if let Some(code) = db_err.code() {
            return code.as_ref() == "23505";
        }
    }
    false
}
