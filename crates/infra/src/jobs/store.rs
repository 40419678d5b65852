//! Report storage implementations.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use medthing_core::ReportId;

use super::types::{Report, ReportOutcome, ReportStatus};

/// Report store abstraction.
///
/// Operations are individually atomic. `update_status_and_result` is the only
/// mutation after insert and refuses to touch a report that is already terminal.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Persist a freshly created report.
    async fn insert(&self, report: Report) -> Result<ReportId, ReportStoreError>;

    /// Write the terminal outcome of a report.
    async fn update_status_and_result(
        &self,
        id: ReportId,
        outcome: ReportOutcome,
    ) -> Result<(), ReportStoreError>;

    async fn find_by_id(&self, id: ReportId) -> Result<Option<Report>, ReportStoreError>;

    /// Most recent first.
    async fn list(&self, limit: usize) -> Result<Vec<Report>, ReportStoreError>;
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReportStoreError {
    #[error("report not found: {0}")]
    NotFound(ReportId),
    #[error("report already exists: {0}")]
    AlreadyExists(ReportId),
    #[error("report {id} is already {status}")]
    AlreadyTerminal { id: ReportId, status: ReportStatus },
    #[error("storage error: {0}")]
    Storage(String),
}

/// In-memory report store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryReportStore {
    reports: RwLock<HashMap<ReportId, Report>>,
}

impl InMemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

fn poisoned<T>(_: T) -> ReportStoreError {
    ReportStoreError::Storage("lock poisoned".to_string())
}

#[async_trait]
impl ReportStore for InMemoryReportStore {
    async fn insert(&self, report: Report) -> Result<ReportId, ReportStoreError> {
        let mut reports = self.reports.write().map_err(poisoned)?;
        if reports.contains_key(&report.id) {
            return Err(ReportStoreError::AlreadyExists(report.id));
        }
        let id = report.id;
        reports.insert(id, report);
        Ok(id)
    }

    async fn update_status_and_result(
        &self,
        id: ReportId,
        outcome: ReportOutcome,
    ) -> Result<(), ReportStoreError> {
        let mut reports = self.reports.write().map_err(poisoned)?;
        let report = reports.get_mut(&id).ok_or(ReportStoreError::NotFound(id))?;
        if report.status.is_terminal() {
            return Err(ReportStoreError::AlreadyTerminal {
                id,
                status: report.status,
            });
        }
        report.apply(outcome);
        Ok(())
    }

    async fn find_by_id(&self, id: ReportId) -> Result<Option<Report>, ReportStoreError> {
        let reports = self.reports.read().map_err(poisoned)?;
        Ok(reports.get(&id).cloned())
    }

    async fn list(&self, limit: usize) -> Result<Vec<Report>, ReportStoreError> {
        let reports = self.reports.read().map_err(poisoned)?;
        let mut result: Vec<_> = reports.values().cloned().collect();
        // v7 ids break ties between reports created in the same instant
        result.sort_by(|a, b| {
            b.generated_at
                .cmp(&a.generated_at)
                .then_with(|| b.id.as_uuid().cmp(a.id.as_uuid()))
        });
        result.truncate(limit);
        Ok(result)
    }
}

#[async_trait]
impl<S: ReportStore + ?Sized> ReportStore for Arc<S> {
    async fn insert(&self, report: Report) -> Result<ReportId, ReportStoreError> {
        (**self).insert(report).await
    }

    async fn update_status_and_result(
        &self,
        id: ReportId,
        outcome: ReportOutcome,
    ) -> Result<(), ReportStoreError> {
        (**self).update_status_and_result(id, outcome).await
    }

    async fn find_by_id(&self, id: ReportId) -> Result<Option<Report>, ReportStoreError> {
        (**self).find_by_id(id).await
    }

    async fn list(&self, limit: usize) -> Result<Vec<Report>, ReportStoreError> {
        (**self).list(limit).await
    }
}
