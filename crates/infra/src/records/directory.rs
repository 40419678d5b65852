//! Patient directory abstraction and the in-memory implementation.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde::Deserialize;

use medthing_core::{Appointment, HealthMetric, Medication, Patient, PatientId};

/// Read-only view of a patient's records.
///
/// Collections are empty, not an error, when the patient has no rows.
#[async_trait]
pub trait PatientDirectory: Send + Sync {
    /// `None` when the patient is unknown.
    async fn fetch_profile(&self, id: PatientId) -> Result<Option<Patient>, DirectoryError>;

    async fn fetch_medications(&self, id: PatientId) -> Result<Vec<Medication>, DirectoryError>;

    async fn fetch_appointments(&self, id: PatientId) -> Result<Vec<Appointment>, DirectoryError>;

    async fn fetch_metrics(&self, id: PatientId) -> Result<Vec<HealthMetric>, DirectoryError>;
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DirectoryError {
    #[error("storage error: {0}")]
    Storage(String),
    #[error("invalid seed data: {0}")]
    Seed(String),
}

/// Fixture shape accepted by [`InMemoryPatientDirectory::from_seed_file`].
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SeedData {
    pub patients: Vec<Patient>,
    pub medications: Vec<Medication>,
    pub appointments: Vec<Appointment>,
    pub health_metrics: Vec<HealthMetric>,
}

#[derive(Debug, Default)]
struct Records {
    patients: HashMap<PatientId, Patient>,
    medications: Vec<Medication>,
    appointments: Vec<Appointment>,
    metrics: Vec<HealthMetric>,
}

/// In-memory directory for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryPatientDirectory {
    records: RwLock<Records>,
}

impl InMemoryPatientDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn from_seed(seed: SeedData) -> Self {
        let directory = Self::new();
        // A fresh lock cannot be poisoned.
        if let Ok(mut records) = directory.records.write() {
            records.patients = seed.patients.into_iter().map(|p| (p.id, p)).collect();
            records.medications = seed.medications;
            records.appointments = seed.appointments;
            records.metrics = seed.health_metrics;
        }
        directory
    }

    /// Load a JSON fixture (see [`SeedData`]).
    pub fn from_seed_file(path: impl AsRef<Path>) -> Result<Self, DirectoryError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| DirectoryError::Seed(format!("{}: {e}", path.display())))?;
        let seed: SeedData = serde_json::from_str(&raw)
            .map_err(|e| DirectoryError::Seed(format!("{}: {e}", path.display())))?;
        Ok(Self::from_seed(seed))
    }

    pub fn insert_patient(&self, patient: Patient) -> Result<(), DirectoryError> {
        self.write()?.patients.insert(patient.id, patient);
        Ok(())
    }

    pub fn insert_medication(&self, medication: Medication) -> Result<(), DirectoryError> {
        self.write()?.medications.push(medication);
        Ok(())
    }

    pub fn insert_appointment(&self, appointment: Appointment) -> Result<(), DirectoryError> {
        self.write()?.appointments.push(appointment);
        Ok(())
    }

    pub fn insert_metric(&self, metric: HealthMetric) -> Result<(), DirectoryError> {
        self.write()?.metrics.push(metric);
        Ok(())
    }

    pub fn patient_count(&self) -> usize {
        self.read().map(|r| r.patients.len()).unwrap_or(0)
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Records>, DirectoryError> {
        self.records
            .read()
            .map_err(|_| DirectoryError::Storage("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Records>, DirectoryError> {
        self.records
            .write()
            .map_err(|_| DirectoryError::Storage("lock poisoned".to_string()))
    }
}

#[async_trait]
impl PatientDirectory for InMemoryPatientDirectory {
    async fn fetch_profile(&self, id: PatientId) -> Result<Option<Patient>, DirectoryError> {
        Ok(self.read()?.patients.get(&id).cloned())
    }

    async fn fetch_medications(&self, id: PatientId) -> Result<Vec<Medication>, DirectoryError> {
        let records = self.read()?;
        Ok(records
            .medications
            .iter()
            .filter(|m| m.patient_id == id)
            .cloned()
            .collect())
    }

    async fn fetch_appointments(&self, id: PatientId) -> Result<Vec<Appointment>, DirectoryError> {
        let records = self.read()?;
        Ok(records
            .appointments
            .iter()
            .filter(|a| a.patient_id == id)
            .cloned()
            .collect())
    }

    async fn fetch_metrics(&self, id: PatientId) -> Result<Vec<HealthMetric>, DirectoryError> {
        let records = self.read()?;
        Ok(records
            .metrics
            .iter()
            .filter(|m| m.patient_id == id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl<D: PatientDirectory + ?Sized> PatientDirectory for Arc<D> {
    async fn fetch_profile(&self, id: PatientId) -> Result<Option<Patient>, DirectoryError> {
        (**self).fetch_profile(id).await
    }

    async fn fetch_medications(&self, id: PatientId) -> Result<Vec<Medication>, DirectoryError> {
        (**self).fetch_medications(id).await
    }

    async fn fetch_appointments(&self, id: PatientId) -> Result<Vec<Appointment>, DirectoryError> {
        (**self).fetch_appointments(id).await
    }

    async fn fetch_metrics(&self, id: PatientId) -> Result<Vec<HealthMetric>, DirectoryError> {
        (**self).fetch_metrics(id).await
    }
}
