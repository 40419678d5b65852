//! Postgres-backed patient directory.
//!
//! Reads the tables maintained by the CRUD layer: `patients`, `medications`,
//! `appointments`, `health_metrics`. Columns are snake_case; dates other than
//! the audit timestamps are stored as text.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use medthing_core::{Appointment, HealthMetric, Medication, Patient, PatientId};

use super::directory::{DirectoryError, PatientDirectory};

#[derive(Clone)]
pub struct PostgresPatientDirectory {
    pool: Arc<PgPool>,
}

impl PostgresPatientDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

fn storage(operation: &str) -> impl Fn(sqlx::Error) -> DirectoryError + '_ {
    move |e| DirectoryError::Storage(format!("sqlx error in {operation}: {e}"))
}

fn patient_from_row(row: &PgRow) -> Result<Patient, sqlx::Error> {
    Ok(Patient {
        id: PatientId::from_uuid(row.try_get("id")?),
        name: row.try_get("name")?,
        date_of_birth: row.try_get("date_of_birth")?,
        gender: row.try_get("gender")?,
        contact: row.try_get("contact")?,
        address: row.try_get("address")?,
        blood_group: row.try_get("blood_group")?,
        allergies: row.try_get("allergies")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn medication_from_row(row: &PgRow) -> Result<Medication, sqlx::Error> {
    Ok(Medication {
        id: row.try_get("id")?,
        patient_id: PatientId::from_uuid(row.try_get("patient_id")?),
        name: row.try_get("name")?,
        dosage: row.try_get("dosage")?,
        frequency: row.try_get("frequency")?,
        start_date: row.try_get("start_date")?,
        end_date: row.try_get("end_date")?,
        notes: row.try_get("notes")?,
    })
}

fn appointment_from_row(row: &PgRow) -> Result<Appointment, sqlx::Error> {
    Ok(Appointment {
        id: row.try_get("id")?,
        patient_id: PatientId::from_uuid(row.try_get("patient_id")?),
        date_time: row.try_get("date_time")?,
        kind: row.try_get("type")?,
        notes: row.try_get("notes")?,
        status: row.try_get("status")?,
    })
}

fn metric_from_row(row: &PgRow) -> Result<HealthMetric, sqlx::Error> {
    Ok(HealthMetric {
        id: row.try_get("id")?,
        patient_id: PatientId::from_uuid(row.try_get("patient_id")?),
        kind: row.try_get("type")?,
        value: row.try_get("value")?,
        unit: row.try_get("unit")?,
        measured_at: row.try_get("measured_at")?,
        notes: row.try_get("notes")?,
    })
}

#[async_trait]
impl PatientDirectory for PostgresPatientDirectory {
    async fn fetch_profile(&self, id: PatientId) -> Result<Option<Patient>, DirectoryError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, date_of_birth, gender, contact, address, blood_group,
                   allergies, created_at, updated_at
              FROM patients
             WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(storage("fetch_profile"))?;

        row.as_ref()
            .map(patient_from_row)
            .transpose()
            .map_err(storage("fetch_profile"))
    }

    async fn fetch_medications(&self, id: PatientId) -> Result<Vec<Medication>, DirectoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, patient_id, name, dosage, frequency, start_date, end_date, notes
              FROM medications
             WHERE patient_id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(storage("fetch_medications"))?;

        rows.iter()
            .map(medication_from_row)
            .collect::<Result<_, _>>()
            .map_err(storage("fetch_medications"))
    }

    async fn fetch_appointments(&self, id: PatientId) -> Result<Vec<Appointment>, DirectoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, patient_id, date_time, type, notes, status
              FROM appointments
             WHERE patient_id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(storage("fetch_appointments"))?;

        rows.iter()
            .map(appointment_from_row)
            .collect::<Result<_, _>>()
            .map_err(storage("fetch_appointments"))
    }

    async fn fetch_metrics(&self, id: PatientId) -> Result<Vec<HealthMetric>, DirectoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, patient_id, type, value, unit, measured_at, notes
              FROM health_metrics
             WHERE patient_id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(storage("fetch_metrics"))?;

        rows.iter()
            .map(metric_from_row)
            .collect::<Result<_, _>>()
            .map_err(storage("fetch_metrics"))
    }
}
