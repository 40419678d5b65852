//! Patient record shapes.
//!
//! These are owned by the surrounding CRUD layer; the report subsystem only
//! reads them. Field names serialize in camelCase, the shape clients and the
//! generation prompt see.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::PatientId;

/// A patient profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: PatientId,
    pub name: String,
    /// Birth date as `YYYY-MM-DD` text, stored verbatim.
    pub date_of_birth: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub blood_group: String,
    #[serde(default)]
    pub allergies: String,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

impl Patient {
    /// New profile with only the fields the report subsystem needs.
    pub fn new(name: impl Into<String>, date_of_birth: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: PatientId::new(),
            name: name.into(),
            date_of_birth: date_of_birth.into(),
            gender: String::new(),
            contact: String::new(),
            address: String::new(),
            blood_group: String::new(),
            allergies: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = gender.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    pub id: uuid::Uuid,
    pub patient_id: PatientId,
    pub name: String,
    #[serde(default)]
    pub dosage: String,
    #[serde(default)]
    pub frequency: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: uuid::Uuid,
    pub patient_id: PatientId,
    pub date_time: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub status: String,
}

/// A single measurement, e.g. `blood_pressure`, `blood_sugar`, `weight`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthMetric {
    pub id: uuid::Uuid,
    pub patient_id: PatientId,
    #[serde(rename = "type")]
    pub kind: String,
    pub value: f64,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub measured_at: String,
    #[serde(default)]
    pub notes: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patient_serializes_camel_case() {
        let p = Patient::new("Ada", "1990-01-02").with_gender("female");
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(v["dateOfBirth"], "1990-01-02");
        assert_eq!(v["bloodGroup"], "");
        assert_eq!(v["gender"], "female");
    }

    #[test]
    fn metric_kind_maps_to_type_key() {
        let json = serde_json::json!({
            "id": uuid::Uuid::now_v7(),
            "patientId": PatientId::new(),
            "type": "weight",
            "value": 71.5,
            "unit": "kg"
        });
        let m: HealthMetric = serde_json::from_value(json).unwrap();
        assert_eq!(m.kind, "weight");
        assert_eq!(m.measured_at, "");
    }
}
