//! `medthing-core`: shared record primitives.
//!
//! Identifiers, the domain error model, and the patient record shapes read by
//! the report subsystem. No storage or transport concerns live here.

pub mod age;
pub mod error;
pub mod id;
pub mod patient;

pub use age::{age_on, age_from_birth_date};
pub use error::{DomainError, DomainResult};
pub use id::{DoctorId, PatientId, ReportId};
pub use patient::{Appointment, HealthMetric, Medication, Patient};
