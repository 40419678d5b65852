//! Read access to patient records owned by the surrounding CRUD layer.

pub mod directory;
pub mod postgres;

pub use directory::{DirectoryError, InMemoryPatientDirectory, PatientDirectory, SeedData};
pub use postgres::PostgresPatientDirectory;
