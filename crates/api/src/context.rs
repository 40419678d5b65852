use medthing_core::DoctorId;

/// Authenticated doctor for a request.
///
/// Inserted by the auth middleware; present on every `/api` route.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DoctorContext {
    doctor_id: DoctorId,
}

impl DoctorContext {
    pub fn new(doctor_id: DoctorId) -> Self {
        Self { doctor_id }
    }

    pub fn doctor_id(&self) -> DoctorId {
        self.doctor_id
    }
}
