use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReportRequest {
    pub patient_id: String,
}

#[derive(Debug, Serialize)]
pub struct ReportCreated {
    pub id: medthing_core::ReportId,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListReportsQuery {
    pub limit: Option<usize>,
}

/// Success envelope shared by every JSON endpoint.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: &'static str,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: &'static str, data: T) -> Self {
        Self {
            success: true,
            message,
            data,
        }
    }
}
