use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use tracing::error;

use medthing_infra::ReportServiceError;

pub fn report_error_to_response(err: ReportServiceError) -> axum::response::Response {
    match err {
        ReportServiceError::PatientNotFound(_) => {
            json_error(StatusCode::NOT_FOUND, "not_found", "Patient not found")
        }
        ReportServiceError::ReportNotFound(_) => {
            json_error(StatusCode::NOT_FOUND, "not_found", "Report not found")
        }
        ReportServiceError::Store(e) => {
            error!(error = %e, "report store failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", e.to_string())
        }
        ReportServiceError::Directory(e) => {
            error!(error = %e, "patient directory failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", e.to_string())
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "success": false,
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
