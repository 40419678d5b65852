use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path, Query, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;

use medthing_core::{PatientId, ReportId};

use crate::app::dto::{ApiResponse, ListReportsQuery, ReportCreated, SubmitReportRequest};
use crate::app::errors::{self, json_error};
use crate::app::services::AppServices;
use crate::context::DoctorContext;

const DEFAULT_LIST_LIMIT: usize = 100;

pub async fn submit_report(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(doctor): Extension<DoctorContext>,
    body: Result<Json<SubmitReportRequest>, JsonRejection>,
) -> axum::response::Response {
    let Ok(Json(body)) = body else {
        return json_error(StatusCode::BAD_REQUEST, "invalid_body", "Invalid request body");
    };
    let patient_id: PatientId = match body.patient_id.parse() {
        Ok(id) => id,
        Err(_) => return json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid patient id"),
    };

    match services.reports.submit(patient_id).await {
        Ok(id) => {
            info!(doctor_id = %doctor.doctor_id(), report_id = %id, "report requested");
            (
                StatusCode::ACCEPTED,
                Json(ApiResponse::ok("Report generation started", ReportCreated { id })),
            )
                .into_response()
        }
        Err(e) => errors::report_error_to_response(e),
    }
}

pub async fn list_reports(
    Extension(services): Extension<Arc<AppServices>>,
    query: Option<Query<ListReportsQuery>>,
) -> axum::response::Response {
    let limit = query
        .and_then(|Query(q)| q.limit)
        .unwrap_or(DEFAULT_LIST_LIMIT);

    match services.reports.list(limit).await {
        Ok(reports) => Json(ApiResponse::ok("Reports retrieved successfully", reports)).into_response(),
        Err(e) => errors::report_error_to_response(e),
    }
}

pub async fn get_report(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ReportId = match id.parse() {
        Ok(v) => v,
        Err(_) => return json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid report id"),
    };

    match services.reports.get(id).await {
        Ok(view) => Json(ApiResponse::ok("Report retrieved successfully", view)).into_response(),
        Err(e) => errors::report_error_to_response(e),
    }
}
