use axum::{Json, response::IntoResponse};

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "success": true,
        "message": "MedThing API is up and running",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
