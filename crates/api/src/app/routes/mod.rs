use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use medthing_infra::RateGovernor;

use crate::middleware;

pub mod reports;
pub mod system;

/// Router for all authenticated endpoints, mounted under `/api`.
///
/// Only report submission passes through the rate limiter.
pub fn router(governor: Arc<RateGovernor>) -> Router {
    let submit = post(reports::submit_report).layer(axum::middleware::from_fn_with_state(
        governor,
        middleware::rate_limit_middleware,
    ));

    Router::new()
        .route("/reports", submit.get(reports::list_reports))
        .route("/reports/:id", get(reports::get_report))
}
