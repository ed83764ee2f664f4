use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::info;

use crate::types::AppState;

/// GET /health
pub async fn get_health(State(s): State<Arc<AppState>>) -> Response {
    info!("GET /health");

    let status = if s.catalog_error.is_none() { "ok" } else { "degraded" };
    let planner = s.planner();
    (
        StatusCode::OK,
        Json(json!({
            "status": status,
            "courses": planner.catalog().len(),
            "selected": planner.selection().len(),
            "min_credits": planner.min_credits(),
            "catalog_error": s.catalog_error,
        })),
    )
        .into_response()
}
