use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use crate::server::types::ApiErrorType;
use crate::types::AppState;

/// Rejects catalog and selection requests while no catalog is loaded.
pub async fn validate_catalog(
    State(s): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    if let Some(reason) = &s.catalog_error {
        warn!(path = %req.uri().path(), "Rejecting request, catalog unavailable");
        return ApiErrorType::from((
            StatusCode::SERVICE_UNAVAILABLE,
            "The course catalog could not be loaded. Please try again later.",
            Some(reason.clone()),
        ))
        .into_response();
    }

    next.run(req).await
}
