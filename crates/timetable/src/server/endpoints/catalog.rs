use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::catalog::filter::empty_as_none;
use crate::catalog::{self, FilterCriteria, ProgramLevel};
use crate::types::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct LevelQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub level: Option<ProgramLevel>,
}

/// GET /catalog/departments
///
/// Distinct departments grouped by college.
pub async fn get_departments(
    Query(q): Query<LevelQuery>,
    State(s): State<Arc<AppState>>,
) -> Response {
    info!("GET /catalog/departments (level: {:?})", q.level);

    let planner = s.planner();
    let groups = catalog::departments(planner.catalog().courses(), q.level);
    (StatusCode::OK, Json(groups)).into_response()
}

/// GET /catalog/grades
pub async fn get_grades(
    Query(q): Query<LevelQuery>,
    State(s): State<Arc<AppState>>,
) -> Response {
    info!("GET /catalog/grades (level: {:?})", q.level);

    let planner = s.planner();
    let grades: Vec<_> = catalog::available_grades(planner.catalog().courses(), q.level)
        .into_iter()
        .map(|grade| json!({ "token": grade.token(), "label": grade.label() }))
        .collect();
    (StatusCode::OK, Json(grades)).into_response()
}

/// GET /courses
///
/// Applies the filter and returns the course list with selection flags.
pub async fn get_courses(
    Query(criteria): Query<FilterCriteria>,
    State(s): State<Arc<AppState>>,
) -> Response {
    info!("GET /courses ({criteria:?})");

    let view = s.planner().apply_filter(criteria);
    (StatusCode::OK, Json(view)).into_response()
}
