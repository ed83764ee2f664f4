//! Endpoints that read or change the selection.
//!
//! Mutating endpoints respond with the re-rendered timetable so the front
//! end never has to issue a second request.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{error, info};

use crate::catalog::{Course, FilterCriteria};
use crate::planner::PlannerError;
use crate::schedule::export::CSV_FILE_NAME;
use crate::schedule::{ExportError, Toggled};
use crate::server::types::ApiErrorType;
use crate::types::AppState;

fn course_summary(course: &Course) -> serde_json::Value {
    json!({
        "code": course.code,
        "name": course.name_local,
        "time": crate::schedule::extract_time_encoding(course),
    })
}

/// GET /selection
pub async fn get_selection(State(s): State<Arc<AppState>>) -> Response {
    info!("GET /selection");

    let planner = s.planner();
    (
        StatusCode::OK,
        Json(json!({
            "timetable": planner.timetable(),
            "saved_at": planner.last_saved().map(|t| t.to_rfc3339()),
        })),
    )
        .into_response()
}

/// POST /selection/toggle/:code
///
/// Adds the course if absent, removes it if present. A time conflict is
/// answered with `409` naming both courses.
pub async fn post_toggle(Path(code): Path<String>, State(s): State<Arc<AppState>>) -> Response {
    info!("POST /selection/toggle/{}", code);

    let mut planner = s.planner();
    match planner.toggle(&code) {
        Ok(toggled) => {
            let (action, color) = match toggled {
                Toggled::Added(color) => ("added", Some(color)),
                Toggled::Removed => ("removed", None),
            };
            (
                StatusCode::OK,
                Json(json!({
                    "action": action,
                    "color": color,
                    "timetable": planner.timetable(),
                })),
            )
                .into_response()
        }
        Err(PlannerError::Conflict(conflict)) => (
            StatusCode::CONFLICT,
            Json(json!({
                "error": conflict.to_string(),
                "candidate": course_summary(&conflict.candidate),
                "blocker": course_summary(&conflict.blocker),
            })),
        )
            .into_response(),
        Err(e @ PlannerError::UnknownCourse(_)) => ApiErrorType::from((
            StatusCode::NOT_FOUND,
            "No course with that code",
            Some(e.to_string()),
        ))
        .into_response(),
    }
}

/// POST /selection/select_all
///
/// Filters with the posted criteria, then adds every matching course that
/// fits. Conflicting courses are skipped and counted.
pub async fn post_select_all(
    State(s): State<Arc<AppState>>,
    Json(criteria): Json<FilterCriteria>,
) -> Response {
    info!("POST /selection/select_all ({criteria:?})");

    let mut planner = s.planner();
    planner.apply_filter(criteria);
    let summary = planner.select_all_filtered();
    (
        StatusCode::OK,
        Json(json!({
            "added": summary.added,
            "skipped": summary.skipped,
            "timetable": planner.timetable(),
        })),
    )
        .into_response()
}

/// POST /selection/deselect_all
pub async fn post_deselect_all(
    State(s): State<Arc<AppState>>,
    Json(criteria): Json<FilterCriteria>,
) -> Response {
    info!("POST /selection/deselect_all ({criteria:?})");

    let mut planner = s.planner();
    planner.apply_filter(criteria);
    let removed = planner.deselect_all_filtered();
    (
        StatusCode::OK,
        Json(json!({
            "removed": removed,
            "timetable": planner.timetable(),
        })),
    )
        .into_response()
}

/// DELETE /selection
pub async fn delete_selection(State(s): State<Arc<AppState>>) -> Response {
    info!("DELETE /selection");

    let mut planner = s.planner();
    planner.clear();
    (StatusCode::OK, Json(planner.timetable())).into_response()
}

/// GET /selection/export.csv
pub async fn get_export_csv(State(s): State<Arc<AppState>>) -> Response {
    info!("GET /selection/export.csv");

    match s.planner().export_csv() {
        Ok(csv) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{CSV_FILE_NAME}\""),
                ),
            ],
            csv,
        )
            .into_response(),
        Err(ExportError::EmptySchedule) => ApiErrorType::from((
            StatusCode::BAD_REQUEST,
            "The timetable is empty, nothing to export",
            None,
        ))
        .into_response(),
        Err(e) => {
            error!(error = %e, "CSV export failed");
            ApiErrorType::from((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to export timetable",
                Some(e.to_string()),
            ))
            .into_response()
        }
    }
}
