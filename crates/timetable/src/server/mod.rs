use std::sync::Arc;

use axum::routing::{get, post};
use axum::{middleware as mw, Router};

use crate::server::endpoints::{catalog, selection, status};
use crate::server::middleware::*;
use crate::types::AppState;

mod endpoints;
mod middleware;
pub mod types;

/// Creates a router that can be used by `axum`.
///
/// # Parameters
/// - `app_state`: The app server state.
///
/// # Returns
/// The router.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    // Routes that need a loaded catalog
    let planner_router = Router::new()
        .route("/catalog/departments", get(catalog::get_departments))
        .route("/catalog/grades", get(catalog::get_grades))
        .route("/courses", get(catalog::get_courses))
        .route(
            "/selection",
            get(selection::get_selection).delete(selection::delete_selection),
        )
        .route("/selection/toggle/:code", post(selection::post_toggle))
        .route("/selection/select_all", post(selection::post_select_all))
        .route("/selection/deselect_all", post(selection::post_deselect_all))
        .layer(mw::from_fn_with_state(
            app_state.clone(),
            catalog_validator::validate_catalog,
        ));

    Router::new()
        .route("/health", get(status::get_health))
        // Export reads only the restored selection
        .route("/selection/export.csv", get(selection::get_export_csv))
        .merge(planner_router)
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::db::{KeyValueStore, SqliteStore};
    use crate::planner::Planner;
    use crate::render::ViewRenderer;
    use crate::schedule::SNAPSHOT_KEY;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    const CATALOG_JSON: &str = r#"[
        {"course_code": "M101", "course_name_zh": "微積分", "department": "數學系數學組", "offering_unit": "數學系一年級", "class_time": "13,14", "credits": 3, "instructor": "王老師", "classroom": "E101 - 燕巢"},
        {"course_code": "M102", "course_name_zh": "線性代數", "department": "數學系數學組", "offering_unit": "數學系二年級", "class_time": "14", "credits": 3},
        {"course_code": "M103", "course_name_zh": "統計", "department": "數學系數學組", "offering_unit": "數學系一年級", "class_time": "21", "credits": 2},
        {"course_code": "G201", "course_name_zh": "英文作文", "department": "英語學系碩士班", "class_time": "31", "credits": 2}
    ]"#;

    fn router_with(catalog: Catalog, catalog_error: Option<String>) -> Router {
        router_with_store(catalog, catalog_error, SqliteStore::open_in_memory().unwrap())
    }

    fn router_with_store(
        catalog: Catalog,
        catalog_error: Option<String>,
        store: SqliteStore,
    ) -> Router {
        let mut planner = Planner::new(catalog, store, ViewRenderer::new());
        planner.restore();
        let state = AppState::new(planner, catalog_error);
        create_router(Arc::new(state))
    }

    fn router() -> Router {
        router_with(Catalog::from_json(CATALOG_JSON).unwrap(), None)
    }

    async fn send(
        router: &Router,
        method: Method,
        uri: &str,
        body: Option<&str>,
    ) -> (StatusCode, Vec<u8>) {
        let mut builder = Request::builder().method(method).uri(uri);
        if body.is_some() {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
        }
        let request = builder
            .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
            .unwrap();

        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    async fn send_json(
        router: &Router,
        method: Method,
        uri: &str,
        body: Option<&str>,
    ) -> (StatusCode, Value) {
        let (status, bytes) = send(router, method, uri, body).await;
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send_json(&router(), Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["courses"], 4);
        assert_eq!(body["min_credits"], 9.0);
    }

    #[tokio::test]
    async fn test_courses_by_department_and_grade() {
        let router = router();
        let uri = "/courses?department=%E6%95%B8%E5%AD%B8%E7%B3%BB%E6%95%B8%E5%AD%B8%E7%B5%84&grade=1";
        let (status, body) = send_json(&router, Method::GET, uri, None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 2);
        assert_eq!(body["courses"][0]["code"], "M101");
        assert_eq!(body["courses"][0]["room"], "E101");
        assert_eq!(body["courses"][1]["code"], "M103");
    }

    #[tokio::test]
    async fn test_courses_without_department_or_search_is_empty() {
        let (status, body) = send_json(&router(), Method::GET, "/courses?level=&search=", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 0);
    }

    #[tokio::test]
    async fn test_departments_for_level() {
        let (status, body) =
            send_json(&router(), Method::GET, "/catalog/departments?level=master", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["label"], "文學院");
        assert_eq!(body[0]["departments"][0], "英語學系碩士班");
    }

    #[tokio::test]
    async fn test_grades() {
        let (_, body) = send_json(&router(), Method::GET, "/catalog/grades", None).await;
        let tokens: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|g| g["token"].as_str().unwrap())
            .collect();
        assert_eq!(tokens, vec!["一", "二"]);
    }

    #[tokio::test]
    async fn test_toggle_and_conflict() {
        let router = router();

        let (status, body) = send_json(&router, Method::POST, "/selection/toggle/M101", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["action"], "added");
        assert_eq!(body["timetable"]["legend"][0]["code"], "M101");

        let (status, body) = send_json(&router, Method::POST, "/selection/toggle/M102", None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["candidate"]["code"], "M102");
        assert_eq!(body["blocker"]["code"], "M101");

        let (status, body) = send_json(&router, Method::GET, "/selection", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["timetable"]["legend"].as_array().unwrap().len(), 1);
        assert!(body["saved_at"].is_string());

        let (_, body) = send_json(&router, Method::POST, "/selection/toggle/M101", None).await;
        assert_eq!(body["action"], "removed");
        assert_eq!(body["timetable"]["credits"]["status"], "empty");
    }

    #[tokio::test]
    async fn test_toggle_unknown_course() {
        let (status, _) = send_json(&router(), Method::POST, "/selection/toggle/NOPE", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_select_and_deselect_all() {
        let router = router();
        let criteria = r#"{"department": "數學系數學組"}"#;

        let (status, body) =
            send_json(&router, Method::POST, "/selection/select_all", Some(criteria)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["added"], 2);
        assert_eq!(body["skipped"], 1);

        let (_, body) =
            send_json(&router, Method::POST, "/selection/deselect_all", Some(criteria)).await;
        assert_eq!(body["removed"], 2);
        assert!(body["timetable"]["legend"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clear_and_export() {
        let router = router();

        let (status, _) = send(&router, Method::GET, "/selection/export.csv", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        send(&router, Method::POST, "/selection/toggle/M101", None).await;
        let (status, bytes) = send(&router, Method::GET, "/selection/export.csv", None).await;
        assert_eq!(status, StatusCode::OK);
        let csv = String::from_utf8(bytes).unwrap();
        assert!(csv.starts_with('\u{feff}'));
        assert!(csv.contains("微積分"));

        let (status, body) = send_json(&router, Method::DELETE, "/selection", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["legend"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unavailable_catalog_returns_503() {
        let router = router_with(Catalog::empty(), Some("file not found".to_string()));

        let (status, body) = send_json(&router, Method::GET, "/courses?search=x", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["context"], "file not found");

        let (status, body) = send_json(&router, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "degraded");
    }

    #[tokio::test]
    async fn test_export_restored_selection_without_catalog() {
        let store = SqliteStore::open_in_memory().unwrap();
        let saved = r#"[{"course_code": "M101", "course_name_zh": "微積分", "class_time": "13", "credits": null}]"#;
        store.set(SNAPSHOT_KEY, saved).unwrap();
        let router = router_with_store(Catalog::empty(), Some("file not found".to_string()), store);

        let (status, bytes) = send(&router, Method::GET, "/selection/export.csv", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(String::from_utf8(bytes).unwrap().contains("微積分"));

        let (status, _) = send(&router, Method::GET, "/selection", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
