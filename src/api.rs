use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};

use crate::catalog::{run_blocking, CatalogStore};
use crate::error::ApiError;
use crate::models::{CoursesResponse, HealthResponse, TopicResponse, TopicsResponse};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CatalogStore>,
}

/// JSON routes: health probe plus the three read endpoints.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/courses", get(list_courses))
        .route("/api/courses/:course_id/topics", get(list_topics))
        .route("/api/topics/:topic_id", get(get_topic))
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}

async fn list_courses(State(state): State<AppState>) -> Result<Json<CoursesResponse>, ApiError> {
    let courses = run_blocking(&state.store, |store| store.list_courses())
        .await
        .map_err(|e| ApiError::from_catalog(e, "Failed to fetch courses"))?;
    Ok(Json(CoursesResponse { courses }))
}

async fn list_topics(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> Result<Json<TopicsResponse>, ApiError> {
    let topics = run_blocking(&state.store, move |store| store.list_topics(&course_id))
        .await
        .map_err(|e| ApiError::from_catalog(e, "Failed to fetch topics"))?;
    Ok(Json(TopicsResponse { topics }))
}

async fn get_topic(
    State(state): State<AppState>,
    Path(topic_id): Path<String>,
) -> Result<Json<TopicResponse>, ApiError> {
    let topic = run_blocking(&state.store, move |store| store.get_topic(&topic_id))
        .await
        .map_err(|e| ApiError::from_catalog(e, "Failed to fetch topic"))?;
    Ok(Json(TopicResponse { topic }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MemoryCatalog;
    use crate::error::CatalogError;
    use crate::models::{CourseSummary, TopicDetail, TopicSummary};
    use crate::seed::SeedBatch;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    /// Store whose every call fails, to exercise the 500 path.
    struct BrokenStore;

    impl CatalogStore for BrokenStore {
        fn list_courses(&self) -> Result<Vec<CourseSummary>, CatalogError> {
            Err(CatalogError::Migration("password authentication failed".into()))
        }
        fn list_topics(&self, _: &str) -> Result<Vec<TopicSummary>, CatalogError> {
            Err(CatalogError::Poisoned)
        }
        fn get_topic(&self, _: &str) -> Result<TopicDetail, CatalogError> {
            Err(CatalogError::Poisoned)
        }
        fn count_courses(&self) -> Result<i64, CatalogError> {
            Err(CatalogError::Poisoned)
        }
        fn replace_all(&self, _: &SeedBatch) -> Result<(), CatalogError> {
            Err(CatalogError::Poisoned)
        }
    }

    async fn call(store: Arc<dyn CatalogStore>, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = router(AppState { store })
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = hyper::body::to_bytes(response.into_body()).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (status, body) = call(Arc::new(MemoryCatalog::new()), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({ "ok": true }));
    }

    #[tokio::test]
    async fn empty_store_lists_no_courses() {
        let (status, body) = call(Arc::new(MemoryCatalog::new()), "/api/courses").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({ "courses": [] }));
    }

    #[tokio::test]
    async fn store_failures_are_generic_500s() {
        let (status, body) = call(Arc::new(BrokenStore), "/api/courses").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, serde_json::json!({ "error": "Failed to fetch courses" }));

        let (status, body) = call(Arc::new(BrokenStore), "/api/courses/x/topics").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, serde_json::json!({ "error": "Failed to fetch topics" }));

        let (status, body) = call(Arc::new(BrokenStore), "/api/topics/x").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, serde_json::json!({ "error": "Failed to fetch topic" }));
    }

    #[tokio::test]
    async fn unknown_topic_is_404() {
        let (status, body) = call(Arc::new(MemoryCatalog::new()), "/api/topics/missing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, serde_json::json!({ "error": "Topic not found" }));
    }
}
