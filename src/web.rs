use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::Router;

use crate::client::NotesSource;
use crate::render::{render_not_found, render_topics_page, topics_path};
use crate::viewer::{CourseRoute, TopicBrowser, DEMO_COURSE_ID};

#[derive(Clone)]
pub struct ViewerState {
    pub source: Arc<dyn NotesSource>,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct TopicsPageQuery {
    pub topic: Option<String>,
    pub sidebar: Option<String>,
}

impl TopicsPageQuery {
    /// First value wins for repeated keys; unknown keys are ignored.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = TopicsPageQuery::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "topic" => &mut query.topic,
                "sidebar" => &mut query.sidebar,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        query
    }

    fn topic(&self) -> Option<&str> {
        self.topic.as_deref().filter(|t| !t.is_empty())
    }

    fn sidebar_collapsed(&self) -> bool {
        self.sidebar.as_deref() == Some("collapsed")
    }
}

/// Viewer pages. Unmatched paths get the not-found page.
pub fn router(source: Arc<dyn NotesSource>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/learn/courses/:course_id/topics", get(topics_page))
        .fallback(not_found)
        .with_state(ViewerState { source })
}

async fn root() -> Redirect {
    Redirect::temporary(&topics_path(DEMO_COURSE_ID, None, false))
}

async fn topics_page(
    State(state): State<ViewerState>,
    Path(course_id): Path<String>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response {
    let query = TopicsPageQuery::from_pairs(pairs);
    let source = state.source.as_ref();
    let collapsed = query.sidebar_collapsed();
    let mut browser = TopicBrowser::new(collapsed);

    match browser.resolve_course(source, &course_id).await {
        Some(CourseRoute::Redirect(resolved)) => {
            let target = topics_path(&resolved, query.topic(), collapsed);
            return Redirect::temporary(&target).into_response();
        }
        Some(CourseRoute::Direct(_)) => {}
        None => return Html(render_topics_page(&browser)).into_response(),
    }

    browser.load_topics(source, query.topic()).await;
    browser.load_active_topic(source).await;
    Html(render_topics_page(&browser)).into_response()
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Html(render_not_found()))
}
