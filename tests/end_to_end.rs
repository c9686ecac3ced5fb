use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use coursenotes::catalog::{CatalogStore, MemoryCatalog};
use coursenotes::client::LocalClient;
use coursenotes::config::AllowedOrigins;
use coursenotes::seed::{seed, SeedFile};
use coursenotes::server;
use coursenotes::viewer::TopicBrowser;
use tower::ServiceExt;

const INTRO_MARKDOWN: &str = "# Intro\n\nWelcome to **Demo**.\n\n- first\n- second\n\n```rust\nfn main() {}\n```\n";

struct Fixture {
    store: Arc<dyn CatalogStore>,
    course_id: String,
}

impl Fixture {
    fn new() -> Self {
        let file = SeedFile::from_json(&serde_json::json!({
            "courses": [{
                "title": "Demo",
                "topics": [
                    { "title": "Intro", "content": INTRO_MARKDOWN },
                    { "title": "Basics" }
                ]
            }]
        }).to_string())
        .unwrap();

        let store: Arc<dyn CatalogStore> = Arc::new(MemoryCatalog::new());
        let report = seed(store.as_ref(), file).unwrap();
        Fixture {
            store,
            course_id: report.course_ids[0].clone(),
        }
    }

    fn app(&self) -> Router {
        server::app(Arc::clone(&self.store), &AllowedOrigins::Any)
    }

    fn topic_id(&self, title: &str) -> String {
        self.store
            .list_topics(&self.course_id)
            .unwrap()
            .into_iter()
            .find(|t| t.title == title)
            .unwrap()
            .id
    }

    async fn get(&self, uri: &str) -> (StatusCode, Option<String>, String) {
        let response = self
            .app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let body = hyper::body::to_bytes(response.into_body()).await.unwrap();
        (status, location, String::from_utf8(body.to_vec()).unwrap())
    }

    async fn get_json(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        let (status, _, body) = self.get(uri).await;
        (status, serde_json::from_str(&body).unwrap())
    }
}

#[tokio::test]
async fn api_serves_seeded_course() {
    let fx = Fixture::new();

    let (status, body) = fx.get_json("/api/courses").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["courses"][0]["title"], "Demo");
    assert_eq!(body["courses"][0]["id"], fx.course_id.as_str());

    let (status, body) = fx
        .get_json(&format!("/api/courses/{}/topics", fx.course_id))
        .await;
    assert_eq!(status, StatusCode::OK);
    let topics = body["topics"].as_array().unwrap();
    assert_eq!(topics.len(), 2);
    assert_eq!(topics[0]["order"], 1);
    assert_eq!(topics[0]["title"], "Intro");
    assert_eq!(topics[1]["order"], 2);
    assert_eq!(topics[1]["title"], "Basics");
}

#[tokio::test]
async fn topic_detail_round_trips_markdown() {
    let fx = Fixture::new();
    let intro = fx.topic_id("Intro");

    let (status, body) = fx.get_json(&format!("/api/topics/{intro}")).await;
    assert_eq!(status, StatusCode::OK);
    let topic = &body["topic"];
    assert_eq!(topic["id"], intro.as_str());
    assert_eq!(topic["courseId"], fx.course_id.as_str());
    assert_eq!(topic["order"], 1);
    assert_eq!(topic["note"]["content"], INTRO_MARKDOWN);
    assert!(topic["note"]["updatedAt"].is_string());
}

#[tokio::test]
async fn topic_without_note_has_null_note() {
    let fx = Fixture::new();
    let basics = fx.topic_id("Basics");

    let (status, body) = fx.get_json(&format!("/api/topics/{basics}")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["topic"]["note"].is_null());
}

#[tokio::test]
async fn unknown_topic_is_not_found() {
    let fx = Fixture::new();
    let (status, body) = fx.get_json("/api/topics/never-seeded").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, serde_json::json!({ "error": "Topic not found" }));
}

#[tokio::test]
async fn unknown_course_lists_no_topics() {
    let fx = Fixture::new();
    let (status, body) = fx.get_json("/api/courses/nope/topics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({ "topics": [] }));
}

#[tokio::test]
async fn root_redirects_to_demo_route() {
    let fx = Fixture::new();
    let (status, location, _) = fx.get("/").await;
    assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location.as_deref(), Some("/learn/courses/demo/topics"));
}

#[tokio::test]
async fn demo_route_redirects_to_concrete_course() {
    let fx = Fixture::new();
    let (status, location, _) = fx
        .get("/learn/courses/demo/topics?topic=abc&sidebar=collapsed")
        .await;
    assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        location,
        Some(format!(
            "/learn/courses/{}/topics?topic=abc&sidebar=collapsed",
            fx.course_id
        ))
    );
}

#[tokio::test]
async fn topics_page_renders_first_topic_with_navigation() {
    let fx = Fixture::new();
    let basics = fx.topic_id("Basics");

    let (status, _, html) = fx.get(&format!("/learn/courses/{}/topics", fx.course_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("<h1 class=\"course-title\">Demo</h1>"));
    assert!(html.contains("<h1 class=\"note-h1\">Intro</h1>"));
    assert!(html.contains("<strong>Demo</strong>"));
    assert!(html.contains("<span class=\"nav-btn disabled\" aria-disabled=\"true\">&larr; Previous</span>"));
    assert!(html.contains(&format!(
        "<a class=\"nav-btn\" href=\"/learn/courses/{}/topics?topic={}#note\">Next &rarr;</a>",
        fx.course_id, basics
    )));
}

#[tokio::test]
async fn last_topic_page_disables_next_and_shows_fallback() {
    let fx = Fixture::new();
    let basics = fx.topic_id("Basics");

    let (status, _, html) = fx
        .get(&format!("/learn/courses/{}/topics?topic={basics}", fx.course_id))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("No notes found."));
    assert!(html.contains("<span class=\"nav-btn disabled\" aria-disabled=\"true\">Next &rarr;</span>"));
    assert!(html.contains("&larr; Previous</a>"));
}

#[tokio::test]
async fn repeated_topic_parameter_uses_first_value() {
    let fx = Fixture::new();
    let basics = fx.topic_id("Basics");
    let intro = fx.topic_id("Intro");

    let (status, _, html) = fx
        .get(&format!(
            "/learn/courses/{}/topics?topic={basics}&topic={intro}&sidebar=collapsed&sidebar=open",
            fx.course_id
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("No notes found."));
    assert!(html.contains("title=\"2. Basics\">2</a>"));
}

#[tokio::test]
async fn collapsed_sidebar_shows_order_only() {
    let fx = Fixture::new();
    let (_, _, html) = fx
        .get(&format!("/learn/courses/{}/topics?sidebar=collapsed", fx.course_id))
        .await;
    assert!(html.contains("title=\"1. Intro\">1</a>"));
    assert!(html.contains("title=\"2. Basics\">2</a>"));
    assert!(!html.contains("topic-title"));
}

#[tokio::test]
async fn unmatched_path_is_not_found_page() {
    let fx = Fixture::new();
    let (status, _, html) = fx.get("/nowhere").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(html.contains("Not Found"));
}

#[tokio::test]
async fn browser_walks_topics_in_order() {
    let fx = Fixture::new();
    let source = LocalClient::new(Arc::clone(&fx.store));

    let mut browser = TopicBrowser::new(false);
    browser.resolve_course(&source, "demo").await;
    browser.load_topics(&source, None).await;
    browser.load_active_topic(&source).await;
    assert_eq!(browser.active_topic().unwrap().title, "Intro");

    let request = browser.go_next().unwrap();
    let detail = coursenotes::client::NotesSource::topic(&source, &request.topic_id).await;
    assert!(browser.finish_detail_load(&request, detail));
    assert_eq!(browser.active_topic().unwrap().title, "Basics");
    assert!(!browser.can_go_next());
    assert!(browser.go_next().is_none());
}
