use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use meili::{Hit, SearchBackend, TaskInfo};
use serde_json::{json, Value};
use tower::ServiceExt;

use toolbox::{tools::SEARCH_HANDLER_ID, AppState};

/// Backend returning canned hits and recording the queries it saw.
#[derive(Default)]
struct StubBackend {
    hits: Vec<Hit>,
    queries: Mutex<Vec<String>>,
}

impl StubBackend {
    fn with_hits(hits: Value) -> Self {
        let hits = hits
            .as_array()
            .expect("hits array")
            .iter()
            .map(|hit| hit.as_object().expect("hit object").clone())
            .collect();
        Self {
            hits,
            queries: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl SearchBackend for StubBackend {
    async fn search(&self, query: &str) -> Result<Vec<Hit>> {
        self.queries.lock().unwrap().push(query.to_string());
        Ok(self.hits.clone())
    }

    async fn add_documents(&self, _documents: &[Value], _primary_key: Option<&str>) -> Result<TaskInfo> {
        unimplemented!("toolbox never uploads documents")
    }

    async fn health(&self) -> Result<()> {
        Ok(())
    }

    fn id(&self) -> &'static str {
        "stub"
    }
}

fn app_with(backend: Arc<StubBackend>) -> Router {
    toolbox::app(Arc::new(AppState::new(backend)))
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn search_task_maps_hits_to_posts() {
    let backend = Arc::new(StubBackend::with_hits(json!([
        { "id": "1", "title": "Traits", "body": "shared behaviour" },
        { "id": "2", "title": "Untitled body missing" },
        { "id": "3" }
    ])));

    let (status, body) = post_json(
        app_with(backend.clone()),
        &format!("/tasks/{SEARCH_HANDLER_ID}"),
        json!({ "query": "traits" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            { "type": "Post", "title": "Traits", "body": "shared behaviour" },
            { "type": "Post", "title": "Untitled body missing", "body": "" },
            { "type": "Post", "title": "", "body": "" }
        ])
    );
    assert_eq!(*backend.queries.lock().unwrap(), vec!["traits".to_string()]);
}

#[tokio::test]
async fn search_task_defaults_to_empty_query() {
    let backend = Arc::new(StubBackend::default());

    let (status, body) = post_json(
        app_with(backend.clone()),
        &format!("/tasks/{SEARCH_HANDLER_ID}"),
        json!({}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
    assert_eq!(*backend.queries.lock().unwrap(), vec![String::new()]);
}

#[tokio::test]
async fn search_tool_returns_descriptor() {
    let (status, body) = post_json(
        app_with(Arc::new(StubBackend::default())),
        "/tools/search",
        json!({ "query": "hello" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["type"], "Search");
    assert_eq!(body["query"], "hello");
    assert_eq!(body["searchType"], "submit");
    assert_eq!(body["searchHandlerName"], SEARCH_HANDLER_ID);
}

#[tokio::test]
async fn unknown_task_is_not_found() {
    let (status, body) = post_json(
        app_with(Arc::new(StubBackend::default())),
        "/tasks/other.handler",
        json!({ "query": "x" }),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("other.handler"));
}

#[tokio::test]
async fn malformed_json_returns_error_object() {
    let app = app_with(Arc::new(StubBackend::default()));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/tools/search")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), 1024).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn info_lists_search_tool() {
    let app = app_with(Arc::new(StubBackend::default()));

    let response = app
        .oneshot(Request::builder().uri("/info").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), 4096).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(body["ns"], "gd-meilisearch");
    assert_eq!(body["title"], "Meilisearch");
    assert_eq!(body["description"], "Hybrid Search Tools");
    assert_eq!(body["tools"][0]["name"], "Search");
    assert_eq!(body["tools"][0]["args"]["query"], "Query");
    assert_eq!(body["tasks"][0], SEARCH_HANDLER_ID);
}
