use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::{
    tools::{self, Manifest, SearchDescriptor, SearchItem},
    AppState,
};

/// Custom JSON extractor that returns consistent error format.
///
/// Wraps Axum's Json extractor so deserialization errors come back as
/// `{"error": "..."}` instead of plain text.
pub struct ApiJson<T>(pub T);

#[axum::async_trait]
impl<S, T> axum::extract::FromRequest<S> for ApiJson<T>
where
    T: serde::de::DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<Value>);

    async fn from_request(
        req: axum::extract::Request,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => {
                let status = rejection.status();
                let message = match status {
                    StatusCode::UNSUPPORTED_MEDIA_TYPE => {
                        "Missing or invalid Content-Type header. Expected 'application/json'"
                            .to_string()
                    }
                    StatusCode::PAYLOAD_TOO_LARGE => {
                        format!("Request body too large: {}", rejection.body_text())
                    }
                    _ => rejection.body_text(),
                };

                Err((status, Json(json!({ "error": message }))))
            }
        }
    }
}

/// Arguments shared by the search tool and the search task.
#[derive(Debug, Default, Deserialize)]
pub struct QueryArgs {
    #[serde(default)]
    pub query: String,
}

pub fn router(state: Arc<AppState>) -> Router {
    // Only API routes here; /healthz is merged in `toolbox::app`.
    Router::new()
        .route("/info", get(handle_info))
        .route("/tools/search", post(handle_search_tool))
        .route("/tasks/:handler", post(handle_task))
        .with_state(state)
}

async fn handle_info() -> Json<Manifest> {
    Json(tools::manifest())
}

async fn handle_search_tool(ApiJson(args): ApiJson<QueryArgs>) -> Json<SearchDescriptor> {
    debug!(query = %args.query, "search tool invoked");
    Json(tools::search_descriptor(args.query))
}

async fn handle_task(
    State(state): State<Arc<AppState>>,
    Path(handler): Path<String>,
    ApiJson(args): ApiJson<QueryArgs>,
) -> Result<Json<Vec<SearchItem>>, (StatusCode, Json<Value>)> {
    if handler != tools::SEARCH_HANDLER_ID {
        return Err(not_found(format!("unknown task handler '{handler}'")));
    }

    search_handler(&state, &args.query).await.map(Json)
}

async fn search_handler(
    state: &AppState,
    query: &str,
) -> Result<Vec<SearchItem>, (StatusCode, Json<Value>)> {
    let hits = state.backend.search(query).await.map_err(|err| {
        warn!(backend = state.backend.id(), error = %err, "search failed");
        server_unavailable(format!("search failed: {err}"))
    })?;

    info!(query = %query, hits = hits.len(), "search handled");
    Ok(hits.iter().map(tools::hit_to_search_item).collect())
}

fn not_found(message: impl Into<String>) -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "error": message.into() })))
}

fn server_unavailable(message: impl Into<String>) -> (StatusCode, Json<Value>) {
    // Backend problem: retryable, surfaced to the caller as 503.
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({ "error": message.into() })),
    )
}
