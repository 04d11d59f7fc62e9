//! Search backend abstraction and the Meilisearch HTTP client.

use std::env;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

pub const ENV_URL: &str = "MS_URL";
pub const ENV_MASTER_KEY: &str = "MS_MASTER_KEY";
pub const ENV_INDEX_NAME: &str = "MS_INDEX_NAME";

pub const DEFAULT_URL: &str = "http://127.0.0.1:7700";
pub const DEFAULT_INDEX_NAME: &str = "SearchIndex";

/// A single search hit as returned by the backend (an arbitrary JSON document).
pub type Hit = Map<String, Value>;

/// Public trait that every search backend must fulfill.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Run a full-text query against the configured index.
    async fn search(&self, query: &str) -> Result<Vec<Hit>>;

    /// Enqueue documents for indexing. Returns the task the backend created.
    async fn add_documents(&self, documents: &[Value], primary_key: Option<&str>)
        -> Result<TaskInfo>;

    /// Succeeds when the backend reports itself available.
    async fn health(&self) -> Result<()>;

    /// Short identifier (e.g. `"meilisearch"`).
    fn id(&self) -> &'static str;
}

/// Connection settings for a Meilisearch instance.
#[derive(Clone)]
pub struct MeiliConfig {
    pub url: String,
    pub master_key: String,
    pub index: String,
}

impl MeiliConfig {
    /// Read `MS_URL`, `MS_MASTER_KEY` and `MS_INDEX_NAME`, falling back to a
    /// local unauthenticated instance.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            url: lookup(ENV_URL).unwrap_or_else(|| DEFAULT_URL.to_string()),
            master_key: lookup(ENV_MASTER_KEY).unwrap_or_default(),
            index: lookup(ENV_INDEX_NAME).unwrap_or_else(|| DEFAULT_INDEX_NAME.to_string()),
        }
    }
}

// Hand-written so the master key never ends up in logs.
impl std::fmt::Debug for MeiliConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeiliConfig")
            .field("url", &self.url)
            .field("master_key", &if self.master_key.is_empty() { "" } else { "***" })
            .field("index", &self.index)
            .finish()
    }
}

/// Summary of an enqueued Meilisearch task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInfo {
    pub task_uid: u64,
    #[serde(default)]
    pub index_uid: Option<String>,
    pub status: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// HTTP client bound to one index of a Meilisearch instance.
#[derive(Clone)]
pub struct MeiliClient {
    client: Client,
    url: String,
    master_key: String,
    index: String,
}

impl MeiliClient {
    /// Build a new client from configuration.
    pub fn new(config: MeiliConfig) -> Self {
        let MeiliConfig {
            url,
            master_key,
            index,
        } = config;
        Self {
            client: Client::new(),
            url: url.trim_end_matches('/').to_string(),
            master_key,
            index,
        }
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        if self.master_key.is_empty() {
            request
        } else {
            request.bearer_auth(&self.master_key)
        }
    }
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    q: &'a str,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
}

async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(anyhow!("meilisearch responded with status {status}: {body}"))
}

#[async_trait]
impl SearchBackend for MeiliClient {
    async fn search(&self, query: &str) -> Result<Vec<Hit>> {
        let url = format!("{}/indexes/{}/search", self.url, self.index);
        debug!(index = %self.index, query_len = query.len(), "searching");

        let response = self
            .authorize(self.client.post(url))
            .json(&SearchRequest { q: query })
            .send()
            .await?;

        let body: SearchResponse = ensure_success(response).await?.json().await?;
        Ok(body.hits)
    }

    async fn add_documents(
        &self,
        documents: &[Value],
        primary_key: Option<&str>,
    ) -> Result<TaskInfo> {
        if documents.is_empty() {
            return Err(anyhow!("refusing to upload an empty document batch"));
        }

        let url = format!("{}/indexes/{}/documents", self.url, self.index);
        let mut request = self.authorize(self.client.post(url)).json(documents);
        if let Some(key) = primary_key {
            request = request.query(&[("primaryKey", key)]);
        }

        let response = request.send().await?;
        let task: TaskInfo = ensure_success(response).await?.json().await?;
        debug!(task_uid = task.task_uid, documents = documents.len(), "documents enqueued");
        Ok(task)
    }

    async fn health(&self) -> Result<()> {
        let response = self
            .client
            .get(format!("{}/health", self.url))
            .send()
            .await?;

        let body: HealthResponse = ensure_success(response).await?.json().await?;
        if body.status != "available" {
            return Err(anyhow!("meilisearch reported status '{}'", body.status));
        }
        Ok(())
    }

    fn id(&self) -> &'static str {
        "meilisearch"
    }
}
