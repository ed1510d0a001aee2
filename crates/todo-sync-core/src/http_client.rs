//! reqwest implementation of [`TodoApi`].

use crate::api::TodoApi;
use crate::error::{SyncError, SyncResult};
use crate::models::{Item, JobHandle};
use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Longest slice of an error body kept in `SyncError::Api`.
const MAX_ERROR_BODY_CHARS: usize = 200;

/// HTTP client settings.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Service base URL; may include a path prefix such as `/api`.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl HttpClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Serialize)]
struct CreateTodoRequest<'a> {
    title: &'a str,
}

/// Todo service client over HTTP/JSON.
#[derive(Clone)]
pub struct HttpTodoApi {
    http_client: reqwest::Client,
    base_url: Url,
}

impl HttpTodoApi {
    pub fn new(config: HttpClientConfig) -> SyncResult<Self> {
        let raw = config.base_url.trim();
        let base_url = Url::parse(raw)
            .map_err(|e| SyncError::Config(format!("invalid base URL {:?}: {}", raw, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(SyncError::Config(format!(
                "base URL {:?} cannot carry a path",
                raw
            )));
        }

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Base URL with `segments` appended as percent-encoded path segments.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        url.set_query(None);
        url.set_fragment(None);
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn read_json<T: DeserializeOwned>(response: Response, context: &str) -> SyncResult<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, context = %context, "Request rejected by todo service");
            return Err(SyncError::Api {
                status: status.as_u16(),
                message: error_message(status, &body),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

fn error_message(status: StatusCode, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string();
    }
    body.chars().take(MAX_ERROR_BODY_CHARS).collect()
}

#[async_trait]
impl TodoApi for HttpTodoApi {
    async fn list_todos(&self, page: u32, limit: u32) -> SyncResult<Vec<Item>> {
        let mut url = self.endpoint(&["todos"]);
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("limit", &limit.to_string());

        debug!(url = %url, "Listing todos");
        let response = self.http_client.get(url).send().await?;
        let items: Vec<Item> = Self::read_json(response, "list todos").await?;
        debug!(count = items.len(), "Listed todos");
        Ok(items)
    }

    async fn get_todo(&self, id: &str) -> SyncResult<Item> {
        let url = self.endpoint(&["todos", id]);
        debug!(todo_id = %id, "Fetching todo");
        let response = self.http_client.get(url).send().await?;
        Self::read_json(response, "get todo").await
    }

    async fn create_todo(&self, title: &str) -> SyncResult<JobHandle> {
        let url = self.endpoint(&["todos"]);
        let response = self
            .http_client
            .post(url)
            .json(&CreateTodoRequest { title })
            .send()
            .await?;
        let job: JobHandle = Self::read_json(response, "create todo").await?;
        debug!(job_id = %job.id, "Create job accepted");
        Ok(job)
    }

    async fn toggle_todo(&self, id: &str) -> SyncResult<JobHandle> {
        let url = self.endpoint(&["todos", id, "toggle"]);
        let response = self.http_client.post(url).send().await?;
        let job: JobHandle = Self::read_json(response, "toggle todo").await?;
        debug!(todo_id = %id, job_id = %job.id, "Toggle job accepted");
        Ok(job)
    }

    async fn delete_todo(&self, id: &str) -> SyncResult<JobHandle> {
        let url = self.endpoint(&["todos", id]);
        let response = self.http_client.delete(url).send().await?;
        let job: JobHandle = Self::read_json(response, "delete todo").await?;
        debug!(todo_id = %id, job_id = %job.id, "Delete job accepted");
        Ok(job)
    }

    async fn job_status(&self, job_id: &str) -> SyncResult<JobHandle> {
        let url = self.endpoint(&["jobs", job_id]);
        let response = self.http_client.get(url).send().await?;
        Self::read_json(response, "job status").await
    }
}
