//! Basecamp 3 API client
//!
//! Wraps outbound HTTP with bearer authentication, retry on transient
//! failures (429 and 5xx, plus transport errors), and a request-budget
//! throttle approximating Basecamp's documented ~50 requests per 10 second
//! rate limit with headroom.

use crate::config::Config;
use crate::task::Task;
use reqwest::Method;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use serde_json::Value;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

/// Additional attempts after the first request.
const MAX_RETRIES: u32 = 3;
const BACKOFF_BASE: Duration = Duration::from_secs(1);
/// Throttle threshold: block once this many requests were issued inside
/// the trailing window.
const THROTTLE_MAX_REQUESTS: u32 = 45;
const THROTTLE_WINDOW: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-2xx response after retries. `message` carries the parsed JSON
    /// error body when the response is structured, raw text otherwise.
    #[error("HTTP Error: {status} - {message}")]
    Status { status: u16, message: String },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid API URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Invalid header value in configuration: {0}")]
    Header(#[from] reqwest::header::InvalidHeaderValue),

    #[error("Failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub app_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Todolist {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub todos_count: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Todo {
    pub id: u64,
    #[serde(default)]
    pub content: String,
}

/// Response to a successful create call.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedTodo {
    pub id: u64,
    #[serde(default)]
    pub app_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Todoset {
    #[serde(default)]
    todolists_url: Option<String>,
}

/// Rolling request counter with a blocking window.
#[derive(Debug)]
struct Throttle {
    max_requests: u32,
    window: Duration,
    request_count: u32,
    last_request: Option<Instant>,
}

impl Throttle {
    fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            request_count: 0,
            last_request: None,
        }
    }

    /// Reserve a request slot. Returns how long the caller must wait before
    /// issuing it; a wait resets the counter for the next window.
    fn reserve(&mut self, now: Instant) -> Option<Duration> {
        let mut wait = None;
        if let Some(last) = self.last_request {
            if self.request_count >= self.max_requests {
                let since_last = now.duration_since(last);
                if since_last < self.window {
                    wait = Some(self.window - since_last);
                    self.request_count = 0;
                }
            }
        }
        self.last_request = Some(now + wait.unwrap_or_default());
        self.request_count += 1;
        wait
    }
}

/// Client for the Basecamp 3 API.
///
/// All operations perform network I/O; `create_todo` is the only mutating
/// one. The throttle state is owned by the instance and touched only on its
/// own request path.
pub struct BasecampClient {
    http: reqwest::Client,
    config: Config,
    throttle: Mutex<Throttle>,
}

impl BasecampClient {
    pub fn new(config: Config) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", config.access_token))?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_str(&config.user_agent)?);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            config,
            throttle: Mutex::new(Throttle::new(THROTTLE_MAX_REQUESTS, THROTTLE_WINDOW)),
        })
    }

    /// List all projects in the account.
    pub async fn get_projects(&self) -> Result<Vec<Project>, ApiError> {
        let url = self.endpoint_url("projects.json")?;
        Ok(self.request(Method::GET, url, None).await?.json().await?)
    }

    /// List the to-do lists of a project by fetching its todoset and
    /// following the embedded listing link.
    pub async fn get_todolists(&self, project_id: &str) -> Result<Vec<Todolist>, ApiError> {
        let url = self.endpoint_url(&format!("buckets/{project_id}/todosets.json"))?;
        let todoset: Todoset = self.request(Method::GET, url, None).await?.json().await?;

        match todoset.todolists_url {
            Some(link) if !link.is_empty() => {
                let url = Url::parse(&link)?;
                Ok(self.request(Method::GET, url, None).await?.json().await?)
            }
            _ => Ok(Vec::new()),
        }
    }

    /// List the to-dos of a list.
    pub async fn get_todos(
        &self,
        project_id: &str,
        todolist_id: &str,
    ) -> Result<Vec<Todo>, ApiError> {
        let url = self.endpoint_url(&format!(
            "buckets/{project_id}/todolists/{todolist_id}/todos.json"
        ))?;
        Ok(self.request(Method::GET, url, None).await?.json().await?)
    }

    /// Create a to-do in the configured project and list.
    pub async fn create_todo(&self, task: &Task) -> Result<CreatedTodo, ApiError> {
        let url = self.endpoint_url(&format!(
            "buckets/{}/todolists/{}/todos.json",
            self.config.project_id, self.config.todolist_id
        ))?;
        let body = serde_json::to_value(task.payload())?;
        Ok(self
            .request(Method::POST, url, Some(body))
            .await?
            .json()
            .await?)
    }

    /// Whether a to-do with the same trimmed title already exists in the
    /// configured list. Lookup failures are swallowed and reported as
    /// "no duplicate" — a false-negative risk on transient outages.
    pub async fn todo_exists(&self, content: &str) -> bool {
        match self
            .get_todos(&self.config.project_id, &self.config.todolist_id)
            .await
        {
            Ok(todos) => {
                let needle = content.trim();
                todos.iter().any(|todo| todo.content.trim() == needle)
            }
            Err(err) => {
                warn!("duplicate check failed, treating as no duplicate: {err}");
                false
            }
        }
    }

    /// Connectivity probe: succeeds iff the project listing call succeeds.
    pub async fn test_connection(&self) -> bool {
        match self.get_projects().await {
            Ok(_) => true,
            Err(err) => {
                debug!("connection test failed: {err}");
                false
            }
        }
    }

    fn endpoint_url(&self, endpoint: &str) -> Result<Url, ApiError> {
        let raw = format!(
            "{}/{}/{endpoint}",
            self.config.api_base_url.trim_end_matches('/'),
            self.config.account_id
        );
        Ok(Url::parse(&raw)?)
    }

    /// Issue one throttled request, retrying transient failures with
    /// exponential backoff before surfacing an error.
    async fn request(
        &self,
        method: Method,
        url: Url,
        body: Option<Value>,
    ) -> Result<reqwest::Response, ApiError> {
        self.throttle_wait().await;

        let mut attempt: u32 = 0;
        loop {
            let mut request = self.http.request(method.clone(), url.clone());
            if let Some(json) = &body {
                request = request.json(json);
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }
                    if is_transient(status.as_u16()) && attempt < MAX_RETRIES {
                        let delay = backoff_delay(attempt);
                        debug!("HTTP {status} from {url}, retrying in {delay:?}");
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        continue;
                    }
                    return Err(Self::status_error(response).await);
                }
                Err(err) if attempt < MAX_RETRIES => {
                    let delay = backoff_delay(attempt);
                    warn!("request to {url} failed ({err}), retrying in {delay:?}");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(ApiError::Transport(err)),
            }
        }
    }

    async fn throttle_wait(&self) {
        let wait = self.throttle.lock().await.reserve(Instant::now());
        if let Some(delay) = wait {
            info!(
                "rate limiting: sleeping {:.1}s before next request",
                delay.as_secs_f64()
            );
            tokio::time::sleep(delay).await;
        }
    }

    async fn status_error(response: reqwest::Response) -> ApiError {
        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<Value>(&text) {
            Ok(parsed) => parsed.to_string(),
            Err(_) => text,
        };
        ApiError::Status { status, message }
    }
}

fn is_transient(status: u16) -> bool {
    status == 429 || (500..600).contains(&status)
}

fn backoff_delay(attempt: u32) -> Duration {
    BACKOFF_BASE * 2u32.pow(attempt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_throttle_under_budget_never_waits() {
        let mut throttle = Throttle::new(45, Duration::from_secs(10));
        let now = Instant::now();
        for _ in 0..44 {
            assert_eq!(throttle.reserve(now), None);
        }
        assert_eq!(throttle.request_count, 44);
    }

    #[test]
    fn test_throttle_blocks_after_budget_within_window() {
        let mut throttle = Throttle::new(45, Duration::from_millis(100));
        let now = Instant::now();
        for _ in 0..45 {
            assert_eq!(throttle.reserve(now), None);
        }

        // 46th request, 40ms into the window: must wait out the remainder
        let wait = throttle.reserve(now + Duration::from_millis(40));
        assert_eq!(wait, Some(Duration::from_millis(60)));
        // the wait resets the counter (the new slot is request 1)
        assert_eq!(throttle.request_count, 1);
    }

    #[test]
    fn test_throttle_counter_resets_after_blocking() {
        let mut throttle = Throttle::new(2, Duration::from_millis(100));
        let now = Instant::now();
        assert_eq!(throttle.reserve(now), None);
        assert_eq!(throttle.reserve(now), None);
        assert!(throttle.reserve(now).is_some());
        // fresh window, plenty of budget again
        assert_eq!(throttle.reserve(now + Duration::from_millis(200)), None);
    }

    #[test]
    fn test_throttle_elapsed_window_does_not_block() {
        let mut throttle = Throttle::new(2, Duration::from_millis(100));
        let now = Instant::now();
        assert_eq!(throttle.reserve(now), None);
        assert_eq!(throttle.reserve(now), None);
        // budget exhausted, but the window has already elapsed
        assert_eq!(throttle.reserve(now + Duration::from_millis(150)), None);
    }

    #[test]
    fn test_transient_statuses() {
        assert!(is_transient(429));
        assert!(is_transient(500));
        assert!(is_transient(503));
        assert!(!is_transient(404));
        assert!(!is_transient(422));
        assert!(!is_transient(200));
    }

    #[test]
    fn test_backoff_is_exponential() {
        assert_eq!(backoff_delay(0), Duration::from_secs(1));
        assert_eq!(backoff_delay(1), Duration::from_secs(2));
        assert_eq!(backoff_delay(2), Duration::from_secs(4));
    }
}
