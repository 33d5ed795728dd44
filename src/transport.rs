//! Typed HTTP request/response plumbing shared by every upstream client.
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config;

const USER_AGENT: &str = "seatchecker/0.1";

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid url {url}: {reason}")]
    Url { url: String, reason: String },
    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to build request: {0}")]
    Build(#[source] reqwest::Error),
    #[error("request failed: {0}")]
    Network(#[source] reqwest::Error),
    #[error("unexpected status {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("invalid JSON response: {0}")]
    Decode(#[source] serde_json::Error),
}

impl TransportError {
    /// Whether repeating the same request could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::Network(_) => true,
            TransportError::Status { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Body {
    Json(Vec<u8>),
    Text(String),
}

/// A request relative to the client's base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: Method,
    path: String,
    segments: Vec<String>,
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    body: Option<Body>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            segments: Vec::new(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Append one path segment after `path`; `/` inside it is escaped, not split.
    pub fn segment(mut self, value: impl Into<String>) -> Self {
        self.segments.push(value.into());
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Attach a JSON body. Encoding happens here so a bad payload never reaches the network.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, TransportError> {
        let bytes = serde_json::to_vec(body).map_err(TransportError::Encode)?;
        self.body = Some(Body::Json(bytes));
        Ok(self)
    }

    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.body = Some(Body::Text(body.into()));
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Capped exponential backoff for idempotent requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Delay before retry number `retry` (0-based): base * 2^retry, capped.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 1_u32 << retry.min(10);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    fn attempts_for(&self, method: &Method) -> u32 {
        if *method == Method::GET {
            self.max_retries + 1
        } else {
            1
        }
    }
}

impl From<&config::Http> for RetryPolicy {
    fn from(http: &config::Http) -> Self {
        Self {
            max_retries: http.max_retries,
            base_delay: Duration::from_millis(http.retry_backoff_ms),
            max_delay: Duration::from_millis(http.max_backoff_ms),
        }
    }
}

#[derive(Clone)]
pub struct HttpClient {
    http: Client,
    base_url: Url,
    retry: RetryPolicy,
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    /// Build a client with explicit timeouts and retry policy from configuration.
    pub fn new(base_url: &str, settings: &config::Http) -> Result<Self, TransportError> {
        let base_url = parse_base_url(base_url)?;
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
            .build()
            .map_err(TransportError::Build)?;
        Ok(Self::with_client(http, base_url, RetryPolicy::from(settings)))
    }

    pub fn with_client(http: Client, base_url: Url, retry: RetryPolicy) -> Self {
        Self {
            http,
            base_url,
            retry,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append `path` to the base URL segment by segment, then each of
    /// `segments` verbatim.
    pub fn endpoint(&self, path: &str, segments: &[String]) -> Result<Url, TransportError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| TransportError::Url {
                url: self.base_url.to_string(),
                reason: "cannot be a base".into(),
            })?
            .pop_if_empty()
            .extend(path.split('/').filter(|s| !s.is_empty()))
            .extend(segments);
        Ok(url)
    }

    pub fn build_request(&self, req: &Request) -> Result<reqwest::Request, TransportError> {
        let url = self.endpoint(&req.path, &req.segments)?;
        let mut builder = self.http.request(req.method.clone(), url);
        if !req.query.is_empty() {
            builder = builder.query(&req.query);
        }
        for (name, value) in &req.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match &req.body {
            Some(Body::Json(bytes)) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(bytes.clone()),
            Some(Body::Text(text)) => builder
                .header(CONTENT_TYPE, "text/plain; charset=utf-8")
                .body(text.clone()),
            None => builder,
        };
        builder.build().map_err(TransportError::Build)
    }

    /// Execute `req` and decode the body as `T`.
    pub async fn send_json<T: DeserializeOwned>(&self, req: &Request) -> Result<T, TransportError> {
        let body = self.send(req).await?;
        serde_json::from_str(&body).map_err(TransportError::Decode)
    }

    /// Execute `req` and return the raw body. Only GET requests are retried.
    pub async fn send(&self, req: &Request) -> Result<String, TransportError> {
        let attempts = self.retry.attempts_for(&req.method);
        let mut retry = 0;
        loop {
            match self.execute_once(req).await {
                Ok(body) => return Ok(body),
                Err(err) if retry + 1 < attempts && err.is_retryable() => {
                    let delay = self.retry.delay_for(retry);
                    warn!(
                        error = %err,
                        path = req.path(),
                        attempt = retry + 1,
                        delay_ms = delay.as_millis() as u64,
                        "request failed; retrying"
                    );
                    tokio::time::sleep(delay).await;
                    retry += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn execute_once(&self, req: &Request) -> Result<String, TransportError> {
        let request = self.build_request(req)?;
        debug!(method = %request.method(), path = request.url().path(), "sending request");
        let res = self
            .http
            .execute(request)
            .await
            .map_err(TransportError::Network)?;

        let status = res.status();
        debug!(%status, path = req.path(), "received response");
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(TransportError::Status { status, body });
        }
        res.text().await.map_err(TransportError::Network)
    }
}

fn parse_base_url(raw: &str) -> Result<Url, TransportError> {
    Url::parse(raw.trim()).map_err(|err| TransportError::Url {
        url: raw.to_string(),
        reason: err.to_string(),
    })
}
