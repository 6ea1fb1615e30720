//! HTTP capability injected into providers that talk to web endpoints.
//!
//! Responsibilities:
//! - Define the [`HttpClient`] seam providers use for discovery calls.
//! - Provide [`ReqwestHttpClient`], the production implementation, with
//!   automatic retry of rate-limited (HTTP 429) requests.
//! - Provide [`get_json`] for the common "GET and decode JSON" pattern.
//!
//! Does NOT handle:
//! - Authentication headers (callers add what they need per request).
//! - Retrying on non-429 failures (those surface immediately).
//!
//! Invariants:
//! - Retries back off exponentially: `backoff * 2^attempt`.
//! - `HttpError` messages never include request bodies.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use kconnect_config::constants::{DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_SECS};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

/// Maximum number of redirects followed by the production client.
const DEFAULT_MAX_REDIRECTS: usize = 5;

/// Base delay between rate-limited attempts.
const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_secs(1);

/// Errors produced by an [`HttpClient`].
#[derive(Error, Debug)]
pub enum HttpError {
    #[error("HTTP request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("HTTP {status} from {url}: {message}")]
    Status {
        status: u16,
        url: String,
        message: String,
    },

    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Max retries exceeded: {0} attempts")]
    MaxRetriesExceeded(usize),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to build HTTP client: {0}")]
    Build(String),
}

/// A GET request to be executed by an [`HttpClient`].
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Status and body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Executes HTTP requests on behalf of providers.
///
/// Implementations return `Ok` for any response that was received, whatever
/// its status; transport problems are reported as `Err`.
#[async_trait]
pub trait HttpClient: Send + Sync + fmt::Debug {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError>;
}

/// GET `url` and decode a successful JSON body into `T`.
///
/// # Errors
///
/// Returns [`HttpError::Status`] for non-2xx responses and
/// [`HttpError::Decode`] when the body is not the expected shape.
pub async fn get_json<T: DeserializeOwned>(
    client: &dyn HttpClient,
    url: &str,
) -> Result<T, HttpError> {
    let response = client
        .send(HttpRequest::get(url).header("Accept", "application/json"))
        .await?;

    if !response.is_success() {
        return Err(HttpError::Status {
            status: response.status,
            url: url.to_string(),
            message: error_message(&response.body),
        });
    }

    serde_json::from_str(&response.body).map_err(|source| HttpError::Decode {
        url: url.to_string(),
        source,
    })
}

/// Extract a readable message from an error body.
///
/// OAuth-style `{"error": ..., "error_description": ...}` bodies are
/// condensed; anything else is returned as-is.
fn error_message(body: &str) -> String {
    #[derive(serde::Deserialize)]
    struct OAuthError {
        error: String,
        #[serde(default)]
        error_description: Option<String>,
    }

    match serde_json::from_str::<OAuthError>(body) {
        Ok(OAuthError {
            error,
            error_description: Some(description),
        }) => format!("{}: {}", error, description),
        Ok(OAuthError { error, .. }) => error,
        Err(_) => body.trim().to_string(),
    }
}

/// Production [`HttpClient`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    http: reqwest::Client,
    max_retries: usize,
    retry_backoff: Duration,
}

impl ReqwestHttpClient {
    pub fn builder() -> ReqwestHttpClientBuilder {
        ReqwestHttpClientBuilder::new()
    }

    /// Client with default timeout and retry settings.
    pub fn new() -> Result<Self, HttpError> {
        Self::builder().build()
    }

    fn request_builder(&self, request: &HttpRequest) -> reqwest::RequestBuilder {
        let mut builder = self.http.get(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let max_retries = self.max_retries;

        for attempt in 0..=max_retries {
            let response = self
                .request_builder(&request)
                .send()
                .await
                .map_err(|source| HttpError::Request {
                    url: request.url.clone(),
                    source,
                })?;

            let status = response.status().as_u16();
            if status == 429 {
                if attempt < max_retries {
                    let backoff = self.retry_backoff * 2u32.pow(attempt as u32);
                    debug!(
                        attempt = attempt + 1,
                        max_retries = max_retries + 1,
                        backoff_ms = backoff.as_millis() as u64,
                        "Rate limited (HTTP 429), retrying with exponential backoff"
                    );
                    tokio::time::sleep(backoff).await;
                    continue;
                }
                debug!(
                    attempts = attempt + 1,
                    "Max retries exhausted for rate-limited request"
                );
                return Err(HttpError::MaxRetriesExceeded(max_retries + 1));
            }

            if attempt > 0 {
                debug!(attempt = attempt + 1, "Request succeeded after retry");
            }
            let body = response
                .text()
                .await
                .map_err(|source| HttpError::Request {
                    url: request.url.clone(),
                    source,
                })?;
            return Ok(HttpResponse { status, body });
        }

        Err(HttpError::MaxRetriesExceeded(max_retries + 1))
    }
}

/// Builder for [`ReqwestHttpClient`].
#[derive(Debug, Clone)]
pub struct ReqwestHttpClientBuilder {
    timeout: Duration,
    max_retries: usize,
    retry_backoff: Duration,
    skip_verify: bool,
    user_agent: Option<String>,
}

impl Default for ReqwestHttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
            skip_verify: false,
            user_agent: None,
        }
    }
}

impl ReqwestHttpClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the request timeout. Default is 30 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the maximum number of retries for rate-limited requests.
    pub fn max_retries(mut self, retries: usize) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the base delay between rate-limited attempts. Default is 1 second.
    pub fn retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    /// Set whether to skip TLS certificate verification.
    ///
    /// # Security Warning
    /// Only use this in development or testing environments.
    pub fn skip_verify(mut self, skip: bool) -> Self {
        self.skip_verify = skip;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Build`] if the underlying `reqwest` client fails to build.
    pub fn build(self) -> Result<ReqwestHttpClient, HttpError> {
        let mut http_builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .redirect(reqwest::redirect::Policy::limited(DEFAULT_MAX_REDIRECTS));

        if self.skip_verify {
            tracing::warn!("TLS certificate verification is disabled");
            http_builder = http_builder.danger_accept_invalid_certs(true);
        }
        if let Some(user_agent) = self.user_agent {
            http_builder = http_builder.user_agent(user_agent);
        }

        let http = http_builder
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;

        Ok(ReqwestHttpClient {
            http,
            max_retries: self.max_retries,
            retry_backoff: self.retry_backoff,
        })
    }
}
