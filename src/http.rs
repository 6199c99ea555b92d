//! Outbound HTTP with a bounded retry policy.
//!
//! The [`Transport`] trait performs exactly one attempt; [`RetryClient`]
//! layers the retry policy on top so the same policy serves both the
//! analysis and the generation calls.

use crate::error::{FetchError, TransportError};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// HTTP method subset used by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// A transport-agnostic request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub timeout: Duration,
}

impl HttpRequest {
    /// Create a GET request with a 30 second timeout
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
            timeout: Duration::from_secs(30),
        }
    }

    /// Create a POST request carrying a JSON body
    pub fn post_json(url: impl Into<String>, body: String) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: Some(body),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Look up a header value by case-insensitive name
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Status code and decoded body of a completed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,

    /// URL the body was served from after redirects, when the transport knows it
    pub final_url: Option<String>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            final_url: None,
        }
    }

    pub fn with_final_url(mut self, url: impl Into<String>) -> Self {
        self.final_url = Some(url.into());
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs a single HTTP attempt.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// [`Transport`] backed by a shared `reqwest` client.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| TransportError::Other(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.timeout(request.timeout).send().await?;
        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let body = response.text().await?;

        Ok(HttpResponse::new(status, body).with_final_url(final_url))
    }
}

/// Default retry predicate: only server errors are retried
pub fn is_server_error(status: u16) -> bool {
    status >= 500
}

/// Bounded-attempts policy shared by every outbound call.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,

    /// Timeout applied to every attempt
    pub timeout: Duration,

    /// Pause between attempts
    pub retry_delay: Duration,

    /// Statuses for which another attempt is made
    pub retryable: fn(u16) -> bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            timeout: Duration::from_secs(60),
            retry_delay: Duration::from_millis(500),
            retryable: is_server_error,
        }
    }
}

impl RetryPolicy {
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }
}

/// Sends requests through a [`Transport`] under a [`RetryPolicy`].
///
/// Any response the policy does not consider retryable is returned as-is,
/// including 4xx; deciding whether those are fatal is the caller's job.
#[derive(Clone)]
pub struct RetryClient {
    transport: Arc<dyn Transport>,
    policy: RetryPolicy,
}

impl RetryClient {
    pub fn new(transport: Arc<dyn Transport>, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    pub async fn send(&self, request: HttpRequest) -> Result<HttpResponse, FetchError> {
        let request = request.timeout(self.policy.timeout);
        let max_attempts = self.policy.max_attempts.max(1);
        let mut last_status = None;

        for attempt in 1..=max_attempts {
            match self.transport.execute(&request).await {
                Ok(response) if !(self.policy.retryable)(response.status) => {
                    if attempt > 1 {
                        ::log::info!("Request to {} succeeded on attempt {}", redact(&request.url), attempt);
                    }
                    return Ok(response);
                }
                Ok(response) => {
                    ::log::warn!(
                        "Attempt {}/{} to {} returned status {}",
                        attempt,
                        max_attempts,
                        redact(&request.url),
                        response.status
                    );
                    last_status = Some(response.status);
                }
                Err(e) => {
                    if attempt == max_attempts {
                        ::log::error!(
                            "Request to {} failed after {} attempts: {}",
                            redact(&request.url),
                            max_attempts,
                            e
                        );
                        return Err(FetchError::Network {
                            attempts: max_attempts,
                            message: e.to_string(),
                        });
                    }
                    ::log::warn!(
                        "Attempt {}/{} to {} failed: {}",
                        attempt,
                        max_attempts,
                        redact(&request.url),
                        e
                    );
                }
            }

            if attempt < max_attempts && !self.policy.retry_delay.is_zero() {
                tokio::time::sleep(self.policy.retry_delay).await;
            }
        }

        match last_status {
            Some(status) => {
                ::log::error!(
                    "Request to {} exhausted {} attempts, last status {}",
                    redact(&request.url),
                    max_attempts,
                    status
                );
                Err(FetchError::Server {
                    status,
                    attempts: max_attempts,
                })
            }
            None => Err(FetchError::Network {
                attempts: max_attempts,
                message: "no attempt completed".to_string(),
            }),
        }
    }
}

/// Strip the query string so credentials passed as parameters never reach the log
fn redact(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}
