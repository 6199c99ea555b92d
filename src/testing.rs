//! Testing utilities.
//!
//! [`ScriptedTransport`] replays canned responses so the scraper, the
//! retry client and the generator can be exercised without a network.

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse, Method, Transport};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// Replays scripted outcomes and records every request it sees.
///
/// GET requests whose URL has a registered route are answered from the
/// route table (repeatably). Everything else consumes the queue in order;
/// an exhausted queue answers with a connection error.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<String, Result<HttpResponse, TransportError>>>,
    queue: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer GETs for `url` with an HTML page
    pub fn with_page(self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.route(url, Ok(HttpResponse::new(200, html)));
        self
    }

    /// Answer GETs for `url` with an HTML page served from `final_url` after a redirect
    pub fn with_redirect(self, url: impl Into<String>, final_url: impl Into<String>, html: impl Into<String>) -> Self {
        self.route(url, Ok(HttpResponse::new(200, html).with_final_url(final_url)));
        self
    }

    /// Answer GETs for `url` with a fixed outcome
    pub fn route(&self, url: impl Into<String>, outcome: Result<HttpResponse, TransportError>) {
        if let Ok(mut routes) = self.routes.lock() {
            routes.insert(url.into(), outcome);
        }
    }

    pub fn push_response(&self, status: u16, body: impl Into<String>) {
        self.push(Ok(HttpResponse::new(status, body)));
    }

    pub fn push_error(&self, error: TransportError) {
        self.push(Err(error));
    }

    pub fn push(&self, outcome: Result<HttpResponse, TransportError>) {
        if let Ok(mut queue) = self.queue.lock() {
            queue.push_back(outcome);
        }
    }

    /// Requests seen so far, in order
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }

    /// Requests sent with the given method
    pub fn requests_with(&self, method: Method) -> Vec<HttpRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method)
            .collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        if request.method == Method::Get {
            if let Ok(routes) = self.routes.lock() {
                if let Some(outcome) = routes.get(&request.url) {
                    return outcome.clone();
                }
            }
        }

        self.queue
            .lock()
            .ok()
            .and_then(|mut queue| queue.pop_front())
            .unwrap_or_else(|| {
                Err(TransportError::Connect(format!(
                    "no scripted response for {}",
                    request.url
                )))
            })
    }
}

/// Wrap generated JSON text in the generateContent response envelope
pub fn candidate_envelope(text: &str) -> String {
    serde_json::json!({
        "candidates": [
            { "content": { "parts": [ { "text": text } ], "role": "model" } }
        ]
    })
    .to_string()
}
