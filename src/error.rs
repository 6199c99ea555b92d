//! Error types for each pipeline boundary.
//!
//! Every component returns its own error enum so callers can tell a
//! transport failure from a provider rejection from a malformed response.

use thiserror::Error;

/// Crate-level result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure of a single HTTP attempt, before any retry decision.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout
        } else if e.is_connect() {
            TransportError::Connect(e.to_string())
        } else {
            TransportError::Other(e.to_string())
        }
    }
}

/// Outcome of a request that exhausted the retry policy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error(
        "Network error after {attempts} attempts: {message}. The service may be temporarily unreachable; check your connection and try again."
    )]
    Network { attempts: u32, message: String },

    #[error("Server error: the request failed with status code {status} after {attempts} attempts.")]
    Server { status: u16, attempts: u32 },
}

/// Page scraping errors.
#[derive(Debug, Clone, Error)]
pub enum ScrapeError {
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Could not fetch {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("Could not fetch {url}: the site answered with status code {status}")]
    Status { url: String, status: u16 },
}

/// Schema-constrained generation errors.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("The model API rejected the request ({status} {code}): {message}")]
    Provider {
        status: u16,
        code: String,
        message: String,
    },

    #[error("The model API request failed with status code {status}: {body}")]
    Http { status: u16, body: String },

    #[error(
        "No content received from the model. It may not have been able to produce a valid response; try again."
    )]
    MissingContent,

    #[error("Failed to parse the model response: {detail}")]
    ResponseShape { detail: String },

    #[error("Could not build the generation request: {0}")]
    Request(String),
}

/// Caller-facing classification of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Server,
    Client,
    MissingContent,
    ResponseShape,
    Scrape,
    Config,
    Output,
}

impl GenerateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GenerateError::Fetch(FetchError::Network { .. }) => ErrorKind::Transport,
            GenerateError::Fetch(FetchError::Server { .. }) => ErrorKind::Server,
            GenerateError::Provider { .. } | GenerateError::Http { .. } => ErrorKind::Client,
            GenerateError::MissingContent => ErrorKind::MissingContent,
            GenerateError::ResponseShape { .. } => ErrorKind::ResponseShape,
            GenerateError::Request(_) => ErrorKind::Config,
        }
    }
}

/// Top-level error for pipeline actions.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Scrape(#[from] ScrapeError),

    #[error(transparent)]
    Generate(#[from] GenerateError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(
        "Google API key not found. Pass --api-key or set GOOGLE_API_KEY in the environment or a .env file."
    )]
    MissingCredential,

    #[error("Nothing to analyze: provide guidelines text, at least one business field, or a URL to scrape.")]
    EmptyInput,

    #[error("Could not write output: {0}")]
    Output(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Scrape(_) => ErrorKind::Scrape,
            Error::Generate(e) => e.kind(),
            Error::Config(_) | Error::MissingCredential | Error::EmptyInput => ErrorKind::Config,
            Error::Output(_) | Error::Io(_) => ErrorKind::Output,
        }
    }
}
