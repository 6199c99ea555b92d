use crate::error::{Error, Result};
use crate::filter::UrlFilterConfig;
use crate::http::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable holding the model API key
pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";

/// Configuration for the page scraper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// Timeout for each page fetch, in seconds
    #[serde(default = "default_scrape_timeout")]
    pub timeout_secs: u64,

    /// Maximum characters of start-page text handed to the analyzer
    #[serde(default = "default_max_text_chars")]
    pub max_text_chars: usize,

    /// Maximum pages scraped, start page included
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Whether to scrape same-origin pages linked from the start page
    #[serde(default = "default_follow_links")]
    pub follow_links: bool,

    /// Maximum number of concurrent page fetches
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// User-Agent header sent with every page fetch
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Rules for which discovered links are followed
    #[serde(default)]
    pub filter: UrlFilterConfig,
}

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the generative language API
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Model used for analysis and generation
    #[serde(default = "default_model")]
    pub model: String,

    /// Timeout for each generation attempt, in seconds
    #[serde(default = "default_generation_timeout")]
    pub generation_timeout_secs: u64,

    /// Attempts per generation call, first one included
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Pause between generation attempts, in milliseconds
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    #[serde(default)]
    pub scrape: ScrapeConfig,
}

fn default_scrape_timeout() -> u64 {
    10
}

fn default_max_text_chars() -> usize {
    15_000
}

fn default_max_pages() -> usize {
    20
}

fn default_follow_links() -> bool {
    true
}

fn default_max_concurrency() -> usize {
    4
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36".to_string()
}

fn default_api_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_generation_timeout() -> u64 {
    60
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    500
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_scrape_timeout(),
            max_text_chars: default_max_text_chars(),
            max_pages: default_max_pages(),
            follow_links: default_follow_links(),
            max_concurrency: default_max_concurrency(),
            user_agent: default_user_agent(),
            filter: UrlFilterConfig::default(),
        }
    }
}

impl ScrapeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            model: default_model(),
            generation_timeout_secs: default_generation_timeout(),
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            scrape: ScrapeConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| Error::Config(format!("invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(Error::Config("max_attempts must be at least 1".into()));
        }
        if self.scrape.max_pages == 0 {
            return Err(Error::Config("scrape.max_pages must be at least 1".into()));
        }
        if self.scrape.max_concurrency == 0 {
            return Err(Error::Config("scrape.max_concurrency must be at least 1".into()));
        }
        if self.scrape.timeout_secs >= self.generation_timeout_secs {
            ::log::warn!(
                "Scrape timeout ({}s) is not shorter than generation timeout ({}s)",
                self.scrape.timeout_secs,
                self.generation_timeout_secs
            );
        }
        Ok(())
    }

    /// Retry policy shared by the analysis and generation calls
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::default()
            .with_max_attempts(self.max_attempts)
            .with_timeout(Duration::from_secs(self.generation_timeout_secs))
            .with_retry_delay(Duration::from_millis(self.retry_delay_ms))
    }
}

/// Resolve the API key: explicit value first, then the environment
pub fn resolve_api_key(explicit: Option<&str>) -> Result<String> {
    explicit
        .map(str::to_string)
        .or_else(|| std::env::var(API_KEY_ENV).ok())
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .ok_or(Error::MissingCredential)
}
