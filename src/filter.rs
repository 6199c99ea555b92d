use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

/// Configuration for choosing which discovered links are scraped
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlFilterConfig {
    /// Only follow links on the start page's scheme, host and port
    #[serde(default = "default_same_origin")]
    pub same_origin_only: bool,

    /// Regex patterns for URLs to include (if empty, all URLs are included unless excluded)
    #[serde(default)]
    pub include_patterns: Vec<String>,

    /// Regex patterns for URLs to exclude (these take precedence over include patterns)
    #[serde(default = "default_exclude_patterns")]
    pub exclude_patterns: Vec<String>,
}

fn default_same_origin() -> bool {
    true
}

/// Static assets and documents that carry no page copy
pub fn default_exclude_patterns() -> Vec<String> {
    vec![
        r"(?i)\.(jpg|jpeg|png|gif|webp|css|js|ico|svg|woff|woff2|ttf|eot|pdf|zip|mp4|mp3|xml)$"
            .to_string(),
    ]
}

impl Default for UrlFilterConfig {
    fn default() -> Self {
        Self {
            same_origin_only: true,
            include_patterns: Vec::new(),
            exclude_patterns: default_exclude_patterns(),
        }
    }
}

/// Decides which links found on a page become scrape candidates
#[derive(Debug)]
pub struct UrlFilter {
    config: UrlFilterConfig,
    include_regexes: Vec<Regex>,
    exclude_regexes: Vec<Regex>,
}

impl Default for UrlFilter {
    fn default() -> Self {
        let config = UrlFilterConfig::default();
        let exclude_regexes = config
            .exclude_patterns
            .iter()
            .filter_map(|p| Regex::new(p).ok())
            .collect();
        Self {
            config,
            include_regexes: Vec::new(),
            exclude_regexes,
        }
    }
}

impl UrlFilter {
    /// Create a new URL filter from configuration
    pub fn new(config: UrlFilterConfig) -> Result<Self, regex::Error> {
        let include_regexes = config
            .include_patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;
        let exclude_regexes = config
            .exclude_patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            config,
            include_regexes,
            exclude_regexes,
        })
    }

    /// Resolve an href found on `base` into a canonical crawl candidate.
    ///
    /// Returns `None` for in-page anchors, non-HTTP schemes and URLs that
    /// fail the filter rules.
    pub fn resolve(&self, base: &Url, href: &str) -> Option<Url> {
        let href = href.trim();
        if href.is_empty() || href.starts_with('#') {
            return None;
        }

        let resolved = base.join(href).ok()?;
        if !matches!(resolved.scheme(), "http" | "https") {
            ::log::trace!("Skipping non-HTTP link: {}", href);
            return None;
        }

        let canonical = canonicalize(&resolved);
        if self.should_crawl(&canonical, base) {
            Some(canonical)
        } else {
            ::log::debug!("URL filter rejected: {}", canonical);
            None
        }
    }

    /// Determine if a URL should be crawled based on all filtering rules
    pub fn should_crawl(&self, url: &Url, root: &Url) -> bool {
        if self.config.same_origin_only && url.origin() != root.origin() {
            return false;
        }

        let url_str = url.as_str();
        if self.exclude_regexes.iter().any(|r| r.is_match(url_str)) {
            return false;
        }

        self.include_regexes.is_empty() || self.include_regexes.iter().any(|r| r.is_match(url_str))
    }
}

/// Canonical form of a URL: query and fragment removed
pub fn canonicalize(url: &Url) -> Url {
    let mut canonical = url.clone();
    canonical.set_query(None);
    canonical.set_fragment(None);
    canonical
}
