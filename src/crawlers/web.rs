use crate::config::ScrapeConfig;
use crate::crawlers::Crawler;
use crate::error::ScrapeError;
use crate::filter::{UrlFilter, canonicalize};
use crate::http::{HttpRequest, Transport};
use crate::parsers::{ContentKind, ParseResult, Parser, text};
use crate::results::{PageRecord, ScrapeOutput, dedup_pages};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use url::Url;

/// Scrapes a start page plus a bounded set of same-origin pages it links to.
pub struct SiteScraper {
    transport: Arc<dyn Transport>,
    config: ScrapeConfig,
    url_filter: Arc<UrlFilter>,
}

impl SiteScraper {
    pub fn new(transport: Arc<dyn Transport>, config: ScrapeConfig) -> Result<Self, regex::Error> {
        let url_filter = Arc::new(UrlFilter::new(config.filter.clone())?);
        Ok(Self {
            transport,
            config,
            url_filter,
        })
    }

    pub fn config(&self) -> &ScrapeConfig {
        &self.config
    }

    /// Resolves, filters and de-duplicates the links of the start page.
    ///
    /// Keeps at most `max_pages - 1` candidates so the start page fits in the budget.
    pub fn discover_links(&self, root: &Url, hrefs: &[String]) -> Vec<Url> {
        let budget = self.config.max_pages.saturating_sub(1);
        let mut seen = HashSet::new();
        seen.insert(canonicalize(root).to_string());

        let mut candidates = Vec::new();
        for href in hrefs {
            if candidates.len() >= budget {
                break;
            }
            if let Some(url) = self.url_filter.resolve(root, href) {
                if seen.insert(url.to_string()) {
                    ::log::debug!("Queuing link for scraping: {}", url);
                    candidates.push(url);
                }
            }
        }
        candidates
    }

    /// Fetches linked pages with bounded concurrency, preserving discovery order.
    ///
    /// Pages that fail to fetch are omitted.
    async fn scrape_linked_pages(&self, urls: Vec<Url>) -> Vec<PageRecord> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrency.max(1)));
        let mut handles = Vec::with_capacity(urls.len());

        for url in urls {
            let semaphore = Arc::clone(&semaphore);
            let transport = Arc::clone(&self.transport);
            let user_agent = self.config.user_agent.clone();
            let timeout = self.config.timeout();

            handles.push(tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok()?;
                match fetch_html(transport.as_ref(), &url, &user_agent, timeout).await {
                    Ok(fetched) => {
                        let parsed = Parser::parse_from_url(&fetched.body, fetched.url.as_str());
                        Some(page_record(&canonicalize(&fetched.url), &parsed))
                    }
                    Err(e) => {
                        ::log::warn!("Omitting page: {}", e);
                        None
                    }
                }
            }));
        }

        let mut pages = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok(Some(page)) => pages.push(page),
                Ok(None) => {}
                Err(e) => ::log::error!("Page scrape task failed: {}", e),
            }
        }
        pages
    }
}

#[async_trait]
impl Crawler for SiteScraper {
    async fn scrape(&self, url: &str) -> Result<ScrapeOutput, ScrapeError> {
        let requested = parse_start_url(url)?;
        ::log::info!("Scraping {}", requested);
        let start = std::time::Instant::now();

        let fetched = fetch_html(
            self.transport.as_ref(),
            &requested,
            &self.config.user_agent,
            self.config.timeout(),
        )
        .await?;

        // Links, the origin check and the page records follow the redirect target
        let root = fetched.url;
        if root != requested {
            ::log::info!("Start page {} redirected to {}", requested, root);
        }
        let parsed = Parser::parse_from_url(&fetched.body, root.as_str());

        let text = text::truncate_chars(&parsed.content, self.config.max_text_chars);
        if text.len() < parsed.content.len() {
            ::log::info!(
                "Truncated page text from {} to {} characters",
                parsed.content.chars().count(),
                self.config.max_text_chars
            );
        }

        let mut pages = vec![page_record(&canonicalize(&root), &parsed)];
        let follow = self.config.follow_links && ContentKind::from_url(root.as_str()).should_extract_links();
        if follow && self.config.max_pages > 1 {
            let candidates = self.discover_links(&root, &parsed.links);
            ::log::info!("Found {} candidate pages on {}", candidates.len(), root);
            pages.extend(self.scrape_linked_pages(candidates).await);
        }
        let pages = dedup_pages(pages);

        ::log::info!(
            "Scraped {} pages from {} in {:.2} seconds",
            pages.len(),
            root,
            start.elapsed().as_secs_f64()
        );

        Ok(ScrapeOutput { text, pages })
    }
}

/// Parses a user-supplied start URL, assuming https when no scheme is given
pub fn parse_start_url(input: &str) -> Result<Url, ScrapeError> {
    let trimmed = input.trim();
    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let url = Url::parse(&candidate).map_err(|e| ScrapeError::InvalidUrl {
        url: input.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ScrapeError::InvalidUrl {
            url: input.to_string(),
            reason: "only http and https URLs can be scraped".to_string(),
        });
    }
    Ok(url)
}

/// Body of a fetched page and the URL it was finally served from
struct FetchedPage {
    url: Url,
    body: String,
}

/// Fetches one page, treating any non-2xx status as a failure
async fn fetch_html(
    transport: &dyn Transport,
    url: &Url,
    user_agent: &str,
    timeout: Duration,
) -> Result<FetchedPage, ScrapeError> {
    ::log::debug!("SCRAPE: {}", url);
    let request = HttpRequest::get(url.as_str())
        .header("User-Agent", user_agent)
        .header("Accept", "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8")
        .timeout(timeout);

    let response = transport
        .execute(&request)
        .await
        .map_err(|e| ScrapeError::Fetch {
            url: url.to_string(),
            message: e.to_string(),
        })?;

    if !response.is_success() {
        return Err(ScrapeError::Status {
            url: url.to_string(),
            status: response.status,
        });
    }

    let final_url = response
        .final_url
        .as_deref()
        .and_then(|u| Url::parse(u).ok())
        .unwrap_or_else(|| url.clone());
    Ok(FetchedPage {
        url: final_url,
        body: response.body,
    })
}

fn page_record(url: &Url, parsed: &ParseResult) -> PageRecord {
    PageRecord::new(
        url.to_string(),
        parsed.title.clone().unwrap_or_default(),
        parsed.description.clone().unwrap_or_default(),
        text::summarize(&parsed.content),
    )
}
