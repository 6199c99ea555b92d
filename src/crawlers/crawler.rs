use crate::error::ScrapeError;
use crate::results::ScrapeOutput;
use async_trait::async_trait;

/// A source of business copy for a start URL
#[async_trait]
pub trait Crawler: Send + Sync {
    /// Scrape the start page and, depending on configuration, the pages it links to.
    ///
    /// A failure on the start page aborts the whole scrape; failures on
    /// linked pages only drop those pages from the result.
    async fn scrape(&self, url: &str) -> Result<ScrapeOutput, ScrapeError>;
}
