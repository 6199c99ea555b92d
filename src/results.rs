use serde::{Deserialize, Serialize};

/// One scraped page, as offered to the generator as a link destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRecord {
    /// Canonical URL of the page (unique within a scrape)
    pub url: String,

    /// Title of the page, empty when the page has none
    pub title: String,

    /// Content of the meta description tag
    pub meta_description: String,

    /// First substantial sentence of the page text
    pub content_summary: String,
}

impl PageRecord {
    pub fn new(url: String, title: String, meta_description: String, content_summary: String) -> Self {
        Self {
            url,
            title,
            meta_description,
            content_summary,
        }
    }
}

/// Result of scraping a site
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScrapeOutput {
    /// Plain text of the start page, truncated to the configured budget
    pub text: String,

    /// Scraped pages in discovery order, start page first
    pub pages: Vec<PageRecord>,
}

/// Remove repeated URLs, keeping the first occurrence
pub fn dedup_pages(pages: Vec<PageRecord>) -> Vec<PageRecord> {
    let mut seen = std::collections::HashSet::new();
    pages
        .into_iter()
        .filter(|page| seen.insert(page.url.clone()))
        .collect()
}
