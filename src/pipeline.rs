//! End-to-end actions: scrape, analyze, generate.
//!
//! Each action runs to completion before returning. State moves between
//! actions only through the explicit [`SessionContext`] value.

use crate::analyzer::BusinessAnalyzer;
use crate::config::AppConfig;
use crate::context::assemble;
use crate::crawlers::{Crawler, SiteScraper};
use crate::error::{Error, Result};
use crate::flatten::{TopicRow, flatten};
use crate::generator::Generator;
use crate::http::Transport;
use crate::model::TopicTree;
use crate::results::ScrapeOutput;
use crate::session::{ScrapeContext, SessionContext};
use chrono::NaiveDate;
use std::sync::Arc;

/// Result of a full generation run
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub session: SessionContext,
    pub tree: TopicTree,
    pub rows: Vec<TopicRow>,
}

pub struct Pipeline {
    crawler: Arc<dyn Crawler>,
    analyzer: BusinessAnalyzer,
    generator: Generator,
}

impl Pipeline {
    pub fn new(crawler: Arc<dyn Crawler>, generator: Generator) -> Self {
        Self {
            crawler,
            analyzer: BusinessAnalyzer::new(generator.clone()),
            generator,
        }
    }

    /// Build the pipeline over one transport shared by scraping and generation
    pub fn from_config(transport: Arc<dyn Transport>, config: &AppConfig) -> Result<Self> {
        let scraper = SiteScraper::new(Arc::clone(&transport), config.scrape.clone())
            .map_err(|e| Error::Config(format!("invalid URL filter pattern: {}", e)))?;
        Ok(Self::new(
            Arc::new(scraper),
            Generator::from_config(transport, config),
        ))
    }

    pub async fn scrape(&self, url: &str) -> Result<ScrapeOutput> {
        Ok(self.crawler.scrape(url).await?)
    }

    /// Scrape a site and extract its business profile
    pub async fn analyze_site(&self, url: &str, credential: &str) -> Result<ScrapeContext> {
        require_credential(credential)?;
        let output = self.scrape(url).await?;
        if output.text.trim().is_empty() {
            return Err(Error::EmptyInput);
        }

        let profile = self.analyzer.analyze(&output.text, credential).await?;
        let base_url = output
            .pages
            .first()
            .map(|p| p.url.clone())
            .unwrap_or_else(|| url.to_string());

        Ok(ScrapeContext {
            base_url,
            pages: output.pages,
            profile,
        })
    }

    /// Generate topics for a session.
    ///
    /// When the session carries a scrape, destinations outside its page
    /// list are replaced by the base URL.
    pub async fn generate(&self, session: &SessionContext, current_date: NaiveDate) -> Result<TopicTree> {
        require_credential(&session.credential)?;
        if session.details.is_empty() {
            return Err(Error::EmptyInput);
        }

        let context = assemble(current_date, &session.details, session.scrape.as_ref());
        let mut tree = self
            .generator
            .generate_topics(&context, &session.credential)
            .await?;

        if let Some(scrape) = &session.scrape {
            enforce_destinations(&mut tree, scrape);
        }
        ::log::info!("Generated {} topics", tree.topic_count());
        Ok(tree)
    }

    /// Full run: optional scrape and analysis merged into the session, then generation
    pub async fn run(
        &self,
        session: SessionContext,
        url: Option<&str>,
        current_date: NaiveDate,
    ) -> Result<PipelineOutput> {
        let session = match url {
            Some(url) => {
                let scrape = self.analyze_site(url, &session.credential).await?;
                session.with_scrape(scrape)
            }
            None => session,
        };

        let tree = self.generate(&session, current_date).await?;
        let rows = flatten(&tree);
        Ok(PipelineOutput { session, tree, rows })
    }
}

fn require_credential(credential: &str) -> Result<()> {
    if credential.trim().is_empty() {
        return Err(Error::MissingCredential);
    }
    Ok(())
}

/// Replace destinations that are neither a scraped page nor the base URL.
///
/// Returns the number of topics rewritten. Omitted destinations stay omitted.
pub fn enforce_destinations(tree: &mut TopicTree, scrape: &ScrapeContext) -> usize {
    let candidates = scrape.candidate_urls();
    let base = scrape.base_url.as_str();
    let mut rewritten = 0;

    for topic in tree.topics_mut() {
        let Some(page) = topic.destination_page.as_deref() else {
            continue;
        };
        if page == base || candidates.contains(&page) {
            continue;
        }
        ::log::warn!(
            "Replacing destination '{}' of '{}' with base URL {}",
            page,
            topic.title,
            base
        );
        topic.destination_page = Some(base.to_string());
        rewritten += 1;
    }
    rewritten
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Audience, BusinessProfile, Funnel, Publication, Subject, Topic};
    use crate::results::PageRecord;
    use crate::session::BusinessDetails;

    fn scrape() -> ScrapeContext {
        ScrapeContext {
            base_url: "https://acme.test".into(),
            pages: vec![PageRecord::new(
                "https://acme.test/pricing".into(),
                "Pricing".into(),
                String::new(),
                String::new(),
            )],
            profile: BusinessProfile::default(),
        }
    }

    fn tree_with_destinations(destinations: &[Option<&str>]) -> TopicTree {
        let topics = destinations
            .iter()
            .enumerate()
            .map(|(i, d)| Topic {
                title: format!("Topic {}", i),
                headline: "H".into(),
                rationale: "R".into(),
                anchor_text: None,
                destination_page: d.map(str::to_string),
                focus_keyword: None,
            })
            .collect();
        TopicTree {
            product_based_topics: vec![Subject {
                name: "Cloud Backup".into(),
                funnels: vec![Funnel {
                    stage: "ToFu".into(),
                    audiences: vec![Audience {
                        name: "SMBs".into(),
                        publications: vec![Publication {
                            niche: "Tech".into(),
                            topics,
                        }],
                    }],
                }],
            }],
            timely_topics: Vec::new(),
        }
    }

    #[test]
    fn test_enforce_destinations() {
        let mut tree = tree_with_destinations(&[
            Some("https://acme.test/pricing"),
            Some("https://acme.test"),
            Some("https://acme.test/invented-page"),
            Some("https://acme.test/pricing/"),
            None,
        ]);
        let rewritten = enforce_destinations(&mut tree, &scrape());
        assert_eq!(rewritten, 2);

        let destinations: Vec<_> = flatten(&tree)
            .into_iter()
            .map(|r| r.destination_page)
            .collect();
        assert_eq!(
            destinations,
            vec![
                Some("https://acme.test/pricing".to_string()),
                Some("https://acme.test".to_string()),
                Some("https://acme.test".to_string()),
                Some("https://acme.test".to_string()),
                None,
            ]
        );
    }

    #[test]
    fn test_require_credential() {
        assert!(matches!(require_credential("  "), Err(Error::MissingCredential)));
        assert!(require_credential("key").is_ok());
    }

    #[tokio::test]
    async fn test_generate_rejects_empty_session_before_network() {
        use crate::testing::ScriptedTransport;

        let transport = Arc::new(ScriptedTransport::new());
        let pipeline = Pipeline::from_config(transport.clone(), &AppConfig::default()).unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 3, 3).unwrap();

        let empty = SessionContext::new("key", BusinessDetails::default());
        assert!(matches!(pipeline.generate(&empty, date).await, Err(Error::EmptyInput)));

        let no_key = SessionContext::new(
            "",
            BusinessDetails {
                guidelines: "Acme sells backups".into(),
                ..Default::default()
            },
        );
        assert!(matches!(
            pipeline.generate(&no_key, date).await,
            Err(Error::MissingCredential)
        ));
        assert_eq!(transport.call_count(), 0);
    }
}
