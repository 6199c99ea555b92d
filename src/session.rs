use crate::model::{BusinessField, BusinessProfile};
use crate::results::PageRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where the guidelines block of a session came from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuidelinesSource {
    /// Supplied by the user
    #[default]
    Typed,
    /// Rendered from a scraped business profile
    Scraped,
}

/// Free-text business inputs. Empty strings mean "not supplied".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessDetails {
    pub industry: String,
    pub tone: String,
    pub audience: String,
    pub product: String,
    pub guidelines: String,
    #[serde(default)]
    pub guidelines_source: GuidelinesSource,
}

impl BusinessDetails {
    pub fn field(&self, field: BusinessField) -> &str {
        match field {
            BusinessField::Industry => &self.industry,
            BusinessField::Tone => &self.tone,
            BusinessField::Audience => &self.audience,
            BusinessField::Product => &self.product,
        }
    }

    fn field_mut(&mut self, field: BusinessField) -> &mut String {
        match field {
            BusinessField::Industry => &mut self.industry,
            BusinessField::Tone => &mut self.tone,
            BusinessField::Audience => &mut self.audience,
            BusinessField::Product => &mut self.product,
        }
    }

    pub fn has_guidelines(&self) -> bool {
        !self.guidelines.trim().is_empty()
    }

    /// True when neither guidelines nor any structured field is set
    pub fn is_empty(&self) -> bool {
        !self.has_guidelines()
            && BusinessField::ALL
                .iter()
                .all(|f| self.field(*f).trim().is_empty())
    }
}

/// Result of scraping and analyzing a business website
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeContext {
    pub base_url: String,
    pub pages: Vec<PageRecord>,
    pub profile: BusinessProfile,
}

impl ScrapeContext {
    /// URLs the generator may choose as destinations
    pub fn candidate_urls(&self) -> Vec<&str> {
        self.pages.iter().map(|p| p.url.as_str()).collect()
    }
}

/// Everything a generation run needs, threaded explicitly through the pipeline
#[derive(Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub credential: String,
    pub details: BusinessDetails,
    pub scrape: Option<ScrapeContext>,
}

impl SessionContext {
    pub fn new(credential: impl Into<String>, details: BusinessDetails) -> Self {
        Self {
            credential: credential.into(),
            details,
            scrape: None,
        }
    }

    /// Merge a scrape into the session.
    ///
    /// Empty structured fields are filled from the scraped profile. When no
    /// guidelines were typed, the profile summary becomes the guidelines and
    /// is marked as [`GuidelinesSource::Scraped`].
    pub fn with_scrape(self, scrape: ScrapeContext) -> Self {
        let mut details = self.details;

        for field in BusinessField::ALL {
            let slot = details.field_mut(field);
            if slot.trim().is_empty() {
                *slot = scrape.profile.field_value(field);
            }
        }

        if !details.has_guidelines() {
            details.guidelines = scrape.profile.summary_text();
            details.guidelines_source = GuidelinesSource::Scraped;
        }

        Self {
            credential: self.credential,
            details,
            scrape: Some(scrape),
        }
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("credential", &"<redacted>")
            .field("details", &self.details)
            .field("scrape", &self.scrape)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ServiceOrProduct;

    fn scrape() -> ScrapeContext {
        ScrapeContext {
            base_url: "https://acme.test/".into(),
            pages: vec![
                PageRecord::new("https://acme.test/".into(), "Acme".into(), String::new(), String::new()),
                PageRecord::new(
                    "https://acme.test/pricing".into(),
                    "Pricing".into(),
                    String::new(),
                    String::new(),
                ),
            ],
            profile: BusinessProfile {
                industry: "B2B SaaS".into(),
                tone: "Friendly".into(),
                target_audience_and_pain_points: "Small businesses losing files".into(),
                services_and_products: vec![ServiceOrProduct {
                    name: "Cloud Backup".into(),
                    ..Default::default()
                }],
                target_location: String::new(),
                guidelines_summary: "Keep it simple.".into(),
            },
        }
    }

    #[test]
    fn test_with_scrape_fills_empty_fields_only() {
        let details = BusinessDetails {
            tone: "Authoritative".into(),
            ..Default::default()
        };
        let session = SessionContext::new("key", details).with_scrape(scrape());

        assert_eq!(session.details.tone, "Authoritative");
        assert_eq!(session.details.industry, "B2B SaaS");
        assert_eq!(session.details.product, "Cloud Backup");
        assert_eq!(session.details.guidelines_source, GuidelinesSource::Scraped);
        assert!(session.details.guidelines.contains("Industry: B2B SaaS"));
    }

    #[test]
    fn test_typed_guidelines_kept() {
        let details = BusinessDetails {
            guidelines: "Acme sells cloud backup software to SMBs, friendly tone".into(),
            ..Default::default()
        };
        let session = SessionContext::new("key", details).with_scrape(scrape());

        assert_eq!(session.details.guidelines_source, GuidelinesSource::Typed);
        assert!(session.details.guidelines.starts_with("Acme sells"));
        assert!(session.scrape.is_some());
    }

    #[test]
    fn test_candidate_urls() {
        assert_eq!(
            scrape().candidate_urls(),
            vec!["https://acme.test/", "https://acme.test/pricing"]
        );
    }

    #[test]
    fn test_debug_redacts_credential() {
        let session = SessionContext::new("secret-key-123", BusinessDetails::default());
        let debug = format!("{:?}", session);
        assert!(!debug.contains("secret-key-123"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_is_empty() {
        assert!(BusinessDetails::default().is_empty());
        assert!(!BusinessDetails {
            product: "Backup".into(),
            ..Default::default()
        }
        .is_empty());
    }
}
