use crate::error::GenerateError;
use crate::generator::Generator;
use crate::model::{BusinessProfile, Industry};
use crate::prompts::{analysis_instruction, vocabulary_match};

/// Label used when the model reports no industry at all
const UNKNOWN_INDUSTRY: &str = "Unknown";

/// Extracts a [`BusinessProfile`] from website copy
#[derive(Clone)]
pub struct BusinessAnalyzer {
    generator: Generator,
}

impl BusinessAnalyzer {
    pub fn new(generator: Generator) -> Self {
        Self { generator }
    }

    /// Analyze scraped page text.
    ///
    /// The returned industry is either a vocabulary member or
    /// `Not found (Identified as: <label>)`.
    pub async fn analyze(&self, page_text: &str, credential: &str) -> Result<BusinessProfile, GenerateError> {
        let context = format!("Website Content:\n---\n{}\n---\n", page_text.trim());
        let mut profile: BusinessProfile = self
            .generator
            .generate(&analysis_instruction(), &context, credential)
            .await?;

        let classified = classify_industry(&profile.industry);
        if classified != profile.industry {
            ::log::debug!("Industry '{}' classified as '{}'", profile.industry, classified);
        }
        profile.industry = classified;

        ::log::info!(
            "Analyzed business: industry '{}', {} products/services",
            profile.industry,
            profile.services_and_products.len()
        );
        Ok(profile)
    }
}

/// Map a model-reported industry onto the controlled vocabulary
pub fn classify_industry(reported: &str) -> String {
    let reported = reported.trim();
    if let Some(category) = vocabulary_match(reported) {
        return category.to_string();
    }

    match Industry::parse(reported) {
        Industry::Unmatched(label) => match vocabulary_match(&label) {
            Some(category) => category.to_string(),
            None if label.is_empty() => Industry::not_found(UNKNOWN_INDUSTRY),
            None => Industry::not_found(&label),
        },
        Industry::Known(label) if label.is_empty() => Industry::not_found(UNKNOWN_INDUSTRY),
        Industry::Known(label) => Industry::not_found(&label),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{RetryClient, RetryPolicy};
    use crate::testing::{ScriptedTransport, candidate_envelope};
    use serde_json::Value;
    use std::sync::Arc;
    use std::time::Duration;

    fn analyzer(transport: Arc<ScriptedTransport>) -> BusinessAnalyzer {
        let client = RetryClient::new(transport, RetryPolicy::default().with_retry_delay(Duration::ZERO));
        BusinessAnalyzer::new(Generator::new(client, "https://api.test/v1beta", "test-model"))
    }

    fn profile_json(industry: &str) -> String {
        serde_json::json!({
            "industry": industry,
            "tone": "Laid-back",
            "targetAudienceAndPainPoints": "Adults looking for trusted local products",
            "servicesAndProducts": [{
                "name": "Pre-rolls",
                "associatedIndustry": "Recreational Cannabis",
                "associatedAudience": "Adults 21+",
                "associatedPainPoint": "Inconsistent quality"
            }],
            "targetLocation": "Denver, CO",
            "guidelinesSummary": "Friendly and compliant."
        })
        .to_string()
    }

    #[test]
    fn test_classify_industry() {
        assert_eq!(classify_industry("Recreational Cannabis"), "Recreational Cannabis");
        assert_eq!(classify_industry(" recreational cannabis"), "Recreational Cannabis");
        assert_eq!(
            classify_industry("Artisanal Ice Sculpting"),
            "Not found (Identified as: Artisanal Ice Sculpting)"
        );
        assert_eq!(
            classify_industry("Not found (Identified as: Artisanal Ice Sculpting)"),
            "Not found (Identified as: Artisanal Ice Sculpting)"
        );
        assert_eq!(classify_industry("Not found (Identified as: real estate)"), "Real Estate");
        assert_eq!(classify_industry(""), "Not found (Identified as: Unknown)");
    }

    #[tokio::test]
    async fn test_dispensary_classified_in_vocabulary() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_response(200, candidate_envelope(&profile_json("recreational cannabis")));

        let profile = analyzer(Arc::clone(&transport))
            .analyze("Mile High Buds is a licensed dispensary in Denver.", "key")
            .await
            .unwrap();

        assert_eq!(profile.industry, "Recreational Cannabis");
        assert!(matches!(profile.industry_class(), Industry::Known(_)));
        assert_eq!(profile.services_and_products[0].associated_pain_point, "Inconsistent quality");

        let request = &transport.requests()[0];
        let payload: Value = serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
        let instruction = payload["systemInstruction"]["parts"][0]["text"].as_str().unwrap();
        assert!(instruction.contains("Recreational Cannabis"));
        let context = payload["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(context.contains("licensed dispensary"));
        assert_eq!(
            payload["generationConfig"]["responseSchema"]["properties"]["servicesAndProducts"]["type"],
            "ARRAY"
        );
    }

    #[tokio::test]
    async fn test_invented_niche_reported_as_not_found() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_response(200, candidate_envelope(&profile_json("Drone Light Show Weddings")));

        let profile = analyzer(transport)
            .analyze("We choreograph drone light shows for weddings.", "key")
            .await
            .unwrap();

        assert!(profile.industry.starts_with("Not found (Identified as: "));
        assert_eq!(
            profile.industry_class(),
            Industry::Unmatched("Drone Light Show Weddings".into())
        );
    }

    #[tokio::test]
    async fn test_analysis_errors_propagate() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_response(200, candidate_envelope("{\"industry\": \"B2B SaaS\"}"));

        let err = analyzer(transport).analyze("text", "key").await.unwrap_err();
        assert!(matches!(err, GenerateError::ResponseShape { .. }));
    }
}
