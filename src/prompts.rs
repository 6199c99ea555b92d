//! Fixed instructions sent with the generation and analysis calls.

/// Controlled industry vocabulary used to classify a business.
///
/// A business outside the named categories is reported as
/// `Not found (Identified as: <label>)` rather than as one of these.
pub const INDUSTRY_VOCABULARY: &[&str] = &[
    "Accounting & Tax Services",
    "Agriculture",
    "Apparel & Fashion",
    "Architecture & Interior Design",
    "Automotive",
    "B2B SaaS",
    "Beauty & Personal Care",
    "Construction & Home Improvement",
    "Consumer Electronics",
    "Cybersecurity",
    "E-commerce & Retail",
    "Education & E-learning",
    "Energy & Utilities",
    "Entertainment & Media",
    "Financial Services",
    "Fitness & Wellness",
    "Food & Beverage",
    "Gaming",
    "Government & Public Sector",
    "Healthcare & Medical",
    "Hospitality & Travel",
    "Human Resources & Staffing",
    "Insurance",
    "IT Services & Consulting",
    "Legal Services",
    "Logistics & Transportation",
    "Manufacturing",
    "Marketing & Advertising",
    "Medical Cannabis",
    "Nonprofit",
    "Pet Care",
    "Real Estate",
    "Recreational Cannabis",
    "Restaurants",
    "Telecommunications",
    "Other",
];

/// Case-insensitive lookup returning the vocabulary spelling
pub fn vocabulary_match(value: &str) -> Option<&'static str> {
    let value = value.trim();
    INDUSTRY_VOCABULARY
        .iter()
        .copied()
        .find(|category| category.eq_ignore_ascii_case(value))
}

/// System instruction for topic generation
pub const TOPIC_GENERATION_INSTRUCTION: &str = "\
You are a strategic content and marketing analyst. Your task is to generate two distinct sets of guest post topics \
based on the provided business context and the current date. Topic generation must follow the marketing funnel \
(ToFu for awareness, MoFu for consideration, BoFu for decision).

First, analyze the context to determine the business's industry, tone, target audiences and products/services. \
Use any supplemental details to clarify or extend this information.

Then generate two sets of topics:
1. productBasedTopics: ideas tied directly to the products/services you identified.
2. timelyTopics: based on the current date and the industry, identify relevant upcoming holidays, industry events \
or seasonal business milestones and create topics for them.

Rules:
- Summarize every product, service or event into a short canonical name (a few words). Never copy long descriptive \
input text as a name.
- For every combination of funnel stage, audience and product/event, produce at least 3 topics.
- Every topic has a title of at most 60 characters that frames the product, service or event as the solution to a \
problem, a headline, and a rationale explaining why it fits the stage, audience and publication niche.
- If a list of destination pages is provided, every destinationPage must be copied exactly from that list. Prefer, \
in order: (1) a page dedicated to the product or service, (2) a relevant content page, (3) any contextually relevant \
page. Use the base URL only when no listed page qualifies. Never invent or modify a URL.
- Vary anchorText across all topics, aiming for roughly: branded 50%, naked URL 20%, exact page title 20%, \
generic 2-5%, exact keyword match 2-5%, partial keyword match 2-5%.
- Give each topic a focusKeyword the article should rank for.

Return a single JSON object with the keys productBasedTopics and timelyTopics that follows the provided schema.";

/// System instruction for business analysis
pub fn analysis_instruction() -> String {
    format!(
        "\
You are a business analyst. Read the website copy provided and extract a structured business profile.

Rules:
- industry: choose exactly one category from this list, spelled exactly as written: {}. \
If none of the named categories fits, do not invent a category and do not answer \"Other\"; instead answer \
\"Not found (Identified as: <label>)\" where <label> is a short name for the industry you detected.
- tone: describe the brand's tone of voice in a few words.
- targetAudienceAndPainPoints: describe who the business serves and the problems they face.
- servicesAndProducts: list every product or service with a short name and, for each one, its own associated \
industry, associated audience and the pain point it solves.
- targetLocation: the geographic market served, or an empty string if none is stated.
- guidelinesSummary: a short paragraph summarizing how to write for this brand.

Return a single JSON object that follows the provided schema.",
        INDUSTRY_VOCABULARY.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocabulary_size() {
        assert!(INDUSTRY_VOCABULARY.len() >= 35);
        assert!(INDUSTRY_VOCABULARY.contains(&"Recreational Cannabis"));
        assert_eq!(INDUSTRY_VOCABULARY.last(), Some(&"Other"));
    }

    #[test]
    fn test_vocabulary_match() {
        assert_eq!(vocabulary_match("recreational cannabis "), Some("Recreational Cannabis"));
        assert_eq!(vocabulary_match("OTHER"), Some("Other"));
        assert_eq!(vocabulary_match("Artisanal Ice Sculpting"), None);
    }

    #[test]
    fn test_generation_rules_present() {
        for rule in ["at least 3 topics", "at most 60 characters", "copied exactly", "base URL", "branded 50%"] {
            assert!(TOPIC_GENERATION_INSTRUCTION.contains(rule), "missing rule: {}", rule);
        }
    }

    #[test]
    fn test_analysis_instruction_lists_vocabulary() {
        let instruction = analysis_instruction();
        assert!(instruction.contains("Recreational Cannabis"));
        assert!(instruction.contains("Not found (Identified as: <label>)"));
    }
}
