//! Typed shapes of the generation responses.
//!
//! These types are both the decode targets and the source of the output
//! schema sent with each request (see [`crate::schema`]), so the wire
//! contract and the in-memory model cannot drift apart.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Topic tree
// =============================================================================

/// Marketing-funnel stage of a group of topics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FunnelStage {
    /// Awareness
    ToFu,
    /// Consideration
    MoFu,
    /// Decision
    BoFu,
}

impl FunnelStage {
    /// Every stage, in funnel order
    pub const ALL: [FunnelStage; 3] = [FunnelStage::ToFu, FunnelStage::MoFu, FunnelStage::BoFu];

    pub fn as_str(&self) -> &'static str {
        match self {
            FunnelStage::ToFu => "ToFu",
            FunnelStage::MoFu => "MoFu",
            FunnelStage::BoFu => "BoFu",
        }
    }

    /// Display label, e.g. `ToFu (Awareness)`
    pub fn label(&self) -> &'static str {
        match self {
            FunnelStage::ToFu => "ToFu (Awareness)",
            FunnelStage::MoFu => "MoFu (Consideration)",
            FunnelStage::BoFu => "BoFu (Decision)",
        }
    }

    /// Parse a wire value; anything outside the closed set is `None`
    pub fn from_wire(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|stage| stage.as_str().eq_ignore_ascii_case(value))
    }
}

impl fmt::Display for FunnelStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn funnel_stage_schema(_: &mut schemars::r#gen::SchemaGenerator) -> schemars::schema::Schema {
    use schemars::schema::{InstanceType, SchemaObject};

    SchemaObject {
        instance_type: Some(InstanceType::String.into()),
        enum_values: Some(
            FunnelStage::ALL
                .iter()
                .map(|stage| serde_json::Value::from(stage.as_str()))
                .collect(),
        ),
        ..Default::default()
    }
    .into()
}

/// Nested response of a topic generation call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopicTree {
    pub product_based_topics: Vec<Subject>,
    pub timely_topics: Vec<Subject>,
}

/// A product/service or a timely event, the top grouping key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Subject {
    #[serde(alias = "productName", alias = "eventName")]
    pub name: String,
    pub funnels: Vec<Funnel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Funnel {
    /// Kept as the raw wire value so unknown stages decode and can be skipped
    #[serde(rename = "funnelStage")]
    #[schemars(schema_with = "funnel_stage_schema")]
    pub stage: String,
    pub audiences: Vec<Audience>,
}

impl Funnel {
    pub fn stage(&self) -> Option<FunnelStage> {
        FunnelStage::from_wire(&self.stage)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Audience {
    #[serde(rename = "audienceName")]
    pub name: String,
    pub publications: Vec<Publication>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Publication {
    #[serde(rename = "publicationNiche")]
    pub niche: String,
    pub topics: Vec<Topic>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub title: String,
    pub headline: String,
    pub rationale: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_page: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus_keyword: Option<String>,
}

impl TopicTree {
    /// Total number of topic leaves across both groups
    pub fn topic_count(&self) -> usize {
        self.product_based_topics
            .iter()
            .chain(&self.timely_topics)
            .flat_map(|s| &s.funnels)
            .flat_map(|f| &f.audiences)
            .flat_map(|a| &a.publications)
            .map(|p| p.topics.len())
            .sum()
    }

    /// Mutable iterator over every topic leaf
    pub fn topics_mut(&mut self) -> impl Iterator<Item = &mut Topic> {
        self.product_based_topics
            .iter_mut()
            .chain(self.timely_topics.iter_mut())
            .flat_map(|s| s.funnels.iter_mut())
            .flat_map(|f| f.audiences.iter_mut())
            .flat_map(|a| a.publications.iter_mut())
            .flat_map(|p| p.topics.iter_mut())
    }
}

// =============================================================================
// Business profile
// =============================================================================

/// Structured summary of a business, extracted from its copy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BusinessProfile {
    /// Vocabulary category, or `Not found (Identified as: <label>)`
    pub industry: String,
    pub tone: String,
    pub target_audience_and_pain_points: String,
    pub services_and_products: Vec<ServiceOrProduct>,
    pub target_location: String,
    pub guidelines_summary: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceOrProduct {
    pub name: String,
    pub associated_industry: String,
    pub associated_audience: String,
    pub associated_pain_point: String,
}

const NOT_FOUND_PREFIX: &str = "Not found (Identified as: ";

/// Outcome of the controlled-vocabulary industry classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Industry {
    /// A member of the vocabulary
    Known(String),
    /// No vocabulary match; carries the label the model detected
    Unmatched(String),
}

impl Industry {
    /// Parse a profile's industry value
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        match value
            .strip_prefix(NOT_FOUND_PREFIX)
            .and_then(|rest| rest.strip_suffix(')'))
        {
            Some(label) => Industry::Unmatched(label.trim().to_string()),
            None => Industry::Known(value.to_string()),
        }
    }

    /// The wire form of an unmatched label
    pub fn not_found(label: &str) -> String {
        format!("{}{})", NOT_FOUND_PREFIX, label.trim())
    }

    /// Human-readable industry name
    pub fn display_name(&self) -> &str {
        match self {
            Industry::Known(name) | Industry::Unmatched(name) => name,
        }
    }
}

/// One of the structured optional business fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusinessField {
    Industry,
    Tone,
    Audience,
    Product,
}

impl BusinessField {
    pub const ALL: [BusinessField; 4] = [
        BusinessField::Industry,
        BusinessField::Tone,
        BusinessField::Audience,
        BusinessField::Product,
    ];
}

impl BusinessProfile {
    pub fn industry_class(&self) -> Industry {
        Industry::parse(&self.industry)
    }

    /// Value this profile contributes to a structured business field
    pub fn field_value(&self, field: BusinessField) -> String {
        match field {
            BusinessField::Industry => self.industry_class().display_name().to_string(),
            BusinessField::Tone => self.tone.trim().to_string(),
            BusinessField::Audience => self.target_audience_and_pain_points.trim().to_string(),
            BusinessField::Product => self
                .services_and_products
                .iter()
                .map(|p| p.name.trim())
                .filter(|n| !n.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    /// Plain-text rendering, also used as scrape-derived guidelines
    pub fn summary_text(&self) -> String {
        let mut out = String::new();

        match self.industry_class() {
            Industry::Known(name) => out.push_str(&format!("Industry: {}\n", name)),
            Industry::Unmatched(label) => out.push_str(&format!(
                "Industry: {} (not in the standard category list)\n",
                label
            )),
        }
        out.push_str(&format!("Tone: {}\n", self.tone));
        out.push_str(&format!(
            "Target Audience & Pain Points: {}\n",
            self.target_audience_and_pain_points
        ));
        if !self.target_location.trim().is_empty() {
            out.push_str(&format!("Target Location: {}\n", self.target_location));
        }

        if !self.services_and_products.is_empty() {
            out.push_str("Services & Products:\n");
            for item in &self.services_and_products {
                out.push_str(&format!(
                    "- {} (Industry: {}; Audience: {}; Pain Point: {})\n",
                    item.name, item.associated_industry, item.associated_audience, item.associated_pain_point
                ));
            }
        }

        if !self.guidelines_summary.trim().is_empty() {
            out.push_str(&format!("Guidelines Summary: {}\n", self.guidelines_summary));
        }

        out
    }
}
