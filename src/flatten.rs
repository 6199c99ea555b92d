//! Flattening of the topic tree into one row per topic.

use crate::model::{Funnel, FunnelStage, Subject, TopicTree};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Top-level group a subject came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubjectGroup {
    Product,
    Timely,
}

impl SubjectGroup {
    pub fn label(&self) -> &'static str {
        match self {
            SubjectGroup::Product => "Product/Service",
            SubjectGroup::Timely => "Event/Holiday",
        }
    }
}

impl fmt::Display for SubjectGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One topic leaf with its full ancestor path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicRow {
    pub group: SubjectGroup,
    pub subject: String,
    pub stage: FunnelStage,
    pub audience: String,
    pub publication: String,
    pub title: String,
    pub headline: String,
    pub rationale: String,
    pub anchor_text: Option<String>,
    pub destination_page: Option<String>,
    pub focus_keyword: Option<String>,
}

/// Funnels of a subject in ToFu, MoFu, BoFu order; unknown stages are dropped
pub fn ordered_funnels(funnels: &[Funnel]) -> Vec<(FunnelStage, &Funnel)> {
    let mut ordered: Vec<_> = funnels
        .iter()
        .filter_map(|funnel| match funnel.stage() {
            Some(stage) => Some((stage, funnel)),
            None => {
                ::log::warn!("Skipping funnel with unknown stage '{}'", funnel.stage);
                None
            }
        })
        .collect();
    ordered.sort_by_key(|(stage, _)| *stage);
    ordered
}

/// Flatten a topic tree, product subjects first, then timely ones.
pub fn flatten(tree: &TopicTree) -> Vec<TopicRow> {
    let mut rows = Vec::new();
    flatten_group(SubjectGroup::Product, &tree.product_based_topics, &mut rows);
    flatten_group(SubjectGroup::Timely, &tree.timely_topics, &mut rows);
    rows
}

fn flatten_group(group: SubjectGroup, subjects: &[Subject], rows: &mut Vec<TopicRow>) {
    for subject in subjects {
        for (stage, funnel) in ordered_funnels(&subject.funnels) {
            for audience in &funnel.audiences {
                for publication in &audience.publications {
                    for topic in &publication.topics {
                        rows.push(TopicRow {
                            group,
                            subject: subject.name.clone(),
                            stage,
                            audience: audience.name.clone(),
                            publication: publication.niche.clone(),
                            title: topic.title.clone(),
                            headline: topic.headline.clone(),
                            rationale: topic.rationale.clone(),
                            anchor_text: topic.anchor_text.clone(),
                            destination_page: topic.destination_page.clone(),
                            focus_keyword: topic.focus_keyword.clone(),
                        });
                    }
                }
            }
        }
    }
}

/// Optional criteria over flattened rows; text fields match case-insensitive substrings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowFilter {
    pub stage: Option<FunnelStage>,
    pub audience: Option<String>,
    pub publication: Option<String>,
    pub subject: Option<String>,
}

impl RowFilter {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, row: &TopicRow) -> bool {
        self.stage.is_none_or(|stage| stage == row.stage)
            && contains(&self.audience, &row.audience)
            && contains(&self.publication, &row.publication)
            && contains(&self.subject, &row.subject)
    }

    pub fn apply(&self, rows: &[TopicRow]) -> Vec<TopicRow> {
        rows.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

fn contains(needle: &Option<String>, haystack: &str) -> bool {
    match needle.as_deref().map(str::trim) {
        None | Some("") => true,
        Some(needle) => haystack.to_lowercase().contains(&needle.to_lowercase()),
    }
}
