//! Renderings of pipeline results for stdout or files.

use crate::error::Result;
use crate::flatten::{SubjectGroup, ordered_funnels};
use crate::model::{Subject, TopicTree};
use crate::results::PageRecord;
use std::fmt::Write;

/// Rows as a pretty-printed JSON array
pub fn rows_to_json<T: serde::Serialize>(rows: &[T]) -> Result<String> {
    Ok(serde_json::to_string_pretty(rows)?)
}

/// Rows as JSON lines, one object per line
pub fn rows_to_jsonl<T: serde::Serialize>(rows: &[T]) -> Result<String> {
    let mut out = String::new();
    for row in rows {
        out.push_str(&serde_json::to_string(row)?);
        out.push('\n');
    }
    Ok(out)
}

pub fn pages_to_json(pages: &[PageRecord]) -> Result<String> {
    rows_to_json(pages)
}

/// Render the topic tree as indented text, funnels in stage order.
pub fn render_tree(tree: &TopicTree) -> String {
    let mut out = String::from("Generated Topics\n");

    if !tree.product_based_topics.is_empty() {
        out.push_str("\n1. Product/Service Topics\n");
        render_group(&mut out, SubjectGroup::Product, &tree.product_based_topics);
    }
    if !tree.timely_topics.is_empty() {
        out.push_str("\n2. Timely & Event-Based Topics\n");
        render_group(&mut out, SubjectGroup::Timely, &tree.timely_topics);
    }
    out
}

fn render_group(out: &mut String, group: SubjectGroup, subjects: &[Subject]) {
    for subject in subjects {
        let _ = writeln!(out, "\n{}: {}", group.label(), subject.name);
        for (stage, funnel) in ordered_funnels(&subject.funnels) {
            let _ = writeln!(out, "  {}", stage.label());
            for audience in &funnel.audiences {
                let _ = writeln!(out, "    Target Audience: {}", audience.name);
                for publication in &audience.publications {
                    let _ = writeln!(out, "      Publication Niche: {}", publication.niche);
                    for topic in &publication.topics {
                        let _ = writeln!(out, "        - Title: {}", topic.title);
                        let _ = writeln!(out, "          Headline: {}", topic.headline);
                        let _ = writeln!(out, "          Rationale: {}", topic.rationale);
                        if let Some(anchor) = &topic.anchor_text {
                            let _ = writeln!(out, "          Anchor Text: {}", anchor);
                        }
                        if let Some(page) = &topic.destination_page {
                            let _ = writeln!(out, "          Destination: {}", page);
                        }
                        if let Some(keyword) = &topic.focus_keyword {
                            let _ = writeln!(out, "          Focus Keyword: {}", keyword);
                        }
                    }
                }
            }
        }
    }
}
