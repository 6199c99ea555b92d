//! Builds the user-context text for a topic generation call.

use crate::model::BusinessField;
use crate::session::{BusinessDetails, GuidelinesSource, ScrapeContext};
use chrono::NaiveDate;
use std::fmt::Write;

/// Date format used in the context, e.g. `March 3, 2026`
pub const DATE_FORMAT: &str = "%B %-d, %Y";

/// Label for a structured field in the supplemental block
fn supplemental_label(field: BusinessField) -> &'static str {
    match field {
        BusinessField::Industry => "Specific Industry/Niche",
        BusinessField::Tone => "Specific Branding Tone/Voice",
        BusinessField::Audience => "Specific Target Audiences",
        BusinessField::Product => "Specific Products/Services",
    }
}

/// Label for a structured field when the fields are the primary context
fn primary_label(field: BusinessField) -> &'static str {
    match field {
        BusinessField::Industry => "Industry/Niche",
        BusinessField::Tone => "Branding Tone/Voice",
        BusinessField::Audience => "Target Audiences",
        BusinessField::Product => "Products/Services",
    }
}

/// Assemble the prompt context.
///
/// Guidelines, when present, are the primary block and the structured
/// fields become supplemental lines; otherwise the structured fields are
/// the primary block. A supplemental field equal to what the scrape
/// already produced is left out when the guidelines came from that scrape.
pub fn assemble(
    current_date: NaiveDate,
    details: &BusinessDetails,
    scrape: Option<&ScrapeContext>,
) -> String {
    let mut out = format!("Current Date: {}\n\n", current_date.format(DATE_FORMAT));

    if let Some(scrape) = scrape.filter(|s| !s.pages.is_empty()) {
        let _ = writeln!(out, "Base URL: {}", scrape.base_url);
        out.push_str("Available Destination Pages (destinationPage must be one of these URLs):\n");
        for (i, page) in scrape.pages.iter().enumerate() {
            let title = if page.title.trim().is_empty() {
                "Untitled"
            } else {
                page.title.trim()
            };
            let _ = writeln!(out, "{}. {} (title: {})", i + 1, page.url, title);
        }
        out.push('\n');
    }

    if details.has_guidelines() {
        out.push_str("Full Copywriting Guidelines:\n---\n");
        out.push_str(details.guidelines.trim());
        out.push_str("\n---\n");

        let suppress_from = match details.guidelines_source {
            GuidelinesSource::Scraped => scrape,
            GuidelinesSource::Typed => None,
        };

        let lines: Vec<String> = BusinessField::ALL
            .into_iter()
            .filter_map(|field| {
                let value = details.field(field).trim();
                if value.is_empty() {
                    return None;
                }
                if let Some(scrape) = suppress_from {
                    if same_value(value, &scrape.profile.field_value(field)) {
                        ::log::debug!("Suppressing {:?}: already captured by scraped guidelines", field);
                        return None;
                    }
                }
                Some(format!("- {}: {}", supplemental_label(field), value))
            })
            .collect();

        if !lines.is_empty() {
            out.push_str("\nSupplemental Details from Optional Fields:\n");
            out.push_str(&lines.join("\n"));
            out.push('\n');
        }
    } else {
        out.push_str("Business Details:\n");
        for field in BusinessField::ALL {
            let value = details.field(field).trim();
            if !value.is_empty() {
                let _ = writeln!(out, "- {}: {}", primary_label(field), value);
            }
        }
    }

    out
}

/// Compare two field values ignoring case, spacing and trailing punctuation
fn same_value(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

fn normalize(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end_matches(['.', ',', ';', '!'])
        .to_lowercase()
}
