use crate::parsers::{ParseResult, text};
use scraper::{ElementRef, Html, Selector};

/// Elements whose text never reaches the extracted content
const SKIPPED_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Parses an HTML document into visible text, links, title and description
pub fn parse(html: &str) -> ParseResult {
    let doc = Html::parse_document(html);

    let content = extract_text(&doc);
    let links = extract_links(&doc);

    ::log::debug!("HTML parser found {} links", links.len());

    ParseResult {
        content,
        links,
        title: extract_title(&doc),
        description: extract_description(&doc),
    }
}

/// Visible body text with script/style content removed.
///
/// Each text block lands on its own line so paragraph boundaries survive.
pub fn extract_text(doc: &Html) -> String {
    let mut blocks = Vec::new();

    let root = Selector::parse("body")
        .ok()
        .and_then(|body| doc.select(&body).next())
        .unwrap_or_else(|| doc.root_element());
    collect_text(root, &mut blocks);

    text::normalize_lines(&blocks.join("\n"))
}

fn collect_text(element: ElementRef<'_>, blocks: &mut Vec<String>) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                blocks.push(trimmed.to_string());
            }
        } else if let Some(child_element) = ElementRef::wrap(child) {
            if !SKIPPED_ELEMENTS.contains(&child_element.value().name()) {
                collect_text(child_element, blocks);
            }
        }
    }
}

/// Raw href values of every anchor
pub fn extract_links(doc: &Html) -> Vec<String> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };
    doc.select(&selector)
        .filter_map(|e| e.value().attr("href"))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

pub fn extract_title(doc: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    doc.select(&selector)
        .next()
        .map(|el| text::collapse_whitespace(&el.text().collect::<String>()))
        .filter(|s| !s.is_empty())
}

/// Meta description, falling back to the OpenGraph description
pub fn extract_description(doc: &Html) -> Option<String> {
    ["meta[name='description']", "meta[property='og:description']"]
        .iter()
        .filter_map(|css| Selector::parse(css).ok())
        .find_map(|selector| {
            doc.select(&selector)
                .filter_map(|el| el.value().attr("content"))
                .map(text::collapse_whitespace)
                .find(|s| !s.is_empty())
        })
}
