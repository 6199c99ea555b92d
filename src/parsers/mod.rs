pub mod html;
pub mod text;

#[cfg(test)]
mod tests;

/// Kind of document behind a URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// HTML page (the default)
    Html,
    /// Plain text document, never parsed for links
    Text,
    /// Binary or asset file that carries no business copy
    Asset,
}

impl ContentKind {
    /// Classifies a URL by its path extension
    pub fn from_url(url: &str) -> Self {
        let path = url.split(['?', '#']).next().unwrap_or(url).to_ascii_lowercase();

        if path.ends_with(".txt") || path.ends_with(".md") {
            ::log::debug!("Classifying as Text: {}", url);
            ContentKind::Text
        } else if [
            ".jpg", ".jpeg", ".png", ".gif", ".webp", ".svg", ".ico", ".css", ".js", ".pdf",
            ".zip", ".mp4", ".mp3", ".woff", ".woff2",
        ]
        .iter()
        .any(|ext| path.ends_with(ext))
        {
            ::log::debug!("Classifying as Asset: {}", url);
            ContentKind::Asset
        } else {
            ContentKind::Html
        }
    }

    pub fn should_extract_links(&self) -> bool {
        matches!(self, ContentKind::Html)
    }
}

/// Result of parsing a fetched document
#[derive(Debug, Clone, Default)]
pub struct ParseResult {
    /// Visible text, one text block per line
    pub content: String,
    /// Raw href values, unresolved
    pub links: Vec<String>,
    /// Document title
    pub title: Option<String>,
    /// Meta description
    pub description: Option<String>,
}

impl ParseResult {
    pub fn content_only(content: String) -> Self {
        Self {
            content,
            ..Default::default()
        }
    }
}

/// Delegates to the format-specific parser
pub struct Parser;

impl Parser {
    pub fn parse(content: &str, kind: ContentKind) -> ParseResult {
        match kind {
            ContentKind::Html => html::parse(content),
            ContentKind::Text => ParseResult::content_only(text::normalize_lines(content)),
            ContentKind::Asset => ParseResult::default(),
        }
    }

    /// Determine the content kind from the URL and then parse
    pub fn parse_from_url(content: &str, url: &str) -> ParseResult {
        Self::parse(content, ContentKind::from_url(url))
    }
}
