//! Plain-text shaping: whitespace normalization, truncation and
//! extractive one-sentence summaries.

/// Sentences shorter than this are skipped when summarizing
pub const MIN_SUMMARY_SENTENCE_CHARS: usize = 20;

/// Normalizes text line by line.
///
/// - Collapses runs of whitespace inside each line to one space
/// - Removes empty lines
/// - Keeps one line per text block so paragraph boundaries are preserved
pub fn normalize_lines(text: &str) -> String {
    text.lines()
        .map(collapse_whitespace)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Normalizes whitespace within a single line or paragraph
pub fn collapse_whitespace(segment: &str) -> String {
    segment.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keeps at most `max_chars` characters.
///
/// Counts `char`s, not bytes, so multi-byte text is never split mid-character.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

/// Splits text into sentences on `.`, `!` or `?` followed by whitespace.
///
/// Line breaks always end a sentence.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();

    for line in text.lines() {
        let mut start = 0;
        let mut chars = line.char_indices().peekable();

        while let Some((idx, c)) = chars.next() {
            if !matches!(c, '.' | '!' | '?') {
                continue;
            }
            let at_boundary = chars.peek().is_none_or(|(_, next)| next.is_whitespace());
            if at_boundary {
                let end = idx + c.len_utf8();
                let sentence = line[start..end].trim();
                if !sentence.is_empty() {
                    sentences.push(sentence);
                }
                start = end;
            }
        }

        let rest = line[start..].trim();
        if !rest.is_empty() {
            sentences.push(rest);
        }
    }

    sentences
}

/// First sentence long enough to say something about the page.
///
/// Purely extractive; returns an empty string when nothing qualifies.
pub fn summarize(text: &str) -> String {
    split_sentences(text)
        .into_iter()
        .find(|s| s.chars().count() >= MIN_SUMMARY_SENTENCE_CHARS)
        .map(str::to_string)
        .unwrap_or_default()
}
