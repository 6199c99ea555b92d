use crate::parsers::text;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_lines() {
        assert_eq!(text::normalize_lines(""), "");
        assert_eq!(text::normalize_lines("   \n\t\n"), "");
        assert_eq!(
            text::normalize_lines("  Line   1  \n\n\nLine\t2\n"),
            "Line 1\nLine 2"
        );
    }

    #[test]
    fn test_truncate_chars_exact_budget() {
        let long = "a".repeat(40_000);
        let truncated = text::truncate_chars(&long, 15_000);
        assert_eq!(truncated.chars().count(), 15_000);

        let short = "short text";
        assert_eq!(text::truncate_chars(short, 15_000), short);
    }

    #[test]
    fn test_truncate_chars_multibyte() {
        let s = "héllo wörld";
        assert_eq!(text::truncate_chars(s, 4), "héll");
        assert_eq!(text::truncate_chars(s, 0), "");
    }

    #[test]
    fn test_split_sentences() {
        let sentences = text::split_sentences("First one. Second one! Third?\nHeading\nv1.2 is out... Really.");
        assert_eq!(
            sentences,
            vec![
                "First one.",
                "Second one!",
                "Third?",
                "Heading",
                "v1.2 is out...",
                "Really."
            ]
        );
    }

    #[test]
    fn test_summarize_skips_short_sentences() {
        let page = "Welcome!\nHome\nAcme keeps small business files safe in the cloud. We also sell hardware.";
        assert_eq!(
            text::summarize(page),
            "Acme keeps small business files safe in the cloud."
        );
    }

    #[test]
    fn test_summarize_nothing_qualifies() {
        assert_eq!(text::summarize("Hi. Menu. Login."), "");
        assert_eq!(text::summarize(""), "");
    }
}
