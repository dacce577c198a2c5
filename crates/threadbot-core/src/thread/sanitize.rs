//! Output sanitization for generated replies.
//!
//! Truncation is a hard cut with no word-boundary awareness, measured in
//! `char`s so a cut never splits a code point. Quote stripping runs after
//! truncation.

/// Truncate then strip edge quotes.
pub fn sanitize(text: &str, max_length: usize) -> String {
    strip_edge_quotes(truncate(text, max_length)).to_string()
}

/// Cut `text` to at most `max_length` characters.
pub fn truncate(text: &str, max_length: usize) -> &str {
    match text.char_indices().nth(max_length) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Drop one leading and one trailing `"` or `'`, each independently.
///
/// Interior quotes are left alone.
pub fn strip_edge_quotes(text: &str) -> &str {
    let text = text
        .strip_prefix('"')
        .or_else(|| text.strip_prefix('\''))
        .unwrap_or(text);
    text.strip_suffix('"')
        .or_else(|| text.strip_suffix('\''))
        .unwrap_or(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_both_double_quotes() {
        assert_eq!(strip_edge_quotes("\"hello\""), "hello");
    }

    #[test]
    fn test_strip_both_single_quotes() {
        assert_eq!(strip_edge_quotes("'hello'"), "hello");
    }

    #[test]
    fn test_strip_nothing_to_strip() {
        assert_eq!(strip_edge_quotes("hello"), "hello");
    }

    #[test]
    fn test_strip_one_side_only() {
        assert_eq!(strip_edge_quotes("\"hello"), "hello");
        assert_eq!(strip_edge_quotes("hello'"), "hello");
    }

    #[test]
    fn test_strip_mixed_quotes() {
        assert_eq!(strip_edge_quotes("'hello\""), "hello");
    }

    #[test]
    fn test_strip_keeps_interior_quotes() {
        assert_eq!(
            strip_edge_quotes("\"he said \"no\" and 'yes'\""),
            "he said \"no\" and 'yes'"
        );
    }

    #[test]
    fn test_strip_removes_at_most_one_each_side() {
        assert_eq!(strip_edge_quotes("\"\"hello\"\""), "\"hello\"");
    }

    #[test]
    fn test_strip_degenerate_inputs() {
        assert_eq!(strip_edge_quotes(""), "");
        assert_eq!(strip_edge_quotes("\""), "");
        assert_eq!(strip_edge_quotes("''"), "");
    }

    #[test]
    fn test_strip_idempotent_on_clean_text() {
        let inputs = [
            "hello",
            "\"hello\"",
            "'hello",
            "don't stop",
            "\"\"double\"\"",
            "\"",
            "",
        ];
        for input in inputs {
            let once = strip_edge_quotes(input);
            // Only inputs whose stripped form no longer has edge quotes are
            // fixed points after one pass.
            let has_edge_quote = once.starts_with(['"', '\'']) || once.ends_with(['"', '\'']);
            if !has_edge_quote {
                assert_eq!(strip_edge_quotes(once), once, "input = {input:?}");
            }
        }
    }

    #[test]
    fn test_truncate_short_text_untouched() {
        assert_eq!(truncate("short", 300), "short");
    }

    #[test]
    fn test_truncate_exact_length_untouched() {
        let text = "a".repeat(300);
        assert_eq!(truncate(&text, 300), text);
    }

    #[test]
    fn test_truncate_cuts_mid_word() {
        assert_eq!(truncate("disruption", 4), "disr");
    }

    #[test]
    fn test_truncate_counts_chars_not_bytes() {
        let text = "ü".repeat(310);
        let cut = truncate(&text, 300);
        assert_eq!(cut.chars().count(), 300);
        assert_eq!(cut.len(), 600);
    }

    #[test]
    fn test_sanitize_bound() {
        let inputs = [
            "x".repeat(1000),
            format!("\"{}\"", "y".repeat(500)),
            "🚀".repeat(301),
            String::new(),
        ];
        for input in &inputs {
            assert!(sanitize(input, 300).chars().count() <= 300);
        }
    }

    #[test]
    fn test_sanitize_short_quoted_reply() {
        assert_eq!(sanitize("\"This is my reply.\"", 300), "This is my reply.");
    }

    #[test]
    fn test_sanitize_truncates_before_stripping() {
        // The closing quote is cut off first, so only the opening one goes.
        let input = format!("\"{}\"", "z".repeat(400));
        let out = sanitize(&input, 300);
        assert_eq!(out, "z".repeat(299));
    }
}
