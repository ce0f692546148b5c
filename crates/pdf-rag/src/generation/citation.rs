//! Passage trimming for prompt context

/// Truncate snippet to at most `max_chars` characters while preserving word boundaries
///
/// The result carries a trailing `...` when anything was removed.
pub fn truncate_snippet(snippet: &str, max_chars: usize) -> String {
    let end = match snippet.char_indices().nth(max_chars) {
        Some((idx, _)) => idx,
        None => return snippet.to_string(),
    };

    // Try to end at a word boundary
    if let Some(pos) = snippet[..end].rfind(char::is_whitespace) {
        if pos > 0 {
            return format!("{}...", snippet[..pos].trim_end());
        }
    }

    format!("{}...", &snippet[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_snippet_untouched() {
        assert_eq!(truncate_snippet("Refunds within 30 days.", 100), "Refunds within 30 days.");
    }

    #[test]
    fn test_truncate_snippet() {
        let snippet = "This is a very long snippet that needs to be truncated.";
        let truncated = truncate_snippet(snippet, 20);

        assert!(truncated.len() <= 23); // 20 + "..."
        assert!(truncated.ends_with("..."));
        assert_eq!(truncated, "This is a very long...");
    }

    #[test]
    fn test_multibyte_boundary() {
        let snippet = "Prüfung läuft über Nacht";
        let truncated = truncate_snippet(snippet, 3);
        assert!(truncated.ends_with("..."));
        assert!(truncated.starts_with("Pr"));
    }

    #[test]
    fn test_limit_counts_characters() {
        let snippet = "é".repeat(10);
        assert_eq!(truncate_snippet(&snippet, 4), "éééé...");
        assert_eq!(truncate_snippet(&snippet, 10), snippet);
    }
}
