//! Utility functions for candidate handling.

/// Trim every candidate and drop the blank ones.
///
/// Order is preserved and duplicates are kept: each surviving entry is
/// probed independently.
pub fn prepare_candidates<S: AsRef<str>>(candidates: &[S]) -> Vec<String> {
    candidates
        .iter()
        .map(|candidate| candidate.as_ref().trim())
        .filter(|candidate| !candidate.is_empty())
        .map(str::to_string)
        .collect()
}

/// Strip the brackets around an IPv6 literal such as `[::1]`.
pub(crate) fn strip_brackets(server: &str) -> &str {
    server
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(server)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_candidates_drops_blanks() {
        let input = ["8.8.8.8", "", "  ", "1.1.1.1"];
        assert_eq!(prepare_candidates(&input), vec!["8.8.8.8", "1.1.1.1"]);
    }

    #[test]
    fn test_prepare_candidates_trims_and_keeps_duplicates() {
        let input = vec![
            " 9.9.9.9 ".to_string(),
            "\t9.9.9.9\r".to_string(),
            "\n".to_string(),
        ];
        assert_eq!(prepare_candidates(&input), vec!["9.9.9.9", "9.9.9.9"]);
    }

    #[test]
    fn test_prepare_candidates_empty() {
        let input: Vec<String> = Vec::new();
        assert!(prepare_candidates(&input).is_empty());
    }

    #[test]
    fn test_strip_brackets() {
        assert_eq!(strip_brackets("[::1]"), "::1");
        assert_eq!(strip_brackets("::1"), "::1");
        assert_eq!(strip_brackets("8.8.8.8"), "8.8.8.8");
        assert_eq!(strip_brackets("[broken"), "[broken");
    }
}
