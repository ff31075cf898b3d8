//! Slug derivation for published articles.

/// Derives the article slug from its subtitle: lower-cased, with every
/// whitespace character replaced by a hyphen.
///
/// Each whitespace character is replaced independently — runs are NOT
/// collapsed and the input is not trimmed. Published URLs depend on
/// this exact rule, so it must not be "improved".
pub fn slugify(subtitle: &str) -> String {
    subtitle
        .to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() { '-' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_slug() {
        assert_eq!(slugify("Hello World"), "hello-world");
    }

    #[test]
    fn test_whitespace_runs_are_not_collapsed() {
        assert_eq!(slugify("  Multi   Space "), "--multi---space-");
    }

    #[test]
    fn test_tabs_and_newlines_count_as_whitespace() {
        assert_eq!(slugify("a\tb\nc"), "a-b-c");
    }

    #[test]
    fn test_already_lowercase_without_spaces() {
        assert_eq!(slugify("one-word"), "one-word");
    }

    #[test]
    fn test_empty_subtitle() {
        assert_eq!(slugify(""), "");
    }
}
