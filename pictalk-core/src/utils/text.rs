//! Input cleanup and lightweight text helpers.

use uuid::Uuid;

pub const DEFAULT_MAX_INPUT_LENGTH: usize = 500;

const DANGEROUS_CHARS: [char; 6] = ['<', '>', '{', '}', '\\', ';'];

const STOPWORDS: [&str; 15] = [
    "a", "an", "the", "is", "are", "was", "were", "in", "on", "at", "to", "for", "of", "and", "or",
];

/// Trim, cap at `max_length` characters, then drop `< > { } \ ;`.
///
/// Truncation happens before the blacklist is applied, so the result can be
/// shorter than `max_length`.
pub fn sanitize_input(text: &str, max_length: usize) -> String {
    text.trim()
        .chars()
        .take(max_length)
        .filter(|c| !DANGEROUS_CHARS.contains(c))
        .collect()
}

pub fn extract_keywords(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .filter(|word| !STOPWORDS.contains(word) && word.chars().count() > 2)
        .map(str::to_string)
        .collect()
}

pub fn generate_session_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_input_strips_markup() {
        let sanitized = sanitize_input("<script>alert('xss')</script>", DEFAULT_MAX_INPUT_LENGTH);
        assert_eq!(sanitized, "scriptalert('xss')/script");

        let nasty = "  {a}\\b;c<d>  ";
        let sanitized = sanitize_input(nasty, DEFAULT_MAX_INPUT_LENGTH);
        assert_eq!(sanitized, "abcd");
        assert!(!sanitized.contains(DANGEROUS_CHARS));
    }

    #[test]
    fn test_sanitize_input_length() {
        let long_input = "a".repeat(1000);
        assert_eq!(sanitize_input(&long_input, 100).len(), 100);
        assert_eq!(sanitize_input(&long_input, DEFAULT_MAX_INPUT_LENGTH).len(), 500);
    }

    #[test]
    fn test_sanitize_input_counts_chars_not_bytes() {
        let sanitized = sanitize_input("ééééé", 3);
        assert_eq!(sanitized, "ééé");
    }

    #[test]
    fn test_sanitize_input_empty() {
        assert_eq!(sanitize_input("", 10), "");
        assert_eq!(sanitize_input("   ", 10), "");
    }

    #[test]
    fn test_extract_keywords() {
        let keywords = extract_keywords("What is the Color of the big dog in the park");
        assert_eq!(keywords, vec!["what", "color", "big", "dog", "park"]);
        assert!(extract_keywords("a an of to").is_empty());
    }

    #[test]
    fn test_generate_session_id_unique() {
        let a = generate_session_id();
        let b = generate_session_id();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(&a).is_ok());
    }
}
