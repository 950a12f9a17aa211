//! Shared text normalization helpers used by the scoring, confirmation,
//! and verification stages.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;

lazy_static! {
    // Words of three or more chars, letters first. Matches the tokenizer
    // used when mining free-text descriptions for factor overlap.
    static ref WORD: Regex = Regex::new(r"[a-zA-Z][a-zA-Z0-9\-]{2,}").unwrap();
}

/// Lowercased, trimmed form of a single value.
pub fn norm(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Normalized set of non-empty values.
pub fn norm_set(values: &[String]) -> BTreeSet<String> {
    values
        .iter()
        .map(|v| norm(v))
        .filter(|v| !v.is_empty())
        .collect()
}

/// Normalized token set mined from free text.
pub fn tokenize(text: &str) -> BTreeSet<String> {
    WORD.find_iter(text).map(|m| norm(m.as_str())).collect()
}

/// Jaccard similarity between the token sets of two phrases.
pub fn token_jaccard(a: &str, b: &str) -> f64 {
    let ta = tokenize(a);
    let tb = tokenize(b);
    if ta.is_empty() || tb.is_empty() {
        return 0.0;
    }
    let inter = ta.intersection(&tb).count();
    let union = ta.union(&tb).count();
    inter as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_norm_set_drops_empty() {
        let set = norm_set(&["  Cloud ".to_string(), "".to_string(), "AI".to_string()]);
        assert!(set.contains("cloud"));
        assert!(set.contains("ai"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_tokenize_skips_short_words() {
        let tokens = tokenize("We do IT and cloud-migration work");
        assert!(tokens.contains("cloud-migration"));
        assert!(tokens.contains("work"));
        assert!(!tokens.contains("it"));
    }

    #[test]
    fn test_jaccard_bounds() {
        assert_eq!(token_jaccard("cloud security", "cloud security"), 1.0);
        assert_eq!(token_jaccard("cloud", "logistics"), 0.0);
        let partial = token_jaccard("cloud security services", "cloud security");
        assert!(partial > 0.0 && partial < 1.0);
    }
}
