// src/scoring/relatability.rs
//! Keyword-based relatability: a cheap topical-fit proxy for home-cooking
//! content. Matching is deliberately substring-based ("homey" counts for
//! "home") and case-insensitive.

/// The fixed keyword set. Order does not matter; each keyword counts at most
/// once per post regardless of how often it appears.
pub const RELATABILITY_KEYWORDS: [&str; 10] = [
    "home", "family", "simple", "dinner", "kids", "husband", "wife", "tired", "cheap", "grocery",
];

/// Count how many of `keywords` occur in `content` (case-insensitive,
/// substring match).
pub fn keyword_hits(content: &str, keywords: &[String]) -> u32 {
    let lower = content.to_lowercase();
    keywords.iter().filter(|kw| lower.contains(kw.as_str())).count() as u32
}

/// Default keyword list as owned strings, for config defaults.
pub fn default_keywords() -> Vec<String> {
    RELATABILITY_KEYWORDS.iter().map(|s| s.to_string()).collect()
}
