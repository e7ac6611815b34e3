//! Frequency-ranked keyword extraction.
//!
//! One parameterized routine serves both the analysis endpoint and blog tag
//! generation; the call sites differ only in the `KeywordOptions` they pass.

use std::collections::HashMap;

pub const STOP_WORDS: &[&str] = &[
    "about", "above", "after", "again", "also", "because", "been", "before", "being", "below",
    "between", "both", "could", "does", "doing", "down", "during", "each", "even", "from",
    "further", "have", "having", "here", "into", "just", "more", "most", "much", "only", "other",
    "over", "same", "should", "some", "such", "than", "that", "their", "them", "then", "there",
    "these", "they", "this", "those", "through", "under", "until", "very", "want", "were",
    "what", "when", "where", "which", "while", "will", "with", "would", "your", "you're",
];

#[derive(Debug, Clone)]
pub struct KeywordOptions<'a> {
    /// Words with `len <= min_len` characters are dropped.
    pub min_len: usize,
    pub stop_words: &'a [&'a str],
    pub top_n: usize,
}

impl KeywordOptions<'static> {
    /// Analysis endpoint: top 10.
    pub fn analysis() -> Self {
        Self {
            min_len: 3,
            stop_words: STOP_WORDS,
            top_n: 10,
        }
    }

    /// Article tags: top 8.
    pub fn blog_tags() -> Self {
        Self {
            min_len: 3,
            stop_words: STOP_WORDS,
            top_n: 8,
        }
    }
}

/// Lowercases, strips punctuation, splits on whitespace, filters short and stop
/// words, and returns the `top_n` most frequent words. Ties keep first-seen order.
pub fn extract_keywords(text: &str, options: &KeywordOptions<'_>) -> Vec<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '_')
        .collect();

    // word -> (count, first position)
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (position, word) in cleaned.split_whitespace().enumerate() {
        if word.chars().count() <= options.min_len || options.stop_words.contains(&word) {
            continue;
        }
        counts
            .entry(word)
            .and_modify(|(count, _)| *count += 1)
            .or_insert((1, position));
    }

    let mut ranked: Vec<(&str, usize, usize)> = counts
        .into_iter()
        .map(|(word, (count, first))| (word, count, first))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    ranked
        .into_iter()
        .take(options.top_n)
        .map(|(word, _, _)| word.to_string())
        .collect()
}
