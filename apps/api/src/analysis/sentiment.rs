//! Lexicon sentiment, the offline stand-in for the hosted classifier.
//!
//! Counts whole-word hits from two fixed word lists in the lowercased text.
//! Majority wins, a tie is neutral. The score moves 0.1 per net hit away
//! from 0.5 and is clamped to [0.05, 0.95].

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

const POSITIVE_WORDS: &[&str] = &[
    "good",
    "great",
    "excellent",
    "amazing",
    "awesome",
    "fantastic",
    "wonderful",
    "love",
    "like",
    "happy",
    "best",
    "positive",
    "perfect",
    "helpful",
    "easy",
    "beautiful",
    "brilliant",
    "enjoy",
    "outstanding",
    "recommend",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad",
    "terrible",
    "awful",
    "horrible",
    "hate",
    "poor",
    "worst",
    "negative",
    "difficult",
    "sad",
    "angry",
    "disappointing",
    "disappointed",
    "broken",
    "useless",
    "slow",
    "boring",
    "fail",
    "problem",
    "ugly",
];

const BASE_SCORE: f64 = 0.5;
const STEP: f64 = 0.1;
const MIN_SCORE: f64 = 0.05;
const MAX_SCORE: f64 = 0.95;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub label: SentimentLabel,
    /// 0.0 (very negative) – 1.0 (very positive); exactly 0.5 when neutral.
    pub score: f64,
}

fn word_list_regex(words: &[&str]) -> Regex {
    let alternation = words.join("|");
    Regex::new(&format!(r"\b(?:{alternation})\b")).expect("word list regex is valid")
}

fn positive_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| word_list_regex(POSITIVE_WORDS))
}

fn negative_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| word_list_regex(NEGATIVE_WORDS))
}

/// Classifies `text` with the fixed lexicons.
pub fn analyze_sentiment(text: &str) -> SentimentResult {
    let lowered = text.to_lowercase();
    let positive = positive_regex().find_iter(&lowered).count() as i64;
    let negative = negative_regex().find_iter(&lowered).count() as i64;

    let label = match positive.cmp(&negative) {
        std::cmp::Ordering::Greater => SentimentLabel::Positive,
        std::cmp::Ordering::Less => SentimentLabel::Negative,
        std::cmp::Ordering::Equal => SentimentLabel::Neutral,
    };

    let score = (BASE_SCORE + STEP * (positive - negative) as f64).clamp(MIN_SCORE, MAX_SCORE);

    SentimentResult { label, score }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_good_and_great_is_positive() {
        let result = analyze_sentiment("This is good and great");
        assert_eq!(result.label, SentimentLabel::Positive);
        assert!(result.score > 0.5);
    }

    #[test]
    fn test_balanced_text_is_exactly_neutral() {
        let result = analyze_sentiment("The docs are great but the build is slow");
        assert_eq!(result.label, SentimentLabel::Neutral);
        assert_eq!(result.score, 0.5);
    }

    #[test]
    fn test_no_lexicon_words_is_neutral() {
        let result = analyze_sentiment("Kubernetes schedules pods onto nodes.");
        assert_eq!(result.label, SentimentLabel::Neutral);
        assert_eq!(result.score, 0.5);
    }

    #[test]
    fn test_negative_text() {
        let result = analyze_sentiment("Terrible UX, broken links, awful support");
        assert_eq!(result.label, SentimentLabel::Negative);
        assert!(result.score < 0.5);
    }

    #[test]
    fn test_whole_word_matching_only() {
        // "goodness" and "badge" must not count as lexicon hits
        let result = analyze_sentiment("Goodness, what a badge");
        assert_eq!(result.label, SentimentLabel::Neutral);
    }

    #[test]
    fn test_match_is_case_insensitive() {
        let result = analyze_sentiment("GREAT");
        assert_eq!(result.label, SentimentLabel::Positive);
    }

    #[test]
    fn test_score_is_clamped() {
        let text = "good great excellent amazing awesome fantastic wonderful love";
        let result = analyze_sentiment(text);
        assert_eq!(result.score, MAX_SCORE);

        let text = "bad terrible awful horrible hate poor worst useless";
        let result = analyze_sentiment(text);
        assert_eq!(result.score, MIN_SCORE);
    }
}
