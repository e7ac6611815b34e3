// Text analysis: hosted NLP with offline lexicon and frequency heuristics.

pub mod analyzer;
pub mod handlers;
pub mod keywords;
pub mod sentiment;
