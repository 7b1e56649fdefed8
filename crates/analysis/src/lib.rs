//! Text analysis for Quill — keyword extraction, sentiment, complexity.
//!
//! Deliberately lightweight: fixed word lists and frequency counting,
//! no learned models. Good enough to drive keyword-overlap relevance
//! scoring and mood tagging without pulling in an NLP stack.

use quill_core::TextAnalyzer;
use std::collections::HashMap;

/// Words ignored during keyword extraction.
const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "is", "are",
];

/// Positive sentiment markers.
const POSITIVE_WORDS: &[&str] = &[
    "good", "great", "awesome", "excellent", "happy", "love", "wonderful", "fantastic", "nice",
    "perfect", "better", "best", "glad", "pleased",
];

/// Negative sentiment markers.
const NEGATIVE_WORDS: &[&str] = &[
    "bad", "terrible", "awful", "horrible", "sad", "hate", "worst", "poor", "disappointed",
    "upset", "angry", "worse", "dislike",
];

/// Word-list based text analyzer.
#[derive(Debug, Clone, Default)]
pub struct KeywordAnalyzer;

impl KeywordAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Lowercase, strip everything but alphanumerics and spaces,
    /// squeeze whitespace.
    pub fn preprocess(&self, text: &str) -> String {
        let cleaned: String = text
            .to_lowercase()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c.is_whitespace() { c } else { ' ' })
            .collect();
        cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Word count, average word length, and sentence count.
    pub fn analyze_complexity(&self, text: &str) -> TextComplexity {
        let words: Vec<&str> = text.split_whitespace().collect();
        let sentence_count = text.split('.').filter(|s| !s.trim().is_empty()).count();
        let avg_word_length = if words.is_empty() {
            0.0
        } else {
            words.iter().map(|w| w.len()).sum::<usize>() as f64 / words.len() as f64
        };
        TextComplexity {
            word_count: words.len(),
            avg_word_length,
            sentence_count,
        }
    }
}

/// Simple structural metrics for a piece of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextComplexity {
    pub word_count: usize,
    pub avg_word_length: f64,
    pub sentence_count: usize,
}

impl TextAnalyzer for KeywordAnalyzer {
    fn extract_keywords(&self, text: &str, max_keywords: usize) -> Vec<String> {
        let cleaned = self.preprocess(text);

        // Count frequencies, remembering first-occurrence order so ties
        // resolve deterministically.
        let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
        let mut order = 0usize;
        for word in cleaned.split_whitespace() {
            if STOP_WORDS.contains(&word) {
                continue;
            }
            let entry = counts.entry(word).or_insert_with(|| {
                order += 1;
                (0, order)
            });
            entry.0 += 1;
        }

        let mut ranked: Vec<(&str, usize, usize)> = counts
            .into_iter()
            .map(|(word, (count, first_seen))| (word, count, first_seen))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

        ranked
            .into_iter()
            .take(max_keywords)
            .map(|(word, _, _)| word.to_string())
            .collect()
    }

    fn analyze_sentiment(&self, text: &str) -> f64 {
        if text.is_empty() {
            return 0.0;
        }

        let lowered = text.to_lowercase();
        let mut positive = 0i64;
        let mut negative = 0i64;
        for word in lowered.split_whitespace() {
            if POSITIVE_WORDS.contains(&word) {
                positive += 1;
            } else if NEGATIVE_WORDS.contains(&word) {
                negative += 1;
            }
        }

        let total = positive + negative;
        if total == 0 {
            return 0.0;
        }
        (positive - negative) as f64 / total as f64
    }
}
