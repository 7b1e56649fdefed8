//! TextAnalyzer trait — keyword extraction and sentiment scoring.
//!
//! Pure compute, no I/O. Consumed by the relevance scorer (keyword
//! overlap) and available to callers that tag interactions with a mood.

/// Text analysis operations the engine depends on.
pub trait TextAnalyzer: Send + Sync {
    /// Extract up to `max_keywords` important keywords, most frequent first.
    fn extract_keywords(&self, text: &str, max_keywords: usize) -> Vec<String>;

    /// Sentiment in `[-1.0, 1.0]`; 0.0 for neutral or empty text.
    fn analyze_sentiment(&self, text: &str) -> f64;
}

/// Default keyword budget used when callers don't specify one.
pub const DEFAULT_MAX_KEYWORDS: usize = 5;
