//! RelevanceScorer — ranks recent interactions against a new query.
//!
//! Four independent signals, fixed weights, no learned model: keyword
//! overlap with the query, recency decay, stored importance, and a
//! bonus when the interaction's kind matches the query's kind. Items
//! below the relevance threshold are dropped and the survivors are
//! capped, so a noisy history degrades to "fewer memories", never to
//! an oversized prompt.

use chrono::{DateTime, Utc};
use quill_core::analyzer::{TextAnalyzer, DEFAULT_MAX_KEYWORDS};
use quill_core::error::MemoryError;
use quill_core::interaction::{InteractionKind, InteractionRecord};
use quill_core::profile::{Goal, PersonalityProfile};
use quill_core::store::MemoryStore;
use std::sync::Arc;
use tracing::debug;

/// Weights and limits for relevance scoring.
#[derive(Debug, Clone)]
pub struct ScorerConfig {
    pub keyword_weight: f64,
    pub recency_weight: f64,
    pub importance_weight: f64,
    pub context_weight: f64,
    /// Bonus fed through `context_weight` when the interaction kind
    /// matches the query kind.
    pub context_match_bonus: f64,
    /// Minimum score an interaction needs to be returned.
    pub relevance_threshold: f64,
    /// Hard cap on returned interactions.
    pub max_memories: usize,
    /// Recency window handed to the store, in hours.
    pub window_hours: i64,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            keyword_weight: 0.2,
            recency_weight: 0.3,
            importance_weight: 0.2,
            context_weight: 0.3,
            context_match_bonus: 0.3,
            relevance_threshold: 0.3,
            max_memories: 10,
            window_hours: 24,
        }
    }
}

/// An interaction paired with its relevance score. Never persisted.
#[derive(Debug, Clone)]
pub struct ScoredMemory {
    pub interaction: InteractionRecord,
    pub score: f64,
}

/// The context bundle handed to prompt assembly: ranked memories plus
/// the personality profile and active goals, stamped with the time the
/// bundle was built.
#[derive(Debug, Clone)]
pub struct MemoryBundle {
    pub interactions: Vec<InteractionRecord>,
    pub personality: PersonalityProfile,
    pub goals: Vec<Goal>,
    pub timestamp: DateTime<Utc>,
}

/// Scores and filters recent interactions for prompt inclusion.
pub struct RelevanceScorer {
    store: Arc<dyn MemoryStore>,
    analyzer: Arc<dyn TextAnalyzer>,
    config: ScorerConfig,
}

impl RelevanceScorer {
    pub fn new(store: Arc<dyn MemoryStore>, analyzer: Arc<dyn TextAnalyzer>) -> Self {
        Self::with_config(store, analyzer, ScorerConfig::default())
    }

    pub fn with_config(
        store: Arc<dyn MemoryStore>,
        analyzer: Arc<dyn TextAnalyzer>,
        config: ScorerConfig,
    ) -> Self {
        Self {
            store,
            analyzer,
            config,
        }
    }

    /// Score one interaction against the query's keywords and kind at a
    /// given instant. Pure given its inputs, so tests can pin `now`.
    ///
    /// `score = kw_w * overlap_count + rec_w / (1 + age_hours)
    ///        + imp_w * importance + ctx_w * bonus_if_kind_matches`
    pub fn score_interaction(
        &self,
        interaction: &InteractionRecord,
        query_keywords: &[String],
        query_kind: InteractionKind,
        now: DateTime<Utc>,
    ) -> f64 {
        let candidate_keywords = self
            .analyzer
            .extract_keywords(&interaction.content, DEFAULT_MAX_KEYWORDS);
        let overlap = query_keywords
            .iter()
            .filter(|k| candidate_keywords.contains(k))
            .count() as f64;

        let age_hours =
            ((now - interaction.timestamp).num_seconds() as f64 / 3600.0).max(0.0);
        let recency = 1.0 / (1.0 + age_hours);

        let context_bonus = if interaction.kind == query_kind {
            self.config.context_match_bonus
        } else {
            0.0
        };

        self.config.keyword_weight * overlap
            + self.config.recency_weight * recency
            + self.config.importance_weight * f64::from(interaction.importance)
            + self.config.context_weight * context_bonus
    }

    /// Rank interactions from the recency window against `query`, keep
    /// those at or above the threshold, cap the survivors, and return
    /// them bundled with the personality profile and active goals.
    ///
    /// An `Err` means the store was unavailable. An empty `interactions`
    /// field in an `Ok` bundle means nothing relevant was found.
    pub async fn get_relevant_memories(
        &self,
        query: &str,
        query_kind: InteractionKind,
    ) -> Result<MemoryBundle, MemoryError> {
        let keywords = self.analyzer.extract_keywords(query, DEFAULT_MAX_KEYWORDS);
        let candidates = self
            .store
            .get_recent_interactions(self.config.window_hours)
            .await?;
        let now = Utc::now();

        let mut scored: Vec<ScoredMemory> = candidates
            .into_iter()
            .map(|interaction| {
                let score = self.score_interaction(&interaction, &keywords, query_kind, now);
                ScoredMemory { interaction, score }
            })
            .filter(|m| m.score >= self.config.relevance_threshold)
            .collect();

        // Stable sort: ties keep the store's return order.
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(self.config.max_memories);

        debug!(
            query_keywords = keywords.len(),
            retained = scored.len(),
            "Scored recent interactions"
        );

        let personality = self.store.get_personality_profile().await?;
        let goals = self.store.get_active_goals().await?;

        Ok(MemoryBundle {
            interactions: scored.into_iter().map(|m| m.interaction).collect(),
            personality,
            goals,
            timestamp: now,
        })
    }
}
