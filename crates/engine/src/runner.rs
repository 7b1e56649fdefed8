//! Assistant — the end-to-end message flow.
//!
//! One turn runs: classify intent, assemble the context prompt, recall
//! relevant memories when the intent asks for them, call the language
//! model, then record the exchange in both the durable store and the
//! in-process context store. Memory recall degrades softly (a store
//! error just drops the memories block); a model failure propagates to
//! the caller.

use crate::assembler::ContextAssembler;
use crate::record::{ContextKind, ContextPriority};
use crate::scorer::RelevanceScorer;
use crate::store::ContextStore;
use crate::IntentAssessment;
use quill_core::analyzer::TextAnalyzer;
use quill_core::error::{EngineError, Result};
use quill_core::interaction::{InteractionKind, InteractionSource, NewInteraction};
use quill_core::llm::LlmClient;
use quill_core::store::MemoryStore;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Intent signals above this pull memory recall into the prompt.
const RECALL_GATE: f64 = 0.3;

/// Sentiment magnitude below this is treated as neutral.
const MOOD_GATE: f64 = 0.2;

/// The assembled assistant: store, analyzer, model, and context engine.
pub struct Assistant {
    store: Arc<dyn MemoryStore>,
    llm: Arc<dyn LlmClient>,
    analyzer: Arc<dyn TextAnalyzer>,
    context: Arc<ContextStore>,
    assembler: ContextAssembler,
    scorer: RelevanceScorer,
    name: String,
}

impl Assistant {
    pub fn new(
        store: Arc<dyn MemoryStore>,
        analyzer: Arc<dyn TextAnalyzer>,
        llm: Arc<dyn LlmClient>,
    ) -> Self {
        Self {
            assembler: ContextAssembler::new(Arc::clone(&store)),
            scorer: RelevanceScorer::new(Arc::clone(&store), Arc::clone(&analyzer)),
            context: Arc::new(ContextStore::new()),
            store,
            llm,
            analyzer,
            name: "Quill".to_string(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self.assembler = self.assembler.with_name(self.name.clone());
        self
    }

    pub fn with_scorer_config(mut self, config: crate::ScorerConfig) -> Self {
        self.scorer = RelevanceScorer::with_config(
            Arc::clone(&self.store),
            Arc::clone(&self.analyzer),
            config,
        );
        self
    }

    pub fn with_context_capacity(mut self, max_history: usize) -> Self {
        self.context = Arc::new(ContextStore::with_max_history(max_history));
        self
    }

    /// The in-process context store, shared for inspection.
    pub fn context_store(&self) -> Arc<ContextStore> {
        Arc::clone(&self.context)
    }

    /// Process one user message and return the model's reply.
    pub async fn handle_message(
        &self,
        message: &str,
        source: InteractionSource,
    ) -> Result<String> {
        if message.trim().is_empty() {
            return Err(EngineError::EmptyPrompt.into());
        }

        let assembled = self.assembler.generate_context(message).await;
        let intent = assembled.intent.clone();
        let kind = classify_kind(&intent);
        debug!(
            kind = kind.as_str(),
            module = intent.module.map(|m| m.as_str()).unwrap_or("none"),
            confidence = intent.confidence,
            "Classified message intent"
        );

        let mut prompt = assembled.text;

        // Recall memories only when the intent justifies the tokens. A
        // store failure here costs the memories block, not the turn.
        if intent.task > RECALL_GATE || intent.knowledge > RECALL_GATE {
            match self.scorer.get_relevant_memories(message, kind).await {
                Ok(bundle) if !bundle.interactions.is_empty() => {
                    prompt.push_str("\n\nRelevant memories:");
                    for interaction in &bundle.interactions {
                        prompt.push_str(&format!("\n- {}", interaction.content));
                    }
                }
                Ok(_) => {}
                Err(err) => warn!(%err, "Memory recall failed, continuing without memories"),
            }
        }

        prompt.push_str(&format!("\n\nUser: {message}\n{}:", self.name));

        let reply = self.llm.complete(&prompt).await?;
        info!(model = %reply.model, "Completed model turn");

        let mood = mood_label(self.analyzer.analyze_sentiment(message));
        let importance = if intent.module.is_some() { 2 } else { 1 };
        let mut interaction = NewInteraction::new(message, kind)
            .with_source(source)
            .with_importance(importance);
        if let Some(mood) = &mood {
            interaction = interaction.with_mood(mood.clone());
        }
        self.store.store_interaction(interaction).await?;

        let mut data = Map::new();
        data.insert("message".into(), Value::String(message.to_string()));
        data.insert("response".into(), Value::String(reply.text.clone()));
        data.insert("kind".into(), Value::String(kind.as_str().to_string()));
        if let Some(mood) = mood {
            data.insert("mood".into(), Value::String(mood));
        }
        self.context
            .update_context(
                ContextKind::Conversation,
                data,
                None,
                ContextPriority::Medium.value(),
            )
            .await;

        Ok(reply.text)
    }
}

/// Map intent signals onto an interaction kind for storage and scoring.
fn classify_kind(intent: &IntentAssessment) -> InteractionKind {
    if intent.module.is_some() || intent.task > 0.5 {
        InteractionKind::TaskOriented
    } else if intent.emotional > intent.knowledge && intent.emotional > RECALL_GATE {
        InteractionKind::Emotional
    } else if intent.knowledge > RECALL_GATE {
        InteractionKind::Learning
    } else {
        InteractionKind::Casual
    }
}

fn mood_label(sentiment: f64) -> Option<String> {
    if sentiment > MOOD_GATE {
        Some("positive".to_string())
    } else if sentiment < -MOOD_GATE {
        Some("negative".to_string())
    } else {
        None
    }
}
