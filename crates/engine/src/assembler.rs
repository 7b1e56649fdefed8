//! ContextAssembler — renders context slices into one ordered prompt.
//!
//! Block order is fixed and auditable: module context (when a module is
//! implicated, always first), personality baseline, temporal context,
//! then the intent-gated blocks (emotional, goals, knowledge,
//! preferences), and a fixed trailing instruction. Every store-backed
//! block is isolated: a failure skips that block with a warning instead
//! of aborting assembly.

use crate::intent::{IntentAssessment, ModuleRegistry};
use crate::record::ModuleActivityRecord;
use chrono::{DateTime, Datelike, Local, Timelike};
use quill_core::error::MemoryError;
use quill_core::module::ModuleId;
use quill_core::profile::Goal;
use quill_core::store::MemoryStore;
use std::sync::Arc;
use tracing::warn;

/// Intent signals must clear this to pull their context block in.
const INTENT_GATE: f64 = 0.3;

/// A module that has failed this many times is reset instead of surfaced.
const CHRONIC_FAILURE_THRESHOLD: u32 = 5;

const TRAILING_INSTRUCTION: &str = "Please use this context to provide a personalized, \
relevant response while maintaining consistency with previous interactions and \
personality traits.";

/// The rendered prompt context plus the intent that shaped it.
#[derive(Debug, Clone)]
pub struct AssembledPrompt {
    pub text: String,
    pub intent: IntentAssessment,
}

/// Builds the context prompt for a query from intent, the memory store,
/// and the wall clock.
pub struct ContextAssembler {
    store: Arc<dyn MemoryStore>,
    registry: ModuleRegistry,
    assistant_name: String,
}

impl ContextAssembler {
    pub fn new(store: Arc<dyn MemoryStore>) -> Self {
        Self {
            store,
            registry: ModuleRegistry::new(),
            assistant_name: "Quill".to_string(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.assistant_name = name.into();
        self
    }

    /// Classify a query without assembling anything.
    pub fn analyze_query_intent(&self, query: &str) -> IntentAssessment {
        self.registry.analyze(query)
    }

    /// Persisted module state, rebuilt into an activity record.
    ///
    /// A chronically failing module (five or more recorded failures) is
    /// reset in the store and reported as absent, so a broken integration
    /// degrades to "no module context" instead of poisoning every prompt.
    pub async fn get_module_state(
        &self,
        module: ModuleId,
    ) -> Result<Option<ModuleActivityRecord>, MemoryError> {
        let Some(snapshot) = self.store.get_module_state(module).await? else {
            return Ok(None);
        };
        let record = ModuleActivityRecord::from_snapshot(module, snapshot);

        if record.error_count >= CHRONIC_FAILURE_THRESHOLD {
            warn!(
                module = %module,
                error_count = record.error_count,
                "Resetting module state due to high error count"
            );
            self.store.reset_module_state(module).await?;
            return Ok(None);
        }
        Ok(Some(record))
    }

    /// Assemble the full context prompt for a query.
    pub async fn generate_context(&self, query: &str) -> AssembledPrompt {
        let intent = self.registry.analyze(query);
        let mut parts: Vec<String> = Vec::new();

        // Module context always leads when a module is implicated.
        if let Some(module) = intent.module {
            match self.get_module_state(module).await {
                Ok(Some(state)) => {
                    parts.push(render_module_block(&intent, &state));
                }
                Ok(None) => {}
                Err(err) => warn!(module = %module, %err, "Skipping module context block"),
            }
        }

        match self.store.get_personality_profile().await {
            Ok(profile) => {
                let traits =
                    serde_json::to_string_pretty(&profile.traits).unwrap_or_else(|_| "{}".into());
                parts.push(format!(
                    "You are {}, a personal AI assistant with the following personality traits:\n{}",
                    self.assistant_name, traits
                ));
            }
            Err(err) => warn!(%err, "Skipping personality block"),
        }

        parts.push(temporal_block(Local::now()));

        if intent.emotional > INTENT_GATE {
            match self.emotional_block().await {
                Ok(block) => parts.push(block),
                Err(err) => warn!(%err, "Skipping emotional context block"),
            }
        }

        if intent.task > INTENT_GATE {
            match self.relevant_goals(query).await {
                Ok(goals) if !goals.is_empty() => {
                    let mut block = String::from("Relevant goals:");
                    for goal in goals {
                        block.push_str(&format!("\n- {}: {}", goal.title, goal.description));
                    }
                    parts.push(block);
                }
                Ok(_) => {}
                Err(err) => warn!(%err, "Skipping goal block"),
            }
        }

        if intent.knowledge > INTENT_GATE {
            let words: Vec<String> = query
                .to_lowercase()
                .split_whitespace()
                .map(str::to_string)
                .collect();
            match self.store.search_knowledge(&words).await {
                Ok(entries) if !entries.is_empty() => {
                    let mut block = String::from("Relevant knowledge:");
                    for entry in entries {
                        block.push_str(&format!("\n- {}: {}", entry.topic, entry.content));
                    }
                    parts.push(block);
                }
                Ok(_) => {}
                Err(err) => warn!(%err, "Skipping knowledge block"),
            }
        }

        if intent.preference > INTENT_GATE {
            match self.preference_block(query).await {
                Ok(Some(block)) => parts.push(block),
                Ok(None) => {}
                Err(err) => warn!(%err, "Skipping preference block"),
            }
        }

        let mut text = parts.join("\n\n");
        text.push_str("\n\n");
        text.push_str(TRAILING_INSTRUCTION);

        AssembledPrompt { text, intent }
    }

    /// Goals scored against the query: title overlap 0.5, description
    /// overlap 0.3, deadline within a week 0.2. Top three by score.
    async fn relevant_goals(&self, query: &str) -> Result<Vec<Goal>, MemoryError> {
        let query = query.to_lowercase();
        let now = chrono::Utc::now();

        let mut scored: Vec<(Goal, f64)> = Vec::new();
        for goal in self.store.get_active_goals().await? {
            let mut score = 0.0;
            if goal
                .title
                .to_lowercase()
                .split_whitespace()
                .any(|w| query.contains(w))
            {
                score += 0.5;
            }
            if goal
                .description
                .to_lowercase()
                .split_whitespace()
                .any(|w| query.contains(w))
            {
                score += 0.3;
            }
            if let Some(deadline) = goal.deadline {
                if (deadline - now).num_days() <= 7 {
                    score += 0.2;
                }
            }
            if score > 0.0 {
                scored.push((goal, score));
            }
        }

        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(3);
        Ok(scored.into_iter().map(|(goal, _)| goal).collect())
    }

    /// Dominant mood and mood counts over the last day of interactions.
    async fn emotional_block(&self) -> Result<String, MemoryError> {
        let recent = self.store.get_recent_interactions(24).await?;

        let mut counts: Vec<(String, u32)> = Vec::new();
        for interaction in &recent {
            let Some(mood) = &interaction.mood else {
                continue;
            };
            match counts.iter_mut().find(|(m, _)| m == mood) {
                Some((_, n)) => *n += 1,
                None => counts.push((mood.clone(), 1)),
            }
        }

        let dominant = counts
            .iter()
            .max_by_key(|(_, n)| *n)
            .map(|(m, _)| m.clone())
            .unwrap_or_else(|| "unknown".to_string());

        let mut pattern = serde_json::Map::new();
        for (mood, n) in &counts {
            pattern.insert(mood.clone(), serde_json::Value::from(*n));
        }
        let rendered = serde_json::to_string_pretty(&pattern).unwrap_or_else(|_| "{}".into());

        Ok(format!(
            "Current emotional context:\nDominant mood: {dominant}\nRecent mood patterns: {rendered}"
        ))
    }

    /// Preferences in categories whose names appear in the query.
    async fn preference_block(&self, query: &str) -> Result<Option<String>, MemoryError> {
        let query = query.to_lowercase();
        let mut block = String::from("Relevant preferences:");
        let mut any = false;

        for category in self.store.preference_categories().await? {
            let matches = category
                .to_lowercase()
                .split_whitespace()
                .any(|w| query.contains(w));
            if !matches {
                continue;
            }
            let prefs = self.store.get_preferences_by_category(&category).await?;
            if prefs.is_empty() {
                continue;
            }
            any = true;
            block.push_str(&format!("\n- {category}:"));
            for pref in prefs {
                block.push_str(&format!("\n  - {}: {}", pref.item, pref.rating));
            }
        }

        Ok(any.then_some(block))
    }
}

fn render_module_block(intent: &IntentAssessment, state: &ModuleActivityRecord) -> String {
    format!(
        "Module Context:\nModule: {}\nState: {}\nCommand: {}\nLast Command: {}\nError Count: {}",
        state.module,
        if state.is_active { "ready" } else { "inactive" },
        intent.command.map(|c| c.as_str()).unwrap_or("None"),
        state.last_command.as_deref().unwrap_or("None"),
        state.error_count,
    )
}

/// Render the always-present temporal block for a given instant.
fn temporal_block(now: DateTime<Local>) -> String {
    let time_of_day = match now.hour() {
        5..=11 => "morning",
        12..=16 => "afternoon",
        17..=21 => "evening",
        _ => "night",
    };
    let day = now.format("%A");
    let weekend = matches!(now.weekday(), chrono::Weekday::Sat | chrono::Weekday::Sun);

    format!(
        "Current temporal context:\nTime of day: {time_of_day}\nDay: {day}\n{}",
        if weekend { "Weekend" } else { "Weekday" }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use quill_core::interaction::{InteractionKind, NewInteraction};
    use quill_core::module::ModuleStateSnapshot;
    use quill_core::profile::{KnowledgeEntry, Preference};
    use quill_memory::InMemoryStore;

    fn assembler(store: Arc<InMemoryStore>) -> ContextAssembler {
        ContextAssembler::new(store)
    }

    fn local(hour: u32) -> DateTime<Local> {
        // A Wednesday.
        Local.with_ymd_and_hms(2024, 3, 6, hour, 30, 0).unwrap()
    }

    #[test]
    fn temporal_buckets() {
        assert!(temporal_block(local(6)).contains("Time of day: morning"));
        assert!(temporal_block(local(13)).contains("Time of day: afternoon"));
        assert!(temporal_block(local(19)).contains("Time of day: evening"));
        assert!(temporal_block(local(2)).contains("Time of day: night"));
        assert!(temporal_block(local(13)).ends_with("Weekday"));

        let saturday = Local.with_ymd_and_hms(2024, 3, 9, 10, 0, 0).unwrap();
        assert!(temporal_block(saturday).ends_with("Weekend"));
    }

    #[tokio::test]
    async fn baseline_prompt_has_fixed_scaffolding() {
        let store = Arc::new(InMemoryStore::new());
        let prompt = assembler(store).generate_context("good morning").await;

        assert!(prompt.text.starts_with("You are Quill"));
        assert!(prompt.text.contains("Current temporal context:"));
        assert!(prompt.text.ends_with(TRAILING_INSTRUCTION));
        assert!(!prompt.text.contains("Module Context:"));
        assert!(!prompt.text.contains("Relevant goals:"));
    }

    #[tokio::test]
    async fn module_block_is_always_first() {
        let store = Arc::new(InMemoryStore::new());
        store
            .update_module_state(
                ModuleId::Calendar,
                ModuleStateSnapshot {
                    is_active: true,
                    last_command: Some("check".into()),
                    error_count: 1,
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let prompt = assembler(Arc::clone(&store))
            .generate_context("schedule a meeting with Ana")
            .await;

        assert!(prompt.text.starts_with("Module Context:\nModule: calendar"));
        assert!(prompt.text.contains("State: ready"));
        assert!(prompt.text.contains("Command: add"));
        assert!(prompt.text.contains("Last Command: check"));
        assert!(prompt.text.contains("Error Count: 1"));
    }

    #[tokio::test]
    async fn chronically_failing_module_is_reset() {
        let store = Arc::new(InMemoryStore::new());
        store
            .update_module_state(
                ModuleId::Discord,
                ModuleStateSnapshot {
                    is_active: true,
                    error_count: 5,
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let asm = assembler(Arc::clone(&store));
        let state = asm.get_module_state(ModuleId::Discord).await.unwrap();
        assert!(state.is_none());
        // Persisted state cleared too.
        assert!(store
            .get_module_state(ModuleId::Discord)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn module_state_below_threshold_survives() {
        let store = Arc::new(InMemoryStore::new());
        store
            .update_module_state(
                ModuleId::Discord,
                ModuleStateSnapshot {
                    is_active: true,
                    error_count: 4,
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let asm = assembler(Arc::clone(&store));
        let state = asm.get_module_state(ModuleId::Discord).await.unwrap();
        assert_eq!(state.unwrap().error_count, 4);
    }

    #[tokio::test]
    async fn goal_block_gated_by_task_intent() {
        let store = Arc::new(InMemoryStore::new());
        store
            .set_goal(Goal {
                title: "project launch".into(),
                description: "ship the beta".into(),
                deadline: None,
                priority: 3,
            })
            .await;

        let asm = assembler(Arc::clone(&store));

        // "need to" is a task cue, "project" overlaps the goal title.
        let gated = asm.generate_context("i need to push the project forward").await;
        assert!(gated.text.contains("Relevant goals:"));
        assert!(gated.text.contains("- project launch: ship the beta"));

        let ungated = asm.generate_context("hello there").await;
        assert!(!ungated.text.contains("Relevant goals:"));
    }

    #[tokio::test]
    async fn top_three_goals_by_relevance() {
        let store = Arc::new(InMemoryStore::new());
        for i in 0..5 {
            store
                .set_goal(Goal {
                    title: format!("task number {i}"),
                    description: "routine".into(),
                    deadline: None,
                    priority: 1,
                })
                .await;
        }
        // Deadline inside a week outranks the title-only matches.
        store
            .set_goal(Goal {
                title: "task urgent".into(),
                description: "due soon".into(),
                deadline: Some(chrono::Utc::now() + chrono::Duration::days(2)),
                priority: 1,
            })
            .await;

        let asm = assembler(Arc::clone(&store));
        let goals = asm.relevant_goals("which task should i do").await.unwrap();
        assert_eq!(goals.len(), 3);
        assert_eq!(goals[0].title, "task urgent");
    }

    #[tokio::test]
    async fn knowledge_block_from_query_words() {
        let store = Arc::new(InMemoryStore::new());
        store
            .store_knowledge(KnowledgeEntry {
                topic: "espresso brewing".into(),
                content: "18g in, 36g out".into(),
                importance: 2,
            })
            .await;

        let prompt = assembler(Arc::clone(&store))
            .generate_context("tell me about espresso")
            .await;
        assert!(prompt.text.contains("Relevant knowledge:"));
        assert!(prompt.text.contains("- espresso brewing: 18g in, 36g out"));
    }

    #[tokio::test]
    async fn preference_block_matches_category() {
        let store = Arc::new(InMemoryStore::new());
        store
            .store_preference(Preference {
                category: "music".into(),
                item: "jazz".into(),
                rating: 0.9,
            })
            .await;

        let prompt = assembler(Arc::clone(&store))
            .generate_context("what music do i prefer")
            .await;
        assert!(prompt.text.contains("Relevant preferences:"));
        assert!(prompt.text.contains("- music:"));
        assert!(prompt.text.contains("  - jazz: 0.9"));
    }

    #[tokio::test]
    async fn emotional_block_reports_dominant_mood() {
        let store = Arc::new(InMemoryStore::new());
        for mood in ["calm", "calm", "tense"] {
            store
                .store_interaction(
                    NewInteraction::new("entry", InteractionKind::Emotional).with_mood(mood),
                )
                .await
                .unwrap();
        }

        let prompt = assembler(Arc::clone(&store))
            .generate_context("i am feeling a bit off")
            .await;
        assert!(prompt.text.contains("Dominant mood: calm"));
        assert!(prompt.text.contains("\"tense\": 1"));
    }
}
