//! In-memory store — useful for testing and ephemeral sessions.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use quill_core::error::MemoryError;
use quill_core::interaction::{InteractionRecord, NewInteraction};
use quill_core::module::{ModuleId, ModuleStateSnapshot};
use quill_core::profile::{Goal, KnowledgeEntry, PersonalityProfile, Preference};
use quill_core::store::MemoryStore;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// An in-memory store backing all assistant collections with Vecs and maps.
/// Useful for testing and sessions where persistence isn't needed.
pub struct InMemoryStore {
    interactions: Arc<RwLock<Vec<InteractionRecord>>>,
    goals: Arc<RwLock<Vec<Goal>>>,
    preferences: Arc<RwLock<Vec<Preference>>>,
    knowledge: Arc<RwLock<Vec<KnowledgeEntry>>>,
    personality: Arc<RwLock<PersonalityProfile>>,
    module_states: Arc<RwLock<HashMap<ModuleId, ModuleStateSnapshot>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            interactions: Arc::new(RwLock::new(Vec::new())),
            goals: Arc::new(RwLock::new(Vec::new())),
            preferences: Arc::new(RwLock::new(Vec::new())),
            knowledge: Arc::new(RwLock::new(Vec::new())),
            personality: Arc::new(RwLock::new(PersonalityProfile::baseline())),
            module_states: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    // ── Seeding helpers (not part of the MemoryStore interface) ──

    /// Upsert a goal by title.
    pub async fn set_goal(&self, goal: Goal) {
        let mut goals = self.goals.write().await;
        if let Some(existing) = goals.iter_mut().find(|g| g.title == goal.title) {
            *existing = goal;
        } else {
            goals.push(goal);
        }
    }

    /// Upsert a preference by (category, item).
    pub async fn store_preference(&self, preference: Preference) {
        let mut prefs = self.preferences.write().await;
        if let Some(existing) = prefs
            .iter_mut()
            .find(|p| p.category == preference.category && p.item == preference.item)
        {
            *existing = preference;
        } else {
            prefs.push(preference);
        }
    }

    /// Append a knowledge entry.
    pub async fn store_knowledge(&self, entry: KnowledgeEntry) {
        self.knowledge.write().await.push(entry);
    }

    /// Set one personality trait value.
    pub async fn set_personality_trait(&self, trait_name: &str, value: f64) {
        self.personality
            .write()
            .await
            .traits
            .insert(trait_name.to_string(), value);
    }

    /// Insert a pre-built interaction record (tests need exact timestamps).
    pub async fn insert_interaction(&self, record: InteractionRecord) {
        self.interactions.write().await.push(record);
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MemoryStore for InMemoryStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn get_recent_interactions(
        &self,
        hours: i64,
    ) -> Result<Vec<InteractionRecord>, MemoryError> {
        let cutoff = Utc::now() - Duration::hours(hours);
        let interactions = self.interactions.read().await;

        let mut recent: Vec<InteractionRecord> = interactions
            .iter()
            .filter(|i| i.timestamp >= cutoff)
            .cloned()
            .collect();
        recent.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        Ok(recent)
    }

    async fn get_active_goals(&self) -> Result<Vec<Goal>, MemoryError> {
        let mut goals = self.goals.read().await.clone();
        goals.sort_by(|a, b| b.priority.cmp(&a.priority));
        Ok(goals)
    }

    async fn get_personality_profile(&self) -> Result<PersonalityProfile, MemoryError> {
        Ok(self.personality.read().await.clone())
    }

    async fn preference_categories(&self) -> Result<Vec<String>, MemoryError> {
        let prefs = self.preferences.read().await;
        let mut categories: Vec<String> = Vec::new();
        for pref in prefs.iter() {
            if !categories.contains(&pref.category) {
                categories.push(pref.category.clone());
            }
        }
        Ok(categories)
    }

    async fn get_preferences_by_category(
        &self,
        category: &str,
    ) -> Result<Vec<Preference>, MemoryError> {
        let prefs = self.preferences.read().await;
        Ok(prefs.iter().filter(|p| p.category == category).cloned().collect())
    }

    async fn search_knowledge(&self, words: &[String]) -> Result<Vec<KnowledgeEntry>, MemoryError> {
        let knowledge = self.knowledge.read().await;
        Ok(knowledge
            .iter()
            .filter(|k| {
                let topic = k.topic.to_lowercase();
                words.iter().any(|w| topic.contains(&w.to_lowercase()))
            })
            .cloned()
            .collect())
    }

    async fn get_module_state(
        &self,
        module: ModuleId,
    ) -> Result<Option<ModuleStateSnapshot>, MemoryError> {
        Ok(self.module_states.read().await.get(&module).cloned())
    }

    async fn update_module_state(
        &self,
        module: ModuleId,
        state: ModuleStateSnapshot,
    ) -> Result<bool, MemoryError> {
        self.module_states.write().await.insert(module, state);
        Ok(true)
    }

    async fn reset_module_state(&self, module: ModuleId) -> Result<bool, MemoryError> {
        Ok(self.module_states.write().await.remove(&module).is_some())
    }

    async fn store_interaction(&self, interaction: NewInteraction) -> Result<String, MemoryError> {
        let record = interaction.into_record();
        let id = record.id.clone();
        self.interactions.write().await.push(record);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::interaction::InteractionKind;

    #[tokio::test]
    async fn store_and_recall_interactions() {
        let store = InMemoryStore::new();
        let id = store
            .store_interaction(NewInteraction::new("hello", InteractionKind::Casual))
            .await
            .unwrap();
        assert!(!id.is_empty());

        let recent = store.get_recent_interactions(24).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].content, "hello");
    }

    #[tokio::test]
    async fn recent_interactions_respect_window_and_order() {
        let store = InMemoryStore::new();
        let mut old = NewInteraction::new("ancient", InteractionKind::Casual).into_record();
        old.timestamp = Utc::now() - Duration::hours(30);
        store.insert_interaction(old).await;

        let mut older = NewInteraction::new("earlier", InteractionKind::Casual).into_record();
        older.timestamp = Utc::now() - Duration::hours(5);
        store.insert_interaction(older).await;

        store
            .store_interaction(NewInteraction::new("just now", InteractionKind::Casual))
            .await
            .unwrap();

        let recent = store.get_recent_interactions(24).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].content, "just now");
        assert_eq!(recent[1].content, "earlier");
    }

    #[tokio::test]
    async fn goals_sorted_by_priority() {
        let store = InMemoryStore::new();
        store
            .set_goal(Goal {
                title: "minor".into(),
                description: "low".into(),
                deadline: None,
                priority: 1,
            })
            .await;
        store
            .set_goal(Goal {
                title: "major".into(),
                description: "high".into(),
                deadline: None,
                priority: 5,
            })
            .await;

        let goals = store.get_active_goals().await.unwrap();
        assert_eq!(goals[0].title, "major");
    }

    #[tokio::test]
    async fn preferences_by_category() {
        let store = InMemoryStore::new();
        store
            .store_preference(Preference {
                category: "music".into(),
                item: "jazz".into(),
                rating: 0.9,
            })
            .await;
        store
            .store_preference(Preference {
                category: "food".into(),
                item: "ramen".into(),
                rating: 0.8,
            })
            .await;

        let categories = store.preference_categories().await.unwrap();
        assert_eq!(categories, vec!["music".to_string(), "food".to_string()]);

        let music = store.get_preferences_by_category("music").await.unwrap();
        assert_eq!(music.len(), 1);
        assert_eq!(music[0].item, "jazz");
    }

    #[tokio::test]
    async fn knowledge_topic_search() {
        let store = InMemoryStore::new();
        store
            .store_knowledge(KnowledgeEntry {
                topic: "rust programming".into(),
                content: "borrow checker".into(),
                importance: 3,
            })
            .await;
        store
            .store_knowledge(KnowledgeEntry {
                topic: "cooking".into(),
                content: "salt early".into(),
                importance: 1,
            })
            .await;

        let hits = store
            .search_knowledge(&["rust".to_string()])
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].content, "borrow checker");
    }

    #[tokio::test]
    async fn module_state_upsert_and_reset() {
        let store = InMemoryStore::new();
        assert!(store
            .get_module_state(ModuleId::Calendar)
            .await
            .unwrap()
            .is_none());

        store
            .update_module_state(
                ModuleId::Calendar,
                ModuleStateSnapshot {
                    is_active: true,
                    error_count: 2,
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let state = store
            .get_module_state(ModuleId::Calendar)
            .await
            .unwrap()
            .unwrap();
        assert!(state.is_active);
        assert_eq!(state.error_count, 2);

        assert!(store.reset_module_state(ModuleId::Calendar).await.unwrap());
        assert!(!store.reset_module_state(ModuleId::Calendar).await.unwrap());
    }
}
