//! MemoryStore trait — the narrow interface onto the durable document store.
//!
//! The context engine consumes these queries and nothing else; the store
//! itself (its schema, indexes, connection handling) lives behind this
//! boundary. Implementations: in-memory (testing / ephemeral sessions),
//! and whatever durable backend the deployment wires in.

use crate::error::MemoryError;
use crate::interaction::{InteractionRecord, NewInteraction};
use crate::module::{ModuleId, ModuleStateSnapshot};
use crate::profile::{Goal, KnowledgeEntry, PersonalityProfile, Preference};
use async_trait::async_trait;

/// The store interface the context engine depends on.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// The backend name (e.g., "in_memory").
    fn name(&self) -> &str;

    /// Interactions newer than `hours` ago, newest first.
    async fn get_recent_interactions(
        &self,
        hours: i64,
    ) -> Result<Vec<InteractionRecord>, MemoryError>;

    /// All active goals, highest priority first.
    async fn get_active_goals(&self) -> Result<Vec<Goal>, MemoryError>;

    /// The personality baseline.
    async fn get_personality_profile(&self) -> Result<PersonalityProfile, MemoryError>;

    /// Every distinct preference category.
    async fn preference_categories(&self) -> Result<Vec<String>, MemoryError>;

    /// All preferences within a category.
    async fn get_preferences_by_category(
        &self,
        category: &str,
    ) -> Result<Vec<Preference>, MemoryError>;

    /// Knowledge entries whose topic contains any of the given words.
    async fn search_knowledge(&self, words: &[String]) -> Result<Vec<KnowledgeEntry>, MemoryError>;

    /// Persisted health state for a module, if any.
    async fn get_module_state(
        &self,
        module: ModuleId,
    ) -> Result<Option<ModuleStateSnapshot>, MemoryError>;

    /// Upsert a module's health state. Returns `true` on success.
    async fn update_module_state(
        &self,
        module: ModuleId,
        state: ModuleStateSnapshot,
    ) -> Result<bool, MemoryError>;

    /// Drop a module's persisted state. Returns `true` if a record existed.
    async fn reset_module_state(&self, module: ModuleId) -> Result<bool, MemoryError>;

    /// Store a new interaction, returning its id.
    async fn store_interaction(&self, interaction: NewInteraction) -> Result<String, MemoryError>;
}
