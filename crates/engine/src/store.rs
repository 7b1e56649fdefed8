//! ContextStore — the single source of truth for "what is happening right now".
//!
//! Holds at most one current record per [`ContextKind`], a FIFO-bounded
//! history of every update, and a per-module activity table. All state
//! sits behind one `tokio::sync::RwLock`, so read-modify-write sequences
//! (updates, trimming, module error counting) are atomic with respect to
//! concurrent callers, and reads take a snapshot under the lock instead
//! of holding it through formatting.
//!
//! Memory use stays constant regardless of uptime: `current` is capped by
//! the number of kinds, and `history` is trimmed to `max_history` on
//! every insert (oldest dropped first).

use crate::record::{ContextKind, ContextPriority, ContextRecord, ModuleActivityRecord};
use quill_core::module::ModuleId;
use serde_json::{Map, Value};
use std::collections::{HashMap, VecDeque};
use tokio::sync::RwLock;
use tracing::debug;

/// Default history capacity.
pub const DEFAULT_MAX_HISTORY: usize = 100;

/// How many trailing history entries next-context prediction inspects.
const PREDICTION_WINDOW: usize = 10;

struct Inner {
    current: HashMap<ContextKind, ContextRecord>,
    history: VecDeque<ContextRecord>,
    modules: HashMap<ModuleId, ModuleActivityRecord>,
}

/// Typed context state with bounded history and module activity tracking.
pub struct ContextStore {
    inner: RwLock<Inner>,
    max_history: usize,
}

/// Snapshot of the conversational situation around a new message.
#[derive(Debug, Clone)]
pub struct MessageSituation {
    /// Recent conversation-kind records, oldest to newest.
    pub recent_messages: Vec<ContextRecord>,
    /// Modules currently marked active.
    pub active_modules: Vec<ModuleId>,
    /// The predicted next context kind after a conversation turn.
    pub predicted_next: ContextKind,
}

impl ContextStore {
    pub fn new() -> Self {
        Self::with_max_history(DEFAULT_MAX_HISTORY)
    }

    pub fn with_max_history(max_history: usize) -> Self {
        Self {
            inner: RwLock::new(Inner {
                current: HashMap::new(),
                history: VecDeque::new(),
                modules: HashMap::new(),
            }),
            max_history,
        }
    }

    /// Record a new context snapshot for `kind`.
    ///
    /// Overwrites the current record for that kind, appends to history,
    /// and trims history to the capacity (oldest dropped first).
    pub async fn update_context(
        &self,
        kind: ContextKind,
        data: Map<String, Value>,
        metadata: Option<Map<String, Value>>,
        priority: i32,
    ) {
        let mut record = ContextRecord::new(kind, data).with_priority(priority);
        record.metadata = metadata;

        let mut inner = self.inner.write().await;
        inner.current.insert(kind, record.clone());
        inner.history.push_back(record);
        while inner.history.len() > self.max_history {
            inner.history.pop_front();
        }
        debug!(kind = kind.as_str(), "Updated context");
    }

    /// The current record for `kind`, if one is set.
    pub async fn get_context(&self, kind: ContextKind) -> Option<ContextRecord> {
        self.inner.read().await.current.get(&kind).cloned()
    }

    /// All current records, keyed by kind.
    pub async fn current_contexts(&self) -> HashMap<ContextKind, ContextRecord> {
        self.inner.read().await.current.clone()
    }

    /// The most recent `limit` history entries, optionally filtered by
    /// kind, in chronological order (oldest of the slice first).
    pub async fn get_context_history(
        &self,
        kind: Option<ContextKind>,
        limit: usize,
    ) -> Vec<ContextRecord> {
        let inner = self.inner.read().await;
        let filtered: Vec<&ContextRecord> = inner
            .history
            .iter()
            .filter(|r| kind.map_or(true, |k| r.kind == k))
            .collect();
        let skip = filtered.len().saturating_sub(limit);
        filtered.into_iter().skip(skip).cloned().collect()
    }

    /// Remove one current entry, or all of them. History is untouched.
    pub async fn clear_context(&self, kind: Option<ContextKind>) {
        let mut inner = self.inner.write().await;
        match kind {
            Some(k) => {
                inner.current.remove(&k);
            }
            None => inner.current.clear(),
        }
        debug!(
            kind = kind.map(|k| k.as_str()).unwrap_or("all"),
            "Cleared context"
        );
    }

    /// Merge all current records into one flat map.
    ///
    /// Records are applied in ascending `(effective_priority, timestamp)`
    /// order, so on key collision the highest-priority record wins, with
    /// the newest winning among equal priorities. `priority_kind`, when
    /// given, outranks everything.
    pub async fn merge_contexts(
        &self,
        priority_kind: Option<ContextKind>,
    ) -> Map<String, Value> {
        let inner = self.inner.read().await;

        let mut records: Vec<&ContextRecord> = inner.current.values().collect();
        records.sort_by_key(|r| {
            let effective = if Some(r.kind) == priority_kind {
                i64::MAX
            } else {
                i64::from(r.priority)
            };
            (effective, r.timestamp)
        });

        let mut merged = Map::new();
        for record in records {
            for (key, value) in &record.data {
                merged.insert(key.clone(), value.clone());
            }
        }
        merged
    }

    /// Record a module state change.
    ///
    /// Fetches or creates the module's activity record, updates activity
    /// and last command/response, and increments `error_count` exactly
    /// once when a response lacks a truthy `success` field. Also emits a
    /// module-kind context record mirroring the update, so module state
    /// is visible through [`get_context`](Self::get_context).
    pub async fn update_module_state(
        &self,
        module: ModuleId,
        is_active: bool,
        command: Option<&str>,
        response: Option<Map<String, Value>>,
    ) {
        let mut inner = self.inner.write().await;

        let record = inner
            .modules
            .entry(module)
            .or_insert_with(|| ModuleActivityRecord::new(module, is_active));
        record.is_active = is_active;
        if let Some(cmd) = command {
            record.last_command = Some(cmd.to_string());
        }
        if let Some(resp) = response {
            if !is_truthy(resp.get("success")) {
                record.error_count += 1;
            }
            record.last_response = Some(resp);
        }

        let snapshot = record.snapshot();
        let error_count = record.error_count;

        // Mirror the update into the context map, under the same lock so
        // the two views can't diverge.
        let mut data = Map::new();
        data.insert("module".into(), Value::String(module.as_str().into()));
        data.insert(
            "state".into(),
            serde_json::to_value(&snapshot).unwrap_or(Value::Null),
        );
        let mirror = ContextRecord::new(ContextKind::Module, data);
        inner.current.insert(ContextKind::Module, mirror.clone());
        inner.history.push_back(mirror);
        while inner.history.len() > self.max_history {
            inner.history.pop_front();
        }

        debug!(module = %module, error_count, "Updated module state");
    }

    /// The in-process activity record for a module, if one exists.
    pub async fn get_module_state(&self, module: ModuleId) -> Option<ModuleActivityRecord> {
        self.inner.read().await.modules.get(&module).cloned()
    }

    /// Drop a module's activity record, clearing its last command and
    /// response along with the error count. Returns `true` if a record
    /// existed.
    pub async fn reset_module_state(&self, module: ModuleId) -> bool {
        self.inner.write().await.modules.remove(&module).is_some()
    }

    /// Predict the likely next context kind after `kind`, from transition
    /// counts over the last ten history entries. Returns `kind` unchanged
    /// when no transition from it has been observed.
    pub async fn predict_next_context(&self, kind: ContextKind) -> ContextKind {
        let recent = self.get_context_history(None, PREDICTION_WINDOW).await;

        // Successor counts for `kind`, first-seen order kept so ties are
        // deterministic.
        let mut successors: Vec<(ContextKind, u32)> = Vec::new();
        for pair in recent.windows(2) {
            if pair[0].kind != kind {
                continue;
            }
            let next = pair[1].kind;
            match successors.iter_mut().find(|(k, _)| *k == next) {
                Some((_, count)) => *count += 1,
                None => successors.push((next, 1)),
            }
        }

        successors
            .into_iter()
            .max_by_key(|(_, count)| *count)
            .map(|(k, _)| k)
            .unwrap_or(kind)
    }

    /// Record a context transition at low priority, feeding prediction.
    pub async fn track_context_transition(&self, from: ContextKind, to: ContextKind) {
        let mut data = Map::new();
        data.insert("from".into(), Value::String(from.as_str().into()));
        data.insert("to".into(), Value::String(to.as_str().into()));
        self.update_context(
            ContextKind::Transition,
            data,
            None,
            ContextPriority::Low.value(),
        )
        .await;
    }

    /// Summarize the situation around an incoming message: recent
    /// conversation turns, active modules, and the predicted next kind.
    pub async fn analyze_message_context(&self) -> MessageSituation {
        let recent_messages = self
            .get_context_history(Some(ContextKind::Conversation), 5)
            .await;
        let predicted_next = self.predict_next_context(ContextKind::Conversation).await;

        let inner = self.inner.read().await;
        let mut active_modules: Vec<ModuleId> = inner
            .modules
            .values()
            .filter(|m| m.is_active)
            .map(|m| m.module)
            .collect();
        active_modules.sort_by_key(|m| m.as_str());

        MessageSituation {
            recent_messages,
            active_modules,
            predicted_next,
        }
    }
}

impl Default for ContextStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Truthiness of a JSON `success` field: `true`, a nonzero number, or a
/// non-empty string count as success.
fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    fn payload(key: &str, value: Value) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert(key.to_string(), value);
        map
    }

    fn response(success: bool) -> Map<String, Value> {
        payload("success", Value::Bool(success))
    }

    #[tokio::test]
    async fn current_map_overwrites_by_kind() {
        let store = ContextStore::new();
        store
            .update_context(ContextKind::Task, payload("step", json!(1)), None, 1)
            .await;
        store
            .update_context(ContextKind::Task, payload("step", json!(2)), None, 1)
            .await;

        let all = store.current_contexts().await;
        assert_eq!(all.len(), 1);
        assert_eq!(all[&ContextKind::Task].data["step"], json!(2));
    }

    #[tokio::test]
    async fn history_is_bounded_fifo() {
        let store = ContextStore::with_max_history(5);
        for i in 0..12 {
            store
                .update_context(ContextKind::System, payload("i", json!(i)), None, 1)
                .await;
        }

        let history = store.get_context_history(None, 100).await;
        assert_eq!(history.len(), 5);
        // Exactly the most recent five, in insertion order.
        let values: Vec<i64> = history
            .iter()
            .map(|r| r.data["i"].as_i64().unwrap())
            .collect();
        assert_eq!(values, vec![7, 8, 9, 10, 11]);
    }

    #[tokio::test]
    async fn history_filter_and_limit() {
        let store = ContextStore::new();
        for i in 0..4 {
            store
                .update_context(ContextKind::Task, payload("t", json!(i)), None, 1)
                .await;
            store
                .update_context(ContextKind::Memory, payload("m", json!(i)), None, 1)
                .await;
        }

        let tasks = store
            .get_context_history(Some(ContextKind::Task), 2)
            .await;
        assert_eq!(tasks.len(), 2);
        assert!(tasks.iter().all(|r| r.kind == ContextKind::Task));
        assert_eq!(tasks[0].data["t"], json!(2));
        assert_eq!(tasks[1].data["t"], json!(3));
    }

    #[tokio::test]
    async fn get_context_empty_returns_none() {
        let store = ContextStore::new();
        assert!(store.get_context(ContextKind::Emotional).await.is_none());
        assert!(store.current_contexts().await.is_empty());
    }

    #[tokio::test]
    async fn clear_context_leaves_history() {
        let store = ContextStore::new();
        store
            .update_context(ContextKind::Task, payload("x", json!(1)), None, 1)
            .await;
        store
            .update_context(ContextKind::System, payload("y", json!(2)), None, 1)
            .await;

        store.clear_context(Some(ContextKind::Task)).await;
        assert!(store.get_context(ContextKind::Task).await.is_none());
        assert!(store.get_context(ContextKind::System).await.is_some());

        store.clear_context(None).await;
        assert!(store.current_contexts().await.is_empty());
        assert_eq!(store.get_context_history(None, 100).await.len(), 2);
    }

    #[tokio::test]
    async fn merge_highest_priority_wins() {
        let store = ContextStore::new();
        store
            .update_context(ContextKind::Conversation, payload("x", json!(1)), None, 1)
            .await;
        store
            .update_context(ContextKind::Task, payload("x", json!(2)), None, 3)
            .await;

        let merged = store.merge_contexts(None).await;
        assert_eq!(merged["x"], json!(2));
    }

    #[tokio::test]
    async fn merge_priority_kind_overrides() {
        let store = ContextStore::new();
        store
            .update_context(ContextKind::Conversation, payload("x", json!(1)), None, 1)
            .await;
        store
            .update_context(ContextKind::Task, payload("x", json!(2)), None, 3)
            .await;

        let merged = store.merge_contexts(Some(ContextKind::Conversation)).await;
        assert_eq!(merged["x"], json!(1));
    }

    #[tokio::test]
    async fn merge_equal_priority_newest_wins() {
        let store = ContextStore::new();
        store
            .update_context(ContextKind::Memory, payload("x", json!("old")), None, 2)
            .await;
        store
            .update_context(ContextKind::System, payload("x", json!("new")), None, 2)
            .await;

        let merged = store.merge_contexts(None).await;
        assert_eq!(merged["x"], json!("new"));
    }

    #[tokio::test]
    async fn module_error_counting() {
        let store = ContextStore::new();
        store
            .update_module_state(ModuleId::Calendar, true, Some("add"), Some(response(false)))
            .await;
        let state = store.get_module_state(ModuleId::Calendar).await.unwrap();
        assert_eq!(state.error_count, 1);
        assert_eq!(state.last_command.as_deref(), Some("add"));

        store
            .update_module_state(ModuleId::Calendar, true, None, Some(response(true)))
            .await;
        let state = store.get_module_state(ModuleId::Calendar).await.unwrap();
        assert_eq!(state.error_count, 1, "successful response must not count");

        // Missing success field is a failure.
        store
            .update_module_state(
                ModuleId::Calendar,
                true,
                None,
                Some(payload("detail", json!("timeout"))),
            )
            .await;
        let state = store.get_module_state(ModuleId::Calendar).await.unwrap();
        assert_eq!(state.error_count, 2);
    }

    #[tokio::test]
    async fn module_update_mirrors_into_context() {
        let store = ContextStore::new();
        store
            .update_module_state(ModuleId::Spotify, true, Some("play"), None)
            .await;

        let mirror = store.get_context(ContextKind::Module).await.unwrap();
        assert_eq!(mirror.data["module"], json!("spotify"));
        assert_eq!(mirror.data["state"]["last_command"], json!("play"));
    }

    #[tokio::test]
    async fn module_reset_clears_everything() {
        let store = ContextStore::new();
        store
            .update_module_state(ModuleId::Email, true, Some("read"), Some(response(false)))
            .await;
        assert!(store.reset_module_state(ModuleId::Email).await);
        assert!(store.get_module_state(ModuleId::Email).await.is_none());
        assert!(!store.reset_module_state(ModuleId::Email).await);
    }

    #[tokio::test]
    async fn predict_next_context_from_transitions() {
        let store = ContextStore::new();
        // conversation → task, twice; conversation → memory, once.
        for _ in 0..2 {
            store
                .update_context(ContextKind::Conversation, Map::new(), None, 1)
                .await;
            store
                .update_context(ContextKind::Task, Map::new(), None, 1)
                .await;
        }
        store
            .update_context(ContextKind::Conversation, Map::new(), None, 1)
            .await;
        store
            .update_context(ContextKind::Memory, Map::new(), None, 1)
            .await;

        let predicted = store.predict_next_context(ContextKind::Conversation).await;
        assert_eq!(predicted, ContextKind::Task);
    }

    #[tokio::test]
    async fn predict_without_transitions_returns_input() {
        let store = ContextStore::new();
        let predicted = store.predict_next_context(ContextKind::Emotional).await;
        assert_eq!(predicted, ContextKind::Emotional);
    }

    #[tokio::test]
    async fn transition_tracking_records_low_priority() {
        let store = ContextStore::new();
        store
            .track_context_transition(ContextKind::Conversation, ContextKind::Task)
            .await;

        let record = store.get_context(ContextKind::Transition).await.unwrap();
        assert_eq!(record.priority, ContextPriority::Low.value());
        assert_eq!(record.data["from"], json!("conversation"));
        assert_eq!(record.data["to"], json!("task"));
    }

    #[tokio::test]
    async fn message_situation_snapshot() {
        let store = ContextStore::new();
        store
            .update_context(ContextKind::Conversation, payload("m", json!("hi")), None, 3)
            .await;
        store
            .update_module_state(ModuleId::Discord, true, None, None)
            .await;
        store
            .update_module_state(ModuleId::Email, false, None, None)
            .await;

        let situation = store.analyze_message_context().await;
        assert_eq!(situation.recent_messages.len(), 1);
        assert_eq!(situation.active_modules, vec![ModuleId::Discord]);
    }

    #[tokio::test]
    async fn concurrent_updates_stay_bounded() {
        let store = Arc::new(ContextStore::with_max_history(50));
        let mut handles = Vec::new();
        for task in 0..8 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                for i in 0..25 {
                    store
                        .update_context(
                            ContextKind::System,
                            payload("v", json!(task * 100 + i)),
                            None,
                            1,
                        )
                        .await;
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.get_context_history(None, 1000).await.len(), 50);
        assert!(store.get_context(ContextKind::System).await.is_some());
    }

    #[test]
    fn truthiness_of_success_values() {
        assert!(is_truthy(Some(&json!(true))));
        assert!(is_truthy(Some(&json!(1))));
        assert!(is_truthy(Some(&json!("ok"))));
        assert!(!is_truthy(Some(&json!(false))));
        assert!(!is_truthy(Some(&json!(0))));
        assert!(!is_truthy(Some(&json!(""))));
        assert!(!is_truthy(Some(&Value::Null)));
        assert!(!is_truthy(None));
    }
}
