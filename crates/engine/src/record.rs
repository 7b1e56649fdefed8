//! Context record types — the data model of the context store.

use chrono::{DateTime, Utc};
use quill_core::module::ModuleId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The closed set of context kinds the store tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextKind {
    Conversation,
    Memory,
    Emotional,
    Task,
    System,
    Module,
    Command,
    Transition,
}

impl ContextKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Conversation => "conversation",
            Self::Memory => "memory",
            Self::Emotional => "emotional",
            Self::Task => "task",
            Self::System => "system",
            Self::Module => "module",
            Self::Command => "command",
            Self::Transition => "transition",
        }
    }
}

/// Priority levels for context records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextPriority {
    Critical,
    High,
    Medium,
    Low,
}

impl ContextPriority {
    pub fn value(&self) -> i32 {
        match self {
            Self::Critical => 4,
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
        }
    }
}

/// One typed context snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextRecord {
    pub kind: ContextKind,
    pub timestamp: DateTime<Utc>,
    pub data: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
    pub priority: i32,
}

impl ContextRecord {
    pub fn new(kind: ContextKind, data: Map<String, Value>) -> Self {
        Self {
            kind,
            timestamp: Utc::now(),
            data,
            metadata: None,
            priority: 1,
        }
    }

    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

/// In-process health and activity record for one integration module.
///
/// `error_count` saturates upward, one increment per recorded failing
/// response, and only returns to zero through an explicit reset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleActivityRecord {
    pub module: ModuleId,
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_response: Option<Map<String, Value>>,
    #[serde(default)]
    pub error_count: u32,
}

impl ModuleActivityRecord {
    pub fn new(module: ModuleId, is_active: bool) -> Self {
        Self {
            module,
            is_active,
            last_command: None,
            last_response: None,
            error_count: 0,
        }
    }

    /// Rebuild from the persisted snapshot shape.
    pub fn from_snapshot(module: ModuleId, snapshot: quill_core::ModuleStateSnapshot) -> Self {
        Self {
            module,
            is_active: snapshot.is_active,
            last_command: snapshot.last_command,
            last_response: snapshot.last_response,
            error_count: snapshot.error_count,
        }
    }

    /// The persisted snapshot shape of this record.
    pub fn snapshot(&self) -> quill_core::ModuleStateSnapshot {
        quill_core::ModuleStateSnapshot {
            is_active: self.is_active,
            last_command: self.last_command.clone(),
            last_response: self.last_response.clone(),
            error_count: self.error_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(key: &str, value: Value) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert(key.to_string(), value);
        map
    }

    #[test]
    fn record_builder_defaults() {
        let record = ContextRecord::new(ContextKind::Task, payload("x", json!(1)));
        assert_eq!(record.priority, 1);
        assert!(record.metadata.is_none());
        assert_eq!(record.kind, ContextKind::Task);
    }

    #[test]
    fn priority_values_are_ordered() {
        assert!(ContextPriority::Critical.value() > ContextPriority::High.value());
        assert!(ContextPriority::High.value() > ContextPriority::Medium.value());
        assert!(ContextPriority::Medium.value() > ContextPriority::Low.value());
    }

    #[test]
    fn module_record_snapshot_round_trip() {
        let mut record = ModuleActivityRecord::new(ModuleId::Discord, true);
        record.last_command = Some("send".into());
        record.error_count = 3;

        let rebuilt = ModuleActivityRecord::from_snapshot(ModuleId::Discord, record.snapshot());
        assert_eq!(rebuilt.last_command.as_deref(), Some("send"));
        assert_eq!(rebuilt.error_count, 3);
        assert!(rebuilt.is_active);
    }
}
