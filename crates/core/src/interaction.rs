//! Interaction records — the persisted unit of long-term memory.
//!
//! Every exchange with the assistant is stored as an [`InteractionRecord`]
//! and later recalled by the relevance scorer. Records carry a coarse
//! situational kind, an origin channel, an optional mood label, and an
//! importance rating that callers keep in a small bounded range (0–5).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The situational kind of an interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    Casual,
    Professional,
    Emotional,
    TaskOriented,
    Learning,
}

impl InteractionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Casual => "casual",
            Self::Professional => "professional",
            Self::Emotional => "emotional",
            Self::TaskOriented => "task_oriented",
            Self::Learning => "learning",
        }
    }
}

/// Which channel an interaction arrived through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionSource {
    Discord,
    Local,
    Gui,
    Api,
    #[default]
    Unknown,
}

/// A stored interaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionRecord {
    /// Unique ID for this interaction
    pub id: String,

    /// The text content of the exchange
    pub content: String,

    /// Situational kind at the time of the exchange
    pub kind: InteractionKind,

    /// Origin channel
    #[serde(default)]
    pub source: InteractionSource,

    /// Optional mood label attached by the caller
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,

    /// Importance rating, expected in 0–5
    #[serde(default)]
    pub importance: u8,

    /// When this interaction happened
    pub timestamp: DateTime<Utc>,
}

/// Parameters for storing a new interaction.
#[derive(Debug, Clone)]
pub struct NewInteraction {
    pub content: String,
    pub kind: InteractionKind,
    pub source: InteractionSource,
    pub mood: Option<String>,
    pub importance: u8,
}

impl NewInteraction {
    /// A new interaction with default source/mood and importance 1.
    pub fn new(content: impl Into<String>, kind: InteractionKind) -> Self {
        Self {
            content: content.into(),
            kind,
            source: InteractionSource::Unknown,
            mood: None,
            importance: 1,
        }
    }

    pub fn with_source(mut self, source: InteractionSource) -> Self {
        self.source = source;
        self
    }

    pub fn with_mood(mut self, mood: impl Into<String>) -> Self {
        self.mood = Some(mood.into());
        self
    }

    pub fn with_importance(mut self, importance: u8) -> Self {
        self.importance = importance;
        self
    }

    /// Materialize into a record with a fresh id and the current time.
    pub fn into_record(self) -> InteractionRecord {
        InteractionRecord {
            id: Uuid::new_v4().to_string(),
            content: self.content,
            kind: self.kind,
            source: self.source,
            mood: self.mood,
            importance: self.importance,
            timestamp: Utc::now(),
        }
    }
}
