//! User-profile types: personality baseline, goals, preferences, knowledge.
//!
//! These are the durable collections the context assembler pulls from.
//! The store owns persistence; these are just the shapes it returns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The five tracked personality dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonalityTrait {
    Openness,
    Conscientiousness,
    Extraversion,
    Agreeableness,
    Stability,
}

impl PersonalityTrait {
    pub const ALL: [PersonalityTrait; 5] = [
        PersonalityTrait::Openness,
        PersonalityTrait::Conscientiousness,
        PersonalityTrait::Extraversion,
        PersonalityTrait::Agreeableness,
        PersonalityTrait::Stability,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Openness => "openness",
            Self::Conscientiousness => "conscientiousness",
            Self::Extraversion => "extraversion",
            Self::Agreeableness => "agreeableness",
            Self::Stability => "stability",
        }
    }
}

/// The assistant's personality baseline.
///
/// Traits map to values in `[0, 1]`. A `BTreeMap` keeps prompt rendering
/// deterministic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalityProfile {
    pub traits: BTreeMap<String, f64>,
}

impl PersonalityProfile {
    /// A neutral baseline: every trait at 0.5.
    pub fn baseline() -> Self {
        Self {
            traits: PersonalityTrait::ALL
                .iter()
                .map(|t| (t.as_str().to_string(), 0.5))
                .collect(),
        }
    }
}

impl Default for PersonalityProfile {
    fn default() -> Self {
        Self::baseline()
    }
}

/// A tracked goal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
    pub priority: i32,
}

/// A rated preference within a category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preference {
    pub category: String,
    pub item: String,
    pub rating: f64,
}

/// A stored piece of personal knowledge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    pub topic: String,
    pub content: String,
    #[serde(default)]
    pub importance: u8,
}
