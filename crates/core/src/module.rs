//! Integration module identifiers and persisted health state.
//!
//! Modules are a closed set resolved at startup — routing never happens
//! through string lookups at call time. Adding an integration means
//! adding a variant here and registering its patterns with the intent
//! registry.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// The closed set of integration modules the assistant can route to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleId {
    Calendar,
    Discord,
    Email,
    Spotify,
    Notifications,
}

impl ModuleId {
    pub const ALL: [ModuleId; 5] = [
        ModuleId::Calendar,
        ModuleId::Discord,
        ModuleId::Email,
        ModuleId::Spotify,
        ModuleId::Notifications,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Calendar => "calendar",
            Self::Discord => "discord",
            Self::Email => "email",
            Self::Spotify => "spotify",
            Self::Notifications => "notifications",
        }
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModuleId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "calendar" => Ok(Self::Calendar),
            "discord" => Ok(Self::Discord),
            "email" => Ok(Self::Email),
            "spotify" => Ok(Self::Spotify),
            "notifications" => Ok(Self::Notifications),
            other => Err(format!("unknown module: {other}")),
        }
    }
}

/// The persisted shape of a module's health state.
///
/// This is what the memory store serializes; the engine keeps a richer
/// in-process record and reconstructs it from this snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModuleStateSnapshot {
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_response: Option<Map<String, Value>>,
    #[serde(default)]
    pub error_count: u32,
}
