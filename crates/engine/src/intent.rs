//! Query intent classification and module routing.
//!
//! A closed registry of per-module command patterns, compiled once at
//! construction. Classification is a cheap cascade: explicit command
//! markers raise confidence, a specific command pattern match wins
//! outright, a general module keyword is a weaker fallback, and plain
//! conversational queries fall through to keyword cue scoring for the
//! non-module signals.

use quill_core::module::ModuleId;
use regex_lite::Regex;
use tracing::warn;

/// Commands the routed modules understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Add,
    Check,
    Remove,
    List,
    Send,
    Read,
    Manage,
}

impl CommandKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Check => "check",
            Self::Remove => "remove",
            Self::List => "list",
            Self::Send => "send",
            Self::Read => "read",
            Self::Manage => "manage",
        }
    }
}

/// Per-signal intent scores for one query. Ephemeral, never persisted.
#[derive(Debug, Clone, Default)]
pub struct IntentAssessment {
    pub personal: f64,
    pub task: f64,
    pub knowledge: f64,
    pub emotional: f64,
    pub preference: f64,
    pub module: Option<ModuleId>,
    pub command: Option<CommandKind>,
    pub confidence: f64,
}

struct ModuleRoute {
    module: ModuleId,
    commands: Vec<(CommandKind, Regex)>,
    general: Vec<Regex>,
}

/// The closed set of module routes, with all patterns pre-compiled.
pub struct ModuleRegistry {
    routes: Vec<ModuleRoute>,
}

/// Prefixes that mark a query as an explicit command.
const COMMAND_MARKERS: &[&str] = &["!", "/", ".", "run", "execute", "do"];

// Keyword cues for the non-module intent signals. Each hit adds a fixed
// increment, capped at 1.0.
const CUE_INCREMENT: f64 = 0.4;
const EMOTIONAL_CUES: &[&str] = &[
    "feel", "feeling", "mood", "happy", "sad", "angry", "upset", "stressed", "excited",
];
const KNOWLEDGE_CUES: &[&str] = &[
    "what is",
    "what are",
    "how does",
    "explain",
    "tell me about",
    "know about",
    "remember about",
];
const PREFERENCE_CUES: &[&str] = &[
    "favorite",
    "favourite",
    "prefer",
    "rather",
    "love",
    "hate",
    "enjoy",
];
const PERSONAL_CUES: &[&str] = &["my day", "about me", "my life", "myself", "how am i"];
const TASK_CUES: &[&str] = &[
    "todo", "task", "deadline", "finish", "complete", "work on", "need to",
];

impl ModuleRegistry {
    /// Build the registry with the built-in calendar and discord routes.
    pub fn new() -> Self {
        let calendar = ModuleRoute {
            module: ModuleId::Calendar,
            commands: compile_commands(&[
                (
                    CommandKind::Add,
                    r"(?:schedule|add|create|set up|make).*?(?:meeting|appointment|event|reminder)",
                ),
                (
                    CommandKind::Check,
                    r"(?:check|look up|show|tell me|display|view).*?(?:calendar|schedule)",
                ),
                (
                    CommandKind::Remove,
                    r"(?:remove|delete|cancel|clear).*?(?:meeting|appointment|event)",
                ),
                (
                    CommandKind::List,
                    r"(?:list|show|get|tell me).*?(?:events|meetings|appointments)",
                ),
            ]),
            general: compile_general(&[
                r"calendar",
                r"schedule",
                r"appointment",
                r"meeting",
                r"remind me",
                r"event",
            ]),
        };

        let discord = ModuleRoute {
            module: ModuleId::Discord,
            commands: compile_commands(&[
                (CommandKind::Send, r"(?:send|post|write).*?(?:message|reply)"),
                (CommandKind::Read, r"(?:read|check|show).*?(?:messages|channel)"),
                (
                    CommandKind::Manage,
                    r"(?:manage|update|change).*?(?:server|channel|role)",
                ),
            ]),
            general: compile_general(&[r"discord", r"server", r"channel", r"message"]),
        };

        Self {
            routes: vec![calendar, discord],
        }
    }

    /// Classify a query into intent signals and an optional module route.
    ///
    /// A specific command match short-circuits with `task = 1.0`. A
    /// general module keyword is a weaker fallback (`task = 0.8`). Only
    /// queries that route nowhere get the keyword cue scores.
    pub fn analyze(&self, query: &str) -> IntentAssessment {
        let mut intent = IntentAssessment::default();
        let query = query.to_lowercase();
        let query = query.trim();

        let explicit = COMMAND_MARKERS.iter().any(|m| query.starts_with(m));
        if explicit {
            intent.confidence = 0.9;
        }
        let marker_boost = if explicit { 0.1 } else { 0.0 };

        // Specific command patterns win outright.
        for route in &self.routes {
            for (command, pattern) in &route.commands {
                if pattern.is_match(query) {
                    intent.module = Some(route.module);
                    intent.command = Some(*command);
                    intent.task = 1.0;
                    intent.confidence = 0.8 + marker_boost;
                    return intent;
                }
            }
        }

        // General module keywords are a weaker routing signal with no
        // specific command attached.
        for route in &self.routes {
            if route.general.iter().any(|p| p.is_match(query)) {
                intent.module = Some(route.module);
                intent.task = 0.8;
                intent.confidence = 0.6 + marker_boost;
                return intent;
            }
        }

        intent.emotional = cue_score(query, EMOTIONAL_CUES);
        intent.knowledge = cue_score(query, KNOWLEDGE_CUES);
        intent.preference = cue_score(query, PREFERENCE_CUES);
        intent.personal = cue_score(query, PERSONAL_CUES);
        intent.task = cue_score(query, TASK_CUES);
        intent
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn compile_commands(patterns: &[(CommandKind, &str)]) -> Vec<(CommandKind, Regex)> {
    patterns
        .iter()
        .filter_map(|(command, pattern)| match Regex::new(pattern) {
            Ok(regex) => Some((*command, regex)),
            Err(err) => {
                warn!(pattern, %err, "Skipping unparseable command pattern");
                None
            }
        })
        .collect()
}

fn compile_general(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .filter_map(|pattern| match Regex::new(pattern) {
            Ok(regex) => Some(regex),
            Err(err) => {
                warn!(pattern, %err, "Skipping unparseable module pattern");
                None
            }
        })
        .collect()
}

fn cue_score(query: &str, cues: &[&str]) -> f64 {
    let hits = cues.iter().filter(|cue| query.contains(*cue)).count();
    (hits as f64 * CUE_INCREMENT).min(1.0)
}
