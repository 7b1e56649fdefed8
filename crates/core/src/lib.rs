//! # Quill Core
//!
//! Domain types, traits, and error definitions for the Quill personal
//! assistant. This crate has **zero framework dependencies** — it defines
//! the domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator of the context engine is a trait here:
//! the durable document store ([`MemoryStore`]), the text-analysis
//! utility ([`TextAnalyzer`]), and the language model ([`LlmClient`]).
//! Implementations live in their respective crates, and the engine
//! receives explicit handles — no hidden global state.

pub mod analyzer;
pub mod error;
pub mod interaction;
pub mod llm;
pub mod module;
pub mod profile;
pub mod store;

// Re-export key types at crate root for ergonomics
pub use analyzer::TextAnalyzer;
pub use error::{EngineError, Error, LlmError, MemoryError, Result};
pub use interaction::{InteractionKind, InteractionRecord, InteractionSource, NewInteraction};
pub use llm::{LlmClient, LlmReply};
pub use module::{ModuleId, ModuleStateSnapshot};
pub use profile::{Goal, KnowledgeEntry, PersonalityProfile, PersonalityTrait, Preference};
pub use store::MemoryStore;
