//! The Quill context engine — the core of the assistant.
//!
//! Four cooperating pieces:
//!
//! 1. [`ContextStore`] — typed "what is happening right now" state with a
//!    bounded history, deterministic priority merge, per-module activity
//!    tracking, and simple next-context prediction.
//! 2. [`RelevanceScorer`] — ranks recently stored interactions against a
//!    new query under a keyword/recency/importance/context model and
//!    returns the worthwhile subset.
//! 3. [`ModuleRegistry`] / [`IntentAssessment`] — classifies a query's
//!    intent and routes it to an integration module when one is implicated.
//! 4. [`ContextAssembler`] — renders the selected context slices into one
//!    ordered prompt string, module context first when present.
//!
//! [`Assistant`] wires them together into the end-to-end message flow:
//! intent → context → recall → LLM → store interaction → update context.

pub mod assembler;
pub mod intent;
pub mod record;
pub mod runner;
pub mod scorer;
pub mod store;

pub use assembler::{AssembledPrompt, ContextAssembler};
pub use intent::{CommandKind, IntentAssessment, ModuleRegistry};
pub use record::{ContextKind, ContextPriority, ContextRecord, ModuleActivityRecord};
pub use runner::Assistant;
pub use scorer::{MemoryBundle, RelevanceScorer, ScoredMemory, ScorerConfig};
pub use store::{ContextStore, MessageSituation};
