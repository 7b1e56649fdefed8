//! LlmClient trait — the language-model boundary.
//!
//! The engine hands over one assembled prompt string and gets text back.
//! Timeouts, retries, and wire formats belong to implementations.

use crate::error::LlmError;
use async_trait::async_trait;

/// A completed model reply.
#[derive(Debug, Clone)]
pub struct LlmReply {
    /// The generated text.
    pub text: String,
    /// Which model produced it.
    pub model: String,
}

/// A language-model client.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// The client name (e.g., "ollama").
    fn name(&self) -> &str;

    /// Complete a single prompt.
    async fn complete(&self, prompt: &str) -> Result<LlmReply, LlmError>;
}
