//! Error types for the Quill domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all Quill operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Memory store errors ---
    #[error("Memory error: {0}")]
    Memory(#[from] MemoryError),

    // --- Language model errors ---
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    // --- Context engine errors ---
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Record not found: {0}")]
    NotFound(String),
}

#[derive(Debug, Clone, Error)]
pub enum LlmError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Invalid response from model: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Context payload could not be serialized: {0}")]
    InvalidPayload(String),

    #[error("Prompt assembly produced no content")]
    EmptyPrompt,
}
