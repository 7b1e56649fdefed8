//! Language model providers for Quill.

pub mod ollama;

pub use ollama::OllamaClient;
