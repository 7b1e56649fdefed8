//! Memory store implementations for Quill.

pub mod in_memory;

pub use in_memory::InMemoryStore;
