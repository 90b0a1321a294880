//! examgrade-store — Store implementations for the grading engine.
//!
//! Provides an in-memory store for tests and fixtures, and a file-backed
//! store that loads TOML exam packages and JSON session files for the CLI.

pub mod file;
pub mod memory;

pub use file::{load_sessions, FileStore};
pub use memory::MemoryStore;
