//! examgrade-core — Grading engine, data model, and scoring.
//!
//! This crate defines the question/answer data model, the pure scoring
//! functions, and the batch engine that the rest of examgrade builds on.

pub mod engine;
pub mod error;
pub mod model;
pub mod parser;
pub mod report;
pub mod scorer;
pub mod statistics;
pub mod traits;
