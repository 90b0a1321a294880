//! Store error types.
//!
//! These errors represent failures in the collaborating stores the grading
//! engine reads from and writes to. Defined in `examgrade-core` so store
//! implementations and the engine classify failures without string matching.

use thiserror::Error;

/// Errors a question, submission, or grade store can produce.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The referenced record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// An underlying I/O failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A record exists but could not be decoded.
    #[error("malformed record: {0}")]
    Malformed(String),

    /// The backing service rejected or failed the request.
    #[error("backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Returns `true` if a retry by the storage layer could succeed.
    ///
    /// The engine itself never retries; this classification exists for
    /// store implementations that do.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Io(_) | StoreError::Backend(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(StoreError::Backend("503".into()).is_transient());
        assert!(!StoreError::NotFound("q1".into()).is_transient());
        assert!(!StoreError::Malformed("bad payload".into()).is_transient());
    }
}
