//! Store trait seams the grading engine depends on.
//!
//! These async traits are implemented by the `examgrade-store` crate (and
//! by in-test fixtures) so the engine can be driven against in-memory data
//! instead of a live backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::model::{Answer, Question, QuestionKind, Session};
use crate::scorer::GradeStatus;

/// Read access to authored questions, including their correct-answer data.
#[async_trait]
pub trait QuestionStore: Send + Sync {
    /// Look up a question by id. `Ok(None)` when the id is unknown.
    async fn question(&self, id: &str) -> Result<Option<Question>, StoreError>;
}

/// Read access to finished sessions and their submitted answers.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Look up session metadata by id. `Ok(None)` when the id is unknown.
    async fn session(&self, session_id: &str) -> Result<Option<Session>, StoreError>;

    /// All answers submitted in one session.
    async fn answers(&self, session_id: &str) -> Result<Vec<Answer>, StoreError>;
}

/// Write access for persisting per-answer grading outcomes.
#[async_trait]
pub trait GradeSink: Send + Sync {
    async fn record(&self, session_id: &str, record: &GradeRecord) -> Result<(), StoreError>;
}

/// The persisted outcome for one answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeRecord {
    pub question_id: String,
    /// `None` when the question reference could not be resolved.
    pub kind: Option<QuestionKind>,
    pub points_awarded: f64,
    /// Zero when the question reference could not be resolved.
    pub points_possible: u32,
    pub status: GradeStatus,
    /// Set only for [`GradeStatus::Graded`] rows, so pending and ungraded
    /// rows stay visible to manual-review tooling.
    pub is_auto_graded: bool,
}

impl GradeRecord {
    /// A record for an answer whose question reference is broken.
    pub fn ungraded(question_id: &str) -> Self {
        Self {
            question_id: question_id.to_string(),
            kind: None,
            points_awarded: 0.0,
            points_possible: 0,
            status: GradeStatus::Ungraded,
            is_auto_graded: false,
        }
    }
}

/// A sink that discards every record.
pub struct NullSink;

#[async_trait]
impl GradeSink for NullSink {
    async fn record(&self, _session_id: &str, _record: &GradeRecord) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ungraded_record_shape() {
        let record = GradeRecord::ungraded("q7");
        assert_eq!(record.question_id, "q7");
        assert_eq!(record.status, GradeStatus::Ungraded);
        assert!(record.kind.is_none());
        assert_eq!(record.points_possible, 0);
        assert!(!record.is_auto_graded);
    }

    #[tokio::test]
    async fn null_sink_accepts_records() {
        let sink = NullSink;
        sink.record("s1", &GradeRecord::ungraded("q1")).await.unwrap();
    }
}
