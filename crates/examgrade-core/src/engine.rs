//! Batch grading engine.
//!
//! Drives one grading batch per finished session: loads the session's
//! answers, scores each against its question, forwards outcomes to the
//! grade sink, and assembles a [`SessionReport`]. Answers are independent,
//! so scoring runs concurrently up to the configured parallelism; results
//! are re-ordered to submission order before reporting.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::report::{SessionReport, SessionSummary};
use crate::scorer::{score, GradeStatus};
use crate::statistics::compute_session_stats;
use crate::traits::{GradeRecord, GradeSink, QuestionStore, SubmissionStore};

/// Configuration for the grading engine.
#[derive(Debug, Clone)]
pub struct GradeEngineConfig {
    /// Maximum answers scored concurrently within one batch.
    pub parallelism: usize,
}

impl Default for GradeEngineConfig {
    fn default() -> Self {
        Self { parallelism: 4 }
    }
}

/// Progress reporting trait.
pub trait ProgressReporter: Send + Sync {
    fn on_answer_graded(&self, question_id: &str, record: &GradeRecord);
    fn on_answer_skipped(&self, question_id: &str, reason: &str);
    fn on_session_complete(
        &self,
        session_id: &str,
        graded: usize,
        pending: usize,
        ungraded: usize,
        elapsed: Duration,
    );
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_answer_graded(&self, _: &str, _: &GradeRecord) {}
    fn on_answer_skipped(&self, _: &str, _: &str) {}
    fn on_session_complete(&self, _: &str, _: usize, _: usize, _: usize, _: Duration) {}
}

/// The central grading engine.
pub struct GradeEngine {
    questions: Arc<dyn QuestionStore>,
    submissions: Arc<dyn SubmissionStore>,
    sink: Arc<dyn GradeSink>,
    config: GradeEngineConfig,
}

impl GradeEngine {
    pub fn new(
        questions: Arc<dyn QuestionStore>,
        submissions: Arc<dyn SubmissionStore>,
        sink: Arc<dyn GradeSink>,
        config: GradeEngineConfig,
    ) -> Self {
        Self {
            questions,
            submissions,
            sink,
            config,
        }
    }

    /// Grade every answer of one finished session.
    ///
    /// A broken question reference leaves that row `Ungraded` and the batch
    /// continues; only failure to load the session or enumerate its answers
    /// fails the batch. `pass_percent` is the exam's optional pass
    /// threshold, applied to the auto-gradable portion.
    pub async fn grade_session(
        &self,
        session_id: &str,
        pass_percent: Option<f64>,
        progress: &dyn ProgressReporter,
    ) -> Result<SessionReport> {
        let start = Instant::now();

        let session = self
            .submissions
            .session(session_id)
            .await
            .with_context(|| format!("failed to load session {session_id}"))?
            .with_context(|| format!("unknown session: {session_id}"))?;

        let answers = self
            .submissions
            .answers(session_id)
            .await
            .with_context(|| format!("failed to load answers for session {session_id}"))?;

        let answer_count = answers.len();
        let semaphore = Arc::new(Semaphore::new(self.config.parallelism));
        let mut futures = FuturesUnordered::new();

        for (idx, answer) in answers.into_iter().enumerate() {
            let questions = Arc::clone(&self.questions);
            let semaphore = Arc::clone(&semaphore);

            futures.push(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    tracing::warn!("semaphore closed, leaving {} ungraded", answer.question_id);
                    return (idx, GradeRecord::ungraded(&answer.question_id));
                };

                let record = match questions.question(&answer.question_id).await {
                    Ok(Some(question)) => {
                        let outcome = score(&answer, &question);
                        GradeRecord {
                            question_id: answer.question_id.clone(),
                            kind: Some(question.kind()),
                            points_awarded: outcome.points,
                            points_possible: question.points,
                            status: outcome.status,
                            is_auto_graded: outcome.status == GradeStatus::Graded,
                        }
                    }
                    Ok(None) => {
                        tracing::warn!(
                            "question {} not found, leaving ungraded",
                            answer.question_id
                        );
                        GradeRecord::ungraded(&answer.question_id)
                    }
                    Err(e) => {
                        tracing::warn!(
                            "question {} lookup failed ({e}), leaving ungraded",
                            answer.question_id
                        );
                        GradeRecord::ungraded(&answer.question_id)
                    }
                };
                (idx, record)
            });
        }

        let mut indexed = Vec::with_capacity(answer_count);
        while let Some(item) = futures.next().await {
            indexed.push(item);
        }
        // Deterministic output regardless of completion order.
        indexed.sort_by_key(|(idx, _)| *idx);
        let records: Vec<GradeRecord> = indexed.into_iter().map(|(_, r)| r).collect();

        let mut graded = 0usize;
        let mut pending = 0usize;
        let mut ungraded = 0usize;

        for record in &records {
            match record.status {
                GradeStatus::Graded => {
                    graded += 1;
                    progress.on_answer_graded(&record.question_id, record);
                }
                GradeStatus::PendingManual => {
                    pending += 1;
                    progress.on_answer_skipped(&record.question_id, "pending manual review");
                }
                GradeStatus::Ungraded => {
                    ungraded += 1;
                    progress.on_answer_skipped(&record.question_id, "question not resolvable");
                }
            }

            if let Err(e) = self.sink.record(session_id, record).await {
                tracing::warn!(
                    "failed to persist grade for {}: {e}",
                    record.question_id
                );
            }
        }

        let elapsed = start.elapsed();
        progress.on_session_complete(session_id, graded, pending, ungraded, elapsed);

        let stats = compute_session_stats(&records, pass_percent);

        Ok(SessionReport {
            id: Uuid::new_v4(),
            created_at: chrono::Utc::now(),
            session: SessionSummary {
                id: session.id.clone(),
                exam_id: session.exam_id.clone(),
                student: session.student.clone(),
                submitted_at: session.submitted_at,
                answer_count,
            },
            records,
            stats,
            duration_ms: elapsed.as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::model::{Answer, AnswerKey, Choice, Question, Response, Session};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct FixtureStore {
        questions: HashMap<String, Question>,
        session: Session,
        fail_lookup_for: Option<String>,
        recorded: Mutex<Vec<GradeRecord>>,
    }

    #[async_trait]
    impl QuestionStore for FixtureStore {
        async fn question(&self, id: &str) -> Result<Option<Question>, StoreError> {
            if self.fail_lookup_for.as_deref() == Some(id) {
                return Err(StoreError::Backend("store offline".into()));
            }
            Ok(self.questions.get(id).cloned())
        }
    }

    #[async_trait]
    impl SubmissionStore for FixtureStore {
        async fn session(&self, session_id: &str) -> Result<Option<Session>, StoreError> {
            if session_id == self.session.id {
                Ok(Some(self.session.clone()))
            } else {
                Ok(None)
            }
        }

        async fn answers(&self, session_id: &str) -> Result<Vec<Answer>, StoreError> {
            if session_id == self.session.id {
                Ok(self.session.answers.clone())
            } else {
                Err(StoreError::NotFound(session_id.into()))
            }
        }
    }

    #[async_trait]
    impl GradeSink for FixtureStore {
        async fn record(&self, _: &str, record: &GradeRecord) -> Result<(), StoreError> {
            self.recorded.lock().unwrap().push(record.clone());
            Ok(())
        }
    }

    fn mc_question(id: &str, points: u32, correct: &str) -> Question {
        Question {
            id: id.into(),
            prompt: String::new(),
            points,
            key: AnswerKey::MultipleChoice {
                options: vec![
                    Choice {
                        id: "a".into(),
                        text: String::new(),
                        is_correct: correct == "a",
                    },
                    Choice {
                        id: "b".into(),
                        text: String::new(),
                        is_correct: correct == "b",
                    },
                ],
            },
        }
    }

    fn selection(question_id: &str, ids: &[&str]) -> Answer {
        Answer {
            question_id: question_id.into(),
            response: Response::Selection {
                selected: ids.iter().map(|s| s.to_string()).collect(),
            },
        }
    }

    fn make_store(answers: Vec<Answer>, questions: Vec<Question>) -> Arc<FixtureStore> {
        Arc::new(FixtureStore {
            questions: questions.into_iter().map(|q| (q.id.clone(), q)).collect(),
            session: Session {
                id: "s1".into(),
                exam_id: "exam1".into(),
                student: "alice".into(),
                submitted_at: chrono::Utc::now(),
                answers,
            },
            fail_lookup_for: None,
            recorded: Mutex::new(Vec::new()),
        })
    }

    fn make_engine(store: &Arc<FixtureStore>) -> GradeEngine {
        GradeEngine::new(
            store.clone(),
            store.clone(),
            store.clone(),
            GradeEngineConfig::default(),
        )
    }

    #[tokio::test]
    async fn grades_a_full_session() {
        let store = make_store(
            vec![selection("q1", &["a"]), selection("q2", &["b"])],
            vec![mc_question("q1", 2, "a"), mc_question("q2", 3, "a")],
        );
        let engine = make_engine(&store);

        let report = engine
            .grade_session("s1", Some(50.0), &NoopReporter)
            .await
            .unwrap();

        assert_eq!(report.records.len(), 2);
        assert_eq!(report.records[0].question_id, "q1");
        assert_eq!(report.records[0].points_awarded, 2.0);
        assert!(report.records[0].is_auto_graded);
        assert_eq!(report.records[1].points_awarded, 0.0);
        assert_eq!(report.stats.auto_awarded, 2.0);
        assert_eq!(report.stats.auto_possible, 5.0);
        assert_eq!(report.stats.passed, Some(false));
        assert_eq!(store.recorded.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn missing_question_leaves_row_ungraded() {
        let store = make_store(
            vec![selection("q1", &["a"]), selection("ghost", &["a"])],
            vec![mc_question("q1", 2, "a")],
        );
        let engine = make_engine(&store);

        let report = engine
            .grade_session("s1", None, &NoopReporter)
            .await
            .unwrap();

        assert_eq!(report.records.len(), 2);
        assert_eq!(report.records[1].status, GradeStatus::Ungraded);
        assert!(report.records[1].kind.is_none());
        // The good row still graded.
        assert_eq!(report.records[0].points_awarded, 2.0);
        assert_eq!(report.stats.ungraded, 1);
    }

    #[tokio::test]
    async fn failed_lookup_leaves_row_ungraded_without_aborting() {
        let mut store = make_store(
            vec![selection("q1", &["a"]), selection("q2", &["b"])],
            vec![mc_question("q1", 2, "a"), mc_question("q2", 3, "b")],
        );
        Arc::get_mut(&mut store).unwrap().fail_lookup_for = Some("q2".into());
        let engine = make_engine(&store);

        let report = engine
            .grade_session("s1", None, &NoopReporter)
            .await
            .unwrap();

        assert_eq!(report.records[0].status, GradeStatus::Graded);
        assert_eq!(report.records[1].status, GradeStatus::Ungraded);
    }

    #[tokio::test]
    async fn unknown_session_fails_the_batch() {
        let store = make_store(vec![], vec![]);
        let engine = make_engine(&store);

        let result = engine.grade_session("nope", None, &NoopReporter).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn output_preserves_submission_order() {
        let answers: Vec<Answer> = (0..32).map(|i| selection(&format!("q{i}"), &["a"])).collect();
        let questions: Vec<Question> = (0..32)
            .map(|i| mc_question(&format!("q{i}"), 1, "a"))
            .collect();
        let store = make_store(answers, questions);
        let engine = GradeEngine::new(
            store.clone(),
            store.clone(),
            store.clone(),
            GradeEngineConfig { parallelism: 8 },
        );

        let report = engine
            .grade_session("s1", None, &NoopReporter)
            .await
            .unwrap();

        let ids: Vec<&str> = report
            .records
            .iter()
            .map(|r| r.question_id.as_str())
            .collect();
        let expected: Vec<String> = (0..32).map(|i| format!("q{i}")).collect();
        assert_eq!(ids, expected.iter().map(String::as_str).collect::<Vec<_>>());
    }
}
