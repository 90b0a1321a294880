//! In-memory store for tests and fixtures.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use examgrade_core::error::StoreError;
use examgrade_core::model::{Answer, Exam, Question, Session};
use examgrade_core::traits::{GradeRecord, GradeSink, QuestionStore, SubmissionStore};

/// An in-memory question/submission store and grade sink.
///
/// Used to drive the grading engine without a live backend. Records
/// lookup counts and every grade written so tests can assert on them.
pub struct MemoryStore {
    questions: HashMap<String, Question>,
    sessions: HashMap<String, Session>,
    lookup_count: AtomicU32,
    recorded: Mutex<Vec<(String, GradeRecord)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            questions: HashMap::new(),
            sessions: HashMap::new(),
            lookup_count: AtomicU32::new(0),
            recorded: Mutex::new(Vec::new()),
        }
    }

    /// A store preloaded with every question of an exam package.
    pub fn from_exam(exam: &Exam) -> Self {
        let mut store = Self::new();
        for question in &exam.questions {
            store.insert_question(question.clone());
        }
        store
    }

    pub fn insert_question(&mut self, question: Question) {
        self.questions.insert(question.id.clone(), question);
    }

    pub fn insert_session(&mut self, session: Session) {
        self.sessions.insert(session.id.clone(), session);
    }

    /// Number of question lookups performed.
    pub fn lookup_count(&self) -> u32 {
        self.lookup_count.load(Ordering::Relaxed)
    }

    /// Every grade recorded through the sink, as (session_id, record).
    pub fn recorded(&self) -> Vec<(String, GradeRecord)> {
        self.recorded.lock().unwrap().clone()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuestionStore for MemoryStore {
    async fn question(&self, id: &str) -> Result<Option<Question>, StoreError> {
        self.lookup_count.fetch_add(1, Ordering::Relaxed);
        Ok(self.questions.get(id).cloned())
    }
}

#[async_trait]
impl SubmissionStore for MemoryStore {
    async fn session(&self, session_id: &str) -> Result<Option<Session>, StoreError> {
        Ok(self.sessions.get(session_id).cloned())
    }

    async fn answers(&self, session_id: &str) -> Result<Vec<Answer>, StoreError> {
        self.sessions
            .get(session_id)
            .map(|s| s.answers.clone())
            .ok_or_else(|| StoreError::NotFound(format!("session {session_id}")))
    }
}

#[async_trait]
impl GradeSink for MemoryStore {
    async fn record(&self, session_id: &str, record: &GradeRecord) -> Result<(), StoreError> {
        self.recorded
            .lock()
            .unwrap()
            .push((session_id.to_string(), record.clone()));
        Ok(())
    }
}
