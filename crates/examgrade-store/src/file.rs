//! File-backed read stores for the CLI.
//!
//! Exam packages are TOML (parsed by `examgrade-core::parser`); sessions
//! are JSON files produced by the delivery frontend, one session per file.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;

use examgrade_core::error::StoreError;
use examgrade_core::model::{Answer, Exam, Question, Session};
use examgrade_core::traits::{QuestionStore, SubmissionStore};

/// A read-only store over exam packages and session files loaded at startup.
pub struct FileStore {
    questions: HashMap<String, Question>,
    sessions: HashMap<String, Session>,
}

impl FileStore {
    /// Build a store from already-loaded exams and sessions.
    pub fn new(exams: &[Exam], sessions: Vec<Session>) -> Self {
        let questions = exams
            .iter()
            .flat_map(|e| e.questions.iter())
            .map(|q| (q.id.clone(), q.clone()))
            .collect();
        let sessions = sessions.into_iter().map(|s| (s.id.clone(), s)).collect();
        Self {
            questions,
            sessions,
        }
    }

    /// Session ids in sorted order, for deterministic batch processing.
    pub fn session_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.sessions.keys().cloned().collect();
        ids.sort();
        ids
    }
}

#[async_trait]
impl QuestionStore for FileStore {
    async fn question(&self, id: &str) -> Result<Option<Question>, StoreError> {
        Ok(self.questions.get(id).cloned())
    }
}

#[async_trait]
impl SubmissionStore for FileStore {
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

/// Load one session from a JSON file.
pub fn load_session(path: &Path) -> Result<Session> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read session file: {}", path.display()))?;
    let session: Session = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse session JSON: {}", path.display()))?;
    Ok(session)
}

/// Load sessions from a JSON file or, recursively, a directory of them.
///
/// Unparsable files in a directory are skipped with a warning so one bad
/// export does not block the batch.
pub fn load_sessions(path: &Path) -> Result<Vec<Session>> {
    if !path.is_dir() {
        return Ok(vec![load_session(path)?]);
    }

    let mut sessions = Vec::new();
    for entry in std::fs::read_dir(path)
        .with_context(|| format!("failed to read directory: {}", path.display()))?
    {
        let entry = entry?;
        let entry_path = entry.path();

        if entry_path.is_dir() {
            sessions.extend(load_sessions(&entry_path)?);
        } else if entry_path.extension().is_some_and(|ext| ext == "json") {
            match load_session(&entry_path) {
                Ok(session) => sessions.push(session),
                Err(e) => {
                    tracing::warn!("skipping {}: {}", entry_path.display(), e);
                }
            }
        }
    }

    Ok(sessions)
}
