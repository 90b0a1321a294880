//! Core data model types for examgrade.
//!
//! These are the fundamental types the entire examgrade system uses to
//! represent questions, answer keys, student answers, and sessions.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The supported question types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    MultipleChoice,
    MultipleSelect,
    Matching,
    ShortAnswer,
    Essay,
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionKind::MultipleChoice => write!(f, "multiple_choice"),
            QuestionKind::MultipleSelect => write!(f, "multiple_select"),
            QuestionKind::Matching => write!(f, "matching"),
            QuestionKind::ShortAnswer => write!(f, "short_answer"),
            QuestionKind::Essay => write!(f, "essay"),
        }
    }
}

impl FromStr for QuestionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "multiple_choice" => Ok(QuestionKind::MultipleChoice),
            "multiple_select" | "multi_select" => Ok(QuestionKind::MultipleSelect),
            "matching" | "match" => Ok(QuestionKind::Matching),
            "short_answer" => Ok(QuestionKind::ShortAnswer),
            "essay" => Ok(QuestionKind::Essay),
            other => Err(format!("unknown question type: {other}")),
        }
    }
}

/// An authored question with its correct-answer data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Unique identifier within the exam.
    pub id: String,
    /// The text shown to the student.
    pub prompt: String,
    /// Maximum achievable score for this question.
    #[serde(default = "default_points")]
    pub points: u32,
    /// Type-specific correct-answer data.
    #[serde(flatten)]
    pub key: AnswerKey,
}

fn default_points() -> u32 {
    1
}

impl Question {
    /// The question type, derived from the answer key variant.
    pub fn kind(&self) -> QuestionKind {
        self.key.kind()
    }
}

/// Type-specific correct-answer data, tagged by question type.
///
/// Each variant carries only the fields valid for that type, so scorer
/// dispatch is exhaustive instead of relying on optional-field presence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "question_type", rename_all = "snake_case")]
pub enum AnswerKey {
    /// Exactly one option is expected to be correct.
    MultipleChoice { options: Vec<Choice> },
    /// Any number of options may be correct; partial credit applies.
    MultipleSelect { options: Vec<Choice> },
    /// Ordered (left, right) pairs the student must reproduce.
    Matching { pairs: Vec<MatchPair> },
    /// Accepted answer strings, checked in stored order.
    ShortAnswer { accepted: Vec<AcceptedAnswer> },
    /// No machine-checkable key; graded manually.
    Essay,
}

impl AnswerKey {
    pub fn kind(&self) -> QuestionKind {
        match self {
            AnswerKey::MultipleChoice { .. } => QuestionKind::MultipleChoice,
            AnswerKey::MultipleSelect { .. } => QuestionKind::MultipleSelect,
            AnswerKey::Matching { .. } => QuestionKind::Matching,
            AnswerKey::ShortAnswer { .. } => QuestionKind::ShortAnswer,
            AnswerKey::Essay => QuestionKind::Essay,
        }
    }
}

/// A selectable option on a choice question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    /// Unique identifier within the question. Order is irrelevant for grading.
    pub id: String,
    /// The text shown to the student.
    #[serde(default)]
    pub text: String,
    /// Whether selecting this option earns credit.
    #[serde(default)]
    pub is_correct: bool,
}

/// One correct (left, right) pair on a matching question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchPair {
    pub left: String,
    pub right: String,
}

/// One accepted answer string on a short-answer question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcceptedAnswer {
    pub text: String,
    #[serde(default)]
    pub is_case_sensitive: bool,
}

/// A student's submitted answer to one question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    /// The question this answer belongs to.
    pub question_id: String,
    /// The submitted payload. Exactly one shape per answer.
    #[serde(flatten)]
    pub response: Response,
}

/// The payload shape of a submitted answer, tagged by shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "response_type", rename_all = "snake_case")]
pub enum Response {
    /// Selected option ids (choice questions).
    Selection { selected: Vec<String> },
    /// Proposed left-item to right-item mapping (matching questions).
    Matching { matches: BTreeMap<String, String> },
    /// Free text (short answer and essay questions).
    Text { text: String },
}

/// One student's finished attempt at one exam — the unit a grading batch
/// operates on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub exam_id: String,
    pub student: String,
    pub submitted_at: DateTime<Utc>,
    #[serde(default)]
    pub answers: Vec<Answer>,
}

/// An authored exam package grouping questions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exam {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Pass threshold in percent over auto-gradable points, if the exam
    /// declares one.
    #[serde(default)]
    pub pass_percent: Option<f64>,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Exam {
    /// Look up a question by id.
    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }
}
