//! TOML exam package parser.
//!
//! Loads exam packages from TOML files and directories, and validates them
//! for authoring mistakes.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{
    AcceptedAnswer, AnswerKey, Choice, Exam, MatchPair, Question, QuestionKind,
};

/// Intermediate TOML structure for parsing exam package files.
#[derive(Debug, Deserialize)]
struct TomlExamFile {
    exam: TomlExamHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlExamHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    pass_percent: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    prompt: String,
    #[serde(default = "default_points")]
    points: u32,
    #[serde(default)]
    options: Vec<TomlChoice>,
    #[serde(default)]
    pairs: Vec<TomlPair>,
    #[serde(default)]
    accepted: Vec<TomlAccepted>,
}

fn default_points() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
struct TomlChoice {
    id: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    is_correct: bool,
}

#[derive(Debug, Deserialize)]
struct TomlPair {
    left: String,
    right: String,
}

#[derive(Debug, Deserialize)]
struct TomlAccepted {
    text: String,
    #[serde(default)]
    is_case_sensitive: bool,
}

/// Parse a single TOML file into an `Exam`.
pub fn parse_exam(path: &Path) -> Result<Exam> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read exam file: {}", path.display()))?;

    parse_exam_str(&content, path)
}

/// Parse a TOML string into an `Exam` (useful for testing).
pub fn parse_exam_str(content: &str, source_path: &Path) -> Result<Exam> {
    let parsed: TomlExamFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let questions = parsed
        .questions
        .into_iter()
        .map(|q| {
            let kind: QuestionKind = q
                .kind
                .parse()
                .map_err(|e: String| anyhow::anyhow!("question {}: {}", q.id, e))?;

            let key = match kind {
                QuestionKind::MultipleChoice => AnswerKey::MultipleChoice {
                    options: convert_choices(q.options),
                },
                QuestionKind::MultipleSelect => AnswerKey::MultipleSelect {
                    options: convert_choices(q.options),
                },
                QuestionKind::Matching => AnswerKey::Matching {
                    pairs: q
                        .pairs
                        .into_iter()
                        .map(|p| MatchPair {
                            left: p.left,
                            right: p.right,
                        })
                        .collect(),
                },
                QuestionKind::ShortAnswer => AnswerKey::ShortAnswer {
                    accepted: q
                        .accepted
                        .into_iter()
                        .map(|a| AcceptedAnswer {
                            text: a.text,
                            is_case_sensitive: a.is_case_sensitive,
                        })
                        .collect(),
                },
                QuestionKind::Essay => AnswerKey::Essay,
            };

            Ok(Question {
                id: q.id,
                prompt: q.prompt,
                points: q.points,
                key,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Exam {
        id: parsed.exam.id,
        name: parsed.exam.name,
        description: parsed.exam.description,
        pass_percent: parsed.exam.pass_percent,
        questions,
    })
}

fn convert_choices(options: Vec<TomlChoice>) -> Vec<Choice> {
    options
        .into_iter()
        .map(|o| Choice {
            id: o.id,
            text: o.text,
            is_correct: o.is_correct,
        })
        .collect()
}

/// Recursively load all `.toml` exam files from a directory.
pub fn load_exam_directory(dir: &Path) -> Result<Vec<Exam>> {
    let mut exams = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            exams.extend(load_exam_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_exam(&path) {
                Ok(exam) => exams.push(exam),
                Err(e) => {
                    tracing::warn!("skipping {}: {}", path.display(), e);
                }
            }
        }
    }

    Ok(exams)
}

/// A warning from exam validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate an exam package for common authoring mistakes.
///
/// These are warnings, not errors: degenerate answer-key data is valid
/// authoring state and grades as zero.
pub fn validate_exam(exam: &Exam) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    let mut warn = |question_id: Option<&str>, message: String| {
        warnings.push(ValidationWarning {
            question_id: question_id.map(str::to_string),
            message,
        });
    };

    let mut seen_ids = std::collections::HashSet::new();
    for question in &exam.questions {
        if !seen_ids.insert(&question.id) {
            warn(
                Some(&question.id),
                format!("duplicate question ID: {}", question.id),
            );
        }

        if question.prompt.trim().is_empty() {
            warn(Some(&question.id), "prompt is empty".into());
        }

        if question.points == 0 {
            warn(Some(&question.id), "question is worth zero points".into());
        }

        match &question.key {
            AnswerKey::MultipleChoice { options } => {
                check_option_ids(&question.id, options, &mut warn);
                let correct = options.iter().filter(|o| o.is_correct).count();
                if correct != 1 {
                    warn(
                        Some(&question.id),
                        format!("has {correct} correct options, expected exactly 1"),
                    );
                }
            }
            AnswerKey::MultipleSelect { options } => {
                check_option_ids(&question.id, options, &mut warn);
                if !options.iter().any(|o| o.is_correct) {
                    warn(
                        Some(&question.id),
                        "has no correct options; every submission scores zero".into(),
                    );
                }
            }
            AnswerKey::Matching { pairs } => {
                if pairs.is_empty() {
                    warn(
                        Some(&question.id),
                        "has no pairs; every submission scores zero".into(),
                    );
                }
                let mut seen_left = std::collections::HashSet::new();
                for pair in pairs {
                    if !seen_left.insert(&pair.left) {
                        warn(
                            Some(&question.id),
                            format!("duplicate left item: {}", pair.left),
                        );
                    }
                }
            }
            AnswerKey::ShortAnswer { accepted } => {
                if accepted.is_empty() {
                    warn(
                        Some(&question.id),
                        "has no accepted answers; every submission scores zero".into(),
                    );
                }
                for answer in accepted {
                    if answer.is_case_sensitive && answer.text.chars().any(|c| c.is_uppercase()) {
                        warn(
                            Some(&question.id),
                            format!(
                                "case-sensitive accepted answer '{}' contains uppercase and can \
                                 never match a normalized submission",
                                answer.text
                            ),
                        );
                    }
                }
            }
            AnswerKey::Essay => {}
        }
    }

    warnings
}

fn check_option_ids(
    question_id: &str,
    options: &[Choice],
    warn: &mut impl FnMut(Option<&str>, String),
) {
    let mut seen = std::collections::HashSet::new();
    for option in options {
        if !seen.insert(&option.id) {
            warn(
                Some(question_id),
                format!("duplicate option ID: {}", option.id),
            );
        }
    }
}
