//! Pure answer scoring.
//!
//! [`score`] maps one submitted answer plus its question's stored key to an
//! awarded point value and a grading status. It is deterministic, allocates
//! only small scratch sets, and never fails: malformed inputs degrade to a
//! zero score rather than an error so a batch can keep going.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::model::{AcceptedAnswer, Answer, AnswerKey, Choice, MatchPair, Question, Response};

/// How an answer was (or was not) graded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradeStatus {
    /// Auto-graded; the points value is authoritative.
    Graded,
    /// An essay awaiting manual review. The zero points value is a
    /// placeholder, not a score.
    PendingManual,
    /// The question reference was missing or its lookup failed.
    Ungraded,
}

/// The outcome of scoring one answer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreOutcome {
    /// Awarded points, in `0.0..=question.points`.
    pub points: f64,
    pub status: GradeStatus,
}

impl ScoreOutcome {
    pub fn graded(points: f64) -> Self {
        Self {
            points,
            status: GradeStatus::Graded,
        }
    }

    pub fn pending_manual() -> Self {
        Self {
            points: 0.0,
            status: GradeStatus::PendingManual,
        }
    }

    pub fn ungraded() -> Self {
        Self {
            points: 0.0,
            status: GradeStatus::Ungraded,
        }
    }
}

/// Score a submitted answer against its question.
///
/// Essays always come back as [`GradeStatus::PendingManual`] so the caller
/// can tell "not yet graded by a teacher" apart from an earned zero. A
/// payload of the wrong shape for the question type counts as selecting or
/// matching nothing and grades as zero.
pub fn score(answer: &Answer, question: &Question) -> ScoreOutcome {
    let max = question.points as f64;
    match &question.key {
        AnswerKey::Essay => ScoreOutcome::pending_manual(),
        AnswerKey::MultipleChoice { options } => ScoreOutcome::graded(score_multiple_choice(
            options,
            selected_ids(&answer.response),
            max,
        )),
        AnswerKey::MultipleSelect { options } => ScoreOutcome::graded(score_multiple_select(
            options,
            selected_ids(&answer.response),
            max,
        )),
        AnswerKey::Matching { pairs } => {
            ScoreOutcome::graded(score_matching(pairs, proposed_matches(&answer.response), max))
        }
        AnswerKey::ShortAnswer { accepted } => ScoreOutcome::graded(score_short_answer(
            accepted,
            submitted_text(&answer.response).unwrap_or(""),
            max,
        )),
    }
}

fn selected_ids(response: &Response) -> &[String] {
    match response {
        Response::Selection { selected } => selected,
        _ => &[],
    }
}

fn proposed_matches(response: &Response) -> Option<&BTreeMap<String, String>> {
    match response {
        Response::Matching { matches } => Some(matches),
        _ => None,
    }
}

fn submitted_text(response: &Response) -> Option<&str> {
    match response {
        Response::Text { text } => Some(text),
        _ => None,
    }
}

/// All-or-nothing: full points iff exactly one option is selected and it is
/// the correct one. A question with no correct option always scores zero.
fn score_multiple_choice(options: &[Choice], selected: &[String], max: f64) -> f64 {
    let [single] = selected else {
        return 0.0;
    };
    match options.iter().find(|o| o.is_correct) {
        Some(correct) if correct.id == *single => max,
        _ => 0.0,
    }
}

/// Symmetric partial credit: each incorrect selection cancels one correct
/// selection's credit, floored at zero. Duplicate ids in the submission
/// count once.
fn score_multiple_select(options: &[Choice], selected: &[String], max: f64) -> f64 {
    let correct: HashSet<&str> = options
        .iter()
        .filter(|o| o.is_correct)
        .map(|o| o.id.as_str())
        .collect();
    if correct.is_empty() {
        return 0.0;
    }

    let chosen: HashSet<&str> = selected.iter().map(String::as_str).collect();
    let hits = chosen.intersection(&correct).count() as f64;
    let misses = chosen.len() as f64 - hits;

    let fraction = ((hits - misses) / correct.len() as f64).max(0.0);
    fraction * max
}

/// Proportional credit per pair reproduced exactly (case-sensitive, no
/// trimming). Extraneous mappings neither add nor subtract credit, unlike
/// the multiple-select penalty.
fn score_matching(pairs: &[MatchPair], matches: Option<&BTreeMap<String, String>>, max: f64) -> f64 {
    if pairs.is_empty() {
        return 0.0;
    }
    let Some(matches) = matches else {
        return 0.0;
    };

    let hits = pairs
        .iter()
        .filter(|p| matches.get(&p.left).is_some_and(|right| *right == p.right))
        .count();

    hits as f64 / pairs.len() as f64 * max
}

/// First matching accepted answer wins, in stored order; no partial credit.
///
/// The submission is trimmed and lowercased before the case-sensitivity
/// flag is consulted: a case-sensitive key is compared against the folded
/// submission as-is, so a case-sensitive key containing an uppercase letter
/// can never match, while a lowercase-stored one matches any submitted
/// casing. `validate_exam` flags such keys at authoring time.
fn score_short_answer(accepted: &[AcceptedAnswer], text: &str, max: f64) -> f64 {
    let normalized = text.trim().to_lowercase();
    for key in accepted {
        let matched = if key.is_case_sensitive {
            normalized == key.text
        } else {
            normalized == key.text.to_lowercase()
        };
        if matched {
            return max;
        }
    }
    0.0
}
