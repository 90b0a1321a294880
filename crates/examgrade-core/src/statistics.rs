//! Per-session aggregate grading statistics.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::QuestionKind;
use crate::scorer::GradeStatus;
use crate::traits::GradeRecord;

/// Aggregate statistics for one graded session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    /// Points awarded across auto-graded answers.
    pub auto_awarded: f64,
    /// Points achievable across auto-graded answers.
    pub auto_possible: f64,
    /// `auto_awarded / auto_possible` in percent; zero when nothing was
    /// auto-gradable.
    pub auto_percent: f64,
    /// Answer counts per status.
    pub graded: usize,
    pub pending_manual: usize,
    pub ungraded: usize,
    /// Points awaiting manual review (essays). Surfaced separately so
    /// pending work is never silently folded into the auto totals.
    pub pending_possible: f64,
    /// Per-question-type breakdown.
    pub per_kind: HashMap<QuestionKind, KindStats>,
    /// Whether the auto-graded portion meets the exam's pass threshold.
    /// `None` when the exam declares no threshold.
    pub passed: Option<bool>,
}

/// Awarded/possible totals for one question type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KindStats {
    pub count: usize,
    pub awarded: f64,
    pub possible: f64,
}

/// Compute session statistics from the per-answer records of one batch.
pub fn compute_session_stats(records: &[GradeRecord], pass_percent: Option<f64>) -> SessionStats {
    let mut stats = SessionStats {
        auto_awarded: 0.0,
        auto_possible: 0.0,
        auto_percent: 0.0,
        graded: 0,
        pending_manual: 0,
        ungraded: 0,
        pending_possible: 0.0,
        per_kind: HashMap::new(),
        passed: None,
    };

    for record in records {
        match record.status {
            GradeStatus::Graded => {
                stats.graded += 1;
                stats.auto_awarded += record.points_awarded;
                stats.auto_possible += record.points_possible as f64;
            }
            GradeStatus::PendingManual => {
                stats.pending_manual += 1;
                stats.pending_possible += record.points_possible as f64;
            }
            GradeStatus::Ungraded => {
                stats.ungraded += 1;
            }
        }

        if let Some(kind) = record.kind {
            let entry = stats.per_kind.entry(kind).or_default();
            entry.count += 1;
            entry.awarded += record.points_awarded;
            entry.possible += record.points_possible as f64;
        }
    }

    if stats.auto_possible > 0.0 {
        stats.auto_percent = stats.auto_awarded / stats.auto_possible * 100.0;
    }
    stats.passed = pass_percent.map(|threshold| stats.auto_percent >= threshold);

    stats
}
