//! Session grading reports with JSON persistence and regrade comparison.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::statistics::SessionStats;
use crate::traits::GradeRecord;

/// The full outcome of grading one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the batch ran.
    pub created_at: DateTime<Utc>,
    /// Summary of the graded session.
    pub session: SessionSummary,
    /// Per-answer outcomes, in submission order.
    pub records: Vec<GradeRecord>,
    /// Aggregate statistics.
    pub stats: SessionStats,
    /// Wall-clock duration of the batch in milliseconds.
    pub duration_ms: u64,
}

/// Summary of a session (without the full answer payloads).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: String,
    pub exam_id: String,
    pub student: String,
    pub submitted_at: DateTime<Utc>,
    pub answer_count: usize,
}

impl SessionReport {
    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: SessionReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Format the report as a markdown summary.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "# Session {} — {}\n\n",
            self.session.id, self.session.student
        ));
        md.push_str(&format!(
            "Auto score: **{:.1} / {:.1}** ({:.1}%)",
            self.stats.auto_awarded, self.stats.auto_possible, self.stats.auto_percent
        ));
        if let Some(passed) = self.stats.passed {
            md.push_str(if passed { " — PASSED" } else { " — FAILED" });
        }
        md.push_str("\n\n");

        if self.stats.pending_manual > 0 {
            md.push_str(&format!(
                "{} answer(s) worth {:.1} point(s) awaiting manual review.\n\n",
                self.stats.pending_manual, self.stats.pending_possible
            ));
        }
        if self.stats.ungraded > 0 {
            md.push_str(&format!(
                "{} answer(s) could not be graded (broken question reference).\n\n",
                self.stats.ungraded
            ));
        }

        md.push_str("| Question | Type | Awarded | Possible | Status |\n");
        md.push_str("|----------|------|---------|----------|--------|\n");
        for record in &self.records {
            let kind = record
                .kind
                .map(|k| k.to_string())
                .unwrap_or_else(|| "?".to_string());
            md.push_str(&format!(
                "| {} | {} | {:.1} | {} | {:?} |\n",
                record.question_id, kind, record.points_awarded, record.points_possible,
                record.status
            ));
        }

        md
    }

    /// Compare this report against a baseline run of the same session,
    /// detecting per-question score deltas (e.g. after an answer-key fix).
    pub fn compare(&self, baseline: &SessionReport, threshold: f64) -> RegradeReport {
        use std::collections::HashMap;

        let score_map = |report: &SessionReport| -> HashMap<String, f64> {
            report
                .records
                .iter()
                .map(|r| (r.question_id.clone(), r.points_awarded))
                .collect()
        };

        let baseline_scores = score_map(baseline);
        let current_scores = score_map(self);

        let mut decreases = Vec::new();
        let mut increases = Vec::new();
        let mut unchanged = 0usize;
        let mut new_questions = 0usize;

        for record in &self.records {
            let current = record.points_awarded;
            if let Some(&baseline_val) = baseline_scores.get(&record.question_id) {
                let delta = current - baseline_val;
                if delta < -threshold {
                    decreases.push(ScoreChange {
                        question_id: record.question_id.clone(),
                        baseline_points: baseline_val,
                        current_points: current,
                        delta,
                    });
                } else if delta > threshold {
                    increases.push(ScoreChange {
                        question_id: record.question_id.clone(),
                        baseline_points: baseline_val,
                        current_points: current,
                        delta,
                    });
                } else {
                    unchanged += 1;
                }
            } else {
                new_questions += 1;
            }
        }

        let removed_questions = baseline_scores
            .keys()
            .filter(|id| !current_scores.contains_key(*id))
            .count();

        RegradeReport {
            decreases,
            increases,
            unchanged,
            new_questions,
            removed_questions,
        }
    }
}

/// Result of comparing two grading runs of the same session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegradeReport {
    /// Questions where the awarded score went down.
    pub decreases: Vec<ScoreChange>,
    /// Questions where the awarded score went up.
    pub increases: Vec<ScoreChange>,
    /// Questions with no significant change.
    pub unchanged: usize,
    /// Questions in current but not baseline.
    pub new_questions: usize,
    /// Questions in baseline but not current.
    pub removed_questions: usize,
}

/// A detected per-question score delta.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreChange {
    pub question_id: String,
    pub baseline_points: f64,
    pub current_points: f64,
    pub delta: f64,
}

impl RegradeReport {
    /// Format the regrade report as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "**Summary:** {} decreases, {} increases, {} unchanged\n\n",
            self.decreases.len(),
            self.increases.len(),
            self.unchanged
        ));

        if !self.decreases.is_empty() {
            md.push_str("### Decreases\n\n");
            md.push_str("| Question | Baseline | Current | Delta |\n");
            md.push_str("|----------|----------|---------|-------|\n");
            for c in &self.decreases {
                md.push_str(&format!(
                    "| {} | {:.1} | {:.1} | {:.1} |\n",
                    c.question_id, c.baseline_points, c.current_points, c.delta
                ));
            }
            md.push('\n');
        }

        if !self.increases.is_empty() {
            md.push_str("### Increases\n\n");
            md.push_str("| Question | Baseline | Current | Delta |\n");
            md.push_str("|----------|----------|---------|-------|\n");
            for c in &self.increases {
                md.push_str(&format!(
                    "| {} | {:.1} | {:.1} | +{:.1} |\n",
                    c.question_id, c.baseline_points, c.current_points, c.delta
                ));
            }
        }

        md
    }

    /// Returns true if any score moved past the threshold.
    pub fn has_changes(&self) -> bool {
        !self.decreases.is_empty() || !self.increases.is_empty()
    }
}
