//! The `examgrade grade` command.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use examgrade_core::engine::{GradeEngine, GradeEngineConfig, ProgressReporter};
use examgrade_core::parser;
use examgrade_core::report::SessionReport;
use examgrade_core::traits::{GradeRecord, NullSink};
use examgrade_store::{load_sessions, FileStore};

/// Console progress reporter.
struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn on_answer_graded(&self, question_id: &str, record: &GradeRecord) {
        eprintln!(
            "  Graded: {question_id} {:.1}/{}",
            record.points_awarded, record.points_possible
        );
    }

    fn on_answer_skipped(&self, question_id: &str, reason: &str) {
        eprintln!("  Skipped: {question_id} ({reason})");
    }

    fn on_session_complete(
        &self,
        session_id: &str,
        graded: usize,
        pending: usize,
        ungraded: usize,
        elapsed: Duration,
    ) {
        eprintln!(
            "\nSession {session_id}: {graded} graded, {pending} pending manual, \
             {ungraded} ungraded ({:.2}s)",
            elapsed.as_secs_f64()
        );
    }
}

pub async fn execute(
    exam_path: PathBuf,
    sessions_path: PathBuf,
    only_session: Option<String>,
    parallelism: usize,
    output: PathBuf,
    format: String,
) -> Result<()> {
    anyhow::ensure!(parallelism >= 1, "parallelism must be at least 1");

    let exams = if exam_path.is_dir() {
        parser::load_exam_directory(&exam_path)?
    } else {
        vec![parser::parse_exam(&exam_path)?]
    };
    anyhow::ensure!(!exams.is_empty(), "no exam packages found");

    let mut sessions = load_sessions(&sessions_path)?;
    if let Some(id) = &only_session {
        sessions.retain(|s| s.id == *id);
        anyhow::ensure!(!sessions.is_empty(), "session '{}' not found", id);
    }
    anyhow::ensure!(!sessions.is_empty(), "no sessions found");

    let pass_percents: HashMap<String, Option<f64>> = exams
        .iter()
        .map(|e| (e.id.clone(), e.pass_percent))
        .collect();
    let exam_ids: HashMap<String, String> = sessions
        .iter()
        .map(|s| (s.id.clone(), s.exam_id.clone()))
        .collect();

    let store = Arc::new(FileStore::new(&exams, sessions));
    let engine = GradeEngine::new(
        store.clone(),
        store.clone(),
        Arc::new(NullSink),
        GradeEngineConfig { parallelism },
    );
    let reporter = ConsoleReporter;

    let session_ids = store.session_ids();
    eprintln!(
        "examgrade v0.1.0 — Grading {} session(s) against {} exam package(s)",
        session_ids.len(),
        exams.len()
    );
    eprintln!();

    std::fs::create_dir_all(&output)?;
    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");

    for session_id in &session_ids {
        let pass_percent = exam_ids
            .get(session_id)
            .and_then(|exam_id| pass_percents.get(exam_id).copied())
            .unwrap_or_else(|| {
                tracing::warn!("session {session_id} references an unknown exam");
                None
            });

        let report = engine
            .grade_session(session_id, pass_percent, &reporter)
            .await?;

        print_summary(&report);

        let formats: Vec<&str> = if format == "all" {
            vec!["json", "markdown"]
        } else {
            format.split(',').collect()
        };

        for fmt in &formats {
            match *fmt {
                "json" => {
                    let path = output.join(format!("report-{session_id}-{timestamp}.json"));
                    report.save_json(&path)?;
                    eprintln!("Report saved to: {}", path.display());
                }
                "markdown" | "md" => {
                    let path = output.join(format!("report-{session_id}-{timestamp}.md"));
                    std::fs::write(&path, report.to_markdown())?;
                    eprintln!("Markdown report: {}", path.display());
                }
                _ => {
                    eprintln!("Unknown format: {fmt}");
                }
            }
        }
    }

    Ok(())
}

fn print_summary(report: &SessionReport) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec![
        "Student",
        "Auto score",
        "Percent",
        "Pending",
        "Ungraded",
        "Result",
    ]);

    let result = match report.stats.passed {
        Some(true) => "PASS".to_string(),
        Some(false) => "FAIL".to_string(),
        None => "-".to_string(),
    };
    table.add_row(vec![
        Cell::new(&report.session.student),
        Cell::new(format!(
            "{:.1}/{:.1}",
            report.stats.auto_awarded, report.stats.auto_possible
        )),
        Cell::new(format!("{:.1}%", report.stats.auto_percent)),
        Cell::new(report.stats.pending_manual),
        Cell::new(report.stats.ungraded),
        Cell::new(result),
    ]);

    eprintln!("\n{table}");
}
