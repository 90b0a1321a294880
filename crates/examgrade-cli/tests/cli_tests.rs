//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn examgrade() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("examgrade").unwrap()
}

#[test]
fn validate_valid_exam() {
    examgrade()
        .arg("validate")
        .arg("--exam")
        .arg("../../exams/geography.toml")
        .assert()
        .success()
        .stdout(predicate::str::contains("5 questions"))
        .stdout(predicate::str::contains("All exam packages valid"));
}

#[test]
fn validate_biology_exam() {
    examgrade()
        .arg("validate")
        .arg("--exam")
        .arg("../../exams/biology.toml")
        .assert()
        .success()
        .stdout(predicate::str::contains("3 questions"));
}

#[test]
fn validate_directory() {
    examgrade()
        .arg("validate")
        .arg("--exam")
        .arg("../../exams")
        .assert()
        .success()
        .stdout(predicate::str::contains("Geography Basics"))
        .stdout(predicate::str::contains("Cell Biology"));
}

#[test]
fn validate_warns_about_unmatchable_key() {
    let dir = TempDir::new().unwrap();
    let exam = r#"
[exam]
id = "quirk"
name = "Quirk"

[[questions]]
id = "q1"
type = "short_answer"
prompt = "Capital of France?"

[[questions.accepted]]
text = "Paris"
is_case_sensitive = true
"#;
    let path = dir.path().join("quirk.toml");
    std::fs::write(&path, exam).unwrap();

    examgrade()
        .arg("validate")
        .arg("--exam")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("never match"))
        .stdout(predicate::str::contains("1 warning(s) found"));
}

#[test]
fn validate_nonexistent_file() {
    examgrade()
        .arg("validate")
        .arg("--exam")
        .arg("nonexistent.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn grade_sessions_end_to_end() {
    let out = TempDir::new().unwrap();

    examgrade()
        .arg("grade")
        .arg("--exam")
        .arg("../../exams/geography.toml")
        .arg("--sessions")
        .arg("../../sessions")
        .arg("--output")
        .arg(out.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Grading 2 session(s)"))
        .stderr(predicate::str::contains("pending manual"));

    let reports: Vec<_> = std::fs::read_dir(out.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
        .collect();
    assert_eq!(reports.len(), 2, "one JSON report per session");
}

#[test]
fn grade_single_session_filter() {
    let out = TempDir::new().unwrap();

    examgrade()
        .arg("grade")
        .arg("--exam")
        .arg("../../exams/geography.toml")
        .arg("--sessions")
        .arg("../../sessions")
        .arg("--session")
        .arg("s-alice")
        .arg("--output")
        .arg(out.path())
        .arg("--format")
        .arg("all")
        .assert()
        .success()
        .stderr(predicate::str::contains("Grading 1 session(s)"));

    let names: Vec<String> = std::fs::read_dir(out.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    assert!(names.iter().any(|n| n.contains("s-alice") && n.ends_with(".json")));
    assert!(names.iter().any(|n| n.contains("s-alice") && n.ends_with(".md")));
    assert!(!names.iter().any(|n| n.contains("s-bob")));
}

#[test]
fn grade_unknown_session_fails() {
    let out = TempDir::new().unwrap();

    examgrade()
        .arg("grade")
        .arg("--exam")
        .arg("../../exams/geography.toml")
        .arg("--sessions")
        .arg("../../sessions")
        .arg("--session")
        .arg("s-nobody")
        .arg("--output")
        .arg(out.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    examgrade()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created exams/example.toml"))
        .stdout(predicate::str::contains("Created sessions/example.json"));

    assert!(dir.path().join("exams/example.toml").exists());
    assert!(dir.path().join("sessions/example.json").exists());
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    // First init
    examgrade()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();

    // Second init should skip
    examgrade()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn init_output_validates_and_grades() {
    let dir = TempDir::new().unwrap();

    examgrade()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();

    examgrade()
        .current_dir(dir.path())
        .arg("validate")
        .arg("--exam")
        .arg("exams/example.toml")
        .assert()
        .success()
        .stdout(predicate::str::contains("All exam packages valid"));

    examgrade()
        .current_dir(dir.path())
        .arg("grade")
        .arg("--exam")
        .arg("exams/example.toml")
        .arg("--sessions")
        .arg("sessions")
        .arg("--output")
        .arg("results")
        .assert()
        .success();
}

#[test]
fn compare_reports() {
    let dir = TempDir::new().unwrap();

    let baseline = make_test_report("capital_fr", 2.0);
    let current = make_test_report("capital_fr", 0.0);

    let baseline_path = dir.path().join("baseline.json");
    let current_path = dir.path().join("current.json");

    std::fs::write(&baseline_path, &baseline).unwrap();
    std::fs::write(&current_path, &current).unwrap();

    examgrade()
        .arg("compare")
        .arg("--baseline")
        .arg(&baseline_path)
        .arg("--current")
        .arg(&current_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("decrease"));
}

#[test]
fn compare_fail_on_change_exits_nonzero() {
    let dir = TempDir::new().unwrap();

    let baseline_path = dir.path().join("baseline.json");
    let current_path = dir.path().join("current.json");
    std::fs::write(&baseline_path, make_test_report("capital_fr", 2.0)).unwrap();
    std::fs::write(&current_path, make_test_report("capital_fr", 0.0)).unwrap();

    examgrade()
        .arg("compare")
        .arg("--baseline")
        .arg(&baseline_path)
        .arg("--current")
        .arg(&current_path)
        .arg("--fail-on-change")
        .assert()
        .failure();
}

#[test]
fn compare_nonexistent_report() {
    examgrade()
        .arg("compare")
        .arg("--baseline")
        .arg("no_such_file.json")
        .arg("--current")
        .arg("also_no_file.json")
        .assert()
        .failure();
}

#[test]
fn help_output() {
    examgrade()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("exam auto-grading toolkit"));
}

#[test]
fn version_output() {
    examgrade()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("examgrade"));
}

/// Create a minimal valid JSON session report for testing.
fn make_test_report(question_id: &str, awarded: f64) -> String {
    format!(
        r#"{{
    "id": "00000000-0000-0000-0000-000000000000",
    "created_at": "2026-05-11T10:00:00Z",
    "session": {{
        "id": "s-alice",
        "exam_id": "geo-101",
        "student": "alice",
        "submitted_at": "2026-05-11T09:30:00Z",
        "answer_count": 1
    }},
    "records": [{{
        "question_id": "{question_id}",
        "kind": "multiple_choice",
        "points_awarded": {awarded},
        "points_possible": 2,
        "status": "graded",
        "is_auto_graded": true
    }}],
    "stats": {{
        "auto_awarded": {awarded},
        "auto_possible": 2.0,
        "auto_percent": 0.0,
        "graded": 1,
        "pending_manual": 0,
        "ungraded": 0,
        "pending_possible": 0.0,
        "per_kind": {{}},
        "passed": null
    }},
    "duration_ms": 10
}}"#
    )
}
