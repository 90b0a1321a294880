//! The `examgrade init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create example exam package
    std::fs::create_dir_all("exams")?;
    let exam_path = std::path::Path::new("exams/example.toml");
    if exam_path.exists() {
        println!("exams/example.toml already exists, skipping.");
    } else {
        std::fs::write(exam_path, EXAMPLE_EXAM)?;
        println!("Created exams/example.toml");
    }

    // Create example session
    std::fs::create_dir_all("sessions")?;
    let session_path = std::path::Path::new("sessions/example.json");
    if session_path.exists() {
        println!("sessions/example.json already exists, skipping.");
    } else {
        std::fs::write(session_path, EXAMPLE_SESSION)?;
        println!("Created sessions/example.json");
    }

    println!("\nNext steps:");
    println!("  1. Edit exams/example.toml with your questions");
    println!("  2. Run: examgrade validate --exam exams/example.toml");
    println!("  3. Run: examgrade grade --exam exams/example.toml --sessions sessions");

    Ok(())
}

const EXAMPLE_EXAM: &str = r#"[exam]
id = "example"
name = "Example Exam"
description = "A simple example exam to get started"
pass_percent = 60.0

[[questions]]
id = "capital_fr"
type = "multiple_choice"
prompt = "What is the capital of France?"
points = 2

[[questions.options]]
id = "a"
text = "Paris"
is_correct = true

[[questions.options]]
id = "b"
text = "Lyon"

[[questions.options]]
id = "c"
text = "Marseille"

[[questions]]
id = "primes"
type = "multiple_select"
prompt = "Which of these numbers are prime?"
points = 4

[[questions.options]]
id = "two"
text = "2"
is_correct = true

[[questions.options]]
id = "seven"
text = "7"
is_correct = true

[[questions.options]]
id = "nine"
text = "9"

[[questions]]
id = "capitals"
type = "matching"
prompt = "Match each country to its capital."
points = 6

[[questions.pairs]]
left = "France"
right = "Paris"

[[questions.pairs]]
left = "Italy"
right = "Rome"

[[questions.pairs]]
left = "Spain"
right = "Madrid"

[[questions]]
id = "longest_river"
type = "short_answer"
prompt = "Name the longest river in Europe."

[[questions.accepted]]
text = "volga"

[[questions.accepted]]
text = "the volga"

[[questions]]
id = "reflection"
type = "essay"
prompt = "Discuss how geography shapes trade."
points = 5
"#;

const EXAMPLE_SESSION: &str = r#"{
  "id": "example-session",
  "exam_id": "example",
  "student": "alice",
  "submitted_at": "2026-05-11T09:30:00Z",
  "answers": [
    { "question_id": "capital_fr", "response_type": "selection", "selected": ["a"] },
    { "question_id": "primes", "response_type": "selection", "selected": ["two", "seven"] },
    {
      "question_id": "capitals",
      "response_type": "matching",
      "matches": { "France": "Paris", "Italy": "Rome", "Spain": "Rome" }
    },
    { "question_id": "longest_river", "response_type": "text", "text": " Volga " },
    { "question_id": "reflection", "response_type": "text", "text": "Rivers carried trade." }
  ]
}
"#;
