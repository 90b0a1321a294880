//! The `examgrade compare` command.

use std::path::PathBuf;

use anyhow::Result;

use examgrade_core::report::SessionReport;

pub fn execute(
    baseline_path: PathBuf,
    current_path: PathBuf,
    threshold: f64,
    fail_on_change: bool,
    format: String,
) -> Result<()> {
    let baseline = SessionReport::load_json(&baseline_path)?;
    let current = SessionReport::load_json(&current_path)?;

    let report = current.compare(&baseline, threshold);

    match format.as_str() {
        "markdown" | "md" => {
            println!("{}", report.to_markdown());
        }
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => {
            // text format
            println!(
                "Comparison: {} decreases, {} increases, {} unchanged",
                report.decreases.len(),
                report.increases.len(),
                report.unchanged
            );

            if !report.decreases.is_empty() {
                println!("\nDecreases:");
                for c in &report.decreases {
                    println!(
                        "  {} {:.1} -> {:.1} ({:+.1})",
                        c.question_id, c.baseline_points, c.current_points, c.delta
                    );
                }
            }

            if !report.increases.is_empty() {
                println!("\nIncreases:");
                for c in &report.increases {
                    println!(
                        "  {} {:.1} -> {:.1} (+{:.1})",
                        c.question_id, c.baseline_points, c.current_points, c.delta
                    );
                }
            }

            if report.new_questions > 0 {
                println!("\n{} new question(s)", report.new_questions);
            }
            if report.removed_questions > 0 {
                println!("{} removed question(s)", report.removed_questions);
            }
        }
    }

    if fail_on_change && report.has_changes() {
        std::process::exit(1);
    }

    Ok(())
}
