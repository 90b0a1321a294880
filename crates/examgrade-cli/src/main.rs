//! examgrade CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "examgrade", version, about = "Computer-based exam auto-grading toolkit")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade finished sessions against an exam package
    Grade {
        /// Path to a .toml exam package or a directory of them
        #[arg(long)]
        exam: PathBuf,

        /// Path to a session .json file or a directory of them
        #[arg(long)]
        sessions: PathBuf,

        /// Grade only this session id
        #[arg(long)]
        session: Option<String>,

        /// Max answers scored concurrently per session
        #[arg(long, default_value = "4")]
        parallelism: usize,

        /// Output directory for reports
        #[arg(long, default_value = "./examgrade-results")]
        output: PathBuf,

        /// Output format: json, markdown, all
        #[arg(long, default_value = "json")]
        format: String,
    },

    /// Validate exam package TOML files
    Validate {
        /// Path to an exam file or directory
        #[arg(long)]
        exam: PathBuf,
    },

    /// Compare two grading reports of the same session
    Compare {
        /// Baseline report JSON
        #[arg(long)]
        baseline: PathBuf,

        /// Current report JSON
        #[arg(long)]
        current: PathBuf,

        /// Minimum point delta to count as a change
        #[arg(long, default_value = "0.01")]
        threshold: f64,

        /// Exit code 1 if any score changed
        #[arg(long)]
        fail_on_change: bool,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Create a starter exam package and example session
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("examgrade=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Grade {
            exam,
            sessions,
            session,
            parallelism,
            output,
            format,
        } => commands::grade::execute(exam, sessions, session, parallelism, output, format).await,
        Commands::Validate { exam } => commands::validate::execute(exam),
        Commands::Compare {
            baseline,
            current,
            threshold,
            fail_on_change,
            format,
        } => commands::compare::execute(baseline, current, threshold, fail_on_change, format),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
