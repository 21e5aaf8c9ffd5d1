//! CLI command definitions for humaneval.
//!
//! `rate` runs the interactive terminal rating session; `scan` reports
//! what a session would evaluate without recording anything.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use crate::config::{EvalConfig, DEFAULT_RESULT_FILE};
use crate::recorder::{RecordError, MAX_SCORE, MIN_SCORE};
use crate::scanner::TaskScanner;
use crate::session::{EvalSession, SessionError, SessionState};
use crate::task::DatasetName;

/// Scoring guide shown to the rater before the first task.
const SCORE_GUIDE: &str =
    "1: Identity Lost | 2: Heavily Distorted | 3: Recognizable but Modded | 4: Minor Change | 5: Identity Preserved";

/// Human evaluation harness for generative model outputs.
#[derive(Parser)]
#[command(name = "humaneval")]
#[command(about = "Collect human semantic preservation ratings for generative model outputs")]
#[command(version)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,
}

/// Available CLI subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Run an interactive rating session in the terminal.
    Rate(RateArgs),

    /// Discover tasks and report discovery issues without rating anything.
    Scan(ScanArgs),
}

/// Arguments for `humaneval rate`.
#[derive(Parser, Debug)]
pub struct RateArgs {
    /// Root directory containing the dataset folders.
    #[arg(long, default_value = ".", env = "HUMANEVAL_ROOT")]
    pub root: PathBuf,

    /// Result CSV file ratings are appended to.
    #[arg(long, default_value = DEFAULT_RESULT_FILE, env = "HUMANEVAL_RESULT_FILE")]
    pub output: PathBuf,

    /// Fixed shuffle seed (omit for a fresh order each run).
    #[arg(long, env = "HUMANEVAL_SEED")]
    pub seed: Option<u64>,

    /// Comma-separated subset of datasets to scan (default: all).
    #[arg(long, value_delimiter = ',', env = "HUMANEVAL_DATASETS")]
    pub datasets: Option<Vec<DatasetName>>,
}

/// Arguments for `humaneval scan`.
#[derive(Parser, Debug)]
pub struct ScanArgs {
    /// Root directory containing the dataset folders.
    #[arg(long, default_value = ".", env = "HUMANEVAL_ROOT")]
    pub root: PathBuf,

    /// Comma-separated subset of datasets to scan (default: all).
    #[arg(long, value_delimiter = ',', env = "HUMANEVAL_DATASETS")]
    pub datasets: Option<Vec<DatasetName>>,

    /// Print the full scan report as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Parses command-line arguments.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Parses arguments and runs the selected command.
pub fn run() -> anyhow::Result<()> {
    run_with_cli(parse_cli())
}

/// Runs the selected command with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Rate(args) => run_rate_command(args),
        Commands::Scan(args) => run_scan_command(args),
    }
}

fn run_rate_command(args: RateArgs) -> anyhow::Result<()> {
    let config = EvalConfig {
        root_dir: args.root,
        datasets: args
            .datasets
            .unwrap_or_else(|| DatasetName::ALL.to_vec()),
        result_file: args.output,
        shuffle_seed: args.seed,
    };
    config.validate()?;

    let mut session =
        EvalSession::start(config).context("Failed to start evaluation session")?;

    for issue in session.issues() {
        println!("Warning: {}", issue);
    }

    if session.state() == SessionState::Empty {
        println!("Nothing to evaluate: no valid images found.");
        println!(
            "Expected dataset folders: {}",
            DatasetName::ALL.map(|d| d.as_str()).join(", ")
        );
        return Ok(());
    }

    println!("{}", SCORE_GUIDE);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    while let Some(task) = session.current_task().cloned() {
        let (completed, total) = session.progress();
        println!();
        println!(
            "Dataset: {} | Progress: {}/{}",
            task.dataset,
            completed + 1,
            total
        );
        println!("  reference:  {}", task.reference_path.display());
        println!("  comparison: {}", task.target_path.display());
        print!("Score [{}-{}], or q to quit: ", MIN_SCORE, MAX_SCORE);
        io::stdout().flush()?;

        // EOF ends the session like an explicit quit
        let Some(line) = lines.next() else { break };
        let line = line.context("Failed to read from stdin")?;
        let input = line.trim();

        if input.eq_ignore_ascii_case("q") || input.eq_ignore_ascii_case("quit") {
            break;
        }

        let Ok(score) = input.parse::<u8>() else {
            println!(
                "Please enter a whole number between {} and {}.",
                MIN_SCORE, MAX_SCORE
            );
            continue;
        };

        match session.submit(score) {
            Ok(SessionState::Complete) => {
                println!(
                    "Evaluation complete! Results saved to {}",
                    session.result_path().display()
                );
            }
            Ok(_) => {}
            Err(SessionError::Record(RecordError::InvalidScore { score })) => {
                println!(
                    "Score {} is out of range; please enter {} to {}.",
                    score, MIN_SCORE, MAX_SCORE
                );
            }
            Err(e) => return Err(e).context("Failed to record rating"),
        }
    }

    let (completed, total) = session.progress();
    println!(
        "Recorded {}/{} ratings to {}",
        completed,
        total,
        session.result_path().display()
    );
    Ok(())
}

fn run_scan_command(args: ScanArgs) -> anyhow::Result<()> {
    let datasets = args
        .datasets
        .unwrap_or_else(|| DatasetName::ALL.to_vec());
    let scanner = TaskScanner::new(args.root, datasets.clone());
    let report = scanner.scan().context("Task discovery failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Discovered {} task(s).", report.tasks.len());
    for dataset in &datasets {
        let count = report.tasks.iter().filter(|t| t.dataset == *dataset).count();
        if count > 0 {
            println!("  {}: {} task(s)", dataset, count);
        }
    }

    if !report.issues.is_empty() {
        println!("Issues:");
        for issue in &report.issues {
            println!("  - {}", issue);
        }
    }

    Ok(())
}
