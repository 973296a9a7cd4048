use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use serde::Serialize;
use std::fs;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use tune_patcher::config;
use tune_patcher::{BatchSummary, Mode, Repository, Rounding, Tuner, WriteMode};

#[derive(Parser)]
#[command(name = "tune-patcher")]
#[command(about = "Write tuned values back into C++ initializers", long_about = None)]
#[command(version)]
struct Cli {
    /// Log level (RUST_LOG takes precedence when set)
    #[arg(short, long, global = true, value_enum, default_value_t = LogLevel::Warning)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Set elements to tuned values: `param: <name>[<indices>], best: <new>, start: <old>`
    Spsa(RunArgs),

    /// Apply a formula to every literal of a definition: `<name> ; <formula in x>`
    Function(RunArgs),

    /// Align the columns of a definition: `<name>`
    Align(RunArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Directory containing the sources to patch
    #[arg(short, long)]
    src_dir: PathBuf,

    /// Read requests from this file instead of stdin
    #[arg(short, long)]
    input_file: Option<PathBuf>,

    /// Print a diff instead of writing files
    #[arg(short, long, conflicts_with = "low_memory")]
    dry_run: bool,

    /// Write every change to disk immediately instead of buffering
    #[arg(long)]
    low_memory: bool,

    /// Rounding applied to new values
    #[arg(short, long, value_enum, default_value_t = Rounding::Round)]
    rounding: Rounding,

    /// Configuration file (default: <src-dir>/tune-patcher.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    fn directive(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Serialize)]
struct Report {
    #[serde(flatten)]
    summary: BatchSummary,
    files_written: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    diff: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level)?;

    let (mode, args) = match cli.command {
        Commands::Spsa(args) => (Mode::Spsa, args),
        Commands::Function(args) => (Mode::Function, args),
        Commands::Align(args) => (Mode::Align, args),
    };

    let report = cmd_run(mode, &args)?;
    print_report(&report, args.json)?;

    if report.summary.failed > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn init_logging(level: LogLevel) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.directive()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .try_init()
        .map_err(|e| anyhow!("failed to initialize logging: {}", e))
}

fn cmd_run(mode: Mode, args: &RunArgs) -> Result<Report> {
    // 1. Configuration and sources
    let config = config::resolve(args.config.as_deref(), &args.src_dir)?;
    let write_mode = if args.low_memory {
        WriteMode::WriteThrough
    } else {
        WriteMode::InMemory
    };
    let repo = Repository::open(&args.src_dir, write_mode, &config.sources)
        .with_context(|| format!("failed to load sources from {}", args.src_dir.display()))?;
    if repo.is_empty() {
        anyhow::bail!(
            "no source files with extensions {:?} found in {}",
            config.sources.extensions,
            args.src_dir.display()
        );
    }

    // 2. Requests
    let lines = match &args.input_file {
        Some(path) => read_input_file(path)?,
        None => read_interactive(mode)?,
    };

    // 3. Apply
    let mut tuner = Tuner::new(repo, config, args.rounding);
    let summary = tuner.run(mode, &lines);
    let repo = tuner.into_repository();

    // 4. Show or persist
    if args.dry_run {
        return Ok(Report {
            summary,
            files_written: 0,
            diff: Some(repo.diff()?),
        });
    }

    let files_written = match write_mode {
        WriteMode::InMemory => repo.save()?,
        WriteMode::WriteThrough => 0,
    };
    Ok(Report {
        summary,
        files_written,
        diff: None,
    })
}

fn read_input_file(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read input file {}", path.display()))?;
    Ok(content.lines().map(str::to_string).collect())
}

/// Read lines from stdin until an empty line or EOF.
fn read_interactive(mode: Mode) -> Result<Vec<String>> {
    eprintln!("{}", mode.help_text());

    let mut lines = Vec::new();
    for line in io::stdin().lock().lines() {
        let line = line.context("failed to read from stdin")?;
        if line.trim().is_empty() {
            break;
        }
        lines.push(line);
    }
    Ok(lines)
}

fn print_report(report: &Report, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    if let Some(diff) = &report.diff {
        if diff.is_empty() {
            println!("{}", "No changes.".dimmed());
        } else {
            display_diff(diff);
        }
    }

    let summary = &report.summary;
    println!();
    println!("{}", "Summary:".bold());
    println!("  {} applied", format!("{}", summary.applied).green());
    println!("  {} invalid", format!("{}", summary.invalid).yellow());
    println!("  {} failed", format!("{}", summary.failed).red());
    if report.diff.is_none() {
        println!("  {} files written", format!("{}", report.files_written).cyan());
    }

    Ok(())
}

/// Print a unified diff with colored change lines.
fn display_diff(diff: &str) {
    for line in diff.lines() {
        let styled = if line.starts_with("---") || line.starts_with("+++") || line.starts_with("@@")
        {
            line.dimmed()
        } else if line.starts_with('-') {
            line.red()
        } else if line.starts_with('+') {
            line.green()
        } else {
            line.normal()
        };
        println!("{}", styled);
    }
}
