//! # sheetsync-cli
//!
//! Command-line interface for sheetsync.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use sheetsync_core::{driver, RunOptions, SyncConfig, SyncReport, UpdateTarget};
use sheetsync_sheet::Book;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// sheetsync - declarative spreadsheet-to-spreadsheet sync
#[derive(Parser)]
#[command(name = "sheetsync")]
#[command(author, version, about = "Sync cells between spreadsheets with declarative lookup rules", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Load and validate a config file
    Check {
        /// Sync config (YAML, or JSON with a .json extension)
        #[arg(short, long, value_name = "FILE")]
        config: PathBuf,
    },
    /// Run a config against XLSX workbooks
    Run(RunArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Sync config (YAML, or JSON with a .json extension)
    #[arg(short, long, value_name = "FILE")]
    config: PathBuf,

    /// Workbook holding the source sheets
    #[arg(short, long, value_name = "XLSX")]
    source: PathBuf,

    /// Workbook holding the target sheets; defaults to the source workbook
    #[arg(short, long, value_name = "XLSX")]
    target: Option<PathBuf>,

    /// Where to save the updated workbook; defaults to overwriting it, which
    /// keeps cell values only
    #[arg(short, long, value_name = "XLSX")]
    output: Option<PathBuf>,

    /// Run without saving anything
    #[arg(long)]
    dry_run: bool,

    /// Record failing rules and continue with the next one
    #[arg(long)]
    keep_going: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Check { config } => check(&config),
        Command::Run(args) => {
            let report = run(&args)?;
            print_summary(&report);
            if !report.is_success() {
                bail!("{} rule(s) failed", report.failures.len());
            }
            Ok(())
        }
    }
}

/// Load a config file and reject it if it does not validate.
fn load_config(path: &Path) -> Result<SyncConfig> {
    let config = SyncConfig::from_path(path)
        .with_context(|| format!("Failed to load config: {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("Invalid config: {}", path.display()))?;
    Ok(config)
}

fn check(path: &Path) -> Result<()> {
    let config = load_config(path)?;
    println!(
        "{} {} ({} rule(s))",
        "OK".green().bold(),
        path.display(),
        config.update_target.len()
    );
    for (index, rule) in config.update_target.iter().enumerate() {
        println!("  {}", describe_rule(index, rule));
    }
    Ok(())
}

/// One-line summary of a rule.
fn describe_rule(index: usize, rule: &UpdateTarget) -> String {
    let end = rule
        .target
        .end_row
        .map_or_else(|| "last".to_string(), |end| end.to_string());
    format!(
        "update_target[{index}]: {} -> {}, rows {}..={end}, {} update column(s)",
        rule.source.sheet,
        rule.target.sheet,
        rule.target.start_row,
        rule.target.update_columns.len()
    )
}

/// Run the config and save the updated workbook unless this is a dry run.
///
/// With `--keep-going`, partial results are saved even when rules failed.
fn run(args: &RunArgs) -> Result<SyncReport> {
    let config = load_config(&args.config)?;
    let options = if args.keep_going {
        RunOptions::keep_going()
    } else {
        RunOptions::default()
    };

    let source = Book::from_xlsx(&args.source)
        .with_context(|| format!("Failed to read workbook: {}", args.source.display()))?;

    let (report, updated, default_output) = match &args.target {
        Some(target_path) => {
            let mut target = Book::from_xlsx(target_path)
                .with_context(|| format!("Failed to read workbook: {}", target_path.display()))?;
            let report = driver::run_linked_with_options(&config, &source, &mut target, options)?;
            (report, target, target_path)
        }
        None => {
            let mut book = source;
            let report = driver::run_with_options(&config, &mut book, options)?;
            (report, book, &args.source)
        }
    };

    if args.dry_run {
        tracing::info!("dry run, nothing saved");
    } else {
        let output = args.output.as_ref().unwrap_or(default_output);
        if overwrites_input(args, output) {
            tracing::warn!(
                "overwriting {}: only cell values are kept, formulas and formatting are lost",
                output.display()
            );
        }
        updated
            .save_as_xlsx(output)
            .with_context(|| format!("Failed to write workbook: {}", output.display()))?;
        tracing::info!("saved {}", output.display());
    }

    Ok(report)
}

/// Whether saving to `output` replaces one of the workbooks that was read.
fn overwrites_input(args: &RunArgs, output: &Path) -> bool {
    output == args.source || args.target.as_deref() == Some(output)
}

fn print_summary(report: &SyncReport) {
    for rule in &report.rules {
        println!(
            "{} update_target[{}]: {} -> {}, rows {}..={}, {} cell(s) written",
            "ok".green(),
            rule.rule,
            rule.source_sheet,
            rule.target_sheet,
            rule.rows.0,
            rule.rows.1,
            rule.cells_written
        );
    }
    for failure in &report.failures {
        println!("{} {failure}", "failed".red().bold());
    }

    let total = format!("{} cell(s) written", report.cells_written());
    if report.is_success() {
        println!("{}", total.green().bold());
    } else {
        let failed = format!("{} rule(s) failed", report.failures.len());
        println!("{}, {}", total.yellow(), failed.red());
    }
}
