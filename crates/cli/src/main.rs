//! # delivtab-cli
//!
//! Command-line interface for the delivtab ingestion engine.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use delivtab_core::{
    BatchAggregator, Category, CategoryCounts, CountReport, EngineConfig, FileError, FileSkip,
    MetricReport,
};
use delivtab_sheet::CellValue;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// delivtab - delivery-operations export analysis
#[derive(Parser)]
#[command(name = "delivtab")]
#[command(author, version, about = "Count delivery tasks and extract last-mile metrics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Engine configuration file (YAML or JSON)
    #[arg(short = 'c', long = "config", value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Output format (table, json)
    #[arg(short = 'f', long = "format", default_value = "table", global = true)]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Count completed tasks per delivery-point category in delimited exports
    Count {
        #[arg(value_name = "FILES", required = true)]
        files: Vec<PathBuf>,
    },
    /// Extract the last-mile metric per site from workbooks
    Metric {
        #[arg(value_name = "FILES", required = true)]
        files: Vec<PathBuf>,
    },
}

/// Output format for reports.
#[derive(Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    /// JSON output
    Json,
    /// Human-readable output (default)
    #[default]
    Table,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => EngineConfig::from_path(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => EngineConfig::default(),
    };
    tracing::debug!(config = ?cli.config, sites = config.sites.len(), "configuration loaded");
    let batch = BatchAggregator::new(&config).context("Invalid engine configuration")?;

    match &cli.command {
        Command::Count { files } => {
            let report = batch.count_rows(files);
            print_count_report(&report, cli.format)
        }
        Command::Metric { files } => {
            let report = batch.extract_metric(files);
            print_metric_report(&report, cli.format)
        }
    }
}

/// Print a row-count report.
fn print_count_report(report: &CountReport, format: OutputFormat) -> Result<()> {
    if let OutputFormat::Json = format {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    for entry in &report.per_file {
        println!("{}", entry.file.bold());
        print_counts(&entry.counts);
    }
    println!("{}", "Totals:".cyan().bold());
    print_counts(&report.totals);

    print_problems(&report.errors, &report.skipped);
    Ok(())
}

fn print_counts(counts: &CategoryCounts) {
    println!("  {:<18}{}", "completed", counts.total_completed);
    for category in Category::ALL {
        println!("  {:<18}{}", category.as_str(), counts.get(category));
    }
    if counts.uncategorized > 0 {
        println!(
            "  {:<18}{}",
            "uncategorized".yellow(),
            counts.uncategorized
        );
    }
}

/// Print a metric-extraction report.
fn print_metric_report(report: &MetricReport, format: OutputFormat) -> Result<()> {
    if let OutputFormat::Json = format {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    for entry in &report.results {
        let partial = if entry.extraction.is_complete() {
            ""
        } else {
            " (partial)"
        };
        println!(
            "{} {}{}",
            entry.file.bold(),
            format!("[{}]", entry.extraction.sheet_name).dimmed(),
            partial.yellow()
        );
        for (site, value) in &entry.extraction.values {
            match value {
                Some(value) => println!("  {site:<18}{}", format_metric_value(value)),
                None => println!("  {site:<18}{}", "n/a".dimmed()),
            }
        }
    }

    print_problems(&report.errors, &report.skipped);
    Ok(())
}

fn print_problems(errors: &[FileError], skipped: &[FileSkip]) {
    for error in errors {
        println!("{} {}: {}", "Error:".red().bold(), error.file, error.error);
    }
    for skip in skipped {
        println!("{} {}: {}", "Skipped:".yellow(), skip.file, skip.reason);
    }
}

/// Format a metric value for display, without trailing zeros.
fn format_metric_value(value: &CellValue) -> String {
    match value {
        CellValue::Float(f) => trim_trailing_zeros(&format!("{f:.4}")),
        CellValue::String(s) if value.as_float().is_some() => trim_trailing_zeros(s.trim()),
        other => other.to_string(),
    }
}

/// `12.50` -> `12.5`, `3.0` -> `3`; integers and exponent forms are left alone.
fn trim_trailing_zeros(s: &str) -> String {
    if !s.contains('.') || s.contains(['e', 'E']) {
        return s.to_string();
    }
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}
