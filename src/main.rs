// Copyright (c) 2026 SafeCheck. All rights reserved.
// This software is proprietary and confidential.

/**
 * SafeCheck - Website Health Scanner
 * Standalone CLI: runs the full check battery against one target and
 * prints the scored scan report as JSON
 *
 * @copyright 2026 SafeCheck
 * @license Proprietary
 */

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, Level};

use safecheck_scanner::categorization;
use safecheck_scanner::config::ScannerConfig;
use safecheck_scanner::report::build_report;
use safecheck_scanner::scanners::default_orchestrator;

/// SafeCheck - Website Health Scanner
#[derive(Parser)]
#[command(name = "safecheck")]
#[command(version = "1.2.0")]
#[command(about = "Scans a website for security, SEO, performance and compliance issues", long_about = None)]
struct Cli {
    /// Target URL to scan
    target: String,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Overall deadline for the whole scan, in seconds
    #[arg(long)]
    deadline_secs: Option<u64>,

    /// Number of issues surfaced in the preview block
    #[arg(long)]
    preview: Option<usize>,

    /// Pretty-print the JSON report
    #[arg(long)]
    pretty: bool,

    /// Configuration file path (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode - only show errors
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &cli.config {
        Some(path) => ScannerConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ScannerConfig::default(),
    };
    if let Some(secs) = cli.timeout_secs {
        config.request_timeout_ms = secs * 1000;
    }
    if let Some(secs) = cli.deadline_secs {
        config.scan_deadline_ms = Some(secs * 1000);
    }
    if let Some(count) = cli.preview {
        config.preview_count = count;
    }
    config.validate()?;

    let orchestrator = default_orchestrator(&config)?;

    let started = Instant::now();
    let record = orchestrator.run_scan(&cli.target).await;
    info!(
        "Scan of {} finished in {:.1}s with {} issues",
        record.url,
        started.elapsed().as_secs_f64(),
        record.issues.len()
    );

    let report = build_report(record, categorization::classify, &config.scoring);
    let json = if cli.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{}", json);

    Ok(())
}
