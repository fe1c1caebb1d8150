//! recon-engine - Transaction file reconciliation runner
//!
//! Collects input files, pushes each one through the remote pipeline
//! (submit → parse → synchronize → reconcile) and prints one audit row per
//! file. Optionally writes the full audit report as JSON.

use anyhow::{Context, Result};
use clap::Parser;
use recon_engine::models::AuditRecord;
use recon_engine::services::{collect_inputs, BatchStatistics};
use recon_engine::{FlowOrchestrator, ReconConfig};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for recon-engine
#[derive(Parser, Debug)]
#[command(name = "recon-engine")]
#[command(about = "Upload transaction files to the reconciliation pipeline")]
#[command(version)]
struct Args {
    /// Files or directories to process (directories are walked for .txt files)
    #[arg(required_unless_present = "write_default_config")]
    inputs: Vec<PathBuf>,

    /// Config file (overrides RECON_CONFIG and the platform config file)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Classify only against this queue's rules
    #[arg(short, long)]
    queue: Option<String>,

    /// Write the audit report as JSON to this path
    #[arg(short, long)]
    report: Option<PathBuf>,

    /// Write the built-in default configuration to this path and exit
    #[arg(long, value_name = "PATH")]
    write_default_config: Option<PathBuf>,
}

#[derive(Serialize)]
struct ReportDocument<'a> {
    generated_at: chrono::DateTime<chrono::Utc>,
    statistics: &'a BatchStatistics,
    records: &'a [AuditRecord],
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(path) = &args.write_default_config {
        recon_common::config::write_toml_config(&ReconConfig::default(), path)
            .with_context(|| format!("Failed to write default config to {}", path.display()))?;
        println!("Default configuration written to {}", path.display());
        return Ok(());
    }

    let (config, config_source) =
        ReconConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    // Initialize tracing (RUST_LOG wins over the configured level)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("recon_engine={level},recon_common={level}", level = config.logging.level)
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting recon-engine v{}", env!("CARGO_PKG_VERSION"));
    match &config_source {
        Some(path) => info!("Configuration: {}", path.display()),
        None => info!("Configuration: built-in defaults"),
    }
    info!(
        "Queues: {}",
        config
            .queues
            .iter()
            .map(|q| q.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    if let Some(queue) = &args.queue {
        if config.queue(queue).is_none() {
            anyhow::bail!("Unknown queue '{}'", queue);
        }
    }

    let intake = collect_inputs(&args.inputs).context("Failed to collect input files")?;
    for skipped in &intake.skipped {
        warn!("Not eligible for upload, skipping: {}", skipped.display());
    }
    info!("{} input files selected", intake.files.len());

    let orchestrator = FlowOrchestrator::new(Arc::new(config));
    let report = orchestrator
        .process_inputs(&intake.files, args.queue.as_deref())
        .await;
    let statistics = BatchStatistics::from_records(report.records());

    print_table(report.records());
    println!();
    println!("{}", statistics.display_string());
    println!(
        "Records processed: {}  IDs reconciled: {}",
        statistics.total_processed, statistics.total_reconciled
    );

    if let Some(path) = &args.report {
        let document = ReportDocument {
            generated_at: recon_common::time::now(),
            statistics: &statistics,
            records: report.records(),
        };
        let json = serde_json::to_string_pretty(&document)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        info!("Audit report written to {}", path.display());
    }

    Ok(())
}

fn print_table(records: &[AuditRecord]) {
    println!(
        "{:<32} {:<8} {:<32} {:>9} {:>7} {:>10}  DETAIL",
        "FILE", "QUEUE", "STATUS", "PROCESSED", "FAILED", "RECONCILED"
    );
    for record in records {
        println!(
            "{:<32} {:<8} {:<32} {:>9} {:>7} {:>10}  {}",
            record.filename,
            record.queue.as_deref().unwrap_or("-"),
            record.status.label(),
            record.processed_count,
            record.failed_count,
            record.reconciled_count,
            record.detail_message
        );
    }
}
