//! CLI entry point for the QA roll-up tool.
//!
//! Provides subcommands for processing a batch of monthly uploads into
//! summary artifacts, printing the annual overview, and exporting it.

use anyhow::{Result, ensure};
use clap::{Parser, Subcommand};
use qa_rollup::{
    annual::reduce,
    batch::process_batch,
    config::PipelineConfig,
    output::{export_annual, print_json, print_pretty},
    store::DirStore,
};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "qa_rollup")]
#[command(about = "Monthly QA score summaries and annual overview", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clear the summary directory and summarize a new batch of uploads
    Process {
        /// Monthly upload files, processed in the given order
        #[arg(value_name = "FILES", required = true)]
        files: Vec<PathBuf>,

        /// Directory holding summary artifacts (default: $QA_SUMMARY_DIR or "summaries")
        #[arg(short = 'd', long)]
        summary_dir: Option<PathBuf>,

        /// Field delimiter of the upload files
        #[arg(long, default_value_t = ',')]
        delimiter: char,

        /// Extra identity column that must not be scored (repeatable)
        #[arg(short = 'i', long = "identity-column")]
        identity_columns: Vec<String>,
    },
    /// Print the annual overview built from the current summaries
    Annual {
        /// Directory holding summary artifacts (default: $QA_SUMMARY_DIR or "summaries")
        #[arg(short = 'd', long)]
        summary_dir: Option<PathBuf>,

        /// Print JSON instead of the highlighted table
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Write the annual overview to a CSV file
    Export {
        /// Directory holding summary artifacts (default: $QA_SUMMARY_DIR or "summaries")
        #[arg(short = 'd', long)]
        summary_dir: Option<PathBuf>,

        /// CSV file to write
        #[arg(short, long, default_value = "annual_overview.csv")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/qa_rollup.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("qa_rollup.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Process {
            files,
            summary_dir,
            delimiter,
            identity_columns,
        } => {
            ensure!(delimiter.is_ascii(), "delimiter must be a single ASCII character");
            let config = PipelineConfig::default()
                .with_delimiter(delimiter as u8)
                .with_identity_columns(identity_columns);
            let mut store = DirStore::open(resolve_summary_dir(summary_dir), &config)?;

            let report = process_batch(&mut store, &files, &config)?;
            for outcome in &report.outcomes {
                if let Err(reason) = &outcome.result {
                    warn!(source = %outcome.source.display(), reason = %reason, "Upload not summarized");
                }
            }
            info!(
                succeeded = report.succeeded(),
                failed = report.failed(),
                dir = %store.dir().display(),
                "Summaries written"
            );
        }
        Commands::Annual { summary_dir, json } => {
            let config = PipelineConfig::default();
            let store = DirStore::open(resolve_summary_dir(summary_dir), &config)?;
            let table = reduce(&store)?;

            if json {
                print_json(&table)?;
            } else {
                print_pretty(&table);
            }
        }
        Commands::Export {
            summary_dir,
            output,
        } => {
            let config = PipelineConfig::default();
            let store = DirStore::open(resolve_summary_dir(summary_dir), &config)?;
            let table = reduce(&store)?;

            if table.is_empty() {
                info!("No monthly summaries yet, exporting an empty overview");
            }
            export_annual(&output, &table)?;
            info!(output = %output.display(), devices = table.rows.len(), "Annual overview exported");
        }
    }

    Ok(())
}

/// Flag value, then `QA_SUMMARY_DIR`, then `summaries`.
fn resolve_summary_dir(arg: Option<PathBuf>) -> PathBuf {
    arg.or_else(|| std::env::var_os("QA_SUMMARY_DIR").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("summaries"))
}
