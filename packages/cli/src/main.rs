#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the verba report extractor.
//!
//! Uses `indicatif-log-bridge` (via [`verba_cli_utils::init_logger`]) to
//! route `log` output through `indicatif::MultiProgress` so that log lines
//! and the batch progress bar never fight for the terminal.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use verba_cli::batch::{BatchOptions, run_batch};
use verba_cli::process::{OutputOptions, process_file};
use verba_cli::{index, load_config};
use verba_cli_utils::BatchProgress;

#[derive(Parser)]
#[command(name = "verba", about = "Verba indenizatória table extractor")]
struct Cli {
    /// TOML file overriding the extraction settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output (`-v` debug, `-vv` trace); `RUST_LOG` refines it
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the table of one report (`.txt` dump or `.pdf`)
    Process {
        file: PathBuf,
        /// Directory for the CSV (defaults to the input's directory)
        #[arg(long)]
        out_dir: Option<PathBuf>,
        /// Skip the `.processed.md` summary
        #[arg(long)]
        no_markdown: bool,
    },
    /// Extract every report in a directory in parallel
    Batch {
        dir: PathBuf,
        /// Number of documents processed at once
        #[arg(long, default_value = "4")]
        jobs: usize,
        /// Per-document deadline in seconds
        #[arg(long, default_value = "30")]
        timeout_secs: u64,
        /// Directory for the CSVs (defaults to each input's directory)
        #[arg(long)]
        out_dir: Option<PathBuf>,
        /// Skip the `.processed.md` summaries
        #[arg(long)]
        no_markdown: bool,
    },
    /// Write search-index JSON Lines for parsed reports (`.csv`, `.txt` or `.pdf`)
    Index {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Output `.jsonl` file
        #[arg(long)]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let multi = verba_cli_utils::init_logger(cli.verbose);
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Process {
            file,
            out_dir,
            no_markdown,
        } => {
            let processed = process_file(
                &file,
                &config,
                &OutputOptions {
                    out_dir,
                    markdown: !no_markdown,
                },
            )?;
            println!(
                "{}: {} rows for {} -> {}",
                processed.document.source,
                processed.document.rows.len(),
                processed.document.date,
                processed.csv_path.display()
            );
        }
        Commands::Batch {
            dir,
            jobs,
            timeout_secs,
            out_dir,
            no_markdown,
        } => {
            let options = BatchOptions {
                jobs,
                timeout: Duration::from_secs(timeout_secs),
                output: OutputOptions {
                    out_dir,
                    markdown: !no_markdown,
                },
            };
            let progress = BatchProgress::new(&multi, &dir.display().to_string());
            let summary = run_batch(&dir, Arc::new(config), &options, progress).await?;

            for (path, reason) in &summary.failed {
                println!("FAILED {}: {reason}", path.display());
            }
            println!(
                "{} processed, {} failed, {} rows",
                summary.processed.len(),
                summary.failed.len(),
                summary.total_rows()
            );
            if !summary.failed.is_empty() {
                std::process::exit(1);
            }
        }
        Commands::Index { inputs, output } => {
            let written = index::index_files(&inputs, &output, &config)?;
            println!("{written} documents -> {}", output.display());
        }
    }

    Ok(())
}
