//! Command-line driver for the changepoint and epoch pipeline.
//!
//!   # Detect changepoints and assign epochs
//!   changepoint-epochs --config params.json --store data/ run
//!
//!   # Print the changepoint table of the selected subset
//!   changepoint-epochs --config params.json --store data/ table --latex
//!
//!   # Build the weekly panel and engagement signal
//!   changepoint-epochs --config params.json --store data/ panel

use anyhow::{bail, Context, Result};
use changepoint_epochs::config::PipelineConfig;
use changepoint_epochs::detection::Peak;
use changepoint_epochs::pipeline::{run_panel_with_store, run_with_store};
use changepoint_epochs::report::{changepoint_table, render_latex, render_text, DEFAULT_CAPTION};
use changepoint_epochs::storage::{DatasetStore, JsonDirStore};
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "changepoint-epochs")]
#[command(version)]
#[command(about = "Changepoint detection and epoch segmentation of posting activity", long_about = None)]
struct Cli {
    /// Pipeline configuration (JSON)
    #[arg(long, short = 'c')]
    config: PathBuf,

    /// Directory holding the input and output datasets
    #[arg(long, short = 's', default_value = "data")]
    store: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build signals, detect peaks and assign records to epochs
    Run,
    /// Print the changepoints of the selected subset
    Table {
        /// Emit a LaTeX table instead of plain text
        #[arg(long)]
        latex: bool,

        /// Caption of the LaTeX table
        #[arg(long, default_value = DEFAULT_CAPTION)]
        caption: String,
    },
    /// Aggregate posts per week, build the aligned panel and the group signal
    Panel,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();

    let config = PipelineConfig::from_path(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    let mut store = JsonDirStore::open(&cli.store)
        .with_context(|| format!("Failed to open dataset store at {}", cli.store.display()))?;

    match cli.command {
        Commands::Run => {
            let output = run_with_store(&config, &mut store).context("Pipeline run failed")?;
            info!(
                "{} peaks, {} changepoints, {} epochs, {} records kept, {} dropped",
                output.peaks.len(),
                output.changepoints.len(),
                output.meta.len(),
                output.assignment.kept.len(),
                output.assignment.dropped.len()
            );
        }
        Commands::Table { latex, caption } => {
            let name = &config.datasets.changepoints;
            if !store.contains(name) {
                bail!("dataset '{name}' not found; run the 'run' command first");
            }
            let peaks: Vec<Peak> = store
                .read(name)
                .with_context(|| format!("Failed to read dataset '{name}'"))?;
            let rows = changepoint_table(&peaks, &config.changepoints.use_subset);
            if latex {
                print!("{}", render_latex(&rows, &caption));
            } else {
                print!("{}", render_text(&rows));
            }
        }
        Commands::Panel => {
            let output =
                run_panel_with_store(&config, &mut store).context("Panel construction failed")?;
            info!(
                "{} weekly rows, {} panel rows, {} signal rows",
                output.weekly.len(),
                output.panel.len(),
                output.signal.len()
            );
        }
    }

    Ok(())
}
