//! EEG Wavelet Pipeline - Main Entry Point

use anyhow::Context;
use clap::{Parser, Subcommand};
use filter_bank::WaveletRegistry;
use pipeline::{init_logging, BatchInput, LoggingConfig, Pipeline, PipelineConfig};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "eeg-wavelet", version, about = "Wavelet analysis of multi-channel EEG recordings")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decompose, measure and scan every channel of a JSON recording
    Analyze {
        /// Input JSON: {"sampling_rate": .., "channels": [{"name": .., "samples": [..]}]}
        #[arg(short, long)]
        input: PathBuf,
        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Report destination (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List registered wavelet families
    Wavelets,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Analyze { input, config, output } => analyze(input, config, output).await,
        Command::Wavelets => {
            init_logging(&LoggingConfig::default()).context("failed to initialize logging")?;
            let registry = WaveletRegistry::with_builtin();
            for name in registry.names() {
                let wavelet = registry.get(name)?;
                println!("{:<8} {:>3} taps", name, wavelet.filter_len());
            }
            Ok(())
        }
    }
}

async fn analyze(input: PathBuf, config: Option<PathBuf>, output: Option<PathBuf>) -> anyhow::Result<()> {
    let config = PipelineConfig::load(config.as_deref()).context("failed to load configuration")?;
    init_logging(&config.logging).context("failed to initialize logging")?;

    info!("=== EEG Wavelet Pipeline v{} ===", env!("CARGO_PKG_VERSION"));

    let raw = tokio::fs::read_to_string(&input)
        .await
        .with_context(|| format!("failed to read {}", input.display()))?;
    let batch: BatchInput =
        serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", input.display()))?;

    let pretty = config.output.pretty;
    let pipeline = Pipeline::new(config, &WaveletRegistry::with_builtin())?;

    let cancel = pipeline.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping after in-flight channels");
            cancel.cancel();
        }
    });

    let report = pipeline.run(batch).await?;

    let json = if pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };

    match output {
        Some(path) => {
            tokio::fs::write(&path, json)
                .await
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!("Report written to {}", path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}
