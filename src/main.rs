//! autochart - resolve a chart configuration from the command line
//!
//! Usage: `autochart <config.json> [--dataset ID=PATH]... [--settings PATH]`
//!
//! Reads a raw chart configuration, resolves it against inline data or the
//! datasets given with `--dataset`, and prints the canonical configuration as
//! JSON. Validation issues are logged as warnings.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};

use autochart::data::InMemoryDatasets;
use autochart::settings::ChartSettings;
use autochart::{validate_config, Normalizer};

#[derive(Parser, Debug)]
#[command(name = "autochart")]
#[command(about = "Resolve a chart configuration into canonical JSON", long_about = None)]
struct Cli {
    /// Raw chart configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Dataset to register for `datasetId` lookups (repeatable)
    #[arg(long = "dataset", value_name = "ID=PATH", value_parser = parse_dataset)]
    datasets: Vec<(String, PathBuf)>,

    /// Settings file (defaults to the platform config dir)
    #[arg(long, value_name = "FILE")]
    settings: Option<PathBuf>,
}

fn parse_dataset(spec: &str) -> Result<(String, PathBuf), String> {
    match spec.split_once('=') {
        Some((id, path)) if !id.is_empty() && !path.is_empty() => {
            Ok((id.to_string(), PathBuf::from(path)))
        }
        _ => Err(format!("invalid dataset '{}', expected ID=PATH", spec)),
    }
}

fn read_json(path: &Path) -> Result<serde_json::Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();

    let settings = match &args.settings {
        Some(path) => ChartSettings::load_from(path)?,
        None => ChartSettings::load(),
    };

    let mut store = InMemoryDatasets::new();
    for (id, path) in &args.datasets {
        let value = read_json(path)?;
        store
            .insert_json(id.clone(), &value)
            .with_context(|| format!("Failed to load dataset {}", id))?;
        tracing::info!("Loaded dataset {} from {}", id, path.display());
    }

    let raw = read_json(&args.config)?;
    let config = Normalizer::new(&store)
        .with_thresholds(settings.inference)
        .normalize_value(raw)
        .with_context(|| format!("Failed to normalize {}", args.config.display()))?;

    for issue in validate_config(&config) {
        tracing::warn!("{}", issue);
    }

    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
