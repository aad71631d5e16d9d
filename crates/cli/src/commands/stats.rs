//! Stats command implementation
//!
//! This module implements the `ledgerstats stats` command: load a tangle
//! file, compute its statistics and print them as text or JSON.

use anyhow::{Context, Result};
use ledgerstats_tangle::{compute_statistics, LatencyMode, StatsConfig, StatsReport};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

use super::load::load_tangle_file;

/// Output format of the report
#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Legacy text block
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Latency division mode as selected on the command line
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LatencyArg {
    /// Integer division (legacy)
    Truncating,
    /// Floating-point division
    Real,
}

impl From<LatencyArg> for LatencyMode {
    fn from(arg: LatencyArg) -> Self {
        match arg {
            LatencyArg::Truncating => LatencyMode::Truncating,
            LatencyArg::Real => LatencyMode::RealValued,
        }
    }
}

/// Arguments for the stats command
pub struct StatsArgs {
    /// Path to the tangle file
    pub file: PathBuf,
    /// Output format
    pub format: OutputFormat,
    /// Latency division override
    pub latency: Option<LatencyArg>,
    /// Stats configuration (JSON format)
    pub config: Option<String>,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    config: &'a StatsConfig,
    report: &'a StatsReport,
}

/// Execute the stats command
pub fn execute_stats_command(args: StatsArgs) -> Result<()> {
    let config = resolve_config(args.config.as_deref(), args.latency)?;
    let store = load_tangle_file(&args.file)?;

    let report = compute_statistics(&store, &config)
        .with_context(|| format!("Failed to compute statistics for {}", args.file.display()))?;
    info!(file = %args.file.display(), "statistics ready");

    println!("{}", render_report(&report, &config, args.format)?);
    Ok(())
}

/// Build the engine configuration: JSON first, flags on top.
pub fn resolve_config(json: Option<&str>, latency: Option<LatencyArg>) -> Result<StatsConfig> {
    let mut config = match json {
        Some(json) => {
            serde_json::from_str(json).with_context(|| "Failed to parse stats configuration JSON")?
        }
        None => StatsConfig::default(),
    };

    if let Some(latency) = latency {
        config.latency_mode = latency.into();
    }

    Ok(config)
}

/// Render a report for the terminal.
pub fn render_report(
    report: &StatsReport,
    config: &StatsConfig,
    format: OutputFormat,
) -> Result<String> {
    let rendered = match format {
        OutputFormat::Text => format!("\n{}", report),
        OutputFormat::Json => serde_json::to_string_pretty(&JsonReport { config, report })?,
    };
    Ok(rendered)
}
