use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
use commands::{execute_stats_command, validate_tangle_file, LatencyArg, OutputFormat, StatsArgs};

#[derive(Parser)]
#[command(name = "ledgerstats")]
#[command(about = "LedgerStats - structural statistics for tangle ledgers")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute statistics for a tangle file
    Stats(StatsCommandArgs),
    /// Load a tangle file without computing statistics
    Validate(ValidateArgs),
}

#[derive(Args)]
pub struct StatsCommandArgs {
    /// Path to the tangle file
    pub file: PathBuf,
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    /// Division mode of the latency gradient
    #[arg(long, value_enum)]
    pub latency: Option<LatencyArg>,
    /// Stats configuration (JSON format)
    #[arg(long)]
    pub config: Option<String>,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Path to the tangle file
    pub file: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("ledgerstats=info,ledgerstats_tangle=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Stats(args) => execute_stats_command(StatsArgs {
            file: args.file,
            format: args.format,
            latency: args.latency,
            config: args.config,
        }),
        Commands::Validate(args) => validate_tangle_file(&args.file),
    }
}
