//! CLI command modules

pub mod load;
pub mod stats;

pub use load::validate_tangle_file;
pub use stats::{execute_stats_command, LatencyArg, OutputFormat, StatsArgs};
