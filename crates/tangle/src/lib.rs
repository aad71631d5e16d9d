//! LedgerStats tangle core
//!
//! This crate holds a tangle (a DAG ledger where every transaction references
//! two earlier ones, rooted at a genesis transaction) in a bounds-checked
//! arena and computes its structural statistics: average depth, transactions
//! per depth level, references per node, incoming rate and latency gradient.

pub mod dag;
pub mod errors;
pub mod stats;
pub mod store;

pub use dag::{NodeId, TxnRecord};
pub use errors::{IndexRole, TangleError};
pub use stats::{
    compute_statistics, Chain, ChainEnd, ChainWalk, LatencyMode, StatsConfig, StatsEngine,
    StatsReport,
};
pub use store::TangleStore;

/// Result type for tangle operations
pub type Result<T> = std::result::Result<T, TangleError>;
