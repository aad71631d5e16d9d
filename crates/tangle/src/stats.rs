//! Statistics Engine
//!
//! Derives the structural metrics of a tangle from a fully loaded
//! [`TangleStore`]. Every metric is computed from a shared borrow of the
//! store; none of them mutate it.
//!
//! The store must be acyclic along left-only and right-only parent chains.
//! A chain that loops back on itself never terminates.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::dag::{NodeId, TxnRecord};
use crate::errors::{IndexRole, TangleError};
use crate::store::TangleStore;
use crate::Result;

/// How the transaction latency gradient divides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LatencyMode {
    /// Integer division truncating toward zero (legacy output)
    #[default]
    Truncating,
    /// Floating-point division
    RealValued,
}

/// Configuration for the statistics engine
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    /// Division mode of the latency gradient
    pub latency_mode: LatencyMode,
}

/// The five tangle metrics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatsReport {
    /// Mean of the minimum chain depth over every slot
    pub avg_depth: f64,
    /// Transactions per depth level, measured from the newest transaction
    pub avg_txn_per_depth: f64,
    /// Parent references per node
    pub avg_ref: f64,
    /// Transactions per time unit
    pub incoming_rate: f64,
    /// Gradient between the middle and the newest transaction
    pub latency: f64,
}

impl std::fmt::Display for StatsReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "AVG DAG DEPTH: {:.2}", self.avg_depth)?;
        writeln!(f, "AVG TXS PER DEPTH: {:.2}", self.avg_txn_per_depth)?;
        writeln!(f, "AVG REF: {:.3}", self.avg_ref)?;
        writeln!(f, "AVG INCOMING TXS RATE: {:.2}", self.incoming_rate)?;
        writeln!(f, "TRANSACTION LATENCY: {:.1}", self.latency)?;
        Ok(())
    }
}

/// Which parent a chain walk follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chain {
    /// Left parent only
    Trunk,
    /// Right parent only
    Branch,
}

impl Chain {
    fn parent(self, record: &TxnRecord) -> NodeId {
        match self {
            Chain::Trunk => record.left,
            Chain::Branch => record.right,
        }
    }
}

/// How a finished chain walk stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainEnd {
    /// The last step landed on genesis
    ReachedRoot,
    /// The walk ran into an empty slot (or started on one)
    Exhausted,
}

/// Outcome of walking one chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainWalk {
    pub steps: u64,
    pub end: ChainEnd,
}

enum WalkState {
    Walking { record: TxnRecord, steps: u64 },
    ReachedRoot { steps: u64 },
    Exhausted { steps: u64 },
}

/// Computes metrics over a borrowed store
pub struct StatsEngine<'a> {
    store: &'a TangleStore,
    config: StatsConfig,
}

impl<'a> StatsEngine<'a> {
    pub fn new(store: &'a TangleStore, config: StatsConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &StatsConfig {
        &self.config
    }

    /// Walk one chain from `node` toward genesis.
    pub fn walk_chain(&self, node: NodeId, chain: Chain) -> ChainWalk {
        let mut state = match self.store.record(node) {
            Some(record) => WalkState::Walking { record, steps: 0 },
            None => WalkState::Exhausted { steps: 0 },
        };

        loop {
            state = match state {
                WalkState::Walking { record, steps } => {
                    let parent = chain.parent(&record);
                    let steps = steps + 1;
                    if parent.is_genesis() {
                        WalkState::ReachedRoot { steps }
                    } else {
                        match self.store.record(parent) {
                            Some(record) => WalkState::Walking { record, steps },
                            None => WalkState::Exhausted { steps },
                        }
                    }
                }
                WalkState::ReachedRoot { steps } => {
                    return ChainWalk {
                        steps,
                        end: ChainEnd::ReachedRoot,
                    }
                }
                WalkState::Exhausted { steps } => {
                    return ChainWalk {
                        steps,
                        end: ChainEnd::Exhausted,
                    }
                }
            };
        }
    }

    /// Shorter of the trunk and branch walks from `node`.
    pub fn min_depth(&self, node: NodeId) -> u64 {
        let trunk = self.walk_chain(node, Chain::Trunk);
        let branch = self.walk_chain(node, Chain::Branch);
        trunk.steps.min(branch.steps)
    }

    /// Sum of [`min_depth`](Self::min_depth) over every slot, divided by
    /// the node total.
    pub fn avg_dag_depth(&self) -> Result<f64> {
        let total_nodes = self.require_nodes("average DAG depth")?;
        let depth: u64 = self.store.node_ids().map(|node| self.min_depth(node)).sum();
        debug!(depth, total_nodes, "summed minimum depths");
        Ok(depth as f64 / total_nodes as f64)
    }

    /// Transactions per depth level, taking the newest transaction as the
    /// deepest one. Genesis is not counted.
    pub fn avg_txn_per_depth(&self) -> Result<f64> {
        let last = self.store.check(self.store.total_nodes(), IndexRole::Node)?;
        let depth = self.min_depth(last);
        debug!(node = %last, depth, "depth of newest transaction");

        if depth == 0 {
            warn!(node = %last, "newest transaction has depth 0");
            return Err(TangleError::degenerate(
                "average transactions per depth",
                format!("transaction {} has depth 0", last),
            ));
        }

        Ok((self.store.total_nodes() - 1) as f64 / depth as f64)
    }

    pub fn avg_ref(&self) -> Result<f64> {
        let total_nodes = self.require_nodes("average references")?;
        Ok(self.store.total_edges() as f64 / total_nodes as f64)
    }

    /// Transactions per time unit over the summed arrival times. Zero when
    /// no time has elapsed.
    pub fn incoming_rate(&self) -> f64 {
        let total_time_units: u128 = self
            .store
            .records()
            .map(|(_, record)| u128::from(record.timestamp))
            .sum();
        debug!(total_time_units = %total_time_units, "summed arrival times");

        if total_time_units == 0 {
            return 0.0;
        }
        (self.store.total_nodes() - 1) as f64 / total_time_units as f64
    }

    /// Gradient between the middle transaction and the newest one.
    ///
    /// Empty slots (genesis) read as arrival time 0.
    pub fn transaction_latency(&self) -> Result<f64> {
        let y2 = self.store.total_nodes();
        let y1 = y2 / 2;
        let x2 = self.arrival_time(y2)?;
        let x1 = self.arrival_time(y1)?;
        debug!(y1, y2, x1, x2, mode = ?self.config.latency_mode, "latency gradient");

        let dy = i128::from(y2) - i128::from(y1);
        let dx = i128::from(x2) - i128::from(x1);
        if dx == 0 {
            warn!(y1, y2, timestamp = x2, "latency endpoints share a timestamp");
            return Err(TangleError::degenerate(
                "transaction latency",
                format!("transactions {} and {} both arrived at {}", y1, y2, x2),
            ));
        }

        let gradient = match self.config.latency_mode {
            LatencyMode::Truncating => (dy / dx) as f64,
            LatencyMode::RealValued => dy as f64 / dx as f64,
        };
        Ok(gradient)
    }

    /// Compute all five metrics; the first failure aborts the report.
    pub fn report(&self) -> Result<StatsReport> {
        let report = StatsReport {
            avg_depth: self.avg_dag_depth()?,
            avg_txn_per_depth: self.avg_txn_per_depth()?,
            avg_ref: self.avg_ref()?,
            incoming_rate: self.incoming_rate(),
            latency: self.transaction_latency()?,
        };

        info!(
            nodes = self.store.total_nodes(),
            edges = self.store.total_edges(),
            latency_mode = ?self.config().latency_mode,
            "computed tangle statistics"
        );
        Ok(report)
    }

    fn arrival_time(&self, node: i64) -> Result<u64> {
        let record = self.store.neighbors_of(node)?;
        Ok(record.map_or(0, |record| record.timestamp))
    }

    fn require_nodes(&self, metric: &'static str) -> Result<i64> {
        let total_nodes = self.store.total_nodes();
        if total_nodes <= 1 {
            return Err(TangleError::degenerate(
                metric,
                format!("tangle has {} nodes", total_nodes.max(0)),
            ));
        }
        Ok(total_nodes)
    }
}

/// Compute the full statistics report for `store`.
pub fn compute_statistics(store: &TangleStore, config: &StatsConfig) -> Result<StatsReport> {
    StatsEngine::new(store, config.clone()).report()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_from(records: &[(i64, i64, u64)]) -> TangleStore {
        let mut store = TangleStore::for_transactions(records.len() as i64).unwrap();
        for (offset, &(left, right, timestamp)) in records.iter().enumerate() {
            store
                .add_edge(offset as i64 + 2, left, right, timestamp)
                .unwrap();
        }
        store
    }

    fn engine(store: &TangleStore) -> StatsEngine<'_> {
        StatsEngine::new(store, StatsConfig::default())
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_empty_slots_have_depth_zero() {
        let store = store_from(&[(1, 1, 10)]);
        let engine = engine(&store);

        assert_eq!(engine.min_depth(NodeId::GENESIS), 0);
        assert_eq!(engine.min_depth(NodeId::RESERVED), 0);
        assert_eq!(
            engine.walk_chain(NodeId::GENESIS, Chain::Trunk),
            ChainWalk {
                steps: 0,
                end: ChainEnd::Exhausted
            }
        );
    }

    #[test]
    fn test_chain_depth_counts_steps() {
        let store = store_from(&[(1, 1, 5), (2, 2, 10), (3, 3, 15)]);
        let engine = engine(&store);

        assert_eq!(engine.min_depth(NodeId::new(2)), 1);
        assert_eq!(engine.min_depth(NodeId::new(3)), 2);
        assert_eq!(engine.min_depth(NodeId::new(4)), 3);
        assert_eq!(
            engine.walk_chain(NodeId::new(4), Chain::Branch),
            ChainWalk {
                steps: 3,
                end: ChainEnd::ReachedRoot
            }
        );
    }

    #[test]
    fn test_min_depth_takes_shorter_chain() {
        // trunk: 4 -> 3 -> 2 -> 1, branch: 4 -> 1
        let store = store_from(&[(1, 1, 5), (2, 1, 10), (3, 1, 15)]);
        let engine = engine(&store);

        assert_eq!(engine.walk_chain(NodeId::new(4), Chain::Trunk).steps, 3);
        assert_eq!(engine.walk_chain(NodeId::new(4), Chain::Branch).steps, 1);
        assert_eq!(engine.min_depth(NodeId::new(4)), 1);
    }

    #[test]
    fn test_chain_exhausts_on_empty_parent() {
        // node 2 points at the reserved slot, node 3 hangs off node 2
        let store = store_from(&[(0, 1, 5), (2, 2, 10)]);
        let engine = engine(&store);

        assert_eq!(
            engine.walk_chain(NodeId::new(2), Chain::Trunk),
            ChainWalk {
                steps: 1,
                end: ChainEnd::Exhausted
            }
        );
        assert_eq!(
            engine.walk_chain(NodeId::new(3), Chain::Branch),
            ChainWalk {
                steps: 2,
                end: ChainEnd::ReachedRoot
            }
        );
        assert_eq!(
            engine.walk_chain(NodeId::new(3), Chain::Trunk),
            ChainWalk {
                steps: 2,
                end: ChainEnd::Exhausted
            }
        );
    }

    #[test]
    fn test_avg_ref_on_diamond() {
        let store = store_from(&[(1, 1, 5), (1, 2, 10), (2, 3, 15)]);
        assert_eq!(store.total_edges(), 6);
        assert_close(engine(&store).avg_ref().unwrap(), 1.5);
    }

    #[test]
    fn test_avg_dag_depth_includes_every_slot() {
        let store = store_from(&[(1, 1, 5), (1, 2, 10), (2, 3, 15)]);
        // depths: slot0 0, slot1 0, node2 1, node3 1, node4 min(2, 3) = 2
        assert_close(engine(&store).avg_dag_depth().unwrap(), 4.0 / 4.0);
    }

    #[test]
    fn test_avg_txn_per_depth_uses_newest_transaction() {
        let store = store_from(&[(1, 1, 5), (2, 2, 10), (3, 3, 15)]);
        // total nodes 4, newest depth 3
        assert_close(engine(&store).avg_txn_per_depth().unwrap(), 1.0);
    }

    #[test]
    fn test_avg_txn_per_depth_zero_depth_is_degenerate() {
        // declared two transactions, loaded one: the last slot is empty
        let mut store = TangleStore::for_transactions(2).unwrap();
        store.add_edge(2, 1, 1, 10).unwrap();

        let err = engine(&store).avg_txn_per_depth().unwrap_err();
        assert!(matches!(err, TangleError::ArithmeticDegenerate { .. }));
    }

    #[test]
    fn test_tiny_tangles_are_degenerate() {
        for capacity in [0, 1, 2] {
            let store = TangleStore::new(capacity).unwrap();
            let engine = engine(&store);
            assert!(matches!(
                engine.avg_dag_depth(),
                Err(TangleError::ArithmeticDegenerate { .. })
            ));
            assert!(matches!(
                engine.avg_ref(),
                Err(TangleError::ArithmeticDegenerate { .. })
            ));
        }
    }

    #[test]
    fn test_incoming_rate() {
        let store = store_from(&[(1, 1, 10), (1, 2, 20)]);
        assert_close(engine(&store).incoming_rate(), 2.0 / 30.0);
    }

    #[test]
    fn test_incoming_rate_zero_without_elapsed_time() {
        let empty = TangleStore::for_transactions(3).unwrap();
        assert_eq!(engine(&empty).incoming_rate(), 0.0);

        let instant = store_from(&[(1, 1, 0), (1, 2, 0)]);
        assert_eq!(engine(&instant).incoming_rate(), 0.0);
    }

    #[test]
    fn test_latency_truncates_by_default() {
        // y2 = 5, y1 = 2, x2 = 40, x1 = 10 -> 3 / 30
        let store = store_from(&[(1, 1, 10), (1, 2, 20), (2, 3, 30), (3, 4, 40)]);
        assert_eq!(engine(&store).transaction_latency().unwrap(), 0.0);

        let real = StatsEngine::new(
            &store,
            StatsConfig {
                latency_mode: LatencyMode::RealValued,
            },
        );
        assert_eq!(real.config().latency_mode, LatencyMode::RealValued);
        assert_close(real.transaction_latency().unwrap(), 0.1);
    }

    #[test]
    fn test_latency_truncates_toward_zero_for_decreasing_time() {
        // y2 = 5 arrived at 0, y1 = 2 arrived at 1: 3 / -1
        let store = store_from(&[(1, 1, 1), (1, 1, 2), (2, 3, 1), (3, 4, 0)]);
        assert_eq!(engine(&store).transaction_latency().unwrap(), -3.0);
    }

    #[test]
    fn test_latency_equal_timestamps_is_degenerate() {
        let store = store_from(&[(1, 1, 10), (1, 2, 20), (2, 3, 30), (3, 4, 10)]);
        let err = engine(&store).transaction_latency().unwrap_err();
        assert!(matches!(
            err,
            TangleError::ArithmeticDegenerate {
                metric: "transaction latency",
                ..
            }
        ));
    }

    #[test]
    fn test_report_for_two_transactions() {
        let store = store_from(&[(1, 1, 10), (1, 2, 20)]);
        let report = compute_statistics(&store, &StatsConfig::default()).unwrap();

        assert_close(report.avg_depth, 2.0 / 3.0);
        assert_close(report.avg_txn_per_depth, 2.0);
        assert_close(report.avg_ref, 4.0 / 3.0);
        assert_close(report.incoming_rate, 2.0 / 30.0);
        assert_eq!(report.latency, 0.0);

        assert_eq!(
            report.to_string(),
            "AVG DAG DEPTH: 0.67\n\
             AVG TXS PER DEPTH: 2.00\n\
             AVG REF: 1.333\n\
             AVG INCOMING TXS RATE: 0.07\n\
             TRANSACTION LATENCY: 0.0\n"
        );
    }

    #[test]
    fn test_report_aborts_on_first_failure() {
        // newest transaction arrived at 0, same as genesis
        let store = store_from(&[(1, 1, 10), (1, 1, 0)]);
        let result = compute_statistics(&store, &StatsConfig::default());
        assert!(matches!(
            result,
            Err(TangleError::ArithmeticDegenerate {
                metric: "transaction latency",
                ..
            })
        ));
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let config: StatsConfig =
            serde_json::from_str(r#"{"latency_mode": "real_valued"}"#).unwrap();
        assert_eq!(config.latency_mode, LatencyMode::RealValued);

        let defaulted: StatsConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(defaulted, StatsConfig::default());
    }
}
