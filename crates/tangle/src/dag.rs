//! Tangle node identifiers and per-transaction records.
//!
//! Slot `0` of every store is reserved and never holds a transaction, slot
//! `1` is the genesis transaction (no parents, no timestamp), and real
//! transactions start at slot `2`.

use serde::{Deserialize, Serialize};

/// Index of a slot in a [`TangleStore`](crate::TangleStore).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(usize);

impl NodeId {
    /// Unused slot at index 0
    pub const RESERVED: NodeId = NodeId(0);
    /// Genesis (root) transaction at index 1
    pub const GENESIS: NodeId = NodeId(1);
    /// First slot assigned to a loaded transaction
    pub const FIRST_TRANSACTION: NodeId = NodeId(2);

    pub const fn new(index: usize) -> Self {
        NodeId(index)
    }

    pub const fn index(self) -> usize {
        self.0
    }

    pub fn is_genesis(self) -> bool {
        self == NodeId::GENESIS
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Parent references and arrival time of one non-root transaction.
///
/// The order of `left` and `right` is positional: the trunk walk only ever
/// follows `left`, the branch walk only ever follows `right`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxnRecord {
    /// Trunk (first) parent
    pub left: NodeId,
    /// Branch (second) parent
    pub right: NodeId,
    /// Arrival time of the transaction
    pub timestamp: u64,
}

impl TxnRecord {
    /// The record as the ordered `[left, right, timestamp]` neighbor
    /// sequence of its node.
    pub fn as_sequence(&self) -> [u64; 3] {
        [self.left.index() as u64, self.right.index() as u64, self.timestamp]
    }
}
