//! Tangle Graph Store
//!
//! A dense arena of transaction records indexed by [`NodeId`]. The store is
//! filled once by a loader and then only read.

use crate::dag::{NodeId, TxnRecord};
use crate::errors::{IndexRole, TangleError};
use crate::Result;

/// Fixed-size, bounds-checked adjacency storage for a tangle
#[derive(Debug, Clone)]
pub struct TangleStore {
    /// One slot per index in `[0, capacity)`
    slots: Vec<Option<TxnRecord>>,
    /// Running count of parent edges
    edges: u64,
}

impl TangleStore {
    /// Allocate `capacity` empty slots.
    pub fn new(capacity: i64) -> Result<Self> {
        if capacity < 0 {
            return Err(TangleError::InvalidArgument {
                reason: format!("Number of nodes must be positive, got {}", capacity),
            });
        }

        let too_large = || TangleError::InvalidArgument {
            reason: format!("Cannot allocate {} node slots", capacity),
        };
        let len = usize::try_from(capacity).map_err(|_| too_large())?;

        let mut slots = Vec::new();
        slots.try_reserve_exact(len).map_err(|_| too_large())?;
        slots.resize(len, None);

        Ok(TangleStore { slots, edges: 0 })
    }

    /// Size a store for `transactions` non-root records: the reserved slot
    /// and the genesis slot come on top.
    pub fn for_transactions(transactions: i64) -> Result<Self> {
        let capacity = transactions
            .checked_add(2)
            .ok_or_else(|| TangleError::InvalidArgument {
                reason: format!("Transaction count {} is too large", transactions),
            })?;
        Self::new(capacity)
    }

    pub fn capacity(&self) -> i64 {
        self.slots.len() as i64
    }

    /// Highest addressable index, which is also the count of numbered
    /// transactions including genesis.
    pub fn total_nodes(&self) -> i64 {
        self.capacity() - 1
    }

    pub fn total_edges(&self) -> u64 {
        self.edges
    }

    /// Record that `node` references `left` and `right` and arrived at
    /// `timestamp`.
    ///
    /// All three indices are checked before anything is written. A second
    /// call for the same node replaces its record; edges are counted per
    /// call either way.
    pub fn add_edge(&mut self, node: i64, left: i64, right: i64, timestamp: u64) -> Result<()> {
        let node = self.check(node, IndexRole::Node)?;
        let left = self.check(left, IndexRole::LeftParent)?;
        let right = self.check(right, IndexRole::RightParent)?;

        self.slots[node.index()] = Some(TxnRecord {
            left,
            right,
            timestamp,
        });
        self.edges += 2;

        Ok(())
    }

    /// The ordered parent record of `node`, `None` for empty slots.
    pub fn neighbors_of(&self, node: i64) -> Result<Option<TxnRecord>> {
        let node = self.check(node, IndexRole::Node)?;
        Ok(self.record(node))
    }

    /// Record lookup for an id that is already known to be in range.
    /// Out-of-range ids read as empty.
    pub fn record(&self, node: NodeId) -> Option<TxnRecord> {
        self.slots.get(node.index()).copied().flatten()
    }

    /// Iterate over every slot id in `[0, capacity)`.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.slots.len()).map(NodeId::new)
    }

    /// Iterate over the non-empty slots in index order.
    pub fn records(&self) -> impl Iterator<Item = (NodeId, &TxnRecord)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|record| (NodeId::new(index), record)))
    }

    /// Validate a raw index against this store.
    pub fn check(&self, index: i64, role: IndexRole) -> Result<NodeId> {
        if index < 0 || index >= self.capacity() {
            return Err(TangleError::OutOfRange {
                role,
                index,
                capacity: self.capacity(),
            });
        }
        Ok(NodeId::new(index as usize))
    }
}
