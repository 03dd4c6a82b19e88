//! Operation-based replication for the dictionary.
//!
//! Every mutation of an [`LWWElementDict`](crate::LWWElementDict) can be
//! expressed as a [`DictOp`]. Ops can be appended to an event log, broadcast
//! to peers and replayed; because the dictionary keeps every op it has seen
//! and resolves conflicts by timestamp alone, replay order does not matter.

use crate::Crdt;

/// A replica that can apply discrete operations.
///
/// For convergence, `apply_op` must be:
/// - **Commutative**: order of operations doesn't matter
/// - **Idempotent**: applying the same op twice has no additional effect
///
/// # Example
///
/// ```
/// use lww_element_dict::events::OpCrdt;
/// use lww_element_dict::prelude::*;
///
/// let ops = [
///     DictOp::Remove { key: "k", value: 1, timestamp: 3 },
///     DictOp::Insert { key: "k", value: 1, timestamp: 2 },
///     DictOp::Insert { key: "k", value: 2, timestamp: 4 },
/// ];
///
/// let mut forward = LWWElementDict::new();
/// let mut backward = LWWElementDict::new();
/// for op in &ops {
///     forward.apply_op(op);
/// }
/// for op in ops.iter().rev() {
///     backward.apply_op(op);
/// }
///
/// assert_eq!(forward, backward);
/// assert_eq!(forward.get("k"), Some(&2));
/// ```
pub trait OpCrdt: Crdt {
    /// The operation type this CRDT produces.
    type Op;

    /// Apply an operation, from a local or a remote source.
    fn apply_op(&mut self, op: &Self::Op);
}

/// A single dictionary mutation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DictOp<K, V, T> {
    /// `value` was inserted under `key` at `timestamp`.
    Insert {
        /// Target key.
        key: K,
        /// Inserted value.
        value: V,
        /// Time of the insertion.
        timestamp: T,
    },
    /// `key` was removed at `timestamp`.
    Remove {
        /// Target key.
        key: K,
        /// Value named by the removal.
        value: V,
        /// Time of the removal.
        timestamp: T,
    },
}

impl<K, V, T> DictOp<K, V, T> {
    /// The key this op targets.
    pub fn key(&self) -> &K {
        match self {
            Self::Insert { key, .. } | Self::Remove { key, .. } => key,
        }
    }

    /// The timestamp this op carries.
    pub fn timestamp(&self) -> &T {
        match self {
            Self::Insert { timestamp, .. } | Self::Remove { timestamp, .. } => timestamp,
        }
    }

    /// Check if this op is a removal.
    pub fn is_remove(&self) -> bool {
        matches!(self, Self::Remove { .. })
    }
}
