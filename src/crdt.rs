/// Core trait for state-based replicated types.
///
/// Replicas are updated independently and later reconciled by merging one
/// replica's full state into another.
///
/// # Properties
///
/// All implementations must satisfy:
/// - **Commutativity:** `a.merge(b) == b.merge(a)`
/// - **Associativity:** `a.merge(b.merge(c)) == a.merge(b).merge(c)`
/// - **Idempotency:** `a.merge(a) == a`
pub trait Crdt {
    /// Merge another replica's state into this one.
    ///
    /// `other` is left untouched. After merging, `self` holds the least upper
    /// bound of both states.
    fn merge(&mut self, other: &Self);
}

/// Extension trait for replicas that can ship only what a peer is missing.
///
/// # Example
///
/// ```
/// use lww_element_dict::prelude::*;
///
/// let mut a = LWWElementDict::new();
/// a.insert("region", "eu-west", 1);
/// a.insert("replicas", "3", 2);
///
/// let mut b = LWWElementDict::new();
/// b.insert("region", "eu-west", 1);
///
/// // Only the `replicas` insertion travels
/// let delta = a.delta(&b);
/// assert_eq!(delta.len(), 1);
///
/// b.apply_delta(&delta);
/// assert_eq!(a, b);
/// ```
pub trait DeltaCrdt: Crdt {
    /// The type of delta produced by this CRDT.
    type Delta;

    /// Generate a delta containing the state in `self` that `other` lacks.
    fn delta(&self, other: &Self) -> Self::Delta;

    /// Fold a delta into this replica with the same semantics as
    /// [`Crdt::merge`].
    fn apply_delta(&mut self, delta: &Self::Delta);
}
