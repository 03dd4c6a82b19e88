use alloc::collections::{btree_map, BTreeMap};
use core::borrow::Borrow;

use crate::event_log::{Event, EventLog};
use crate::events::{DictOp, OpCrdt};
use crate::{Crdt, DeltaCrdt};

/// A last-write-wins element dictionary (LWW-Element-Dict).
///
/// Every insertion and removal is recorded in an append-only log together
/// with its caller-supplied timestamp. The value reported for a key is the
/// latest insertion that no removal at the same or a later timestamp
/// dominates. Because the reported state depends only on the logs, replicas
/// that have seen the same events agree no matter in which order the events
/// arrived.
///
/// Conflict rules per key:
/// - a removal wins over an insertion with an equal or earlier timestamp;
/// - among surviving insertions the greatest timestamp wins;
/// - insertions with equal timestamps are ordered by value, greatest first.
///
/// Cloning copies the logs and the view as they are; [`from_logs`] and
/// deserialization recompute the view instead.
///
/// [`from_logs`]: LWWElementDict::from_logs
///
/// # Example
///
/// ```
/// use lww_element_dict::prelude::*;
///
/// let mut laptop = LWWElementDict::new();
/// laptop.insert("theme", "dark", 10);
///
/// let mut phone = LWWElementDict::new();
/// phone.insert("theme", "light", 20);
/// phone.remove("font", "mono", 5);
///
/// laptop.merge(&phone);
/// assert_eq!(laptop.get("theme"), Some(&"light"));
///
/// // Removal at the same timestamp as the insertion wins
/// laptop.remove("theme", "light", 20);
/// assert_eq!(laptop.get("theme"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "DictLogs<K, V, T>", into = "DictLogs<K, V, T>")
)]
pub struct LWWElementDict<K: Ord + Clone, V: Ord + Clone, T: Ord + Clone> {
    added: EventLog<K, V, T>,
    removed: EventLog<K, V, T>,
    current: BTreeMap<K, Event<V, T>>,
}

/// The two event logs of a dictionary, without the derived view.
///
/// This is the form a dictionary takes on the wire: decoding goes through
/// [`LWWElementDict::from_logs`], so the view is always recomputed.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DictLogs<K: Ord + Clone, V: Ord + Clone, T: Ord + Clone> {
    /// Insertion events.
    pub added: EventLog<K, V, T>,
    /// Removal events.
    pub removed: EventLog<K, V, T>,
}

impl<K: Ord + Clone, V: Ord + Clone, T: Ord + Clone> LWWElementDict<K, V, T> {
    /// Create a new empty dictionary.
    #[must_use]
    pub fn new() -> Self {
        Self {
            added: EventLog::new(),
            removed: EventLog::new(),
            current: BTreeMap::new(),
        }
    }

    /// Rebuild a dictionary from its logs, recomputing the current view.
    #[must_use]
    pub fn from_logs(added: EventLog<K, V, T>, removed: EventLog<K, V, T>) -> Self {
        let mut dict = Self::new();
        dict.absorb(&added, &removed);
        dict
    }

    /// Record an insertion of `value` under `key` at `timestamp`.
    ///
    /// Recording the exact same triple twice has no further effect.
    pub fn insert(&mut self, key: K, value: V, timestamp: T) {
        self.apply_insert(key, Event::new(value, timestamp));
    }

    /// Record a removal of `key` at `timestamp`.
    ///
    /// The removal hides whatever value is current for `key` if its
    /// timestamp is equal to or later than the current one, regardless of
    /// which value it names.
    pub fn remove(&mut self, key: K, value: V, timestamp: T) {
        self.apply_remove(key, Event::new(value, timestamp));
    }

    /// Same as [`insert`](Self::insert); a new value is just a later
    /// insertion.
    pub fn update(&mut self, key: K, value: V, timestamp: T) {
        self.insert(key, value, timestamp);
    }

    /// Get the current value for `key`, if any.
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.current.get(key).map(|event| &event.value)
    }

    /// Get the current value for `key` along with the timestamp of the
    /// insertion that put it there.
    #[must_use]
    pub fn get_entry<Q>(&self, key: &Q) -> Option<(&V, &T)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.current
            .get(key)
            .map(|event| (&event.value, &event.timestamp))
    }

    /// Check if `key` currently has a value.
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.current.contains_key(key)
    }

    /// Number of keys that currently have a value.
    #[must_use]
    pub fn len(&self) -> usize {
        self.current.len()
    }

    /// Check if no key currently has a value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// Iterate over live `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.current.iter().map(|(key, event)| (key, &event.value))
    }

    /// Iterate over keys that currently have a value.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.current.keys()
    }

    /// The insertion log.
    #[must_use]
    pub fn added(&self) -> &EventLog<K, V, T> {
        &self.added
    }

    /// The removal log (tombstones).
    #[must_use]
    pub fn removed(&self) -> &EventLog<K, V, T> {
        &self.removed
    }

    /// The current view: the live value and its timestamp for each key.
    #[must_use]
    pub fn current(&self) -> &BTreeMap<K, Event<V, T>> {
        &self.current
    }

    /// Enumerate the full history as operations: all insertions, then all
    /// removals.
    ///
    /// Replaying these into an empty dictionary, in any order, reproduces
    /// this one.
    pub fn ops(&self) -> impl Iterator<Item = DictOp<K, V, T>> + '_ {
        let inserts = self.added.iter().map(|(key, event)| DictOp::Insert {
            key: key.clone(),
            value: event.value.clone(),
            timestamp: event.timestamp.clone(),
        });
        let removes = self.removed.iter().map(|(key, event)| DictOp::Remove {
            key: key.clone(),
            value: event.value.clone(),
            timestamp: event.timestamp.clone(),
        });
        inserts.chain(removes)
    }

    /// Split into the two logs, dropping the derived view.
    #[must_use]
    pub fn into_logs(self) -> DictLogs<K, V, T> {
        DictLogs {
            added: self.added,
            removed: self.removed,
        }
    }

    fn apply_insert(&mut self, key: K, event: Event<V, T>) -> bool {
        if !self.added.record(key.clone(), event.clone()) {
            return false;
        }
        self.project_insert(key, event);
        true
    }

    fn apply_remove(&mut self, key: K, event: Event<V, T>) -> bool {
        if !self.removed.record(key.clone(), event.clone()) {
            return false;
        }
        self.project_remove(&key, &event);
        true
    }

    fn project_insert(&mut self, key: K, event: Event<V, T>) {
        if let Some(last_removal) = self.removed.latest_timestamp(&key) {
            if *last_removal >= event.timestamp {
                tracing::trace!("insertion shadowed by a removal at the same or a later time");
                return;
            }
        }

        match self.current.entry(key) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(event);
            }
            btree_map::Entry::Occupied(mut slot) => {
                let live = slot.get();
                if (&event.timestamp, &event.value) > (&live.timestamp, &live.value) {
                    slot.insert(event);
                }
            }
        }
    }

    fn project_remove(&mut self, key: &K, event: &Event<V, T>) {
        let dominated = self
            .current
            .get(key)
            .is_some_and(|live| event.timestamp >= live.timestamp);
        if dominated {
            tracing::trace!("removal hides the current value");
            self.current.remove(key);
        }
    }

    /// Fold foreign logs in, projecting only what is new here. Returns the
    /// number of accepted insertions and removals.
    fn absorb(
        &mut self,
        added: &EventLog<K, V, T>,
        removed: &EventLog<K, V, T>,
    ) -> (usize, usize) {
        let mut inserted = 0;
        for (key, event) in added.iter() {
            if self.apply_insert(key.clone(), event.clone()) {
                inserted += 1;
            }
        }

        let mut tombstoned = 0;
        for (key, event) in removed.iter() {
            if self.apply_remove(key.clone(), event.clone()) {
                tombstoned += 1;
            }
        }

        (inserted, tombstoned)
    }
}

impl<K: Ord + Clone, V: Ord + Clone, T: Ord + Clone> Default for LWWElementDict<K, V, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + Clone, V: Ord + Clone, T: Ord + Clone> Crdt for LWWElementDict<K, V, T> {
    fn merge(&mut self, other: &Self) {
        let (inserted, tombstoned) = self.absorb(&other.added, &other.removed);
        tracing::debug!(inserted, tombstoned, live = self.current.len(), "merged replica");
    }
}

/// Delta for [`LWWElementDict`]: the events one replica has that another
/// lacks.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DictDelta<K: Ord + Clone, V: Ord + Clone, T: Ord + Clone> {
    added: EventLog<K, V, T>,
    removed: EventLog<K, V, T>,
}

impl<K: Ord + Clone, V: Ord + Clone, T: Ord + Clone> DictDelta<K, V, T> {
    /// Insertion events carried by this delta.
    #[must_use]
    pub fn added(&self) -> &EventLog<K, V, T> {
        &self.added
    }

    /// Removal events carried by this delta.
    #[must_use]
    pub fn removed(&self) -> &EventLog<K, V, T> {
        &self.removed
    }

    /// Total number of events carried.
    #[must_use]
    pub fn len(&self) -> usize {
        self.added.len() + self.removed.len()
    }

    /// Check if the delta carries nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

impl<K: Ord + Clone, V: Ord + Clone, T: Ord + Clone> DeltaCrdt for LWWElementDict<K, V, T> {
    type Delta = DictDelta<K, V, T>;

    fn delta(&self, other: &Self) -> DictDelta<K, V, T> {
        DictDelta {
            added: self.added.difference(&other.added),
            removed: self.removed.difference(&other.removed),
        }
    }

    fn apply_delta(&mut self, delta: &DictDelta<K, V, T>) {
        let (inserted, tombstoned) = self.absorb(&delta.added, &delta.removed);
        tracing::debug!(inserted, tombstoned, live = self.current.len(), "applied delta");
    }
}

impl<K: Ord + Clone, V: Ord + Clone, T: Ord + Clone> OpCrdt for LWWElementDict<K, V, T> {
    type Op = DictOp<K, V, T>;

    fn apply_op(&mut self, op: &DictOp<K, V, T>) {
        match op {
            DictOp::Insert {
                key,
                value,
                timestamp,
            } => self.insert(key.clone(), value.clone(), timestamp.clone()),
            DictOp::Remove {
                key,
                value,
                timestamp,
            } => self.remove(key.clone(), value.clone(), timestamp.clone()),
        }
    }
}

impl<K: Ord + Clone, V: Ord + Clone, T: Ord + Clone> Extend<DictOp<K, V, T>>
    for LWWElementDict<K, V, T>
{
    fn extend<I: IntoIterator<Item = DictOp<K, V, T>>>(&mut self, iter: I) {
        for op in iter {
            match op {
                DictOp::Insert {
                    key,
                    value,
                    timestamp,
                } => self.insert(key, value, timestamp),
                DictOp::Remove {
                    key,
                    value,
                    timestamp,
                } => self.remove(key, value, timestamp),
            }
        }
    }
}

impl<K: Ord + Clone, V: Ord + Clone, T: Ord + Clone> FromIterator<DictOp<K, V, T>>
    for LWWElementDict<K, V, T>
{
    fn from_iter<I: IntoIterator<Item = DictOp<K, V, T>>>(iter: I) -> Self {
        let mut dict = Self::new();
        dict.extend(iter);
        dict
    }
}

impl<K: Ord + Clone, V: Ord + Clone, T: Ord + Clone> From<DictLogs<K, V, T>>
    for LWWElementDict<K, V, T>
{
    fn from(logs: DictLogs<K, V, T>) -> Self {
        Self::from_logs(logs.added, logs.removed)
    }
}

impl<K: Ord + Clone, V: Ord + Clone, T: Ord + Clone> From<LWWElementDict<K, V, T>>
    for DictLogs<K, V, T>
{
    fn from(dict: LWWElementDict<K, V, T>) -> Self {
        dict.into_logs()
    }
}
