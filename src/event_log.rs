//! Append-only, deduplicated event logs partitioned by key.
//!
//! A dictionary keeps two of these: one for insertions and one for
//! removals (tombstones). Entries are never mutated or pruned.

use alloc::collections::btree_map;
use alloc::collections::{BTreeMap, BTreeSet};

/// A single observation: a value seen for a key at a given timestamp.
///
/// Events order by value first and timestamp second, which is the order a
/// key's entries are kept in inside an [`EventLog`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Event<V, T> {
    /// The observed value.
    pub value: V,
    /// When the observation happened.
    pub timestamp: T,
}

impl<V, T> Event<V, T> {
    /// Create a new event.
    pub fn new(value: V, timestamp: T) -> Self {
        Self { value, timestamp }
    }
}

/// Per-key ordered record of events.
///
/// Within one key, entries are grouped by value and ascend by timestamp
/// inside each group. The exact `(value, timestamp)` pair is stored at most
/// once; the same value may appear at several timestamps and the same
/// timestamp with several values.
///
/// # Example
///
/// ```
/// use lww_element_dict::{Event, EventLog};
///
/// let mut log = EventLog::new();
/// assert!(log.record("k", Event::new(20, 1)));
/// assert!(log.record("k", Event::new(10, 5)));
/// assert!(log.record("k", Event::new(10, 2)));
/// assert!(!log.record("k", Event::new(10, 2))); // duplicate
///
/// let order: Vec<(i32, i32)> = log
///     .events(&"k")
///     .map(|e| (e.value, e.timestamp))
///     .collect();
/// assert_eq!(order, vec![(10, 2), (10, 5), (20, 1)]);
/// assert_eq!(log.latest_timestamp(&"k"), Some(&5));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "RawEventLog<K, V, T>")
)]
pub struct EventLog<K: Ord + Clone, V: Ord + Clone, T: Ord + Clone> {
    entries: BTreeMap<K, BTreeSet<Event<V, T>>>,
}

/// Wire shape of an [`EventLog`]; decoded input may carry keys with no
/// events, which are dropped on conversion.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawEventLog<K: Ord + Clone, V: Ord + Clone, T: Ord + Clone> {
    entries: BTreeMap<K, BTreeSet<Event<V, T>>>,
}

#[cfg(feature = "serde")]
impl<K: Ord + Clone, V: Ord + Clone, T: Ord + Clone> From<RawEventLog<K, V, T>>
    for EventLog<K, V, T>
{
    fn from(raw: RawEventLog<K, V, T>) -> Self {
        Self {
            entries: raw
                .entries
                .into_iter()
                .filter(|(_, events)| !events.is_empty())
                .collect(),
        }
    }
}

impl<K: Ord + Clone, V: Ord + Clone, T: Ord + Clone> EventLog<K, V, T> {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Record an event for `key`, keeping the per-key order.
    ///
    /// Returns `true` if the event was new, `false` if the identical
    /// `(value, timestamp)` pair was already recorded for this key.
    pub fn record(&mut self, key: K, event: Event<V, T>) -> bool {
        self.entries.entry(key).or_default().insert(event)
    }

    /// Check whether the exact event is recorded for `key`.
    #[must_use]
    pub fn contains(&self, key: &K, event: &Event<V, T>) -> bool {
        self.entries
            .get(key)
            .is_some_and(|events| events.contains(event))
    }

    /// Iterate over the events recorded for `key`, in log order.
    pub fn events<'a>(&'a self, key: &K) -> impl Iterator<Item = &'a Event<V, T>> + 'a {
        self.entries.get(key).into_iter().flatten()
    }

    /// The greatest timestamp recorded for `key`, or `None` when the key has
    /// no events.
    #[must_use]
    pub fn latest_timestamp(&self, key: &K) -> Option<&T> {
        self.events(key).map(|event| &event.timestamp).max()
    }

    /// Iterate over the keys that have at least one event.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.keys()
    }

    /// Iterate over every `(key, event)` pair, keys ascending and events in
    /// log order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &Event<V, T>)> {
        self.entries
            .iter()
            .flat_map(|(key, events)| events.iter().map(move |event| (key, event)))
    }

    /// Total number of events across all keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeSet::len).sum()
    }

    /// Number of distinct keys with events.
    #[must_use]
    pub fn key_count(&self) -> usize {
        self.entries.len()
    }

    /// Check if no event has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.values().all(BTreeSet::is_empty)
    }

    /// Events recorded here that `other` does not have.
    #[must_use]
    pub fn difference(&self, other: &Self) -> Self {
        let mut missing = Self::new();
        for (key, event) in self.iter() {
            if !other.contains(key, event) {
                missing.record(key.clone(), event.clone());
            }
        }
        missing
    }
}

impl<K: Ord + Clone, V: Ord + Clone, T: Ord + Clone> Default for EventLog<K, V, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, K: Ord + Clone, V: Ord + Clone, T: Ord + Clone> IntoIterator for &'a EventLog<K, V, T> {
    type Item = (&'a K, &'a BTreeSet<Event<V, T>>);
    type IntoIter = btree_map::Iter<'a, K, BTreeSet<Event<V, T>>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<K: Ord + Clone, V: Ord + Clone, T: Ord + Clone> FromIterator<(K, Event<V, T>)>
    for EventLog<K, V, T>
{
    fn from_iter<I: IntoIterator<Item = (K, Event<V, T>)>>(iter: I) -> Self {
        let mut log = Self::new();
        for (key, event) in iter {
            log.record(key, event);
        }
        log
    }
}
