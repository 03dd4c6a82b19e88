//! Thread-safe handle around a dictionary.
//!
//! [`SharedDict`] owns one [`LWWElementDict`] behind a reader-writer lock:
//! insertions, removals and merges are exclusive, lookups run concurrently.
//! Guards are scoped to each call, so no lock is ever held across calls.

use parking_lot::RwLock;

use crate::dict::{DictDelta, LWWElementDict};
use crate::events::{DictOp, OpCrdt};
use crate::{Crdt, DeltaCrdt};

/// A dictionary that can be shared between threads, typically via `Arc`.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use std::thread;
///
/// use lww_element_dict::SharedDict;
///
/// let dict = Arc::new(SharedDict::new());
///
/// let writers: Vec<_> = (0..4u64)
///     .map(|n| {
///         let dict = Arc::clone(&dict);
///         thread::spawn(move || dict.insert("leader", n, n))
///     })
///     .collect();
/// for writer in writers {
///     writer.join().unwrap();
/// }
///
/// // The greatest timestamp wins whatever the thread interleaving was
/// assert_eq!(dict.get("leader"), Some(3));
/// ```
#[derive(Debug)]
pub struct SharedDict<K: Ord + Clone, V: Ord + Clone, T: Ord + Clone> {
    inner: RwLock<LWWElementDict<K, V, T>>,
}

impl<K: Ord + Clone, V: Ord + Clone, T: Ord + Clone> SharedDict<K, V, T> {
    /// Create a new empty shared dictionary.
    #[must_use]
    pub fn new() -> Self {
        Self::from_dict(LWWElementDict::new())
    }

    /// Wrap an existing dictionary.
    #[must_use]
    pub fn from_dict(dict: LWWElementDict<K, V, T>) -> Self {
        Self {
            inner: RwLock::new(dict),
        }
    }

    /// Record an insertion. See [`LWWElementDict::insert`].
    pub fn insert(&self, key: K, value: V, timestamp: T) {
        self.inner.write().insert(key, value, timestamp);
    }

    /// Record a removal. See [`LWWElementDict::remove`].
    pub fn remove(&self, key: K, value: V, timestamp: T) {
        self.inner.write().remove(key, value, timestamp);
    }

    /// Same as [`insert`](Self::insert).
    pub fn update(&self, key: K, value: V, timestamp: T) {
        self.insert(key, value, timestamp);
    }

    /// Get a copy of the current value for `key`, if any.
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: core::borrow::Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.inner.read().get(key).cloned()
    }

    /// Get copies of the current value and its timestamp for `key`.
    #[must_use]
    pub fn get_entry<Q>(&self, key: &Q) -> Option<(V, T)>
    where
        K: core::borrow::Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.inner
            .read()
            .get_entry(key)
            .map(|(value, timestamp)| (value.clone(), timestamp.clone()))
    }

    /// Check if `key` currently has a value.
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: core::borrow::Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.inner.read().contains_key(key)
    }

    /// Number of keys that currently have a value.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Check if no key currently has a value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Run `f` against a consistent view of the dictionary.
    pub fn read<R>(&self, f: impl FnOnce(&LWWElementDict<K, V, T>) -> R) -> R {
        f(&self.inner.read())
    }

    /// Take a stable copy of the whole dictionary.
    #[must_use]
    pub fn snapshot(&self) -> LWWElementDict<K, V, T> {
        self.inner.read().clone()
    }

    /// Merge another shared dictionary into this one.
    ///
    /// The source is read-locked for the duration of the merge. The two
    /// locks are always taken in address order, so concurrent merges in
    /// opposite directions cannot deadlock. Merging a dictionary into itself
    /// does nothing.
    pub fn merge_from(&self, other: &Self) {
        if core::ptr::eq(self, other) {
            return;
        }

        if (self as *const Self) < (other as *const Self) {
            let mut dest = self.inner.write();
            let src = other.inner.read();
            dest.merge(&src);
        } else {
            let src = other.inner.read();
            let mut dest = self.inner.write();
            dest.merge(&src);
        }
    }

    /// Merge a plain dictionary (for instance a decoded remote snapshot).
    pub fn merge_snapshot(&self, other: &LWWElementDict<K, V, T>) {
        self.inner.write().merge(other);
    }

    /// Compute what `other` is missing compared to this dictionary.
    #[must_use]
    pub fn delta_since(&self, other: &LWWElementDict<K, V, T>) -> DictDelta<K, V, T> {
        self.inner.read().delta(other)
    }

    /// Fold a delta received from a peer.
    pub fn apply_delta(&self, delta: &DictDelta<K, V, T>) {
        self.inner.write().apply_delta(delta);
    }

    /// Apply a single operation.
    pub fn apply_op(&self, op: &DictOp<K, V, T>) {
        self.inner.write().apply_op(op);
    }

    /// Unwrap the dictionary.
    #[must_use]
    pub fn into_inner(self) -> LWWElementDict<K, V, T> {
        self.inner.into_inner()
    }
}

impl<K: Ord + Clone, V: Ord + Clone, T: Ord + Clone> Default for SharedDict<K, V, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + Clone, V: Ord + Clone, T: Ord + Clone> Clone for SharedDict<K, V, T> {
    fn clone(&self) -> Self {
        Self::from_dict(self.snapshot())
    }
}

impl<K: Ord + Clone, V: Ord + Clone, T: Ord + Clone> From<LWWElementDict<K, V, T>>
    for SharedDict<K, V, T>
{
    fn from(dict: LWWElementDict<K, V, T>) -> Self {
        Self::from_dict(dict)
    }
}
