//! # lww-element-dict
//!
//! A last-write-wins element dictionary: a CRDT that lets replicas record
//! insertions and removals of keys independently and merge their histories
//! later into an identical state, without coordination.
//!
//! Every replica keeps two append-only logs (insertions and removals) and a
//! materialized view derived from them. Timestamps are supplied by the caller
//! and only compared, so any totally ordered type works: integers, wall-clock
//! instants, hybrid logical clocks or `(time, replica_id)` pairs.
//!
//! ## Quick Start
//!
//! ```
//! use lww_element_dict::prelude::*;
//!
//! let mut a = LWWElementDict::new();
//! a.insert("max_connections", 100, 1);
//!
//! let mut b = LWWElementDict::new();
//! b.insert("max_connections", 250, 2);
//! b.remove("debug", 1, 2);
//!
//! a.merge(&b);
//! assert_eq!(a.get("max_connections"), Some(&250));
//! ```
//!
//! ## Conflict resolution
//!
//! - A removal hides an insertion with an equal or earlier timestamp.
//! - The surviving insertion with the greatest timestamp is current.
//! - Insertions with equal timestamps are ordered by value.
//!
//! ## Synchronization
//!
//! Besides full-state [`Crdt::merge`], replicas can exchange compact deltas
//! ([`DeltaCrdt`]) or individual operations ([`events::OpCrdt`]). All three
//! paths converge to the same state.
//!
//! ## Threads
//!
//! With the default `std` feature, [`SharedDict`] wraps a dictionary in a
//! reader-writer lock for use from several threads.
//!
//! ## `no_std` Support
//!
//! Disable default features to build with `alloc` only. [`SharedDict`] is
//! unavailable in that configuration.
//!
//! ```toml
//! [dependencies]
//! lww-element-dict = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

mod crdt;
mod dict;
mod event_log;
#[cfg(feature = "std")]
mod shared;

pub mod events;
pub mod prelude;

pub use crdt::{Crdt, DeltaCrdt};
pub use dict::{DictDelta, DictLogs, LWWElementDict};
pub use event_log::{Event, EventLog};
pub use events::DictOp;
#[cfg(feature = "std")]
pub use shared::SharedDict;
