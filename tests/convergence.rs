//! Integration tests for conflict resolution and replica convergence.
//!
//! Timestamps here are wall-clock instants, the way a host application
//! stamping writes with its system clock would use the dictionary.

use chrono::{DateTime, Duration, Utc};
use lww_element_dict::prelude::*;

type Dict = LWWElementDict<char, i32, DateTime<Utc>>;

fn flatten(dict: &Dict) -> Vec<(char, i32, DateTime<Utc>)> {
    dict.added()
        .iter()
        .map(|(key, event)| (*key, event.value, event.timestamp))
        .collect()
}

#[test]
fn multiple_inserts_in_chronological_order() {
    let t1 = Utc::now();
    let t2 = t1 + Duration::minutes(4);

    let mut dict = Dict::new();
    dict.insert('A', 10, t1);
    dict.insert('A', 20, t2);

    assert_eq!(dict.get(&'A'), Some(&20));
}

#[test]
fn multiple_inserts_out_of_chronological_order() {
    let t1 = Utc::now();
    let t2 = t1 + Duration::minutes(4);

    let mut dict = Dict::new();
    dict.insert('A', 20, t2);
    dict.insert('A', 10, t1);

    assert_eq!(dict.get(&'A'), Some(&20), "only timestamps decide, not call order");
}

#[test]
fn removal_after_insert() {
    let t1 = Utc::now();
    let t2 = t1 + Duration::minutes(4);

    let mut dict = Dict::new();
    dict.insert('A', 10, t1);
    dict.remove('A', 10, t2);

    assert!(dict.get(&'A').is_none());
}

#[test]
fn removal_before_insert() {
    let t1 = Utc::now();
    let t2 = t1 + Duration::minutes(4);

    let mut dict = Dict::new();
    dict.insert('A', 10, t2);
    dict.remove('A', 10, t1);

    assert!(dict.get(&'A').is_some());
}

#[test]
fn concurrent_insert_and_removal() {
    let t = Utc::now();

    let mut dict = Dict::new();
    dict.insert('A', 10, t);
    dict.remove('A', 10, t);

    assert!(dict.get(&'A').is_none());
}

#[test]
fn concurrent_removal_delivered_first() {
    let t = Utc::now();

    let mut dict = Dict::new();
    dict.remove('A', 10, t);
    dict.insert('A', 10, t);

    assert!(dict.get(&'A').is_none());
}

#[test]
fn merge_unions_logs_in_order() {
    let t1 = Utc::now();
    let t2 = t1 + Duration::minutes(4);

    let mut dict1 = Dict::new();
    dict1.insert('A', 10, t1);
    dict1.insert('A', 20, t2);
    dict1.insert('A', 10, t2);
    dict1.insert('B', 10, t1);
    dict1.insert('B', 10, t2);
    dict1.insert('B', 20, t1);
    dict1.insert('B', 20, t2);

    let mut dict2 = Dict::new();
    dict2.insert('A', 20, t1);
    dict2.insert('B', 10, t2);
    dict2.insert('B', 20, t1);

    dict2.merge(&dict1);

    let expected = vec![
        ('A', 10, t1),
        ('A', 10, t2),
        ('A', 20, t1),
        ('A', 20, t2),
        ('B', 10, t1),
        ('B', 10, t2),
        ('B', 20, t1),
        ('B', 20, t2),
    ];
    assert_eq!(flatten(&dict2), expected);

    // Both keys hold two values at t2; the greater value takes the tie
    assert_eq!(dict2.get(&'A'), Some(&20));
    assert_eq!(dict2.get(&'B'), Some(&20));

    // The source replica keeps its own history only
    assert_eq!(dict1.added().len(), 7);
}

#[test]
fn merge_matches_direct_replay() {
    let t0 = Utc::now();
    let at = |minutes: i64| t0 + Duration::minutes(minutes);

    let mut alice = Dict::new();
    alice.insert('A', 1, at(1));
    alice.insert('B', 1, at(1));
    alice.remove('A', 1, at(3));
    alice.insert('B', 2, at(6));

    let mut bob = Dict::new();
    bob.insert('A', 5, at(2));
    bob.insert('A', 7, at(4));
    bob.insert('B', 1, at(1));
    bob.remove('B', 2, at(5));

    let mut replayed = Dict::new();
    for op in alice.ops().chain(bob.ops()) {
        replayed.apply_op(&op);
    }

    let mut merged = alice.clone();
    merged.merge(&bob);

    assert_eq!(merged, replayed);
    assert_eq!(merged.get(&'A'), Some(&7));
    assert_eq!(merged.get(&'B'), Some(&2));
    assert_eq!(merged.added().len(), 5, "shared ('B', 1) insertion is stored once");
    assert_eq!(merged.removed().len(), 2);
}

#[test]
fn three_way_convergence() {
    let mut a = LWWElementDict::new();
    let mut b = LWWElementDict::new();
    let mut c = LWWElementDict::new();

    a.insert("mode", "primary", 10u64);
    a.remove("replica-2", "up", 12);
    b.insert("mode", "standby", 11);
    b.insert("replica-2", "up", 11);
    c.insert("replica-3", "up", 9);
    c.remove("mode", "standby", 11);

    let mut order1 = a.clone();
    order1.merge(&b);
    order1.merge(&c);

    let mut order2 = c.clone();
    order2.merge(&a);
    order2.merge(&b);

    let mut bc = b.clone();
    bc.merge(&c);
    let mut order3 = a.clone();
    order3.merge(&bc);

    assert_eq!(order1, order2);
    assert_eq!(order1, order3);
    assert_eq!(order1.get("mode"), None, "removal at 11 hides the write at 11");
    assert_eq!(order1.get("replica-2"), None);
    assert_eq!(order1.get("replica-3"), Some(&"up"));
}

#[test]
fn repeated_merge_is_idempotent() {
    let mut a = LWWElementDict::new();
    a.insert(1, "x", 1);
    a.remove(2, "y", 3);

    let mut b = LWWElementDict::new();
    b.insert(2, "y", 2);
    b.insert(3, "z", 2);

    a.merge(&b);
    let snapshot = a.clone();

    a.merge(&b);
    assert_eq!(a, snapshot, "Merge should be idempotent");

    a.merge(&snapshot);
    assert_eq!(a, snapshot, "Merging a copy of itself changes nothing");
}

#[test]
fn delta_sync_matches_full_merge() {
    let mut a = LWWElementDict::new();
    let mut b = LWWElementDict::new();

    for i in 0..20u32 {
        a.insert(i % 4, i, i);
        if i % 3 == 0 {
            b.remove(i % 4, i, i + 1);
        }
    }

    let mut full = b.clone();
    full.merge(&a);

    let mut via_delta = b.clone();
    via_delta.apply_delta(&a.delta(&b));

    assert_eq!(full, via_delta);
    assert!(a.delta(&via_delta).is_empty());
}

#[test]
fn per_key_log_order_is_value_then_time() {
    let mut dict = LWWElementDict::new();
    dict.insert('k', 3, 30u32);
    dict.insert('k', 1, 20);
    dict.insert('k', 3, 10);
    dict.insert('k', 1, 40);

    for (key, events) in dict.added() {
        assert_eq!(*key, 'k');
        let order: Vec<(i32, u32)> = events.iter().map(|e| (e.value, e.timestamp)).collect();
        assert_eq!(order, vec![(1, 20), (1, 40), (3, 10), (3, 30)]);
    }
}
