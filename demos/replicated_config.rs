//! Example: a feature-flag table replicated across three offline nodes.
//!
//! Run with `RUST_LOG=debug cargo run --example replicated_config` to see
//! merge summaries.

use std::sync::Arc;
use std::thread;

use lww_element_dict::prelude::*;
use tracing_subscriber::EnvFilter;

/// `(milliseconds, node)`: unique per write, so equal-time writes from
/// different nodes still have a deterministic order.
type Stamp = (u64, u8);

type Flags = SharedDict<&'static str, bool, Stamp>;

fn print_flags(name: &str, dict: &Flags) {
    let flags = dict.read(|d| {
        d.iter()
            .map(|(flag, on)| format!("{flag}={on}"))
            .collect::<Vec<_>>()
            .join(", ")
    });
    println!("{name:>6}: {{{flags}}}");
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Feature flags across partitioned nodes ===\n");

    let eu = Arc::new(Flags::new());
    let us = Arc::new(Flags::new());
    let ap = Arc::new(Flags::new());

    // Shared starting point
    eu.insert("new_checkout", false, (1_000, 1));
    eu.insert("dark_mode", true, (1_000, 1));
    us.merge_from(&eu);
    ap.merge_from(&eu);

    // Network partition: every node keeps writing locally
    let writers = [
        (Arc::clone(&eu), 1u8),
        (Arc::clone(&us), 2u8),
        (Arc::clone(&ap), 3u8),
    ]
    .into_iter()
    .map(|(node, id)| {
        thread::spawn(move || match id {
            1 => node.insert("new_checkout", true, (2_000, id)),
            2 => node.remove("dark_mode", true, (2_500, id)),
            _ => {
                node.insert("new_checkout", false, (2_000, id));
                node.insert("beta_search", true, (3_000, id));
            }
        })
    })
    .collect::<Vec<_>>();
    for writer in writers {
        writer.join().expect("writer thread panicked");
    }

    println!("--- During partition ---");
    print_flags("eu", &eu);
    print_flags("us", &us);
    print_flags("ap", &ap);

    // Gossip: ship only the missing events
    let delta = ap.delta_since(&eu.snapshot());
    println!("\nap -> eu delta carries {} events", delta.len());
    eu.apply_delta(&delta);
    eu.merge_from(&us);
    us.merge_from(&eu);
    ap.merge_from(&eu);

    println!("\n--- After sync ---");
    print_flags("eu", &eu);
    print_flags("us", &us);
    print_flags("ap", &ap);

    assert_eq!(eu.snapshot(), us.snapshot());
    assert_eq!(us.snapshot(), ap.snapshot());
    println!("\nAll replicas converged.");
    println!("new_checkout written by eu and ap at the same millisecond: node 3 wins the tie.");
    println!("dark_mode: removal at 2500 beats the insert at 1000.");
}
