//! Simple example demonstrating IntervalGraph functionality
//!
//! This example shows edge insertion, idempotent updates, aliased attributes
//! and window extraction.

use intervalgraph::attrs::attrs;
use intervalgraph::{Attrs, Error, StaticGraph, TemporalGraph, ViewOptions};

fn main() -> Result<(), Error> {
    let mut graph = TemporalGraph::new();

    println!("=== Basic Operations ===");

    graph.add_edge("alice", "bob", 0, 5, attrs([("kind", "call".into())]))?;
    graph.add_edge("bob", "carol", 3, 8, attrs([("kind", "sms".into())]))?;
    graph.add_edge("alice", "carol", 9, 12, Attrs::new())?;
    println!(
        "Inserted {} edge intervals over {} nodes",
        graph.number_of_edges(),
        graph.number_of_nodes()
    );

    // Re-adding the same interval updates it in place
    graph.add_edge("bob", "alice", 0, 5, attrs([("duration", 42.into())]))?;
    println!("Edge intervals after re-add: {}", graph.number_of_edges());

    // Both endpoints see the same attribute cell
    if let Some(shared) = graph.edge_attrs(&"alice", &"bob", 0, 5) {
        shared.set("flagged", true);
    }
    if let Some(shared) = graph.edge_attrs(&"bob", &"alice", 0, 5) {
        println!("alice-bob attributes seen from bob: {:?}", shared.snapshot());
    }

    println!("\n=== Window Operations ===");

    let options = ViewOptions::default()
        .with_edge_attrs(true)
        .with_interval_attrs(true);
    for (begin, end) in [(0, 4), (4, 9), (9, 13)] {
        let view: StaticGraph<&str> = graph.extract_view(begin, end, &options)?;
        let edges: Vec<String> = view.edges().map(|(u, v)| format!("{}-{}", u, v)).collect();
        println!("[{}, {}): {}", begin, end, edges.join(", "));
    }

    println!("\n=== Error Handling ===");

    match graph.add_edge("dave", "erin", 7, 7, Attrs::new()) {
        Err(err) => println!("Rejected: {}", err),
        Ok(()) => println!("Unexpectedly accepted an empty interval"),
    }
    println!("dave present after rejected add: {}", graph.has_node(&"dave"));

    Ok(())
}
