//! Snapshot timeline example
//!
//! Splits a temporal graph into equal-width windows, compresses them into a
//! snapshot sequence, and reads it back through lazy cursors.

use intervalgraph::{Attrs, Error, SnapshotSequence, StaticGraph, TemporalGraph, ViewOptions};

fn main() -> Result<(), Error> {
    let mut graph = TemporalGraph::new();
    graph.add_edge(1u32, 2, 0, 40, Attrs::new())?;
    graph.add_edge(2, 3, 30, 60, Attrs::new())?;
    graph.add_edge(3, 4, 70, 100, Attrs::new())?;

    let mut timeline: SnapshotSequence<StaticGraph<u32>> =
        graph.to_snapshot_sequence(10, &ViewOptions::default())?;
    println!(
        "{} snapshots stored as {} runs",
        timeline.len(),
        timeline.number_of_runs()
    );

    for (i, view) in timeline.range(2, 7).enumerate() {
        println!("  snapshot {}: {} edges", i + 2, view.number_of_edges());
    }

    // Insert an empty snapshot into the middle of a run
    timeline.insert_at(1, StaticGraph::new(), 1)?;
    println!(
        "after insert: {} snapshots in {} runs",
        timeline.len(),
        timeline.number_of_runs()
    );

    println!("edge counts at 0, 1, 5: {:?}", timeline.size(&[0, 1, 5])?);
    println!("node 3 present at 0, 5, 8: {:?}", timeline.has_node(&3, &[0, 5, 8])?);

    Ok(())
}
