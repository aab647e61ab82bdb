//! Run-length compressed snapshot sequences
//!
//! A [`SnapshotSequence`] is an ordered timeline of static views in which
//! consecutive equal views are stored once, together with a repetition count.
//! No two adjacent runs ever hold equal views, whether views arrive by
//! appending or by insertion at an arbitrary logical index.

use tracing::trace;

use crate::cursor::RangeCursor;
use crate::graph::NodeId;
use crate::view::StaticGraph;
use crate::{Error, Result};

/// One view repeated `len()` consecutive times
#[derive(Debug, Clone, PartialEq)]
pub struct Run<G> {
    view: G,
    length: usize,
}

impl<G> Run<G> {
    /// The repeated view
    pub fn view(&self) -> &G {
        &self.view
    }

    /// Number of repetitions, always at least one
    pub fn len(&self) -> usize {
        self.length
    }

    /// Whether the run has no repetitions; never true for runs held by a sequence
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
}

/// Ordered, run-length compressed list of views
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotSequence<G> {
    runs: Vec<Run<G>>,
    total: usize,
}

impl<G> Default for SnapshotSequence<G> {
    fn default() -> Self {
        Self {
            runs: Vec::new(),
            total: 0,
        }
    }
}

impl<G> SnapshotSequence<G> {
    /// Create an empty sequence
    pub fn new() -> Self {
        Self::default()
    }

    /// Logical number of views
    pub fn len(&self) -> usize {
        self.total
    }

    /// Whether the sequence holds no views
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Number of stored runs
    pub fn number_of_runs(&self) -> usize {
        self.runs.len()
    }

    /// The stored runs in order
    pub fn runs(&self) -> &[Run<G>] {
        &self.runs
    }

    /// Lazy cursor over logical indices `[start, end)`
    pub fn range(&self, start: usize, end: usize) -> RangeCursor<'_, G> {
        RangeCursor::new(&self.runs, self.total, start, end)
    }

    /// Lazy cursor over every logical view
    pub fn iter(&self) -> RangeCursor<'_, G> {
        self.range(0, self.total)
    }

    /// View at a logical index
    pub fn get(&self, index: usize) -> Option<&G> {
        self.range(index, index.saturating_add(1)).next()
    }

    /// Views at the given logical indices, in the order given.
    ///
    /// Walks the runs once over `[min, max + 1)` rather than once per index.
    pub fn indexed_fetch(&self, indices: &[usize]) -> Result<Vec<&G>> {
        let (Some(&min), Some(&max)) = (indices.iter().min(), indices.iter().max()) else {
            return Ok(Vec::new());
        };
        if max >= self.total {
            return Err(Error::IndexOutOfRange {
                index: max as i64,
                len: self.total,
            });
        }

        let window: Vec<&G> = self.range(min, max + 1).collect();
        Ok(indices.iter().map(|&i| window[i - min]).collect())
    }
}

impl<G: PartialEq> SnapshotSequence<G> {
    /// Append one view, extending the last run when it holds an equal view
    pub fn append(&mut self, view: G) {
        self.total += 1;
        if let Some(last) = self.runs.last_mut() {
            if last.view == view {
                last.length += 1;
                return;
            }
        }
        self.runs.push(Run { view, length: 1 });
    }

    /// Place a run between `runs[pos - 1]` and `runs[pos]`, merging with an
    /// equal neighbour
    fn place_run(&mut self, pos: usize, view: G, run_length: usize) {
        self.total += run_length;
        if pos > 0 && self.runs[pos - 1].view == view {
            self.runs[pos - 1].length += run_length;
            return;
        }
        if let Some(next) = self.runs.get_mut(pos) {
            if next.view == view {
                next.length += run_length;
                return;
            }
        }
        self.runs.insert(pos, Run { view, length: run_length });
    }
}

impl<G: PartialEq + Clone> SnapshotSequence<G> {
    /// Insert `run_length` copies of `view` so the first lands at logical `index`.
    ///
    /// - At a run boundary the new run goes right after the run holding
    ///   `index - 1` (index 0 inserts at the front).
    /// - Inside a run the run is split into prefix, new run and suffix.
    /// - Past the end, the last run is stretched to close the gap first.
    ///
    /// Equal neighbours are merged so the compression invariant holds.
    pub fn insert_at(&mut self, index: isize, view: G, run_length: usize) -> Result<()> {
        if index < 0 {
            return Err(Error::IndexOutOfRange {
                index: index as i64,
                len: self.total,
            });
        }
        if run_length == 0 {
            return Err(Error::InvalidArgument("run length must be at least 1".to_string()));
        }
        let index = index as usize;

        if index > self.total {
            let gap = index - self.total;
            let Some(last) = self.runs.last_mut() else {
                return Err(Error::IndexOutOfRange {
                    index: index as i64,
                    len: 0,
                });
            };
            last.length += gap;
            self.total += gap;
            trace!(index, gap, "stretched last run to reach insertion point");
            let end = self.runs.len();
            self.place_run(end, view, run_length);
            return Ok(());
        }

        let mut traveled = 0;
        for pos in 0..self.runs.len() {
            if index == traveled {
                self.place_run(pos, view, run_length);
                return Ok(());
            }

            let length = self.runs[pos].length;
            if index < traveled + length {
                self.split_run(pos, index - traveled, view, run_length);
                return Ok(());
            }
            traveled += length;
        }

        let end = self.runs.len();
        self.place_run(end, view, run_length);
        Ok(())
    }

    fn split_run(&mut self, pos: usize, offset: usize, view: G, run_length: usize) {
        self.total += run_length;
        let run = &mut self.runs[pos];
        if run.view == view {
            run.length += run_length;
            return;
        }

        let suffix = Run {
            view: run.view.clone(),
            length: run.length - offset,
        };
        run.length = offset;
        trace!(pos, offset, run_length, "splitting run");
        self.runs.splice(
            pos + 1..pos + 1,
            [Run { view, length: run_length }, suffix],
        );
    }
}

impl<G: PartialEq> FromIterator<G> for SnapshotSequence<G> {
    fn from_iter<I: IntoIterator<Item = G>>(iter: I) -> Self {
        let mut seq = Self::new();
        seq.extend(iter);
        seq
    }
}

impl<G: PartialEq> Extend<G> for SnapshotSequence<G> {
    fn extend<I: IntoIterator<Item = G>>(&mut self, iter: I) {
        for view in iter {
            self.append(view);
        }
    }
}

impl<'a, G> IntoIterator for &'a SnapshotSequence<G> {
    type Item = &'a G;
    type IntoIter = RangeCursor<'a, G>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Per-snapshot queries over lists of logical indices
impl<N: NodeId> SnapshotSequence<StaticGraph<N>> {
    fn fetch_nonempty(&self, sbunch: &[usize]) -> Result<Vec<&StaticGraph<N>>> {
        if sbunch.is_empty() {
            return Err(Error::InvalidArgument("no snapshot indices given".to_string()));
        }
        self.indexed_fetch(sbunch)
    }

    /// Node count of each requested snapshot
    pub fn number_of_nodes(&self, sbunch: &[usize]) -> Result<Vec<usize>> {
        Ok(self
            .fetch_nonempty(sbunch)?
            .into_iter()
            .map(StaticGraph::number_of_nodes)
            .collect())
    }

    /// Order (node count) of each requested snapshot
    pub fn order(&self, sbunch: &[usize]) -> Result<Vec<usize>> {
        self.number_of_nodes(sbunch)
    }

    /// Edge count of each requested snapshot
    pub fn size(&self, sbunch: &[usize]) -> Result<Vec<usize>> {
        Ok(self
            .fetch_nonempty(sbunch)?
            .into_iter()
            .map(StaticGraph::number_of_edges)
            .collect())
    }

    /// Whether `id` is present in each requested snapshot
    pub fn has_node(&self, id: &N, sbunch: &[usize]) -> Result<Vec<bool>> {
        Ok(self
            .fetch_nonempty(sbunch)?
            .into_iter()
            .map(|g| g.has_node(id))
            .collect())
    }

    /// Degrees of the `nbunch` nodes present in each requested snapshot
    pub fn degree(&self, sbunch: &[usize], nbunch: &[N]) -> Result<Vec<Vec<(N, usize)>>> {
        Ok(self
            .fetch_nonempty(sbunch)?
            .into_iter()
            .map(|g| {
                nbunch
                    .iter()
                    .filter_map(|n| g.degree(n).map(|d| (n.clone(), d)))
                    .collect()
            })
            .collect())
    }

    /// Induced subgraphs of the requested snapshots, compressed into a new sequence.
    ///
    /// A single node list applies to every snapshot; otherwise there must be
    /// exactly one node list per requested snapshot.
    pub fn subgraph(&self, sbunch: &[usize], nbunch: &[Vec<N>]) -> Result<Self> {
        if nbunch.len() != 1 && nbunch.len() != sbunch.len() {
            return Err(Error::SizeMismatch {
                expected: sbunch.len(),
                actual: nbunch.len(),
            });
        }

        let views = self.fetch_nonempty(sbunch)?;
        Ok(views
            .into_iter()
            .enumerate()
            .map(|(i, g)| {
                let nodes = if nbunch.len() == 1 { &nbunch[0] } else { &nbunch[i] };
                g.subgraph(nodes)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attrs::Attrs;
    use crate::view::StaticView;

    fn lengths<G>(seq: &SnapshotSequence<G>) -> Vec<usize> {
        seq.runs().iter().map(Run::len).collect()
    }

    fn views(seq: &SnapshotSequence<char>) -> String {
        seq.runs().iter().map(|r| *r.view()).collect()
    }

    fn assert_compressed(seq: &SnapshotSequence<char>) {
        for pair in seq.runs().windows(2) {
            assert_ne!(pair[0].view(), pair[1].view());
        }
        assert_eq!(seq.len(), lengths(seq).iter().sum::<usize>());
    }

    #[test]
    fn test_append_compresses() {
        let mut seq = SnapshotSequence::new();
        for _ in 0..7 {
            seq.append('A');
        }

        assert_eq!(seq.len(), 7);
        assert_eq!(seq.number_of_runs(), 1);
        assert_eq!(lengths(&seq), vec![7]);

        seq.append('B');
        seq.append('A');
        assert_eq!(views(&seq), "ABA");
        assert_eq!(lengths(&seq), vec![7, 1, 1]);
    }

    #[test]
    fn test_insert_splits_run() {
        let mut seq: SnapshotSequence<char> = "AAAAA".chars().collect();
        seq.insert_at(2, 'B', 3).unwrap();

        assert_eq!(views(&seq), "ABA");
        assert_eq!(lengths(&seq), vec![2, 3, 3]);
        assert_eq!(seq.len(), 8);
        assert_eq!(seq.iter().collect::<String>(), "AABBBAAA");
    }

    #[test]
    fn test_insert_at_boundary_goes_after_previous_run() {
        let mut seq: SnapshotSequence<char> = "AAABB".chars().collect();
        seq.insert_at(3, 'C', 1).unwrap();

        assert_eq!(views(&seq), "ACB");
        assert_eq!(lengths(&seq), vec![3, 1, 2]);
        assert_eq!(seq.get(3), Some(&'C'));
        assert_compressed(&seq);
    }

    #[test]
    fn test_insert_at_front_and_end() {
        let mut seq: SnapshotSequence<char> = "AB".chars().collect();
        seq.insert_at(0, 'C', 2).unwrap();
        seq.insert_at(4, 'D', 1).unwrap();

        assert_eq!(seq.iter().collect::<String>(), "CCABD");
        assert_compressed(&seq);
    }

    #[test]
    fn test_insert_merges_equal_neighbours() {
        let mut seq: SnapshotSequence<char> = "AAABB".chars().collect();

        // Equal to the run before the boundary
        seq.insert_at(3, 'A', 2).unwrap();
        assert_eq!(lengths(&seq), vec![5, 2]);

        // Equal to the run after the boundary
        seq.insert_at(5, 'B', 1).unwrap();
        assert_eq!(lengths(&seq), vec![5, 3]);

        // Equal to the run being split
        seq.insert_at(1, 'A', 4).unwrap();
        assert_eq!(lengths(&seq), vec![9, 3]);
        assert_eq!(seq.len(), 12);
        assert_compressed(&seq);
    }

    #[test]
    fn test_insert_past_end_fills_gap() {
        let mut seq: SnapshotSequence<char> = "AB".chars().collect();
        seq.insert_at(5, 'C', 2).unwrap();

        assert_eq!(seq.iter().collect::<String>(), "ABBBBCC");
        assert_eq!(lengths(&seq), vec![1, 4, 2]);
        assert_eq!(seq.get(5), Some(&'C'));
    }

    #[test]
    fn test_get_out_of_range() {
        let seq: SnapshotSequence<char> = "AB".chars().collect();
        assert_eq!(seq.get(1), Some(&'B'));
        assert_eq!(seq.get(2), None);
        assert_eq!(seq.get(usize::MAX), None);
    }

    #[test]
    fn test_insert_errors_leave_sequence_unchanged() {
        let mut seq: SnapshotSequence<char> = "AAB".chars().collect();
        let before = seq.clone();

        assert!(matches!(
            seq.insert_at(-1, 'C', 1),
            Err(Error::IndexOutOfRange { index: -1, .. })
        ));
        assert!(matches!(seq.insert_at(1, 'C', 0), Err(Error::InvalidArgument(_))));
        assert_eq!(seq, before);

        let mut empty: SnapshotSequence<char> = SnapshotSequence::new();
        assert!(empty.insert_at(3, 'C', 1).is_err());
        empty.insert_at(0, 'C', 2).unwrap();
        assert_eq!(lengths(&empty), vec![2]);
    }

    #[test]
    fn test_indexed_fetch() {
        let seq: SnapshotSequence<char> = "AAABBC".chars().collect();

        let got: String = seq.indexed_fetch(&[1, 3, 5]).unwrap().into_iter().collect();
        assert_eq!(got, "ABC");

        let got: String = seq.indexed_fetch(&[4, 0, 4]).unwrap().into_iter().collect();
        assert_eq!(got, "BAB");

        assert!(seq.indexed_fetch(&[]).unwrap().is_empty());
        assert!(matches!(
            seq.indexed_fetch(&[2, 6]),
            Err(Error::IndexOutOfRange { index: 6, len: 6 })
        ));
    }

    fn graph(edges: &[(u32, u32)]) -> StaticGraph<u32> {
        let mut g = StaticGraph::new();
        for &(u, v) in edges {
            g.add_edge(u, v, Attrs::new());
        }
        g
    }

    fn timeline() -> SnapshotSequence<StaticGraph<u32>> {
        let mut seq = SnapshotSequence::new();
        seq.append(graph(&[(1, 2)]));
        seq.append(graph(&[(1, 2)]));
        seq.append(graph(&[(1, 2), (2, 3)]));
        seq.append(graph(&[(3, 4)]));
        seq
    }

    #[test]
    fn test_snapshot_queries() {
        let seq = timeline();
        assert_eq!(seq.number_of_runs(), 3);

        assert_eq!(seq.number_of_nodes(&[0, 2, 3]).unwrap(), vec![2, 3, 2]);
        assert_eq!(seq.order(&[1]).unwrap(), vec![2]);
        assert_eq!(seq.size(&[0, 2]).unwrap(), vec![1, 2]);
        assert_eq!(seq.has_node(&1, &[0, 3]).unwrap(), vec![true, false]);
        assert_eq!(
            seq.degree(&[1, 2], &[2, 4]).unwrap(),
            vec![vec![(2, 1)], vec![(2, 2)]]
        );

        assert!(matches!(seq.size(&[]), Err(Error::InvalidArgument(_))));
        assert!(matches!(seq.size(&[4]), Err(Error::IndexOutOfRange { .. })));
    }

    #[test]
    fn test_subgraph_per_snapshot() {
        let seq = timeline();

        let shared = seq.subgraph(&[0, 1, 2], &[vec![1, 2]]).unwrap();
        assert_eq!(shared.len(), 3);
        assert_eq!(shared.number_of_runs(), 1);

        let each = seq
            .subgraph(&[2, 3], &[vec![2, 3], vec![3]])
            .unwrap();
        assert_eq!(each.size(&[0, 1]).unwrap(), vec![1, 0]);
        assert_eq!(each.number_of_nodes(&[0, 1]).unwrap(), vec![2, 1]);

        assert!(matches!(
            seq.subgraph(&[0, 1, 2], &[vec![1], vec![2]]),
            Err(Error::SizeMismatch { expected: 3, actual: 2 })
        ));
    }
}
