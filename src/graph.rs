//! Temporal graph storage
//!
//! Edges are undirected and only exist during a half-open interval. Every
//! edge interval is indexed once in an [`IntervalTree`] and referenced from
//! both endpoints' adjacency tables. All three references share a single
//! attribute cell, so an update through any of them is seen by the others.

use std::fmt::Debug;
use std::hash::Hash;

use ahash::AHashMap;
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::attrs::{Attrs, SharedAttrs};
use crate::config::ViewOptions;
use crate::error::check_interval;
use crate::interval::{Interval, IntervalTree};
use crate::snapshot::SnapshotSequence;
use crate::view::{StaticView, build_view};
use crate::{Error, Result, Timestamp};

/// Requirements on node identifiers
pub trait NodeId: Clone + Eq + Hash + Ord + Debug {}

impl<T: Clone + Eq + Hash + Ord + Debug> NodeId for T {}

/// Unordered endpoint pair, stored with the smaller endpoint first
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeKey<N> {
    /// Smaller endpoint
    pub u: N,
    /// Larger endpoint
    pub v: N,
}

impl<N: Ord> EdgeKey<N> {
    /// Normalize `(u, v)` so that `EdgeKey::new(u, v) == EdgeKey::new(v, u)`
    pub fn new(u: N, v: N) -> Self {
        if u <= v { Self { u, v } } else { Self { u: v, v: u } }
    }
}

/// One edge interval as reported by queries
#[derive(Debug, Clone)]
pub struct EdgeRecord<N> {
    /// First endpoint
    pub u: N,
    /// Second endpoint
    pub v: N,
    /// Interval start (inclusive)
    pub begin: Timestamp,
    /// Interval end (exclusive)
    pub end: Timestamp,
    /// Shared attribute cell of the edge
    pub attrs: SharedAttrs,
}

impl<N: Clone> From<&Interval<EdgeKey<N>, SharedAttrs>> for EdgeRecord<N> {
    fn from(iv: &Interval<EdgeKey<N>, SharedAttrs>) -> Self {
        Self {
            u: iv.key.u.clone(),
            v: iv.key.v.clone(),
            begin: iv.begin,
            end: iv.end,
            attrs: iv.value.clone(),
        }
    }
}

/// Result of splitting a graph into equal-width windows
#[derive(Debug, Clone)]
pub struct Snapshots<G> {
    /// One view per window, in time order
    pub views: Vec<G>,
    /// Width of every window
    pub width: Timestamp,
}

#[derive(Debug, Clone)]
struct EdgeSlot {
    begin: Timestamp,
    end: Timestamp,
    attrs: SharedAttrs,
}

/// Intervals between one pair of nodes; usually a handful
type Slots = SmallVec<[EdgeSlot; 2]>;

/// Undirected graph whose edges exist during time intervals
#[derive(Debug)]
pub struct TemporalGraph<N: NodeId> {
    nodes: AHashMap<N, Attrs>,
    adj: AHashMap<N, AHashMap<N, Slots>>,
    index: IntervalTree<EdgeKey<N>, SharedAttrs>,
}

impl<N: NodeId> Default for TemporalGraph<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: NodeId> TemporalGraph<N> {
    /// Create an empty temporal graph
    pub fn new() -> Self {
        Self {
            nodes: AHashMap::new(),
            adj: AHashMap::new(),
            index: IntervalTree::new(),
        }
    }

    /// Create with estimated capacity
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            nodes: AHashMap::with_capacity(nodes),
            adj: AHashMap::with_capacity(nodes),
            index: IntervalTree::with_capacity(edges),
        }
    }

    /// Add a node, or merge `attrs` into an existing node's attributes
    pub fn add_node(&mut self, id: N, attrs: Attrs) {
        self.adj.entry(id.clone()).or_default();
        self.nodes.entry(id).or_default().extend(attrs);
    }

    /// Add the edge `(u, v)` active during `[begin, end)`.
    ///
    /// Missing endpoints are created. Re-adding an existing interval merges
    /// `attrs` into its shared attributes instead of storing a second copy.
    pub fn add_edge(&mut self, u: N, v: N, begin: Timestamp, end: Timestamp, attrs: Attrs) -> Result<()> {
        check_interval(begin, end)?;

        let key = EdgeKey::new(u.clone(), v.clone());
        if let Some(shared) = self.index.get(begin, end, &key) {
            trace!(?u, ?v, begin, end, "merging attributes into existing edge");
            shared.merge(attrs);
            return Ok(());
        }

        self.add_node(u.clone(), Attrs::new());
        self.add_node(v.clone(), Attrs::new());

        let shared = SharedAttrs::new(attrs);
        self.index.add(begin, end, key, shared.clone())?;
        self.install_slot(&u, &v, begin, end, &shared);
        if u != v {
            self.install_slot(&v, &u, begin, end, &shared);
        }

        trace!(?u, ?v, begin, end, "added edge interval");
        Ok(())
    }

    fn install_slot(&mut self, from: &N, to: &N, begin: Timestamp, end: Timestamp, shared: &SharedAttrs) {
        self.adj
            .entry(from.clone())
            .or_default()
            .entry(to.clone())
            .or_default()
            .push(EdgeSlot {
                begin,
                end,
                attrs: shared.clone(),
            });
    }

    /// Number of nodes
    pub fn number_of_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of stored edge intervals
    pub fn number_of_edges(&self) -> usize {
        self.index.len()
    }

    /// Whether `id` is a node
    pub fn has_node(&self, id: &N) -> bool {
        self.nodes.contains_key(id)
    }

    /// Whether the exact interval `(u, v, begin, end)` is stored
    pub fn has_edge(&self, u: &N, v: &N, begin: Timestamp, end: Timestamp) -> bool {
        self.index
            .contains(begin, end, &EdgeKey::new(u.clone(), v.clone()))
    }

    /// Attributes of a node
    pub fn node_attrs(&self, id: &N) -> Option<&Attrs> {
        self.nodes.get(id)
    }

    /// Shared attribute cell of an edge interval, looked up from `u`'s side
    pub fn edge_attrs(&self, u: &N, v: &N, begin: Timestamp, end: Timestamp) -> Option<SharedAttrs> {
        self.adj
            .get(u)?
            .get(v)?
            .iter()
            .find(|slot| slot.begin == begin && slot.end == end)
            .map(|slot| slot.attrs.clone())
    }

    /// Every interval during which `u` and `v` are connected, sorted by time
    pub fn edges_between(&self, u: &N, v: &N) -> Vec<(Timestamp, Timestamp)> {
        let mut spans: Vec<_> = self
            .adj
            .get(u)
            .and_then(|nbrs| nbrs.get(v))
            .map(|slots| slots.iter().map(|s| (s.begin, s.end)).collect())
            .unwrap_or_default();
        spans.sort_unstable();
        spans
    }

    /// Nodes ever connected to `id`
    pub fn neighbors(&self, id: &N) -> Vec<&N> {
        let mut nbrs: Vec<&N> = self
            .adj
            .get(id)
            .map(|m| m.keys().collect())
            .unwrap_or_default();
        nbrs.sort();
        nbrs
    }

    /// All node identifiers, sorted
    pub fn nodes(&self) -> Vec<&N> {
        let mut ids: Vec<&N> = self.nodes.keys().collect();
        ids.sort();
        ids
    }

    /// `(min begin, max end)` over all edge intervals
    pub fn interval_bounds(&self) -> Option<(Timestamp, Timestamp)> {
        self.index.bounds()
    }

    /// Edge intervals intersecting `[begin, end)`, ordered by interval
    pub fn overlapping_edges(&self, begin: Timestamp, end: Timestamp) -> Result<Vec<EdgeRecord<N>>> {
        check_interval(begin, end)?;
        Ok(self
            .index
            .query_overlap(begin, end)
            .into_iter()
            .map(EdgeRecord::from)
            .collect())
    }

    /// Every stored edge interval, ordered by interval
    pub fn edges(&self) -> Vec<EdgeRecord<N>> {
        self.index
            .iter()
            .map(EdgeRecord::from)
            .collect()
    }

    /// Static view of the edges active anywhere in `[begin, end)`
    pub fn extract_view<G: StaticView<N>>(&self, begin: Timestamp, end: Timestamp, options: &ViewOptions) -> Result<G> {
        build_view(self, begin, end, options)
    }

    /// The `k` contiguous windows covering every stored interval, plus their width.
    ///
    /// Window `i` is `[min + w*i, min + w*(i+1))` with `w = (max - min) / k`;
    /// the last window instead ends at `max + 1` so `max` itself is covered.
    pub fn snapshot_windows(&self, k: usize) -> Result<(Vec<(Timestamp, Timestamp)>, Timestamp)> {
        if k < 2 {
            return Err(Error::InvalidArgument(format!(
                "snapshot count must be at least 2, got {}",
                k
            )));
        }
        let (min_begin, max_end) = self
            .index
            .bounds()
            .ok_or_else(|| Error::InvalidArgument("graph has no edges to split".to_string()))?;

        let steps = Timestamp::try_from(k)
            .map_err(|_| Error::InvalidArgument(format!("snapshot count {} too large", k)))?;
        let (span, last_end) = max_end
            .checked_sub(min_begin)
            .zip(max_end.checked_add(1))
            .ok_or_else(|| {
                Error::InvalidArgument(format!(
                    "span [{}, {}) not representable as snapshot windows",
                    min_begin, max_end
                ))
            })?;
        let width = span / steps;
        if width == 0 {
            return Err(Error::InvalidArgument(format!(
                "span [{}, {}) too short for {} snapshots",
                min_begin, max_end, k
            )));
        }

        let windows = (0..steps)
            .map(|i| {
                let begin = min_begin + width * i;
                let end = if i == steps - 1 {
                    last_end
                } else {
                    min_begin + width * (i + 1)
                };
                (begin, end)
            })
            .collect();
        Ok((windows, width))
    }

    /// Split the graph's full time span into `k` equal-width static views
    pub fn split_into_snapshots<G: StaticView<N>>(&self, k: usize, options: &ViewOptions) -> Result<Snapshots<G>> {
        let (windows, width) = self.snapshot_windows(k)?;
        debug!(k, width, "splitting temporal graph into snapshots");

        let views = windows
            .into_iter()
            .map(|(begin, end)| self.extract_view(begin, end, options))
            .collect::<Result<Vec<G>>>()?;
        Ok(Snapshots { views, width })
    }

    /// Split into `k` views and compress them into a snapshot sequence
    pub fn to_snapshot_sequence<G>(&self, k: usize, options: &ViewOptions) -> Result<SnapshotSequence<G>>
    where
        G: StaticView<N> + PartialEq,
    {
        let snapshots = self.split_into_snapshots(k, options)?;
        Ok(snapshots.views.into_iter().collect())
    }

    /// Temporal subgraph induced by `ids`.
    ///
    /// Keeps node attributes and every edge interval whose endpoints are both
    /// in `ids`. Attributes are copied into fresh cells, so the subgraph does
    /// not alias this graph.
    pub fn node_subgraph(&self, ids: &[N]) -> Result<Self> {
        let mut sub = Self::new();
        for id in ids {
            if let Some(attrs) = self.nodes.get(id) {
                sub.add_node(id.clone(), attrs.clone());
            }
        }

        let kept = self
            .index
            .iter()
            .filter(|iv| sub.has_node(&iv.key.u) && sub.has_node(&iv.key.v))
            .collect::<Vec<_>>();
        for iv in kept {
            sub.add_edge(iv.key.u.clone(), iv.key.v.clone(), iv.begin, iv.end, iv.value.snapshot())?;
        }
        Ok(sub)
    }

    pub(crate) fn query_index(&self, begin: Timestamp, end: Timestamp) -> impl Iterator<Item = (&EdgeKey<N>, Timestamp, Timestamp, &SharedAttrs)> + '_ {
        self.index
            .query_overlap(begin, end)
            .into_iter()
            .map(|iv| (&iv.key, iv.begin, iv.end, &iv.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attrs::{AttrValue, attrs};
    use crate::view::StaticGraph;

    #[test]
    fn test_add_node_merges() {
        let mut g: TemporalGraph<&str> = TemporalGraph::new();
        g.add_node("a", attrs([("x", 1.into()), ("y", 2.into())]));
        g.add_node("a", attrs([("y", 3.into())]));

        assert_eq!(g.number_of_nodes(), 1);
        let a = g.node_attrs(&"a").unwrap();
        assert_eq!(a.get("x"), Some(&AttrValue::Int(1)));
        assert_eq!(a.get("y"), Some(&AttrValue::Int(3)));
    }

    #[test]
    fn test_add_edge_creates_nodes() {
        let mut g = TemporalGraph::new();
        g.add_edge(1, 2, 0, 5, Attrs::new()).unwrap();

        assert!(g.has_node(&1));
        assert!(g.has_node(&2));
        assert!(g.has_edge(&2, &1, 0, 5));
        assert_eq!(g.number_of_edges(), 1);
        assert_eq!(g.neighbors(&1), vec![&2]);
    }

    #[test]
    fn test_invalid_edge_leaves_graph_unchanged() {
        let mut g = TemporalGraph::new();
        g.add_edge(1, 2, 0, 5, Attrs::new()).unwrap();

        assert!(matches!(
            g.add_edge(3, 4, 5, 5, Attrs::new()),
            Err(Error::InvalidInterval { begin: 5, end: 5 })
        ));
        assert!(g.add_edge(3, 4, 9, 1, Attrs::new()).is_err());

        assert_eq!(g.number_of_nodes(), 2);
        assert_eq!(g.number_of_edges(), 1);
        assert!(!g.has_node(&3));
    }

    #[test]
    fn test_duplicate_edge_merges_attributes() {
        let mut g = TemporalGraph::new();
        g.add_edge("u", "v", 0, 5, attrs([("a", 1.into())])).unwrap();
        g.add_edge("v", "u", 0, 5, attrs([("a", 2.into()), ("b", 3.into())]))
            .unwrap();

        assert_eq!(g.number_of_edges(), 1);
        let merged = g.edge_attrs(&"u", &"v", 0, 5).unwrap().snapshot();
        assert_eq!(merged, attrs([("a", 2.into()), ("b", 3.into())]));
    }

    #[test]
    fn test_edge_attrs_alias_both_directions() {
        let mut g = TemporalGraph::new();
        g.add_edge("u", "v", 0, 5, attrs([("w", 1.into())])).unwrap();

        let from_u = g.edge_attrs(&"u", &"v", 0, 5).unwrap();
        let from_v = g.edge_attrs(&"v", &"u", 0, 5).unwrap();
        assert!(from_u.ptr_eq(&from_v));

        from_u.set("w", 10);
        assert_eq!(from_v.get("w"), Some(AttrValue::Int(10)));

        // The indexed copy observes it too
        let records = g.overlapping_edges(0, 1).unwrap();
        assert_eq!(records[0].attrs.get("w"), Some(AttrValue::Int(10)));
    }

    #[test]
    fn test_parallel_intervals_between_pair() {
        let mut g = TemporalGraph::new();
        g.add_edge(1, 2, 10, 20, Attrs::new()).unwrap();
        g.add_edge(1, 2, 0, 5, Attrs::new()).unwrap();

        assert_eq!(g.number_of_edges(), 2);
        assert_eq!(g.edges_between(&2, &1), vec![(0, 5), (10, 20)]);
        assert!(g.edge_attrs(&1, &2, 0, 5).is_some());
        assert!(g.edge_attrs(&1, &2, 0, 6).is_none());
    }

    #[test]
    fn test_self_loop() {
        let mut g = TemporalGraph::new();
        g.add_edge(7, 7, 0, 3, Attrs::new()).unwrap();

        assert_eq!(g.number_of_nodes(), 1);
        assert_eq!(g.edges_between(&7, &7), vec![(0, 3)]);
    }

    #[test]
    fn test_overlapping_edges_validates_window() {
        let g: TemporalGraph<i32> = TemporalGraph::new();
        assert!(g.overlapping_edges(4, 4).is_err());
        assert!(g.overlapping_edges(0, 4).unwrap().is_empty());
    }

    #[test]
    fn test_snapshot_windows() {
        let mut g = TemporalGraph::new();
        g.add_edge(1, 2, 0, 5, Attrs::new()).unwrap();
        g.add_edge(2, 3, 3, 8, Attrs::new()).unwrap();

        let (windows, width) = g.snapshot_windows(2).unwrap();
        assert_eq!(width, 4);
        assert_eq!(windows, vec![(0, 4), (4, 9)]);

        let (windows, width) = g.snapshot_windows(3).unwrap();
        assert_eq!(width, 2);
        assert_eq!(windows, vec![(0, 2), (2, 4), (4, 9)]);
    }

    #[test]
    fn test_split_rejects_bad_counts() {
        let mut g = TemporalGraph::new();
        assert!(matches!(
            g.split_into_snapshots::<StaticGraph<i32>>(2, &ViewOptions::default()),
            Err(Error::InvalidArgument(_))
        ));

        g.add_edge(1, 2, 0, 3, Attrs::new()).unwrap();
        for k in [0, 1, 4] {
            assert!(matches!(
                g.split_into_snapshots::<StaticGraph<i32>>(k, &ViewOptions::default()),
                Err(Error::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn test_snapshot_windows_at_timestamp_limits() {
        let mut g = TemporalGraph::new();
        g.add_edge(1, 2, 0, Timestamp::MAX, Attrs::new()).unwrap();
        assert!(matches!(
            g.split_into_snapshots::<StaticGraph<i32>>(2, &ViewOptions::default()),
            Err(Error::InvalidArgument(_))
        ));

        let mut g = TemporalGraph::new();
        g.add_edge(1, 2, Timestamp::MIN, 0, Attrs::new()).unwrap();
        g.add_edge(2, 3, 0, Timestamp::MAX - 1, Attrs::new()).unwrap();
        assert!(matches!(g.snapshot_windows(2), Err(Error::InvalidArgument(_))));

        // Largest span that still fits
        let mut g = TemporalGraph::new();
        g.add_edge(1, 2, 0, Timestamp::MAX - 1, Attrs::new()).unwrap();
        let (windows, width) = g.snapshot_windows(2).unwrap();
        assert_eq!(width, (Timestamp::MAX - 1) / 2);
        assert_eq!(windows[1], (width, Timestamp::MAX));
    }

    #[test]
    fn test_node_subgraph() {
        let mut g = TemporalGraph::new();
        g.add_node(1, attrs([("name", "one".into())]));
        g.add_edge(1, 2, 0, 5, attrs([("w", 1.into())])).unwrap();
        g.add_edge(2, 3, 3, 8, Attrs::new()).unwrap();
        g.add_edge(1, 3, 6, 9, Attrs::new()).unwrap();

        let sub = g.node_subgraph(&[1, 2, 42]).unwrap();
        assert_eq!(sub.number_of_nodes(), 2);
        assert_eq!(sub.number_of_edges(), 1);
        assert!(sub.has_edge(&1, &2, 0, 5));
        assert_eq!(
            sub.node_attrs(&1).unwrap().get("name"),
            Some(&AttrValue::Str("one".to_string()))
        );

        // Copies, not aliases
        let original = g.edge_attrs(&1, &2, 0, 5).unwrap();
        let copied = sub.edge_attrs(&1, &2, 0, 5).unwrap();
        assert!(!original.ptr_eq(&copied));
        copied.set("w", 99);
        assert_eq!(original.get("w"), Some(AttrValue::Int(1)));
    }
}
