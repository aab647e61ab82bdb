//! Static views of a temporal graph
//!
//! A static view is a timeless graph holding the nodes and edges active in
//! one window. [`build_view`] fills any [`StaticView`] implementation; the
//! crate ships [`StaticGraph`] as the default one.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::attrs::{AttrValue, Attrs};
use crate::config::ViewOptions;
use crate::error::check_interval;
use crate::graph::{NodeId, TemporalGraph};
use crate::{Result, Timestamp};

/// Graph representation that receives extracted nodes and edges.
///
/// Snapshot compression compares views with `PartialEq`, which must be
/// structural: same nodes, same edges, same attributes.
pub trait StaticView<N>: Default {
    /// Add a node, merging attributes if it already exists
    fn add_node(&mut self, id: N, attrs: Attrs);

    /// Add an undirected edge, merging attributes if it already exists
    fn add_edge(&mut self, u: N, v: N, attrs: Attrs);
}

/// Undirected static graph with ordered node and edge tables
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct StaticGraph<N: Ord> {
    nodes: BTreeMap<N, Attrs>,
    edges: BTreeMap<(N, N), Attrs>,
}

impl<N: Ord> Default for StaticGraph<N> {
    fn default() -> Self {
        Self {
            nodes: BTreeMap::new(),
            edges: BTreeMap::new(),
        }
    }
}

impl<N: NodeId> StaticView<N> for StaticGraph<N> {
    fn add_node(&mut self, id: N, attrs: Attrs) {
        self.nodes.entry(id).or_default().extend(attrs);
    }

    fn add_edge(&mut self, u: N, v: N, attrs: Attrs) {
        self.nodes.entry(u.clone()).or_default();
        self.nodes.entry(v.clone()).or_default();
        self.edges.entry(Self::edge_key(u, v)).or_default().extend(attrs);
    }
}

impl<N: NodeId> StaticGraph<N> {
    /// Create an empty static graph
    pub fn new() -> Self {
        Self::default()
    }

    fn edge_key(u: N, v: N) -> (N, N) {
        if u <= v { (u, v) } else { (v, u) }
    }

    /// Number of nodes
    pub fn number_of_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges
    pub fn number_of_edges(&self) -> usize {
        self.edges.len()
    }

    /// Whether `id` is a node
    pub fn has_node(&self, id: &N) -> bool {
        self.nodes.contains_key(id)
    }

    /// Whether `u` and `v` are adjacent
    pub fn has_edge(&self, u: &N, v: &N) -> bool {
        self.edges
            .contains_key(&Self::edge_key(u.clone(), v.clone()))
    }

    /// Node identifiers in order
    pub fn nodes(&self) -> impl Iterator<Item = &N> + '_ {
        self.nodes.keys()
    }

    /// Edges as `(u, v)` with `u <= v`, in order
    pub fn edges(&self) -> impl Iterator<Item = (&N, &N)> + '_ {
        self.edges.keys().map(|(u, v)| (u, v))
    }

    /// Attributes of a node
    pub fn node_attrs(&self, id: &N) -> Option<&Attrs> {
        self.nodes.get(id)
    }

    /// Attributes of an edge
    pub fn edge_attrs(&self, u: &N, v: &N) -> Option<&Attrs> {
        self.edges.get(&Self::edge_key(u.clone(), v.clone()))
    }

    /// Neighbors of `id` in order
    pub fn neighbors(&self, id: &N) -> Vec<&N> {
        let mut nbrs: Vec<&N> = self
            .edges
            .keys()
            .filter_map(|(u, v)| {
                if u == id {
                    Some(v)
                } else if v == id {
                    Some(u)
                } else {
                    None
                }
            })
            .collect();
        nbrs.sort();
        nbrs.dedup();
        nbrs
    }

    /// Number of edge endpoints at `id`; a self loop counts twice
    pub fn degree(&self, id: &N) -> Option<usize> {
        if !self.has_node(id) {
            return None;
        }
        Some(
            self.edges
                .keys()
                .map(|(u, v)| usize::from(u == id) + usize::from(v == id))
                .sum(),
        )
    }

    /// Subgraph induced by `ids`, keeping attributes
    pub fn subgraph(&self, ids: &[N]) -> Self {
        let keep: BTreeSet<&N> = ids.iter().filter(|id| self.has_node(id)).collect();
        Self {
            nodes: self
                .nodes
                .iter()
                .filter(|(id, _)| keep.contains(id))
                .map(|(id, attrs)| (id.clone(), attrs.clone()))
                .collect(),
            edges: self
                .edges
                .iter()
                .filter(|((u, v), _)| keep.contains(u) && keep.contains(v))
                .map(|(key, attrs)| (key.clone(), attrs.clone()))
                .collect(),
        }
    }
}

/// Build the static view of every edge active anywhere in `[begin, end)`.
///
/// Only endpoints of emitted edges become nodes. With `interval_attrs`, the
/// interval bounds overwrite same-named edge attributes. Several intervals of
/// one pair collapse into a single edge whose attributes merge in interval
/// order.
pub fn build_view<N, G>(graph: &TemporalGraph<N>, begin: Timestamp, end: Timestamp, options: &ViewOptions) -> Result<G>
where
    N: NodeId,
    G: StaticView<N>,
{
    check_interval(begin, end)?;

    let mut view = G::default();
    let mut edge_count = 0usize;

    for (key, iv_begin, iv_end, shared) in graph.query_index(begin, end) {
        let mut attrs = if options.edge_attrs {
            shared.snapshot()
        } else {
            Attrs::new()
        };
        if options.interval_attrs {
            attrs.insert(options.begin_key.clone(), AttrValue::Int(iv_begin));
            attrs.insert(options.end_key.clone(), AttrValue::Int(iv_end));
        }

        for id in [&key.u, &key.v] {
            let node_attrs = match graph.node_attrs(id) {
                Some(stored) if options.node_attrs => stored.clone(),
                _ => Attrs::new(),
            };
            view.add_node(id.clone(), node_attrs);
        }
        view.add_edge(key.u.clone(), key.v.clone(), attrs);
        edge_count += 1;
    }

    debug!(begin, end, edges = edge_count, "extracted static view");
    Ok(view)
}
