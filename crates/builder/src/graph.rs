//! The weighted, undirected co-occurrence graph.

use fxhash::FxHashMap;

use crate::access::{Granularity, NodeId};

/// An undirected, weighted, simple graph over coarsened addresses.
///
/// Kept as adjacency lists: a map from node id to its neighbours, each
/// neighbour vector sorted by id. Edge weights are total co-occurrence
/// counts and are stored on both endpoints. Self-loops cannot occur; nodes
/// without incident edges can. The node list preserves first-sighting
/// order so iteration is stable across runs.
#[derive(Debug)]
pub struct AccessGraph {
    granularity: Granularity,
    nodes: Vec<NodeId>,
    adj: FxHashMap<NodeId, Vec<(NodeId, u64)>>,
    edge_count: usize,
}

const NO_NEIGHBORS: &[(NodeId, u64)] = &[];

impl AccessGraph {
    pub(crate) fn new(
        granularity: Granularity,
        nodes: Vec<NodeId>,
        adj: FxHashMap<NodeId, Vec<(NodeId, u64)>>,
        edge_count: usize,
    ) -> Self {
        Self {
            granularity,
            nodes,
            adj,
            edge_count,
        }
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// Returns the number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of edges in the graph.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates node ids in first-sighting order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().copied()
    }

    /// Returns the number of edges connected to the given node.
    pub fn degree(&self, node: NodeId) -> usize {
        self.adj.get(&node).map_or(0, Vec::len)
    }

    /// Iterates the neighbours of the given node in ascending id order.
    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.edges(node).iter().map(|&(n, _)| n)
    }

    /// Returns the `(neighbour, weight)` list of the given node, sorted by
    /// neighbour id. Unknown nodes have no neighbours.
    pub fn edges(&self, node: NodeId) -> &[(NodeId, u64)] {
        self.adj.get(&node).map_or(NO_NEIGHBORS, Vec::as_slice)
    }

    pub fn has_edge(&self, u: NodeId, v: NodeId) -> bool {
        self.weight(u, v).is_some()
    }

    /// Returns the co-occurrence weight of the edge `(u, v)`, if present.
    pub fn weight(&self, u: NodeId, v: NodeId) -> Option<u64> {
        let edges = self.edges(u);
        edges
            .binary_search_by_key(&v, |&(n, _)| n)
            .ok()
            .map(|i| edges[i].1)
    }

    /// Edge density: `2·|E| / (|V|·(|V|−1))`, 0 for fewer than two nodes.
    pub fn density(&self) -> f64 {
        let n = self.node_count();
        if n < 2 {
            return 0.0;
        }
        2.0 * self.edge_count as f64 / (n as f64 * (n - 1) as f64)
    }

    pub fn mean_degree(&self) -> f64 {
        let n = self.node_count();
        if n == 0 {
            return 0.0;
        }
        2.0 * self.edge_count as f64 / n as f64
    }

    /// All edges as `(u, v, weight)` with `u < v`, sorted. The order is a
    /// pure function of the edge set, independent of insertion order.
    pub fn edge_list(&self) -> Vec<(NodeId, NodeId, u64)> {
        let mut edges = Vec::with_capacity(self.edge_count);
        for (&u, neighbors) in &self.adj {
            for &(v, w) in neighbors {
                if u < v {
                    edges.push((u, v, w));
                }
            }
        }
        edges.sort_unstable();
        edges
    }
}
