//! Streaming construction of [`AccessGraph`]s from access traces.

use std::time::Instant;

use fxhash::{FxHashMap, FxHashSet};
use log::info;
use num_format::{Locale, ToFormattedString};
use rayon::prelude::*;

use crate::access::{Granularity, MemoryAccess, NodeId};
use crate::graph::AccessGraph;
use crate::window::{WindowKind, WindowState};
use crate::Error;

/// Configuration for a single graph build.
///
/// Granularity and window strategy are fixed for the lifetime of the
/// builder; the edge-weight filter is applied once after the full pass.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GraphConfig {
    pub granularity: Granularity,
    pub window: WindowKind,
    /// Number of accesses per window, at least 2.
    pub window_size: usize,
    /// Edges whose final weight is below this are dropped after the pass.
    pub min_edge_weight: u64,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            granularity: Granularity::CacheLine,
            window: WindowKind::Sliding,
            window_size: 100,
            min_edge_weight: 1,
        }
    }
}

/// Aggregate facts about the consumed trace, independent of coarsening.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TraceStats {
    pub total_accesses: u64,
    pub unique_addresses: u64,
    pub min_timestamp: u64,
    pub max_timestamp: u64,
}

/// Consumes an access stream and accumulates the co-occurrence graph.
///
/// The trace is touched exactly once and never materialized; the builder
/// holds the window state, the weighted edge map and the node list. Nodes
/// are inserted lazily on first sighting, so an address that never
/// co-occurs with another still becomes an isolated node.
///
/// # Examples
///
/// ```
/// use memgraph_builder::prelude::*;
///
/// let trace = [
///     MemoryAccess::read(0x1000, 8, 0),
///     MemoryAccess::read(0x2000, 8, 1),
///     MemoryAccess::write(0x1000, 8, 2),
/// ];
///
/// let graph = GraphBuilder::new(GraphConfig::default())
///     .unwrap()
///     .accesses(trace)
///     .build();
///
/// assert_eq!(graph.node_count(), 2);
/// assert_eq!(graph.edge_count(), 1);
/// ```
pub struct GraphBuilder {
    config: GraphConfig,
    window: WindowState,
    edges: FxHashMap<(NodeId, NodeId), u64>,
    nodes: Vec<NodeId>,
    seen_nodes: FxHashSet<NodeId>,
    seen_addrs: FxHashSet<u64>,
    total_accesses: u64,
    timestamps: Option<(u64, u64)>,
}

impl GraphBuilder {
    /// Creates a builder, validating the configuration.
    pub fn new(config: GraphConfig) -> Result<Self, Error> {
        if config.window_size < 2 {
            return Err(Error::WindowTooSmall {
                got: config.window_size,
            });
        }
        if config.min_edge_weight < 1 {
            return Err(Error::ZeroMinEdgeWeight);
        }
        Ok(Self {
            config,
            window: WindowState::new(config.window, config.window_size),
            edges: FxHashMap::default(),
            nodes: Vec::new(),
            seen_nodes: FxHashSet::default(),
            seen_addrs: FxHashSet::default(),
            total_accesses: 0,
            timestamps: None,
        })
    }

    /// Feeds a single access.
    pub fn push(&mut self, access: MemoryAccess) {
        self.total_accesses += 1;
        self.seen_addrs.insert(access.addr);
        self.timestamps = Some(match self.timestamps {
            None => (access.timestamp, access.timestamp),
            Some((lo, hi)) => (lo.min(access.timestamp), hi.max(access.timestamp)),
        });

        let id = self.config.granularity.coarsen(access.addr);
        if self.seen_nodes.insert(id) {
            self.nodes.push(id);
        }

        let edges = &mut self.edges;
        self.window.push(id, &mut |u, v| {
            let key = if u < v { (u, v) } else { (v, u) };
            *edges.entry(key).or_insert(0) += 1;
        });
    }

    /// Feeds every access of the given stream, in stream order.
    pub fn accesses<I>(mut self, accesses: I) -> Self
    where
        I: IntoIterator<Item = MemoryAccess>,
    {
        for access in accesses {
            self.push(access);
        }
        self
    }

    /// Facts about the trace consumed so far.
    pub fn trace_stats(&self) -> TraceStats {
        let (min_timestamp, max_timestamp) = self.timestamps.unwrap_or((0, 0));
        TraceStats {
            total_accesses: self.total_accesses,
            unique_addresses: self.seen_addrs.len() as u64,
            min_timestamp,
            max_timestamp,
        }
    }

    /// Flushes the window, applies the weight filter and finalizes the
    /// adjacency lists.
    pub fn build(mut self) -> AccessGraph {
        let start = Instant::now();

        let edges = &mut self.edges;
        self.window.flush(&mut |u, v| {
            let key = if u < v { (u, v) } else { (v, u) };
            *edges.entry(key).or_insert(0) += 1;
        });

        let min_weight = self.config.min_edge_weight;
        let before = self.edges.len();
        if min_weight > 1 {
            self.edges.retain(|_, &mut w| w >= min_weight);
            info!(
                "Dropped {} of {} edges below weight {}",
                (before - self.edges.len()).to_formatted_string(&Locale::en),
                before.to_formatted_string(&Locale::en),
                min_weight
            );
        }

        let mut adj: FxHashMap<NodeId, Vec<(NodeId, u64)>> = FxHashMap::default();
        for (&(u, v), &w) in &self.edges {
            adj.entry(u).or_default().push((v, w));
            adj.entry(v).or_default().push((u, w));
        }

        let mut lists: Vec<&mut Vec<(NodeId, u64)>> = adj.values_mut().collect();
        lists
            .par_iter_mut()
            .for_each(|list| list.sort_unstable_by_key(|&(n, _)| n));

        let edge_count = self.edges.len();
        let graph = AccessGraph::new(self.config.granularity, self.nodes, adj, edge_count);

        info!(
            "Built graph with {} nodes and {} edges from {} accesses in {:?}",
            graph.node_count().to_formatted_string(&Locale::en),
            graph.edge_count().to_formatted_string(&Locale::en),
            self.total_accesses.to_formatted_string(&Locale::en),
            start.elapsed()
        );

        graph
    }
}
