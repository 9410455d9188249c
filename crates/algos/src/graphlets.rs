//! Exact and sampled counting of connected induced subgraphs on 2–4 nodes.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Instant;

use log::info;
use memgraph_builder::{AccessGraph, NodeId};
use nanorand::{Rng, WyRand};
use num_format::{Locale, ToFormattedString};

use crate::Error;

const CHUNK_SIZE: usize = 64;

/// Exact enumeration is used while either bound holds.
pub const EXACT_NODE_LIMIT: usize = 10_000;
pub const EXACT_EDGE_LIMIT: usize = 250_000;

/// The nine connected induced subgraphs on 2–4 nodes.
///
/// Counts are induced: a 4-clique never contributes to the triangle or
/// diamond tallies, and a wedge closed into a triangle is no wedge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Graphlet {
    /// G0: a single edge.
    Edge,
    /// G1: 2-path, the open wedge.
    Wedge,
    /// G2: triangle.
    Triangle,
    /// G3: path on four nodes.
    FourPath,
    /// G4: the claw, one centre with three leaves.
    ThreeStar,
    /// G5: chordless cycle on four nodes.
    FourCycle,
    /// G6: triangle with a pendant node.
    TailedTriangle,
    /// G7: K4 minus one edge.
    Diamond,
    /// G8: the 4-clique.
    FourClique,
}

impl Graphlet {
    pub const ALL: [Graphlet; 9] = [
        Graphlet::Edge,
        Graphlet::Wedge,
        Graphlet::Triangle,
        Graphlet::FourPath,
        Graphlet::ThreeStar,
        Graphlet::FourCycle,
        Graphlet::TailedTriangle,
        Graphlet::Diamond,
        Graphlet::FourClique,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Graphlet::Edge => "edge",
            Graphlet::Wedge => "wedge",
            Graphlet::Triangle => "triangle",
            Graphlet::FourPath => "3-path",
            Graphlet::ThreeStar => "3-star",
            Graphlet::FourCycle => "4-cycle",
            Graphlet::TailedTriangle => "tailed-triangle",
            Graphlet::Diamond => "diamond",
            Graphlet::FourClique => "4-clique",
        }
    }
}

/// Counts per graphlet, plus whether they were estimated by sampling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GraphletCounts {
    counts: [u64; 9],
    sampled: bool,
}

impl GraphletCounts {
    pub(crate) fn new(counts: [u64; 9], sampled: bool) -> Self {
        Self { counts, sampled }
    }

    pub fn zero() -> Self {
        Self::new([0; 9], false)
    }

    pub fn get(&self, graphlet: Graphlet) -> u64 {
        self.counts[graphlet.index()]
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// True when the counts are sampling estimates rather than exact.
    pub fn sampled(&self) -> bool {
        self.sampled
    }

    /// Frequencies summing to 1, or the zero vector for an empty count.
    pub fn normalized(&self) -> [f64; 9] {
        let total = self.total();
        if total == 0 {
            return [0.0; 9];
        }
        let mut freq = [0.0; 9];
        for (f, &c) in freq.iter_mut().zip(self.counts.iter()) {
            *f = c as f64 / total as f64;
        }
        freq
    }
}

/// Whether to estimate counts from sampled edges.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SamplingMode {
    /// Exact below [`EXACT_NODE_LIMIT`]/[`EXACT_EDGE_LIMIT`], sampled above.
    #[default]
    Auto,
    Always,
    Never,
}

#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnumeratorConfig {
    pub sampling: SamplingMode,
    /// Number of edges drawn with replacement, at least 1000.
    pub sample_size: usize,
    pub rng_seed: u64,
}

impl Default for EnumeratorConfig {
    fn default() -> Self {
        Self {
            sampling: SamplingMode::Auto,
            sample_size: 100_000,
            rng_seed: 0,
        }
    }
}

impl EnumeratorConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if self.sample_size < 1000 {
            return Err(Error::SampleSizeTooSmall {
                got: self.sample_size,
            });
        }
        Ok(())
    }
}

/// Counts all nine graphlets of the given graph.
pub fn count_graphlets(
    graph: &AccessGraph,
    config: &EnumeratorConfig,
) -> Result<GraphletCounts, Error> {
    config.validate()?;

    if graph.node_count() < 2 {
        return Ok(GraphletCounts::zero());
    }

    let edges = collect_edges(graph)?;
    if edges.is_empty() {
        return Ok(GraphletCounts::zero());
    }

    let sample = match config.sampling {
        SamplingMode::Always => true,
        SamplingMode::Never => false,
        SamplingMode::Auto => {
            graph.node_count() >= EXACT_NODE_LIMIT && edges.len() >= EXACT_EDGE_LIMIT
        }
    };

    let start = Instant::now();
    let counts = if sample {
        sampled_counts(graph, &edges, config.sample_size, config.rng_seed)
    } else {
        exact_counts(graph, &edges)
    };

    info!(
        "Counted {} graphlet occurrences over {} edges ({}) in {:?}",
        counts.total().to_formatted_string(&Locale::en),
        edges.len().to_formatted_string(&Locale::en),
        if sample { "sampled" } else { "exact" },
        start.elapsed()
    );

    Ok(counts)
}

/// Collects every edge once as `(u, v)` with `u < v`, sorted, and verifies
/// that the adjacency lists are simple.
fn collect_edges(graph: &AccessGraph) -> Result<Vec<(NodeId, NodeId)>, Error> {
    let mut nodes: Vec<NodeId> = graph.nodes().collect();
    nodes.sort_unstable();

    let mut edges = Vec::with_capacity(graph.edge_count());
    for &u in &nodes {
        let neighbors = graph.edges(u);
        for window in neighbors.windows(2) {
            if window[0].0 == window[1].0 {
                return Err(Error::InvariantViolation {
                    reason: format!("multi-edge ({u}, {})", window[0].0),
                });
            }
        }
        for &(v, _) in neighbors {
            if v == u {
                return Err(Error::InvariantViolation {
                    reason: format!("self-loop on {u}"),
                });
            }
            if u < v {
                edges.push((u, v));
            }
        }
    }
    Ok(edges)
}

fn exact_counts(graph: &AccessGraph, edges: &[(NodeId, NodeId)]) -> GraphletCounts {
    let mut counts = [0u64; 9];
    counts[Graphlet::Edge.index()] = edges.len() as u64;

    let (wedges, triangles) = three_node_counts(graph);
    counts[Graphlet::Wedge.index()] = wedges;
    counts[Graphlet::Triangle.index()] = triangles;

    let four = four_node_counts(graph, edges);
    for (i, &c) in four.iter().enumerate() {
        counts[3 + i] = c;
    }

    GraphletCounts::new(counts, false)
}

/// Per-node classification of neighbour pairs. A wedge is seen exactly
/// once, at its centre; a triangle once per corner, hence the division.
fn three_node_counts(graph: &AccessGraph) -> (u64, u64) {
    let mut nodes: Vec<NodeId> = graph.nodes().collect();
    nodes.sort_unstable();

    let next_chunk = AtomicUsize::new(0);
    let total_wedges = AtomicU64::new(0);
    let total_triangles = AtomicU64::new(0);

    rayon::scope(|s| {
        for _ in 0..rayon::current_num_threads() {
            s.spawn(|_| {
                let mut wedges = 0u64;
                let mut triangles = 0u64;

                loop {
                    let start = next_chunk.fetch_add(CHUNK_SIZE, Ordering::AcqRel);
                    if start >= nodes.len() {
                        break;
                    }
                    let end = (start + CHUNK_SIZE).min(nodes.len());

                    for &v in &nodes[start..end] {
                        let neighbors = graph.edges(v);
                        for i in 0..neighbors.len() {
                            for j in i + 1..neighbors.len() {
                                if graph.has_edge(neighbors[i].0, neighbors[j].0) {
                                    triangles += 1;
                                } else {
                                    wedges += 1;
                                }
                            }
                        }
                    }
                }

                total_wedges.fetch_add(wedges, Ordering::AcqRel);
                total_triangles.fetch_add(triangles, Ordering::AcqRel);
            });
        }
    });

    (
        total_wedges.load(Ordering::SeqCst),
        total_triangles.load(Ordering::SeqCst) / 3,
    )
}

/// For every edge, every pair of distinct outside neighbours of its
/// endpoints spans a connected 4-set. A set is tallied only when the
/// current edge is its smallest generating edge, so each subset counts
/// exactly once.
fn four_node_counts(graph: &AccessGraph, edges: &[(NodeId, NodeId)]) -> [u64; 6] {
    let next_chunk = AtomicUsize::new(0);
    let totals: [AtomicU64; 6] = Default::default();

    rayon::scope(|s| {
        for _ in 0..rayon::current_num_threads() {
            s.spawn(|_| {
                let mut local = [0u64; 6];
                let mut merged = Vec::new();

                loop {
                    let start = next_chunk.fetch_add(CHUNK_SIZE, Ordering::AcqRel);
                    if start >= edges.len() {
                        break;
                    }
                    let end = (start + CHUNK_SIZE).min(edges.len());

                    for &(u, v) in &edges[start..end] {
                        merge_neighbors(graph, u, v, &mut merged);
                        for i in 0..merged.len() {
                            for j in i + 1..merged.len() {
                                let set = FourSet::build(graph, u, v, merged[i], merged[j]);
                                if set.min_generating_edge() == (u, v) {
                                    local[set.shape()] += 1;
                                }
                            }
                        }
                    }
                }

                for (total, &count) in totals.iter().zip(local.iter()) {
                    total.fetch_add(count, Ordering::AcqRel);
                }
            });
        }
    });

    let mut counts = [0u64; 6];
    for (count, total) in counts.iter_mut().zip(totals.iter()) {
        *count = total.load(Ordering::SeqCst);
    }
    counts
}

fn sampled_counts(
    graph: &AccessGraph,
    edges: &[(NodeId, NodeId)],
    sample_size: usize,
    seed: u64,
) -> GraphletCounts {
    let mut rng = WyRand::new_seed(seed);
    let scale = edges.len() as f64 / sample_size as f64;

    let mut estimates = [0f64; 9];
    let mut merged = Vec::new();

    for _ in 0..sample_size {
        let (u, v) = edges[rng.generate_range(0..edges.len())];
        merge_neighbors(graph, u, v, &mut merged);

        // Every wedge holds 2 of the sampled edge kind, every triangle 3.
        for &(_, in_u, in_v) in &merged {
            if in_u && in_v {
                estimates[Graphlet::Triangle.index()] += scale / 3.0;
            } else {
                estimates[Graphlet::Wedge.index()] += scale / 2.0;
            }
        }

        for i in 0..merged.len() {
            for j in i + 1..merged.len() {
                let set = FourSet::build(graph, u, v, merged[i], merged[j]);
                // A 4-set is reachable from each of its generating edges,
                // so every observation carries the multiplicity correction.
                estimates[3 + set.shape()] += scale / set.generating_edges() as f64;
            }
        }
    }

    let mut counts = [0u64; 9];
    counts[Graphlet::Edge.index()] = edges.len() as u64;
    for (count, &estimate) in counts.iter_mut().zip(estimates.iter()).skip(1) {
        *count = estimate.round() as u64;
    }

    GraphletCounts::new(counts, true)
}

/// Sorted distinct members of `N(u) ∪ N(v) \ {u, v}`, tagged with the
/// side(s) they neighbour.
fn merge_neighbors(
    graph: &AccessGraph,
    u: NodeId,
    v: NodeId,
    out: &mut Vec<(NodeId, bool, bool)>,
) {
    out.clear();
    let nu = graph.edges(u);
    let nv = graph.edges(v);
    let (mut i, mut j) = (0, 0);

    while i < nu.len() || j < nv.len() {
        let next = match (nu.get(i), nv.get(j)) {
            (Some(&(a, _)), Some(&(b, _))) if a == b => {
                i += 1;
                j += 1;
                (a, true, true)
            }
            (Some(&(a, _)), Some(&(b, _))) if a < b => {
                i += 1;
                (a, true, false)
            }
            (Some(_), Some(&(b, _))) => {
                j += 1;
                (b, false, true)
            }
            (Some(&(a, _)), None) => {
                i += 1;
                (a, true, false)
            }
            (None, Some(&(b, _))) => {
                j += 1;
                (b, false, true)
            }
            (None, None) => unreachable!(),
        };
        if next.0 != u && next.0 != v {
            out.push(next);
        }
    }
}

/// A connected 4-set anchored at an edge, with its full induced adjacency.
struct FourSet {
    ids: [NodeId; 4],
    adj: [[bool; 4]; 4],
    edge_count: usize,
}

impl FourSet {
    fn build(
        graph: &AccessGraph,
        u: NodeId,
        v: NodeId,
        x: (NodeId, bool, bool),
        y: (NodeId, bool, bool),
    ) -> Self {
        let (x, ux, vx) = x;
        let (y, uy, vy) = y;
        let xy = graph.has_edge(x, y);

        let mut adj = [[false; 4]; 4];
        let mut connect = |a: usize, b: usize| {
            adj[a][b] = true;
            adj[b][a] = true;
        };
        connect(0, 1);
        if ux {
            connect(0, 2);
        }
        if uy {
            connect(0, 3);
        }
        if vx {
            connect(1, 2);
        }
        if vy {
            connect(1, 3);
        }
        if xy {
            connect(2, 3);
        }

        let edge_count = 1
            + usize::from(ux)
            + usize::from(uy)
            + usize::from(vx)
            + usize::from(vy)
            + usize::from(xy);

        Self {
            ids: [u, v, x, y],
            adj,
            edge_count,
        }
    }

    fn degree(&self, i: usize) -> usize {
        self.adj[i].iter().filter(|&&a| a).count()
    }

    /// Index into the 4-node count array: 0 = 3-path, 1 = 3-star,
    /// 2 = 4-cycle, 3 = tailed triangle, 4 = diamond, 5 = 4-clique.
    fn shape(&self) -> usize {
        match self.edge_count {
            3 => {
                if (0..4).any(|i| self.degree(i) == 3) {
                    1
                } else {
                    0
                }
            }
            4 => {
                if (0..4).any(|i| self.degree(i) == 3) {
                    3
                } else {
                    2
                }
            }
            5 => 4,
            6 => 5,
            _ => unreachable!("a generated 4-set has at least 3 edges"),
        }
    }

    /// An edge generates this set when the neighbourhoods of its endpoints
    /// cover the other two vertices. Every connected 4-graph has at least
    /// one such edge.
    fn generating_edges(&self) -> usize {
        self.generating().0
    }

    fn min_generating_edge(&self) -> (NodeId, NodeId) {
        self.generating()
            .1
            .expect("a generated 4-set has a generating edge")
    }

    fn generating(&self) -> (usize, Option<(NodeId, NodeId)>) {
        let mut count = 0;
        let mut min: Option<(NodeId, NodeId)> = None;

        for a in 0..4 {
            for b in a + 1..4 {
                if !self.adj[a][b] {
                    continue;
                }
                let mut others = (0..4).filter(|&k| k != a && k != b);
                let covered = others.all(|k| self.adj[k][a] || self.adj[k][b]);
                if covered {
                    count += 1;
                    let (p, q) = (self.ids[a], self.ids[b]);
                    let key = if p < q { (p, q) } else { (q, p) };
                    if min.map_or(true, |m| key < m) {
                        min = Some(key);
                    }
                }
            }
        }
        (count, min)
    }
}
