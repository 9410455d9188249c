//! A library that turns memory-access traces into temporal co-occurrence
//! graphs.
//!
//! A trace is a chronologically ordered stream of [`MemoryAccess`] records.
//! The builder coarsens every address to a [`NodeId`] at a configurable
//! [`Granularity`], groups temporally adjacent accesses with a
//! [`WindowKind`] strategy, and accumulates every co-occurring pair of
//! distinct nodes into a weighted, undirected [`AccessGraph`].
//!
//! The resulting graph is the input to graphlet enumeration and pattern
//! classification in the `memgraph` crate; this crate knows nothing about
//! either.
//!
//! # How to build a graph
//!
//! ```
//! use memgraph_builder::prelude::*;
//!
//! let trace = (0..6u64).map(|i| MemoryAccess::read(0x1000 + i * 64, 8, i));
//!
//! let graph: AccessGraph = GraphBuilder::new(GraphConfig {
//!     granularity: Granularity::CacheLine,
//!     window: WindowKind::Sliding,
//!     window_size: 2,
//!     min_edge_weight: 1,
//! })
//! .unwrap()
//! .accesses(trace)
//! .build();
//!
//! assert_eq!(graph.node_count(), 6);
//! assert_eq!(graph.edge_count(), 5);
//! ```
//!
//! Traces can also be read from the native text format (one access per
//! line, `R,0x1000,8,42`) via [`input::text::TextTraceReader`] or from the
//! fixed-width binary format via [`input::binary::BinaryTraceReader`].

pub mod access;
pub mod builder;
pub mod graph;
pub mod input;
pub mod prelude;
pub mod window;

pub use crate::access::{AccessKind, Granularity, MemoryAccess, NodeId};
pub use crate::builder::{GraphBuilder, GraphConfig};
pub use crate::graph::AccessGraph;
pub use crate::window::WindowKind;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("window size must be at least 2, got {got}")]
    WindowTooSmall { got: usize },
    #[error("minimum edge weight must be at least 1")]
    ZeroMinEdgeWeight,
    #[error("error while reading trace")]
    IoError {
        #[from]
        source: std::io::Error,
    },
    #[error("malformed trace record at line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },
    #[error("not a binary trace file: bad magic")]
    BadMagic,
    #[error("binary trace file is truncated")]
    TruncatedTrace,
}
