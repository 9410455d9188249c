//! Graphlet-based classification of memory-access patterns.
//!
//! MemGraph ingests a chronologically ordered memory-access trace, turns
//! it into a temporal co-occurrence graph (see `memgraph_builder`), counts
//! the nine connected induced subgraphs on 2–4 nodes, and matches the
//! normalized graphlet signature against calibrated reference patterns to
//! report what kind of access behaviour the trace exhibits, with a
//! confidence score and optimization recommendations.
//!
//! # Example
//!
//! ```
//! use memgraph::prelude::*;
//!
//! // A small working set: 32 cache lines swept in a tight loop.
//! let trace = (0..2000u64).map(|i| MemoryAccess::read((i % 32) * 64, 8, i));
//!
//! let result = analyze("demo", trace, &AnalysisConfig::default()).unwrap();
//!
//! assert!(!result.empty_input);
//! assert_eq!(result.graph.node_count, 32);
//! let top = &result.matches[0];
//! assert_eq!(top.label(), "WORKING_SET");
//! ```

pub mod analysis;
pub mod classify;
pub mod graphlets;
pub mod patterns;
pub mod prelude;
pub mod signature;

pub use crate::analysis::{analyze, AnalysisConfig, AnalysisResult, GraphStats, TraceMeta};
pub use crate::classify::{classify, ClassifierConfig, Evidence, PatternMatch};
pub use crate::graphlets::{
    count_graphlets, EnumeratorConfig, Graphlet, GraphletCounts, SamplingMode,
};
pub use crate::patterns::{reference_patterns, PatternKind, ReferencePattern};
pub use crate::signature::Signature;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("classifier threshold must be within [0, 1], got {got}")]
    ThresholdOutOfRange { got: f64 },
    #[error("top_k must be at least 1")]
    ZeroTopK,
    #[error("sample size must be at least 1000, got {got}")]
    SampleSizeTooSmall { got: usize },
    #[error("graph invariant violated: {reason}")]
    InvariantViolation { reason: String },
    #[error("error while building the graph")]
    Build {
        #[from]
        source: memgraph_builder::Error,
    },
}
