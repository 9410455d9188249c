//! The end-to-end analysis pipeline.

use std::time::Instant;

use log::info;
use memgraph_builder::{AccessGraph, GraphBuilder, GraphConfig, MemoryAccess};
use num_format::{Locale, ToFormattedString};

use crate::classify::{classify, ClassifierConfig, PatternMatch};
use crate::graphlets::{count_graphlets, EnumeratorConfig, GraphletCounts};
use crate::signature::Signature;
use crate::Error;

/// Aggregate facts about the analyzed trace.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TraceMeta {
    pub source: String,
    pub total_accesses: u64,
    pub unique_addresses: u64,
    pub min_timestamp: u64,
    pub max_timestamp: u64,
}

/// Shape statistics of the co-occurrence graph.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub density: f64,
    pub mean_degree: f64,
}

impl GraphStats {
    fn of(graph: &AccessGraph) -> Self {
        Self {
            node_count: graph.node_count(),
            edge_count: graph.edge_count(),
            density: graph.density(),
            mean_degree: graph.mean_degree(),
        }
    }
}

/// Configuration for one full pipeline run.
#[derive(Clone, Copy, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnalysisConfig {
    pub graph: GraphConfig,
    pub enumerator: EnumeratorConfig,
    pub classifier: ClassifierConfig,
}

/// Everything one analysis produces. Plain data; rendering it is the
/// caller's concern.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AnalysisResult {
    pub trace: TraceMeta,
    pub graph: GraphStats,
    pub graphlets: GraphletCounts,
    pub signature: Signature,
    /// Ranked best-first; empty exactly when the input was empty.
    pub matches: Vec<PatternMatch>,
    /// True when the graphlet counts are sampling estimates.
    pub sampled: bool,
    pub empty_input: bool,
}

/// Runs build, enumeration and classification over one access stream.
///
/// The stream is consumed exactly once and never materialized. An empty
/// stream is not an error: it produces an empty graph, an all-zero
/// signature, no matches and the `empty_input` flag.
pub fn analyze<I>(source: &str, accesses: I, config: &AnalysisConfig) -> Result<AnalysisResult, Error>
where
    I: IntoIterator<Item = MemoryAccess>,
{
    config.enumerator.validate()?;
    config.classifier.validate()?;

    let start = Instant::now();

    let builder = GraphBuilder::new(config.graph)?.accesses(accesses);
    let stats = builder.trace_stats();
    let graph = builder.build();

    let graphlets = count_graphlets(&graph, &config.enumerator)?;
    let signature = Signature::from_counts(&graphlets);
    let matches = classify(&signature, &config.classifier)?;

    info!(
        "Analyzed {} accesses from {source} in {:?}",
        stats.total_accesses.to_formatted_string(&Locale::en),
        start.elapsed()
    );

    Ok(AnalysisResult {
        trace: TraceMeta {
            source: source.to_string(),
            total_accesses: stats.total_accesses,
            unique_addresses: stats.unique_addresses,
            min_timestamp: stats.min_timestamp,
            max_timestamp: stats.max_timestamp,
        },
        graph: GraphStats::of(&graph),
        graphlets,
        signature,
        matches,
        sampled: graphlets.sampled(),
        empty_input: stats.total_accesses == 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_trace_is_not_an_error() {
        let result = analyze("empty", std::iter::empty(), &AnalysisConfig::default()).unwrap();
        assert!(result.empty_input);
        assert!(result.matches.is_empty());
        assert_eq!(result.graph.node_count, 0);
        assert_eq!(result.graph.edge_count, 0);
        assert_eq!(result.graphlets.total(), 0);
        assert!(result.signature.is_zero());
        assert!(!result.sampled);
    }

    #[test]
    fn invalid_config_fails_before_consuming_the_trace() {
        let config = AnalysisConfig {
            classifier: ClassifierConfig {
                threshold: 2.0,
                top_k: 3,
            },
            ..AnalysisConfig::default()
        };
        let result = analyze("bad", std::iter::empty(), &config);
        assert!(matches!(result, Err(Error::ThresholdOutOfRange { .. })));
    }

    #[test]
    fn metadata_reflects_the_stream() {
        let trace = vec![
            MemoryAccess::read(0x1000, 8, 3),
            MemoryAccess::write(0x1040, 8, 4),
            MemoryAccess::read(0x1000, 8, 9),
        ];
        let result = analyze("meta", trace, &AnalysisConfig::default()).unwrap();
        assert_eq!(result.trace.source, "meta");
        assert_eq!(result.trace.total_accesses, 3);
        assert_eq!(result.trace.unique_addresses, 2);
        assert_eq!(result.trace.min_timestamp, 3);
        assert_eq!(result.trace.max_timestamp, 9);
        assert!(!result.empty_input);
    }
}
