pub use crate::analysis::analyze;
pub use crate::analysis::AnalysisConfig;
pub use crate::analysis::AnalysisResult;
pub use crate::analysis::GraphStats;
pub use crate::analysis::TraceMeta;

pub use crate::classify::classify;
pub use crate::classify::ClassifierConfig;
pub use crate::classify::Evidence;
pub use crate::classify::PatternMatch;

pub use crate::graphlets::count_graphlets;
pub use crate::graphlets::EnumeratorConfig;
pub use crate::graphlets::Graphlet;
pub use crate::graphlets::GraphletCounts;
pub use crate::graphlets::SamplingMode;

pub use crate::patterns::reference_patterns;
pub use crate::patterns::PatternKind;
pub use crate::patterns::ReferencePattern;

pub use crate::signature::Signature;

pub use crate::Error;

pub use memgraph_builder::prelude::*;
