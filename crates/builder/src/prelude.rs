pub use crate::access::AccessKind;
pub use crate::access::Granularity;
pub use crate::access::MemoryAccess;
pub use crate::access::NodeId;

pub use crate::builder::GraphBuilder;
pub use crate::builder::GraphConfig;
pub use crate::builder::TraceStats;

pub use crate::graph::AccessGraph;

pub use crate::input::binary::BinaryTraceReader;
pub use crate::input::binary::BinaryTraceWriter;
pub use crate::input::text::TextTraceReader;

pub use crate::window::WindowKind;

pub use crate::Error;
