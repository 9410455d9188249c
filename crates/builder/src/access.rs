/// Identifies a node in the co-occurrence graph.
///
/// A `NodeId` is a coarsened address; two accesses map to the same node
/// exactly when they fall into the same coarsening unit.
pub type NodeId = u64;

/// The kind of a single memory operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AccessKind {
    Read,
    Write,
    /// A read-modify-write. Parsers that cannot express it split it into a
    /// read followed by a write at the same timestamp.
    Modify,
}

/// A single record of a memory-access trace.
///
/// Timestamps are used for ordering only and are never interpreted
/// numerically; the stream order of the trace is authoritative.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MemoryAccess {
    pub kind: AccessKind,
    pub addr: u64,
    pub size: u32,
    pub timestamp: u64,
}

impl MemoryAccess {
    pub fn new(kind: AccessKind, addr: u64, size: u32, timestamp: u64) -> Self {
        Self {
            kind,
            addr,
            size,
            timestamp,
        }
    }

    pub fn read(addr: u64, size: u32, timestamp: u64) -> Self {
        Self::new(AccessKind::Read, addr, size, timestamp)
    }

    pub fn write(addr: u64, size: u32, timestamp: u64) -> Self {
        Self::new(AccessKind::Write, addr, size, timestamp)
    }
}

/// The resolution at which addresses collapse into graph nodes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Granularity {
    /// Every byte address is its own node.
    Byte,
    /// 64-byte cache lines.
    #[default]
    CacheLine,
    /// 4 KiB pages.
    Page,
}

impl Granularity {
    /// Maps an address to its node id.
    ///
    /// An access that spans a coarsening boundary is attributed to the
    /// unit containing its start address; it is not split.
    #[inline]
    pub fn coarsen(self, addr: u64) -> NodeId {
        match self {
            Granularity::Byte => addr,
            Granularity::CacheLine => addr >> 6,
            Granularity::Page => addr >> 12,
        }
    }
}
