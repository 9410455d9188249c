//! Readers for the native trace formats.
//!
//! Producing access records from external tracers (Valgrind Lackey, PIN,
//! CSV exports) is the tracer integration's concern; the two formats here
//! are the ones MemGraph defines itself. Both deliver records in stream
//! order, ready to feed into [`crate::GraphBuilder`].

pub mod binary;
pub mod text;
