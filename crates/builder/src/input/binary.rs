//! The native binary trace format.
//!
//! An eight-byte magic (`MGTRACE1`) followed by fixed-width records of
//! four host-order u64 words: operation, address, size, timestamp. The
//! reader maps the file and reinterprets the record section in place.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use byte_slice_cast::{AsByteSlice, AsSliceOf};

use crate::access::{AccessKind, MemoryAccess};
use crate::Error;

const MAGIC: &[u8; 8] = b"MGTRACE1";
const WORDS_PER_RECORD: usize = 4;

const OP_READ: u64 = 0;
const OP_WRITE: u64 = 1;
const OP_MODIFY: u64 = 2;

/// Reads a trace written by [`BinaryTraceWriter`].
pub struct BinaryTraceReader;

impl BinaryTraceReader {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<MemoryAccess>, Error> {
        let file = File::open(path)?;
        let mmap = unsafe { memmap2::MmapOptions::new().populate().map(&file)? };
        Self::decode(mmap.as_ref())
    }

    pub fn decode(bytes: &[u8]) -> Result<Vec<MemoryAccess>, Error> {
        let body = bytes
            .strip_prefix(MAGIC.as_slice())
            .ok_or(Error::BadMagic)?;

        let words = body
            .as_slice_of::<u64>()
            .map_err(|_| Error::TruncatedTrace)?;
        if words.len() % WORDS_PER_RECORD != 0 {
            return Err(Error::TruncatedTrace);
        }

        words
            .chunks_exact(WORDS_PER_RECORD)
            .enumerate()
            .map(|(record, chunk)| {
                let kind = match chunk[0] {
                    OP_READ => AccessKind::Read,
                    OP_WRITE => AccessKind::Write,
                    OP_MODIFY => AccessKind::Modify,
                    other => {
                        return Err(Error::MalformedRecord {
                            line: record,
                            reason: format!("unknown operation code {other}"),
                        })
                    }
                };
                Ok(MemoryAccess::new(kind, chunk[1], chunk[2] as u32, chunk[3]))
            })
            .collect()
    }
}

/// Writes the binary trace format.
pub struct BinaryTraceWriter;

impl BinaryTraceWriter {
    pub fn to_path<P: AsRef<Path>>(path: P, accesses: &[MemoryAccess]) -> Result<(), Error> {
        let mut out = BufWriter::new(File::create(path)?);
        out.write_all(MAGIC)?;
        for access in accesses {
            let op = match access.kind {
                AccessKind::Read => OP_READ,
                AccessKind::Write => OP_WRITE,
                AccessKind::Modify => OP_MODIFY,
            };
            let record = [op, access.addr, u64::from(access.size), access.timestamp];
            out.write_all(record.as_byte_slice())?;
        }
        out.flush()?;
        Ok(())
    }
}
