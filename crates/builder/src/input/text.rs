//! The native text trace format.
//!
//! One access per line, comma separated:
//!
//! ```text
//! # operation,address,size,timestamp
//! R,0x7fff5a8b1000,8,1
//! W,0x7fff5a8b1008,4,2
//! ```
//!
//! Operations are `R` (read), `W` (write) and `M` (modify, expanded into a
//! read followed by a write at the same timestamp). Addresses are
//! hexadecimal with a `0x` prefix. Comment lines start with `#`. Lines
//! with an unknown operation symbol are skipped with a warning; lines with
//! a known operation but unparsable fields are an error.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use atoi::{FromRadix10, FromRadix16};
use linereader::LineReader;
use log::warn;

use crate::access::{AccessKind, MemoryAccess};
use crate::Error;

/// Reads the text trace format from any byte source.
pub struct TextTraceReader;

impl TextTraceReader {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<MemoryAccess>, Error> {
        Self::read(File::open(path)?)
    }

    pub fn read<R: Read>(source: R) -> Result<Vec<MemoryAccess>, Error> {
        let mut accesses = Vec::new();
        let mut lines = LineReader::new(source);
        let mut line_no = 0;

        while let Some(line) = lines.next_line() {
            let line = line?;
            line_no += 1;
            parse_line(trim(line), line_no, &mut accesses)?;
        }

        Ok(accesses)
    }
}

fn trim(mut line: &[u8]) -> &[u8] {
    while let [rest @ .., last] = line {
        if last.is_ascii_whitespace() {
            line = rest;
        } else {
            break;
        }
    }
    line
}

fn parse_line(line: &[u8], line_no: usize, out: &mut Vec<MemoryAccess>) -> Result<(), Error> {
    if line.is_empty() || line[0] == b'#' {
        return Ok(());
    }

    let mut fields = line.split(|&b| b == b',');

    let kind = match fields.next() {
        Some(b"R") => AccessKind::Read,
        Some(b"W") => AccessKind::Write,
        Some(b"M") => AccessKind::Modify,
        _ => {
            warn!(
                "skipping line {}: unknown operation in {:?}",
                line_no,
                String::from_utf8_lossy(line)
            );
            return Ok(());
        }
    };

    let addr = parse_addr(fields.next(), line_no)?;
    let size = parse_number::<u32>(fields.next(), line_no, "size")?;
    let timestamp = parse_number::<u64>(fields.next(), line_no, "timestamp")?;

    match kind {
        AccessKind::Modify => {
            out.push(MemoryAccess::read(addr, size, timestamp));
            out.push(MemoryAccess::write(addr, size, timestamp));
        }
        kind => out.push(MemoryAccess::new(kind, addr, size, timestamp)),
    }
    Ok(())
}

fn parse_addr(field: Option<&[u8]>, line_no: usize) -> Result<u64, Error> {
    let field = field.ok_or_else(|| malformed(line_no, "missing address"))?;
    let digits = field
        .strip_prefix(b"0x")
        .or_else(|| field.strip_prefix(b"0X"))
        .ok_or_else(|| malformed(line_no, "address lacks 0x prefix"))?;
    let (addr, used) = u64::from_radix_16(digits);
    if used == 0 || used != digits.len() {
        return Err(malformed(line_no, "address is not hexadecimal"));
    }
    Ok(addr)
}

fn parse_number<T: FromRadix10>(
    field: Option<&[u8]>,
    line_no: usize,
    what: &str,
) -> Result<T, Error> {
    let field = field.ok_or_else(|| malformed(line_no, &format!("missing {what}")))?;
    let (value, used) = T::from_radix_10(field);
    if used == 0 || used != field.len() {
        return Err(malformed(line_no, &format!("{what} is not a number")));
    }
    Ok(value)
}

fn malformed(line: usize, reason: &str) -> Error {
    Error::MalformedRecord {
        line,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_reads_and_writes() {
        let input = b"# operation,address,size,timestamp\n\
                      R,0x7fff5a8b1000,8,1\n\
                      W,0x7fff5a8b1008,4,2\n";
        let accesses = TextTraceReader::read(&input[..]).unwrap();
        assert_eq!(
            accesses,
            vec![
                MemoryAccess::read(0x7fff_5a8b_1000, 8, 1),
                MemoryAccess::write(0x7fff_5a8b_1008, 4, 2),
            ]
        );
    }

    #[test]
    fn modify_expands_to_read_then_write() {
        let accesses = TextTraceReader::read(&b"M,0x100,8,7\n"[..]).unwrap();
        assert_eq!(
            accesses,
            vec![
                MemoryAccess::read(0x100, 8, 7),
                MemoryAccess::write(0x100, 8, 7),
            ]
        );
    }

    #[test]
    fn unknown_operation_is_skipped() {
        let input = b"R,0x10,8,1\nI,0x20,8,2\nhello world\nW,0x30,8,3\n";
        let accesses = TextTraceReader::read(&input[..]).unwrap();
        assert_eq!(accesses.len(), 2);
        assert_eq!(accesses[1], MemoryAccess::write(0x30, 8, 3));
    }

    #[test]
    fn malformed_known_operation_is_an_error() {
        let result = TextTraceReader::read(&b"R,12345,8,1\n"[..]);
        assert!(matches!(result, Err(Error::MalformedRecord { line: 1, .. })));

        let result = TextTraceReader::read(&b"W,0x10,eight,1\n"[..]);
        assert!(matches!(result, Err(Error::MalformedRecord { line: 1, .. })));
    }

    #[test]
    fn handles_missing_trailing_newline() {
        let accesses = TextTraceReader::read(&b"R,0x40,8,1"[..]).unwrap();
        assert_eq!(accesses, vec![MemoryAccess::read(0x40, 8, 1)]);
    }

    #[test]
    fn reads_from_a_file() {
        use std::io::Write as _;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "R,0x1000,8,1\nM,0x1040,8,2\n").unwrap();
        let accesses = TextTraceReader::from_path(file.path()).unwrap();
        assert_eq!(accesses.len(), 3);
    }
}
