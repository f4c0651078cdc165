//! Pairs file parsing
//!
//! Streams a 4DN-style pairs file one record at a time.
//!
//! # Pairs Format
//!
//! ```text
//! ## pairs format v1.0
//! #columns: readID chr1 pos1 chr2 pos2 strand1 strand2 frag1 frag2
//! read1 chr1 120 chr1 5400 + + 0 12
//! ```
//!
//! - Lines starting with `#` form the header block and are skipped
//! - Fields are separated by runs of spaces or tabs
//! - `frag1` / `frag2` are 0-based indices into the fragment table

use crate::core::error::{PairsParseError, PairsResult};
use memchr::memchr2;
use std::io::BufRead;

/// Number of fields of a pairs data line used by the distance law
pub const PAIRS_FIELDS: usize = 9;

/// Strand orientation of a read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strand {
    Plus,
    Minus,
}

impl Strand {
    /// Parse strand from byte
    ///
    /// # Examples
    /// ```
    /// use fast_distlaw::core::Strand;
    /// assert_eq!(Strand::from_byte(b'+'), Some(Strand::Plus));
    /// assert_eq!(Strand::from_byte(b'-'), Some(Strand::Minus));
    /// assert_eq!(Strand::from_byte(b'.'), None);
    /// ```
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            b'+' => Some(Strand::Plus),
            b'-' => Some(Strand::Minus),
            _ => None,
        }
    }

    /// Parse strand from a field
    pub fn from_field(s: &str) -> Option<Self> {
        match s.as_bytes() {
            [b] => Self::from_byte(*b),
            _ => None,
        }
    }
}

/// One read pair, borrowing its text fields from the input line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadPair<'a> {
    pub read_id: &'a str,
    pub chrom1: &'a str,
    pub pos1: u64,
    pub chrom2: &'a str,
    pub pos2: u64,
    pub strand1: Strand,
    pub strand2: Strand,
    pub frag1: usize,
    pub frag2: usize,
}

/// Split a line on runs of spaces/tabs
fn split_fields(line: &str) -> impl Iterator<Item = &str> {
    let bytes = line.as_bytes();
    let mut pos = 0;
    std::iter::from_fn(move || {
        while pos < bytes.len() && (bytes[pos] == b' ' || bytes[pos] == b'\t') {
            pos += 1;
        }
        if pos >= bytes.len() {
            return None;
        }
        let start = pos;
        let end = memchr2(b' ', b'\t', &bytes[start..])
            .map(|offset| start + offset)
            .unwrap_or(bytes.len());
        pos = end;
        Some(&line[start..end])
    })
}

fn parse_number<T: std::str::FromStr>(
    value: &str,
    field: &'static str,
    line: usize,
) -> PairsResult<T> {
    value.parse().map_err(|_| PairsParseError::InvalidNumber {
        line,
        field,
        value: value.to_string(),
    })
}

fn parse_strand(value: &str, line: usize) -> PairsResult<Strand> {
    Strand::from_field(value).ok_or_else(|| PairsParseError::InvalidStrand {
        line,
        strand: value.to_string(),
    })
}

impl<'a> ReadPair<'a> {
    /// Parse a pairs data line
    ///
    /// Extra columns after `frag2` are ignored.
    pub fn parse(line: &'a str, line_number: usize) -> PairsResult<Self> {
        let mut fields = [""; PAIRS_FIELDS];
        let mut found = 0;
        for field in split_fields(line).take(PAIRS_FIELDS) {
            fields[found] = field;
            found += 1;
        }
        if found < PAIRS_FIELDS {
            return Err(PairsParseError::TooFewFields {
                line: line_number,
                expected: PAIRS_FIELDS,
                found,
            });
        }

        Ok(Self {
            read_id: fields[0],
            chrom1: fields[1],
            pos1: parse_number(fields[2], "pos1", line_number)?,
            chrom2: fields[3],
            pos2: parse_number(fields[4], "pos2", line_number)?,
            strand1: parse_strand(fields[5], line_number)?,
            strand2: parse_strand(fields[6], line_number)?,
            frag1: parse_number(fields[7], "frag1", line_number)?,
            frag2: parse_number(fields[8], "frag2", line_number)?,
        })
    }
}

/// Streaming pairs reader
///
/// Reuses one line buffer; each call to [`PairsReader::next_pair`] borrows
/// the record from it until the next call.
pub struct PairsReader<R: BufRead> {
    reader: R,
    buffer: String,
    line_number: usize,
    header_lines: usize,
}

impl<R: BufRead> PairsReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: String::with_capacity(1024),
            line_number: 0,
            header_lines: 0,
        }
    }

    /// Number of `#` lines skipped so far
    pub fn header_lines(&self) -> usize {
        self.header_lines
    }

    /// Line number of the last line read (1-based)
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Advance to the next data line, leaving it in the buffer
    ///
    /// Returns `Ok(false)` at EOF.
    fn advance(&mut self) -> PairsResult<bool> {
        loop {
            self.buffer.clear();
            if self.reader.read_line(&mut self.buffer)? == 0 {
                return Ok(false);
            }
            self.line_number += 1;

            let line = self.buffer.trim_end();
            if line.is_empty() {
                continue;
            }
            if line.starts_with('#') {
                self.header_lines += 1;
                continue;
            }
            return Ok(true);
        }
    }

    /// Read the next record with its 1-based line number, `None` at EOF
    pub fn next_pair(&mut self) -> Option<PairsResult<(usize, ReadPair<'_>)>> {
        match self.advance() {
            Ok(true) => {
                let line = self.line_number;
                Some(ReadPair::parse(self.buffer.trim_end(), line).map(|pair| (line, pair)))
            }
            Ok(false) => None,
            Err(e) => Some(Err(e)),
        }
    }

    /// Append up to `max` raw data lines with their line numbers
    ///
    /// Returns the number of lines appended; 0 means EOF.
    pub fn read_batch(&mut self, batch: &mut Vec<(usize, String)>, max: usize) -> PairsResult<usize> {
        let mut read = 0;
        while read < max && self.advance()? {
            batch.push((self.line_number, self.buffer.trim_end().to_string()));
            read += 1;
        }
        Ok(read)
    }
}
