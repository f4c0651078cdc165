//! Fragment list and centromere file readers
//!
//! # Fragment List Format
//!
//! ```text
//! id  chrom  start_pos  end_pos  size  gc_content
//! 1   chr1   0          1200     1200  0.41
//! 2   chr1   1200       3050     1850  0.38
//! ```
//!
//! Tab-separated, one header line, fragment numbering restarting at 1 on
//! every chromosome. Only the first four columns are used.
//!
//! # Centromere File Format
//!
//! A single line of space-separated positions, one per chromosome, in
//! fragment list order.

use crate::core::io::InputReader;
use crate::core::{FragmentParseError, FragmentResult, FragmentTable};
use log::info;
use std::io::BufRead;
use std::path::Path;

fn parse_position(value: &str, field: &'static str, line: usize) -> FragmentResult<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| FragmentParseError::InvalidNumber {
            line,
            field,
            value: value.to_string(),
        })
}

/// Parse one fragment list row into `(chrom, start, end)`
pub fn parse_fragment_line(line: &str, line_number: usize) -> FragmentResult<(&str, u64, u64)> {
    let fields: Vec<&str> = line.split('\t').take(4).collect();
    if fields.len() < 4 {
        return Err(FragmentParseError::TooFewFields {
            line: line_number,
            expected: 4,
            found: fields.len(),
        });
    }

    let start = parse_position(fields[2], "start_pos", line_number)?;
    let end = parse_position(fields[3], "end_pos", line_number)?;
    if start > end {
        return Err(FragmentParseError::InvalidCoordinates {
            line: line_number,
            start,
            end,
        });
    }
    Ok((fields[1], start, end))
}

/// Read a fragment list from any buffered source
///
/// The first line is treated as a header when its start column is not a
/// number.
pub fn read_fragment_list_from<R: BufRead>(reader: R) -> FragmentResult<FragmentTable> {
    let mut table = FragmentTable::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line_number = i + 1;
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }
        if line_number == 1 && is_header(line) {
            continue;
        }
        let (chrom, start, end) = parse_fragment_line(line, line_number)?;
        table.push(chrom, start, end);
    }

    Ok(table)
}

/// A header has a non-integer start column; short rows are left to the
/// row parser so they fail with `TooFewFields`
fn is_header(line: &str) -> bool {
    line.split('\t')
        .nth(2)
        .is_some_and(|field| field.trim().parse::<u64>().is_err())
}

/// Read a fragment list file (plain, gzip or bzip2)
pub fn read_fragment_list(path: &Path) -> FragmentResult<FragmentTable> {
    let reader = InputReader::open(path)?;
    let table = read_fragment_list_from(reader)?;
    info!(
        "Loaded {} fragments on {} chromosomes from {}",
        table.len(),
        table.chrom_names().len(),
        path.display()
    );
    Ok(table)
}

/// Parse centromere positions from the first non-empty line of a source
pub fn read_centromeres_from<R: BufRead>(reader: R) -> FragmentResult<Vec<u64>> {
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        return line
            .split_whitespace()
            .map(|value| parse_position(value, "centromere", i + 1))
            .collect();
    }
    Err(FragmentParseError::EmptyCentromeres)
}

/// Read a centromere file
pub fn read_centromeres(path: &Path) -> FragmentResult<Vec<u64>> {
    read_centromeres_from(InputReader::open(path)?)
}
