//! Distance law table
//!
//! Tab-separated, no header, one row per bin:
//!
//! ```text
//! <bin_start>\t<value>\t<label>
//! ```
//!
//! Curves are written one after the other, bins in increasing order.

use crate::core::io::InputReader;
use crate::core::{
    DistanceLawCurve, DistanceLawError, Result, SlopeCurve, TableParseError, TableResult,
};
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use std::path::Path;

/// Table value: positional for ordinary magnitudes, scientific notation
/// outside `[1e-4, 1e16)` so tiny probabilities stay short
struct Value(f64);

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let magnitude = self.0.abs();
        if self.0 == 0.0 || !self.0.is_finite() || (1e-4..1e16).contains(&magnitude) {
            write!(f, "{}", self.0)
        } else {
            write!(f, "{:e}", self.0)
        }
    }
}

/// Write `(bin, value)` rows of labelled curves
fn write_rows<'a, W, I>(writer: &mut W, rows: I) -> std::io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = (&'a str, &'a [u64], &'a [f64])>,
{
    for (label, bins, values) in rows {
        for (bin, value) in bins.iter().zip(values) {
            writeln!(writer, "{}\t{}\t{}", bin, Value(*value), label)?;
        }
    }
    Ok(())
}

/// Write curves under the given labels
///
/// # Errors
/// `SizeMismatch` when there are not as many labels as curves.
pub fn write_distance_law<W: Write>(
    writer: &mut W,
    curves: &[DistanceLawCurve],
    labels: &[String],
) -> Result<()> {
    if curves.len() != labels.len() {
        return Err(DistanceLawError::SizeMismatch {
            segments: curves.len(),
            labels: labels.len(),
        });
    }
    write_rows(
        writer,
        curves
            .iter()
            .zip(labels)
            .map(|(c, label)| (label.as_str(), c.bins.as_slice(), c.probabilities.as_slice())),
    )?;
    Ok(())
}

/// Write curves to a table file
pub fn export_distance_law(path: &Path, curves: &[DistanceLawCurve], labels: &[String]) -> Result<()> {
    if curves.len() != labels.len() {
        return Err(DistanceLawError::SizeMismatch {
            segments: curves.len(),
            labels: labels.len(),
        });
    }
    let mut writer = BufWriter::with_capacity(128 * 1024, File::create(path)?);
    write_distance_law(&mut writer, curves, labels)?;
    writer.flush()?;
    Ok(())
}

/// Write slope curves to a table file
pub fn export_slopes(path: &Path, slopes: &[SlopeCurve]) -> Result<()> {
    let mut writer = BufWriter::with_capacity(128 * 1024, File::create(path)?);
    write_rows(
        &mut writer,
        slopes
            .iter()
            .map(|s| (s.label.as_str(), s.bins.as_slice(), s.slopes.as_slice())),
    )?;
    writer.flush()?;
    Ok(())
}

/// Read curves back from a table, grouped by label in order of first
/// appearance
pub fn read_distance_law_from<R: BufRead>(reader: R) -> TableResult<Vec<DistanceLawCurve>> {
    let mut curves: Vec<DistanceLawCurve> = Vec::new();
    let mut by_label: HashMap<String, usize> = HashMap::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line_number = i + 1;
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.splitn(3, '\t').collect();
        if fields.len() < 3 {
            return Err(TableParseError::TooFewFields {
                line: line_number,
                found: fields.len(),
            });
        }
        let bin: u64 = fields[0].parse().map_err(|_| TableParseError::InvalidNumber {
            line: line_number,
            field: "bin",
            value: fields[0].to_string(),
        })?;
        let value: f64 = fields[1].parse().map_err(|_| TableParseError::InvalidNumber {
            line: line_number,
            field: "value",
            value: fields[1].to_string(),
        })?;

        let label = fields[2];
        let index = match by_label.get(label) {
            Some(&index) => index,
            None => {
                by_label.insert(label.to_string(), curves.len());
                curves.push(DistanceLawCurve::new(label, Vec::new(), Vec::new()));
                curves.len() - 1
            }
        };
        curves[index].bins.push(bin);
        curves[index].probabilities.push(value);
    }

    Ok(curves)
}

/// Read a table file (plain, gzip or bzip2)
pub fn import_distance_law(path: &Path) -> TableResult<Vec<DistanceLawCurve>> {
    read_distance_law_from(InputReader::open(path)?)
}
