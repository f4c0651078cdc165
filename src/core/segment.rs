//! Chromosome / arm segmentation of the fragment table
//!
//! A segment is the unit over which a distance law is computed: either a
//! whole chromosome or one of its two arms when centromere positions are
//! given.

use crate::core::error::{DistanceLawError, Result};
use crate::core::fragment::FragmentTable;
use log::debug;

/// Suffix appended to the chromosome name for the left arm
pub const LEFT_ARM_SUFFIX: &str = "_left";

/// Suffix appended to the chromosome name for the right arm
pub const RIGHT_ARM_SUFFIX: &str = "_right";

/// Compute the start fragment index of every chromosome or arm
///
/// Chromosome starts are the fragments beginning at position 0. With
/// centromeres, the last fragment of each chromosome satisfying
/// `start / centromere == 0` is added as the first fragment of the right
/// arm. Boundaries are returned sorted and without duplicates.
///
/// # Errors
/// - `LengthMismatch` if the centromere count differs from the chromosome count
/// - `InvalidConfiguration` if a centromere position is 0
pub fn segment_starts(table: &FragmentTable, centromeres: Option<&[u64]>) -> Result<Vec<usize>> {
    let chrom_starts = table.chrom_starts();
    let centromeres = match centromeres {
        Some(c) => c,
        None => return Ok(chrom_starts),
    };

    if chrom_starts.len() != centromeres.len() {
        return Err(DistanceLawError::LengthMismatch {
            expected: chrom_starts.len(),
            found: centromeres.len(),
        });
    }

    let fragments = table.fragments();
    let mut starts = chrom_starts.clone();

    for (i, (&chrom_start, &centromere)) in chrom_starts.iter().zip(centromeres).enumerate() {
        if centromere == 0 {
            return Err(DistanceLawError::InvalidConfiguration(format!(
                "centromere position of chromosome {} is 0",
                i + 1
            )));
        }
        let chrom_end = chrom_starts.get(i + 1).copied().unwrap_or(fragments.len());
        let last_left = fragments[chrom_start..chrom_end]
            .iter()
            .rposition(|f| f.start / centromere == 0)
            .unwrap_or(0);
        starts.push(chrom_start + last_left);
    }

    starts.sort_unstable();
    starts.dedup();
    Ok(starts)
}

/// Compute the length in base pairs of every segment
///
/// A segment whose first fragment starts at 0 or 1 is chromosome-initial and
/// its length is the end of its last fragment. Otherwise the end of the
/// preceding arm is subtracted.
///
/// # Errors
/// `InvalidFragments` if a boundary is out of range or a segment is empty.
pub fn segment_lengths(table: &FragmentTable, starts: &[usize]) -> Result<Vec<u64>> {
    let fragments = table.fragments();
    let mut lengths = Vec::with_capacity(starts.len());

    for (i, &start) in starts.iter().enumerate() {
        let next = starts.get(i + 1).copied().unwrap_or(fragments.len());
        if start >= next || next > fragments.len() {
            return Err(DistanceLawError::InvalidFragments(format!(
                "segment {} has no fragments (boundaries {}..{})",
                i, start, next
            )));
        }

        let end = fragments[next - 1].end;
        let length = if fragments[start].start <= 1 || start == 0 {
            end
        } else {
            end.saturating_sub(fragments[start - 1].end)
        };

        if length == 0 {
            return Err(DistanceLawError::InvalidFragments(format!(
                "segment {} starting at fragment {} has length 0",
                i, start
            )));
        }
        lengths.push(length);
    }

    Ok(lengths)
}

/// Labels of the segments: chromosome names, or `<chrom>_left` /
/// `<chrom>_right` pairs when split into arms
pub fn segment_labels(table: &FragmentTable, split_arms: bool) -> Vec<String> {
    let names = table
        .chrom_starts()
        .into_iter()
        .filter_map(|i| table.chrom_of(i))
        .map(str::to_string);

    if split_arms {
        names
            .flat_map(|name| {
                [
                    format!("{}{}", name, LEFT_ARM_SUFFIX),
                    format!("{}{}", name, RIGHT_ARM_SUFFIX),
                ]
            })
            .collect()
    } else {
        names.collect()
    }
}

/// Segments of one run: boundaries, lengths and labels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segments {
    starts: Vec<usize>,
    lengths: Vec<u64>,
    labels: Vec<String>,
}

impl Segments {
    /// Segment a fragment table
    ///
    /// # Errors
    /// - `InvalidConfiguration` when `circular` is combined with centromeres
    /// - `SizeMismatch` when the segment count differs from the label count
    /// - any error from [`segment_starts`] and [`segment_lengths`]
    pub fn build(
        table: &FragmentTable,
        centromeres: Option<&[u64]>,
        circular: bool,
    ) -> Result<Self> {
        if circular && centromeres.is_some() {
            return Err(DistanceLawError::InvalidConfiguration(
                "chromosomes cannot have a centromere and be circular".into(),
            ));
        }
        table.validate()?;

        let starts = segment_starts(table, centromeres)?;
        let lengths = segment_lengths(table, &starts)?;
        let labels = segment_labels(table, centromeres.is_some());

        if starts.len() != labels.len() {
            return Err(DistanceLawError::SizeMismatch {
                segments: starts.len(),
                labels: labels.len(),
            });
        }

        for ((label, start), length) in labels.iter().zip(&starts).zip(&lengths) {
            debug!("Segment {}: first fragment {}, length {} bp", label, start, length);
        }

        Ok(Self {
            starts,
            lengths,
            labels,
        })
    }

    pub fn len(&self) -> usize {
        self.starts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    pub fn starts(&self) -> &[usize] {
        &self.starts
    }

    pub fn lengths(&self) -> &[u64] {
        &self.lengths
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Segment containing a fragment: the rightmost boundary not after it
    pub fn segment_of(&self, fragment: usize) -> Option<usize> {
        self.starts
            .partition_point(|&start| start <= fragment)
            .checked_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// chr1: 4 fragments over 1000 bp, chr2: 3 fragments over 600 bp
    fn table() -> FragmentTable {
        FragmentTable::from_rows(vec![
            ("chr1", 0, 200),
            ("chr1", 200, 450),
            ("chr1", 450, 700),
            ("chr1", 700, 1000),
            ("chr2", 0, 100),
            ("chr2", 100, 350),
            ("chr2", 350, 600),
        ])
    }

    #[test]
    fn test_starts_without_centromeres() {
        assert_eq!(segment_starts(&table(), None).unwrap(), vec![0, 4]);
    }

    #[test]
    fn test_starts_with_centromeres() {
        // chr1 centromere at 500: fragments starting at 0, 200, 450 lie left
        // of it, the last of them (index 2) opens the right arm.
        // chr2 centromere at 120: fragment 1 (start 100) is the last one.
        let starts = segment_starts(&table(), Some(&[500, 120][..])).unwrap();
        assert_eq!(starts, vec![0, 2, 4, 5]);
    }

    #[test]
    fn test_centromere_exactly_at_fragment_start() {
        // start 450 / 450 == 1, so fragment 2 belongs to the right side of
        // the boundary test and fragment 1 is the last left one.
        let starts = segment_starts(&table(), Some(&[450, 120][..])).unwrap();
        assert_eq!(starts, vec![0, 1, 4, 5]);
    }

    #[test]
    fn test_centromere_count_mismatch() {
        let err = segment_starts(&table(), Some(&[500][..])).unwrap_err();
        assert!(matches!(
            err,
            DistanceLawError::LengthMismatch { expected: 2, found: 1 }
        ));
    }

    #[test]
    fn test_zero_centromere_rejected() {
        let err = segment_starts(&table(), Some(&[0, 120][..])).unwrap_err();
        assert!(matches!(err, DistanceLawError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_lengths_chromosomes() {
        let t = table();
        let starts = segment_starts(&t, None).unwrap();
        assert_eq!(segment_lengths(&t, &starts).unwrap(), vec![1000, 600]);
    }

    #[test]
    fn test_lengths_arms() {
        let t = table();
        let starts = segment_starts(&t, Some(&[500, 120][..])).unwrap();
        // chr1_left ends at 450, chr1_right = 1000 - 450,
        // chr2_left ends at 100, chr2_right = 600 - 100
        assert_eq!(segment_lengths(&t, &starts).unwrap(), vec![450, 550, 100, 500]);
    }

    #[test]
    fn test_labels() {
        assert_eq!(segment_labels(&table(), false), vec!["chr1", "chr2"]);
        assert_eq!(
            segment_labels(&table(), true),
            vec!["chr1_left", "chr1_right", "chr2_left", "chr2_right"]
        );
    }

    #[test]
    fn test_build_rejects_circular_with_centromeres() {
        let err = Segments::build(&table(), Some(&[500, 120][..]), true).unwrap_err();
        assert!(matches!(err, DistanceLawError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_build_size_mismatch_on_collapsed_arm() {
        // Centromere inside the first fragment of chr2 collapses its left arm
        let err = Segments::build(&table(), Some(&[500, 50][..]), false).unwrap_err();
        assert!(matches!(
            err,
            DistanceLawError::SizeMismatch { segments: 3, labels: 4 }
        ));
    }

    #[test]
    fn test_segment_of() {
        let segments = Segments::build(&table(), Some(&[500, 120][..]), false).unwrap();
        assert_eq!(segments.segment_of(0), Some(0));
        assert_eq!(segments.segment_of(1), Some(0));
        assert_eq!(segments.segment_of(2), Some(1));
        assert_eq!(segments.segment_of(3), Some(1));
        assert_eq!(segments.segment_of(4), Some(2));
        assert_eq!(segments.segment_of(6), Some(3));
    }
}
