//! Read pair classification
//!
//! Turns one read pair into at most one increment of the contact
//! accumulator:
//! 1. Keep only same-orientation pairs (+/+ or -/-)
//! 2. Resolve both fragments to their segment, drop inter-segment pairs
//! 3. Measure the distance between the religated fragment ends
//! 4. Fold the distance on circular chromosomes
//! 5. Increment the log bin containing the distance

use crate::core::error::{DistanceLawError, Result};
use crate::core::fragment::FragmentTable;
use crate::core::logbins::find_bin;
use crate::core::pairs::{ReadPair, Strand};
use crate::core::segment::Segments;

/// Distance on a circular segment
///
/// A wrap-around distance is never more than half the circumference.
///
/// # Examples
/// ```
/// use fast_distlaw::core::circular_distance_law;
/// assert_eq!(circular_distance_law(7500, &[2800, 9000], 1), 1500);
/// assert_eq!(circular_distance_law(1300, &[2800, 9000], 0), 1300);
/// assert_eq!(circular_distance_law(1400, &[2800, 9000], 0), 1400);
/// ```
pub fn circular_distance_law(distance: u64, lengths: &[u64], segment: usize) -> u64 {
    let length = lengths[segment];
    if distance as f64 > length as f64 / 2.0 {
        length.saturating_sub(distance)
    } else {
        distance
    }
}

/// Per-segment, per-bin contact counters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactAccumulator {
    counts: Vec<Vec<u64>>,
}

impl ContactAccumulator {
    /// Zero counters shaped like the bins of every segment
    pub fn zeroed(bins: &[Vec<u64>]) -> Self {
        Self {
            counts: bins.iter().map(|b| vec![0; b.len()]).collect(),
        }
    }

    pub fn increment(&mut self, segment: usize, bin: usize) {
        self.counts[segment][bin] += 1;
    }

    /// Counters of one segment
    pub fn segment(&self, segment: usize) -> &[u64] {
        &self.counts[segment]
    }

    pub fn counts(&self) -> &[Vec<u64>] {
        &self.counts
    }

    /// Sum of all counters
    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }

    /// Add the counters of another accumulator of the same shape
    pub fn merge(mut self, other: &Self) -> Self {
        for (mine, theirs) in self.counts.iter_mut().zip(&other.counts) {
            for (a, b) in mine.iter_mut().zip(theirs) {
                *a += b;
            }
        }
        self
    }
}

/// What happened to a classified pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Counted in `bin` of `segment`
    Counted { segment: usize, bin: usize },
    /// +/- or -/+ pair, not used
    OppositeStrands,
    /// Fragments in different chromosomes or arms
    InterSegment,
    /// Distance before the first bin start
    Unbinned,
}

/// Classification statistics
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ClassifyStats {
    pub total: usize,
    pub counted: usize,
    pub opposite_strands: usize,
    pub inter_segment: usize,
    pub unbinned: usize,
}

impl ClassifyStats {
    pub fn record(&mut self, classification: Classification) {
        self.total += 1;
        match classification {
            Classification::Counted { .. } => self.counted += 1,
            Classification::OppositeStrands => self.opposite_strands += 1,
            Classification::InterSegment => self.inter_segment += 1,
            Classification::Unbinned => self.unbinned += 1,
        }
    }

    pub fn merge(mut self, other: &Self) -> Self {
        self.total += other.total;
        self.counted += other.counted;
        self.opposite_strands += other.opposite_strands;
        self.inter_segment += other.inter_segment;
        self.unbinned += other.unbinned;
        self
    }
}

/// Classifies pairs against the segments and bins of one run
#[derive(Debug, Clone, Copy)]
pub struct PairClassifier<'a> {
    fragments: &'a FragmentTable,
    segments: &'a Segments,
    bins: &'a [Vec<u64>],
    circular: bool,
}

impl<'a> PairClassifier<'a> {
    pub fn new(
        fragments: &'a FragmentTable,
        segments: &'a Segments,
        bins: &'a [Vec<u64>],
        circular: bool,
    ) -> Self {
        Self {
            fragments,
            segments,
            bins,
            circular,
        }
    }

    /// Distance between the religated ends of two fragments
    ///
    /// Reads on the - strand point towards decreasing coordinates, so their
    /// religated end is the fragment start; for + reads it is the fragment end.
    fn ligation_distance(&self, strand: Strand, frag1: usize, frag2: usize) -> u64 {
        let fragments = self.fragments.fragments();
        let (a, b) = (&fragments[frag1], &fragments[frag2]);
        match strand {
            Strand::Minus => a.start.abs_diff(b.start),
            Strand::Plus => a.end.abs_diff(b.end),
        }
    }

    fn check_fragment(&self, index: usize, line: usize) -> Result<()> {
        if index >= self.fragments.len() {
            return Err(DistanceLawError::FragmentOutOfRange {
                line,
                index,
                len: self.fragments.len(),
            });
        }
        Ok(())
    }

    /// Classify a pair without touching any accumulator
    ///
    /// `line` is only used for error reporting.
    pub fn locate(&self, pair: &ReadPair<'_>, line: usize) -> Result<Classification> {
        if pair.strand1 != pair.strand2 {
            return Ok(Classification::OppositeStrands);
        }
        self.check_fragment(pair.frag1, line)?;
        self.check_fragment(pair.frag2, line)?;

        let segment = match (
            self.segments.segment_of(pair.frag1),
            self.segments.segment_of(pair.frag2),
        ) {
            (Some(s1), Some(s2)) if s1 == s2 => s1,
            _ => return Ok(Classification::InterSegment),
        };

        let mut distance = self.ligation_distance(pair.strand1, pair.frag1, pair.frag2);
        if self.circular {
            distance = circular_distance_law(distance, self.segments.lengths(), segment);
        }

        Ok(match find_bin(&self.bins[segment], distance) {
            Some(bin) => Classification::Counted { segment, bin },
            None => Classification::Unbinned,
        })
    }

    /// Classify a pair and count it in `accumulator` if it is used
    pub fn classify(
        &self,
        pair: &ReadPair<'_>,
        line: usize,
        accumulator: &mut ContactAccumulator,
    ) -> Result<Classification> {
        let classification = self.locate(pair, line)?;
        if let Classification::Counted { segment, bin } = classification {
            accumulator.increment(segment, bin);
        }
        Ok(classification)
    }
}
