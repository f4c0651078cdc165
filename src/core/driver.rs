//! Distance law computation
//!
//! Builds segments and log bins once, streams the pairs through the
//! classifier, then divides every bin count by the number of fragment pairs
//! the bin can hold.

use crate::core::classify::{ClassifyStats, ContactAccumulator, PairClassifier};
use crate::core::error::{DistanceLawError, Result};
use crate::core::fragment::FragmentTable;
use crate::core::io::InputReader;
use crate::core::logbins::{log_bins_for_segments, DEFAULT_BASE};
use crate::core::pairs::{PairsReader, ReadPair};
use crate::core::segment::Segments;
use crate::formats::{fragments, table};
use log::{info, warn};
use rayon::prelude::*;
use std::f64::consts::FRAC_1_SQRT_2;
use std::io::BufRead;
use std::path::Path;

/// Pairs lines read from the input per parallel batch
const BATCH_LINES: usize = 1 << 20;

/// Pairs lines classified by one worker task
const CHUNK_SIZE: usize = 16 * 1024;

/// Options of a distance law run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceLawOptions {
    /// Base of the logarithmic bins
    pub base: f64,
    /// Treat every chromosome as circular
    pub circular: bool,
    /// Worker threads used to classify pairs (1 = sequential)
    pub threads: usize,
}

impl Default for DistanceLawOptions {
    fn default() -> Self {
        Self {
            base: DEFAULT_BASE,
            circular: false,
            threads: 1,
        }
    }
}

impl DistanceLawOptions {
    pub fn validate(&self) -> Result<()> {
        if !self.base.is_finite() || self.base <= 1.0 {
            return Err(DistanceLawError::InvalidConfiguration(format!(
                "log bin base must be greater than 1, got {}",
                self.base
            )));
        }
        if self.threads == 0 {
            return Err(DistanceLawError::InvalidConfiguration(
                "thread count must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Distance law of one chromosome or arm
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceLawCurve {
    pub label: String,
    /// Bin start coordinates
    pub bins: Vec<u64>,
    /// Contact probability of each bin
    pub probabilities: Vec<f64>,
}

impl DistanceLawCurve {
    pub fn new(label: impl Into<String>, bins: Vec<u64>, probabilities: Vec<f64>) -> Self {
        Self {
            label: label.into(),
            bins,
            probabilities,
        }
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }
}

/// Raw counts of one pass over a pairs stream
#[derive(Debug, Clone)]
pub struct PairCounts {
    pub accumulator: ContactAccumulator,
    pub stats: ClassifyStats,
    pub header_lines: usize,
}

/// Approximate number of fragment pairs falling in each bin
///
/// In a contact matrix of size `length`, the band between two bin starts is
/// a trapezoid; the last band is a right isosceles triangle.
pub fn bin_areas(bins: &[u64], length: u64) -> Vec<f64> {
    let n = length as f64;
    let mut areas: Vec<f64> = bins
        .windows(2)
        .map(|w| {
            let (x0, x1) = (w[0] as f64, w[1] as f64);
            ((2.0 * n - x1 - x0) / 2.0) * (FRAC_1_SQRT_2 * (x1 - x0))
        })
        .collect();
    if let Some(&last) = bins.last() {
        let side = n - last as f64;
        areas.push(side * side / 2.0);
    }
    areas
}

/// Divide raw counts by the bin areas; an empty area yields 0
pub fn normalize_counts(counts: &[u64], bins: &[u64], length: u64) -> Vec<f64> {
    counts
        .iter()
        .zip(bin_areas(bins, length))
        .map(|(&count, area)| {
            if area > 0.0 {
                count as f64 / area
            } else {
                0.0
            }
        })
        .collect()
}

/// One distance law run over a fragment table
pub struct DistanceLawDriver {
    fragments: FragmentTable,
    segments: Segments,
    bins: Vec<Vec<u64>>,
    options: DistanceLawOptions,
}

impl DistanceLawDriver {
    /// Segment the table and build the log bins
    pub fn new(
        fragments: FragmentTable,
        centromeres: Option<&[u64]>,
        options: DistanceLawOptions,
    ) -> Result<Self> {
        options.validate()?;
        let segments = Segments::build(&fragments, centromeres, options.circular)?;
        let bins = log_bins_for_segments(segments.lengths(), options.base, options.circular);

        info!(
            "{} fragments split into {} segments",
            fragments.len(),
            segments.len()
        );

        Ok(Self {
            fragments,
            segments,
            bins,
            options,
        })
    }

    pub fn fragments(&self) -> &FragmentTable {
        &self.fragments
    }

    pub fn segments(&self) -> &Segments {
        &self.segments
    }

    pub fn bins(&self) -> &[Vec<u64>] {
        &self.bins
    }

    pub fn options(&self) -> &DistanceLawOptions {
        &self.options
    }

    pub fn classifier(&self) -> PairClassifier<'_> {
        PairClassifier::new(&self.fragments, &self.segments, &self.bins, self.options.circular)
    }

    /// Count the pairs of a stream into a fresh accumulator
    pub fn count_pairs<R: BufRead>(&self, reader: R) -> Result<PairCounts> {
        let counts = if self.options.threads > 1 {
            self.count_parallel(reader)?
        } else {
            self.count_sequential(reader)?
        };

        info!(
            "Skipped {} header lines, classified {} pairs ({} counted)",
            counts.header_lines, counts.stats.total, counts.stats.counted
        );
        Ok(counts)
    }

    fn count_sequential<R: BufRead>(&self, reader: R) -> Result<PairCounts> {
        let classifier = self.classifier();
        let mut pairs = PairsReader::new(reader);
        let mut accumulator = ContactAccumulator::zeroed(&self.bins);
        let mut stats = ClassifyStats::default();

        while let Some(record) = pairs.next_pair() {
            let (line, pair) = record?;
            stats.record(classifier.classify(&pair, line, &mut accumulator)?);
        }

        Ok(PairCounts {
            accumulator,
            stats,
            header_lines: pairs.header_lines(),
        })
    }

    /// Each worker counts into its own accumulator; results are merged per
    /// batch so memory stays bounded by `BATCH_LINES`.
    fn count_parallel<R: BufRead>(&self, reader: R) -> Result<PairCounts> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.options.threads)
            .build()
            .map_err(|e| {
                DistanceLawError::InvalidConfiguration(format!(
                    "failed to create thread pool: {}",
                    e
                ))
            })?;

        let classifier = self.classifier();
        let mut pairs = PairsReader::new(reader);
        let mut batch = Vec::with_capacity(CHUNK_SIZE);
        let mut accumulator = ContactAccumulator::zeroed(&self.bins);
        let mut stats = ClassifyStats::default();

        loop {
            batch.clear();
            if pairs.read_batch(&mut batch, BATCH_LINES)? == 0 {
                break;
            }

            let (batch_accumulator, batch_stats) = pool.install(|| {
                batch
                    .par_chunks(CHUNK_SIZE)
                    .map(|chunk| -> Result<(ContactAccumulator, ClassifyStats)> {
                        let mut acc = ContactAccumulator::zeroed(&self.bins);
                        let mut chunk_stats = ClassifyStats::default();
                        for (line, text) in chunk {
                            let pair = ReadPair::parse(text, *line)?;
                            chunk_stats.record(classifier.classify(&pair, *line, &mut acc)?);
                        }
                        Ok((acc, chunk_stats))
                    })
                    .try_reduce(
                        || (ContactAccumulator::zeroed(&self.bins), ClassifyStats::default()),
                        |(a, s), (b, t)| Ok((a.merge(&b), s.merge(&t))),
                    )
            })?;

            accumulator = accumulator.merge(&batch_accumulator);
            stats = stats.merge(&batch_stats);
        }

        Ok(PairCounts {
            accumulator,
            stats,
            header_lines: pairs.header_lines(),
        })
    }

    /// Turn raw counts into one probability curve per segment
    pub fn normalize(&self, accumulator: &ContactAccumulator) -> Vec<DistanceLawCurve> {
        self.segments
            .labels()
            .iter()
            .zip(self.segments.lengths())
            .zip(&self.bins)
            .enumerate()
            .map(|(i, ((label, &length), bins))| {
                let counts = accumulator.segment(i);
                if counts.iter().all(|&c| c == 0) {
                    warn!("No contacts counted for {}", label);
                }
                DistanceLawCurve::new(label.clone(), bins.clone(), normalize_counts(counts, bins, length))
            })
            .collect()
    }

    /// Count a pairs stream and normalize the result
    pub fn run<R: BufRead>(&self, reader: R) -> Result<(Vec<DistanceLawCurve>, PairCounts)> {
        let counts = self.count_pairs(reader)?;
        let curves = self.normalize(&counts.accumulator);
        Ok((curves, counts))
    }
}

/// Summary of a file-level run
#[derive(Debug, Clone, Copy)]
pub struct DistanceLawReport {
    pub segments: usize,
    pub header_lines: usize,
    pub stats: ClassifyStats,
}

/// Compute the distance law of a pairs file and write the table
///
/// The output file is only created once every curve has been computed, so
/// a failed run leaves no partial table behind.
pub fn compute_distance_law<P: AsRef<Path>>(
    pairs: P,
    fragment_list: P,
    centromeres: Option<P>,
    output: P,
    options: DistanceLawOptions,
) -> Result<DistanceLawReport> {
    options.validate()?;
    if options.circular && centromeres.is_some() {
        return Err(DistanceLawError::InvalidConfiguration(
            "chromosomes cannot have a centromere and be circular".into(),
        ));
    }

    let table = fragments::read_fragment_list(fragment_list.as_ref())?;
    let centromere_positions = match centromeres {
        Some(path) => Some(fragments::read_centromeres(path.as_ref())?),
        None => None,
    };

    let driver = DistanceLawDriver::new(table, centromere_positions.as_deref(), options)?;
    let reader = InputReader::open(pairs.as_ref())?;
    let (curves, counts) = driver.run(reader)?;

    table::export_distance_law(output.as_ref(), &curves, driver.segments().labels())?;

    Ok(DistanceLawReport {
        segments: driver.segments().len(),
        header_lines: counts.header_lines,
        stats: counts.stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> FragmentTable {
        FragmentTable::from_rows(vec![
            ("chr1", 0, 100),
            ("chr1", 100, 300),
            ("chr1", 300, 700),
            ("chr1", 700, 1000),
            ("chr2", 0, 500),
            ("chr2", 500, 1000),
        ])
    }

    fn options(base: f64) -> DistanceLawOptions {
        DistanceLawOptions {
            base,
            ..Default::default()
        }
    }

    const PAIRS: &[u8] = b"## pairs format v1.0
#columns: readID chr1 pos1 chr2 pos2 strand1 strand2 frag1 frag2
r1 chr1 10 chr1 350 - - 0 2
r2 chr1 50 chr1 150 + + 0 1
r3 chr1 50 chr1 150 + - 0 1
r4 chr1 50 chr2 150 + + 1 4
r5 chr2 10 chr2 600 + + 4 5
";

    #[test]
    fn test_bin_areas() {
        let areas = bin_areas(&[1, 2, 4], 10);
        let expected0 = ((20.0 - 2.0 - 1.0) / 2.0) * (FRAC_1_SQRT_2 * 1.0);
        let expected1 = ((20.0 - 4.0 - 2.0) / 2.0) * (FRAC_1_SQRT_2 * 2.0);
        assert!((areas[0] - expected0).abs() < 1e-12);
        assert!((areas[1] - expected1).abs() < 1e-12);
        assert!((areas[2] - 18.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_area_gives_zero_probability() {
        assert_eq!(normalize_counts(&[0], &[1], 1), vec![0.0]);
    }

    #[test]
    fn test_invalid_base() {
        let err = DistanceLawDriver::new(table(), None, options(1.0)).err().unwrap();
        assert!(matches!(err, DistanceLawError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_count_sequential() {
        let driver = DistanceLawDriver::new(table(), None, options(2.0)).unwrap();
        let counts = driver.count_pairs(PAIRS).unwrap();

        assert_eq!(counts.header_lines, 2);
        assert_eq!(counts.stats.total, 5);
        assert_eq!(counts.stats.counted, 3);
        assert_eq!(counts.stats.opposite_strands, 1);
        assert_eq!(counts.stats.inter_segment, 1);

        // r1: |0 - 300| = 300 -> 256, r2: |100 - 300| = 200 -> 128
        assert_eq!(counts.accumulator.segment(0)[8], 1);
        assert_eq!(counts.accumulator.segment(0)[7], 1);
        // r5: |500 - 1000| = 500 -> 256 on chr2
        assert_eq!(counts.accumulator.segment(1)[8], 1);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let sequential = DistanceLawDriver::new(table(), None, options(2.0)).unwrap();
        let parallel = DistanceLawDriver::new(
            table(),
            None,
            DistanceLawOptions {
                base: 2.0,
                threads: 3,
                ..Default::default()
            },
        )
        .unwrap();

        let a = sequential.count_pairs(PAIRS).unwrap();
        let b = parallel.count_pairs(PAIRS).unwrap();
        assert_eq!(a.accumulator, b.accumulator);
        assert_eq!(a.stats, b.stats);
        assert_eq!(a.header_lines, b.header_lines);
    }

    #[test]
    fn test_normalize_divides_by_area() {
        let driver = DistanceLawDriver::new(table(), None, options(2.0)).unwrap();
        let (curves, _) = driver.run(PAIRS).unwrap();

        assert_eq!(curves.len(), 2);
        assert_eq!(curves[0].label, "chr1");
        let areas = bin_areas(&curves[0].bins, 1000);
        assert!((curves[0].probabilities[8] - 1.0 / areas[8]).abs() < 1e-15);
        assert_eq!(curves[0].probabilities[0], 0.0);
    }

    #[test]
    fn test_malformed_line_aborts() {
        let driver = DistanceLawDriver::new(table(), None, options(2.0)).unwrap();
        let err = driver.count_pairs(&b"r1 chr1 10 chr1\n"[..]).unwrap_err();
        assert!(matches!(err, DistanceLawError::PairsParse(_)));
    }
}
