//! Logarithmic distance bins
//!
//! Bin starts grow geometrically so that each bin covers the same relative
//! range of genomic distance.

/// Default base of the geometric progression
pub const DEFAULT_BASE: f64 = 1.1;

/// Effective length used for binning: half the segment when circular
pub fn effective_length(length: u64, circular: bool) -> f64 {
    if circular {
        length as f64 / 2.0
    } else {
        length as f64
    }
}

/// Number of geometric points needed to reach `n` with `base`
///
/// Always at least 1, so that a segment of one base pair still has a bin.
pub fn bin_count(n: f64, base: f64) -> usize {
    let count = (n.ln() / base.ln()).floor() + 1.0;
    if count.is_finite() && count >= 1.0 {
        count as usize
    } else {
        1
    }
}

/// Build the bin starts of one segment
///
/// Points `base^0 .. base^(n_bins - 1)` are rounded to the nearest integer
/// and repeated values are collapsed, which keeps the result strictly
/// increasing and starting at 1.
pub fn log_bins(length: u64, base: f64, circular: bool) -> Vec<u64> {
    let n = effective_length(length, circular);
    let n_bins = bin_count(n, base);

    let mut bins: Vec<u64> = (0..n_bins)
        .map(|k| base.powf(k as f64).round() as u64)
        .collect();
    bins.dedup();
    bins
}

/// Bin starts of every segment
pub fn log_bins_for_segments(lengths: &[u64], base: f64, circular: bool) -> Vec<Vec<u64>> {
    lengths
        .iter()
        .map(|&length| log_bins(length, base, circular))
        .collect()
}

/// Index of the bin containing `distance`: the rightmost start not after it
///
/// Returns `None` when the distance lies before the first bin.
pub fn find_bin(bins: &[u64], distance: u64) -> Option<usize> {
    bins.partition_point(|&start| start <= distance).checked_sub(1)
}
