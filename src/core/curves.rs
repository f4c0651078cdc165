//! Post-processing of distance law curves
//!
//! Normalization to unit mass, averaging of curves of unequal length and
//! the smoothed log-log slope.

use crate::core::driver::DistanceLawCurve;
use crate::core::error::{DistanceLawError, Result};
use log::warn;

/// Bins starting at or below this distance (bp) are left out of the
/// normalization window
pub const NORMALIZATION_MIN_DISTANCE: u64 = 1000;

/// Value substituted for zero probabilities before taking logarithms
pub const ZERO_PROBABILITY_FLOOR: f64 = 1e-9;

/// Default standard deviation (in bins) of the slope smoothing kernel
pub const DEFAULT_SLOPE_SIGMA: f64 = 2.0;

/// Kernel radius in standard deviations
pub const GAUSSIAN_TRUNCATE: f64 = 4.0;

/// Slope of one curve, one value per bin except the last
#[derive(Debug, Clone, PartialEq)]
pub struct SlopeCurve {
    pub label: String,
    pub bins: Vec<u64>,
    pub slopes: Vec<f64>,
}

fn check_shapes(curves: &[DistanceLawCurve]) -> Result<()> {
    if curves.is_empty() {
        return Err(DistanceLawError::InvalidCurve("no curves given".into()));
    }
    for curve in curves {
        if curve.bins.len() != curve.probabilities.len() {
            return Err(DistanceLawError::InvalidCurve(format!(
                "{} has {} bins but {} values",
                curve.label,
                curve.bins.len(),
                curve.probabilities.len()
            )));
        }
    }
    Ok(())
}

/// Normalize every curve so that its values over the common window sum to 1
///
/// The window covers bins starting after 1 kb and indices below the length
/// of the shortest curve. A curve with nothing in the window is returned
/// unchanged with a warning.
pub fn normalize_distance_law(curves: &[DistanceLawCurve]) -> Result<Vec<DistanceLawCurve>> {
    check_shapes(curves)?;
    let min_len = curves.iter().map(|c| c.len()).min().unwrap_or(0);

    Ok(curves
        .iter()
        .map(|curve| {
            let mut sum: f64 = curve
                .bins
                .iter()
                .zip(&curve.probabilities)
                .take(min_len)
                .filter(|(&x, _)| x > NORMALIZATION_MIN_DISTANCE)
                .map(|(_, &p)| p)
                .sum();

            if sum == 0.0 {
                let upper = min_len
                    .checked_sub(1)
                    .and_then(|i| curve.bins.get(i))
                    .copied()
                    .unwrap_or(0);
                warn!(
                    "No values of p(s) in the interval {} and {} base pairs, {} hasn't been normalized",
                    NORMALIZATION_MIN_DISTANCE, upper, curve.label
                );
                sum = 1.0;
            }

            DistanceLawCurve::new(
                curve.label.clone(),
                curve.bins.clone(),
                curve.probabilities.iter().map(|p| p / sum).collect(),
            )
        })
        .collect())
}

/// Average curves of possibly different lengths
///
/// The bins of the longest curve are the reference axis. Each index is
/// averaged over the curves that reach it.
pub fn average_distance_law(
    curves: &[DistanceLawCurve],
    label: impl Into<String>,
) -> Result<DistanceLawCurve> {
    check_shapes(curves)?;

    let reference = curves
        .iter()
        .fold(&curves[0], |longest, c| if c.len() > longest.len() { c } else { longest });
    let max_len = reference.len();

    let mut values = vec![0.0; max_len];
    let mut occurrences = vec![0usize; max_len];
    for curve in curves {
        for (i, &p) in curve.probabilities.iter().enumerate() {
            values[i] += p;
            occurrences[i] += 1;
        }
    }

    let averaged = values
        .iter()
        .zip(&occurrences)
        .map(|(&v, &n)| v / n as f64)
        .collect();

    Ok(DistanceLawCurve::new(label, reference.bins.clone(), averaged))
}

/// Gaussian kernel of standard deviation `sigma`, truncated at 4 sigma
pub fn gaussian_kernel(sigma: f64) -> Vec<f64> {
    let radius = (GAUSSIAN_TRUNCATE * sigma + 0.5) as i64;
    let weights: Vec<f64> = (-radius..=radius)
        .map(|x| (-0.5 * (x as f64 / sigma).powi(2)).exp())
        .collect();
    let total: f64 = weights.iter().sum();
    weights.into_iter().map(|w| w / total).collect()
}

/// Index into a signal of length `len` with half-sample symmetric
/// reflection at both edges (`d c b a | a b c d | d c b a`)
fn reflect_index(index: i64, len: usize) -> usize {
    let len = len as i64;
    let period = 2 * len;
    let i = index.rem_euclid(period);
    if i < len {
        i as usize
    } else {
        (period - 1 - i) as usize
    }
}

/// One-dimensional Gaussian smoothing with reflected edges
///
/// A non-positive `sigma` returns the input unchanged.
pub fn gaussian_filter1d(input: &[f64], sigma: f64) -> Vec<f64> {
    if input.is_empty() || sigma <= 0.0 {
        return input.to_vec();
    }
    let kernel = gaussian_kernel(sigma);
    let radius = (kernel.len() / 2) as i64;

    (0..input.len() as i64)
        .map(|i| {
            kernel
                .iter()
                .enumerate()
                .map(|(k, w)| w * input[reflect_index(i + k as i64 - radius, input.len())])
                .sum()
        })
        .collect()
}

/// Smoothed log-log slope of a curve
///
/// `slope[i] = ln(p[i+1] / p[i]) / ln(x[i+1] / x[i])`, with zero values
/// floored at 1e-9, smoothed with a Gaussian of standard deviation `sigma`.
/// The result has one value less than the curve.
pub fn slope_distance_law(curve: &DistanceLawCurve, sigma: f64) -> Result<SlopeCurve> {
    check_shapes(std::slice::from_ref(curve))?;
    if !sigma.is_finite() || sigma < 0.0 {
        return Err(DistanceLawError::InvalidConfiguration(format!(
            "smoothing sigma must be a non-negative number, got {}",
            sigma
        )));
    }

    let floored: Vec<f64> = curve
        .probabilities
        .iter()
        .map(|&p| if p == 0.0 { ZERO_PROBABILITY_FLOOR } else { p })
        .collect();

    let raw: Vec<f64> = floored
        .windows(2)
        .zip(curve.bins.windows(2))
        .map(|(p, x)| (p[1] / p[0]).ln() / (x[1] as f64 / x[0] as f64).ln())
        .collect();

    Ok(SlopeCurve {
        label: curve.label.clone(),
        bins: curve.bins[..raw.len()].to_vec(),
        slopes: gaussian_filter1d(&raw, sigma),
    })
}
