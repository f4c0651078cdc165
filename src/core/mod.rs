//! Core distance law functionality
//!
//! This module contains the fragment segmentation, log binning, pair
//! classification and curve post-processing algorithms.

mod classify;
pub mod curves;
mod driver;
mod error;
mod fragment;
pub mod io;
mod logbins;
mod pairs;
mod segment;

pub use classify::{
    circular_distance_law, Classification, ClassifyStats, ContactAccumulator, PairClassifier,
};
pub use curves::{
    average_distance_law, gaussian_filter1d, normalize_distance_law, slope_distance_law,
    SlopeCurve, DEFAULT_SLOPE_SIGMA, NORMALIZATION_MIN_DISTANCE,
};
pub use driver::{
    bin_areas, compute_distance_law, normalize_counts, DistanceLawCurve, DistanceLawDriver,
    DistanceLawOptions, DistanceLawReport, PairCounts,
};
pub use error::{
    DistanceLawError, FragmentParseError, FragmentResult, PairsParseError, PairsResult, Result,
    TableParseError, TableResult,
};
pub use fragment::{Fragment, FragmentTable};
pub use io::{Compression, InputReader, Mapping};
pub use logbins::{bin_count, find_bin, log_bins, log_bins_for_segments, DEFAULT_BASE};
pub use pairs::{PairsReader, ReadPair, Strand};
pub use segment::{segment_labels, segment_lengths, segment_starts, Segments};
