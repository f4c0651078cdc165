//! FastDistLaw - Hi-C distance law computation
//!
//! Computes the contact probability as a function of genomic distance,
//! P(s), from a pairs file and the restriction fragment list it was mapped
//! to, per chromosome or per chromosome arm.
//!
//! # Features
//!
//! - Logarithmic distance bins with a configurable base
//! - Chromosome arm splitting from centromere positions
//! - Circular chromosome support
//! - Streaming pairs parsing with optional parallel classification
//! - Transparent gzip/bzip2 input
//! - Curve normalization, averaging and smoothed slope
//!
//! # Example
//!
//! ```ignore
//! use fast_distlaw::{compute_distance_law, DistanceLawOptions};
//!
//! let report = compute_distance_law(
//!     "sample.pairs.gz",
//!     "fragments_list.txt",
//!     None,
//!     "distance_law.txt",
//!     DistanceLawOptions::default(),
//! )?;
//! println!("{} pairs counted", report.stats.counted);
//! ```

pub mod core;
pub mod formats;

// Re-export commonly used types
pub use core::{
    average_distance_law, circular_distance_law, compute_distance_law, normalize_distance_law,
    slope_distance_law, ContactAccumulator, DistanceLawCurve, DistanceLawDriver,
    DistanceLawError, DistanceLawOptions, FragmentTable, PairClassifier, ReadPair, Result,
    Segments, Strand,
};
pub use formats::{fragments, table};
