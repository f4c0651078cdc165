//! Error types for FastDistLaw
//!
//! Defines all error types used throughout the library.

use thiserror::Error;

/// Main error type for distance law computation
#[derive(Debug, Error)]
pub enum DistanceLawError {
    /// Options that cannot be combined or are out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Number of chromosomes and number of centromeres differ
    #[error("Number of chromosomes ({expected}) and number of centromeres ({found}) differ")]
    LengthMismatch { expected: usize, found: usize },

    /// Number of segments and number of labels differ
    #[error("Number of segments ({segments}) and number of labels ({labels}) differ")]
    SizeMismatch { segments: usize, labels: usize },

    /// Fragment table violates its layout invariants
    #[error("Invalid fragment table: {0}")]
    InvalidFragments(String),

    /// A pair references a fragment that is not in the table
    #[error("Fragment index {index} at line {line} is out of range (table has {len} fragments)")]
    FragmentOutOfRange { line: usize, index: usize, len: usize },

    /// Curves that cannot be aggregated
    #[error("Invalid curve: {0}")]
    InvalidCurve(String),

    /// Fragment list parsing errors
    #[error("Fragment list error: {0}")]
    FragmentParse(#[from] FragmentParseError),

    /// Pairs file parsing errors
    #[error("Pairs error: {0}")]
    PairsParse(#[from] PairsParseError),

    /// Distance law table parsing errors
    #[error("Distance law table error: {0}")]
    TableParse(#[from] TableParseError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while reading a fragment list or centromere file
#[derive(Debug, Error)]
pub enum FragmentParseError {
    #[error("Too few fields at line {line}: expected at least {expected}, found {found}")]
    TooFewFields {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("Invalid number in field {field} at line {line}: '{value}'")]
    InvalidNumber {
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("Fragment at line {line} ends before it starts ({start} > {end})")]
    InvalidCoordinates { line: usize, start: u64, end: u64 },

    #[error("Centromere file is empty")]
    EmptyCentromeres,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while parsing a pairs file
#[derive(Debug, Error)]
pub enum PairsParseError {
    #[error("Too few fields at line {line}: expected {expected}, found {found}")]
    TooFewFields {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("Invalid number in field {field} at line {line}: '{value}'")]
    InvalidNumber {
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("Strand must be '+' or '-', got '{strand}' at line {line}")]
    InvalidStrand { line: usize, strand: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while reading a distance law table
#[derive(Debug, Error)]
pub enum TableParseError {
    #[error("Too few fields at line {line}: expected 3, found {found}")]
    TooFewFields { line: usize, found: usize },

    #[error("Invalid number in field {field} at line {line}: '{value}'")]
    InvalidNumber {
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for distance law operations
pub type Result<T> = std::result::Result<T, DistanceLawError>;

/// Result type alias for fragment list parsing
pub type FragmentResult<T> = std::result::Result<T, FragmentParseError>;

/// Result type alias for pairs parsing
pub type PairsResult<T> = std::result::Result<T, PairsParseError>;

/// Result type alias for table parsing
pub type TableResult<T> = std::result::Result<T, TableParseError>;
