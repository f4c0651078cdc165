//! Restriction fragment table
//!
//! One row per restriction fragment, in genome order. Chromosome
//! boundaries are recognized by fragments starting at position 0.

use crate::core::error::{DistanceLawError, Result};

/// A single restriction fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fragment {
    /// Index into [`FragmentTable::chrom_names`]
    pub chrom_id: u32,
    /// Start position (0-based, inclusive)
    pub start: u64,
    /// End position (exclusive)
    pub end: u64,
}

/// Ordered fragment table shared read-only by every stage of a run
#[derive(Debug, Clone, Default)]
pub struct FragmentTable {
    chrom_names: Vec<String>,
    fragments: Vec<Fragment>,
}

impl FragmentTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(chrom, start, end)` rows
    pub fn from_rows<S, I>(rows: I) -> Self
    where
        S: AsRef<str>,
        I: IntoIterator<Item = (S, u64, u64)>,
    {
        let mut table = Self::new();
        for (chrom, start, end) in rows {
            table.push(chrom.as_ref(), start, end);
        }
        table
    }

    /// Append a fragment
    ///
    /// Consecutive fragments with the same chromosome name share a name entry.
    pub fn push(&mut self, chrom: &str, start: u64, end: u64) {
        let chrom_id = match self.chrom_names.last() {
            Some(last) if last == chrom => (self.chrom_names.len() - 1) as u32,
            _ => {
                self.chrom_names.push(chrom.to_string());
                (self.chrom_names.len() - 1) as u32
            }
        };
        self.fragments.push(Fragment { chrom_id, start, end });
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Fragment> {
        self.fragments.get(index)
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// Chromosome names in order of first appearance
    pub fn chrom_names(&self) -> &[String] {
        &self.chrom_names
    }

    /// Chromosome name of a fragment
    pub fn chrom_of(&self, index: usize) -> Option<&str> {
        self.fragments
            .get(index)
            .map(|f| self.chrom_names[f.chrom_id as usize].as_str())
    }

    /// Indices of fragments starting at position 0 (chromosome starts)
    pub fn chrom_starts(&self) -> Vec<usize> {
        self.fragments
            .iter()
            .enumerate()
            .filter(|(_, f)| f.start == 0)
            .map(|(i, _)| i)
            .collect()
    }

    /// Check the invariants the segment indexer relies on
    pub fn validate(&self) -> Result<()> {
        let first = self
            .fragments
            .first()
            .ok_or_else(|| DistanceLawError::InvalidFragments("fragment table is empty".into()))?;
        if first.start != 0 {
            return Err(DistanceLawError::InvalidFragments(format!(
                "first fragment starts at {} instead of 0",
                first.start
            )));
        }

        // Chromosome boundaries are only recognized at start 0
        for (i, pair) in self.fragments.windows(2).enumerate() {
            let (prev, next) = (&pair[0], &pair[1]);
            if next.chrom_id != prev.chrom_id && next.start != 0 {
                return Err(DistanceLawError::InvalidFragments(format!(
                    "first fragment of {} (index {}) starts at {} instead of 0",
                    self.chrom_names[next.chrom_id as usize],
                    i + 1,
                    next.start
                )));
            }
        }
        Ok(())
    }
}
