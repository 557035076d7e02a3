//! Fixed-width one-dimensional histogram

use crate::config::HistogramConfig;
use crate::types::Result;
use serde::Serialize;

/// Binned frequency count of a scalar quantity
///
/// Bins are half-open `[lo, hi)`. Values below `low` or at/above `high` are
/// tallied in `underflow`/`overflow` only and never appear in a bin.
/// NaN is ignored; infinities count as underflow/overflow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    /// Short identifier, e.g. "Signal"
    pub name: String,
    /// Plot title
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub low: f64,
    pub high: f64,
    counts: Vec<u64>,
    underflow: u64,
    overflow: u64,
}

impl Histogram {
    /// Create an empty histogram with the given binning
    pub fn new(
        name: impl Into<String>,
        title: impl Into<String>,
        config: &HistogramConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            name: name.into(),
            title: title.into(),
            x_label: "mT [GeV]".to_string(),
            y_label: "Events".to_string(),
            low: config.low,
            high: config.high,
            counts: vec![0; config.bins],
            underflow: 0,
            overflow: 0,
        })
    }

    pub fn bins(&self) -> usize {
        self.counts.len()
    }

    pub fn bin_width(&self) -> f64 {
        (self.high - self.low) / self.counts.len() as f64
    }

    /// Lower and upper edge of bin `index`
    pub fn bin_edges(&self, index: usize) -> (f64, f64) {
        let width = self.bin_width();
        let lo = self.low + index as f64 * width;
        (lo, lo + width)
    }

    /// Index of the bin containing `value`, if it is inside the range
    pub fn find_bin(&self, value: f64) -> Option<usize> {
        if !value.is_finite() || value < self.low || value >= self.high {
            return None;
        }
        let index = ((value - self.low) / self.bin_width()) as usize;
        // Rounding can push values just below `high` into a non-existent bin
        Some(index.min(self.counts.len() - 1))
    }

    /// Record one value
    pub fn fill(&mut self, value: f64) {
        if value.is_nan() {
            return;
        }
        match self.find_bin(value) {
            Some(index) => self.counts[index] += 1,
            None if value < self.low => self.underflow += 1,
            None => self.overflow += 1,
        }
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    pub fn count(&self, index: usize) -> u64 {
        self.counts.get(index).copied().unwrap_or(0)
    }

    /// Number of values inside the histogram range
    pub fn entries(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn underflow(&self) -> u64 {
        self.underflow
    }

    pub fn overflow(&self) -> u64 {
        self.overflow
    }

    /// Largest bin content
    pub fn max_count(&self) -> u64 {
        self.counts.iter().copied().max().unwrap_or(0)
    }
}
