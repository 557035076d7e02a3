//! Event Selection Library
//!
//! A small, stateless library for dilepton + missing-energy analyses of
//! detector event records: it reads records from ROOT ntuples, applies
//! kinematic selection cuts, computes the transverse mass of the dilepton
//! and MET system and accumulates it into histograms.
//!
//! # Architecture
//!
//! - Record sources own the dataset and emit a single-pass stream of records
//! - The selection filter applies one of three explicit cut policies
//! - The kinematic computer turns a selected record into a transverse mass
//! - The analyzer drives the pass and builds per-sample distributions
//!
//! The library does NOT:
//! - Render plots or write images
//! - Parse command-line arguments or configuration files
//! - Cache or persist derived results
//!
//! Rendering and the command surface live in the application layer
//! (eventselect-cli).
//!
//! # Example Usage
//!
//! ```no_run
//! use eventselect_core::{AnalysisConfig, Analyzer, RootDataset, SelectionMode};
//! use std::path::Path;
//!
//! let config = AnalysisConfig::new();
//! let analyzer = Analyzer::new(config.clone(), SelectionMode::Default).unwrap();
//!
//! let signal = RootDataset::open(Path::new("signal.root"), &config.tree_name).unwrap();
//! let background = RootDataset::open(Path::new("background.root"), &config.tree_name).unwrap();
//!
//! let comparison = analyzer.compare(&signal, &background).unwrap();
//! for (distribution, label) in comparison.legend() {
//!     println!("{}: {} entries", label, distribution.histogram.entries());
//! }
//! ```

// Public modules
pub mod analysis;
pub mod config;
pub mod histogram;
pub mod kinematics;
pub mod selection;
pub mod source;
pub mod types;

// Re-export main types for convenience
pub use analysis::{
    title_for, Analyzer, Comparison, Cutflow, Distribution, BACKGROUND_LABEL, SIGNAL_LABEL,
};
pub use config::{AnalysisConfig, CutOverrides, HistogramConfig, SelectionConfig, SelectionMode};
pub use histogram::Histogram;
pub use kinematics::{transverse_mass, FourMomentum};
pub use selection::{SelectionFilter, Verdict};
pub use source::{MemorySource, RecordSource, RootDataset};
pub use types::{AnalysisError, EventRecord, Lepton, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_basics() {
        // Smoke test: an analyzer over an empty source yields empty histograms
        let analyzer = Analyzer::new(AnalysisConfig::new(), SelectionMode::Default).unwrap();
        let empty = MemorySource::default();
        let cmp = analyzer.compare(&empty, &empty).unwrap();
        assert_eq!(cmp.signal.histogram.entries(), 0);
        assert_eq!(cmp.background.cutflow.records, 0);
    }
}
