//! Record sources
//!
//! A record source owns whatever backs a dataset (an open ROOT file, an
//! in-memory vector) and hands out a single-pass iterator over its event
//! records. The iterator borrows the source, so the underlying resource
//! stays alive for exactly as long as records are being read and is
//! released when the source is dropped.

use crate::types::{EventRecord, Result};

pub mod memory;
pub mod root;

pub use memory::MemorySource;
pub use root::RootDataset;

/// Branch names of the lepton + MET ntuple layout
pub mod branches {
    pub const LEPTON_COUNT: &str = "lep_n";
    pub const LEPTON_PT: &str = "lep_pt";
    pub const LEPTON_ETA: &str = "lep_eta";
    pub const LEPTON_PHI: &str = "lep_phi";
    pub const LEPTON_CHARGE: &str = "lep_charge";
    pub const LEPTON_TYPE: &str = "lep_type";
    pub const MISSING_ET: &str = "met_et";
    pub const MISSING_PHI: &str = "met_phi";

    pub const ALL: [&str; 8] = [
        LEPTON_COUNT,
        LEPTON_PT,
        LEPTON_ETA,
        LEPTON_PHI,
        LEPTON_CHARGE,
        LEPTON_TYPE,
        MISSING_ET,
        MISSING_PHI,
    ];
}

/// Iterator over the records of one source
pub type RecordIter<'a> = Box<dyn Iterator<Item = Result<EventRecord>> + 'a>;

/// Common trait for everything that can feed records to the analysis
pub trait RecordSource {
    /// Human-readable description used in log messages
    fn describe(&self) -> String;

    /// Start a fresh pass over the records
    fn records(&self) -> Result<RecordIter<'_>>;
}
