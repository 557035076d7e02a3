//! Core types for the event selection library
//!
//! This module defines the record read from a dataset and the error type
//! shared by every stage of the pipeline. Records are plain values: the
//! library never mutates or retains them after they have been analysed.

use particle_id::ParticleID;
use std::path::PathBuf;

/// Result type for analysis operations
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// One detector collision event with reconstructed lepton and missing-energy kinematics
///
/// Per-lepton columns are aligned by index. Momenta and energies are stored
/// in the detector units of the dataset (MeV); angles are in radians.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventRecord {
    /// Number of reconstructed leptons
    pub lepton_count: u32,
    /// Lepton transverse momenta (MeV)
    pub lepton_pt: Vec<f32>,
    /// Lepton pseudorapidities
    pub lepton_eta: Vec<f32>,
    /// Lepton azimuthal angles (rad)
    pub lepton_phi: Vec<f32>,
    /// Lepton electric charges (±1)
    pub lepton_charge: Vec<i32>,
    /// Lepton flavour as PDG id (sign carries no meaning here)
    pub lepton_type: Vec<i32>,
    /// Missing transverse energy (MeV)
    pub missing_et: f32,
    /// Azimuthal angle of the missing transverse energy (rad)
    pub missing_phi: f32,
}

/// A single lepton with momentum converted to GeV
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lepton {
    pub pt_gev: f64,
    pub eta: f64,
    pub phi: f64,
    pub charge: i32,
    /// Flavour without sign, e.g. 11 for both e- and e+
    pub flavor: ParticleID,
}

impl EventRecord {
    /// True if the record carries at least the two leptons the analysis needs
    pub fn has_lepton_pair(&self) -> bool {
        self.lepton_count >= 2
    }

    /// Missing transverse energy in GeV, given the dataset units per GeV
    pub fn missing_et_gev(&self, units_per_gev: f64) -> f64 {
        self.missing_et as f64 / units_per_gev
    }

    /// Lepton at `index`, or `None` if any of its columns is too short
    pub fn lepton(&self, index: usize, units_per_gev: f64) -> Option<Lepton> {
        let pt = *self.lepton_pt.get(index)?;
        let eta = *self.lepton_eta.get(index)?;
        let phi = *self.lepton_phi.get(index)?;
        let charge = *self.lepton_charge.get(index)?;
        let flavor = *self.lepton_type.get(index)?;

        Some(Lepton {
            pt_gev: pt as f64 / units_per_gev,
            eta: eta as f64,
            phi: phi as f64,
            charge,
            flavor: ParticleID::new(flavor.wrapping_abs()),
        })
    }

    /// The two leading leptons
    ///
    /// Returns `None` for records with fewer than two leptons or with
    /// per-lepton columns shorter than two entries.
    pub fn leading_pair(&self, units_per_gev: f64) -> Option<(Lepton, Lepton)> {
        if !self.has_lepton_pair() {
            return None;
        }
        Some((
            self.lepton(0, units_per_gev)?,
            self.lepton(1, units_per_gev)?,
        ))
    }
}

/// Errors that can occur while reading or analysing a dataset
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("Could not open dataset {path:?}: {reason}")]
    SourceOpen { path: PathBuf, reason: String },

    #[error("Tree '{tree}' not found in {path:?}")]
    TreeNotFound { tree: String, path: PathBuf },

    #[error("Branch '{branch}' not found in tree '{tree}'")]
    MissingBranch { branch: String, tree: String },

    #[error("Failed to read branch '{branch}': {reason}")]
    BranchRead { branch: String, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl AnalysisError {
    /// Short tag naming the failure kind, used in CLI diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::SourceOpen { .. } => "open",
            AnalysisError::TreeNotFound { .. } => "not-found",
            AnalysisError::MissingBranch { .. } => "missing-branch",
            AnalysisError::BranchRead { .. } => "branch-read",
            AnalysisError::InvalidConfig(_) => "config",
            AnalysisError::IoError(_) => "io",
        }
    }
}
