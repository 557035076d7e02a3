//! Four-vector arithmetic and the transverse mass of the dilepton + MET system
//!
//! All functions here are pure: the same record and configuration always
//! produce bit-identical results.

use crate::config::AnalysisConfig;
use crate::types::{EventRecord, Lepton};
use std::ops::Add;

/// Relativistic four-momentum `(E, px, py, pz)` in GeV
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FourMomentum {
    pub e: f64,
    pub px: f64,
    pub py: f64,
    pub pz: f64,
}

impl FourMomentum {
    pub fn new(e: f64, px: f64, py: f64, pz: f64) -> Self {
        Self { e, px, py, pz }
    }

    /// Build from transverse momentum, pseudorapidity, azimuth and mass
    pub fn from_pt_eta_phi_m(pt: f64, eta: f64, phi: f64, m: f64) -> Self {
        let pt = pt.abs();
        let px = pt * phi.cos();
        let py = pt * phi.sin();
        let pz = pt * eta.sinh();
        let e = (px * px + py * py + pz * pz + m * m).sqrt();
        Self { e, px, py, pz }
    }

    /// Massless four-momentum of a lepton
    pub fn from_lepton(lepton: &Lepton) -> Self {
        Self::from_pt_eta_phi_m(lepton.pt_gev, lepton.eta, lepton.phi, 0.0)
    }

    /// Magnitude of the transverse momentum
    pub fn pt(&self) -> f64 {
        self.px.hypot(self.py)
    }

    pub fn mass_squared(&self) -> f64 {
        self.e * self.e - self.px * self.px - self.py * self.py - self.pz * self.pz
    }

    /// Invariant mass, negative for space-like momenta
    pub fn mass(&self) -> f64 {
        let m2 = self.mass_squared();
        if m2 < 0.0 {
            -(-m2).sqrt()
        } else {
            m2.sqrt()
        }
    }
}

impl Add for FourMomentum {
    type Output = FourMomentum;

    fn add(self, rhs: FourMomentum) -> FourMomentum {
        FourMomentum {
            e: self.e + rhs.e,
            px: self.px + rhs.px,
            py: self.py + rhs.py,
            pz: self.pz + rhs.pz,
        }
    }
}

/// Squared transverse mass of the two leading leptons and the missing energy
///
/// Returns `None` if the record does not carry two leading leptons. The
/// value may be zero or negative; see [`transverse_mass_from_squared`].
pub fn transverse_mass_squared(record: &EventRecord, config: &AnalysisConfig) -> Option<f64> {
    let units = config.units_per_gev;
    let (l1, l2) = record.leading_pair(units)?;

    let met = record.missing_et_gev(units);
    let met_phi = record.missing_phi as f64;
    let met_x = met * met_phi.cos();
    let met_y = met * met_phi.sin();

    let dilepton = FourMomentum::from_lepton(&l1) + FourMomentum::from_lepton(&l2);
    let pt_ll = dilepton.pt();
    let m_ll = dilepton.mass();
    let et_ll = (pt_ll * pt_ll + m_ll * m_ll).sqrt();

    let sum_x = dilepton.px + met_x;
    let sum_y = dilepton.py + met_y;
    Some((et_ll + met).powi(2) - sum_x * sum_x - sum_y * sum_y)
}

/// Transverse mass from its square; non-positive squares yield no value
pub fn transverse_mass_from_squared(mt2: f64) -> Option<f64> {
    if mt2 > 0.0 {
        Some(mt2.sqrt())
    } else {
        None
    }
}

/// Transverse mass in GeV, or `None` for records without a lepton pair or
/// with a non-physical (`mt² <= 0`) result
pub fn transverse_mass(record: &EventRecord, config: &AnalysisConfig) -> Option<f64> {
    transverse_mass_squared(record, config).and_then(transverse_mass_from_squared)
}
