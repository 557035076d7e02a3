//! Event selection
//!
//! Decides whether a record enters the distribution under one of three
//! mutually exclusive cut policies (see [`SelectionMode`]).

use crate::config::{CutOverrides, SelectionConfig, SelectionMode};
use crate::types::EventRecord;
use serde::Serialize;
use std::fmt;

/// Outcome of applying the selection to one record
///
/// Rejections name the first condition that failed, in the order the
/// conditions are checked. The pass/reject result does not depend on that
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Verdict {
    Pass,
    TooFewLeptons,
    LeptonCountBelowMinimum,
    SameCharge,
    DifferentFlavor,
    MissingEtBelowMinimum,
}

impl Verdict {
    pub fn passed(&self) -> bool {
        matches!(self, Verdict::Pass)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Verdict::Pass => "pass",
            Verdict::TooFewLeptons => "fewer than two leptons",
            Verdict::LeptonCountBelowMinimum => "lepton count below minimum",
            Verdict::SameCharge => "same-sign leptons",
            Verdict::DifferentFlavor => "different-flavour leptons",
            Verdict::MissingEtBelowMinimum => "MET below minimum",
        };
        write!(f, "{}", text)
    }
}

/// Selection filter bound to one mode and its thresholds
#[derive(Debug, Clone)]
pub struct SelectionFilter {
    mode: SelectionMode,
    default_min_missing_et_gev: f64,
    units_per_gev: f64,
}

impl SelectionFilter {
    /// Create a filter; `units_per_gev` converts the record's MET to GeV
    pub fn new(mode: SelectionMode, config: &SelectionConfig, units_per_gev: f64) -> Self {
        Self {
            mode,
            default_min_missing_et_gev: config.default_min_missing_et_gev,
            units_per_gev,
        }
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// True if the record passes the selection
    pub fn passes(&self, record: &EventRecord) -> bool {
        self.verdict(record).passed()
    }

    /// Apply the selection and report which condition, if any, failed
    pub fn verdict(&self, record: &EventRecord) -> Verdict {
        if !record.has_lepton_pair() {
            return Verdict::TooFewLeptons;
        }

        match self.mode {
            SelectionMode::Disabled => Verdict::Pass,
            SelectionMode::Overridden(overrides) => self.overridden_verdict(record, &overrides),
            SelectionMode::Default => self.default_verdict(record),
        }
    }

    fn overridden_verdict(&self, record: &EventRecord, overrides: &CutOverrides) -> Verdict {
        if let Some(min) = overrides.min_lepton_count {
            if record.lepton_count < min {
                return Verdict::LeptonCountBelowMinimum;
            }
        }
        if let Some(min) = overrides.min_missing_et_gev {
            if record.missing_et_gev(self.units_per_gev) < min {
                return Verdict::MissingEtBelowMinimum;
            }
        }
        Verdict::Pass
    }

    fn default_verdict(&self, record: &EventRecord) -> Verdict {
        // Columns shorter than the declared count cannot form a pair
        let (Some(q1), Some(q2)) = (record.lepton_charge.first(), record.lepton_charge.get(1))
        else {
            return Verdict::TooFewLeptons;
        };
        let (Some(t1), Some(t2)) = (record.lepton_type.first(), record.lepton_type.get(1)) else {
            return Verdict::TooFewLeptons;
        };

        if (*q1 as i64) * (*q2 as i64) >= 0 {
            return Verdict::SameCharge;
        }
        if (*t1 as i64).abs() != (*t2 as i64).abs() {
            return Verdict::DifferentFlavor;
        }
        if record.missing_et_gev(self.units_per_gev) < self.default_min_missing_et_gev {
            return Verdict::MissingEtBelowMinimum;
        }
        Verdict::Pass
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(charge: [i32; 2], flavor: [i32; 2], met_mev: f32) -> EventRecord {
        EventRecord {
            lepton_count: 2,
            lepton_pt: vec![40000.0, 30000.0],
            lepton_eta: vec![0.1, -0.2],
            lepton_phi: vec![0.0, 1.0],
            lepton_charge: charge.to_vec(),
            lepton_type: flavor.to_vec(),
            missing_et: met_mev,
            missing_phi: 0.5,
        }
    }

    fn filter(mode: SelectionMode) -> SelectionFilter {
        SelectionFilter::new(mode, &SelectionConfig::default(), 1000.0)
    }

    fn all_modes() -> Vec<SelectionMode> {
        vec![
            SelectionMode::Disabled,
            SelectionMode::Default,
            SelectionMode::Overridden(CutOverrides {
                min_lepton_count: Some(1),
                min_missing_et_gev: Some(0.0),
            }),
        ]
    }

    #[test]
    fn test_fewer_than_two_leptons_rejected_in_every_mode() {
        for count in [0, 1] {
            let mut r = record([1, -1], [11, -11], 50000.0);
            r.lepton_count = count;
            for mode in all_modes() {
                assert_eq!(filter(mode).verdict(&r), Verdict::TooFewLeptons, "{:?}", mode);
            }
        }
    }

    #[test]
    fn test_disabled_ignores_charge_flavor_and_met() {
        let f = filter(SelectionMode::Disabled);
        assert!(f.passes(&record([1, 1], [11, 13], 0.0)));
        assert!(f.passes(&record([-1, -1], [13, 11], 5000.0)));
        assert!(f.passes(&record([1, -1], [11, -11], 100000.0)));
    }

    #[test]
    fn test_default_rejects_same_sign_regardless_of_met() {
        let f = filter(SelectionMode::Default);
        for met in [0.0, 30000.0, 1.0e6] {
            assert_eq!(f.verdict(&record([1, 1], [11, -11], met)), Verdict::SameCharge);
            assert_eq!(f.verdict(&record([-1, -1], [11, -11], met)), Verdict::SameCharge);
        }
    }

    #[test]
    fn test_default_rejects_different_flavor() {
        let f = filter(SelectionMode::Default);
        assert_eq!(f.verdict(&record([1, -1], [11, -13], 50000.0)), Verdict::DifferentFlavor);
    }

    #[test]
    fn test_default_met_boundary_is_inclusive() {
        let f = filter(SelectionMode::Default);
        assert!(f.passes(&record([1, -1], [13, -13], 30000.0)));
        assert_eq!(
            f.verdict(&record([1, -1], [13, -13], 29999.0)),
            Verdict::MissingEtBelowMinimum
        );
    }

    #[test]
    fn test_default_threshold_comes_from_config() {
        let config = SelectionConfig {
            default_min_missing_et_gev: 50.0,
        };
        let f = SelectionFilter::new(SelectionMode::Default, &config, 1000.0);
        assert!(!f.passes(&record([1, -1], [11, -11], 35000.0)));
        assert!(f.passes(&record([1, -1], [11, -11], 50000.0)));
    }

    #[test]
    fn test_override_min_lepton_count() {
        let f = filter(SelectionMode::Overridden(CutOverrides {
            min_lepton_count: Some(3),
            min_missing_et_gev: None,
        }));
        assert_eq!(
            f.verdict(&record([1, -1], [11, -11], 50000.0)),
            Verdict::LeptonCountBelowMinimum
        );

        let mut three = record([1, -1], [11, -11], 50000.0);
        three.lepton_count = 3;
        assert!(f.passes(&three));
    }

    #[test]
    fn test_override_met() {
        let f = filter(SelectionMode::Overridden(CutOverrides {
            min_lepton_count: None,
            min_missing_et_gev: Some(20.0),
        }));
        assert!(f.passes(&record([1, -1], [11, -11], 20000.0)));
        assert_eq!(
            f.verdict(&record([1, -1], [11, -11], 19000.0)),
            Verdict::MissingEtBelowMinimum
        );
    }

    #[test]
    fn test_overrides_replace_default_policy() {
        // Same-sign, different-flavour, 10 GeV MET fails every default
        // condition but passes user cuts, which replace the default policy
        // rather than adding to it.
        let r = record([1, 1], [11, 13], 10000.0);
        let f = filter(SelectionMode::Overridden(CutOverrides {
            min_lepton_count: Some(2),
            min_missing_et_gev: Some(5.0),
        }));
        assert!(f.passes(&r));
        assert!(!filter(SelectionMode::Default).passes(&r));
    }

    #[test]
    fn test_short_columns_fail_default_policy() {
        let mut r = record([1, -1], [11, -11], 50000.0);
        r.lepton_charge.truncate(1);
        assert_eq!(filter(SelectionMode::Default).verdict(&r), Verdict::TooFewLeptons);
    }

    #[test]
    fn test_verdict_display() {
        assert_eq!(Verdict::SameCharge.to_string(), "same-sign leptons");
        assert!(Verdict::Pass.passed());
        assert!(!Verdict::DifferentFlavor.passed());
    }
}
