//! Analysis configuration types
//!
//! Every numeric constant of the analysis (energy units, default MET cut,
//! histogram binning, tree name) lives here with a documented default, so
//! callers and tests can vary them independently. The selection mode is
//! chosen once per invocation and is not part of the file configuration.

use crate::types::{AnalysisError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for the analysis library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Name of the record collection inside the dataset (default: "mini")
    #[serde(default = "default_tree_name")]
    pub tree_name: String,

    /// Dataset momentum/energy units per GeV (default: 1000, i.e. MeV)
    #[serde(default = "default_units_per_gev")]
    pub units_per_gev: f64,

    #[serde(default)]
    pub selection: SelectionConfig,

    #[serde(default)]
    pub histogram: HistogramConfig,
}

/// Thresholds used by the default cut policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Minimum missing transverse energy in GeV (default: 30)
    #[serde(default = "default_min_missing_et")]
    pub default_min_missing_et_gev: f64,
}

/// Binning of the transverse-mass distribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramConfig {
    /// Number of fixed-width bins (default: 50)
    #[serde(default = "default_bins")]
    pub bins: usize,
    /// Lower edge in GeV, inclusive (default: 0)
    #[serde(default)]
    pub low: f64,
    /// Upper edge in GeV, exclusive (default: 200)
    #[serde(default = "default_high")]
    pub high: f64,
}

fn default_tree_name() -> String {
    "mini".to_string()
}

fn default_units_per_gev() -> f64 {
    1000.0
}

fn default_min_missing_et() -> f64 {
    30.0
}

fn default_bins() -> usize {
    50
}

fn default_high() -> f64 {
    200.0
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            tree_name: default_tree_name(),
            units_per_gev: default_units_per_gev(),
            selection: SelectionConfig::default(),
            histogram: HistogramConfig::default(),
        }
    }
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            default_min_missing_et_gev: default_min_missing_et(),
        }
    }
}

impl Default for HistogramConfig {
    fn default() -> Self {
        Self {
            bins: default_bins(),
            low: 0.0,
            high: default_high(),
        }
    }
}

impl AnalysisConfig {
    /// Create a new analysis configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the record collection name
    pub fn with_tree_name(mut self, name: impl Into<String>) -> Self {
        self.tree_name = name.into();
        self
    }

    /// Builder method: set the dataset units per GeV
    pub fn with_units_per_gev(mut self, units: f64) -> Self {
        self.units_per_gev = units;
        self
    }

    /// Builder method: set the default-policy MET threshold in GeV
    pub fn with_default_min_missing_et(mut self, gev: f64) -> Self {
        self.selection.default_min_missing_et_gev = gev;
        self
    }

    /// Builder method: set the histogram binning
    pub fn with_binning(mut self, bins: usize, low: f64, high: f64) -> Self {
        self.histogram = HistogramConfig { bins, low, high };
        self
    }

    /// Reject configurations that cannot produce a meaningful histogram
    pub fn validate(&self) -> Result<()> {
        if self.tree_name.is_empty() {
            return Err(AnalysisError::InvalidConfig(
                "tree_name must not be empty".to_string(),
            ));
        }
        if !(self.units_per_gev.is_finite() && self.units_per_gev > 0.0) {
            return Err(AnalysisError::InvalidConfig(format!(
                "units_per_gev must be a positive number, got {}",
                self.units_per_gev
            )));
        }
        if !self.selection.default_min_missing_et_gev.is_finite() {
            return Err(AnalysisError::InvalidConfig(
                "default_min_missing_et_gev must be finite".to_string(),
            ));
        }
        self.histogram.validate()
    }
}

impl HistogramConfig {
    pub fn validate(&self) -> Result<()> {
        if self.bins == 0 {
            return Err(AnalysisError::InvalidConfig(
                "histogram needs at least one bin".to_string(),
            ));
        }
        if !(self.low.is_finite() && self.high.is_finite() && self.low < self.high) {
            return Err(AnalysisError::InvalidConfig(format!(
                "histogram range [{}, {}) is empty or not finite",
                self.low, self.high
            )));
        }
        Ok(())
    }
}

/// User-supplied thresholds replacing the default cut policy
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CutOverrides {
    /// Minimum number of leptons
    pub min_lepton_count: Option<u32>,
    /// Minimum missing transverse energy in GeV
    pub min_missing_et_gev: Option<f64>,
}

impl CutOverrides {
    /// True if at least one threshold was supplied
    pub fn is_empty(&self) -> bool {
        self.min_lepton_count.is_none() && self.min_missing_et_gev.is_none()
    }

    /// A NaN threshold would compare false against every record and let
    /// everything through, so only finite values are accepted
    pub fn validate(&self) -> Result<()> {
        match self.min_missing_et_gev {
            Some(met) if !met.is_finite() => Err(AnalysisError::InvalidConfig(format!(
                "minimum missing ET must be a finite number of GeV, got {}",
                met
            ))),
            _ => Ok(()),
        }
    }
}

/// Which cut policy a run applies
///
/// The overridden policy replaces the default one entirely: the
/// opposite-sign, same-flavour and default MET conditions are not combined
/// with user thresholds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum SelectionMode {
    /// Only require two leptons
    Disabled,
    #[default]
    /// Opposite-sign, same-flavour leptons and the configured MET threshold
    Default,
    /// Two leptons plus whichever user thresholds were supplied
    Overridden(CutOverrides),
}

impl SelectionMode {
    /// Pick the mode for one invocation from the command-line style inputs
    pub fn from_overrides(cuts_enabled: bool, overrides: CutOverrides) -> Self {
        if !cuts_enabled {
            SelectionMode::Disabled
        } else if overrides.is_empty() {
            SelectionMode::Default
        } else {
            SelectionMode::Overridden(overrides)
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            SelectionMode::Overridden(overrides) => overrides.validate(),
            _ => Ok(()),
        }
    }
}

impl std::fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectionMode::Disabled => write!(f, "cuts disabled"),
            SelectionMode::Default => write!(f, "default cuts"),
            SelectionMode::Overridden(o) => {
                write!(f, "user cuts (")?;
                match o.min_lepton_count {
                    Some(n) => write!(f, "lep_n >= {}", n)?,
                    None => write!(f, "lep_n any")?,
                }
                match o.min_missing_et_gev {
                    Some(met) => write!(f, ", met >= {} GeV)", met),
                    None => write!(f, ", met any)"),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnalysisConfig::new();
        assert_eq!(config.tree_name, "mini");
        assert_eq!(config.units_per_gev, 1000.0);
        assert_eq!(config.selection.default_min_missing_et_gev, 30.0);
        assert_eq!(config.histogram.bins, 50);
        assert_eq!(config.histogram.low, 0.0);
        assert_eq!(config.histogram.high, 200.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: AnalysisConfig = toml::from_str(
            r#"
            tree_name = "events"

            [histogram]
            bins = 20
            "#,
        )
        .unwrap();

        assert_eq!(config.tree_name, "events");
        assert_eq!(config.histogram.bins, 20);
        assert_eq!(config.histogram.high, 200.0);
        assert_eq!(config.selection.default_min_missing_et_gev, 30.0);
    }

    #[test]
    fn test_builder() {
        let config = AnalysisConfig::new()
            .with_tree_name("nominal")
            .with_default_min_missing_et(25.0)
            .with_binning(10, 0.0, 100.0);

        assert_eq!(config.tree_name, "nominal");
        assert_eq!(config.selection.default_min_missing_et_gev, 25.0);
        assert_eq!(config.histogram.bins, 10);
        assert_eq!(config.histogram.high, 100.0);
    }

    #[test]
    fn test_validate_rejects_bad_binning() {
        assert!(AnalysisConfig::new().with_binning(0, 0.0, 1.0).validate().is_err());
        assert!(AnalysisConfig::new().with_binning(10, 5.0, 5.0).validate().is_err());
        assert!(AnalysisConfig::new().with_units_per_gev(0.0).validate().is_err());
    }

    #[test]
    fn test_mode_selection() {
        let none = CutOverrides::default();
        let lep = CutOverrides {
            min_lepton_count: Some(3),
            min_missing_et_gev: None,
        };

        assert_eq!(SelectionMode::from_overrides(false, none), SelectionMode::Disabled);
        assert_eq!(SelectionMode::from_overrides(false, lep), SelectionMode::Disabled);
        assert_eq!(SelectionMode::from_overrides(true, none), SelectionMode::Default);
        assert_eq!(
            SelectionMode::from_overrides(true, lep),
            SelectionMode::Overridden(lep)
        );
    }

    #[test]
    fn test_non_finite_met_override_rejected() {
        for met in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let mode = SelectionMode::Overridden(CutOverrides {
                min_lepton_count: None,
                min_missing_et_gev: Some(met),
            });
            assert!(matches!(mode.validate(), Err(AnalysisError::InvalidConfig(_))));
        }

        let finite = SelectionMode::Overridden(CutOverrides {
            min_lepton_count: Some(2),
            min_missing_et_gev: Some(0.0),
        });
        assert!(finite.validate().is_ok());
        assert!(SelectionMode::Default.validate().is_ok());
    }

    #[test]
    fn test_mode_display() {
        let mode = SelectionMode::Overridden(CutOverrides {
            min_lepton_count: None,
            min_missing_et_gev: Some(40.0),
        });
        assert_eq!(mode.to_string(), "user cuts (lep_n any, met >= 40 GeV)");
        assert_eq!(SelectionMode::Disabled.to_string(), "cuts disabled");
    }
}
