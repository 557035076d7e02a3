//! Distribution building and signal/background comparison
//!
//! The [`Analyzer`] is the entry point for all analysis operations. It owns
//! the configuration and the selection filter for one invocation and turns
//! record streams into [`Distribution`]s:
//!
//! 1. Apply the selection filter → count the verdict
//! 2. Compute the transverse mass of surviving records
//! 3. Fill positive results into the histogram, count the rest as dropped

use crate::config::{AnalysisConfig, SelectionMode};
use crate::histogram::Histogram;
use crate::kinematics::transverse_mass;
use crate::selection::{SelectionFilter, Verdict};
use crate::source::RecordSource;
use crate::types::{EventRecord, Result};
use serde::Serialize;
use std::collections::BTreeMap;

/// Legend label of the signal distribution
pub const SIGNAL_LABEL: &str = "Signal";
/// Legend label of the background distribution
pub const BACKGROUND_LABEL: &str = "Background";

/// Per-sample bookkeeping of how records were consumed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Cutflow {
    /// Records read from the source
    pub records: u64,
    /// Records accepted by the selection
    pub selected: u64,
    /// Rejected records, keyed by the condition that failed
    pub rejected: BTreeMap<Verdict, u64>,
    /// Selected records whose transverse mass was accumulated
    pub accumulated: u64,
    /// Selected records dropped because `mt² <= 0`
    pub non_physical: u64,
}

impl Cutflow {
    fn record_verdict(&mut self, verdict: Verdict) {
        self.records += 1;
        if verdict.passed() {
            self.selected += 1;
        } else {
            *self.rejected.entry(verdict).or_insert(0) += 1;
        }
    }

    /// Total number of rejected records
    pub fn rejected_total(&self) -> u64 {
        self.rejected.values().sum()
    }
}

/// A filled histogram together with the cutflow that produced it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distribution {
    pub histogram: Histogram,
    pub cutflow: Cutflow,
}

impl Distribution {
    /// Label shown in legends
    pub fn label(&self) -> &str {
        &self.histogram.name
    }
}

/// Signal and background distributions built with the same selection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub signal: Distribution,
    pub background: Distribution,
}

impl Comparison {
    /// Fixed legend mapping, signal first
    pub fn legend(&self) -> [(&Distribution, &'static str); 2] {
        [
            (&self.signal, SIGNAL_LABEL),
            (&self.background, BACKGROUND_LABEL),
        ]
    }
}

/// Analysis driver for one invocation
pub struct Analyzer {
    config: AnalysisConfig,
    filter: SelectionFilter,
}

impl Analyzer {
    /// Create an analyzer; fails if the configuration or a cut threshold is invalid
    pub fn new(config: AnalysisConfig, mode: SelectionMode) -> Result<Self> {
        config.validate()?;
        mode.validate()?;
        let filter = SelectionFilter::new(mode, &config.selection, config.units_per_gev);
        Ok(Self { config, filter })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn mode(&self) -> SelectionMode {
        self.filter.mode()
    }

    /// Selection and computation for a single record
    ///
    /// Returns the verdict and, for selected records, the transverse mass
    /// (`None` if non-physical).
    pub fn evaluate(&self, record: &EventRecord) -> (Verdict, Option<f64>) {
        let verdict = self.filter.verdict(record);
        if !verdict.passed() {
            return (verdict, None);
        }
        (verdict, transverse_mass(record, &self.config))
    }

    /// Build one distribution from a single pass over `records`
    ///
    /// The first read error aborts the pass and is returned.
    pub fn fill<I>(&self, name: &str, title: &str, records: I) -> Result<Distribution>
    where
        I: IntoIterator<Item = Result<EventRecord>>,
    {
        let mut histogram = Histogram::new(name, title, &self.config.histogram)?;
        let mut cutflow = Cutflow::default();

        for record in records {
            let record = record?;
            let (verdict, mt) = self.evaluate(&record);
            cutflow.record_verdict(verdict);

            if !verdict.passed() {
                log::trace!("Record {} rejected: {}", cutflow.records, verdict);
                continue;
            }

            match mt {
                Some(value) => {
                    histogram.fill(value);
                    cutflow.accumulated += 1;
                }
                None => {
                    log::trace!("Record {} dropped: non-physical mT", cutflow.records);
                    cutflow.non_physical += 1;
                }
            }
        }

        log::info!(
            "{}: {} records, {} selected, {} filled ({})",
            name,
            cutflow.records,
            cutflow.selected,
            cutflow.accumulated,
            self.mode()
        );
        for (verdict, count) in &cutflow.rejected {
            log::debug!("{}: rejected {} ({})", name, count, verdict);
        }
        if histogram.underflow() + histogram.overflow() > 0 {
            log::debug!(
                "{}: {} values outside [{}, {})",
                name,
                histogram.underflow() + histogram.overflow(),
                histogram.low,
                histogram.high
            );
        }

        Ok(Distribution { histogram, cutflow })
    }

    /// Build one distribution from a record source
    pub fn fill_source(
        &self,
        name: &str,
        title: &str,
        source: &dyn RecordSource,
    ) -> Result<Distribution> {
        log::info!("Analysing {} as '{}'", source.describe(), name);
        self.fill(name, title, source.records()?)
    }

    /// Build signal and background distributions independently
    pub fn compare(
        &self,
        signal: &dyn RecordSource,
        background: &dyn RecordSource,
    ) -> Result<Comparison> {
        let signal = self.fill_source(SIGNAL_LABEL, &title_for(SIGNAL_LABEL), signal)?;
        let background =
            self.fill_source(BACKGROUND_LABEL, &title_for(BACKGROUND_LABEL), background)?;
        Ok(Comparison { signal, background })
    }
}

/// Plot title for a sample label
pub fn title_for(label: &str) -> String {
    format!("Transverse Mass ({})", label)
}
