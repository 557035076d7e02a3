//! In-memory record source

use super::{RecordIter, RecordSource};
use crate::types::{EventRecord, Result};

/// A dataset held entirely in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    name: String,
    records: Vec<EventRecord>,
}

impl MemorySource {
    pub fn new(name: impl Into<String>, records: Vec<EventRecord>) -> Self {
        Self {
            name: name.into(),
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<EventRecord> for MemorySource {
    fn from_iter<I: IntoIterator<Item = EventRecord>>(iter: I) -> Self {
        Self::new("memory", iter.into_iter().collect())
    }
}

impl RecordSource for MemorySource {
    fn describe(&self) -> String {
        format!("{} ({} records in memory)", self.name, self.records.len())
    }

    fn records(&self) -> Result<RecordIter<'_>> {
        Ok(Box::new(self.records.iter().cloned().map(Ok)))
    }
}
