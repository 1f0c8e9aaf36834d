use crate::{EngineError, identity::MetadataId, obs::SkipReason};
use super::unit::StoreOutcome;

///
/// ProcessReport
///
/// What one scan or change notice did to each affected unit.
///

#[derive(Debug, Default)]
pub struct ProcessReport {
    pub created: Vec<MetadataId>,
    pub updated: Vec<MetadataId>,
    pub unchanged: Vec<MetadataId>,
    pub removed: Vec<MetadataId>,
    pub skipped: Vec<(MetadataId, SkipReason)>,
    pub failed: Vec<(MetadataId, EngineError)>,
}

impl ProcessReport {
    pub(crate) fn record(&mut self, id: MetadataId, outcome: StoreOutcome) {
        match outcome {
            StoreOutcome::Created => self.created.push(id),
            StoreOutcome::Updated => self.updated.push(id),
            StoreOutcome::Unchanged => self.unchanged.push(id),
        }
    }

    /// Units computed successfully, whether or not their output changed.
    pub fn recomputed(&self) -> impl Iterator<Item = &MetadataId> {
        self.created
            .iter()
            .chain(&self.updated)
            .chain(&self.unchanged)
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    /// Whether the unit was visited at all.
    #[must_use]
    pub fn touched(&self, id: &MetadataId) -> bool {
        self.recomputed().any(|r| r == id)
            || self.removed.contains(id)
            || self.skipped.iter().any(|(s, _)| s == id)
            || self.failed.iter().any(|(f, _)| f == id)
    }
}
