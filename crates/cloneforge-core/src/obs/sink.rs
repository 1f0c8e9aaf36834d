use crate::identity::{MetadataId, ProducedKind};
use std::sync::{Mutex, PoisonError};

///
/// SkipReason
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SkipReason {
    /// The notice carried a snapshot older than the unit's last computation.
    OutdatedSnapshot { unit_revision: u64, snapshot_revision: u64 },

    /// No registered provider produces the unit's kind.
    NoProvider,
}

///
/// EngineEvent
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EngineEvent {
    ProviderRegistered {
        kind: ProducedKind,
        trigger: String,
    },
    ProviderDeregistered {
        kind: ProducedKind,
        units_removed: usize,
    },
    UnitCreated {
        id: MetadataId,
    },
    UnitUpdated {
        id: MetadataId,
    },
    UnitUnchanged {
        id: MetadataId,
    },
    UnitRemoved {
        id: MetadataId,
    },
    UnitSkipped {
        id: MetadataId,
        reason: SkipReason,
    },
    UnitFailed {
        id: MetadataId,
        error: String,
    },
    ExistingMethodKept {
        id: MetadataId,
        method: String,
        exact: bool,
    },
}

///
/// EventSink
///

pub trait EventSink: Send + Sync {
    fn record(&self, event: &EngineEvent);
}

///
/// TracingSink
///
/// Default sink; forwards events to `tracing`.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&self, event: &EngineEvent) {
        match event {
            EngineEvent::ProviderRegistered { kind, trigger } => {
                tracing::info!(%kind, %trigger, "provider registered");
            }
            EngineEvent::ProviderDeregistered {
                kind,
                units_removed,
            } => {
                tracing::info!(%kind, units_removed, "provider deregistered");
            }
            EngineEvent::UnitCreated { id } => tracing::debug!(unit = %id, "unit created"),
            EngineEvent::UnitUpdated { id } => tracing::debug!(unit = %id, "unit updated"),
            EngineEvent::UnitUnchanged { id } => tracing::trace!(unit = %id, "unit unchanged"),
            EngineEvent::UnitRemoved { id } => tracing::debug!(unit = %id, "unit removed"),
            EngineEvent::UnitSkipped { id, reason } => {
                tracing::debug!(unit = %id, ?reason, "unit skipped");
            }
            EngineEvent::UnitFailed { id, error } => {
                tracing::warn!(unit = %id, %error, "unit computation failed");
            }
            EngineEvent::ExistingMethodKept { id, method, exact } => {
                if *exact {
                    tracing::debug!(unit = %id, %method, "existing method kept");
                } else {
                    tracing::warn!(
                        unit = %id,
                        %method,
                        "existing method with parameters kept, no copy method generated"
                    );
                }
            }
        }
    }
}

///
/// RecordingSink
///
/// Keeps every event in memory; used by hosts and tests that inspect what
/// the engine did.
///

#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<EngineEvent>>,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> Vec<EngineEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl EventSink for RecordingSink {
    fn record(&self, event: &EngineEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_sink_keeps_events_in_order() {
        let sink = RecordingSink::new();
        let id = MetadataId::class(&ProducedKind::COPY);

        sink.record(&EngineEvent::UnitCreated { id: id.clone() });
        sink.record(&EngineEvent::UnitRemoved { id: id.clone() });

        assert_eq!(
            sink.events(),
            [
                EngineEvent::UnitCreated { id: id.clone() },
                EngineEvent::UnitRemoved { id },
            ]
        );

        sink.clear();
        assert!(sink.events().is_empty());
    }
}
