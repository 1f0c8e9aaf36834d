//! Incremental unit engine.
//!
//! Providers register the kind of unit they produce and the trigger that
//! requests it. The engine keeps one unit per triggered type, records what
//! each computation read, and recomputes exactly the units downstream of a
//! change notice.
//!
//! A unit lives as long as its governing type carries the trigger. When the
//! trigger is removed, or the type disappears from the schema at its source
//! path, the unit and its dependency edges are released.

mod copy;
mod notice;
mod provider;
mod report;
mod unit;

pub use copy::*;
pub use notice::*;
pub use provider::*;
pub use report::*;
pub use unit::{GeneratedUnit, UnitOutput, UnitState};

use crate::{
    EngineError,
    identity::{MetadataId, ProducedKind, type_id},
    obs::{EngineEvent, EventSink, SkipReason, TracingSink},
    registry::{DependencyRegistry, TriggerRegistry},
};
use cloneforge_schema::build::SchemaSnapshot;
use std::{
    collections::BTreeSet,
    sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};
use unit::{StoreOutcome, UnitStore};

///
/// Engine
///
/// Owns the provider registry, the dependency registry and every generated
/// unit. All operations take `&self`; the engine can be shared across
/// threads, and at most one computation runs per unit identifier.
///

pub struct Engine {
    triggers: RwLock<TriggerRegistry>,
    dependencies: Mutex<DependencyRegistry>,
    units: Mutex<UnitStore>,
    in_flight: Mutex<BTreeSet<MetadataId>>,
    sink: Arc<dyn EventSink>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Engine reporting through `tracing`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_sink(Arc::new(TracingSink))
    }

    #[must_use]
    pub fn with_sink(sink: Arc<dyn EventSink>) -> Self {
        Self {
            triggers: RwLock::new(TriggerRegistry::new()),
            dependencies: Mutex::new(DependencyRegistry::new()),
            units: Mutex::new(UnitStore::default()),
            in_flight: Mutex::new(BTreeSet::new()),
            sink,
        }
    }

    /// Register a provider and map physical-type changes onto its kind.
    pub fn register_provider(&self, provider: Arc<dyn UnitProvider>) -> Result<(), EngineError> {
        let kind = provider.kind().clone();
        let trigger = provider.trigger().to_string();
        self.triggers_mut().register(provider)?;
        self.dependencies()
            .register_class_dependency(ProducedKind::PHYSICAL_TYPE, kind.clone());

        self.sink
            .record(&EngineEvent::ProviderRegistered { kind, trigger });
        Ok(())
    }

    /// Remove a provider together with every unit it produced.
    pub fn deregister_provider(&self, kind: &ProducedKind) -> Option<Arc<dyn UnitProvider>> {
        let provider = self.triggers_mut().deregister(kind)?;

        let removed = {
            let mut units = self.units();
            let ids = units.ids_of_kind(kind.as_str());
            for id in &ids {
                units.remove(id);
            }
            ids
        };
        {
            let mut dependencies = self.dependencies();
            dependencies.deregister_class_dependency(&ProducedKind::PHYSICAL_TYPE, kind);
            for id in &removed {
                dependencies.deregister_downstream(id);
            }
        }

        self.sink.record(&EngineEvent::ProviderDeregistered {
            kind: kind.clone(),
            units_removed: removed.len(),
        });
        Some(provider)
    }

    /// Whether copy generation can be offered: some provider is registered
    /// and the schema has at least one type.
    #[must_use]
    pub fn is_available(&self, snapshot: &SchemaSnapshot) -> bool {
        !self.triggers().is_empty() && !snapshot.is_empty()
    }

    /// Compute a unit for every triggered type in the snapshot and revisit
    /// every existing unit.
    pub fn scan(&self, snapshot: &SchemaSnapshot) -> ProcessReport {
        let mut ids = BTreeSet::new();
        {
            let triggers = self.triggers();
            for descriptor in snapshot.iter() {
                for provider in triggers.triggered_by(descriptor) {
                    match provider.scheme().create(descriptor.key()) {
                        Ok(id) => {
                            ids.insert(id);
                        }
                        Err(err) => tracing::warn!(
                            type_key = %descriptor.key(),
                            error = %err,
                            "type cannot be addressed, skipping"
                        ),
                    }
                }
            }
        }
        ids.extend(self.units().iter().map(|u| u.id().clone()));

        self.recompute_all(ids, snapshot)
    }

    /// Recompute every unit downstream of the notice's upstream identifier.
    pub fn process(&self, notice: &ChangeNotice) -> ProcessReport {
        let affected = self.dependencies().notify_changed(&notice.upstream);
        tracing::debug!(
            upstream = %notice.upstream,
            revision = notice.snapshot.revision(),
            affected = affected.len(),
            "processing change notice"
        );

        self.recompute_all(affected, &notice.snapshot)
    }

    #[must_use]
    pub fn unit(&self, id: &MetadataId) -> Option<GeneratedUnit> {
        self.units().get(id).cloned()
    }

    #[must_use]
    pub fn unit_state(&self, id: &MetadataId) -> UnitState {
        self.units().state(id)
    }

    /// Every live unit, ordered by identifier.
    #[must_use]
    pub fn units_snapshot(&self) -> Vec<GeneratedUnit> {
        self.units().iter().cloned().collect()
    }

    /// Metadata a unit read during its last successful computation.
    #[must_use]
    pub fn upstreams_of(&self, id: &MetadataId) -> BTreeSet<MetadataId> {
        self.dependencies().upstreams_of(id)
    }

    fn recompute_all(&self, ids: BTreeSet<MetadataId>, snapshot: &SchemaSnapshot) -> ProcessReport {
        let mut report = ProcessReport::default();

        for id in ids {
            let Some(provider) = self.triggers().provider(id.kind()) else {
                self.skip(&mut report, id, SkipReason::NoProvider);
                continue;
            };
            self.recompute(id, provider.as_ref(), snapshot, &mut report);
        }
        self.units().settle();

        report
    }

    fn recompute(
        &self,
        id: MetadataId,
        provider: &dyn UnitProvider,
        snapshot: &SchemaSnapshot,
        report: &mut ProcessReport,
    ) {
        let _guard = match InFlightGuard::enter(&self.in_flight, &id) {
            Ok(guard) => guard,
            Err(err) => {
                self.fail(report, id, err);
                return;
            }
        };

        let unit_revision = self.units().revision(&id);
        if let Some(unit_revision) = unit_revision
            && snapshot.revision() < unit_revision
        {
            let reason = SkipReason::OutdatedSnapshot {
                unit_revision,
                snapshot_revision: snapshot.revision(),
            };
            self.skip(report, id, reason);
            return;
        }
        self.units().mark_stale(&id);

        match self.compute_unit(&id, provider, snapshot) {
            Ok(Recompute::Stored { outcome, existing }) => {
                if let Some((method, exact)) = existing {
                    self.sink.record(&EngineEvent::ExistingMethodKept {
                        id: id.clone(),
                        method,
                        exact,
                    });
                }
                let event = match outcome {
                    StoreOutcome::Created => EngineEvent::UnitCreated { id: id.clone() },
                    StoreOutcome::Updated => EngineEvent::UnitUpdated { id: id.clone() },
                    StoreOutcome::Unchanged => EngineEvent::UnitUnchanged { id: id.clone() },
                };
                self.sink.record(&event);
                report.record(id, outcome);
            }
            Ok(Recompute::Removed) => {
                self.sink
                    .record(&EngineEvent::UnitRemoved { id: id.clone() });
                report.removed.push(id);
            }
            Ok(Recompute::Untriggered) => {}
            Err(err) => self.fail(report, id, err),
        }
    }

    fn compute_unit(
        &self,
        id: &MetadataId,
        provider: &dyn UnitProvider,
        snapshot: &SchemaSnapshot,
    ) -> Result<Recompute, EngineError> {
        let key = provider.scheme().parse(id)?;
        let descriptor = match snapshot.describe(&key) {
            Ok(descriptor) => descriptor,
            Err(err) if err.is_unresolved() => return Ok(self.release(id)),
            Err(err) => return Err(err.into()),
        };

        if !descriptor.has_annotation(provider.trigger()) {
            return Ok(self.release(id));
        }

        let computation = provider.compute(&descriptor, snapshot)?;
        let mut reads = computation.reads;
        reads.insert(type_id(&key)?);

        let existing = match &computation.output {
            Some(UnitOutput::Existing { method, exact }) => Some((method.to_string(), *exact)),
            _ => None,
        };
        let unit = GeneratedUnit::new(id.clone(), key, computation.output, snapshot.revision());
        let outcome = self.units().store(unit)?;
        self.dependencies().replace_upstreams(id, reads);

        Ok(Recompute::Stored { outcome, existing })
    }

    // drop a unit whose type lost its trigger or left the schema
    fn release(&self, id: &MetadataId) -> Recompute {
        let removed = self.units().remove(id).is_some();
        self.dependencies().deregister_downstream(id);

        if removed {
            Recompute::Removed
        } else {
            Recompute::Untriggered
        }
    }

    fn skip(&self, report: &mut ProcessReport, id: MetadataId, reason: SkipReason) {
        self.sink.record(&EngineEvent::UnitSkipped {
            id: id.clone(),
            reason: reason.clone(),
        });
        report.skipped.push((id, reason));
    }

    fn fail(&self, report: &mut ProcessReport, id: MetadataId, err: EngineError) {
        self.sink.record(&EngineEvent::UnitFailed {
            id: id.clone(),
            error: err.to_string(),
        });
        report.failed.push((id, err));
    }

    fn triggers(&self) -> RwLockReadGuard<'_, TriggerRegistry> {
        self.triggers.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn triggers_mut(&self) -> RwLockWriteGuard<'_, TriggerRegistry> {
        self.triggers.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn dependencies(&self) -> MutexGuard<'_, DependencyRegistry> {
        self.dependencies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn units(&self) -> MutexGuard<'_, UnitStore> {
        self.units.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

enum Recompute {
    Stored {
        outcome: StoreOutcome,
        existing: Option<(String, bool)>,
    },
    Removed,
    Untriggered,
}

///
/// InFlightGuard
///
/// Marks a unit as being computed until dropped.
///

struct InFlightGuard<'a> {
    set: &'a Mutex<BTreeSet<MetadataId>>,
    id: MetadataId,
}

impl<'a> InFlightGuard<'a> {
    fn enter(set: &'a Mutex<BTreeSet<MetadataId>>, id: &MetadataId) -> Result<Self, EngineError> {
        let inserted = set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.clone());
        if !inserted {
            return Err(EngineError::ComputationInFlight(id.clone()));
        }

        Ok(Self {
            set,
            id: id.clone(),
        })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}

#[cfg(test)]
mod tests;
