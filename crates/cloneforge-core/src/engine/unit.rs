use crate::{
    EngineError,
    identity::MetadataId,
    synth::GeneratedMethod,
};
use cloneforge_schema::{node::MethodSignature, types::TypeKey};
use std::collections::BTreeMap;

///
/// UnitOutput
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum UnitOutput {
    Generated(GeneratedMethod),

    /// The user already wrote the method; it is kept as-is.
    Existing { method: MethodSignature, exact: bool },
}

///
/// GeneratedUnit
///
/// Output bound to one governing type. A unit without output means no field
/// of the type takes part in a copy.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GeneratedUnit {
    id: MetadataId,
    governor: TypeKey,
    output: Option<UnitOutput>,
    revision: u64,
}

impl GeneratedUnit {
    #[must_use]
    pub const fn new(
        id: MetadataId,
        governor: TypeKey,
        output: Option<UnitOutput>,
        revision: u64,
    ) -> Self {
        Self {
            id,
            governor,
            output,
            revision,
        }
    }

    #[must_use]
    pub const fn id(&self) -> &MetadataId {
        &self.id
    }

    #[must_use]
    pub const fn governor(&self) -> &TypeKey {
        &self.governor
    }

    #[must_use]
    pub const fn output(&self) -> Option<&UnitOutput> {
        self.output.as_ref()
    }

    /// Schema revision the unit was computed from.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    #[must_use]
    pub const fn method(&self) -> Option<&GeneratedMethod> {
        match &self.output {
            Some(UnitOutput::Generated(method)) => Some(method),
            _ => None,
        }
    }

    /// Rendered text of a generated method.
    #[must_use]
    pub fn content(&self) -> Option<String> {
        self.method().map(GeneratedMethod::render)
    }
}

///
/// UnitState
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum UnitState {
    Unregistered,
    Registered,

    /// An upstream changed and the unit was not recomputed successfully.
    Stale,

    /// Recomputed during the current pass; settles to `Registered`.
    Recomputed,
}

///
/// StoreOutcome
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum StoreOutcome {
    Created,
    Updated,
    Unchanged,
}

struct UnitEntry {
    unit: GeneratedUnit,
    state: UnitState,
}

///
/// UnitStore
///
/// Every live unit, keyed by identifier. An identifier stays bound to the
/// governing type it was first stored with.
///

#[derive(Default)]
pub(crate) struct UnitStore {
    entries: BTreeMap<MetadataId, UnitEntry>,
}

impl UnitStore {
    pub(crate) fn get(&self, id: &MetadataId) -> Option<&GeneratedUnit> {
        self.entries.get(id).map(|e| &e.unit)
    }

    pub(crate) fn state(&self, id: &MetadataId) -> UnitState {
        self.entries
            .get(id)
            .map_or(UnitState::Unregistered, |e| e.state)
    }

    pub(crate) fn revision(&self, id: &MetadataId) -> Option<u64> {
        self.get(id).map(GeneratedUnit::revision)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &GeneratedUnit> {
        self.entries.values().map(|e| &e.unit)
    }

    pub(crate) fn mark_stale(&mut self, id: &MetadataId) {
        if let Some(entry) = self.entries.get_mut(id) {
            entry.state = UnitState::Stale;
        }
    }

    pub(crate) fn store(&mut self, unit: GeneratedUnit) -> Result<StoreOutcome, EngineError> {
        let Some(entry) = self.entries.get_mut(unit.id()) else {
            self.entries.insert(
                unit.id().clone(),
                UnitEntry {
                    unit,
                    state: UnitState::Recomputed,
                },
            );
            return Ok(StoreOutcome::Created);
        };

        if entry.unit.governor != unit.governor {
            return Err(EngineError::DuplicateUnit {
                id: unit.id,
                existing: entry.unit.governor.clone(),
                requested: unit.governor,
            });
        }

        let outcome = if entry.unit.output == unit.output {
            StoreOutcome::Unchanged
        } else {
            StoreOutcome::Updated
        };
        entry.unit = unit;
        entry.state = UnitState::Recomputed;

        Ok(outcome)
    }

    pub(crate) fn remove(&mut self, id: &MetadataId) -> Option<GeneratedUnit> {
        self.entries.remove(id).map(|e| e.unit)
    }

    pub(crate) fn ids_of_kind(&self, kind: &str) -> Vec<MetadataId> {
        self.entries
            .keys()
            .filter(|id| id.kind() == kind)
            .cloned()
            .collect()
    }

    /// End a pass: recomputed units become registered, stale ones stay stale.
    pub(crate) fn settle(&mut self) {
        for entry in self.entries.values_mut() {
            if entry.state == UnitState::Recomputed {
                entry.state = UnitState::Registered;
            }
        }
    }
}
