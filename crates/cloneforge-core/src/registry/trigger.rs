use crate::{
    EngineError,
    engine::UnitProvider,
    identity::ProducedKind,
};
use cloneforge_schema::node::TypeDescriptor;
use std::{collections::BTreeMap, sync::Arc};

///
/// TriggerRegistry
///
/// Providers keyed by the kind they produce. Each trigger annotation belongs
/// to at most one provider.
///

#[derive(Default)]
pub struct TriggerRegistry {
    providers: BTreeMap<ProducedKind, Arc<dyn UnitProvider>>,
}

impl TriggerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, provider: Arc<dyn UnitProvider>) -> Result<(), EngineError> {
        let kind = provider.kind().clone();
        let claimed = self
            .providers
            .values()
            .any(|p| p.trigger().matches(provider.trigger()));
        if claimed || self.providers.contains_key(&kind) {
            return Err(EngineError::ProviderAlreadyRegistered(kind));
        }

        self.providers.insert(kind, provider);
        Ok(())
    }

    pub fn deregister(&mut self, kind: &ProducedKind) -> Option<Arc<dyn UnitProvider>> {
        self.providers.remove(kind)
    }

    #[must_use]
    pub fn provider(&self, kind: &str) -> Option<Arc<dyn UnitProvider>> {
        self.providers.get(kind).cloned()
    }

    /// Providers whose trigger the descriptor carries.
    #[must_use]
    pub fn triggered_by(&self, descriptor: &TypeDescriptor) -> Vec<Arc<dyn UnitProvider>> {
        self.providers
            .values()
            .filter(|p| descriptor.has_annotation(p.trigger()))
            .cloned()
            .collect()
    }

    pub fn kinds(&self) -> impl Iterator<Item = &ProducedKind> {
        self.providers.keys()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
