use crate::identity::{MetadataId, ProducedKind, type_name_id};
use std::collections::{BTreeMap, BTreeSet};

///
/// DependencyRegistry
///
/// Records which units read which metadata. Instance edges are kept in both
/// directions so a unit's reads can be replaced without scanning every edge.
/// Class edges map a whole upstream kind to a downstream kind: a change to
/// any instance of the upstream kind notifies the downstream instance that
/// addresses the same type and source path.
///

#[derive(Debug, Default)]
pub struct DependencyRegistry {
    downstreams: BTreeMap<MetadataId, BTreeSet<MetadataId>>,
    upstreams: BTreeMap<MetadataId, BTreeSet<MetadataId>>,
    classes: BTreeMap<ProducedKind, BTreeSet<ProducedKind>>,
}

impl DependencyRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `downstream` reads `upstream`. Returns false when the edge
    /// already existed.
    pub fn register_dependency(&mut self, upstream: MetadataId, downstream: MetadataId) -> bool {
        self.upstreams
            .entry(downstream.clone())
            .or_default()
            .insert(upstream.clone());

        self.downstreams
            .entry(upstream)
            .or_default()
            .insert(downstream)
    }

    pub fn deregister_dependency(
        &mut self,
        upstream: &MetadataId,
        downstream: &MetadataId,
    ) -> bool {
        remove_edge(&mut self.upstreams, downstream, upstream);

        remove_edge(&mut self.downstreams, upstream, downstream)
    }

    pub fn register_class_dependency(&mut self, upstream: ProducedKind, downstream: ProducedKind) {
        self.classes.entry(upstream).or_default().insert(downstream);
    }

    pub fn deregister_class_dependency(
        &mut self,
        upstream: &ProducedKind,
        downstream: &ProducedKind,
    ) {
        if let Some(kinds) = self.classes.get_mut(upstream) {
            kinds.remove(downstream);
            if kinds.is_empty() {
                self.classes.remove(upstream);
            }
        }
    }

    /// Replace everything `downstream` reads with `upstreams`.
    pub fn replace_upstreams(&mut self, downstream: &MetadataId, upstreams: BTreeSet<MetadataId>) {
        self.deregister_downstream(downstream);

        for upstream in upstreams {
            self.register_dependency(upstream, downstream.clone());
        }
    }

    /// Drop every edge that ends at `downstream`.
    pub fn deregister_downstream(&mut self, downstream: &MetadataId) {
        let Some(upstreams) = self.upstreams.remove(downstream) else {
            return;
        };

        for upstream in upstreams {
            remove_edge(&mut self.downstreams, &upstream, downstream);
        }
    }

    #[must_use]
    pub fn upstreams_of(&self, downstream: &MetadataId) -> BTreeSet<MetadataId> {
        self.upstreams.get(downstream).cloned().unwrap_or_default()
    }

    #[must_use]
    pub fn downstreams_of(&self, upstream: &MetadataId) -> BTreeSet<MetadataId> {
        self.downstreams.get(upstream).cloned().unwrap_or_default()
    }

    /// Every downstream identifier affected by a change to `upstream`:
    /// the direct instance edges, the readers of a changed type's name, and
    /// the class-mapped instances.
    #[must_use]
    pub fn notify_changed(&self, upstream: &MetadataId) -> BTreeSet<MetadataId> {
        let mut affected = self.downstreams_of(upstream);

        if upstream.kind() == ProducedKind::PHYSICAL_TYPE.as_str()
            && let Some(key) = upstream.type_key()
            && let Ok(name) = type_name_id(&key.name)
        {
            affected.extend(self.downstreams_of(&name));
        }

        if let Some(kinds) = self.classes.get(upstream.kind()) {
            affected.extend(kinds.iter().filter_map(|kind| upstream.with_kind(kind)));
        }

        affected
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.downstreams.values().map(BTreeSet::len).sum()
    }
}

fn remove_edge(
    map: &mut BTreeMap<MetadataId, BTreeSet<MetadataId>>,
    from: &MetadataId,
    to: &MetadataId,
) -> bool {
    let Some(targets) = map.get_mut(from) else {
        return false;
    };
    let removed = targets.remove(to);
    if targets.is_empty() {
        map.remove(from);
    }

    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{IdScheme, field_id, type_id};
    use cloneforge_schema::types::{TypeKey, TypeName};

    fn person() -> TypeKey {
        TypeKey::new("com.example.Person", "src/main/java")
    }

    fn copy_id(key: &TypeKey) -> MetadataId {
        IdScheme::new(ProducedKind::COPY)
            .create(key)
            .expect("identifier should be created")
    }

    #[test]
    fn replace_upstreams_drops_stale_edges() {
        let mut registry = DependencyRegistry::new();
        let unit = copy_id(&person());
        let age = field_id(&person(), "age").expect("identifier");
        let name = field_id(&person(), "name").expect("identifier");

        registry.replace_upstreams(&unit, [age.clone()].into_iter().collect());
        registry.replace_upstreams(&unit, [name.clone()].into_iter().collect());

        assert!(registry.notify_changed(&age).is_empty(), "old read must be gone");
        assert!(registry.notify_changed(&name).contains(&unit));
        assert_eq!(registry.edge_count(), 1);
    }

    #[test]
    fn class_edges_map_to_the_same_instance() {
        let mut registry = DependencyRegistry::new();
        registry.register_class_dependency(ProducedKind::PHYSICAL_TYPE, ProducedKind::COPY);

        let type_changed = type_id(&person()).expect("identifier");
        let affected = registry.notify_changed(&type_changed);
        assert_eq!(affected, [copy_id(&person())].into_iter().collect());

        let field_changed = field_id(&person(), "age").expect("identifier");
        assert!(
            registry.notify_changed(&field_changed).is_empty(),
            "class edges only cover the mapped kind"
        );

        registry.deregister_class_dependency(&ProducedKind::PHYSICAL_TYPE, &ProducedKind::COPY);
        assert!(registry.notify_changed(&type_changed).is_empty());
    }

    #[test]
    fn type_changes_reach_readers_of_the_name() {
        let mut registry = DependencyRegistry::new();
        let unit = copy_id(&person());
        let name = type_name_id(&TypeName::new("Customer")).expect("identifier");
        registry.register_dependency(name, unit.clone());

        let customer = TypeKey::new("com.example.Customer", "src/main/java");
        let affected = registry.notify_changed(&type_id(&customer).expect("identifier"));
        assert!(affected.contains(&unit), "a new Customer type must notify its readers");

        let other = TypeKey::new("com.example.Supplier", "src/main/java");
        assert!(registry.notify_changed(&type_id(&other).expect("identifier")).is_empty());

        let field = field_id(&customer, "name").expect("identifier");
        assert!(registry.notify_changed(&field).is_empty(), "member changes keep their own edges");
    }

    #[test]
    fn deregistering_a_downstream_removes_both_directions() {
        let mut registry = DependencyRegistry::new();
        let unit = copy_id(&person());
        let upstream = type_id(&person()).expect("identifier");

        assert!(registry.register_dependency(upstream.clone(), unit.clone()));
        assert!(!registry.register_dependency(upstream.clone(), unit.clone()));
        registry.deregister_downstream(&unit);

        assert!(registry.upstreams_of(&unit).is_empty());
        assert!(registry.downstreams_of(&upstream).is_empty());
        assert!(!registry.deregister_dependency(&upstream, &unit));
    }
}
