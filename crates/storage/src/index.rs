//! Secondary indices for relation resolution and bulk operations
//!
//! These indices are maintained by the storage alongside the entity map so
//! that lookups never scan every entity:
//! - ReferenceIndex: (target, field) → children, for relation resolution
//!   and cascading delete
//! - SourceIndex: EntitySource → entities, for provenance-based removal
//! - SymbolicIndex: (kind, symbolic id) → entity, for name resolution
//!
//! All indices are `Clone` so the storage can share them between snapshots
//! behind an `Arc` and copy them on first write.

use rustc_hash::FxHashMap;
use std::collections::BTreeSet;
use wsmodel_core::{EntityId, EntityKind, EntitySource};

/// Secondary index: target entity → reference field → referring entities
///
/// Children are kept in a BTreeSet so resolution order is stable
/// (ascending id, i.e. creation order).
#[derive(Debug, Clone, Default)]
pub struct ReferenceIndex {
    index: FxHashMap<EntityId, FxHashMap<&'static str, BTreeSet<EntityId>>>,
}

impl ReferenceIndex {
    /// Create a new empty ReferenceIndex
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `child` refers to `target` through `field`
    pub fn insert(&mut self, target: EntityId, field: &'static str, child: EntityId) {
        self.index
            .entry(target)
            .or_default()
            .entry(field)
            .or_default()
            .insert(child);
    }

    /// Forget that `child` refers to `target` through `field`
    ///
    /// Empty sets and empty targets are removed entirely
    /// to avoid accumulating empty entries.
    pub fn remove(&mut self, target: EntityId, field: &'static str, child: EntityId) {
        if let Some(fields) = self.index.get_mut(&target) {
            if let Some(children) = fields.get_mut(field) {
                children.remove(&child);
                if children.is_empty() {
                    fields.remove(field);
                }
            }
            if fields.is_empty() {
                self.index.remove(&target);
            }
        }
    }

    /// Entities referring to `target` through `field`, ascending
    pub fn children(&self, target: EntityId, field: &str) -> Vec<EntityId> {
        self.index
            .get(&target)
            .and_then(|fields| fields.get(field))
            .map(|children| children.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Entities referring to `target` through any field
    pub fn all_children(&self, target: EntityId) -> BTreeSet<EntityId> {
        self.index
            .get(&target)
            .map(|fields| fields.values().flatten().copied().collect())
            .unwrap_or_default()
    }

    /// Check if the index is empty
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Get the number of referenced targets
    pub fn len(&self) -> usize {
        self.index.len()
    }
}

/// Secondary index: EntitySource → entities
#[derive(Debug, Clone, Default)]
pub struct SourceIndex {
    index: FxHashMap<EntitySource, BTreeSet<EntityId>>,
}

impl SourceIndex {
    /// Create a new empty SourceIndex
    pub fn new() -> Self {
        Self::default()
    }

    /// Add entity to the source's set
    pub fn insert(&mut self, source: EntitySource, id: EntityId) {
        self.index.entry(source).or_default().insert(id);
    }

    /// Remove entity from the source's set
    ///
    /// If the set becomes empty, removes the source entry entirely.
    pub fn remove(&mut self, source: &EntitySource, id: EntityId) {
        if let Some(ids) = self.index.get_mut(source) {
            ids.remove(&id);
            if ids.is_empty() {
                self.index.remove(source);
            }
        }
    }

    /// Get all entities with a source
    pub fn get(&self, source: &EntitySource) -> Option<&BTreeSet<EntityId>> {
        self.index.get(source)
    }

    /// All sources that have at least one entity
    pub fn sources(&self) -> Vec<EntitySource> {
        let mut sources: Vec<EntitySource> = self.index.keys().cloned().collect();
        sources.sort();
        sources
    }

    /// Check if the index is empty
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Get the number of sources in the index
    pub fn len(&self) -> usize {
        self.index.len()
    }
}

/// Secondary index: (kind, symbolic id) → entity
#[derive(Debug, Clone, Default)]
pub struct SymbolicIndex {
    index: FxHashMap<(EntityKind, String), EntityId>,
}

impl SymbolicIndex {
    /// Create a new empty SymbolicIndex
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a symbolic id to an entity, returning the previous holder
    pub fn insert(&mut self, kind: EntityKind, key: String, id: EntityId) -> Option<EntityId> {
        self.index.insert((kind, key), id)
    }

    /// Unbind a symbolic id if it is still held by `id`
    pub fn remove(&mut self, kind: EntityKind, key: &str, id: EntityId) {
        let entry = (kind, key.to_string());
        if self.index.get(&entry) == Some(&id) {
            self.index.remove(&entry);
        }
    }

    /// Entity holding a symbolic id
    pub fn get(&self, kind: EntityKind, key: &str) -> Option<EntityId> {
        self.index.get(&(kind, key.to_string())).copied()
    }

    /// Check if the index is empty
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Get the number of bound symbolic ids
    pub fn len(&self) -> usize {
        self.index.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: u64) -> EntityId {
        EntityId::new(raw)
    }

    #[test]
    fn test_reference_index_insert_and_children() {
        let mut index = ReferenceIndex::new();
        index.insert(id(1), "module", id(3));
        index.insert(id(1), "module", id(2));
        index.insert(id(1), "owner", id(4));

        assert_eq!(index.children(id(1), "module"), vec![id(2), id(3)]);
        assert_eq!(index.children(id(1), "owner"), vec![id(4)]);
        assert!(index.children(id(9), "module").is_empty());
        assert_eq!(index.all_children(id(1)).len(), 3);
    }

    #[test]
    fn test_reference_index_remove_cleans_empty_sets() {
        let mut index = ReferenceIndex::new();
        index.insert(id(1), "module", id(2));
        assert_eq!(index.len(), 1);
        index.remove(id(1), "module", id(2));
        assert!(index.is_empty());
        // Removing something absent is a no-op
        index.remove(id(1), "module", id(2));
        assert!(index.is_empty());
    }

    #[test]
    fn test_reference_index_clone_is_independent() {
        let mut index = ReferenceIndex::new();
        index.insert(id(1), "module", id(2));
        let frozen = index.clone();
        index.insert(id(1), "module", id(3));
        assert_eq!(frozen.children(id(1), "module"), vec![id(2)]);
        assert_eq!(index.children(id(1), "module").len(), 2);
    }

    #[test]
    fn test_source_index() {
        let gradle = EntitySource::new("gradle");
        let maven = EntitySource::new("maven");
        let mut index = SourceIndex::new();
        index.insert(gradle.clone(), id(1));
        index.insert(gradle.clone(), id(2));
        index.insert(maven.clone(), id(3));

        assert_eq!(index.get(&gradle).unwrap().len(), 2);
        assert_eq!(index.sources(), vec![gradle.clone(), maven.clone()]);

        index.remove(&maven, id(3));
        assert!(index.get(&maven).is_none());
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_symbolic_index_remove_only_if_holder() {
        const MODULE: EntityKind = EntityKind::new("ModuleEntity");
        let mut index = SymbolicIndex::new();
        assert_eq!(index.insert(MODULE, "app".to_string(), id(1)), None);
        assert_eq!(index.get(MODULE, "app"), Some(id(1)));

        // A stale holder does not unbind the current one
        index.remove(MODULE, "app", id(7));
        assert_eq!(index.get(MODULE, "app"), Some(id(1)));

        index.remove(MODULE, "app", id(1));
        assert!(index.get(MODULE, "app").is_none());
        assert!(index.is_empty());
    }
}
