//! Shared graph state
//!
//! `GraphState` is the data behind both [`Snapshot`](crate::Snapshot) and
//! [`MutableStorage`](crate::MutableStorage): the entity map and its
//! secondary indices, each behind an `Arc`.
//!
//! # Copy-on-write
//!
//! Cloning a GraphState is O(1): it only bumps reference counts. Mutation
//! goes through `Arc::make_mut`, which copies a component the first time it
//! is written while shared with a snapshot. Snapshots therefore never
//! observe later writes, and a storage that is not shared mutates in place.
//!
//! The id allocator is the one component that is never copied: every state
//! of a lineage (snapshots, storages forked from them, rolled back states)
//! draws from the same counter, so no two entities of a lineage ever get
//! the same id.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use wsmodel_core::{EntityData, EntityId, EntitySource, StoreId};

use crate::index::{ReferenceIndex, SourceIndex, SymbolicIndex};

/// Entity map and indices of one generation
#[derive(Debug, Clone)]
pub struct GraphState {
    store_id: StoreId,
    generation: u64,
    ids: Arc<AtomicU64>,
    entities: Arc<BTreeMap<EntityId, Arc<dyn EntityData>>>,
    references: Arc<ReferenceIndex>,
    sources: Arc<SourceIndex>,
    symbolic: Arc<SymbolicIndex>,
}

impl GraphState {
    /// Empty state of a new lineage
    pub(crate) fn new() -> Self {
        Self {
            store_id: StoreId::new(),
            generation: 0,
            ids: Arc::new(AtomicU64::new(1)),
            entities: Arc::new(BTreeMap::new()),
            references: Arc::new(ReferenceIndex::new()),
            sources: Arc::new(SourceIndex::new()),
            symbolic: Arc::new(SymbolicIndex::new()),
        }
    }

    /// Lineage of this state
    pub fn store_id(&self) -> StoreId {
        self.store_id
    }

    /// Mutation counter
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Stored data for an id
    pub fn get(&self, id: EntityId) -> Option<&Arc<dyn EntityData>> {
        self.entities.get(&id)
    }

    /// All entities in id order
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Arc<dyn EntityData>)> {
        self.entities.iter().map(|(id, data)| (*id, data))
    }

    /// Number of entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Check if there are no entities
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Reference index
    pub fn references(&self) -> &ReferenceIndex {
        &self.references
    }

    /// Source index
    pub fn sources(&self) -> &SourceIndex {
        &self.sources
    }

    /// Symbolic id index
    pub fn symbolic(&self) -> &SymbolicIndex {
        &self.symbolic
    }

    /// Entities created with `source`
    pub fn ids_by_source(&self, source: &EntitySource) -> Vec<EntityId> {
        self.sources
            .get(source)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Whether two states share the same entity map allocation
    pub fn shares_entities_with(&self, other: &GraphState) -> bool {
        Arc::ptr_eq(&self.entities, &other.entities)
    }

    // =========================================================================
    // Mutation (storage only)
    // =========================================================================

    /// Hand out a fresh id of this lineage
    ///
    /// The id is retired even if nothing is ever inserted under it.
    pub(crate) fn allocate_id(&self) -> EntityId {
        EntityId::new(self.ids.fetch_add(1, Ordering::Relaxed))
    }

    pub(crate) fn bump_generation(&mut self) {
        self.generation += 1;
    }

    /// Go back to a saved state without handing out its ids again
    pub(crate) fn restore(&mut self, saved: GraphState) {
        let ids = Arc::clone(&self.ids);
        *self = saved;
        self.ids = ids;
    }

    /// Insert data under an id from [`allocate_id`](Self::allocate_id)
    pub(crate) fn insert(&mut self, id: EntityId, data: Arc<dyn EntityData>) {
        self.index(id, &data);
        Arc::make_mut(&mut self.entities).insert(id, data);
    }

    /// Replace data of an existing id, returning the old data
    pub(crate) fn replace(
        &mut self,
        id: EntityId,
        data: Arc<dyn EntityData>,
    ) -> Option<Arc<dyn EntityData>> {
        let old = Arc::make_mut(&mut self.entities).insert(id, Arc::clone(&data));
        if let Some(ref old) = old {
            self.unindex(id, old);
        }
        self.index(id, &data);
        old
    }

    /// Remove an id, returning its data
    pub(crate) fn remove(&mut self, id: EntityId) -> Option<Arc<dyn EntityData>> {
        let removed = Arc::make_mut(&mut self.entities).remove(&id);
        if let Some(ref data) = removed {
            self.unindex(id, data);
        }
        removed
    }

    fn index(&mut self, id: EntityId, data: &Arc<dyn EntityData>) {
        let references = Arc::make_mut(&mut self.references);
        for (field, target) in data.references() {
            references.insert(target.id, field, id);
        }
        Arc::make_mut(&mut self.sources).insert(data.entity_source().clone(), id);
        if let Some(key) = data.symbolic_id() {
            Arc::make_mut(&mut self.symbolic).insert(data.kind(), key, id);
        }
    }

    fn unindex(&mut self, id: EntityId, data: &Arc<dyn EntityData>) {
        let references = Arc::make_mut(&mut self.references);
        for (field, target) in data.references() {
            references.remove(target.id, field, id);
        }
        Arc::make_mut(&mut self.sources).remove(data.entity_source(), id);
        if let Some(key) = data.symbolic_id() {
            Arc::make_mut(&mut self.symbolic).remove(data.kind(), &key, id);
        }
    }
}
