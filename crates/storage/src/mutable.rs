//! Mutable storage: the single-writer side of the entity graph
//!
//! `MutableStorage` owns the current generation of all entities and accepts
//! add, modify and remove operations. Every operation validates completely
//! before it touches the state, so a failed operation leaves the storage
//! exactly as it was. [`to_snapshot`](MutableStorage::to_snapshot) freezes
//! the current generation into an immutable [`Snapshot`] in O(1).
//!
//! ## Validation
//!
//! | Check | Error |
//! |-------|-------|
//! | kind registered | `UnknownEntityKind` |
//! | record / reference lineage | `ForeignEntity` |
//! | reference target exists with the declared kind | `DanglingReference` |
//! | symbolic id unique per kind | `DuplicateSymbolicId` |
//! | no cycle of required references | `RelationCycle` |
//! | cascade within `max_cascade_depth` | `RelationCycle` |
//!
//! ## Dependent children
//!
//! Every entity holding a reference to a parent is dependent on it: removing
//! the parent removes the child, transitively. Adding a second child to a
//! one-to-one relation replaces the first one (removed with its dependents).

use std::collections::BTreeSet;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::{debug, warn};
use wsmodel_core::{
    Entity, EntityBuilder, EntityData, EntityId, EntityKind, EntityRef, EntitySource,
    EntityType, EntityTypeInfo, EntityTypeRegistry, Error, NewEntity, Result, StorageConfig,
};

use crate::diff::{diff_entities, EntityChange};
use crate::snapshot::Snapshot;
use crate::state::GraphState;
use crate::view::EntityView;

/// The current, mutable generation of an entity graph
///
/// Not `Sync`-shared for writing: all mutation takes `&mut self`, matching
/// the single-writer model. Readers use snapshots.
#[derive(Debug, Clone)]
pub struct MutableStorage {
    state: GraphState,
    registry: Arc<EntityTypeRegistry>,
    config: Arc<StorageConfig>,
    changes: Vec<EntityChange>,
}

impl MutableStorage {
    /// Create an empty storage starting a new lineage
    pub fn new(registry: EntityTypeRegistry) -> Self {
        Self::with_config(registry, StorageConfig::default())
    }

    /// Create an empty storage with explicit configuration
    pub fn with_config(registry: EntityTypeRegistry, config: StorageConfig) -> Self {
        let state = GraphState::new();
        debug!(
            target: "wsmodel::storage",
            store_id = %state.store_id(),
            kinds = registry.len(),
            "Storage created"
        );
        Self {
            state,
            registry: Arc::new(registry),
            config: Arc::new(config),
            changes: Vec::new(),
        }
    }

    /// Continue the lineage of a snapshot
    ///
    /// The new storage starts at the snapshot's generation with an empty
    /// change log. The snapshot itself is never affected. Storages forked
    /// from the same snapshot draw ids from one allocator, so a record added
    /// in one fork is `EntityNotFound` in every other.
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            state: snapshot.state().clone(),
            registry: Arc::clone(snapshot.shared_registry()),
            config: Arc::clone(snapshot.shared_config()),
            changes: Vec::new(),
        }
    }

    /// Active configuration
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Freeze the current generation
    pub fn to_snapshot(&self) -> Snapshot {
        Snapshot::new(
            self.state.clone(),
            Arc::clone(&self.registry),
            Arc::clone(&self.config),
        )
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Attach a finalized entity to this storage
    ///
    /// If the entity is the child of a one-to-one relation whose parent
    /// already has a child, the previous child is removed first (with its
    /// dependents).
    ///
    /// # Errors
    ///
    /// `UnknownEntityKind`, `ForeignEntity`, `DanglingReference`,
    /// `DuplicateSymbolicId`, `RelationCycle`. Nothing changes on error.
    pub fn add_entity<T: EntityType>(&mut self, entity: NewEntity<T>) -> Result<Entity<T>> {
        let data = Arc::new(entity.into_data());
        let id = self.state.allocate_id();
        let replaced = self.validate(id, data.as_ref())?;

        self.remove_cascade(&replaced);
        let erased: Arc<dyn EntityData> = data.clone();
        self.state.insert(id, erased);
        self.state.bump_generation();
        self.record(EntityChange::Added { id, kind: T::KIND });

        debug!(
            target: "wsmodel::storage",
            id = %id,
            kind = %T::KIND,
            source = %data.entity_source(),
            generation = self.state.generation(),
            "Entity added"
        );
        Ok(Entity::from_parts(EntityRef::new(self.store_id(), id), data))
    }

    /// Amend an entity through its builder
    ///
    /// The builder is seeded from the value currently stored under the
    /// record's id, not from `entity` itself, so a stale record modifies
    /// the latest version. `entity` is left untouched. The generation
    /// advances even if the block changes nothing; only a non-empty diff
    /// is recorded.
    ///
    /// # Errors
    ///
    /// - `ForeignEntity` if `entity` belongs to another lineage
    /// - `EntityNotFound` if the id is not in this generation as a `T`
    /// - `MissingRequiredField` if the block unset a required field
    /// - any add-time validation error for the new value
    pub fn modify_entity<T: EntityType>(
        &mut self,
        entity: &Entity<T>,
        block: impl FnOnce(&mut T::Builder),
    ) -> Result<Entity<T>> {
        self.check_lineage(entity.entity_ref())?;
        let id = entity.id();
        let current = self.entity::<T>(id).ok_or(Error::EntityNotFound {
            kind: T::KIND,
            id,
        })?;

        let mut builder = current.to_builder();
        block(&mut builder);
        let data = Arc::new(builder.build()?);
        let replaced = self.validate(id, data.as_ref())?;

        let changes = diff_entities(current.data().as_ref(), data.as_ref());
        self.remove_cascade(&replaced);
        let erased: Arc<dyn EntityData> = data.clone();
        self.state.replace(id, erased);
        self.state.bump_generation();

        debug!(
            target: "wsmodel::storage",
            id = %id,
            kind = %T::KIND,
            changed = changes.len(),
            generation = self.state.generation(),
            "Entity modified"
        );
        if !changes.is_empty() {
            self.record(EntityChange::Modified {
                id,
                kind: T::KIND,
                changes,
            });
        }
        Ok(Entity::from_parts(entity.entity_ref(), data))
    }

    /// Remove an entity and, transitively, everything depending on it
    ///
    /// Returns the removed ids, the entity itself first.
    ///
    /// # Errors
    ///
    /// - `ForeignEntity` if `entity` belongs to another lineage
    /// - `EntityNotFound` if it was already removed
    /// - `RelationCycle` if the cascade exceeds `max_cascade_depth`
    pub fn remove_entity<T: EntityType>(&mut self, entity: &Entity<T>) -> Result<Vec<EntityId>> {
        self.check_lineage(entity.entity_ref())?;
        let id = entity.id();
        if self.entity::<T>(id).is_none() {
            return Err(Error::EntityNotFound { kind: T::KIND, id });
        }

        let removed = self.collect_cascade(&[id])?;
        self.remove_cascade(&removed);
        self.state.bump_generation();

        if removed.len() > 1 {
            warn!(
                target: "wsmodel::storage",
                id = %id,
                kind = %T::KIND,
                dependents = removed.len() - 1,
                "Removal cascaded to dependent entities"
            );
        }
        debug!(
            target: "wsmodel::storage",
            id = %id,
            kind = %T::KIND,
            removed = removed.len(),
            generation = self.state.generation(),
            "Entity removed"
        );
        Ok(removed)
    }

    /// Remove every entity created with `source`, plus their dependents
    ///
    /// Returns the removed ids in removal order. Removing nothing is not a
    /// mutation and leaves the generation unchanged.
    ///
    /// # Errors
    ///
    /// `RelationCycle` if a cascade exceeds `max_cascade_depth`.
    pub fn remove_by_source(&mut self, source: &EntitySource) -> Result<Vec<EntityId>> {
        let roots = self.state.ids_by_source(source);
        if roots.is_empty() {
            return Ok(Vec::new());
        }

        let removed = self.collect_cascade(&roots)?;
        self.remove_cascade(&removed);
        self.state.bump_generation();

        debug!(
            target: "wsmodel::storage",
            source = %source,
            direct = roots.len(),
            removed = removed.len(),
            generation = self.state.generation(),
            "Entities removed by source"
        );
        Ok(removed)
    }

    /// Apply a batch of operations atomically
    ///
    /// If `f` returns an error, entities, indices, generation and change log
    /// are restored to their state before the call. Ids handed out inside a
    /// failed batch are never reused.
    ///
    /// # Example
    ///
    /// ```ignore
    /// storage.transaction(|s| {
    ///     let module = s.add_entity(Module::create("core", source.clone())?)?;
    ///     s.add_entity(ModuleGroupPath::create(vec!["libs".into()], &module, source)?)?;
    ///     Ok(module)
    /// })?;
    /// ```
    pub fn transaction<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let saved_state = self.state.clone();
        let saved_changes = self.changes.clone();

        match f(self) {
            Ok(value) => Ok(value),
            Err(e) => {
                self.state.restore(saved_state);
                self.changes = saved_changes;
                debug!(
                    target: "wsmodel::storage",
                    error = %e,
                    generation = self.state.generation(),
                    "Transaction rolled back"
                );
                Err(e)
            }
        }
    }

    // =========================================================================
    // Change log
    // =========================================================================

    /// Drain the changes recorded since the last call
    pub fn collect_changes(&mut self) -> Vec<EntityChange> {
        std::mem::take(&mut self.changes)
    }

    /// Check if there are undrained changes
    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    fn record(&mut self, change: EntityChange) {
        if self.config.change_log {
            self.changes.push(change);
        }
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Validate `data` as the value of `id`, returning one-to-one children
    /// that have to be removed (with their dependents) to make room for it
    fn validate(&self, id: EntityId, data: &dyn EntityData) -> Result<Vec<EntityId>> {
        let kind = data.kind();
        let info = self
            .registry
            .get(kind)
            .ok_or(Error::UnknownEntityKind(kind))?;

        self.check_references(data, info)?;
        if let Some(key) = data.symbolic_id() {
            if let Some(existing) = self.state.symbolic().get(kind, &key) {
                if existing != id {
                    return Err(Error::DuplicateSymbolicId {
                        kind,
                        symbolic_id: key,
                        existing,
                    });
                }
            }
        }
        self.check_cycle(id, data)?;
        self.one_to_one_replacements(id, data)
    }

    fn check_references(&self, data: &dyn EntityData, info: &EntityTypeInfo) -> Result<()> {
        for (field, target) in data.references() {
            self.check_lineage(target)?;
            let declared = info.reference(field).ok_or_else(|| Error::InvalidRelation {
                relation: field,
                reason: format!("{} declares no reference field '{}'", info.kind, field),
            })?;
            if !self.config.check_references {
                continue;
            }
            let valid = self
                .state
                .get(target.id)
                .is_some_and(|parent| parent.kind() == declared.target);
            if !valid {
                return Err(Error::DanglingReference {
                    field,
                    target: target.id,
                    expected: declared.target,
                });
            }
        }
        Ok(())
    }

    /// Follow required references from `data` and fail if they lead back to `id`
    fn check_cycle(&self, id: EntityId, data: &dyn EntityData) -> Result<()> {
        let mut stack: Vec<Vec<EntityId>> = self
            .required_targets(data)
            .into_iter()
            .map(|target| vec![id, target])
            .collect();
        let mut visited = BTreeSet::new();

        while let Some(path) = stack.pop() {
            let Some(&current) = path.last() else {
                continue;
            };
            if current == id {
                return Err(Error::RelationCycle {
                    kind: data.kind(),
                    id,
                    path,
                });
            }
            if !visited.insert(current) {
                continue;
            }
            if let Some(next) = self.state.get(current) {
                for target in self.required_targets(next.as_ref()) {
                    let mut extended = path.clone();
                    extended.push(target);
                    stack.push(extended);
                }
            }
        }
        Ok(())
    }

    fn required_targets(&self, data: &dyn EntityData) -> Vec<EntityId> {
        let Some(info) = self.registry.get(data.kind()) else {
            return Vec::new();
        };
        data.references()
            .into_iter()
            .filter(|(field, _)| info.reference(field).is_some_and(|r| r.required))
            .map(|(_, target)| target.id)
            .collect()
    }

    fn one_to_one_replacements(&self, id: EntityId, data: &dyn EntityData) -> Result<Vec<EntityId>> {
        let mut displaced = Vec::new();
        let mut relations = Vec::new();
        for (field, target) in data.references() {
            let Some(relation) = self.registry.one_to_one_for(data.kind(), field) else {
                continue;
            };
            let existing: Vec<EntityId> = self
                .state
                .references()
                .children(target.id, field)
                .into_iter()
                .filter(|child| *child != id)
                .filter(|child| {
                    self.state
                        .get(*child)
                        .is_some_and(|c| c.kind() == relation.child)
                })
                .collect();
            if !existing.is_empty() {
                warn!(
                    target: "wsmodel::storage",
                    relation = relation.name,
                    parent = %target.id,
                    replaced = ?existing,
                    "Replacing one-to-one child"
                );
                relations.push(relation.name);
                displaced.extend(existing);
            }
        }
        if displaced.is_empty() {
            return Ok(displaced);
        }

        // The replacement must not take the new value's own parents with it
        let cascade = self.collect_cascade(&displaced)?;
        let targets: Vec<EntityId> = data.references().into_iter().map(|(_, r)| r.id).collect();
        let lost = cascade
            .iter()
            .find(|removed| **removed == id || targets.contains(removed));
        if let (Some(lost), Some(relation)) = (lost, relations.first()) {
            return Err(Error::InvalidRelation {
                relation: *relation,
                reason: format!("replacing the previous child would remove {}", lost),
            });
        }
        Ok(cascade)
    }

    // =========================================================================
    // Cascade
    // =========================================================================

    /// Breadth-first closure of `roots` over incoming references
    ///
    /// Returns present ids only, each once, parents before children.
    fn collect_cascade(&self, roots: &[EntityId]) -> Result<Vec<EntityId>> {
        let mut seen = BTreeSet::new();
        let mut via: FxHashMap<EntityId, EntityId> = FxHashMap::default();
        let mut removed = Vec::new();
        // (id, kind of the root it cascades from)
        let mut frontier: Vec<(EntityId, EntityKind)> = roots
            .iter()
            .filter_map(|id| self.state.get(*id).map(|data| (*id, data.kind())))
            .filter(|(id, _)| seen.insert(*id))
            .collect();
        let mut depth = 0;

        while let Some(&(deepest, kind)) = frontier.first() {
            if depth > self.config.max_cascade_depth {
                let mut path = vec![deepest];
                while let Some(parent) = path.last().and_then(|id| via.get(id)) {
                    path.push(*parent);
                }
                path.reverse();
                return Err(Error::RelationCycle {
                    kind,
                    id: path[0],
                    path,
                });
            }

            let mut next = Vec::new();
            for (id, kind) in frontier {
                removed.push(id);
                for child in self.state.references().all_children(id) {
                    if seen.insert(child) {
                        via.insert(child, id);
                        next.push((child, kind));
                    }
                }
            }
            frontier = next;
            depth += 1;
        }
        Ok(removed)
    }

    fn remove_cascade(&mut self, ids: &[EntityId]) {
        for &id in ids {
            if let Some(data) = self.state.remove(id) {
                self.record(EntityChange::Removed {
                    id,
                    kind: data.kind(),
                });
            }
        }
    }
}

impl EntityView for MutableStorage {
    fn state(&self) -> &GraphState {
        &self.state
    }

    fn registry(&self) -> &EntityTypeRegistry {
        &self.registry
    }
}
