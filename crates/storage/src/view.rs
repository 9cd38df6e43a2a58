//! Read surface shared by snapshots and mutable storage
//!
//! Everything here is read-only and lazy: relation extensions are resolved
//! against the view being queried, through the reference index, and nothing
//! is cached inside parent records. Resolving the same relation against an
//! older snapshot and a newer storage can therefore give different answers,
//! each correct for its generation.

use wsmodel_core::{
    downcast_data, Cardinality, Entity, EntityData, EntityId, EntityRef, EntitySource, EntityType,
    EntityTypeRegistry, Error, OneToMany, OneToOne, Result, StoreId, SymbolicId,
};

use crate::state::GraphState;
use std::sync::Arc;

/// Read access to one generation of the entity graph
pub trait EntityView {
    /// Underlying state
    fn state(&self) -> &GraphState;

    /// Type registry the view validates against
    fn registry(&self) -> &EntityTypeRegistry;

    /// Lineage of this view
    fn store_id(&self) -> StoreId {
        self.state().store_id()
    }

    /// Mutation counter of this generation
    fn generation(&self) -> u64 {
        self.state().generation()
    }

    /// Number of entities
    fn len(&self) -> usize {
        self.state().len()
    }

    /// Check if there are no entities
    fn is_empty(&self) -> bool {
        self.state().is_empty()
    }

    /// Check if an id is part of this generation
    fn contains(&self, id: EntityId) -> bool {
        self.state().get(id).is_some()
    }

    /// Type-erased data of an entity
    fn data(&self, id: EntityId) -> Option<Arc<dyn EntityData>> {
        self.state().get(id).cloned()
    }

    /// Typed record for an id, if present and of kind `T`
    fn entity<T: EntityType>(&self, id: EntityId) -> Option<Entity<T>> {
        let data = downcast_data::<T>(self.state().get(id)?)?;
        Some(Entity::from_parts(EntityRef::new(self.store_id(), id), data))
    }

    /// All entities of kind `T`, in id order
    fn entities<T: EntityType>(&self) -> Vec<Entity<T>> {
        let store = self.store_id();
        self.state()
            .iter()
            .filter(|(_, data)| data.kind() == T::KIND)
            .filter_map(|(id, data)| {
                downcast_data::<T>(data).map(|d| Entity::from_parts(EntityRef::new(store, id), d))
            })
            .collect()
    }

    /// The current version of a record, or `None` if it was removed
    ///
    /// # Errors
    ///
    /// `ForeignEntity` if the record belongs to another lineage.
    fn refresh<T: EntityType>(&self, entity: &Entity<T>) -> Result<Option<Entity<T>>> {
        self.check_lineage(entity.entity_ref())?;
        Ok(self.entity(entity.id()))
    }

    /// Entity holding a symbolic id
    fn resolve<S: SymbolicId>(&self, symbolic_id: &S) -> Option<Entity<S::Entity>> {
        let kind = <S::Entity as EntityType>::KIND;
        let id = self.state().symbolic().get(kind, symbolic_id.key())?;
        self.entity(id)
    }

    /// Entities created with `source`, in id order
    fn entities_by_source(&self, source: &EntitySource) -> Vec<EntityId> {
        self.state().ids_by_source(source)
    }

    /// Resolve a one-to-one relation extension
    ///
    /// Absence is a normal state and yields `Ok(None)`.
    ///
    /// # Errors
    ///
    /// - `ForeignEntity` if `parent` belongs to another lineage
    /// - `AmbiguousRelation` if more than one child claims the parent
    fn resolve_one<P: EntityType, C: EntityType>(
        &self,
        parent: &Entity<P>,
        relation: &OneToOne<P, C>,
    ) -> Result<Option<Entity<C>>> {
        self.check_lineage(parent.entity_ref())?;
        let children = self.child_ids::<C>(parent.id(), relation.field());
        match children.as_slice() {
            [] => Ok(None),
            [only] => Ok(self.entity(*only)),
            _ => Err(Error::AmbiguousRelation {
                relation: relation.name(),
                parent: parent.id(),
                children,
            }),
        }
    }

    /// Resolve a one-to-many relation extension, in id order
    ///
    /// # Errors
    ///
    /// `ForeignEntity` if `parent` belongs to another lineage.
    fn resolve_many<P: EntityType, C: EntityType>(
        &self,
        parent: &Entity<P>,
        relation: &OneToMany<P, C>,
    ) -> Result<Vec<Entity<C>>> {
        self.check_lineage(parent.entity_ref())?;
        Ok(self
            .child_ids::<C>(parent.id(), relation.field())
            .into_iter()
            .filter_map(|id| self.entity(id))
            .collect())
    }

    /// Resolve a registered relation by name, untyped
    ///
    /// # Errors
    ///
    /// - `UnknownRelation` if no such relation is registered
    /// - `InvalidRelation` if `parent` is not of the relation's parent kind
    /// - `ForeignEntity` / `AmbiguousRelation` as for the typed accessors
    fn resolve_by_name<P: EntityType>(
        &self,
        parent: &Entity<P>,
        name: &str,
    ) -> Result<Vec<EntityId>> {
        self.check_lineage(parent.entity_ref())?;
        let relation = *self
            .registry()
            .relation(name)
            .ok_or_else(|| Error::UnknownRelation(name.to_string()))?;
        if relation.parent != P::KIND {
            return Err(Error::InvalidRelation {
                relation: relation.name,
                reason: format!("parent is {}, expected {}", P::KIND, relation.parent),
            });
        }
        let children: Vec<EntityId> = self
            .state()
            .references()
            .children(parent.id(), relation.field)
            .into_iter()
            .filter(|id| {
                self.state()
                    .get(*id)
                    .is_some_and(|data| data.kind() == relation.child)
            })
            .collect();
        if relation.cardinality == Cardinality::OneToOne && children.len() > 1 {
            return Err(Error::AmbiguousRelation {
                relation: relation.name,
                parent: parent.id(),
                children,
            });
        }
        Ok(children)
    }

    /// Entities holding a reference to `id`, in id order
    fn referrers(&self, id: EntityId) -> Vec<EntityId> {
        self.state().references().all_children(id).into_iter().collect()
    }

    #[doc(hidden)]
    fn child_ids<C: EntityType>(&self, parent: EntityId, field: &str) -> Vec<EntityId> {
        self.state()
            .references()
            .children(parent, field)
            .into_iter()
            .filter(|id| {
                self.state()
                    .get(*id)
                    .is_some_and(|data| data.kind() == C::KIND)
            })
            .collect()
    }

    #[doc(hidden)]
    fn check_lineage(&self, entity_ref: EntityRef) -> Result<()> {
        if entity_ref.store != self.store_id() {
            return Err(Error::ForeignEntity {
                expected: self.store_id(),
                actual: entity_ref.store,
            });
        }
        Ok(())
    }
}
