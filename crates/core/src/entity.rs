//! Entity and builder contracts
//!
//! An entity kind is a plain data struct implementing [`EntityType`]. The
//! storage keeps entity data type-erased as `Arc<dyn EntityData>` and hands
//! out typed, immutable [`Entity<T>`] records.
//!
//! ## Lifecycle
//!
//! ```text
//! factory (required fields + source) → Builder → init callback → build()
//!     → NewEntity<T> (detached, validated)
//!     → MutableStorage::add_entity → Entity<T> (attached, has EntityRef)
//!     → modify_entity: Builder seeded from current data → new Entity<T>
//! ```
//!
//! A builder only becomes data through `build()`, which fails with
//! `MissingRequiredField` when a required field is unset. Partially
//! initialized data never exists outside an open builder.

use crate::error::Result;
use crate::registry::EntityTypeInfo;
use crate::source::EntitySource;
use crate::types::{EntityId, EntityKind, EntityRef};
use crate::value::Value;
use std::any::Any;
use std::fmt::{self, Debug};
use std::ops::Deref;
use std::sync::Arc;

/// Type-erased view of entity data, as stored by the storage
pub trait EntityData: Any + Debug + Send + Sync {
    /// Kind of this entity
    fn kind(&self) -> EntityKind;

    /// Provenance tag
    fn entity_source(&self) -> &EntitySource;

    /// Ordered attribute view used for diffs
    ///
    /// Includes references (as `Value::Ref`), excludes the entity source.
    fn attributes(&self) -> Vec<(&'static str, Value)>;

    /// Outgoing references to parent entities, by field name
    fn references(&self) -> Vec<(&'static str, EntityRef)> {
        Vec::new()
    }

    /// Persistent name-based identity, if the kind has one
    fn symbolic_id(&self) -> Option<String> {
        None
    }

    /// Upcast for downcasting to the concrete kind
    fn as_any(&self) -> &dyn Any;

    /// Upcast a shared handle for downcasting to the concrete kind
    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

/// A concrete entity kind
pub trait EntityType: EntityData + Clone + PartialEq + Sized {
    /// Builder staging construction and modification of this kind
    type Builder: EntityBuilder<Target = Self>;

    /// Kind discriminator
    const KIND: EntityKind;

    /// Static description used by the type registry
    fn type_info() -> EntityTypeInfo;

    /// Builder seeded from this data, for modification
    fn to_builder(&self) -> Self::Builder;
}

/// Mutable staging object for one entity kind
pub trait EntityBuilder: Sized {
    /// Kind produced by this builder
    type Target: EntityType<Builder = Self>;

    /// Currently staged source, if set
    fn entity_source(&self) -> Option<&EntitySource>;

    /// Stage a new source
    fn set_entity_source(&mut self, source: EntitySource);

    /// Finalize into immutable data
    ///
    /// # Errors
    ///
    /// `MissingRequiredField` if any required field is unset.
    fn build(self) -> Result<Self::Target>;
}

/// Persistent, name-based identity of an entity
///
/// Unlike [`EntityId`], a symbolic id survives removal and re-creation of
/// the entity (a module is identified by its name across snapshots).
pub trait SymbolicId: Debug {
    /// Kind this id resolves to
    type Entity: EntityType;

    /// Key compared against `EntityData::symbolic_id`
    fn key(&self) -> &str;
}

/// Immutable record of an entity attached to a storage lineage
///
/// Cloning is O(1). Two records are equal when they refer to the same
/// entity with equal data, so a record read before a modification stays
/// equal to what the old snapshot returns.
pub struct Entity<T: EntityType> {
    entity_ref: EntityRef,
    data: Arc<T>,
}

impl<T: EntityType> Entity<T> {
    /// Assemble a record from its parts
    ///
    /// Used by storage implementations; a hand-assembled record is only
    /// accepted by a storage that actually holds that ref.
    #[doc(hidden)]
    pub fn from_parts(entity_ref: EntityRef, data: Arc<T>) -> Self {
        Self { entity_ref, data }
    }

    /// Lineage-qualified identity
    pub fn entity_ref(&self) -> EntityRef {
        self.entity_ref
    }

    /// Id within the lineage
    pub fn id(&self) -> EntityId {
        self.entity_ref.id
    }

    /// Shared data
    pub fn data(&self) -> &Arc<T> {
        &self.data
    }

    /// Provenance tag
    pub fn entity_source(&self) -> &EntitySource {
        self.data.entity_source()
    }
}

impl<T: EntityType> Clone for Entity<T> {
    fn clone(&self) -> Self {
        Self {
            entity_ref: self.entity_ref,
            data: Arc::clone(&self.data),
        }
    }
}

impl<T: EntityType> PartialEq for Entity<T> {
    fn eq(&self, other: &Self) -> bool {
        self.entity_ref == other.entity_ref && self.data == other.data
    }
}

impl<T: EntityType + Eq> Eq for Entity<T> {}

impl<T: EntityType> Deref for Entity<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.data
    }
}

impl<T: EntityType> Debug for Entity<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(T::KIND.name())
            .field("id", &self.entity_ref.id)
            .field("data", &self.data)
            .finish()
    }
}

/// Finalized entity data not yet added to any storage
#[derive(Debug, Clone, PartialEq)]
pub struct NewEntity<T: EntityType> {
    data: T,
}

impl<T: EntityType> NewEntity<T> {
    /// Run the factory sequence: customization callback, then finalize
    ///
    /// The builder is expected to carry the kind's required fields and
    /// source already; `init` may set anything else.
    ///
    /// # Errors
    ///
    /// `MissingRequiredField` if `init` leaves a required field unset.
    pub fn finalize(mut builder: T::Builder, init: impl FnOnce(&mut T::Builder)) -> Result<Self> {
        init(&mut builder);
        Ok(Self {
            data: builder.build()?,
        })
    }

    /// Staged data
    pub fn data(&self) -> &T {
        &self.data
    }

    /// Take the staged data
    pub fn into_data(self) -> T {
        self.data
    }
}

impl<T: EntityType> Deref for NewEntity<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.data
    }
}

/// Downcast type-erased data to a concrete kind
pub fn downcast_data<T: EntityType>(data: &Arc<dyn EntityData>) -> Option<Arc<T>> {
    Arc::clone(data).into_any_arc().downcast::<T>().ok()
}
