//! Typed relation extensions
//!
//! A relation extension is a named link from a parent kind to a child kind
//! that lives in the child's reference field. Declaring one as a `const`
//! gives a typed accessor without embedding the child in the parent:
//!
//! ```rust,ignore
//! pub const GROUP_PATH: OneToOne<Module, ModuleGroupPath> = OneToOne::new("groupPath", "module");
//!
//! let group = view.resolve_one(&module, &GROUP_PATH)?; // Option<Entity<ModuleGroupPath>>
//! ```

use crate::entity::EntityType;
use crate::registry::{Cardinality, RelationDescriptor};
use std::marker::PhantomData;

/// Nullable one-to-one relation from `P` to `C`
pub struct OneToOne<P, C> {
    name: &'static str,
    field: &'static str,
    _marker: PhantomData<fn() -> (P, C)>,
}

impl<P: EntityType, C: EntityType> OneToOne<P, C> {
    /// Declare a relation held by `C`'s reference field `field`
    pub const fn new(name: &'static str, field: &'static str) -> Self {
        Self {
            name,
            field,
            _marker: PhantomData,
        }
    }

    /// Relation name
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Reference field on the child
    pub const fn field(&self) -> &'static str {
        self.field
    }

    /// Untyped description for registration
    pub fn descriptor(&self) -> RelationDescriptor {
        RelationDescriptor {
            name: self.name,
            parent: P::KIND,
            child: C::KIND,
            field: self.field,
            cardinality: Cardinality::OneToOne,
        }
    }
}

/// One-to-many relation from `P` to `C`
pub struct OneToMany<P, C> {
    name: &'static str,
    field: &'static str,
    _marker: PhantomData<fn() -> (P, C)>,
}

impl<P: EntityType, C: EntityType> OneToMany<P, C> {
    /// Declare a relation held by `C`'s reference field `field`
    pub const fn new(name: &'static str, field: &'static str) -> Self {
        Self {
            name,
            field,
            _marker: PhantomData,
        }
    }

    /// Relation name
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Reference field on the child
    pub const fn field(&self) -> &'static str {
        self.field
    }

    /// Untyped description for registration
    pub fn descriptor(&self) -> RelationDescriptor {
        RelationDescriptor {
            name: self.name,
            parent: P::KIND,
            child: C::KIND,
            field: self.field,
            cardinality: Cardinality::OneToMany,
        }
    }
}
