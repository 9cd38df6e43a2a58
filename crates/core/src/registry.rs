//! Entity type registry
//!
//! The registry lets new entity kinds and relations be declared without
//! modifying the storage engine. The storage consults it to:
//! - reject entities of unknown kinds
//! - validate reference fields (target kind, required or nullable)
//! - detect required-reference cycles
//! - resolve relations by name and keep one-to-one relations one-to-one
//!
//! ## Usage
//!
//! ```rust,ignore
//! let mut registry = EntityTypeRegistry::new();
//!
//! // Register kinds
//! registry.register::<Module>();
//! registry.register::<ModuleGroupPath>();
//!
//! // Register relations between them
//! registry.register_relation(GROUP_PATH.descriptor())?;
//!
//! // Look up by name
//! let relation = registry.relation("groupPath");
//! ```

use crate::entity::EntityType;
use crate::error::{Error, Result};
use crate::types::EntityKind;
use rustc_hash::FxHashMap;

/// A reference field of an entity kind pointing at a parent kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceField {
    /// Field name
    pub name: &'static str,
    /// Kind the field must point to
    pub target: EntityKind,
    /// Whether the field is non-nullable
    pub required: bool,
}

impl ReferenceField {
    /// A non-nullable reference
    pub const fn required(name: &'static str, target: EntityKind) -> Self {
        Self {
            name,
            target,
            required: true,
        }
    }

    /// A nullable reference
    pub const fn optional(name: &'static str, target: EntityKind) -> Self {
        Self {
            name,
            target,
            required: false,
        }
    }
}

/// Static description of an entity kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityTypeInfo {
    /// Kind discriminator
    pub kind: EntityKind,
    /// Fields the factory must populate
    pub required_fields: &'static [&'static str],
    /// Reference fields to parent kinds
    pub references: &'static [ReferenceField],
}

impl EntityTypeInfo {
    /// Describe a kind
    pub const fn new(
        kind: EntityKind,
        required_fields: &'static [&'static str],
        references: &'static [ReferenceField],
    ) -> Self {
        Self {
            kind,
            required_fields,
            references,
        }
    }

    /// Look up a reference field by name
    pub fn reference(&self, name: &str) -> Option<&ReferenceField> {
        self.references.iter().find(|r| r.name == name)
    }
}

/// How many children a parent may have through a relation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    /// At most one child
    OneToOne,
    /// Any number of children
    OneToMany,
}

/// A named relation between a parent kind and a child kind
///
/// The child holds the link in its reference field `field`; the parent
/// holds nothing. Children are existentially dependent on the parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationDescriptor {
    /// Relation name (`"groupPath"`)
    pub name: &'static str,
    /// Parent kind
    pub parent: EntityKind,
    /// Child kind
    pub child: EntityKind,
    /// Reference field on the child
    pub field: &'static str,
    /// Cardinality of the relation
    pub cardinality: Cardinality,
}

/// Registry of entity kinds and relations
///
/// Maintains mappings from:
/// - Kind -> type description
/// - Relation name -> relation
/// - (child kind, field) -> one-to-one relation name
#[derive(Debug, Clone, Default)]
pub struct EntityTypeRegistry {
    types: FxHashMap<EntityKind, EntityTypeInfo>,
    relations: FxHashMap<&'static str, RelationDescriptor>,
    one_to_one: FxHashMap<(EntityKind, &'static str), &'static str>,
}

impl EntityTypeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity kind
    pub fn register<T: EntityType>(&mut self) -> &mut Self {
        self.register_info(T::type_info())
    }

    /// Register a kind from its description
    ///
    /// Re-registering a kind replaces its description.
    pub fn register_info(&mut self, info: EntityTypeInfo) -> &mut Self {
        self.types.insert(info.kind, info);
        self
    }

    /// Register a relation
    ///
    /// # Errors
    ///
    /// `InvalidRelation` if either kind is unknown, the child has no such
    /// reference field, the field targets another kind, or the name is
    /// already taken by a different relation.
    pub fn register_relation(&mut self, relation: RelationDescriptor) -> Result<()> {
        let invalid = |reason: String| Error::InvalidRelation {
            relation: relation.name,
            reason,
        };

        if !self.types.contains_key(&relation.parent) {
            return Err(invalid(format!("parent kind {} is not registered", relation.parent)));
        }
        let child = self
            .types
            .get(&relation.child)
            .ok_or_else(|| invalid(format!("child kind {} is not registered", relation.child)))?;
        let field = child.reference(relation.field).ok_or_else(|| {
            invalid(format!(
                "{} has no reference field '{}'",
                relation.child, relation.field
            ))
        })?;
        if field.target != relation.parent {
            return Err(invalid(format!(
                "field '{}' points to {}, not {}",
                relation.field, field.target, relation.parent
            )));
        }
        if let Some(existing) = self.relations.get(relation.name) {
            if *existing != relation {
                return Err(invalid("name already registered".to_string()));
            }
        }

        if relation.cardinality == Cardinality::OneToOne {
            self.one_to_one
                .insert((relation.child, relation.field), relation.name);
        }
        self.relations.insert(relation.name, relation);
        Ok(())
    }

    /// Get a kind's description
    pub fn get(&self, kind: EntityKind) -> Option<&EntityTypeInfo> {
        self.types.get(&kind)
    }

    /// Check if a kind is registered
    pub fn is_registered(&self, kind: EntityKind) -> bool {
        self.types.contains_key(&kind)
    }

    /// Get a relation by name
    pub fn relation(&self, name: &str) -> Option<&RelationDescriptor> {
        self.relations.get(name)
    }

    /// One-to-one relation held by a child field, if any
    pub fn one_to_one_for(&self, child: EntityKind, field: &str) -> Option<&RelationDescriptor> {
        self.one_to_one
            .iter()
            .find(|((kind, f), _)| *kind == child && *f == field)
            .and_then(|(_, name)| self.relations.get(name))
    }

    /// All relations whose parent is `kind`, sorted by name
    pub fn relations_of(&self, kind: EntityKind) -> Vec<&RelationDescriptor> {
        let mut relations: Vec<_> = self
            .relations
            .values()
            .filter(|r| r.parent == kind)
            .collect();
        relations.sort_by_key(|r| r.name);
        relations
    }

    /// All registered kinds, sorted by name
    pub fn kinds(&self) -> Vec<EntityKind> {
        let mut kinds: Vec<EntityKind> = self.types.keys().copied().collect();
        kinds.sort();
        kinds
    }

    /// Get the number of registered kinds
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
