//! Attribute diffs and the change log
//!
//! A modification replaces an entity's data as a whole, but what changed is
//! always computable as a list of [`AttributeChange`]s. The storage records
//! one [`EntityChange`] per added, modified or removed entity; delivering
//! them to observers is up to the caller (see `collect_changes`).

use wsmodel_core::{EntityData, EntityId, EntityKind, Value};

/// Attribute name used for the entity source in diffs
pub const ENTITY_SOURCE_ATTRIBUTE: &str = "entitySource";

/// One attribute that differs between two versions of an entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeChange {
    /// Attribute name
    pub name: &'static str,
    /// Value before the modification
    pub old: Value,
    /// Value after the modification
    pub new: Value,
}

/// A change recorded by the storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityChange {
    /// Entity was added
    Added {
        /// New entity
        id: EntityId,
        /// Its kind
        kind: EntityKind,
    },
    /// Entity data was replaced
    Modified {
        /// Modified entity
        id: EntityId,
        /// Its kind
        kind: EntityKind,
        /// Attributes that differ
        changes: Vec<AttributeChange>,
    },
    /// Entity was removed, directly or by cascade
    Removed {
        /// Removed entity
        id: EntityId,
        /// Its kind
        kind: EntityKind,
    },
}

impl EntityChange {
    /// Entity the change is about
    pub fn id(&self) -> EntityId {
        match self {
            EntityChange::Added { id, .. }
            | EntityChange::Modified { id, .. }
            | EntityChange::Removed { id, .. } => *id,
        }
    }

    /// Kind of the entity
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityChange::Added { kind, .. }
            | EntityChange::Modified { kind, .. }
            | EntityChange::Removed { kind, .. } => *kind,
        }
    }
}

/// Attributes that differ between two versions of an entity
///
/// The entity source is compared first and reported as `entitySource`.
/// Attributes are reported in the kind's declared order.
pub fn diff_entities(old: &dyn EntityData, new: &dyn EntityData) -> Vec<AttributeChange> {
    let mut changes = Vec::new();

    if old.entity_source() != new.entity_source() {
        changes.push(AttributeChange {
            name: ENTITY_SOURCE_ATTRIBUTE,
            old: Value::from(old.entity_source().as_str()),
            new: Value::from(new.entity_source().as_str()),
        });
    }

    let old_attributes = old.attributes();
    for (name, new_value) in new.attributes() {
        let old_value = old_attributes
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.clone())
            .unwrap_or(Value::Null);
        if old_value != new_value {
            changes.push(AttributeChange {
                name,
                old: old_value,
                new: new_value,
            });
        }
    }

    changes
}
