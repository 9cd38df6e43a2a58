//! Identity types for the entity graph
//!
//! This module defines the foundational identifiers:
//! - StoreId: Identity of a storage lineage
//! - EntityId: Identity of an entity within a lineage
//! - EntityRef: Lineage-qualified entity identity
//! - EntityKind: Discriminator for entity types

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a storage lineage
///
/// Every `MutableStorage` created from scratch gets a fresh StoreId.
/// Snapshots and storages derived from it share the same StoreId, which
/// is how records from unrelated storages are told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StoreId(Uuid);

impl StoreId {
    /// Create a new random StoreId using UUID v4
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a StoreId from raw bytes
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    /// Get the raw bytes of this StoreId
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl Default for StoreId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of an entity within a storage lineage
///
/// Ids come from one monotonic counter per lineage, shared by every
/// storage forked from it, and are never reused. A stale or sibling id can
/// therefore only ever miss, never alias another entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Wrap a raw id
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw numeric id
    #[inline]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lineage-qualified reference to an entity
///
/// Attached records carry an EntityRef. References between entities
/// (child → parent) are stored as EntityRefs as well, so a reference
/// borrowed from a foreign storage is caught at validation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityRef {
    /// Storage lineage the entity belongs to
    pub store: StoreId,
    /// Entity id within that lineage
    pub id: EntityId,
}

impl EntityRef {
    /// Create a new entity reference
    pub const fn new(store: StoreId, id: EntityId) -> Self {
        Self { store, id }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.id, self.store)
    }
}

/// Discriminator for entity types
///
/// Kinds are static names (`"ModuleEntity"`) so they can be used in
/// const contexts and compared cheaply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EntityKind(&'static str);

impl EntityKind {
    /// Create a kind from its static name
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// Name of the kind
    pub const fn name(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}
