//! Error types for the entity graph
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! Every error is local to a single mutation attempt: storage validates
//! before it applies, so a failed operation leaves the storage exactly as
//! it was.

use crate::types::{EntityId, EntityKind, StoreId};
use thiserror::Error;

/// Result type alias for entity graph operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the entity graph
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A builder was finalized with a required field left unset
    #[error("Missing required field '{field}' on {kind}")]
    MissingRequiredField {
        /// Kind being built
        kind: EntityKind,
        /// Field that was not set
        field: &'static str,
    },

    /// A record or reference from another storage lineage was used
    #[error("Entity belongs to storage {actual}, not {expected}")]
    ForeignEntity {
        /// Lineage of the storage performing the operation
        expected: StoreId,
        /// Lineage the record came from
        actual: StoreId,
    },

    /// The entity is not part of the current generation
    #[error("Entity {id} of kind {kind} not found")]
    EntityNotFound {
        /// Kind the caller expected
        kind: EntityKind,
        /// Id that was looked up
        id: EntityId,
    },

    /// A mutation would close a cycle of required references
    #[error("Required reference cycle through {kind} {id}: {path:?}")]
    RelationCycle {
        /// Kind of the entity being mutated
        kind: EntityKind,
        /// Entity being mutated
        id: EntityId,
        /// Ids along the cycle, starting at `id`
        path: Vec<EntityId>,
    },

    /// More than one child claims a one-to-one parent (storage corruption)
    #[error("Relation '{relation}' of {parent} is ambiguous: {children:?}")]
    AmbiguousRelation {
        /// Relation name
        relation: &'static str,
        /// Parent entity
        parent: EntityId,
        /// All children claiming the parent
        children: Vec<EntityId>,
    },

    /// The kind was never registered with the storage's registry
    #[error("Unknown entity kind: {0}")]
    UnknownEntityKind(EntityKind),

    /// No relation with this name is registered
    #[error("Unknown relation: {0}")]
    UnknownRelation(String),

    /// A relation declaration does not match the registered kinds
    #[error("Invalid relation '{relation}': {reason}")]
    InvalidRelation {
        /// Relation name
        relation: &'static str,
        /// Why it was rejected
        reason: String,
    },

    /// A reference field points at a missing entity or one of the wrong kind
    #[error("Reference '{field}' points to {target}, expected an existing {expected}")]
    DanglingReference {
        /// Reference field name
        field: &'static str,
        /// Referenced id
        target: EntityId,
        /// Kind the field must point to
        expected: EntityKind,
    },

    /// Another entity of the same kind already has this symbolic id
    #[error("Symbolic id '{symbolic_id}' of {kind} already used by {existing}")]
    DuplicateSymbolicId {
        /// Kind owning the symbolic id
        kind: EntityKind,
        /// Symbolic id text
        symbolic_id: String,
        /// Entity already holding it
        existing: EntityId,
    },

    /// Configuration could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether the caller can fix the input and retry
    ///
    /// `EntityNotFound` is recoverable by re-fetching the current
    /// generation; missing fields, dangling references and duplicate
    /// symbolic ids by changing the input.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::MissingRequiredField { .. }
                | Error::EntityNotFound { .. }
                | Error::DanglingReference { .. }
                | Error::DuplicateSymbolicId { .. }
        )
    }

    /// Whether the error signals a broken contract or corrupted storage
    ///
    /// These must never be retried or swallowed.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            Error::AmbiguousRelation { .. } | Error::ForeignEntity { .. }
        )
    }
}
