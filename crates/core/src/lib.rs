//! Core types and traits for wsmodel
//!
//! This crate defines the foundational types used throughout the system:
//! - StoreId, EntityId, EntityRef: Identity of lineages and entities
//! - EntityKind: Discriminates between entity types
//! - EntitySource: Provenance tag carried by every entity
//! - Value: Uniform attribute view used for diffs
//! - Error: Error type hierarchy
//! - Entity traits: EntityData, EntityType, EntityBuilder, SymbolicId
//! - Registry: Entity kinds and named relations
//! - Relations: Typed OneToOne / OneToMany descriptors
//! - StorageConfig: `wsmodel.toml` settings

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod entity;
pub mod error;
pub mod registry;
pub mod relation;
pub mod source;
pub mod types;
pub mod value;

pub use config::{StorageConfig, CONFIG_FILE_NAME};
pub use entity::{downcast_data, Entity, EntityBuilder, EntityData, EntityType, NewEntity, SymbolicId};
pub use error::{Error, Result};
pub use registry::{Cardinality, EntityTypeInfo, EntityTypeRegistry, ReferenceField, RelationDescriptor};
pub use relation::{OneToMany, OneToOne};
pub use source::EntitySource;
pub use types::{EntityId, EntityKind, EntityRef, StoreId};
pub use value::Value;
