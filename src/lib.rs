//! wsmodel - Versioned in-memory entity graph for IDE project models
//!
//! Typed, immutable workspace entities (modules and their extensions) are
//! built through builders, stored in a [`MutableStorage`] with referential
//! integrity and cascading delete, and frozen into O(1) copy-on-write
//! [`Snapshot`]s. Relation extensions (`customImlData`, `groupPath`, ...)
//! are resolved by lookup against a snapshot, never embedded.
//!
//! # Quick Start
//!
//! ```ignore
//! use wsmodel::prelude::*;
//!
//! let mut storage = MutableStorage::new(model_registry()?);
//! let module = storage.add_entity(Module::create("core", EntitySource::new("manual"))?)?;
//! storage.add_entity(ModuleGroupPath::create(
//!     vec!["libs".into()],
//!     &module,
//!     EntitySource::new("manual"),
//! )?)?;
//!
//! let snapshot = storage.to_snapshot();
//! let group = module.group_path(&snapshot)?;
//! ```
//!
//! # Architecture
//!
//! - `wsmodel-core`: ids, errors, entity/builder traits, registry, config
//! - `wsmodel-storage`: mutable storage, snapshots, indices, diffs
//! - `wsmodel-listeners`: listener registry with revocation handles
//! - `wsmodel-entities`: project model kinds and relations
//! - this crate: [`WorkspaceModel`] and [`logging`]

pub mod logging;
pub mod workspace;

pub use wsmodel_core::{
    Cardinality, Entity, EntityBuilder, EntityData, EntityId, EntityKind, EntityRef,
    EntitySource, EntityType, EntityTypeInfo, EntityTypeRegistry, Error, NewEntity, OneToMany,
    OneToOne, ReferenceField, RelationDescriptor, Result, StorageConfig, StoreId, SymbolicId,
    Value, CONFIG_FILE_NAME,
};
pub use wsmodel_entities::{
    model_registry, ContentRoot, ContentRootEntity, ExternalSystemModuleOptions,
    ExternalSystemModuleOptionsEntity, Module, ModuleCustomImlData, ModuleCustomImlDataEntity,
    ModuleEntity, ModuleExtensions, ModuleGroupPath, ModuleGroupPathEntity, ModuleId,
    TestModuleProperties, TestModulePropertiesEntity, CONTENT_ROOTS, CUSTOM_IML_DATA,
    EX_MODULE_OPTIONS, GROUP_PATH, TEST_PROPERTIES,
};
pub use wsmodel_listeners::{ListenerHandle, ListenerList};
pub use wsmodel_storage::{
    diff_entities, AttributeChange, EntityChange, EntityView, MutableStorage, Snapshot,
    ENTITY_SOURCE_ATTRIBUTE,
};
pub use workspace::{VersionedChanges, WorkspaceModel, WorkspaceModelListener};

/// Everything needed to build and query a workspace model
pub mod prelude {
    pub use crate::{
        model_registry, EntityBuilder, EntitySource, EntityView, Module, ModuleExtensions,
        ModuleGroupPath, MutableStorage, Snapshot, WorkspaceModel,
    };
}
