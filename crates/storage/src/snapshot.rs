//! Immutable snapshot of the entity graph
//!
//! A `Snapshot` is produced by [`MutableStorage::to_snapshot`] and never
//! changes afterwards. It shares its entity map and indices with the storage
//! it came from through `Arc`s; the storage copies a component on its first
//! write after the snapshot was taken.
//!
//! # Design Notes
//!
//! - **O(1) creation**: cloning the state only bumps reference counts
//! - **Immutable**: no method takes `&mut self`
//! - **Thread-safe**: `Send + Sync`, readable from any number of threads
//! - **Lineage-bound**: records from other lineages are rejected
//!
//! [`MutableStorage::to_snapshot`]: crate::MutableStorage::to_snapshot

use std::fmt;
use std::sync::Arc;

use wsmodel_core::{EntityTypeRegistry, StorageConfig};

use crate::state::GraphState;
use crate::view::EntityView;

/// A read-only view of one generation of the entity graph
///
/// # Example
///
/// ```ignore
/// let snapshot = storage.to_snapshot();
/// storage.modify_entity(&module, |b| b.set_module_type(Some("JAVA_MODULE".into())))?;
///
/// // Writes after snapshot creation are not visible
/// assert_eq!(snapshot.entity::<Module>(module.id()).unwrap(), module);
/// ```
#[derive(Clone)]
pub struct Snapshot {
    state: GraphState,
    registry: Arc<EntityTypeRegistry>,
    config: Arc<StorageConfig>,
}

impl Snapshot {
    pub(crate) fn new(
        state: GraphState,
        registry: Arc<EntityTypeRegistry>,
        config: Arc<StorageConfig>,
    ) -> Self {
        Self {
            state,
            registry,
            config,
        }
    }

    /// Configuration inherited by storages derived from this snapshot
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    pub(crate) fn shared_registry(&self) -> &Arc<EntityTypeRegistry> {
        &self.registry
    }

    pub(crate) fn shared_config(&self) -> &Arc<StorageConfig> {
        &self.config
    }
}

impl EntityView for Snapshot {
    fn state(&self) -> &GraphState {
        &self.state
    }

    fn registry(&self) -> &EntityTypeRegistry {
        &self.registry
    }
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("store_id", &self.state.store_id())
            .field("generation", &self.state.generation())
            .field("entities", &self.state.len())
            .finish()
    }
}
