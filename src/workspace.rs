//! Workspace model: the published snapshot plus change listeners
//!
//! Readers take the current [`Snapshot`] and keep it as long as they like;
//! it never changes. Writers go through [`WorkspaceModel::update`], which
//! runs a closure against a [`MutableStorage`] derived from the current
//! snapshot and, on success, publishes the result and notifies listeners.
//!
//! Writers are serialized: only one `update` runs at a time. Listeners are
//! called on the writer's thread after publication, while the writer lock
//! is still held, so they observe updates in order. A listener must not
//! call `update` itself.

use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use wsmodel_core::{EntityTypeRegistry, Error, Result, StorageConfig, CONFIG_FILE_NAME};
use wsmodel_listeners::{ListenerHandle, ListenerList};
use wsmodel_storage::{EntityChange, EntityView, MutableStorage, Snapshot};

/// One published update
#[derive(Debug, Clone)]
pub struct VersionedChanges {
    /// Description passed to `update`
    pub description: String,
    /// Snapshot before the update
    pub before: Snapshot,
    /// Snapshot published by the update
    pub after: Snapshot,
    /// Entity changes between the two
    pub changes: Vec<EntityChange>,
}

/// Observer of published updates
pub trait WorkspaceModelListener: Send + Sync {
    /// Called once per published update
    fn changed(&self, event: &VersionedChanges);
}

/// Current snapshot of a workspace and its change listeners
pub struct WorkspaceModel {
    current: RwLock<Snapshot>,
    writer: Mutex<()>,
    listeners: ListenerList<Arc<dyn WorkspaceModelListener>>,
}

impl WorkspaceModel {
    /// Create an empty model with default configuration
    pub fn new(registry: EntityTypeRegistry) -> Self {
        Self::with_config(registry, StorageConfig::default())
    }

    /// Create an empty model with explicit configuration
    pub fn with_config(registry: EntityTypeRegistry, config: StorageConfig) -> Self {
        Self::with_listeners(registry, config, Vec::new())
    }

    /// Create an empty model with a fixed set of initial listeners
    ///
    /// Initial listeners are always notified before dynamically added ones.
    pub fn with_listeners(
        registry: EntityTypeRegistry,
        config: StorageConfig,
        initial: Vec<Arc<dyn WorkspaceModelListener>>,
    ) -> Self {
        let snapshot = MutableStorage::with_config(registry, config).to_snapshot();
        Self {
            current: RwLock::new(snapshot),
            writer: Mutex::new(()),
            listeners: ListenerList::new(initial),
        }
    }

    /// Create an empty model configured from `wsmodel.toml` in `dir`
    ///
    /// The directory and a default config file are created if missing.
    ///
    /// # Errors
    ///
    /// `Config` if the directory or file cannot be created, read or parsed.
    pub fn open<P: AsRef<Path>>(dir: P, registry: EntityTypeRegistry) -> Result<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|e| {
            Error::Config(format!(
                "Failed to create directory '{}': {}",
                dir.display(),
                e
            ))
        })?;

        let config_path = dir.join(CONFIG_FILE_NAME);
        StorageConfig::write_default_if_missing(&config_path)?;
        let config = StorageConfig::from_file(&config_path)?;
        info!(
            target: "wsmodel::model",
            path = %config_path.display(),
            check_references = config.check_references,
            "Workspace model opened"
        );
        Ok(Self::with_config(registry, config))
    }

    /// The currently published snapshot
    pub fn current(&self) -> Snapshot {
        self.current.read().clone()
    }

    /// Register a listener after the initial ones
    pub fn add_listener(&self, listener: Arc<dyn WorkspaceModelListener>) -> ListenerHandle {
        self.listeners.add_listener(listener)
    }

    /// Listener registry
    pub fn listeners(&self) -> &ListenerList<Arc<dyn WorkspaceModelListener>> {
        &self.listeners
    }

    /// Apply `f` to a storage derived from the current snapshot and publish
    ///
    /// On error nothing is published and no listener is called. An update
    /// that performs no mutation publishes nothing either.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let module = model.update("Add module", |storage| {
    ///     storage.add_entity(Module::create("core", EntitySource::new("manual"))?)
    /// })?;
    /// ```
    pub fn update<T>(
        &self,
        description: &str,
        f: impl FnOnce(&mut MutableStorage) -> Result<T>,
    ) -> Result<T> {
        let _writer = self.writer.lock();
        let before = self.current();
        let mut storage = MutableStorage::from_snapshot(&before);

        let value = match f(&mut storage) {
            Ok(value) => value,
            Err(e) => {
                warn!(
                    target: "wsmodel::model",
                    description,
                    error = %e,
                    "Update failed, nothing published"
                );
                return Err(e);
            }
        };

        if storage.generation() == before.generation() {
            debug!(target: "wsmodel::model", description, "Update made no changes");
            return Ok(value);
        }

        let changes = storage.collect_changes();
        let after = storage.to_snapshot();
        *self.current.write() = after.clone();
        info!(
            target: "wsmodel::model",
            description,
            generation = after.generation(),
            changes = changes.len(),
            "Snapshot published"
        );

        let event = VersionedChanges {
            description: description.to_string(),
            before,
            after,
            changes,
        };
        for listener in self.listeners.listeners() {
            listener.changed(&event);
        }
        Ok(value)
    }
}

impl fmt::Debug for WorkspaceModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkspaceModel")
            .field("current", &*self.current.read())
            .field("listeners", &self.listeners)
            .finish()
    }
}
