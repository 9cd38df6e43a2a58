//! Publication and listener behavior of WorkspaceModel

use parking_lot::Mutex;
use std::sync::Arc;

use wsmodel::{
    model_registry, EntityChange, EntitySource, EntityView, Error, Module, ModuleExtensions,
    ModuleGroupPath, StorageConfig, VersionedChanges, WorkspaceModel, WorkspaceModelListener,
    CONFIG_FILE_NAME,
};

fn model() -> WorkspaceModel {
    let _ = tracing_subscriber::fmt::try_init();
    WorkspaceModel::new(model_registry().unwrap())
}

fn src(name: &str) -> EntitySource {
    EntitySource::new(name)
}

struct Recorder {
    tag: &'static str,
    log: Arc<Mutex<Vec<String>>>,
    events: Mutex<Vec<VersionedChanges>>,
}

impl Recorder {
    fn shared(tag: &'static str, log: &Arc<Mutex<Vec<String>>>) -> Arc<Self> {
        Arc::new(Self {
            tag,
            log: Arc::clone(log),
            events: Mutex::new(Vec::new()),
        })
    }
}

impl WorkspaceModelListener for Recorder {
    fn changed(&self, event: &VersionedChanges) {
        self.log.lock().push(format!("{}:{}", self.tag, event.description));
        self.events.lock().push(event.clone());
    }
}

#[test]
fn update_publishes_new_snapshot() {
    let model = model();
    let before = model.current();

    let module = model
        .update("Add module", |s| s.add_entity(Module::create("m", src("s"))?))
        .unwrap();

    let current = model.current();
    assert!(current.generation() > before.generation());
    assert_eq!(current.entity(module.id()), Some(module.clone()));
    assert!(!before.contains(module.id()));
}

#[test]
fn failed_update_publishes_nothing() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let recorder = Recorder::shared("r", &log);
    let model = model();
    model.add_listener(recorder.clone());
    let before = model.current();

    let err = model
        .update("Half done", |s| {
            s.add_entity(Module::create("m", src("s"))?)?;
            s.add_entity(Module::create("m", src("s"))?)
        })
        .unwrap_err();

    assert!(matches!(err, Error::DuplicateSymbolicId { .. }));
    assert_eq!(model.current().generation(), before.generation());
    assert!(model.current().is_empty());
    assert!(log.lock().is_empty());
}

#[test]
fn empty_update_publishes_nothing() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let model = model();
    model.add_listener(Recorder::shared("r", &log));

    let len = model.update("Read only", |s| Ok(s.len())).unwrap();
    assert_eq!(len, 0);
    assert!(log.lock().is_empty());
}

#[test]
fn initial_listeners_run_before_dynamic_ones() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let initial: Vec<Arc<dyn WorkspaceModelListener>> =
        vec![Recorder::shared("i1", &log), Recorder::shared("i2", &log)];
    let _ = tracing_subscriber::fmt::try_init();
    let model =
        WorkspaceModel::with_listeners(model_registry().unwrap(), StorageConfig::default(), initial);
    model.add_listener(Recorder::shared("d1", &log));
    model.add_listener(Recorder::shared("d2", &log));

    model
        .update("Add", |s| s.add_entity(Module::create("m", src("s"))?))
        .unwrap();

    assert_eq!(*log.lock(), vec!["i1:Add", "i2:Add", "d1:Add", "d2:Add"]);
}

#[test]
fn removed_listener_is_not_called() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let model = model();
    let keep = model.add_listener(Recorder::shared("keep", &log));
    let gone = model.add_listener(Recorder::shared("gone", &log));

    assert!(gone.remove());
    model
        .update("Add", |s| s.add_entity(Module::create("m", src("s"))?))
        .unwrap();

    assert_eq!(*log.lock(), vec!["keep:Add"]);
    assert!(keep.remove());
    assert!(model.listeners().is_empty());
}

#[test]
fn event_carries_both_snapshots_and_changes() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let recorder = Recorder::shared("r", &log);
    let model = model();
    model.add_listener(recorder.clone());

    let module = model
        .update("Add module", |s| s.add_entity(Module::create("m", src("s"))?))
        .unwrap();
    model
        .update("Remove module", |s| {
            s.add_entity(ModuleGroupPath::create(vec!["g".into()], &module, src("s"))?)?;
            s.remove_entity(&module)
        })
        .unwrap();

    let events = recorder.events.lock();
    assert_eq!(events.len(), 2);

    let add = &events[0];
    assert_eq!(add.description, "Add module");
    assert!(add.before.is_empty());
    assert_eq!(add.after.entity(module.id()), Some(module.clone()));
    assert_eq!(add.changes.len(), 1);
    assert!(matches!(add.changes[0], EntityChange::Added { .. }));

    let remove = &events[1];
    assert_eq!(remove.before.generation(), add.after.generation());
    assert!(remove.after.is_empty());
    assert!(module.group_path(&remove.before).unwrap().is_none());
    let removed = remove
        .changes
        .iter()
        .filter(|c| matches!(c, EntityChange::Removed { .. }))
        .count();
    assert_eq!(removed, 2);
}

#[test]
fn readers_keep_their_snapshot() {
    let model = model();
    let module = model
        .update("Add", |s| s.add_entity(Module::create("m", src("s"))?))
        .unwrap();
    let reader = model.current();

    model.update("Remove", |s| s.remove_entity(&module)).unwrap();

    assert_eq!(reader.entity(module.id()), Some(module));
    assert!(model.current().is_empty());
}

#[test]
fn record_from_failed_update_stays_dead() {
    let model = model();
    let mut escaped = None;
    model
        .update("Fails", |s| {
            let module = s.add_entity(Module::create("m", src("s"))?)?;
            escaped = Some(module);
            s.add_entity(Module::create("m", src("s"))?)
        })
        .unwrap_err();
    let escaped = escaped.unwrap();

    let fresh = model
        .update("Add", |s| s.add_entity(Module::create("n", src("s"))?))
        .unwrap();
    assert_ne!(fresh.id(), escaped.id());

    let err = model
        .update("Stale", |s| s.remove_entity(&escaped))
        .unwrap_err();
    assert!(matches!(err, Error::EntityNotFound { .. }));
    assert_eq!(model.current().entity(fresh.id()), Some(fresh));
}

#[test]
fn concurrent_updates_are_serialized() {
    let model = model();
    std::thread::scope(|scope| {
        for t in 0..4 {
            let model = &model;
            scope.spawn(move || {
                for i in 0..25 {
                    model
                        .update("Add", |s| {
                            s.add_entity(Module::create(format!("m{}-{}", t, i), src("s"))?)
                        })
                        .unwrap();
                }
            });
        }
    });
    assert_eq!(model.current().len(), 100);
}

#[test]
fn open_writes_default_config() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("workspace");

    let model = WorkspaceModel::open(&root, model_registry().unwrap()).unwrap();
    assert!(root.join(CONFIG_FILE_NAME).exists());
    assert_eq!(model.current().config(), &StorageConfig::default());
}

#[test]
fn open_reads_existing_config() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        "check_references = false\nmax_cascade_depth = 8\n",
    )
    .unwrap();

    let model = WorkspaceModel::open(dir.path(), model_registry().unwrap()).unwrap();
    let config = model.current().config().clone();
    assert!(!config.check_references);
    assert_eq!(config.max_cascade_depth, 8);
}

#[test]
fn open_rejects_bad_config() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(CONFIG_FILE_NAME), "max_cascade_depth = 0\n").unwrap();

    let err = WorkspaceModel::open(dir.path(), model_registry().unwrap()).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}
