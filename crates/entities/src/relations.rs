//! Relation extensions of the project model
//!
//! Relations are resolved by lookup against a storage or snapshot, never
//! stored in the module record. [`ModuleExtensions`] gives them the
//! accessor shape `module.group_path(&snapshot)`.

use wsmodel_core::{EntityTypeRegistry, OneToMany, OneToOne, Result};
use wsmodel_storage::EntityView;

use crate::content_root::{ContentRoot, ContentRootEntity};
use crate::extensions::{
    ExternalSystemModuleOptions, ExternalSystemModuleOptionsEntity, ModuleCustomImlData,
    ModuleCustomImlDataEntity, ModuleGroupPath, ModuleGroupPathEntity, TestModuleProperties,
    TestModulePropertiesEntity,
};
use crate::module::{Module, ModuleEntity};

/// `Module.customImlData`
pub const CUSTOM_IML_DATA: OneToOne<Module, ModuleCustomImlData> =
    OneToOne::new("customImlData", "module");

/// `Module.groupPath`
pub const GROUP_PATH: OneToOne<Module, ModuleGroupPath> = OneToOne::new("groupPath", "module");

/// `Module.exModuleOptions`
pub const EX_MODULE_OPTIONS: OneToOne<Module, ExternalSystemModuleOptions> =
    OneToOne::new("exModuleOptions", "module");

/// `Module.testProperties`
pub const TEST_PROPERTIES: OneToOne<Module, TestModuleProperties> =
    OneToOne::new("testProperties", "module");

/// `Module.contentRoots`
pub const CONTENT_ROOTS: OneToMany<Module, ContentRoot> = OneToMany::new("contentRoots", "module");

/// Registry with every project model kind and relation
///
/// # Errors
///
/// `InvalidRelation` if a relation does not match its kinds.
pub fn model_registry() -> Result<EntityTypeRegistry> {
    let mut registry = EntityTypeRegistry::new();
    registry
        .register::<Module>()
        .register::<ModuleCustomImlData>()
        .register::<ModuleGroupPath>()
        .register::<ExternalSystemModuleOptions>()
        .register::<TestModuleProperties>()
        .register::<ContentRoot>();

    registry.register_relation(CUSTOM_IML_DATA.descriptor())?;
    registry.register_relation(GROUP_PATH.descriptor())?;
    registry.register_relation(EX_MODULE_OPTIONS.descriptor())?;
    registry.register_relation(TEST_PROPERTIES.descriptor())?;
    registry.register_relation(CONTENT_ROOTS.descriptor())?;
    Ok(registry)
}

/// Relation accessors on a module record
///
/// Every accessor resolves against the given view. Absence is `Ok(None)`.
pub trait ModuleExtensions {
    /// `customImlData`
    fn custom_iml_data<V: EntityView>(&self, view: &V) -> Result<Option<ModuleCustomImlDataEntity>>;

    /// `groupPath`
    fn group_path<V: EntityView>(&self, view: &V) -> Result<Option<ModuleGroupPathEntity>>;

    /// `exModuleOptions`
    fn ex_module_options<V: EntityView>(
        &self,
        view: &V,
    ) -> Result<Option<ExternalSystemModuleOptionsEntity>>;

    /// `testProperties`
    fn test_properties<V: EntityView>(&self, view: &V) -> Result<Option<TestModulePropertiesEntity>>;

    /// `contentRoots`, in creation order
    fn content_roots<V: EntityView>(&self, view: &V) -> Result<Vec<ContentRootEntity>>;
}

impl ModuleExtensions for ModuleEntity {
    fn custom_iml_data<V: EntityView>(&self, view: &V) -> Result<Option<ModuleCustomImlDataEntity>> {
        view.resolve_one(self, &CUSTOM_IML_DATA)
    }

    fn group_path<V: EntityView>(&self, view: &V) -> Result<Option<ModuleGroupPathEntity>> {
        view.resolve_one(self, &GROUP_PATH)
    }

    fn ex_module_options<V: EntityView>(
        &self,
        view: &V,
    ) -> Result<Option<ExternalSystemModuleOptionsEntity>> {
        view.resolve_one(self, &EX_MODULE_OPTIONS)
    }

    fn test_properties<V: EntityView>(&self, view: &V) -> Result<Option<TestModulePropertiesEntity>> {
        view.resolve_one(self, &TEST_PROPERTIES)
    }

    fn content_roots<V: EntityView>(&self, view: &V) -> Result<Vec<ContentRootEntity>> {
        view.resolve_many(self, &CONTENT_ROOTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::{ModuleId, MODULE};
    use wsmodel_core::{Cardinality, EntitySource};
    use wsmodel_storage::MutableStorage;

    fn storage() -> MutableStorage {
        MutableStorage::new(model_registry().unwrap())
    }

    fn src(name: &str) -> EntitySource {
        EntitySource::new(name)
    }

    #[test]
    fn test_registry_is_complete() {
        let registry = model_registry().unwrap();
        assert_eq!(registry.len(), 6);
        let relations = registry.relations_of(MODULE);
        let names: Vec<_> = relations.iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            vec![
                "contentRoots",
                "customImlData",
                "exModuleOptions",
                "groupPath",
                "testProperties"
            ]
        );
        assert_eq!(
            registry.relation("contentRoots").unwrap().cardinality,
            Cardinality::OneToMany
        );
    }

    #[test]
    fn test_unset_extensions_are_absent() {
        let mut storage = storage();
        let module = storage.add_entity(Module::create("core", src("s")).unwrap()).unwrap();

        assert!(module.custom_iml_data(&storage).unwrap().is_none());
        assert!(module.group_path(&storage).unwrap().is_none());
        assert!(module.ex_module_options(&storage).unwrap().is_none());
        assert!(module.test_properties(&storage).unwrap().is_none());
        assert!(module.content_roots(&storage).unwrap().is_empty());
    }

    #[test]
    fn test_each_extension_resolves() {
        let mut storage = storage();
        let module = storage.add_entity(Module::create("app", src("s")).unwrap()).unwrap();
        let iml = storage
            .add_entity(ModuleCustomImlData::create(Default::default(), &module, src("s")).unwrap())
            .unwrap();
        let opts = storage
            .add_entity(ExternalSystemModuleOptions::create(&module, src("s")).unwrap())
            .unwrap();
        let props = storage
            .add_entity(
                TestModuleProperties::create(ModuleId::new("app.main"), &module, src("s")).unwrap(),
            )
            .unwrap();

        assert_eq!(module.custom_iml_data(&storage).unwrap(), Some(iml));
        assert_eq!(module.ex_module_options(&storage).unwrap(), Some(opts));
        assert_eq!(module.test_properties(&storage).unwrap(), Some(props));
        assert!(module.group_path(&storage).unwrap().is_none());
    }

    #[test]
    fn test_content_roots_in_creation_order() {
        let mut storage = storage();
        let module = storage.add_entity(Module::create("app", src("s")).unwrap()).unwrap();
        let a = storage
            .add_entity(ContentRoot::create("file:///a", &module, src("s")).unwrap())
            .unwrap();
        let b = storage
            .add_entity(
                ContentRoot::create_with("file:///b", &module, src("s"), |b| {
                    b.excluded_urls.push("file:///b/out".to_string());
                })
                .unwrap(),
            )
            .unwrap();

        let roots = module.content_roots(&storage).unwrap();
        assert_eq!(roots, vec![a, b]);
        assert_eq!(roots[1].excluded_urls(), &["file:///b/out".to_string()]);
    }

    #[test]
    fn test_extensions_of_other_module_not_visible() {
        let mut storage = storage();
        let app = storage.add_entity(Module::create("app", src("s")).unwrap()).unwrap();
        let lib = storage.add_entity(Module::create("lib", src("s")).unwrap()).unwrap();
        storage
            .add_entity(ModuleGroupPath::create(vec!["g".into()], &app, src("s")).unwrap())
            .unwrap();

        assert!(app.group_path(&storage).unwrap().is_some());
        assert!(lib.group_path(&storage).unwrap().is_none());
    }
}
