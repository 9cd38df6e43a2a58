//! One-to-one module extensions
//!
//! Each kind here hangs off a [`Module`](crate::Module) through its `module` reference and
//! is reachable from the module only through a relation extension
//! (`customImlData`, `groupPath`, `exModuleOptions`, `testProperties`).
//! A module has at most one of each.

use std::collections::BTreeMap;
use wsmodel_core::{
    Entity, EntityBuilder, EntityData, EntityKind, EntityRef, EntitySource, EntityType,
    EntityTypeInfo, Error, NewEntity, ReferenceField, Result, Value,
};

use crate::module::{ModuleEntity, ModuleId, MODULE};

/// Kind discriminator of [`ModuleCustomImlData`]
pub const CUSTOM_IML_DATA_KIND: EntityKind = EntityKind::new("ModuleCustomImlData");
/// Kind discriminator of [`ModuleGroupPath`]
pub const GROUP_PATH_KIND: EntityKind = EntityKind::new("ModuleGroupPath");
/// Kind discriminator of [`ExternalSystemModuleOptions`]
pub const EX_MODULE_OPTIONS_KIND: EntityKind = EntityKind::new("ExternalSystemModuleOptions");
/// Kind discriminator of [`TestModuleProperties`]
pub const TEST_PROPERTIES_KIND: EntityKind = EntityKind::new("TestModuleProperties");

const MODULE_REF: &[ReferenceField] = &[ReferenceField::required("module", MODULE)];

fn missing(kind: EntityKind, field: &'static str) -> Error {
    Error::MissingRequiredField { kind, field }
}

// =============================================================================
// ModuleCustomImlData
// =============================================================================

/// Attached custom iml data record
pub type ModuleCustomImlDataEntity = Entity<ModuleCustomImlData>;

/// Additional data stored with a module: custom module options and the
/// raw custom data of the root manager tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleCustomImlData {
    source: EntitySource,
    module: EntityRef,
    root_manager_tag_custom_data: Option<String>,
    custom_module_options: BTreeMap<String, String>,
}

impl ModuleCustomImlData {
    /// Create custom iml data for `module`
    ///
    /// # Errors
    ///
    /// Never fails in practice; see [`create_with`](Self::create_with).
    pub fn create(
        custom_module_options: BTreeMap<String, String>,
        module: &ModuleEntity,
        source: EntitySource,
    ) -> Result<NewEntity<Self>> {
        Self::create_with(custom_module_options, module, source, |_| {})
    }

    /// Create custom iml data, customizing the builder before finalizing
    ///
    /// # Errors
    ///
    /// `MissingRequiredField` if `init` leaves a required field unset.
    pub fn create_with(
        custom_module_options: BTreeMap<String, String>,
        module: &ModuleEntity,
        source: EntitySource,
        init: impl FnOnce(&mut ModuleCustomImlDataBuilder),
    ) -> Result<NewEntity<Self>> {
        let mut builder = ModuleCustomImlDataBuilder::default();
        builder.set_custom_module_options(custom_module_options);
        builder.set_module(module);
        builder.set_entity_source(source);
        NewEntity::finalize(builder, init)
    }

    /// Owning module
    pub fn module(&self) -> EntityRef {
        self.module
    }

    /// Raw custom data of the root manager tag
    pub fn root_manager_tag_custom_data(&self) -> Option<&str> {
        self.root_manager_tag_custom_data.as_deref()
    }

    /// Custom module options
    pub fn custom_module_options(&self) -> &BTreeMap<String, String> {
        &self.custom_module_options
    }
}

impl EntityData for ModuleCustomImlData {
    fn kind(&self) -> EntityKind {
        CUSTOM_IML_DATA_KIND
    }

    fn entity_source(&self) -> &EntitySource {
        &self.source
    }

    fn attributes(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("module", Value::Ref(self.module.id)),
            (
                "rootManagerTagCustomData",
                Value::from(self.root_manager_tag_custom_data.clone()),
            ),
            (
                "customModuleOptions",
                Value::from(self.custom_module_options.clone()),
            ),
        ]
    }

    fn references(&self) -> Vec<(&'static str, EntityRef)> {
        vec![("module", self.module)]
    }

    any_upcasts!();
}

impl EntityType for ModuleCustomImlData {
    type Builder = ModuleCustomImlDataBuilder;
    const KIND: EntityKind = CUSTOM_IML_DATA_KIND;

    fn type_info() -> EntityTypeInfo {
        EntityTypeInfo::new(
            CUSTOM_IML_DATA_KIND,
            &["customModuleOptions", "module"],
            MODULE_REF,
        )
    }

    fn to_builder(&self) -> ModuleCustomImlDataBuilder {
        ModuleCustomImlDataBuilder {
            source: Some(self.source.clone()),
            module: Some(self.module),
            root_manager_tag_custom_data: self.root_manager_tag_custom_data.clone(),
            custom_module_options: Some(self.custom_module_options.clone()),
        }
    }
}

/// Builder for [`ModuleCustomImlData`]
#[derive(Debug, Clone, Default)]
pub struct ModuleCustomImlDataBuilder {
    source: Option<EntitySource>,
    module: Option<EntityRef>,
    root_manager_tag_custom_data: Option<String>,
    custom_module_options: Option<BTreeMap<String, String>>,
}

impl ModuleCustomImlDataBuilder {
    /// Staged owning module
    pub fn module(&self) -> Option<EntityRef> {
        self.module
    }

    /// Attach to a module
    pub fn set_module(&mut self, module: &ModuleEntity) {
        self.module = Some(module.entity_ref());
    }

    /// Staged root manager tag data
    pub fn root_manager_tag_custom_data(&self) -> Option<&str> {
        self.root_manager_tag_custom_data.as_deref()
    }

    /// Set or clear the root manager tag data
    pub fn set_root_manager_tag_custom_data(&mut self, data: Option<String>) {
        self.root_manager_tag_custom_data = data;
    }

    /// Staged custom module options
    pub fn custom_module_options(&self) -> Option<&BTreeMap<String, String>> {
        self.custom_module_options.as_ref()
    }

    /// Replace the custom module options
    pub fn set_custom_module_options(&mut self, options: BTreeMap<String, String>) {
        self.custom_module_options = Some(options);
    }

    /// Mutable access to the custom module options, creating them if unset
    pub fn custom_module_options_mut(&mut self) -> &mut BTreeMap<String, String> {
        self.custom_module_options.get_or_insert_with(BTreeMap::new)
    }
}

impl EntityBuilder for ModuleCustomImlDataBuilder {
    type Target = ModuleCustomImlData;

    fn entity_source(&self) -> Option<&EntitySource> {
        self.source.as_ref()
    }

    fn set_entity_source(&mut self, source: EntitySource) {
        self.source = Some(source);
    }

    fn build(self) -> Result<ModuleCustomImlData> {
        let kind = CUSTOM_IML_DATA_KIND;
        Ok(ModuleCustomImlData {
            source: self.source.ok_or_else(|| missing(kind, "entitySource"))?,
            module: self.module.ok_or_else(|| missing(kind, "module"))?,
            root_manager_tag_custom_data: self.root_manager_tag_custom_data,
            custom_module_options: self
                .custom_module_options
                .ok_or_else(|| missing(kind, "customModuleOptions"))?,
        })
    }
}

// =============================================================================
// ModuleGroupPath
// =============================================================================

/// Attached group path record
pub type ModuleGroupPathEntity = Entity<ModuleGroupPath>;

/// Explicit module group of a module, outermost group first
///
/// Explicit module groups are deprecated; kept for compatibility only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleGroupPath {
    source: EntitySource,
    module: EntityRef,
    path: Vec<String>,
}

impl ModuleGroupPath {
    /// Create a group path for `module`
    ///
    /// # Errors
    ///
    /// Never fails in practice; see [`create_with`](Self::create_with).
    pub fn create(
        path: Vec<String>,
        module: &ModuleEntity,
        source: EntitySource,
    ) -> Result<NewEntity<Self>> {
        Self::create_with(path, module, source, |_| {})
    }

    /// Create a group path, customizing the builder before finalizing
    ///
    /// # Errors
    ///
    /// `MissingRequiredField` if `init` leaves a required field unset.
    pub fn create_with(
        path: Vec<String>,
        module: &ModuleEntity,
        source: EntitySource,
        init: impl FnOnce(&mut ModuleGroupPathBuilder),
    ) -> Result<NewEntity<Self>> {
        let mut builder = ModuleGroupPathBuilder::default();
        builder.set_path(path);
        builder.set_module(module);
        builder.set_entity_source(source);
        NewEntity::finalize(builder, init)
    }

    /// Owning module
    pub fn module(&self) -> EntityRef {
        self.module
    }

    /// Group path
    pub fn path(&self) -> &[String] {
        &self.path
    }
}

impl EntityData for ModuleGroupPath {
    fn kind(&self) -> EntityKind {
        GROUP_PATH_KIND
    }

    fn entity_source(&self) -> &EntitySource {
        &self.source
    }

    fn attributes(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("module", Value::Ref(self.module.id)),
            ("path", Value::from(self.path.clone())),
        ]
    }

    fn references(&self) -> Vec<(&'static str, EntityRef)> {
        vec![("module", self.module)]
    }

    any_upcasts!();
}

impl EntityType for ModuleGroupPath {
    type Builder = ModuleGroupPathBuilder;
    const KIND: EntityKind = GROUP_PATH_KIND;

    fn type_info() -> EntityTypeInfo {
        EntityTypeInfo::new(GROUP_PATH_KIND, &["path", "module"], MODULE_REF)
    }

    fn to_builder(&self) -> ModuleGroupPathBuilder {
        ModuleGroupPathBuilder {
            source: Some(self.source.clone()),
            module: Some(self.module),
            path: Some(self.path.clone()),
        }
    }
}

/// Builder for [`ModuleGroupPath`]
#[derive(Debug, Clone, Default)]
pub struct ModuleGroupPathBuilder {
    source: Option<EntitySource>,
    module: Option<EntityRef>,
    path: Option<Vec<String>>,
}

impl ModuleGroupPathBuilder {
    /// Staged owning module
    pub fn module(&self) -> Option<EntityRef> {
        self.module
    }

    /// Attach to a module
    pub fn set_module(&mut self, module: &ModuleEntity) {
        self.module = Some(module.entity_ref());
    }

    /// Staged path
    pub fn path(&self) -> Option<&[String]> {
        self.path.as_deref()
    }

    /// Replace the path
    pub fn set_path(&mut self, path: Vec<String>) {
        self.path = Some(path);
    }

    /// Mutable access to the path, creating it if unset
    pub fn path_mut(&mut self) -> &mut Vec<String> {
        self.path.get_or_insert_with(Vec::new)
    }
}

impl EntityBuilder for ModuleGroupPathBuilder {
    type Target = ModuleGroupPath;

    fn entity_source(&self) -> Option<&EntitySource> {
        self.source.as_ref()
    }

    fn set_entity_source(&mut self, source: EntitySource) {
        self.source = Some(source);
    }

    fn build(self) -> Result<ModuleGroupPath> {
        let kind = GROUP_PATH_KIND;
        Ok(ModuleGroupPath {
            source: self.source.ok_or_else(|| missing(kind, "entitySource"))?,
            module: self.module.ok_or_else(|| missing(kind, "module"))?,
            path: self.path.ok_or_else(|| missing(kind, "path"))?,
        })
    }
}

// =============================================================================
// ExternalSystemModuleOptions
// =============================================================================

/// Attached external system options record
pub type ExternalSystemModuleOptionsEntity = Entity<ExternalSystemModuleOptions>;

/// Options of a module imported from an external project system
/// (Maven, Gradle, ...)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalSystemModuleOptions {
    source: EntitySource,
    module: EntityRef,
    external_system: Option<String>,
    external_system_module_version: Option<String>,
    linked_project_path: Option<String>,
    linked_project_id: Option<String>,
    root_project_path: Option<String>,
    external_system_module_group: Option<String>,
    external_system_module_type: Option<String>,
}

impl ExternalSystemModuleOptions {
    /// Create empty external system options for `module`
    ///
    /// # Errors
    ///
    /// Never fails in practice; see [`create_with`](Self::create_with).
    pub fn create(module: &ModuleEntity, source: EntitySource) -> Result<NewEntity<Self>> {
        Self::create_with(module, source, |_| {})
    }

    /// Create external system options, customizing the builder before
    /// finalizing
    ///
    /// # Errors
    ///
    /// `MissingRequiredField` if `init` leaves a required field unset.
    pub fn create_with(
        module: &ModuleEntity,
        source: EntitySource,
        init: impl FnOnce(&mut ExternalSystemModuleOptionsBuilder),
    ) -> Result<NewEntity<Self>> {
        let mut builder = ExternalSystemModuleOptionsBuilder::default();
        builder.set_module(module);
        builder.set_entity_source(source);
        NewEntity::finalize(builder, init)
    }

    /// Owning module
    pub fn module(&self) -> EntityRef {
        self.module
    }

    /// External system id (`GRADLE`, `Maven`, ...)
    pub fn external_system(&self) -> Option<&str> {
        self.external_system.as_deref()
    }

    /// Module version reported by the external system
    pub fn external_system_module_version(&self) -> Option<&str> {
        self.external_system_module_version.as_deref()
    }

    /// Path of the linked external project
    pub fn linked_project_path(&self) -> Option<&str> {
        self.linked_project_path.as_deref()
    }

    /// Id of the linked external project
    pub fn linked_project_id(&self) -> Option<&str> {
        self.linked_project_id.as_deref()
    }

    /// Path of the root external project
    pub fn root_project_path(&self) -> Option<&str> {
        self.root_project_path.as_deref()
    }

    /// Module group in the external system
    pub fn external_system_module_group(&self) -> Option<&str> {
        self.external_system_module_group.as_deref()
    }

    /// Module type in the external system
    pub fn external_system_module_type(&self) -> Option<&str> {
        self.external_system_module_type.as_deref()
    }
}

impl EntityData for ExternalSystemModuleOptions {
    fn kind(&self) -> EntityKind {
        EX_MODULE_OPTIONS_KIND
    }

    fn entity_source(&self) -> &EntitySource {
        &self.source
    }

    fn attributes(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("module", Value::Ref(self.module.id)),
            ("externalSystem", Value::from(self.external_system.clone())),
            (
                "externalSystemModuleVersion",
                Value::from(self.external_system_module_version.clone()),
            ),
            (
                "linkedProjectPath",
                Value::from(self.linked_project_path.clone()),
            ),
            ("linkedProjectId", Value::from(self.linked_project_id.clone())),
            ("rootProjectPath", Value::from(self.root_project_path.clone())),
            (
                "externalSystemModuleGroup",
                Value::from(self.external_system_module_group.clone()),
            ),
            (
                "externalSystemModuleType",
                Value::from(self.external_system_module_type.clone()),
            ),
        ]
    }

    fn references(&self) -> Vec<(&'static str, EntityRef)> {
        vec![("module", self.module)]
    }

    any_upcasts!();
}

impl EntityType for ExternalSystemModuleOptions {
    type Builder = ExternalSystemModuleOptionsBuilder;
    const KIND: EntityKind = EX_MODULE_OPTIONS_KIND;

    fn type_info() -> EntityTypeInfo {
        EntityTypeInfo::new(EX_MODULE_OPTIONS_KIND, &["module"], MODULE_REF)
    }

    fn to_builder(&self) -> ExternalSystemModuleOptionsBuilder {
        ExternalSystemModuleOptionsBuilder {
            source: Some(self.source.clone()),
            module: Some(self.module),
            external_system: self.external_system.clone(),
            external_system_module_version: self.external_system_module_version.clone(),
            linked_project_path: self.linked_project_path.clone(),
            linked_project_id: self.linked_project_id.clone(),
            root_project_path: self.root_project_path.clone(),
            external_system_module_group: self.external_system_module_group.clone(),
            external_system_module_type: self.external_system_module_type.clone(),
        }
    }
}

/// Builder for [`ExternalSystemModuleOptions`]
///
/// Every option is optional and starts unset.
#[derive(Debug, Clone, Default)]
pub struct ExternalSystemModuleOptionsBuilder {
    source: Option<EntitySource>,
    module: Option<EntityRef>,
    external_system: Option<String>,
    external_system_module_version: Option<String>,
    linked_project_path: Option<String>,
    linked_project_id: Option<String>,
    root_project_path: Option<String>,
    external_system_module_group: Option<String>,
    external_system_module_type: Option<String>,
}

impl ExternalSystemModuleOptionsBuilder {
    /// Staged owning module
    pub fn module(&self) -> Option<EntityRef> {
        self.module
    }

    /// Attach to a module
    pub fn set_module(&mut self, module: &ModuleEntity) {
        self.module = Some(module.entity_ref());
    }

    /// External system id
    pub fn external_system(&self) -> Option<&str> {
        self.external_system.as_deref()
    }

    /// Set or clear [`external_system`](Self::external_system)
    pub fn set_external_system(&mut self, value: Option<String>) {
        self.external_system = value;
    }

    /// Module version reported by the external system
    pub fn external_system_module_version(&self) -> Option<&str> {
        self.external_system_module_version.as_deref()
    }

    /// Set or clear [`external_system_module_version`](Self::external_system_module_version)
    pub fn set_external_system_module_version(&mut self, value: Option<String>) {
        self.external_system_module_version = value;
    }

    /// Path of the linked external project
    pub fn linked_project_path(&self) -> Option<&str> {
        self.linked_project_path.as_deref()
    }

    /// Set or clear [`linked_project_path`](Self::linked_project_path)
    pub fn set_linked_project_path(&mut self, value: Option<String>) {
        self.linked_project_path = value;
    }

    /// Id of the linked external project
    pub fn linked_project_id(&self) -> Option<&str> {
        self.linked_project_id.as_deref()
    }

    /// Set or clear [`linked_project_id`](Self::linked_project_id)
    pub fn set_linked_project_id(&mut self, value: Option<String>) {
        self.linked_project_id = value;
    }

    /// Path of the root external project
    pub fn root_project_path(&self) -> Option<&str> {
        self.root_project_path.as_deref()
    }

    /// Set or clear [`root_project_path`](Self::root_project_path)
    pub fn set_root_project_path(&mut self, value: Option<String>) {
        self.root_project_path = value;
    }

    /// Module group in the external system
    pub fn external_system_module_group(&self) -> Option<&str> {
        self.external_system_module_group.as_deref()
    }

    /// Set or clear [`external_system_module_group`](Self::external_system_module_group)
    pub fn set_external_system_module_group(&mut self, value: Option<String>) {
        self.external_system_module_group = value;
    }

    /// Module type in the external system
    pub fn external_system_module_type(&self) -> Option<&str> {
        self.external_system_module_type.as_deref()
    }

    /// Set or clear [`external_system_module_type`](Self::external_system_module_type)
    pub fn set_external_system_module_type(&mut self, value: Option<String>) {
        self.external_system_module_type = value;
    }
}

impl EntityBuilder for ExternalSystemModuleOptionsBuilder {
    type Target = ExternalSystemModuleOptions;

    fn entity_source(&self) -> Option<&EntitySource> {
        self.source.as_ref()
    }

    fn set_entity_source(&mut self, source: EntitySource) {
        self.source = Some(source);
    }

    fn build(self) -> Result<ExternalSystemModuleOptions> {
        let kind = EX_MODULE_OPTIONS_KIND;
        Ok(ExternalSystemModuleOptions {
            source: self.source.ok_or_else(|| missing(kind, "entitySource"))?,
            module: self.module.ok_or_else(|| missing(kind, "module"))?,
            external_system: self.external_system,
            external_system_module_version: self.external_system_module_version,
            linked_project_path: self.linked_project_path,
            linked_project_id: self.linked_project_id,
            root_project_path: self.root_project_path,
            external_system_module_group: self.external_system_module_group,
            external_system_module_type: self.external_system_module_type,
        })
    }
}

// =============================================================================
// TestModuleProperties
// =============================================================================

/// Attached test module properties record
pub type TestModulePropertiesEntity = Entity<TestModuleProperties>;

/// Marks a module as the test module of a production module
///
/// The production module is referenced by [`ModuleId`], not by entity
/// reference, so it may be absent or re-created without touching this
/// entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestModuleProperties {
    source: EntitySource,
    module: EntityRef,
    production_module_id: ModuleId,
}

impl TestModuleProperties {
    /// Mark `module` as the test module of `production_module_id`
    ///
    /// # Errors
    ///
    /// Never fails in practice; see [`create_with`](Self::create_with).
    pub fn create(
        production_module_id: ModuleId,
        module: &ModuleEntity,
        source: EntitySource,
    ) -> Result<NewEntity<Self>> {
        Self::create_with(production_module_id, module, source, |_| {})
    }

    /// Create test module properties, customizing the builder before
    /// finalizing
    ///
    /// # Errors
    ///
    /// `MissingRequiredField` if `init` leaves a required field unset.
    pub fn create_with(
        production_module_id: ModuleId,
        module: &ModuleEntity,
        source: EntitySource,
        init: impl FnOnce(&mut TestModulePropertiesBuilder),
    ) -> Result<NewEntity<Self>> {
        let mut builder = TestModulePropertiesBuilder::default();
        builder.set_production_module_id(production_module_id);
        builder.set_module(module);
        builder.set_entity_source(source);
        NewEntity::finalize(builder, init)
    }

    /// Owning (test) module
    pub fn module(&self) -> EntityRef {
        self.module
    }

    /// Production module under test
    pub fn production_module_id(&self) -> &ModuleId {
        &self.production_module_id
    }
}

impl EntityData for TestModuleProperties {
    fn kind(&self) -> EntityKind {
        TEST_PROPERTIES_KIND
    }

    fn entity_source(&self) -> &EntitySource {
        &self.source
    }

    fn attributes(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("module", Value::Ref(self.module.id)),
            (
                "productionModuleId",
                Value::from(self.production_module_id.name()),
            ),
        ]
    }

    fn references(&self) -> Vec<(&'static str, EntityRef)> {
        vec![("module", self.module)]
    }

    any_upcasts!();
}

impl EntityType for TestModuleProperties {
    type Builder = TestModulePropertiesBuilder;
    const KIND: EntityKind = TEST_PROPERTIES_KIND;

    fn type_info() -> EntityTypeInfo {
        EntityTypeInfo::new(
            TEST_PROPERTIES_KIND,
            &["productionModuleId", "module"],
            MODULE_REF,
        )
    }

    fn to_builder(&self) -> TestModulePropertiesBuilder {
        TestModulePropertiesBuilder {
            source: Some(self.source.clone()),
            module: Some(self.module),
            production_module_id: Some(self.production_module_id.clone()),
        }
    }
}

/// Builder for [`TestModuleProperties`]
#[derive(Debug, Clone, Default)]
pub struct TestModulePropertiesBuilder {
    source: Option<EntitySource>,
    module: Option<EntityRef>,
    production_module_id: Option<ModuleId>,
}

impl TestModulePropertiesBuilder {
    /// Staged owning module
    pub fn module(&self) -> Option<EntityRef> {
        self.module
    }

    /// Attach to a module
    pub fn set_module(&mut self, module: &ModuleEntity) {
        self.module = Some(module.entity_ref());
    }

    /// Staged production module
    pub fn production_module_id(&self) -> Option<&ModuleId> {
        self.production_module_id.as_ref()
    }

    /// Set the production module
    pub fn set_production_module_id(&mut self, id: ModuleId) {
        self.production_module_id = Some(id);
    }
}

impl EntityBuilder for TestModulePropertiesBuilder {
    type Target = TestModuleProperties;

    fn entity_source(&self) -> Option<&EntitySource> {
        self.source.as_ref()
    }

    fn set_entity_source(&mut self, source: EntitySource) {
        self.source = Some(source);
    }

    fn build(self) -> Result<TestModuleProperties> {
        let kind = TEST_PROPERTIES_KIND;
        Ok(TestModuleProperties {
            source: self.source.ok_or_else(|| missing(kind, "entitySource"))?,
            module: self.module.ok_or_else(|| missing(kind, "module"))?,
            production_module_id: self
                .production_module_id
                .ok_or_else(|| missing(kind, "productionModuleId"))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::Module;
    use wsmodel_core::{EntityId, StoreId};

    fn module() -> ModuleEntity {
        let data = Module::create("core", EntitySource::new("s"))
            .unwrap()
            .into_data();
        Entity::from_parts(
            EntityRef::new(StoreId::new(), EntityId::new(1)),
            std::sync::Arc::new(data),
        )
    }

    fn options(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_custom_iml_data_factory() {
        let module = module();
        let data = ModuleCustomImlData::create_with(
            options(&[("type", "JAVA")]),
            &module,
            EntitySource::new("iml"),
            |b| b.set_root_manager_tag_custom_data(Some("<tag/>".to_string())),
        )
        .unwrap();

        assert_eq!(data.module(), module.entity_ref());
        assert_eq!(data.custom_module_options(), &options(&[("type", "JAVA")]));
        assert_eq!(data.root_manager_tag_custom_data(), Some("<tag/>"));
        assert_eq!(data.references(), vec![("module", module.entity_ref())]);
    }

    #[test]
    fn test_group_path_factory() {
        let module = module();
        let group = ModuleGroupPath::create(
            vec!["a".to_string(), "b".to_string()],
            &module,
            EntitySource::new("s2"),
        )
        .unwrap();
        assert_eq!(group.path(), &["a".to_string(), "b".to_string()]);
        assert_eq!(group.entity_source().as_str(), "s2");
    }

    #[test]
    fn test_external_options_default_to_none() {
        let module = module();
        let opts = ExternalSystemModuleOptions::create_with(&module, EntitySource::new("gradle"), |b| {
            b.set_external_system(Some("GRADLE".to_string()));
            b.set_linked_project_path(Some("/work/app".to_string()));
        })
        .unwrap();
        assert_eq!(opts.external_system(), Some("GRADLE"));
        assert_eq!(opts.linked_project_path(), Some("/work/app"));
        assert_eq!(opts.linked_project_id(), None);
        assert_eq!(opts.external_system_module_type(), None);
        assert_eq!(opts.attributes().len(), 8);
    }

    #[test]
    fn test_external_options_builder_round_trips() {
        let module = module();
        let opts = ExternalSystemModuleOptions::create_with(&module, EntitySource::new("gradle"), |b| {
            b.set_external_system(Some("GRADLE".to_string()));
            b.set_linked_project_id(Some("app".to_string()));
            b.set_root_project_path(Some("/work".to_string()));
        })
        .unwrap();

        let mut builder = opts.to_builder();
        assert_eq!(builder.external_system(), Some("GRADLE"));
        assert_eq!(builder.linked_project_id(), Some("app"));
        assert_eq!(builder.module(), Some(module.entity_ref()));
        builder.set_linked_project_id(None);
        builder.set_external_system_module_type(Some("sourceSet".to_string()));

        let changed = builder.build().unwrap();
        assert_eq!(changed.linked_project_id(), None);
        assert_eq!(changed.root_project_path(), Some("/work"));
        assert_eq!(changed.external_system_module_type(), Some("sourceSet"));
        assert_eq!(opts.linked_project_id(), Some("app"));
    }

    #[test]
    fn test_test_properties_factory() {
        let module = module();
        let props = TestModuleProperties::create(
            ModuleId::new("core.main"),
            &module,
            EntitySource::new("s"),
        )
        .unwrap();
        assert_eq!(props.production_module_id(), &ModuleId::new("core.main"));
        assert_eq!(
            props.attributes()[1],
            ("productionModuleId", Value::from("core.main"))
        );
    }

    #[test]
    fn test_missing_module_fails_fast() {
        let mut builder = ModuleGroupPathBuilder::default();
        builder.set_path(vec!["a".to_string()]);
        builder.set_entity_source(EntitySource::new("s"));
        let err = NewEntity::<ModuleGroupPath>::finalize(builder, |_| {}).unwrap_err();
        assert_eq!(
            err,
            Error::MissingRequiredField {
                kind: GROUP_PATH_KIND,
                field: "module"
            }
        );
    }

    #[test]
    fn test_missing_options_fails_fast() {
        let module = module();
        let mut builder = ModuleCustomImlDataBuilder::default();
        builder.set_module(&module);
        builder.set_entity_source(EntitySource::new("s"));
        let err = NewEntity::<ModuleCustomImlData>::finalize(builder, |_| {}).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingRequiredField {
                field: "customModuleOptions",
                ..
            }
        ));
    }

    #[test]
    fn test_builders_seed_from_data() {
        let module = module();
        let data = ModuleCustomImlData::create(options(&[("k", "v")]), &module, EntitySource::new("s"))
            .unwrap();
        let mut builder = data.to_builder();
        builder.custom_module_options_mut().insert("k2".into(), "v2".into());
        let changed = builder.build().unwrap();
        assert_eq!(changed.custom_module_options().len(), 2);
        assert_eq!(data.custom_module_options().len(), 1);
        assert_eq!(changed.module(), data.module());
    }
}
