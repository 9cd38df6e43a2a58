//! Module entity
//!
//! A module is the root of the per-module entities. It is identified across
//! snapshots by its name ([`ModuleId`]); names are unique within a storage.

use serde::{Deserialize, Serialize};
use std::fmt;
use wsmodel_core::{
    Entity, EntityBuilder, EntityData, EntityKind, EntitySource, EntityType, EntityTypeInfo,
    Error, NewEntity, Result, SymbolicId, Value,
};

/// Kind discriminator of [`Module`]
pub const MODULE: EntityKind = EntityKind::new("Module");

/// Attached module record
pub type ModuleEntity = Entity<Module>;

/// Persistent identity of a module: its name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModuleId(String);

impl ModuleId {
    /// Create a module id from a module name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Module name
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl SymbolicId for ModuleId {
    type Entity = Module;

    fn key(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModuleId({})", self.0)
    }
}

impl From<&str> for ModuleId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// A module of the project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    source: EntitySource,
    name: String,
    module_type: Option<String>,
    dependencies: Vec<ModuleId>,
}

impl Module {
    /// Create a module with the given name
    ///
    /// # Errors
    ///
    /// Never fails in practice; finalize errors are propagated for
    /// uniformity with [`create_with`](Self::create_with).
    pub fn create(name: impl Into<String>, source: EntitySource) -> Result<NewEntity<Module>> {
        Self::create_with(name, source, |_| {})
    }

    /// Create a module, customizing the builder before it is finalized
    ///
    /// # Errors
    ///
    /// `MissingRequiredField` if `init` leaves a required field unset.
    pub fn create_with(
        name: impl Into<String>,
        source: EntitySource,
        init: impl FnOnce(&mut ModuleBuilder),
    ) -> Result<NewEntity<Module>> {
        let mut builder = ModuleBuilder::default();
        builder.set_name(name);
        builder.set_entity_source(source);
        NewEntity::finalize(builder, init)
    }

    /// Module name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Persistent identity of this module
    pub fn module_id(&self) -> ModuleId {
        ModuleId::new(self.name.as_str())
    }

    /// Module type (`JAVA_MODULE`, ...)
    pub fn module_type(&self) -> Option<&str> {
        self.module_type.as_deref()
    }

    /// Modules this module depends on
    pub fn dependencies(&self) -> &[ModuleId] {
        &self.dependencies
    }
}

impl EntityData for Module {
    fn kind(&self) -> EntityKind {
        MODULE
    }

    fn entity_source(&self) -> &EntitySource {
        &self.source
    }

    fn attributes(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("name", Value::from(self.name.as_str())),
            ("moduleType", Value::from(self.module_type.clone())),
            (
                "dependencies",
                Value::StringList(self.dependencies.iter().map(|d| d.0.clone()).collect()),
            ),
        ]
    }

    fn symbolic_id(&self) -> Option<String> {
        Some(self.name.clone())
    }

    any_upcasts!();
}

impl EntityType for Module {
    type Builder = ModuleBuilder;
    const KIND: EntityKind = MODULE;

    fn type_info() -> EntityTypeInfo {
        EntityTypeInfo::new(MODULE, &["name"], &[])
    }

    fn to_builder(&self) -> ModuleBuilder {
        ModuleBuilder {
            source: Some(self.source.clone()),
            name: Some(self.name.clone()),
            module_type: self.module_type.clone(),
            dependencies: self.dependencies.clone(),
        }
    }
}

/// Builder for [`Module`]
#[derive(Debug, Clone, Default)]
pub struct ModuleBuilder {
    source: Option<EntitySource>,
    name: Option<String>,
    module_type: Option<String>,
    dependencies: Vec<ModuleId>,
}

impl ModuleBuilder {
    /// Staged name
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Set the name
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    /// Staged module type
    pub fn module_type(&self) -> Option<&str> {
        self.module_type.as_deref()
    }

    /// Set or clear the module type
    pub fn set_module_type(&mut self, module_type: Option<String>) {
        self.module_type = module_type;
    }

    /// Staged dependencies
    pub fn dependencies(&self) -> &[ModuleId] {
        &self.dependencies
    }

    /// Mutable access to the dependencies
    pub fn dependencies_mut(&mut self) -> &mut Vec<ModuleId> {
        &mut self.dependencies
    }
}

impl EntityBuilder for ModuleBuilder {
    type Target = Module;

    fn entity_source(&self) -> Option<&EntitySource> {
        self.source.as_ref()
    }

    fn set_entity_source(&mut self, source: EntitySource) {
        self.source = Some(source);
    }

    fn build(self) -> Result<Module> {
        let missing = |field| Error::MissingRequiredField {
            kind: MODULE,
            field,
        };
        Ok(Module {
            source: self.source.ok_or_else(|| missing("entitySource"))?,
            name: self.name.ok_or_else(|| missing("name"))?,
            module_type: self.module_type,
            dependencies: self.dependencies,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_sets_required_fields() {
        let module = Module::create("core", EntitySource::new("manual")).unwrap();
        assert_eq!(module.name(), "core");
        assert_eq!(module.entity_source().as_str(), "manual");
        assert_eq!(module.module_type(), None);
        assert!(module.dependencies().is_empty());
        assert_eq!(module.module_id(), ModuleId::new("core"));
    }

    #[test]
    fn test_create_with_runs_initializer() {
        let module = Module::create_with("app", EntitySource::new("gradle"), |b| {
            b.set_module_type(Some("JAVA_MODULE".to_string()));
            b.dependencies_mut().push(ModuleId::new("core"));
        })
        .unwrap();
        assert_eq!(module.module_type(), Some("JAVA_MODULE"));
        assert_eq!(module.dependencies(), &[ModuleId::new("core")]);
    }

    #[test]
    fn test_empty_builder_fails_fast() {
        let err = NewEntity::<Module>::finalize(ModuleBuilder::default(), |b| {
            b.set_entity_source(EntitySource::new("s"));
        })
        .unwrap_err();
        assert_eq!(
            err,
            Error::MissingRequiredField {
                kind: MODULE,
                field: "name"
            }
        );
    }

    #[test]
    fn test_to_builder_roundtrip() {
        let module = Module::create_with("app", EntitySource::new("s"), |b| {
            b.set_module_type(Some("WEB_MODULE".to_string()));
        })
        .unwrap();
        let rebuilt = module.to_builder().build().unwrap();
        assert_eq!(&rebuilt, module.data());
    }

    #[test]
    fn test_attributes_in_declared_order() {
        let module = Module::create("core", EntitySource::new("s")).unwrap();
        let names: Vec<_> = module.attributes().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["name", "moduleType", "dependencies"]);
        assert_eq!(module.symbolic_id(), Some("core".to_string()));
    }

    #[test]
    fn test_module_id_serde() {
        let id = ModuleId::new("core");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"core\"");
        assert_eq!(serde_json::from_str::<ModuleId>(&json).unwrap(), id);
        assert_eq!(id.to_string(), "ModuleId(core)");
    }
}
