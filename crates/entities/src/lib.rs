//! Project model entities
//!
//! Concrete entity kinds of the workspace model and the relation extensions
//! linking them:
//!
//! | Kind | Parent | Relation | Cardinality |
//! |------|--------|----------|-------------|
//! | `Module` | - | - | - |
//! | `ModuleCustomImlData` | `Module` | `customImlData` | one-to-one |
//! | `ModuleGroupPath` | `Module` | `groupPath` | one-to-one |
//! | `ExternalSystemModuleOptions` | `Module` | `exModuleOptions` | one-to-one |
//! | `TestModuleProperties` | `Module` | `testProperties` | one-to-one |
//! | `ContentRoot` | `Module` | `contentRoots` | one-to-many |
//!
//! Each kind has a factory (`create`, `create_with`) that sets the required
//! fields and the source, runs an optional initializer on the builder and
//! finalizes. Children are dependent on their module: removing the module
//! removes them.

#![warn(missing_docs)]
#![warn(clippy::all)]

macro_rules! any_upcasts {
    () => {
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }

        fn into_any_arc(
            self: std::sync::Arc<Self>,
        ) -> std::sync::Arc<dyn std::any::Any + Send + Sync> {
            self
        }
    };
}

pub mod content_root;
pub mod extensions;
pub mod module;
pub mod relations;

pub use content_root::{ContentRoot, ContentRootBuilder, ContentRootEntity, CONTENT_ROOT};
pub use extensions::{
    ExternalSystemModuleOptions, ExternalSystemModuleOptionsBuilder,
    ExternalSystemModuleOptionsEntity, ModuleCustomImlData, ModuleCustomImlDataBuilder,
    ModuleCustomImlDataEntity, ModuleGroupPath, ModuleGroupPathBuilder, ModuleGroupPathEntity,
    TestModuleProperties, TestModulePropertiesBuilder, TestModulePropertiesEntity,
    CUSTOM_IML_DATA_KIND, EX_MODULE_OPTIONS_KIND, GROUP_PATH_KIND, TEST_PROPERTIES_KIND,
};
pub use module::{Module, ModuleBuilder, ModuleEntity, ModuleId, MODULE};
pub use relations::{
    model_registry, ModuleExtensions, CONTENT_ROOTS, CUSTOM_IML_DATA, EX_MODULE_OPTIONS,
    GROUP_PATH, TEST_PROPERTIES,
};
