//! Content roots
//!
//! A module has any number of content roots (`contentRoots`, one-to-many).

use wsmodel_core::{
    Entity, EntityBuilder, EntityData, EntityKind, EntityRef, EntitySource, EntityType,
    EntityTypeInfo, Error, NewEntity, ReferenceField, Result, Value,
};

use crate::module::{ModuleEntity, MODULE};

/// Kind discriminator of [`ContentRoot`]
pub const CONTENT_ROOT: EntityKind = EntityKind::new("ContentRoot");

/// Attached content root record
pub type ContentRootEntity = Entity<ContentRoot>;

const REFS: &[ReferenceField] = &[ReferenceField::required("module", MODULE)];

/// A directory tree belonging to a module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRoot {
    source: EntitySource,
    module: EntityRef,
    url: String,
    excluded_urls: Vec<String>,
    excluded_patterns: Vec<String>,
}

impl ContentRoot {
    /// Create a content root at `url` for `module`
    ///
    /// # Errors
    ///
    /// Never fails in practice; see [`create_with`](Self::create_with).
    pub fn create(
        url: impl Into<String>,
        module: &ModuleEntity,
        source: EntitySource,
    ) -> Result<NewEntity<Self>> {
        Self::create_with(url, module, source, |_| {})
    }

    /// Create a content root, customizing the builder before finalizing
    ///
    /// # Errors
    ///
    /// `MissingRequiredField` if `init` leaves a required field unset.
    pub fn create_with(
        url: impl Into<String>,
        module: &ModuleEntity,
        source: EntitySource,
        init: impl FnOnce(&mut ContentRootBuilder),
    ) -> Result<NewEntity<Self>> {
        let mut builder = ContentRootBuilder {
            url: Some(url.into()),
            module: Some(module.entity_ref()),
            ..ContentRootBuilder::default()
        };
        builder.set_entity_source(source);
        NewEntity::finalize(builder, init)
    }

    /// Owning module
    pub fn module(&self) -> EntityRef {
        self.module
    }

    /// Root url (`file:///work/app`)
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Excluded sub-trees
    pub fn excluded_urls(&self) -> &[String] {
        &self.excluded_urls
    }

    /// Excluded file name patterns
    pub fn excluded_patterns(&self) -> &[String] {
        &self.excluded_patterns
    }
}

impl EntityData for ContentRoot {
    fn kind(&self) -> EntityKind {
        CONTENT_ROOT
    }

    fn entity_source(&self) -> &EntitySource {
        &self.source
    }

    fn attributes(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("module", Value::Ref(self.module.id)),
            ("url", Value::from(self.url.as_str())),
            ("excludedUrls", Value::from(self.excluded_urls.clone())),
            ("excludedPatterns", Value::from(self.excluded_patterns.clone())),
        ]
    }

    fn references(&self) -> Vec<(&'static str, EntityRef)> {
        vec![("module", self.module)]
    }

    any_upcasts!();
}

impl EntityType for ContentRoot {
    type Builder = ContentRootBuilder;
    const KIND: EntityKind = CONTENT_ROOT;

    fn type_info() -> EntityTypeInfo {
        EntityTypeInfo::new(CONTENT_ROOT, &["url", "module"], REFS)
    }

    fn to_builder(&self) -> ContentRootBuilder {
        ContentRootBuilder {
            source: Some(self.source.clone()),
            module: Some(self.module),
            url: Some(self.url.clone()),
            excluded_urls: self.excluded_urls.clone(),
            excluded_patterns: self.excluded_patterns.clone(),
        }
    }
}

/// Builder for [`ContentRoot`]
#[derive(Debug, Clone, Default)]
pub struct ContentRootBuilder {
    source: Option<EntitySource>,
    module: Option<EntityRef>,
    url: Option<String>,
    /// Excluded sub-trees
    pub excluded_urls: Vec<String>,
    /// Excluded file name patterns
    pub excluded_patterns: Vec<String>,
}

impl ContentRootBuilder {
    /// Staged owning module
    pub fn module(&self) -> Option<EntityRef> {
        self.module
    }

    /// Move to another module
    pub fn set_module(&mut self, module: &ModuleEntity) {
        self.module = Some(module.entity_ref());
    }

    /// Staged url
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Set the url
    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = Some(url.into());
    }
}

impl EntityBuilder for ContentRootBuilder {
    type Target = ContentRoot;

    fn entity_source(&self) -> Option<&EntitySource> {
        self.source.as_ref()
    }

    fn set_entity_source(&mut self, source: EntitySource) {
        self.source = Some(source);
    }

    fn build(self) -> Result<ContentRoot> {
        let missing = |field| Error::MissingRequiredField {
            kind: CONTENT_ROOT,
            field,
        };
        Ok(ContentRoot {
            source: self.source.ok_or_else(|| missing("entitySource"))?,
            module: self.module.ok_or_else(|| missing("module"))?,
            url: self.url.ok_or_else(|| missing("url"))?,
            excluded_urls: self.excluded_urls,
            excluded_patterns: self.excluded_patterns,
        })
    }
}
