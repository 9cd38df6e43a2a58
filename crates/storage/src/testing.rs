//! Entity kinds for storage unit tests
//!
//! - `Root`: no references, symbolic id = name
//! - `Leaf`: required reference `root` → Root (one-to-one `leaf`)
//! - `Node`: required reference `parent` → Node (one-to-many `children`)

use std::any::Any;
use std::sync::Arc;
use wsmodel_core::{
    EntityBuilder, EntityData, EntityId, EntityKind, EntityRef, EntitySource, EntityType,
    EntityTypeInfo, EntityTypeRegistry, Error, NewEntity, OneToMany, OneToOne, ReferenceField,
    Result, StoreId, SymbolicId, Value,
};

pub const ROOT: EntityKind = EntityKind::new("Root");
pub const LEAF: EntityKind = EntityKind::new("Leaf");
pub const NODE: EntityKind = EntityKind::new("Node");

pub const LEAF_OF: OneToOne<Root, Leaf> = OneToOne::new("leaf", "root");
pub const CHILDREN: OneToMany<Node, Node> = OneToMany::new("children", "parent");

fn missing(kind: EntityKind, field: &'static str) -> Error {
    Error::MissingRequiredField { kind, field }
}

pub fn registry() -> EntityTypeRegistry {
    let mut registry = EntityTypeRegistry::new();
    registry.register::<Root>().register::<Leaf>().register::<Node>();
    registry.register_relation(LEAF_OF.descriptor()).unwrap();
    registry.register_relation(CHILDREN.descriptor()).unwrap();
    registry
}

#[derive(Debug, Clone, PartialEq)]
pub struct Root {
    pub source: EntitySource,
    pub name: String,
}

#[derive(Debug, Default)]
pub struct RootBuilder {
    pub source: Option<EntitySource>,
    pub name: Option<String>,
}

impl Root {
    pub fn new(name: &str, source: &str) -> NewEntity<Root> {
        let builder = RootBuilder {
            source: Some(EntitySource::new(source)),
            name: Some(name.to_string()),
        };
        NewEntity::finalize(builder, |_| {}).unwrap()
    }
}

#[derive(Debug)]
pub struct RootName(pub String);

impl SymbolicId for RootName {
    type Entity = Root;
    fn key(&self) -> &str {
        &self.0
    }
}

impl EntityData for Root {
    fn kind(&self) -> EntityKind {
        ROOT
    }
    fn entity_source(&self) -> &EntitySource {
        &self.source
    }
    fn attributes(&self) -> Vec<(&'static str, Value)> {
        vec![("name", Value::from(self.name.as_str()))]
    }
    fn symbolic_id(&self) -> Option<String> {
        Some(self.name.clone())
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

impl EntityType for Root {
    type Builder = RootBuilder;
    const KIND: EntityKind = ROOT;
    fn type_info() -> EntityTypeInfo {
        EntityTypeInfo::new(ROOT, &["name"], &[])
    }
    fn to_builder(&self) -> RootBuilder {
        RootBuilder {
            source: Some(self.source.clone()),
            name: Some(self.name.clone()),
        }
    }
}

impl EntityBuilder for RootBuilder {
    type Target = Root;
    fn entity_source(&self) -> Option<&EntitySource> {
        self.source.as_ref()
    }
    fn set_entity_source(&mut self, source: EntitySource) {
        self.source = Some(source);
    }
    fn build(self) -> Result<Root> {
        Ok(Root {
            source: self.source.ok_or_else(|| missing(ROOT, "entitySource"))?,
            name: self.name.ok_or_else(|| missing(ROOT, "name"))?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Leaf {
    pub source: EntitySource,
    pub label: String,
    pub root: EntityRef,
}

#[derive(Debug, Default)]
pub struct LeafBuilder {
    pub source: Option<EntitySource>,
    pub label: Option<String>,
    pub root: Option<EntityRef>,
}

const LEAF_REFS: &[ReferenceField] = &[ReferenceField::required("root", ROOT)];

impl Leaf {
    pub fn new(label: &str, source: &str, root: EntityRef) -> NewEntity<Leaf> {
        let builder = LeafBuilder {
            source: Some(EntitySource::new(source)),
            label: Some(label.to_string()),
            root: Some(root),
        };
        NewEntity::finalize(builder, |_| {}).unwrap()
    }

    /// Leaf data pointing at a made-up root, for tests that never store it
    pub fn detached(label: &str, source: &str) -> Leaf {
        Leaf {
            source: EntitySource::new(source),
            label: label.to_string(),
            root: EntityRef::new(StoreId::new(), EntityId::new(0)),
        }
    }
}

impl EntityData for Leaf {
    fn kind(&self) -> EntityKind {
        LEAF
    }
    fn entity_source(&self) -> &EntitySource {
        &self.source
    }
    fn attributes(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("label", Value::from(self.label.as_str())),
            ("root", Value::Ref(self.root.id)),
        ]
    }
    fn references(&self) -> Vec<(&'static str, EntityRef)> {
        vec![("root", self.root)]
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

impl EntityType for Leaf {
    type Builder = LeafBuilder;
    const KIND: EntityKind = LEAF;
    fn type_info() -> EntityTypeInfo {
        EntityTypeInfo::new(LEAF, &["label", "root"], LEAF_REFS)
    }
    fn to_builder(&self) -> LeafBuilder {
        LeafBuilder {
            source: Some(self.source.clone()),
            label: Some(self.label.clone()),
            root: Some(self.root),
        }
    }
}

impl EntityBuilder for LeafBuilder {
    type Target = Leaf;
    fn entity_source(&self) -> Option<&EntitySource> {
        self.source.as_ref()
    }
    fn set_entity_source(&mut self, source: EntitySource) {
        self.source = Some(source);
    }
    fn build(self) -> Result<Leaf> {
        Ok(Leaf {
            source: self.source.ok_or_else(|| missing(LEAF, "entitySource"))?,
            label: self.label.ok_or_else(|| missing(LEAF, "label"))?,
            root: self.root.ok_or_else(|| missing(LEAF, "root"))?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub source: EntitySource,
    pub label: String,
    pub parent: EntityRef,
}

#[derive(Debug, Default)]
pub struct NodeBuilder {
    pub source: Option<EntitySource>,
    pub label: Option<String>,
    pub parent: Option<EntityRef>,
}

const NODE_REFS: &[ReferenceField] = &[ReferenceField::required("parent", NODE)];

impl Node {
    pub fn new(label: &str, source: &str, parent: EntityRef) -> NewEntity<Node> {
        let builder = NodeBuilder {
            source: Some(EntitySource::new(source)),
            label: Some(label.to_string()),
            parent: Some(parent),
        };
        NewEntity::finalize(builder, |_| {}).unwrap()
    }
}

impl EntityData for Node {
    fn kind(&self) -> EntityKind {
        NODE
    }
    fn entity_source(&self) -> &EntitySource {
        &self.source
    }
    fn attributes(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("label", Value::from(self.label.as_str())),
            ("parent", Value::Ref(self.parent.id)),
        ]
    }
    fn references(&self) -> Vec<(&'static str, EntityRef)> {
        vec![("parent", self.parent)]
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

impl EntityType for Node {
    type Builder = NodeBuilder;
    const KIND: EntityKind = NODE;
    fn type_info() -> EntityTypeInfo {
        EntityTypeInfo::new(NODE, &["label", "parent"], NODE_REFS)
    }
    fn to_builder(&self) -> NodeBuilder {
        NodeBuilder {
            source: Some(self.source.clone()),
            label: Some(self.label.clone()),
            parent: Some(self.parent),
        }
    }
}

impl EntityBuilder for NodeBuilder {
    type Target = Node;
    fn entity_source(&self) -> Option<&EntitySource> {
        self.source.as_ref()
    }
    fn set_entity_source(&mut self, source: EntitySource) {
        self.source = Some(source);
    }
    fn build(self) -> Result<Node> {
        Ok(Node {
            source: self.source.ok_or_else(|| missing(NODE, "entitySource"))?,
            label: self.label.ok_or_else(|| missing(NODE, "label"))?,
            parent: self.parent.ok_or_else(|| missing(NODE, "parent"))?,
        })
    }
}
