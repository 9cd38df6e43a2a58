//! Attribute values
//!
//! Entity data is strongly typed per kind, but every kind also exposes its
//! attributes as an ordered list of `(name, Value)` pairs. That uniform view
//! is what attribute diffs are computed over.
//!
//! ## Type Rules
//!
//! - Different variants are never equal: `String("")` != `Null`
//! - `StringMap` is ordered (BTreeMap), so equality is order-independent
//! - `StringList` is ordered; order is significant

use crate::types::EntityId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Attribute value of an entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    /// Absent optional attribute
    Null,
    /// UTF-8 string
    String(String),
    /// Ordered sequence of strings
    StringList(Vec<String>),
    /// String-to-string mapping
    StringMap(BTreeMap<String, String>),
    /// Reference to another entity of the same lineage
    Ref(EntityId),
}

impl Value {
    /// Check if this is `Null`
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Name of the variant, for messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::String(_) => "String",
            Value::StringList(_) => "StringList",
            Value::StringMap(_) => "StringMap",
            Value::Ref(_) => "Ref",
        }
    }

    /// Get the string, if this is a `String`
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the referenced id, if this is a `Ref`
    pub fn as_ref_id(&self) -> Option<EntityId> {
        match self {
            Value::Ref(id) => Some(*id),
            _ => None,
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

impl From<Vec<String>> for Value {
    fn from(v: Vec<String>) -> Self {
        Value::StringList(v)
    }
}

impl From<BTreeMap<String, String>> for Value {
    fn from(m: BTreeMap<String, String>) -> Self {
        Value::StringMap(m)
    }
}

impl From<EntityId> for Value {
    fn from(id: EntityId) -> Self {
        Value::Ref(id)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::String(s) => write!(f, "{:?}", s),
            Value::StringList(items) => write!(f, "{:?}", items),
            Value::StringMap(map) => write!(f, "{:?}", map),
            Value::Ref(id) => write!(f, "{}", id),
        }
    }
}
