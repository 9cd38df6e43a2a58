//! Entity provenance tags

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Provenance tag attached to every entity
///
/// Identifies where an entity came from (an `.iml` file, an external build
/// tool import, a test fixture). The storage never rewrites it; bulk
/// operations such as `remove_by_source` select entities by it.
///
/// Cloning is O(1).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntitySource(Arc<str>);

impl EntitySource {
    /// Create a source tag
    pub fn new(tag: impl AsRef<str>) -> Self {
        Self(Arc::from(tag.as_ref()))
    }

    /// The tag text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntitySource {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

impl From<String> for EntitySource {
    fn from(tag: String) -> Self {
        Self(Arc::from(tag))
    }
}

impl fmt::Display for EntitySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
