//! Storage layer for the entity graph
//!
//! This crate implements the versioned, in-memory entity store with:
//! - MutableStorage: single-writer generation accepting add/modify/remove
//! - Snapshot: immutable, O(1) copy-on-write view of one generation
//! - EntityView: read surface and lazy relation resolution shared by both
//! - Secondary indices (references, sources, symbolic ids)
//! - Attribute diffs and the change log
//!
//! # Copy-on-write
//!
//! The entity map and every index live behind `Arc`s. Taking a snapshot
//! clones the `Arc`s; the storage copies a component on its first write
//! afterwards. Snapshots are `Send + Sync` and never change.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod diff;
pub mod index;
pub mod mutable;
pub mod snapshot;
pub mod state;
pub mod view;

#[cfg(test)]
mod testing;

pub use diff::{diff_entities, AttributeChange, EntityChange, ENTITY_SOURCE_ATTRIBUTE};
pub use index::{ReferenceIndex, SourceIndex, SymbolicIndex};
pub use mutable::MutableStorage;
pub use snapshot::Snapshot;
pub use state::GraphState;
pub use view::EntityView;
