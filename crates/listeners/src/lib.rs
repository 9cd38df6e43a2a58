//! Listener registry for wsmodel
//!
//! A [`ListenerList`] holds a fixed set of initial listeners followed by
//! listeners registered at runtime. Registration returns a
//! [`ListenerHandle`] whose `remove()` revokes exactly that registration,
//! even when another registration holds an equal listener.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod list;

pub use list::{ListenerHandle, ListenerList};
