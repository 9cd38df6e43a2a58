//! Initial + dynamic listener list
//!
//! The dynamic part lives behind `Arc<Mutex<..>>` so the list can be shared
//! and registered against from any thread. Handles keep only a weak
//! back-reference plus a token, so a handle never keeps a list alive and
//! revoking through a handle whose list is gone does nothing.
//!
//! Uses parking_lot::Mutex instead of std::sync::Mutex so a panicking
//! listener callback cannot poison the registry.

use parking_lot::Mutex;
use std::fmt;
use std::sync::{Arc, Weak};

/// Registrations made after construction, in registration order
struct Dynamic<L> {
    next_token: u64,
    entries: Vec<(u64, L)>,
}

/// Revocation by token, erased over the listener type
trait Revoke: Send + Sync {
    fn revoke(&self, token: u64) -> bool;
}

impl<L: Send> Revoke for Mutex<Dynamic<L>> {
    fn revoke(&self, token: u64) -> bool {
        let mut dynamic = self.lock();
        match dynamic.entries.iter().position(|(t, _)| *t == token) {
            Some(index) => {
                dynamic.entries.remove(index);
                true
            }
            None => false,
        }
    }
}

/// Ordered listeners: initial ones first, then dynamic ones
///
/// Cloning shares the dynamic registrations.
///
/// # Example
///
/// ```
/// use wsmodel_listeners::ListenerList;
///
/// let list = ListenerList::new(["builtin"]);
/// let handle = list.add_listener("test");
/// assert_eq!(list.listeners(), vec!["builtin", "test"]);
///
/// handle.remove();
/// assert_eq!(list.listeners(), vec!["builtin"]);
/// ```
pub struct ListenerList<L> {
    initial: Arc<[L]>,
    dynamic: Arc<Mutex<Dynamic<L>>>,
}

impl<L: Clone + Send + 'static> ListenerList<L> {
    /// Create a list with a fixed initial set
    pub fn new(initial: impl IntoIterator<Item = L>) -> Self {
        Self {
            initial: initial.into_iter().collect(),
            dynamic: Arc::new(Mutex::new(Dynamic {
                next_token: 0,
                entries: Vec::new(),
            })),
        }
    }

    /// Register a listener after the initial ones
    ///
    /// Registering an equal listener twice creates two independent
    /// registrations.
    pub fn add_listener(&self, listener: L) -> ListenerHandle {
        let token = {
            let mut dynamic = self.dynamic.lock();
            let token = dynamic.next_token;
            dynamic.next_token += 1;
            dynamic.entries.push((token, listener));
            token
        };
        let dynamic: Arc<dyn Revoke> = self.dynamic.clone();
        ListenerHandle {
            list: Arc::downgrade(&dynamic),
            token,
        }
    }

    /// Current listeners: initial ones, then dynamic ones in registration order
    pub fn listeners(&self) -> Vec<L> {
        let dynamic = self.dynamic.lock();
        self.initial
            .iter()
            .cloned()
            .chain(dynamic.entries.iter().map(|(_, l)| l.clone()))
            .collect()
    }

    /// Number of initial listeners
    pub fn initial_len(&self) -> usize {
        self.initial.len()
    }

    /// Number of dynamic registrations
    pub fn dynamic_len(&self) -> usize {
        self.dynamic.lock().entries.len()
    }

    /// Total number of listeners
    pub fn len(&self) -> usize {
        self.initial_len() + self.dynamic_len()
    }

    /// Check if there are no listeners at all
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<L: Clone + Send + 'static> Default for ListenerList<L> {
    fn default() -> Self {
        Self::new(std::iter::empty())
    }
}

impl<L> Clone for ListenerList<L> {
    fn clone(&self) -> Self {
        Self {
            initial: Arc::clone(&self.initial),
            dynamic: Arc::clone(&self.dynamic),
        }
    }
}

impl<L> fmt::Debug for ListenerList<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerList")
            .field("initial", &self.initial.len())
            .field("dynamic", &self.dynamic.lock().entries.len())
            .finish()
    }
}

/// Revocation handle for one registration
pub struct ListenerHandle {
    list: Weak<dyn Revoke>,
    token: u64,
}

impl ListenerHandle {
    /// Remove exactly this registration
    ///
    /// Returns whether something was removed. Removing twice, or after the
    /// list was dropped, is a no-op.
    pub fn remove(&self) -> bool {
        self.list
            .upgrade()
            .map_or(false, |list| list.revoke(self.token))
    }
}

impl fmt::Debug for ListenerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerHandle")
            .field("token", &self.token)
            .field("alive", &(self.list.strong_count() > 0))
            .finish()
    }
}
