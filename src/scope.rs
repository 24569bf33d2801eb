//! Caller-owned variable scopes.
//!
//! A [`Scope`] is the table of named bindings a store consults to work out
//! what a value is called. The caller owns it and may rebind names at any
//! time; stores only ever hold a [`ScopeRef`], a weak handle that reads the
//! bindings and never keeps them alive.
//!
//! Bindings are kept in insertion order. Identity resolution walks them in
//! that order and the first binding sharing the value's allocation wins, so
//! two names bound to the same `Arc` resolve to whichever was bound first.

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::sync::{Arc, Weak};
use tracing::warn;
use varstore_core::Value;

#[derive(Debug)]
struct Binding {
    name: String,
    value: Arc<Value>,
}

type Bindings = RwLock<Vec<Binding>>;

static GLOBAL_SCOPE: Lazy<Scope> = Lazy::new(Scope::new);

/// A caller-owned, insertion-ordered table of `name -> Arc<Value>` bindings.
///
/// Cloning a `Scope` clones the handle; both clones see the same bindings.
///
/// # Example
///
/// ```ignore
/// let scope = Scope::new();
/// let x = scope.bind("x", 42);
/// assert_eq!(scope.lookup("x").unwrap(), x);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Scope {
    inner: Arc<Bindings>,
}

impl Scope {
    /// Create an empty scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide ambient scope used when none is supplied.
    pub fn global() -> &'static Scope {
        &GLOBAL_SCOPE
    }

    /// Bind `name` to a fresh allocation of `value` and return its handle.
    ///
    /// Rebinding an existing name replaces it in place, keeping its
    /// position in resolution order.
    pub fn bind(&self, name: impl Into<String>, value: impl Into<Value>) -> Arc<Value> {
        let value = Arc::new(value.into());
        self.bind_shared(name, Arc::clone(&value));
        value
    }

    /// Bind `name` to an existing handle, so it shares identity with
    /// every other binding of the same `Arc`.
    ///
    /// Any name is accepted here, including the empty one, but stores refuse
    /// to hold a value under an empty name.
    pub fn bind_shared(&self, name: impl Into<String>, value: Arc<Value>) {
        let name = name.into();
        let mut bindings = self.inner.write();
        match bindings.iter_mut().find(|b| b.name == name) {
            Some(existing) => existing.value = value,
            None => bindings.push(Binding { name, value }),
        }
    }

    /// Remove a binding, returning its value.
    pub fn unbind(&self, name: &str) -> Option<Arc<Value>> {
        let mut bindings = self.inner.write();
        let idx = bindings.iter().position(|b| b.name == name)?;
        Some(bindings.remove(idx).value)
    }

    /// Current value bound to `name`.
    pub fn lookup(&self, name: &str) -> Option<Arc<Value>> {
        self.inner
            .read()
            .iter()
            .find(|b| b.name == name)
            .map(|b| Arc::clone(&b.value))
    }

    /// Check if `name` is bound.
    pub fn contains(&self, name: &str) -> bool {
        self.inner.read().iter().any(|b| b.name == name)
    }

    /// Bound names in resolution order.
    pub fn names(&self) -> Vec<String> {
        self.inner.read().iter().map(|b| b.name.clone()).collect()
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Check if there are no bindings.
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// First name whose binding is the very same allocation as `value`.
    pub fn resolve_name(&self, value: &Arc<Value>) -> Option<String> {
        resolve_in(&self.inner, value)
    }

    /// Weak, read-only handle for stores.
    pub fn downgrade(&self) -> ScopeRef {
        ScopeRef {
            inner: Arc::downgrade(&self.inner),
        }
    }
}

impl<K, V> FromIterator<(K, V)> for Scope
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let scope = Scope::new();
        for (name, value) in iter {
            scope.bind(name, value);
        }
        scope
    }
}

/// Non-owning, read-only view of a [`Scope`].
///
/// Once every `Scope` handle is dropped the view becomes unavailable:
/// resolution returns `None` and lookups find nothing, with a warning logged
/// each time.
#[derive(Debug, Clone)]
pub struct ScopeRef {
    inner: Weak<Bindings>,
}

impl ScopeRef {
    /// Check if the underlying scope is still alive.
    pub fn is_available(&self) -> bool {
        self.inner.strong_count() > 0
    }

    /// First name bound to the same allocation as `value`, if any.
    ///
    /// Order-dependent: when several names share the allocation, the one
    /// bound earliest wins.
    pub fn resolve_name(&self, value: &Arc<Value>) -> Option<String> {
        match self.inner.upgrade() {
            Some(bindings) => resolve_in(&bindings, value),
            None => {
                warn!("Failed to get variable name: scope is no longer available");
                None
            }
        }
    }

    /// Current value bound to `name`.
    pub fn lookup(&self, name: &str) -> Option<Arc<Value>> {
        match self.inner.upgrade() {
            Some(bindings) => bindings
                .read()
                .iter()
                .find(|b| b.name == name)
                .map(|b| Arc::clone(&b.value)),
            None => {
                warn!("Failed to look up '{}': scope is no longer available", name);
                None
            }
        }
    }
}

fn resolve_in(bindings: &Bindings, value: &Arc<Value>) -> Option<String> {
    bindings
        .read()
        .iter()
        .find(|b| Arc::ptr_eq(&b.value, value))
        .map(|b| b.name.clone())
}
