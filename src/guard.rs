//! Scoped store acquisition.
//!
//! A [`StoreGuard`] owns a [`VariableStore`] for the length of a scope and
//! saves it when the scope ends. Release never fails from the caller's
//! point of view: a save error during drop is logged and dropped, since
//! there is nothing safe left to do with it. Call
//! [`release`](StoreGuard::release) instead to see the error.

use crate::error::Result;
use crate::store::VariableStore;
use std::ops::{Deref, DerefMut};
use tracing::error;

/// A store that saves itself when dropped.
///
/// # Example
///
/// ```ignore
/// {
///     let mut store = session.acquire("state")?;
///     store.add_by_name("x")?;
/// } // saved here
/// ```
#[derive(Debug)]
pub struct StoreGuard {
    store: VariableStore,
    released: bool,
}

impl StoreGuard {
    pub(crate) fn new(store: VariableStore) -> Self {
        StoreGuard {
            store,
            released: false,
        }
    }

    /// Save now and return the result. No second save happens on drop.
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        self.store.save()
    }
}

impl Deref for StoreGuard {
    type Target = VariableStore;

    fn deref(&self) -> &VariableStore {
        &self.store
    }
}

impl DerefMut for StoreGuard {
    fn deref_mut(&mut self) -> &mut VariableStore {
        &mut self.store
    }
}

impl Drop for StoreGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = self.store.save() {
            error!(
                "Failed to save {} on release: {}",
                self.store.path().display(),
                e
            );
        }
    }
}
