//! Convenient imports for varstore.
//!
//! ```ignore
//! use varstore::prelude::*;
//!
//! let session = Session::new();
//! let mut store = session.open("state");
//! ```

// Entry points
pub use crate::session::{Session, SessionBuilder, SweepReport};
pub use crate::store::VariableStore;
pub use crate::guard::StoreGuard;

// Collaborators
pub use crate::registry::DirtyRegistry;
pub use crate::scope::{Scope, ScopeRef};
pub use crate::config::StoreConfig;

// Error handling
pub use crate::error::{Error, Result};

// Core types
pub use varstore_core::Value;
pub use varstore_durability::SaveMode;
