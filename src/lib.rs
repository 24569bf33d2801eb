//! # varstore
//!
//! A small in-memory store of named variables with optional persistence to
//! a single flat file.
//!
//! Values are shared as `Arc<Value>`. A store can name a value explicitly,
//! or work the name out by finding the value's exact allocation in a
//! caller-owned [`Scope`].
//!
//! ## Quick Start
//!
//! ```ignore
//! use varstore::prelude::*;
//!
//! let scope = Scope::new();
//! let session = Session::builder().default_scope(scope.clone()).build();
//!
//! {
//!     let mut store = session.acquire("state")?;   // state.db, loaded if present
//!     let x = scope.bind("x", 42);
//!     store.add(&x)?;                              // resolved by identity
//!     scope.bind("greeting", "hello");
//!     store.add_by_name("greeting")?;              // explicit name
//! }                                                // saved here
//!
//! session.save_all_open();
//! ```
//!
//! ## Layers
//!
//! - [`Value`] and file naming live in `varstore-core`
//! - blob encoding and save modes live in `varstore-durability`
//! - this crate adds [`Scope`], [`DirtyRegistry`], [`VariableStore`],
//!   [`StoreGuard`], [`Session`], and [`logging`]

#![warn(missing_docs)]

mod config;
mod error;
mod guard;
mod registry;
mod scope;
mod session;
mod store;

pub mod logging;
pub mod prelude;

pub use config::StoreConfig;
pub use error::{Error, Result};
pub use guard::StoreGuard;
pub use registry::DirtyRegistry;
pub use scope::{Scope, ScopeRef};
pub use session::{Session, SessionBuilder, SweepReport};
pub use store::VariableStore;

pub use varstore_core::{with_extension_suffix, Value, DEFAULT_EXTENSION};
pub use varstore_durability::SaveMode;
