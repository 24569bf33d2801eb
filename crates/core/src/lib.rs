//! Core types for varstore
//!
//! This crate defines the pieces every other layer shares:
//! - [`Value`]: the value model stored under each variable name
//! - [`path`]: normalization of store file names

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod path;
pub mod value;

pub use path::{with_extension_suffix, DEFAULT_EXTENSION};
pub use value::Value;
