//! Durability layer for varstore
//!
//! A store persists as one opaque blob in one file. This crate owns that
//! file: encoding and decoding the blob, and how a save replaces the
//! previous version on disk.
//!
//! - [`BlobFile`]: read/write a serde value as a single bincode blob
//! - [`SaveMode`]: atomic (temp file + rename) or direct overwrite
//! - [`DurabilityError`]: everything that can go wrong on the way

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod blob;
pub mod error;
pub mod mode;

pub use blob::BlobFile;
pub use error::{DurabilityError, Result};
pub use mode::SaveMode;
