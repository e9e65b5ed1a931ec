//! Hangout Storage Library
//!
//! This crate provides the store abstraction for processed media and its
//! directory-backed implementation.
//!
//! # Entry naming
//!
//! Entries are flat, store-relative names of the form `<uuid-v4>.<extension>`. The
//! identifier is freshly generated for every write, so concurrent processors never
//! contend for a name. Name generation and validation live in the `keys` module so
//! every backend stays consistent.

pub(crate) mod keys;
pub mod local;
pub mod traits;

// Re-export commonly used types
pub use local::LocalStore;
pub use traits::{Store, StorageError, StorageResult};
