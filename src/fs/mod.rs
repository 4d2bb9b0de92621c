//! File System Module
//!
//! The virtual filesystem backing the interpreter: a flat string-keyed
//! store with directory existence inferred from the key set.

pub mod types;
pub mod virtual_fs;

pub use types::*;
pub use virtual_fs::{normalize_path, VirtualFs};
