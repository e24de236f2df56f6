//! File I/O for YAML documents.
//!
//! Loading reads text from disk or stdin; saving writes text back with an
//! atomic rename. Both understand gzip.

pub mod loader;
pub mod saver;
