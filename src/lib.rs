//! yamlsync keeps YAML text and its logical tree in step.
//!
//! Every edit reparses the text into a `LogicalTree` and rebuilds a map from
//! lines to logical paths. Paths resolve forward to text ranges for tree-view
//! navigation, positions resolve backward to paths for cursor tracking, and
//! new nodes are planned as textual insertions that keep the surrounding
//! indentation.

pub mod config;
pub mod document;
pub mod editor;
pub mod file;
pub mod logging;
pub mod sync;
