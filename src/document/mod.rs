//! Document model: the logical tree, its paths, and YAML conversion.
//!
//! - `node`: `LogicalNode` and `ScalarValue`
//! - `path`: `LogicalPath` addressing nodes as `a.b[2].c`
//! - `tree`: `LogicalTree` snapshot with path lookup
//! - `parser`: text to tree, with `ParseError` positions
//! - `serializer`: tree to block YAML
//! - `stats`: line count and size label

pub mod node;
pub mod parser;
pub mod path;
pub mod serializer;
pub mod stats;
pub mod tree;
