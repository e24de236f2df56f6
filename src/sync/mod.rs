//! Text/tree synchronization.
//!
//! Everything here works from raw text plus a parsed tree, re-deriving
//! positions by scanning lines for `key:` anchors and `-` markers:
//!
//! - `scan`: line classification helpers
//! - `linemap`: line number to path index, rebuilt per parse
//! - `resolver`: path to text range and position to path
//! - `planner`: where and how to insert new nodes

pub mod linemap;
pub mod planner;
pub mod resolver;
pub mod scan;
