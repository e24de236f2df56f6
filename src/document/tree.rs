//! Path-based access to a parsed document.
//!
//! `LogicalTree` is one immutable snapshot of the document structure. It is
//! rebuilt wholesale on every successful parse; paths are looked up against
//! the current snapshot and never carried across snapshots without being
//! re-validated.
//!
//! # Example
//!
//! ```
//! use yamlsync::document::parser::parse_document;
//! use yamlsync::document::path::LogicalPath;
//!
//! let tree = parse_document("items:\n  - 1\n  - 2\n").unwrap();
//! let path = LogicalPath::parse("items[1]").unwrap();
//! assert_eq!(tree.get(&path).and_then(|n| n.string_form()), Some("2".to_string()));
//! assert!(!tree.contains(&LogicalPath::parse("items[5]").unwrap()));
//! ```

use super::node::LogicalNode;
use super::path::{LogicalPath, PathSegment};

/// A complete document tree.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalTree {
    root: LogicalNode,
}

impl LogicalTree {
    pub fn new(root: LogicalNode) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &LogicalNode {
        &self.root
    }

    /// Gets the node addressed by `path`.
    ///
    /// Returns `None` if a key is missing, an index is out of bounds, or the
    /// path tries to step into a scalar or uses the wrong segment kind for
    /// the container (an index into a mapping, a key into a sequence).
    pub fn get(&self, path: &LogicalPath) -> Option<&LogicalNode> {
        let mut current = &self.root;

        for segment in path.segments() {
            current = match (current, segment) {
                (LogicalNode::Mapping(entries), PathSegment::Key(key)) => entries.get(key)?,
                (LogicalNode::Sequence(items), PathSegment::Index(index)) => items.get(*index)?,
                _ => return None,
            };
        }

        Some(current)
    }

    /// Returns true if `path` addresses an existing node.
    pub fn contains(&self, path: &LogicalPath) -> bool {
        self.get(path).is_some()
    }

    /// The longest non-empty prefix of `path` that still exists, if any.
    pub fn nearest_existing(&self, path: &LogicalPath) -> Option<LogicalPath> {
        path.prefixes()
            .into_iter()
            .rev()
            .find(|candidate| self.contains(candidate))
    }

    /// Paths of the root's direct children.
    pub fn top_level_paths(&self) -> Vec<LogicalPath> {
        match &self.root {
            LogicalNode::Mapping(entries) => entries
                .keys()
                .map(|key| LogicalPath::root().child_key(key.clone()))
                .collect(),
            LogicalNode::Sequence(items) => (0..items.len())
                .map(|index| LogicalPath::root().child_index(index))
                .collect(),
            LogicalNode::Scalar(_) => Vec::new(),
        }
    }

    /// Visits every node in depth-first document order, root excluded.
    pub fn walk<F>(&self, mut visit: F)
    where
        F: FnMut(&LogicalPath, &LogicalNode),
    {
        fn walk_node<F>(node: &LogicalNode, path: &LogicalPath, visit: &mut F)
        where
            F: FnMut(&LogicalPath, &LogicalNode),
        {
            match node {
                LogicalNode::Mapping(entries) => {
                    for (key, child) in entries {
                        let child_path = path.child_key(key.clone());
                        visit(&child_path, child);
                        walk_node(child, &child_path, visit);
                    }
                }
                LogicalNode::Sequence(items) => {
                    for (index, child) in items.iter().enumerate() {
                        let child_path = path.child_index(index);
                        visit(&child_path, child);
                        walk_node(child, &child_path, visit);
                    }
                }
                LogicalNode::Scalar(_) => {}
            }
        }

        walk_node(&self.root, &LogicalPath::root(), &mut visit);
    }

    /// Serializes the tree as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(&self.root.to_json())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::node::ScalarValue;
    use indexmap::IndexMap;

    fn sample() -> LogicalTree {
        let mut inner = IndexMap::new();
        inner.insert(
            "members".to_string(),
            LogicalNode::Sequence(vec![LogicalNode::string("Bob"), LogicalNode::string("Carol")]),
        );
        let mut root = IndexMap::new();
        root.insert("team".to_string(), LogicalNode::Mapping(inner));
        root.insert(
            "size".to_string(),
            LogicalNode::Scalar(ScalarValue::Integer(2)),
        );
        LogicalTree::new(LogicalNode::Mapping(root))
    }

    #[test]
    fn test_get_by_path() {
        let tree = sample();
        let path = LogicalPath::parse("team.members[1]").unwrap();
        assert_eq!(tree.get(&path), Some(&LogicalNode::string("Carol")));
        assert!(tree.get(&LogicalPath::root()).is_some());
    }

    #[test]
    fn test_get_rejects_wrong_segment_kind() {
        let tree = sample();
        assert!(tree.get(&LogicalPath::parse("team[0]").unwrap()).is_none());
        assert!(tree.get(&LogicalPath::parse("size.x").unwrap()).is_none());
    }

    #[test]
    fn test_nearest_existing() {
        let tree = sample();
        let stale = LogicalPath::parse("team.members[7]").unwrap();
        assert_eq!(
            tree.nearest_existing(&stale).map(|p| p.to_string()),
            Some("team.members".to_string())
        );
        let gone = LogicalPath::parse("nope.deeper").unwrap();
        assert_eq!(tree.nearest_existing(&gone), None);
    }

    #[test]
    fn test_top_level_paths() {
        let rendered: Vec<String> = sample()
            .top_level_paths()
            .iter()
            .map(|p| p.to_string())
            .collect();
        assert_eq!(rendered, vec!["team", "size"]);
    }

    #[test]
    fn test_walk_visits_in_document_order() {
        let mut seen = Vec::new();
        sample().walk(|path, _| seen.push(path.to_string()));
        assert_eq!(
            seen,
            vec![
                "team",
                "team.members",
                "team.members[0]",
                "team.members[1]",
                "size"
            ]
        );
    }
}
