//! Visible rows of the tree sidebar.
//!
//! Rows are derived from a tree snapshot plus the engine's expanded set and
//! selection: one row per key or item whose ancestors are all expanded.
//! Containers show a collapsed preview such as `(2) {lead: "Alice", members: […]}`.

use crate::document::node::{LogicalNode, NodeKind, ScalarValue};
use crate::document::path::LogicalPath;
use crate::document::tree::LogicalTree;
use indexmap::IndexMap;
use std::collections::HashSet;

/// Maximum preview width for collapsed containers.
const PREVIEW_WIDTH: usize = 60;

/// A single displayable row of the tree view.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeRow {
    pub path: LogicalPath,
    /// Nesting depth, 0 for top-level entries
    pub depth: usize,
    /// Key name, or `[i]` for sequence items
    pub label: String,
    pub kind: NodeKind,
    pub value_preview: String,
    pub expandable: bool,
    pub expanded: bool,
    pub selected: bool,
}

/// Builds the visible rows for `tree`.
///
/// # Example
///
/// ```
/// use std::collections::HashSet;
/// use yamlsync::document::parser::parse_document;
/// use yamlsync::editor::tree_view::build_rows;
///
/// let tree = parse_document("team:\n  lead: Alice\n").unwrap();
/// let rows = build_rows(&tree, &HashSet::new(), None);
/// assert_eq!(rows.len(), 1);
/// assert_eq!(rows[0].label, "team");
/// ```
pub fn build_rows(
    tree: &LogicalTree,
    expanded: &HashSet<LogicalPath>,
    selected: Option<&LogicalPath>,
) -> Vec<TreeRow> {
    let mut builder = RowBuilder {
        expanded,
        selected,
        rows: Vec::new(),
    };
    builder.build(tree.root(), &LogicalPath::root(), 0);
    builder.rows
}

/// Paths of every container in the tree, for expanding everything at once.
pub fn all_container_paths(tree: &LogicalTree) -> HashSet<LogicalPath> {
    let mut paths = HashSet::new();
    tree.walk(|path, node| {
        if node.is_container() {
            paths.insert(path.clone());
        }
    });
    paths
}

struct RowBuilder<'a> {
    expanded: &'a HashSet<LogicalPath>,
    selected: Option<&'a LogicalPath>,
    rows: Vec<TreeRow>,
}

impl RowBuilder<'_> {
    fn build(&mut self, node: &LogicalNode, path: &LogicalPath, depth: usize) {
        match node {
            LogicalNode::Mapping(entries) => {
                for (key, child) in entries {
                    self.push(child, path.child_key(key.clone()), key.clone(), depth);
                }
            }
            LogicalNode::Sequence(items) => {
                for (i, child) in items.iter().enumerate() {
                    self.push(child, path.child_index(i), format!("[{}]", i), depth);
                }
            }
            LogicalNode::Scalar(_) => {}
        }
    }

    fn push(&mut self, node: &LogicalNode, path: LogicalPath, label: String, depth: usize) {
        let expanded = node.is_container() && self.expanded.contains(&path);
        self.rows.push(TreeRow {
            depth,
            label,
            kind: node.kind(),
            value_preview: format_collapsed_preview(node, PREVIEW_WIDTH),
            expandable: node.is_container(),
            expanded,
            selected: self.selected == Some(&path),
            path: path.clone(),
        });

        if expanded {
            self.build(node, &path, depth + 1);
        }
    }
}

/// One-line preview of a node, truncated to roughly `max_chars`.
pub fn format_collapsed_preview(node: &LogicalNode, max_chars: usize) -> String {
    match node {
        LogicalNode::Mapping(fields) => format_collapsed_object(fields, max_chars),
        LogicalNode::Sequence(items) => format_collapsed_array(items, max_chars),
        LogicalNode::Scalar(value) => format_scalar(value, max_chars),
    }
}

fn format_scalar(value: &ScalarValue, max_chars: usize) -> String {
    match value {
        ScalarValue::String(s) => {
            if s.chars().count() + 2 > max_chars {
                let truncated: String = s.chars().take(max_chars.saturating_sub(5)).collect();
                format!("\"{}...\"", truncated)
            } else {
                format!("\"{}\"", s)
            }
        }
        other => other.to_string(),
    }
}

fn format_nested(node: &LogicalNode) -> String {
    match node {
        LogicalNode::Mapping(_) => "{…}".to_string(),
        LogicalNode::Sequence(_) => "[…]".to_string(),
        LogicalNode::Scalar(value) => format_scalar(value, 14),
    }
}

fn format_collapsed_object(fields: &IndexMap<String, LogicalNode>, max_chars: usize) -> String {
    if fields.is_empty() {
        return "{}".to_string();
    }

    let mut preview = format!("({}) {{", fields.len());
    for (i, (key, value)) in fields.iter().enumerate() {
        // Leave room for "..." and the closing brace
        if preview.len() + key.len() + 10 > max_chars {
            preview.push_str("...");
            return preview;
        }
        if i > 0 {
            preview.push_str(", ");
        }
        preview.push_str(key);
        preview.push_str(": ");
        preview.push_str(&format_nested(value));
    }
    preview.push('}');
    preview
}

fn format_collapsed_array(items: &[LogicalNode], max_chars: usize) -> String {
    if items.is_empty() {
        return "[]".to_string();
    }

    let mut preview = format!("({}) [", items.len());
    for (i, item) in items.iter().enumerate() {
        if preview.len() + 10 > max_chars {
            preview.push_str("...");
            return preview;
        }
        if i > 0 {
            preview.push_str(", ");
        }
        preview.push_str(&format_nested(item));
    }
    preview.push(']');
    preview
}
