//! Line number to logical path index.
//!
//! The YAML library does not report source positions, so positions are
//! recovered by walking the tree and the raw lines in lockstep: every key
//! in tree order is matched against the next line carrying its `key:`
//! anchor, and every sequence item against the next dash line at the
//! sequence's indentation. This holds for ordinary hand-written documents;
//! block scalars whose continuation lines look like `key:` can fool it.
//!
//! # Example
//!
//! ```
//! use yamlsync::document::parser::parse_document;
//! use yamlsync::sync::linemap::build_line_map;
//!
//! let text = "team:\n  lead: Alice\n  members:\n    - Bob\n";
//! let map = build_line_map(text, &parse_document(text).unwrap());
//! assert_eq!(map.get(2).map(|p| p.to_string()), Some("team.lead".to_string()));
//! assert_eq!(map.get(4).map(|p| p.to_string()), Some("team.members[0]".to_string()));
//! ```

use super::scan::{
    content_column, content_from, dash_columns, indent_of, is_skippable, line_has_key,
    opens_block, split_lines, starts_with_key,
};
use crate::document::node::LogicalNode;
use crate::document::path::LogicalPath;
use crate::document::tree::LogicalTree;
use std::collections::BTreeMap;

/// Mapping from 1-indexed line numbers to the path introduced on that line.
///
/// Not total: blank lines, comments and continuation lines have no entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineMap {
    entries: BTreeMap<usize, LogicalPath>,
}

impl LineMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, line: usize) -> Option<&LogicalPath> {
        self.entries.get(&line)
    }

    /// The closest mapped line at or before `line`.
    pub fn nearest_at_or_before(&self, line: usize) -> Option<(usize, &LogicalPath)> {
        self.entries
            .range(..=line)
            .next_back()
            .map(|(line, path)| (*line, path))
    }

    /// The line a path was mapped to, if any.
    pub fn line_of(&self, path: &LogicalPath) -> Option<usize> {
        self.entries
            .iter()
            .find(|(_, mapped)| *mapped == path)
            .map(|(line, _)| *line)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &LogicalPath)> {
        self.entries.iter().map(|(line, path)| (*line, path))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records `path` for a 0-indexed line unless the line already has one.
    ///
    /// A sequence item and its first key share the dash line; the item,
    /// recorded first, keeps it.
    fn record(&mut self, index: usize, path: LogicalPath) {
        self.entries.entry(index + 1).or_insert(path);
    }
}

/// Builds the line map for `text`, which must be the text `tree` was parsed from.
pub fn build_line_map(text: &str, tree: &LogicalTree) -> LineMap {
    let mut builder = Builder {
        lines: split_lines(text),
        map: LineMap::new(),
    };
    builder.visit(tree.root(), &LogicalPath::root(), 0, None);

    tracing::debug!(entries = builder.map.len(), "built line map");
    builder.map
}

struct Builder<'a> {
    lines: Vec<&'a str>,
    map: LineMap,
}

impl Builder<'_> {
    /// Maps `node`'s children starting at line `start`.
    ///
    /// `inline` is set when the node begins partway through line `start`,
    /// right after a sequence dash, and holds the column where it begins.
    /// Returns the line to continue scanning from.
    fn visit(
        &mut self,
        node: &LogicalNode,
        path: &LogicalPath,
        start: usize,
        inline: Option<usize>,
    ) -> usize {
        match node {
            LogicalNode::Mapping(entries) => {
                let mut cursor = start;
                let mut column = inline;

                for (key, child) in entries {
                    let Some(index) = self.find_key(key, cursor, column, start, inline) else {
                        continue;
                    };
                    let child_path = path.child_key(key.clone());
                    self.map.record(index, child_path.clone());

                    let line = self.lines[index];
                    if column.is_none() {
                        column = Some(content_column(line));
                    }

                    cursor = index + 1;
                    if child.is_container() && opens_block(line) {
                        cursor = self.visit(child, &child_path, index + 1, None);
                    }
                }

                cursor
            }
            LogicalNode::Sequence(items) => {
                let mut cursor = start;
                let mut item_column = match inline {
                    Some(col) => {
                        if !self.lines.get(start).is_some_and(|l| dash_columns(l).contains(&col)) {
                            return start + 1;
                        }
                        Some(col)
                    }
                    None => None,
                };

                for (i, item) in items.iter().enumerate() {
                    let exempt = inline.map(|_| start);
                    let Some(index) = self.find_item(cursor, &mut item_column, exempt) else {
                        break;
                    };
                    let item_path = path.child_index(i);
                    self.map.record(index, item_path.clone());
                    cursor = index + 1;

                    if item.is_container() {
                        let body = item_column.unwrap_or(0) + 2;
                        let rest = content_from(self.lines[index], body).trim();
                        if rest.is_empty() {
                            cursor = self.visit(item, &item_path, index + 1, None);
                        } else if !rest.starts_with('{') && !rest.starts_with('[') {
                            cursor = self
                                .visit(item, &item_path, index, Some(body))
                                .max(index + 1);
                        }
                    }
                }

                cursor
            }
            LogicalNode::Scalar(_) => start,
        }
    }

    /// Finds the next line at or after `from` carrying the `key:` anchor.
    ///
    /// Once the mapping's column is known, a less-indented line ends the
    /// search. The line the mapping started on inline is checked at that
    /// column instead.
    fn find_key(
        &self,
        key: &str,
        from: usize,
        column: Option<usize>,
        start: usize,
        inline: Option<usize>,
    ) -> Option<usize> {
        for index in from..self.lines.len() {
            let line = self.lines[index];
            if is_skippable(line) {
                continue;
            }
            if let (Some(col), true) = (inline, index == start) {
                if starts_with_key(content_from(line, col), key) {
                    return Some(index);
                }
                continue;
            }
            if column.is_some_and(|col| indent_of(line) < col) {
                return None;
            }
            if line_has_key(line, key) {
                return Some(index);
            }
        }
        None
    }

    /// Finds the next dash line for a sequence item.
    ///
    /// The first dash fixes the sequence's column; later items must sit
    /// exactly there, deeper lines are skipped and a shallower line ends
    /// the sequence.
    fn find_item(
        &self,
        from: usize,
        item_column: &mut Option<usize>,
        exempt: Option<usize>,
    ) -> Option<usize> {
        for index in from..self.lines.len() {
            let line = self.lines[index];
            if is_skippable(line) {
                continue;
            }
            let dashes = dash_columns(line);
            match *item_column {
                Some(col) if exempt == Some(index) => {
                    if dashes.contains(&col) {
                        return Some(index);
                    }
                }
                Some(col) => {
                    let indent = indent_of(line);
                    if indent < col {
                        return None;
                    }
                    if indent == col && dashes.first() == Some(&col) {
                        return Some(index);
                    }
                }
                None => {
                    if let Some(&first) = dashes.first() {
                        *item_column = Some(first);
                        return Some(index);
                    }
                }
            }
        }
        None
    }
}
