//! Forward (path to text range) and backward (position to path) resolution.
//!
//! Forward resolution walks the path top-down over the raw lines. Each
//! matched segment narrows the search to its own block: the lines after it
//! that are indented deeper than it. The next segment must then appear at
//! the block's child column, so a key with the same name at another depth,
//! or in a sibling section, is never picked up.
//!
//! Backward resolution goes through the line map first and falls back to
//! matching the line's content against the tree.
//!
//! # Example
//!
//! ```
//! use yamlsync::document::path::LogicalPath;
//! use yamlsync::sync::resolver::find_range;
//!
//! let text = "a:\n  b:\n    c: 1\n  d: 2\n";
//! let range = find_range(text, &LogicalPath::parse("a.b").unwrap(), None).unwrap();
//! assert_eq!((range.start_line, range.end_line), (2, 3));
//! ```

use super::linemap::LineMap;
use super::scan::{
    content_from, dash_columns, dash_item_text, indent_of, is_dash_item, is_skippable, key_of,
    split_lines, starts_with_key, strip_quotes,
};
use crate::document::path::{LogicalPath, PathSegment};
use crate::document::tree::LogicalTree;

/// A 1-indexed cursor position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::new(1, 1)
    }
}

/// A 1-indexed range of whole lines.
///
/// `end_column` is one past the last character of `end_line`.
/// `anchor_column` is where the matched key or dash starts on `start_line`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextRange {
    pub start_line: usize,
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
    pub anchor_column: usize,
}

impl TextRange {
    pub fn contains_line(&self, line: usize) -> bool {
        (self.start_line..=self.end_line).contains(&line)
    }

    pub fn line_count(&self) -> usize {
        self.end_line - self.start_line + 1
    }
}

/// Where one path segment was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Located {
    /// 0-indexed line of the match.
    pub line: usize,
    /// Column of the key, or of the dash for an index.
    pub column: usize,
    /// Exclusive end of the matched node's block.
    pub end: usize,
    /// For an index match, the column of content following the dash on the
    /// same line.
    pub body: Option<usize>,
}

impl Located {
    fn child_scope(&self) -> Scope {
        match self.body {
            Some(body) => Scope {
                start: self.line,
                end: self.end,
                inline: Some(body),
            },
            None => Scope {
                start: self.line + 1,
                end: self.end,
                inline: None,
            },
        }
    }
}

/// The lines a node's children may occupy.
#[derive(Debug, Clone, Copy)]
struct Scope {
    start: usize,
    end: usize,
    /// Children begin partway through `start`, at this column.
    inline: Option<usize>,
}

impl Scope {
    /// The column direct children sit at: the inline column if any,
    /// otherwise the indentation of the first content line.
    fn child_column(&self, lines: &[&str]) -> Option<usize> {
        if self.inline.is_some() {
            return self.inline;
        }
        lines[self.start.min(lines.len())..self.end.min(lines.len())]
            .iter()
            .find(|line| !is_skippable(line))
            .map(|line| indent_of(line))
    }

    /// The column and content of line `index` as seen from this scope.
    fn view<'a>(&self, index: usize, line: &'a str) -> (usize, &'a str) {
        match self.inline {
            Some(column) if index == self.start => (column, content_from(line, column)),
            _ => {
                let indent = indent_of(line);
                (indent, content_from(line, indent))
            }
        }
    }
}

/// First line after `line` that leaves the block of a node at `column`.
///
/// A dash at the same column still belongs to a key's block (a compact
/// sequence written flush with its key) but not to an item's block.
fn block_end(lines: &[&str], line: usize, column: usize, limit: usize, is_key: bool) -> usize {
    for (index, text) in lines.iter().enumerate().take(limit).skip(line + 1) {
        if is_skippable(text) {
            continue;
        }
        let indent = indent_of(text);
        if indent < column || (indent == column && !(is_key && is_dash_item(text))) {
            return index;
        }
    }
    limit
}

/// Walks `segments` top-down over `lines`, returning the final match.
pub(crate) fn locate(lines: &[&str], segments: &[PathSegment]) -> Option<Located> {
    let mut scope = Scope {
        start: 0,
        end: lines.len(),
        inline: None,
    };
    let mut found = None;

    for segment in segments {
        let column = scope.child_column(lines)?;
        let located = match segment {
            PathSegment::Key(key) => find_key(lines, &scope, column, key)?,
            PathSegment::Index(index) => find_index(lines, &scope, column, *index)?,
        };
        scope = located.child_scope();
        found = Some(located);
    }

    found
}

fn find_key(lines: &[&str], scope: &Scope, column: usize, key: &str) -> Option<Located> {
    for index in scope.start..scope.end.min(lines.len()) {
        let line = lines[index];
        if is_skippable(line) {
            continue;
        }
        let (at, content) = scope.view(index, line);
        if at == column && starts_with_key(content, key) {
            return Some(Located {
                line: index,
                column,
                end: block_end(lines, index, column, scope.end, true),
                body: None,
            });
        }
    }
    None
}

fn find_index(lines: &[&str], scope: &Scope, column: usize, wanted: usize) -> Option<Located> {
    let mut count = 0;

    for index in scope.start..scope.end.min(lines.len()) {
        let line = lines[index];
        if is_skippable(line) {
            continue;
        }
        let is_item = match scope.inline {
            Some(_) if index == scope.start => dash_columns(line).contains(&column),
            _ => indent_of(line) == column && is_dash_item(line),
        };
        if !is_item {
            continue;
        }
        if count == wanted {
            let after_dash = content_from(line, column + 1);
            let body = if after_dash.trim().is_empty() {
                None
            } else {
                Some(column + 1 + indent_of(after_dash))
            };
            return Some(Located {
                line: index,
                column,
                end: block_end(lines, index, column, scope.end, false),
                body,
            });
        }
        count += 1;
    }

    None
}

/// Forward resolution: the text range occupied by `path`.
///
/// With `leaf`, resolves `path.leaf` to the single line holding that key.
/// A path ending in an index resolves to the item's dash line. Any other
/// path resolves to its whole section: the key line through the last
/// non-blank line indented under it.
///
/// Returns `None` for the root path or a path missing from the text.
pub fn find_range(text: &str, path: &LogicalPath, leaf: Option<&str>) -> Option<TextRange> {
    let lines = split_lines(text);
    let mut segments = path.segments().to_vec();
    if let Some(leaf) = leaf {
        segments.push(PathSegment::Key(leaf.to_string()));
    }
    if segments.is_empty() {
        return None;
    }

    let Some(located) = locate(&lines, &segments) else {
        tracing::debug!(%path, ?leaf, "path not found in text");
        return None;
    };

    let single_line = leaf.is_some() || matches!(segments.last(), Some(PathSegment::Index(_)));
    let last = if single_line {
        located.line
    } else {
        (located.line..located.end)
            .rev()
            .find(|&index| !lines[index].trim().is_empty())
            .unwrap_or(located.line)
    };

    Some(TextRange {
        start_line: located.line + 1,
        start_column: 1,
        end_line: last + 1,
        end_column: lines[last].chars().count() + 1,
        anchor_column: located.column + 1,
    })
}

/// Backward resolution: the path a cursor position belongs to.
///
/// Tries, in order: the line map entry for the line; the nearest mapped
/// line above it; then the line's own content, either a `key:` searched
/// for by name or a `- item` searched for by value.
pub fn find_path(
    text: &str,
    tree: &LogicalTree,
    line_map: &LineMap,
    position: Position,
) -> Option<LogicalPath> {
    if let Some(path) = line_map.get(position.line) {
        return Some(path.clone());
    }
    if let Some((_, path)) = line_map.nearest_at_or_before(position.line) {
        return Some(path.clone());
    }

    let lines = split_lines(text);
    let line = lines.get(position.line.checked_sub(1)?)?;

    if let Some(key) = key_of(line) {
        if let Some(path) = find_key_path(text, tree, key, position.line) {
            return Some(path);
        }
    }
    if let Some(item) = dash_item_text(line) {
        if let Some(path) = find_item_path(tree, strip_quotes(item)) {
            return Some(path);
        }
    }

    tracing::debug!(line = position.line, "no path at position");
    None
}

/// Finds a node named `key`, preferring one whose key line is within one
/// line of `near`.
fn find_key_path(text: &str, tree: &LogicalTree, key: &str, near: usize) -> Option<LogicalPath> {
    let mut candidates = Vec::new();
    tree.walk(|path, _| {
        if let Some(PathSegment::Key(name)) = path.last() {
            if name == key {
                candidates.push(path.clone());
            }
        }
    });

    candidates
        .iter()
        .find(|path| {
            find_range(text, path, None)
                .is_some_and(|range| range.start_line.abs_diff(near) <= 1)
        })
        .or_else(|| candidates.first())
        .cloned()
}

/// Finds the first sequence item whose scalar text equals `item`.
fn find_item_path(tree: &LogicalTree, item: &str) -> Option<LogicalPath> {
    let mut found = None;
    tree.walk(|path, node| {
        if found.is_none()
            && matches!(path.last(), Some(PathSegment::Index(_)))
            && node.string_form().as_deref() == Some(item)
        {
            found = Some(path.clone());
        }
    });
    found
}
