//! Hover summaries and key completions.
//!
//! Both work from text alone: hover resolves the position backwards through
//! the engine, completions reparse the text before the cursor and suggest
//! every key seen so far.

use super::state::SyncEngine;
use crate::document::node::{LogicalNode, NodeKind};
use crate::document::parser::parse_document;
use crate::document::path::{LogicalPath, PathSegment};
use crate::sync::resolver::Position;
use crate::sync::scan::{indent_of, split_lines};
use std::collections::HashSet;

/// What hovering over a position reveals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hover {
    pub path: LogicalPath,
    /// The key or `[i]` label of the node
    pub title: String,
    pub kind: NodeKind,
    /// `Properties: ...`, `Length: n` or `Value: <json>`
    pub detail: String,
}

impl Hover {
    /// Renders the hover as the lines a tooltip would show.
    pub fn lines(&self) -> Vec<String> {
        vec![
            format!("**{}**", self.title),
            format!("Type: {}", self.kind),
            self.detail.clone(),
        ]
    }
}

/// Summarizes the node at `position`, if one resolves.
pub fn hover(engine: &SyncEngine, position: Position) -> Option<Hover> {
    let path = engine.resolve_backward(position)?;
    let node = engine.tree()?.get(&path)?;

    let title = match path.last()? {
        PathSegment::Key(key) => key.clone(),
        PathSegment::Index(index) => format!("[{}]", index),
    };

    Some(Hover {
        title,
        kind: node.kind(),
        detail: describe(node),
        path,
    })
}

fn describe(node: &LogicalNode) -> String {
    match node {
        LogicalNode::Mapping(entries) => {
            let keys: Vec<&str> = entries.keys().map(String::as_str).collect();
            format!("Properties: {}", keys.join(", "))
        }
        LogicalNode::Sequence(items) => format!("Length: {}", items.len()),
        LogicalNode::Scalar(_) => format!("Value: {}", node.to_json()),
    }
}

/// A key suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// `key:`
    pub label: String,
    pub insert_text: String,
    /// Dotted path of the key the suggestion was taken from
    pub detail: String,
}

/// Suggests every key present in the text before `position`.
///
/// Scalar keys insert `key: `; container keys open a nested block one
/// indentation unit deeper than the cursor's line, and sequence keys also
/// start the first `- ` item. Returns nothing when that text does not parse.
pub fn completions(text: &str, position: Position, indent_unit: usize) -> Vec<Completion> {
    let lines = split_lines(text);
    let Some(line_index) = position.line.checked_sub(1).filter(|&i| i < lines.len()) else {
        return Vec::new();
    };

    let mut prefix: Vec<&str> = lines[..line_index].to_vec();
    let current: String = lines[line_index]
        .chars()
        .take(position.column.saturating_sub(1))
        .collect();
    prefix.push(&current);

    let tree = match parse_document(&prefix.join("\n")) {
        Ok(tree) => tree,
        Err(err) => {
            tracing::debug!(error = %err, "no completions for unparsable prefix");
            return Vec::new();
        }
    };

    let level = indent_of(&current) / indent_unit.max(1);
    let nested = " ".repeat((level + 1) * indent_unit);

    let mut seen = HashSet::new();
    let mut suggestions = Vec::new();
    tree.walk(|path, node| {
        let Some(key) = path.last_key() else {
            return;
        };
        if !seen.insert(key.to_string()) {
            return;
        }

        let insert_text = match node {
            LogicalNode::Sequence(_) => format!("{}:\n{}- ", key, nested),
            LogicalNode::Mapping(_) => format!("{}:\n{}", key, nested),
            LogicalNode::Scalar(_) => format!("{}: ", key),
        };
        suggestions.push(Completion {
            label: format!("{}:", key),
            insert_text,
            detail: path.to_string(),
        });
    });

    suggestions
}
