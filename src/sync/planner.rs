//! Insertion planning for new nodes.
//!
//! `plan_insertion` finds where content added under a parent path belongs:
//! after the parent's last child, at the children's indentation. The
//! children's shape decides how the new content is written:
//!
//! | first child line | context |
//! |---|---|
//! | `- item` | array |
//! | `key:` | object |
//! | `key: value` | key-value |
//! | anything else, or no children | unknown |
//!
//! `render_insertion` then produces the text fragment to insert.
//!
//! # Example
//!
//! ```
//! use yamlsync::document::path::LogicalPath;
//! use yamlsync::sync::planner::{plan_insertion, render_insertion, ContextKind, NewNode};
//!
//! let text = "team:\n  members:\n    - Bob\n";
//! let parent = LogicalPath::parse("team.members").unwrap();
//! let point = plan_insertion(text, &parent, 2).unwrap();
//! assert_eq!(point.context, ContextKind::Array);
//! assert_eq!(point.line, 4);
//!
//! let fragment = render_insertion(&NewNode::ArrayItem { value: "Carol".into() }, &point, 2);
//! assert_eq!(fragment, "    - Carol\n");
//! ```

use super::resolver::locate;
use super::scan::{
    content_from, indent_of, is_dash_item, is_skippable, key_of, opens_block, split_lines,
};
use crate::document::path::{LogicalPath, PathSegment};
use std::fmt;
use std::str::FromStr;

/// Shape of a parent's existing children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextKind {
    Array,
    Object,
    KeyValue,
    Unknown,
}

impl ContextKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContextKind::Array => "array",
            ContextKind::Object => "object",
            ContextKind::KeyValue => "key-value",
            ContextKind::Unknown => "unknown",
        }
    }

    /// Classifies a child line by its content (indentation stripped).
    fn classify(content: &str) -> Self {
        let content = content.trim();
        if content.starts_with('-') {
            ContextKind::Array
        } else if content.ends_with(':') {
            ContextKind::Object
        } else if content.contains(':') {
            ContextKind::KeyValue
        } else {
            ContextKind::Unknown
        }
    }
}

impl fmt::Display for ContextKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where and how to insert content under a parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertionPoint {
    /// 1-indexed line the fragment is inserted before.
    pub line: usize,
    /// Indentation, in spaces, of the new content.
    pub indent: usize,
    pub is_sequence: bool,
    pub context: ContextKind,
}

/// Predefined skeletons offered for common document sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    Department,
    Technology,
    Strategy,
    Region,
}

impl Template {
    /// List-like templates are always written as `- name`.
    pub fn is_list_like(&self) -> bool {
        !matches!(self, Template::Department)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Template::Department => "department",
            Template::Technology => "technology",
            Template::Strategy => "strategy",
            Template::Region => "region",
        }
    }
}

impl FromStr for Template {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "department" => Ok(Template::Department),
            "technology" => Ok(Template::Technology),
            "strategy" => Ok(Template::Strategy),
            "region" => Ok(Template::Region),
            other => Err(format!("Unknown template: {}", other)),
        }
    }
}

/// Content to add under a parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewNode {
    KeyValue { key: String, value: String },
    ArrayItem { value: String },
    /// A nested mapping with one placeholder entry.
    Object { name: String },
    Template { template: Template, name: String },
}

/// Plans an insertion under `parent`.
///
/// A trailing index (`items[2]`) is stripped so the insertion targets the
/// sequence as a whole; the index only confirms an array context.
///
/// Returns `None` when the parent cannot be found in the text or holds an
/// inline value that cannot take block children.
pub fn plan_insertion(
    text: &str,
    parent: &LogicalPath,
    indent_unit: usize,
) -> Option<InsertionPoint> {
    let lines = split_lines(text);
    let (base, index) = parent.split_trailing_index();

    // Children occupy [start, end); an inline child starts partway through `start`.
    let (start, end, inline, parent_line, parent_column) = if base.is_root() {
        (0, lines.len(), None, None, None)
    } else {
        let Some(located) = locate(&lines, base.segments()) else {
            tracing::warn!(%parent, "insertion refused: parent not found");
            return None;
        };
        let line = lines[located.line];
        let takes_children = match (base.last(), located.body) {
            // An item opening a mapping or a nested sequence on its dash line
            (Some(PathSegment::Index(_)), Some(body)) => {
                let content = content_from(line, body);
                key_of(content).is_some() || is_dash_item(content)
            }
            (Some(PathSegment::Index(_)), None) => true,
            _ => opens_block(line),
        };
        if !takes_children {
            tracing::warn!(%parent, "insertion refused: parent holds an inline value");
            return None;
        }
        let start = match located.body {
            Some(_) => located.line,
            None => located.line + 1,
        };
        (
            start,
            located.end,
            located.body,
            Some(located.line),
            Some(located.column),
        )
    };

    let children: Vec<usize> = (start..end)
        .filter(|&i| !is_skippable(lines[i]))
        .collect();

    let point = match (children.first(), children.last()) {
        (Some(&first), Some(&last)) => {
            let (indent, content) = match inline {
                Some(column) if first == start => (column, content_from(lines[first], column)),
                _ => {
                    let indent = indent_of(lines[first]);
                    (indent, content_from(lines[first], indent))
                }
            };
            let mut context = ContextKind::classify(content);
            if let Some(i) = index {
                let mut item = base.segments().to_vec();
                item.push(PathSegment::Index(i));
                if locate(&lines, &item).is_some() {
                    context = ContextKind::Array;
                }
            }
            InsertionPoint {
                line: last + 2,
                indent,
                is_sequence: context == ContextKind::Array,
                context,
            }
        }
        _ => {
            let indent = parent_column.map_or(0, |column| column + indent_unit);
            InsertionPoint {
                line: parent_line.map_or(1, |line| line + 2),
                indent,
                is_sequence: false,
                context: ContextKind::Unknown,
            }
        }
    };

    tracing::debug!(
        %parent,
        line = point.line,
        indent = point.indent,
        context = %point.context,
        "planned insertion"
    );
    Some(point)
}

/// Renders `node` as an indented text fragment for `point`.
///
/// Every line is indented to the insertion column and ends with `\n`.
/// In an array context, mapping content is opened with `- `.
pub fn render_insertion(node: &NewNode, point: &InsertionPoint, indent_unit: usize) -> String {
    let pad = " ".repeat(point.indent);
    let dash = if point.is_sequence { "- " } else { "" };
    let nested = " ".repeat(point.indent + dash.len() + indent_unit);

    match node {
        NewNode::ArrayItem { value } => format!("{}- {}\n", pad, value),
        NewNode::KeyValue { key, value } => format!("{}{}{}: {}\n", pad, dash, key, value),
        NewNode::Object { name } => {
            format!("{}{}{}:\n{}key: value\n", pad, dash, name, nested)
        }
        NewNode::Template { template, name } if template.is_list_like() => {
            format!("{}- {}\n", pad, name)
        }
        NewNode::Template { name, .. } => format!(
            "{pad}{dash}{name}:\n{nested}team_lead: Team Lead Name\n{nested}key_focus: Focus Area\n"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> LogicalPath {
        LogicalPath::parse(s).unwrap()
    }

    #[test]
    fn test_classify() {
        assert_eq!(ContextKind::classify("- Bob"), ContextKind::Array);
        assert_eq!(ContextKind::classify("members:"), ContextKind::Object);
        assert_eq!(ContextKind::classify("lead: Alice"), ContextKind::KeyValue);
        assert_eq!(ContextKind::classify("plain"), ContextKind::Unknown);
    }

    #[test]
    fn test_object_context() {
        let text = "depts:\n  eng:\n    lead: A\n  ops:\n    lead: B\nother: 1\n";
        let point = plan_insertion(text, &path("depts"), 2).unwrap();
        assert_eq!(point.context, ContextKind::Object);
        assert_eq!(point.indent, 2);
        assert_eq!(point.line, 6);
    }

    #[test]
    fn test_empty_parent_indents_one_unit() {
        let text = "a:\n  b:\nc: 1\n";
        let point = plan_insertion(text, &path("a.b"), 2).unwrap();
        assert_eq!(point.indent, 4);
        assert_eq!(point.line, 3);
        assert_eq!(point.context, ContextKind::Unknown);
    }

    #[test]
    fn test_trailing_index_targets_whole_sequence() {
        let text = "tags:\n  - a\n  - b\n\nnext: 1\n";
        let point = plan_insertion(text, &path("tags[0]"), 2).unwrap();
        assert_eq!(point.context, ContextKind::Array);
        assert!(point.is_sequence);
        assert_eq!(point.line, 4);
        assert_eq!(point.indent, 2);
    }

    #[test]
    fn test_nested_sequence_item_takes_children() {
        let text = "grid:\n  - - 1\n    - 2\n";
        let point = plan_insertion(text, &path("grid[0][1]"), 2).unwrap();
        assert_eq!(point.context, ContextKind::Array);
        assert!(point.is_sequence);
        assert_eq!(point.line, 4);
        assert_eq!(point.indent, 4);
        assert_eq!(plan_insertion(text, &path("grid[0]"), 2).map(|p| p.indent), Some(2));
    }

    #[test]
    fn test_refuses_unknown_or_scalar_parent() {
        let text = "a: 1\nb:\n  c: 2\n";
        assert!(plan_insertion(text, &path("missing"), 2).is_none());
        assert!(plan_insertion(text, &path("a"), 2).is_none());
        assert!(plan_insertion("a: [1, 2]\n", &path("a"), 2).is_none());
    }

    #[test]
    fn test_root_parent_appends_at_top_level() {
        let text = "a: 1\nb: 2\n";
        let point = plan_insertion(text, &LogicalPath::root(), 2).unwrap();
        assert_eq!(point.line, 3);
        assert_eq!(point.indent, 0);
        assert_eq!(point.context, ContextKind::KeyValue);
    }

    #[test]
    fn test_render_fragments() {
        let kv = InsertionPoint {
            line: 1,
            indent: 4,
            is_sequence: false,
            context: ContextKind::KeyValue,
        };
        let arr = InsertionPoint {
            is_sequence: true,
            context: ContextKind::Array,
            ..kv
        };

        let pair = NewNode::KeyValue {
            key: "budget".into(),
            value: "100".into(),
        };
        assert_eq!(render_insertion(&pair, &kv, 2), "    budget: 100\n");
        assert_eq!(render_insertion(&pair, &arr, 2), "    - budget: 100\n");

        let object = NewNode::Object {
            name: "qa".into(),
        };
        assert_eq!(render_insertion(&object, &kv, 2), "    qa:\n      key: value\n");

        let dept = NewNode::Template {
            template: Template::Department,
            name: "research".into(),
        };
        assert_eq!(
            render_insertion(&dept, &kv, 2),
            "    research:\n      team_lead: Team Lead Name\n      key_focus: Focus Area\n"
        );

        let region = NewNode::Template {
            template: Template::Region,
            name: "EMEA".into(),
        };
        assert_eq!(render_insertion(&region, &kv, 2), "    - EMEA\n");
    }

    #[test]
    fn test_template_from_str() {
        assert_eq!("Department".parse::<Template>(), Ok(Template::Department));
        assert!("bogus".parse::<Template>().is_err());
    }
}
