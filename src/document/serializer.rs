//! Block-style YAML emitter for a `LogicalTree`.
//!
//! Output is deterministic: mappings and sequences are always written in
//! block style, sequences are indented under their key, and a mapping that
//! is a sequence item starts on the dash line (`- name: x`). Empty
//! containers fall back to flow style (`{}` / `[]`). Strings are written
//! plain unless a plain scalar would be read back as something else, in
//! which case they are double-quoted.
//!
//! # Example
//!
//! ```
//! use yamlsync::document::parser::parse_document;
//! use yamlsync::document::serializer::stringify;
//!
//! let tree = parse_document("team: {lead: Alice, members: [Bob, Carol]}").unwrap();
//! assert_eq!(
//!     stringify(&tree, 2),
//!     "team:\n  lead: Alice\n  members:\n    - Bob\n    - Carol\n"
//! );
//! ```

use super::node::{LogicalNode, ScalarValue};
use super::tree::LogicalTree;
use indexmap::IndexMap;

/// Serializes `tree` as block YAML using `indent_width` spaces per level.
///
/// A width of 0 is treated as 1.
pub fn stringify(tree: &LogicalTree, indent_width: usize) -> String {
    let width = indent_width.max(1);
    let mut lines = Vec::new();

    match tree.root() {
        LogicalNode::Mapping(entries) if !entries.is_empty() => {
            write_mapping(entries, 0, width, &mut lines)
        }
        LogicalNode::Sequence(items) if !items.is_empty() => {
            write_sequence(items, 0, width, &mut lines)
        }
        node => lines.push(inline_value(node).unwrap_or_default()),
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// The single-line form of a scalar or empty container, `None` for anything
/// that needs its own block.
fn inline_value(node: &LogicalNode) -> Option<String> {
    match node {
        LogicalNode::Scalar(value) => Some(serialize_scalar(value)),
        LogicalNode::Mapping(entries) if entries.is_empty() => Some("{}".to_string()),
        LogicalNode::Sequence(items) if items.is_empty() => Some("[]".to_string()),
        _ => None,
    }
}

fn write_mapping(
    entries: &IndexMap<String, LogicalNode>,
    indent: usize,
    width: usize,
    lines: &mut Vec<String>,
) {
    let pad = " ".repeat(indent);
    for (key, value) in entries {
        let key = serialize_string(key);
        match inline_value(value) {
            Some(text) => lines.push(format!("{}{}: {}", pad, key, text)),
            None => {
                lines.push(format!("{}{}:", pad, key));
                write_block(value, indent + width, width, lines);
            }
        }
    }
}

fn write_sequence(items: &[LogicalNode], indent: usize, width: usize, lines: &mut Vec<String>) {
    let pad = " ".repeat(indent);
    for item in items {
        match inline_value(item) {
            Some(text) => lines.push(format!("{}- {}", pad, text)),
            None => {
                // Nested block content sits two columns right of the dash, and
                // its first line is pulled up onto the dash line.
                let mut nested = Vec::new();
                write_block(item, indent + 2, width, &mut nested);
                for (i, line) in nested.into_iter().enumerate() {
                    if i == 0 {
                        lines.push(format!("{}- {}", pad, &line[indent + 2..]));
                    } else {
                        lines.push(line);
                    }
                }
            }
        }
    }
}

fn write_block(node: &LogicalNode, indent: usize, width: usize, lines: &mut Vec<String>) {
    match node {
        LogicalNode::Mapping(entries) => write_mapping(entries, indent, width, lines),
        LogicalNode::Sequence(items) => write_sequence(items, indent, width, lines),
        LogicalNode::Scalar(value) => {
            lines.push(format!("{}{}", " ".repeat(indent), serialize_scalar(value)))
        }
    }
}

fn serialize_scalar(value: &ScalarValue) -> String {
    match value {
        ScalarValue::String(s) => serialize_string(s),
        ScalarValue::Integer(i) => i.to_string(),
        ScalarValue::UInteger(u) => u.to_string(),
        ScalarValue::Float(f) => {
            if f.is_nan() {
                ".nan".to_string()
            } else if f.is_infinite() {
                let text = if *f > 0.0 { ".inf" } else { "-.inf" };
                text.to_string()
            } else if f.fract() == 0.0 {
                // Keep a fraction so the value reads back as a float
                format!("{:.1}", f)
            } else {
                f.to_string()
            }
        }
        ScalarValue::Boolean(b) => b.to_string(),
        ScalarValue::Null => "null".to_string(),
    }
}

fn serialize_string(s: &str) -> String {
    if needs_quotes(s) {
        format!("\"{}\"", escape_string(s))
    } else {
        s.to_string()
    }
}

/// Returns true if `s` written as a plain scalar would not read back as the
/// same string.
fn needs_quotes(s: &str) -> bool {
    const RESERVED: &[&str] = &[
        "true", "false", "yes", "no", "on", "off", "y", "n", "null", "~",
    ];
    const INDICATORS: &[char] = &[
        '-', '?', ':', ',', '[', ']', '{', '}', '#', '&', '*', '!', '|', '>', '\'', '"', '%',
        '@', '`',
    ];

    let Some(first) = s.chars().next() else {
        return true;
    };

    if first.is_whitespace() || s.ends_with(char::is_whitespace) {
        return true;
    }
    if INDICATORS.contains(&first) {
        return true;
    }
    if s.contains(": ") || s.contains(" #") || s.ends_with(':') {
        return true;
    }
    if s.chars().any(|c| c.is_control() || is_line_separator(c)) {
        return true;
    }

    let lower = s.to_ascii_lowercase();
    if RESERVED.contains(&lower.as_str()) {
        return true;
    }
    looks_numeric(&lower)
}

/// Unicode line and paragraph separators, which YAML reads as line breaks.
fn is_line_separator(c: char) -> bool {
    c == '\u{2028}' || c == '\u{2029}'
}

fn looks_numeric(lower: &str) -> bool {
    if lower.parse::<f64>().is_ok() {
        return true;
    }
    let unsigned = lower.trim_start_matches(['+', '-']);
    unsigned.starts_with("0x")
        || unsigned.starts_with("0o")
        || unsigned.starts_with("0b")
        || unsigned == ".inf"
        || unsigned == ".nan"
}

/// Escapes a string for a double-quoted YAML scalar.
fn escape_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());

    for c in s.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '"' => result.push_str("\\\""),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            '\x08' => result.push_str("\\b"),
            '\x0C' => result.push_str("\\f"),
            '\u{2028}' => result.push_str("\\L"),
            '\u{2029}' => result.push_str("\\P"),
            c if c.is_control() => {
                result.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => result.push(c),
        }
    }

    result
}
