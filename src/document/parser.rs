//! YAML parsing into the logical tree.
//!
//! `serde_yaml` does the actual parsing; this module converts its value tree
//! into a `LogicalTree` and turns failures into a `ParseError`. The library
//! reports error locations only inside its message text, so the line and
//! column are recovered by scanning the message for `line N` and
//! `column M`.
//!
//! # Example
//!
//! ```
//! use yamlsync::document::parser::parse_document;
//!
//! let tree = parse_document("name: Acme\nsize: 3\n").unwrap();
//! assert_eq!(tree.root().child_count(), 2);
//!
//! let err = parse_document("a: 1\n  b: 2\n").unwrap_err();
//! assert!(err.position().is_some());
//! ```

use super::node::{LogicalNode, ScalarValue};
use super::tree::LogicalTree;
use indexmap::IndexMap;
use serde_yaml::Value as SerdeValue;
use std::fmt;

/// 1-indexed location of a parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorPosition {
    pub line: usize,
    pub column: usize,
}

/// Malformed document text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    message: String,
    position: Option<ErrorPosition>,
}

impl ParseError {
    /// Builds an error from a raw library message, recovering the position if
    /// the message mentions both a line and a column.
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        let position = match (
            number_after(&message, "line "),
            number_after(&message, "column "),
        ) {
            (Some(line), Some(column)) => Some(ErrorPosition { line, column }),
            _ => None,
        };
        Self { message, position }
    }

    /// The raw message from the parser.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn position(&self) -> Option<ErrorPosition> {
        self.position
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position {
            Some(pos) => write!(
                f,
                "Error at line {}, column {}: {}",
                pos.line, pos.column, self.message
            ),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for ParseError {}

/// Finds the first `label` in `message` that is immediately followed by digits.
fn number_after(message: &str, label: &str) -> Option<usize> {
    message.match_indices(label).find_map(|(start, _)| {
        let digits: String = message[start + label.len()..]
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        digits.parse().ok()
    })
}

/// Parses document text into a `LogicalTree`.
///
/// Duplicate keys within one mapping are rejected. Non-string scalar keys
/// are stringified; sequence or mapping keys are rejected.
///
/// # Errors
///
/// Returns a `ParseError` if the text is not a single well-formed YAML
/// document.
pub fn parse_document(text: &str) -> Result<LogicalTree, ParseError> {
    let value: SerdeValue =
        serde_yaml::from_str(text).map_err(|e| ParseError::from_message(e.to_string()))?;
    let root = convert_value(value)?;
    Ok(LogicalTree::new(root))
}

fn convert_value(value: SerdeValue) -> Result<LogicalNode, ParseError> {
    let node = match value {
        SerdeValue::Mapping(map) => {
            let mut entries = IndexMap::with_capacity(map.len());
            for (key, child) in map {
                let key = convert_key(key)?;
                if entries.contains_key(&key) {
                    return Err(ParseError::from_message(format!(
                        "duplicate entry with key \"{}\"",
                        key
                    )));
                }
                entries.insert(key, convert_value(child)?);
            }
            LogicalNode::Mapping(entries)
        }
        SerdeValue::Sequence(items) => LogicalNode::Sequence(
            items
                .into_iter()
                .map(convert_value)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        SerdeValue::Tagged(tagged) => convert_value(tagged.value)?,
        scalar => LogicalNode::Scalar(convert_scalar(scalar)),
    };
    Ok(node)
}

fn convert_scalar(value: SerdeValue) -> ScalarValue {
    match value {
        SerdeValue::String(s) => ScalarValue::String(s),
        SerdeValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                ScalarValue::Integer(i)
            } else if let Some(u) = n.as_u64() {
                ScalarValue::UInteger(u)
            } else {
                ScalarValue::Float(n.as_f64().unwrap_or(0.0))
            }
        }
        SerdeValue::Bool(b) => ScalarValue::Boolean(b),
        _ => ScalarValue::Null,
    }
}

fn convert_key(key: SerdeValue) -> Result<String, ParseError> {
    match key {
        SerdeValue::String(s) => Ok(s),
        SerdeValue::Number(n) => Ok(n.to_string()),
        SerdeValue::Bool(b) => Ok(b.to_string()),
        SerdeValue::Null => Ok("null".to_string()),
        SerdeValue::Tagged(tagged) => convert_key(tagged.value),
        SerdeValue::Sequence(_) | SerdeValue::Mapping(_) => Err(ParseError::from_message(
            "complex mapping keys are not supported",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_document() {
        let tree = parse_document(
            "company:\n  name: Acme\n  members:\n    - Bob\n    - 3\n    - true\n    - ~\n",
        )
        .unwrap();

        let company = tree.root().as_mapping().unwrap().get("company").unwrap();
        let members = company.as_mapping().unwrap().get("members").unwrap();
        let items = members.as_sequence().unwrap();
        assert_eq!(items[0], LogicalNode::string("Bob"));
        assert_eq!(items[1], LogicalNode::Scalar(ScalarValue::Integer(3)));
        assert_eq!(items[2], LogicalNode::Scalar(ScalarValue::Boolean(true)));
        assert_eq!(items[3], LogicalNode::Scalar(ScalarValue::Null));
    }

    #[test]
    fn test_parse_keeps_large_unsigned_exact() {
        let tree = parse_document("id: 18446744073709551615\nsmall: -1\n").unwrap();
        let map = tree.root().as_mapping().unwrap();
        assert_eq!(
            map.get("id"),
            Some(&LogicalNode::Scalar(ScalarValue::UInteger(u64::MAX)))
        );
        assert_eq!(
            map.get("small"),
            Some(&LogicalNode::Scalar(ScalarValue::Integer(-1)))
        );
    }

    #[test]
    fn test_parse_preserves_key_order() {
        let tree = parse_document("zeta: 1\nalpha: 2\nmid: 3\n").unwrap();
        let keys: Vec<&String> = tree.root().as_mapping().unwrap().keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_parse_float_and_numeric_keys() {
        let tree = parse_document("1: one\nratio: 0.5\n").unwrap();
        let map = tree.root().as_mapping().unwrap();
        assert!(map.contains_key("1"));
        assert_eq!(
            map.get("ratio"),
            Some(&LogicalNode::Scalar(ScalarValue::Float(0.5)))
        );
    }

    #[test]
    fn test_parse_error_recovers_position() {
        let err = parse_document("a: 1\n  b: 2\n").unwrap_err();
        let pos = err.position().expect("serde_yaml reports line and column");
        assert_eq!(pos.line, 2);
        assert!(err.to_string().starts_with("Error at line 2, column"));
    }

    #[test]
    fn test_parse_error_without_position() {
        let err = ParseError::from_message("something odd happened");
        assert_eq!(err.position(), None);
        assert_eq!(err.to_string(), "something odd happened");
    }

    #[test]
    fn test_number_after_requires_digits() {
        assert_eq!(number_after("inline 4, line 12 column 3", "line "), Some(12));
        assert_eq!(number_after("no numbers here", "line "), None);
    }

    #[test]
    fn test_parse_rejects_duplicate_keys() {
        assert!(parse_document("a: 1\na: 2\n").is_err());
    }

    #[test]
    fn test_parse_empty_document_is_null() {
        let tree = parse_document("").unwrap();
        assert_eq!(tree.root(), &LogicalNode::Scalar(ScalarValue::Null));
    }
}
