//! Logical node representation for parsed YAML documents.
//!
//! The parsed document is a closed tree of `LogicalNode` values: scalars,
//! sequences and mappings. Mappings keep insertion order so traversal order
//! matches the order keys appear in the document text, which the line-map
//! builder relies on.
//!
//! # Example
//!
//! ```
//! use yamlsync::document::node::{LogicalNode, ScalarValue};
//! use indexmap::IndexMap;
//!
//! let mut map = IndexMap::new();
//! map.insert("name".to_string(), LogicalNode::string("yamlsync"));
//! map.insert("version".to_string(), LogicalNode::Scalar(ScalarValue::Integer(1)));
//! let node = LogicalNode::Mapping(map);
//!
//! assert!(node.is_container());
//! assert_eq!(node.child_count(), 2);
//! ```

use indexmap::IndexMap;

/// A scalar leaf value.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    String(String),
    Integer(i64),
    /// Integers above `i64::MAX`, kept exact
    UInteger(u64),
    Float(f64),
    Boolean(bool),
    Null,
}

impl std::fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScalarValue::String(s) => write!(f, "{}", s),
            ScalarValue::Integer(i) => write!(f, "{}", i),
            ScalarValue::UInteger(u) => write!(f, "{}", u),
            ScalarValue::Float(fl) => write!(f, "{}", fl),
            ScalarValue::Boolean(b) => write!(f, "{}", b),
            ScalarValue::Null => write!(f, "null"),
        }
    }
}

impl ScalarValue {
    pub fn is_string(&self) -> bool {
        matches!(self, ScalarValue::String(_))
    }

    pub fn is_number(&self) -> bool {
        matches!(
            self,
            ScalarValue::Integer(_) | ScalarValue::UInteger(_) | ScalarValue::Float(_)
        )
    }
}

/// Classification of a node for display and hover purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Object,
    Array,
    String,
    Number,
    Boolean,
    Null,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Object => "object",
            NodeKind::Array => "array",
            NodeKind::String => "string",
            NodeKind::Number => "number",
            NodeKind::Boolean => "boolean",
            NodeKind::Null => "null",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node of the logical tree.
///
/// Keys are unique within a mapping; the parser rejects documents that
/// repeat a key at the same level.
#[derive(Debug, Clone, PartialEq)]
pub enum LogicalNode {
    Scalar(ScalarValue),
    Sequence(Vec<LogicalNode>),
    Mapping(IndexMap<String, LogicalNode>),
}

impl LogicalNode {
    /// Convenience constructor for a string scalar.
    pub fn string(s: impl Into<String>) -> Self {
        LogicalNode::Scalar(ScalarValue::String(s.into()))
    }

    /// Returns true if this node is a mapping or a sequence.
    ///
    /// # Example
    ///
    /// ```
    /// use yamlsync::document::node::{LogicalNode, ScalarValue};
    ///
    /// assert!(LogicalNode::Sequence(vec![]).is_container());
    /// assert!(!LogicalNode::Scalar(ScalarValue::Null).is_container());
    /// ```
    pub fn is_container(&self) -> bool {
        matches!(self, LogicalNode::Sequence(_) | LogicalNode::Mapping(_))
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self, LogicalNode::Mapping(_))
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self, LogicalNode::Sequence(_))
    }

    pub fn as_mapping(&self) -> Option<&IndexMap<String, LogicalNode>> {
        match self {
            LogicalNode::Mapping(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[LogicalNode]> {
        match self {
            LogicalNode::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&ScalarValue> {
        match self {
            LogicalNode::Scalar(value) => Some(value),
            _ => None,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            LogicalNode::Mapping(_) => NodeKind::Object,
            LogicalNode::Sequence(_) => NodeKind::Array,
            LogicalNode::Scalar(ScalarValue::String(_)) => NodeKind::String,
            LogicalNode::Scalar(
                ScalarValue::Integer(_) | ScalarValue::UInteger(_) | ScalarValue::Float(_),
            ) => {
                NodeKind::Number
            }
            LogicalNode::Scalar(ScalarValue::Boolean(_)) => NodeKind::Boolean,
            LogicalNode::Scalar(ScalarValue::Null) => NodeKind::Null,
        }
    }

    /// Number of direct children (0 for scalars).
    pub fn child_count(&self) -> usize {
        match self {
            LogicalNode::Mapping(entries) => entries.len(),
            LogicalNode::Sequence(items) => items.len(),
            LogicalNode::Scalar(_) => 0,
        }
    }

    /// The plain string form of a scalar, as it would read on a `- item` line.
    ///
    /// Containers have no string form.
    pub fn string_form(&self) -> Option<String> {
        self.as_scalar().map(|value| value.to_string())
    }

    /// Converts the node into a `serde_json::Value`, preserving key order.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as JsonValue;

        match self {
            LogicalNode::Mapping(entries) => {
                let map: serde_json::Map<String, JsonValue> = entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect();
                JsonValue::Object(map)
            }
            LogicalNode::Sequence(items) => {
                JsonValue::Array(items.iter().map(LogicalNode::to_json).collect())
            }
            LogicalNode::Scalar(ScalarValue::String(s)) => JsonValue::String(s.clone()),
            LogicalNode::Scalar(ScalarValue::Integer(i)) => JsonValue::from(*i),
            LogicalNode::Scalar(ScalarValue::UInteger(u)) => JsonValue::from(*u),
            LogicalNode::Scalar(ScalarValue::Float(f)) => serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            LogicalNode::Scalar(ScalarValue::Boolean(b)) => JsonValue::Bool(*b),
            LogicalNode::Scalar(ScalarValue::Null) => JsonValue::Null,
        }
    }
}
