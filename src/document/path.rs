//! Logical paths addressing nodes of a `LogicalTree`.
//!
//! A path is a sequence of mapping keys and array indices, rendered
//! canonically as `a.b.c[2].d`. Indices attach to the preceding key; a path
//! may also start with an index when the document root is a sequence
//! (`[0].name`).
//!
//! Keys that themselves contain `.` or `[` cannot be told apart from path
//! punctuation in the rendered form; such documents still parse, but their
//! paths do not round-trip through `LogicalPath::parse`.
//!
//! # Example
//!
//! ```
//! use yamlsync::document::path::{LogicalPath, PathSegment};
//!
//! let path = LogicalPath::parse("company.members[1]").unwrap();
//! assert_eq!(path.segments().len(), 3);
//! assert_eq!(path.last(), Some(&PathSegment::Index(1)));
//! assert_eq!(path.to_string(), "company.members[1]");
//! ```

use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

/// One step of a logical path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathSegment {
    /// Mapping key
    Key(String),
    /// Sequence index
    Index(usize),
}

impl PathSegment {
    pub fn as_key(&self) -> Option<&str> {
        match self {
            PathSegment::Key(key) => Some(key),
            PathSegment::Index(_) => None,
        }
    }

    pub fn as_index(&self) -> Option<usize> {
        match self {
            PathSegment::Index(index) => Some(*index),
            PathSegment::Key(_) => None,
        }
    }
}

/// Errors produced when parsing a rendered path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathParseError {
    /// A `.` with no key name before or after it.
    EmptyKey { position: usize },
    /// A bracket that does not contain a non-negative integer.
    InvalidIndex { position: usize, found: String },
    /// Input ended inside a bracket.
    UnexpectedEnd { expected: String },
}

impl fmt::Display for PathParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathParseError::EmptyKey { position } => {
                write!(f, "Empty key at position {}", position)
            }
            PathParseError::InvalidIndex { position, found } => write!(
                f,
                "Invalid array index '{}' at position {}, expected a non-negative integer",
                found, position
            ),
            PathParseError::UnexpectedEnd { expected } => {
                write!(f, "Unexpected end of path, expected {}", expected)
            }
        }
    }
}

impl std::error::Error for PathParseError {}

/// A dotted/bracketed address of one node in a tree snapshot.
///
/// The empty path addresses the document root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LogicalPath {
    segments: Vec<PathSegment>,
}

impl LogicalPath {
    pub fn new(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }

    /// The empty path.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parses a rendered path such as `a.b[2].c`.
    ///
    /// The empty string parses to the root path.
    pub fn parse(input: &str) -> Result<Self, PathParseError> {
        PathReader::new(input).read()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.last()
    }

    /// The final key name, ignoring a trailing index.
    ///
    /// `a.members[1]` yields `members`, `a.b` yields `b`.
    pub fn last_key(&self) -> Option<&str> {
        self.segments.iter().rev().find_map(PathSegment::as_key)
    }

    /// Returns a new path with `key` appended.
    pub fn child_key(&self, key: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Key(key.into()));
        Self { segments }
    }

    /// Returns a new path with `index` appended.
    pub fn child_index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Index(index));
        Self { segments }
    }

    /// Returns a new path with all of `other`'s segments appended.
    pub fn join(&self, other: &LogicalPath) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        Self { segments }
    }

    /// The path one segment shorter, or `None` at the root.
    pub fn parent(&self) -> Option<Self> {
        if self.segments.is_empty() {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Splits off a trailing array index: `a.items[3]` becomes (`a.items`, Some(3)).
    pub fn split_trailing_index(&self) -> (Self, Option<usize>) {
        match self.segments.last() {
            Some(PathSegment::Index(index)) => (
                Self {
                    segments: self.segments[..self.segments.len() - 1].to_vec(),
                },
                Some(*index),
            ),
            _ => (self.clone(), None),
        }
    }

    /// Every non-empty prefix of this path, shortest first, ending with the path itself.
    ///
    /// Splits on `.` and on the `[i]` boundary, so `a.b[2].c` yields
    /// `a`, `a.b`, `a.b[2]` and `a.b[2].c`. This is the set of paths that
    /// must be expanded for a tree view to reveal the node.
    pub fn prefixes(&self) -> Vec<LogicalPath> {
        (1..=self.segments.len())
            .map(|len| Self {
                segments: self.segments[..len].to_vec(),
            })
            .collect()
    }

    /// Returns true if `self` is `other` or one of its ancestors.
    pub fn is_prefix_of(&self, other: &LogicalPath) -> bool {
        other.segments.len() >= self.segments.len()
            && other.segments[..self.segments.len()] == self.segments[..]
    }
}

impl fmt::Display for LogicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Key(key) => {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(key)?;
                }
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

impl std::str::FromStr for LogicalPath {
    type Err = PathParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LogicalPath::parse(s)
    }
}

impl From<Vec<PathSegment>> for LogicalPath {
    fn from(segments: Vec<PathSegment>) -> Self {
        Self::new(segments)
    }
}

/// Character reader for rendered paths.
struct PathReader<'a> {
    chars: Peekable<Chars<'a>>,
    position: usize,
}

impl<'a> PathReader<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            position: 0,
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn next(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        self.position += 1;
        Some(ch)
    }

    fn read(mut self) -> Result<LogicalPath, PathParseError> {
        let mut segments = Vec::new();

        if self.peek().is_none() {
            return Ok(LogicalPath::root());
        }

        // A leading key is optional so that root-sequence paths like `[0].a` parse
        if self.peek() != Some('[') {
            segments.push(PathSegment::Key(self.read_key()?));
        }

        while let Some(ch) = self.peek() {
            match ch {
                '[' => segments.push(PathSegment::Index(self.read_index()?)),
                '.' => {
                    self.next();
                    segments.push(PathSegment::Key(self.read_key()?));
                }
                _ => {
                    // Text directly after `]` is treated as a new key
                    segments.push(PathSegment::Key(self.read_key()?));
                }
            }
        }

        Ok(LogicalPath::new(segments))
    }

    fn read_key(&mut self) -> Result<String, PathParseError> {
        let start = self.position;
        let mut key = String::new();
        while let Some(ch) = self.peek() {
            if ch == '.' || ch == '[' {
                break;
            }
            key.push(ch);
            self.next();
        }
        if key.is_empty() {
            Err(PathParseError::EmptyKey { position: start })
        } else {
            Ok(key)
        }
    }

    fn read_index(&mut self) -> Result<usize, PathParseError> {
        let start = self.position;
        self.next(); // '['
        let mut digits = String::new();
        loop {
            match self.next() {
                Some(']') => break,
                Some(ch) => digits.push(ch),
                None => {
                    return Err(PathParseError::UnexpectedEnd {
                        expected: "']'".to_string(),
                    })
                }
            }
        }
        digits
            .trim()
            .parse::<usize>()
            .map_err(|_| PathParseError::InvalidIndex {
                position: start,
                found: digits,
            })
    }
}
