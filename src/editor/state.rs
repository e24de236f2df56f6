//! Synchronization engine state.
//!
//! `SyncEngine` owns everything that must change together when the text
//! changes: the last good tree, its line map and stats, the current parse
//! error, the expanded set, the selected path and the live decorations.
//! UI callbacks hand it a `TextSurface` and it reads or edits the surface
//! synchronously, so a content change is fully revalidated before any later
//! cursor or selection event is resolved.
//!
//! # Example
//!
//! ```
//! use yamlsync::config::Config;
//! use yamlsync::document::path::LogicalPath;
//! use yamlsync::editor::state::SyncEngine;
//!
//! let mut engine = SyncEngine::new(Config::default());
//! assert!(engine.validate("team:\n  lead: Alice\n").is_valid());
//! assert_eq!(engine.line_count(), 3);
//!
//! // A broken edit keeps the last good tree
//! assert!(!engine.validate("team:\n  lead: [Alice\n").is_valid());
//! assert!(engine.error().is_some());
//! assert!(engine.tree().is_some());
//!
//! let lead = LogicalPath::parse("team.lead").unwrap();
//! engine.select(&lead);
//! assert!(engine.is_expanded(&LogicalPath::parse("team").unwrap()));
//! ```

use super::decorations::DecorationTracker;
use super::surface::{Decoration, DecorationStyle, TextSurface};
use super::tree_view::{all_container_paths, build_rows, TreeRow};
use crate::config::{Config, StaleSelection};
use crate::document::parser::{parse_document, ParseError};
use crate::document::path::{LogicalPath, PathSegment};
use crate::document::serializer::stringify;
use crate::document::stats::DocumentStats;
use crate::document::tree::LogicalTree;
use crate::sync::linemap::{build_line_map, LineMap};
use crate::sync::planner::{plan_insertion, render_insertion, InsertionPoint, NewNode};
use crate::sync::resolver::{find_path, find_range, Position, TextRange};
use crate::sync::scan::split_lines;
use std::collections::HashSet;
use std::time::Instant;

/// Represents a message to display to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    pub level: MessageLevel,
}

/// Message severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Warning,
    Error,
}

/// Result of validating a piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Valid,
    Invalid(ParseError),
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validation::Valid)
    }

    pub fn error(&self) -> Option<&ParseError> {
        match self {
            Validation::Valid => None,
            Validation::Invalid(err) => Some(err),
        }
    }
}

/// Status-bar figures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorStats {
    pub line_count: usize,
    pub size_label: String,
    pub cursor: Position,
    pub selection_len: usize,
}

/// The single owner of synchronization state.
#[derive(Debug)]
pub struct SyncEngine {
    config: Config,
    /// Text last handed to `validate`, valid or not.
    text: String,
    tree: Option<LogicalTree>,
    error: Option<ParseError>,
    line_map: LineMap,
    stats: DocumentStats,
    expanded: HashSet<LogicalPath>,
    selected: Option<LogicalPath>,
    decorations: DecorationTracker,
    message: Option<Message>,
    cursor: Position,
    selection_len: usize,
}

impl SyncEngine {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            text: String::new(),
            tree: None,
            error: None,
            line_map: LineMap::new(),
            stats: DocumentStats::default(),
            expanded: HashSet::new(),
            selected: None,
            decorations: DecorationTracker::new(),
            message: None,
            cursor: Position::default(),
            selection_len: 0,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The last successfully parsed tree.
    pub fn tree(&self) -> Option<&LogicalTree> {
        self.tree.as_ref()
    }

    /// The error from the most recent validation, if it failed.
    pub fn error(&self) -> Option<&ParseError> {
        self.error.as_ref()
    }

    pub fn line_map(&self) -> &LineMap {
        &self.line_map
    }

    pub fn line_count(&self) -> usize {
        self.stats.line_count
    }

    pub fn file_size_label(&self) -> String {
        self.stats.size_label()
    }

    pub fn expanded_paths(&self) -> &HashSet<LogicalPath> {
        &self.expanded
    }

    pub fn is_expanded(&self, path: &LogicalPath) -> bool {
        self.expanded.contains(path)
    }

    pub fn selected_path(&self) -> Option<&LogicalPath> {
        self.selected.as_ref()
    }

    pub fn message(&self) -> Option<&Message> {
        self.message.as_ref()
    }

    pub fn set_message(&mut self, text: String, level: MessageLevel) {
        self.message = Some(Message { text, level });
    }

    pub fn clear_message(&mut self) {
        self.message = None;
    }

    pub fn decorations(&self) -> &DecorationTracker {
        &self.decorations
    }

    pub fn editor_stats(&self) -> EditorStats {
        EditorStats {
            line_count: self.stats.line_count,
            size_label: self.stats.size_label(),
            cursor: self.cursor,
            selection_len: self.selection_len,
        }
    }

    /// Parses `text` and, on success, replaces the tree, line map and stats
    /// together.
    ///
    /// On failure the previous tree, line map and stats are kept and only
    /// the error changes. Never touches the text itself.
    ///
    /// The first successful parse seeds the expanded set with the top-level
    /// containers only, since scalars have nothing to expand.
    pub fn validate(&mut self, text: &str) -> Validation {
        self.text = text.to_string();

        let tree = match parse_document(text) {
            Ok(tree) => tree,
            Err(err) => {
                tracing::debug!(error = %err, "validation failed");
                self.error = Some(err.clone());
                return Validation::Invalid(err);
            }
        };

        let first_parse = self.tree.is_none();
        self.line_map = build_line_map(text, &tree);
        self.stats = DocumentStats::measure(text);
        self.error = None;

        if first_parse && self.expanded.is_empty() && self.config.expand_top_level {
            self.expanded.extend(
                tree.top_level_paths()
                    .into_iter()
                    .filter(|path| tree.get(path).is_some_and(|node| node.is_container())),
            );
        }
        self.expanded.retain(|path| tree.contains(path));
        self.selected = self.reconcile_selection(&tree);
        self.tree = Some(tree);

        tracing::debug!(
            lines = self.stats.line_count,
            mapped = self.line_map.len(),
            "validation succeeded"
        );
        Validation::Valid
    }

    fn reconcile_selection(&self, tree: &LogicalTree) -> Option<LogicalPath> {
        let selected = self.selected.as_ref()?;
        if tree.contains(selected) {
            return Some(selected.clone());
        }
        match self.config.stale_selection {
            StaleSelection::Keep => Some(selected.clone()),
            StaleSelection::Clear => None,
            StaleSelection::NearestAncestor => tree.nearest_existing(selected),
        }
    }

    /// Flips the expansion of `path`, returning whether it is now expanded.
    pub fn toggle_expanded(&mut self, path: &LogicalPath) -> bool {
        if self.expanded.remove(path) {
            false
        } else {
            self.expanded.insert(path.clone());
            true
        }
    }

    pub fn expand_all(&mut self) {
        if let Some(tree) = &self.tree {
            self.expanded = all_container_paths(tree);
        }
    }

    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }

    /// Selects `path` and expands every ancestor so the tree view shows it.
    pub fn select(&mut self, path: &LogicalPath) {
        if let Some(parent) = path.parent() {
            self.expanded.extend(parent.prefixes());
        }
        self.selected = Some(path.clone());
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Path to text range, over the current text.
    pub fn resolve_forward(&self, path: &LogicalPath, leaf: Option<&str>) -> Option<TextRange> {
        find_range(&self.text, path, leaf)
    }

    /// Text position to path, through the current line map.
    pub fn resolve_backward(&self, position: Position) -> Option<LogicalPath> {
        find_path(&self.text, self.tree.as_ref()?, &self.line_map, position)
    }

    pub fn plan_insertion(&self, parent: &LogicalPath) -> Option<InsertionPoint> {
        plan_insertion(&self.text, parent, self.config.indent_unit())
    }

    pub fn render_insertion(&self, node: &NewNode, point: &InsertionPoint) -> String {
        render_insertion(node, point, self.config.indent_unit())
    }

    /// Visible tree-view rows for the current tree.
    pub fn rows(&self) -> Vec<TreeRow> {
        match &self.tree {
            Some(tree) => build_rows(tree, &self.expanded, self.selected.as_ref()),
            None => Vec::new(),
        }
    }

    /// Revalidates after the surface's text changed.
    ///
    /// A failure with a known position highlights that character until
    /// the error highlight lifetime passes; success clears it.
    pub fn on_content_changed<S: TextSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        now: Instant,
    ) -> Validation {
        let validation = self.validate(&surface.text());

        match &validation {
            Validation::Valid => {
                self.decorations.clear(surface, DecorationStyle::Error);
                if self.message.as_ref().is_some_and(|m| m.level == MessageLevel::Error) {
                    self.clear_message();
                }
            }
            Validation::Invalid(err) => {
                match err.position() {
                    Some(pos) => {
                        let decoration = Decoration {
                            start: Position::new(pos.line, pos.column),
                            end: Position::new(pos.line, pos.column + 1),
                            style: DecorationStyle::Error,
                            whole_line: false,
                        };
                        self.decorations.replace(
                            surface,
                            decoration,
                            Some(self.config.error_highlight()),
                            now,
                        );
                    }
                    None => self.decorations.clear(surface, DecorationStyle::Error),
                }
                self.set_message(err.to_string(), MessageLevel::Error);
            }
        }

        validation
    }

    /// Selects the path under the moved cursor.
    pub fn on_cursor_moved<S: TextSurface + ?Sized>(&mut self, surface: &S) -> Option<LogicalPath> {
        self.cursor = surface.cursor();
        let path = self.resolve_backward(self.cursor)?;
        self.select(&path);
        Some(path)
    }

    /// Selects the path at the start of a non-empty text selection.
    pub fn on_selection_changed<S: TextSurface + ?Sized>(
        &mut self,
        surface: &S,
    ) -> Option<LogicalPath> {
        let selection = surface.selection().filter(|selection| !selection.is_empty());
        let Some(selection) = selection else {
            self.selection_len = 0;
            return None;
        };

        self.selection_len = surface.selection_len();

        let path = self.resolve_backward(selection.start)?;
        self.select(&path);
        Some(path)
    }

    /// Navigates from the tree view to the text.
    ///
    /// Highlights the resolved range with a section decoration, moves the
    /// cursor onto it and selects the path. For a leaf key the cursor lands
    /// just after the key's colon, otherwise on the key itself.
    pub fn navigate_to<S: TextSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        path: &LogicalPath,
        leaf: Option<&str>,
        now: Instant,
    ) -> Option<TextRange> {
        let Some(range) = self.resolve_forward(path, leaf) else {
            tracing::debug!(%path, "navigation target not found");
            return None;
        };

        let decoration = Decoration {
            start: Position::new(range.start_line, range.start_column),
            end: Position::new(range.end_line, range.end_column),
            style: DecorationStyle::Section,
            whole_line: true,
        };
        self.decorations.replace(surface, decoration, None, now);

        let column = match leaf {
            Some(_) => split_lines(&self.text)
                .get(range.start_line - 1)
                .and_then(|line| line.get(range.anchor_column - 1..))
                .and_then(|rest| rest.find(':'))
                .map_or(range.anchor_column, |colon| range.anchor_column + colon + 1),
            None => range.anchor_column,
        };
        let cursor = Position::new(range.start_line, column);
        surface.set_cursor(cursor);
        self.cursor = surface.cursor();

        let target = match leaf {
            Some(leaf) => path.child_key(leaf),
            None => path.clone(),
        };
        self.select(&target);
        Some(range)
    }

    /// Adds `node` under `parent`.
    ///
    /// Plans the insertion over the surface's text, inserts the rendered
    /// fragment, revalidates and highlights the new lines. Returns `None`,
    /// leaving the text untouched, when the insertion is refused.
    pub fn add_node<S: TextSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        parent: &LogicalPath,
        node: &NewNode,
        now: Instant,
    ) -> Option<InsertionPoint> {
        let text = surface.text();
        let indent_unit = self.config.indent_unit();
        let Some(point) = plan_insertion(&text, parent, indent_unit) else {
            let (base, _) = parent.split_trailing_index();
            let reason = if find_range(&text, &base, None).is_some() {
                "it holds an inline value"
            } else {
                "path not found in text"
            };
            self.set_message(
                format!("Cannot add under '{}': {}", parent, reason),
                MessageLevel::Warning,
            );
            return None;
        };

        let fragment = render_insertion(node, &point, indent_unit);
        let inserted_lines = fragment.lines().count().max(1);
        surface.insert_at_line(point.line, &fragment);

        // The fragment may have been appended after a newline the text lacked
        let first_line = point.line.min(surface.line_count());
        let validation = self.on_content_changed(surface, now);

        let decoration = Decoration {
            start: Position::new(first_line, 1),
            end: Position::new(first_line + inserted_lines - 1, usize::MAX),
            style: DecorationStyle::Insertion,
            whole_line: true,
        };
        self.decorations
            .replace(surface, decoration, Some(self.config.insertion_highlight()), now);

        surface.set_cursor(Position::new(first_line, point.indent + 1));
        self.cursor = surface.cursor();

        if validation.is_valid() {
            self.set_message(format!("Added under '{}'", parent), MessageLevel::Info);
            if let Some(tree) = &self.tree {
                if tree.contains(parent) {
                    let (base, _) = parent.split_trailing_index();
                    self.expanded.extend(base.prefixes());
                }
            }
        }

        Some(point)
    }

    /// Rewrites the surface's text in canonical form.
    ///
    /// Only applies when the current text parses; returns whether the
    /// text was replaced.
    pub fn format_document<S: TextSurface + ?Sized>(&mut self, surface: &mut S, now: Instant) -> bool {
        let text = surface.text();
        let Ok(tree) = parse_document(&text) else {
            self.set_message(
                "Cannot format: document has errors".to_string(),
                MessageLevel::Warning,
            );
            return false;
        };

        let formatted = stringify(&tree, self.config.indent_unit());
        let end = Position::new(surface.line_count(), usize::MAX);
        surface.replace_range(Position::new(1, 1), end, &formatted);
        self.on_content_changed(surface, now);
        self.cursor = surface.cursor();
        self.set_message("Document formatted".to_string(), MessageLevel::Info);
        true
    }

    /// Clears decorations whose lifetime has passed.
    pub fn tick<S: TextSurface + ?Sized>(&mut self, surface: &mut S, now: Instant) -> usize {
        self.decorations.tick(surface, now)
    }

    /// Key path of the last segment, for callers that address leaves by name.
    pub fn leaf_key(path: &LogicalPath) -> Option<(LogicalPath, String)> {
        match path.last()? {
            PathSegment::Key(key) => Some((path.parent()?, key.clone())),
            PathSegment::Index(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::surface::{BufferSurface, Selection};

    fn path(s: &str) -> LogicalPath {
        LogicalPath::parse(s).unwrap()
    }

    #[test]
    fn test_first_parse_seeds_top_level_containers() {
        let mut engine = SyncEngine::new(Config::default());
        engine.validate("a:\n  b: 1\nc: 2\n");
        assert!(engine.is_expanded(&path("a")));
        assert!(!engine.is_expanded(&path("c")));
    }

    #[test]
    fn test_seeding_can_be_disabled() {
        let config = Config {
            expand_top_level: false,
            ..Config::default()
        };
        let mut engine = SyncEngine::new(config);
        engine.validate("a:\n  b: 1\n");
        assert!(engine.expanded_paths().is_empty());
    }

    #[test]
    fn test_toggle_expanded() {
        let mut engine = SyncEngine::new(Config::default());
        engine.validate("a:\n  b:\n    c: 1\n");
        assert!(engine.toggle_expanded(&path("a.b")));
        assert!(!engine.toggle_expanded(&path("a.b")));
        engine.expand_all();
        assert_eq!(engine.expanded_paths().len(), 2);
        engine.collapse_all();
        assert!(engine.expanded_paths().is_empty());
    }

    #[test]
    fn test_stale_selection_policies() {
        let before = "a:\n  b:\n    c: 1\n";
        let after = "a:\n  x: 1\n";

        let mut engine = SyncEngine::new(Config::default());
        engine.validate(before);
        engine.select(&path("a.b.c"));
        engine.validate(after);
        assert_eq!(engine.selected_path(), Some(&path("a")));

        let mut engine = SyncEngine::new(Config {
            stale_selection: StaleSelection::Clear,
            ..Config::default()
        });
        engine.validate(before);
        engine.select(&path("a.b.c"));
        engine.validate(after);
        assert_eq!(engine.selected_path(), None);

        let mut engine = SyncEngine::new(Config {
            stale_selection: StaleSelection::Keep,
            ..Config::default()
        });
        engine.validate(before);
        engine.select(&path("a.b.c"));
        engine.validate(after);
        assert_eq!(engine.selected_path(), Some(&path("a.b.c")));
    }

    #[test]
    fn test_error_highlight_replaced_then_cleared() {
        let mut surface = BufferSurface::new("a: 1\n  b: 2\n");
        let mut engine = SyncEngine::new(Config::default());
        let now = Instant::now();

        assert!(!engine.on_content_changed(&mut surface, now).is_valid());
        assert!(!engine.on_content_changed(&mut surface, now).is_valid());
        assert_eq!(surface.decorations().count(), 1);
        assert_eq!(engine.message().map(|m| m.level), Some(MessageLevel::Error));

        surface.set_text("a: 1\nb: 2\n");
        assert!(engine.on_content_changed(&mut surface, now).is_valid());
        assert_eq!(surface.decorations().count(), 0);
        assert!(engine.message().is_none());
    }

    #[test]
    fn test_error_highlight_expires() {
        let mut surface = BufferSurface::new("a: 1\n  b: 2\n");
        let mut engine = SyncEngine::new(Config::default());
        let now = Instant::now();

        engine.on_content_changed(&mut surface, now);
        let later = now + engine.config().error_highlight();
        assert_eq!(engine.tick(&mut surface, later), 1);
        assert_eq!(surface.decorations().count(), 0);
    }

    #[test]
    fn test_selection_events() {
        let text = "a:\n  b: 1\n  c: 2\n";
        let mut surface = BufferSurface::new(text);
        let mut engine = SyncEngine::new(Config::default());
        engine.on_content_changed(&mut surface, Instant::now());

        surface.set_selection(Some(Selection::new(Position::new(3, 3), Position::new(3, 3))));
        assert_eq!(engine.on_selection_changed(&surface), None);

        surface.set_selection(Some(Selection::new(Position::new(3, 3), Position::new(3, 7))));
        assert_eq!(engine.on_selection_changed(&surface), Some(path("a.c")));
        assert_eq!(engine.editor_stats().selection_len, 4);
    }

    #[test]
    fn test_navigate_places_cursor() {
        let text = "team:\n  lead: Alice\n  members:\n    - Bob\n";
        let mut surface = BufferSurface::new(text);
        let mut engine = SyncEngine::new(Config::default());
        let now = Instant::now();
        engine.on_content_changed(&mut surface, now);

        engine.navigate_to(&mut surface, &path("team"), Some("lead"), now);
        assert_eq!(surface.cursor(), Position::new(2, 8));
        assert_eq!(engine.selected_path(), Some(&path("team.lead")));

        let range = engine
            .navigate_to(&mut surface, &path("team.members"), None, now)
            .unwrap();
        assert_eq!((range.start_line, range.end_line), (3, 4));
        assert_eq!(surface.cursor(), Position::new(3, 3));
        assert_eq!(surface.decorations().count(), 1);
    }

    #[test]
    fn test_add_node_refused_leaves_text() {
        let text = "a: 1\n";
        let mut surface = BufferSurface::new(text);
        let mut engine = SyncEngine::new(Config::default());
        let node = NewNode::ArrayItem { value: "x".into() };
        assert!(engine
            .add_node(&mut surface, &path("a"), &node, Instant::now())
            .is_none());
        assert_eq!(surface.text(), text);
    }

    #[test]
    fn test_refusal_message_names_the_reason() {
        let mut surface = BufferSurface::new("a: 1\nb:\n  c: 2\n");
        let mut engine = SyncEngine::new(Config::default());
        let node = NewNode::ArrayItem { value: "x".into() };

        engine.add_node(&mut surface, &path("a"), &node, Instant::now());
        let inline = engine.message().unwrap();
        assert_eq!(inline.level, MessageLevel::Warning);
        assert!(inline.text.ends_with("it holds an inline value"));

        engine.add_node(&mut surface, &path("zzz"), &node, Instant::now());
        assert!(engine
            .message()
            .unwrap()
            .text
            .ends_with("path not found in text"));
    }

    #[test]
    fn test_first_parse_skips_scalar_top_level_paths() {
        let mut engine = SyncEngine::new(Config::default());
        engine.validate("name: Acme
team:
  lead: Alice
tags: [a]
");
        let expected: HashSet<LogicalPath> = [path("team"), path("tags")].into_iter().collect();
        assert_eq!(engine.expanded_paths(), &expected);
    }

    #[test]
    fn test_format_document() {
        let mut surface = BufferSurface::new("a: {b: 1, c: [x, y]}\n");
        let mut engine = SyncEngine::new(Config::default());
        assert!(engine.format_document(&mut surface, Instant::now()));
        assert_eq!(surface.text(), "a:\n  b: 1\n  c:\n    - x\n    - y\n");

        surface.set_text("a: [\n");
        assert!(!engine.format_document(&mut surface, Instant::now()));
        assert_eq!(surface.text(), "a: [\n");
    }

    #[test]
    fn test_leaf_key() {
        let (parent, leaf) = SyncEngine::leaf_key(&path("a.b")).unwrap();
        assert_eq!(parent, path("a"));
        assert_eq!(leaf, "b");
        assert!(SyncEngine::leaf_key(&path("a[0]")).is_none());
    }
}
