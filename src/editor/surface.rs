//! The text-editing surface the engine drives.
//!
//! `TextSurface` is the narrow interface the engine needs from an editor
//! widget: the full text, cursor and selection, one programmatic edit
//! primitive, and decorations keyed by opaque handles. `BufferSurface` is
//! an in-memory implementation over a `ropey::Rope`, used by the CLI and in
//! tests.
//!
//! Positions are 1-indexed lines and columns, counted in characters.

use crate::sync::resolver::Position;
use ropey::Rope;
use std::collections::HashMap;

/// A selected span of text, from `start` (inclusive) to `end` (exclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub start: Position,
    pub end: Position,
}

impl Selection {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// How a decoration is painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecorationStyle {
    /// A single character marked as erroneous
    Error,
    /// Whole lines of the section under navigation
    Section,
    /// Freshly inserted lines
    Insertion,
}

/// A highlighted range of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoration {
    pub start: Position,
    pub end: Position,
    pub style: DecorationStyle,
    pub whole_line: bool,
}

/// Opaque handle to a decoration added to a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecorationHandle(u64);

/// The editor widget collaborator.
pub trait TextSurface {
    /// The full current text.
    fn text(&self) -> String;

    fn cursor(&self) -> Position;

    /// Moves the cursor, clamping it to the text.
    fn set_cursor(&mut self, position: Position);

    /// The current selection, if any.
    fn selection(&self) -> Option<Selection>;

    /// Replaces the text between `start` and `end` with `text`.
    fn replace_range(&mut self, start: Position, end: Position, text: &str);

    /// Inserts `text` at the start of `line`, appending past the end.
    ///
    /// When appending to text without a final newline, one is added first
    /// so the fragment starts on its own line.
    fn insert_at_line(&mut self, line: usize, text: &str) {
        let line_count = self.line_count();
        if line > line_count {
            let current = self.text();
            let end = Position::new(line_count, usize::MAX);
            if current.is_empty() || current.ends_with('\n') {
                self.replace_range(end, end, text);
            } else {
                self.replace_range(end, end, &format!("\n{}", text));
            }
        } else {
            let at = Position::new(line.max(1), 1);
            self.replace_range(at, at, text);
        }
    }

    /// Number of lines, counting an empty final line after a trailing newline.
    fn line_count(&self) -> usize;

    fn add_decoration(&mut self, decoration: Decoration) -> DecorationHandle;

    fn clear_decoration(&mut self, handle: DecorationHandle);

    /// Characters selected, 0 without a selection.
    fn selection_len(&self) -> usize {
        match self.selection() {
            Some(selection) => {
                let rope = Rope::from_str(&self.text());
                char_offset(&rope, selection.start).abs_diff(char_offset(&rope, selection.end))
            }
            None => 0,
        }
    }
}

/// Length of a 0-indexed line in characters, without its line break.
fn line_length(rope: &Rope, index: usize) -> usize {
    if index >= rope.len_lines() {
        return 0;
    }
    let line = rope.line(index);
    let len = line.len_chars();
    if len > 0 && line.char(len - 1) == '\n' {
        if len > 1 && line.char(len - 2) == '\r' {
            len - 2
        } else {
            len - 1
        }
    } else {
        len
    }
}

/// Character offset of `position`, clamped to the text.
fn char_offset(rope: &Rope, position: Position) -> usize {
    let index = position.line.saturating_sub(1);
    if index >= rope.len_lines() {
        return rope.len_chars();
    }
    let column = position.column.saturating_sub(1).min(line_length(rope, index));
    rope.line_to_char(index) + column
}

/// In-memory text surface backed by a rope.
#[derive(Debug, Clone)]
pub struct BufferSurface {
    rope: Rope,
    cursor: Position,
    selection: Option<Selection>,
    decorations: HashMap<DecorationHandle, Decoration>,
    next_handle: u64,
}

impl Default for BufferSurface {
    fn default() -> Self {
        Self::new("")
    }
}

impl BufferSurface {
    pub fn new(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            cursor: Position::default(),
            selection: None,
            decorations: HashMap::new(),
            next_handle: 0,
        }
    }

    /// Replaces the whole text, clamping the cursor and dropping the selection.
    pub fn set_text(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
        self.selection = None;
        self.cursor = self.clamp(self.cursor);
    }

    pub fn set_selection(&mut self, selection: Option<Selection>) {
        self.selection = selection;
    }

    /// Live decorations, in no particular order.
    pub fn decorations(&self) -> impl Iterator<Item = &Decoration> {
        self.decorations.values()
    }

    pub fn decoration(&self, handle: DecorationHandle) -> Option<&Decoration> {
        self.decorations.get(&handle)
    }

    /// Text of a 1-indexed line without its line break.
    pub fn line(&self, line: usize) -> Option<String> {
        let index = line.checked_sub(1)?;
        if index >= self.rope.len_lines() {
            return None;
        }
        let text = self.rope.line(index).to_string();
        Some(text.trim_end_matches(['\n', '\r']).to_string())
    }

    fn offset(&self, position: Position) -> usize {
        char_offset(&self.rope, position)
    }

    fn position_of(&self, offset: usize) -> Position {
        let clamped = offset.min(self.rope.len_chars());
        let index = self.rope.char_to_line(clamped);
        Position::new(index + 1, clamped - self.rope.line_to_char(index) + 1)
    }

    fn clamp(&self, position: Position) -> Position {
        self.position_of(self.offset(position))
    }
}

impl TextSurface for BufferSurface {
    fn text(&self) -> String {
        self.rope.to_string()
    }

    fn cursor(&self) -> Position {
        self.cursor
    }

    fn set_cursor(&mut self, position: Position) {
        self.cursor = self.clamp(position);
    }

    fn selection(&self) -> Option<Selection> {
        self.selection
    }

    fn replace_range(&mut self, start: Position, end: Position, text: &str) {
        let (from, to) = {
            let a = self.offset(start);
            let b = self.offset(end);
            (a.min(b), a.max(b))
        };
        if from < to {
            self.rope.remove(from..to);
        }
        self.rope.insert(from, text);
        self.selection = None;
        self.cursor = self.clamp(self.cursor);
    }

    fn line_count(&self) -> usize {
        self.rope.len_lines().max(1)
    }

    fn add_decoration(&mut self, decoration: Decoration) -> DecorationHandle {
        let handle = DecorationHandle(self.next_handle);
        self.next_handle += 1;
        self.decorations.insert(handle, decoration);
        handle
    }

    fn clear_decoration(&mut self, handle: DecorationHandle) {
        self.decorations.remove(&handle);
    }

    fn selection_len(&self) -> usize {
        self.selection.map_or(0, |selection| {
            self.offset(selection.start).abs_diff(self.offset(selection.end))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_at_line() {
        let mut surface = BufferSurface::new("a:\n  b: 1\nc: 2\n");
        surface.insert_at_line(3, "  x: 9\n");
        assert_eq!(surface.text(), "a:\n  b: 1\n  x: 9\nc: 2\n");
    }

    #[test]
    fn test_insert_past_end_adds_missing_newline() {
        let mut surface = BufferSurface::new("a:\n  b: 1");
        surface.insert_at_line(3, "  c: 2\n");
        assert_eq!(surface.text(), "a:\n  b: 1\n  c: 2\n");

        let mut surface = BufferSurface::new("a: 1\n");
        surface.insert_at_line(2, "b: 2\n");
        assert_eq!(surface.text(), "a: 1\nb: 2\n");
    }

    #[test]
    fn test_replace_range_and_cursor_clamp() {
        let mut surface = BufferSurface::new("name: Acme\nsize: 3\n");
        surface.set_cursor(Position::new(2, 40));
        assert_eq!(surface.cursor(), Position::new(2, 8));

        surface.replace_range(Position::new(1, 7), Position::new(1, 11), "Initech");
        assert_eq!(surface.line(1).as_deref(), Some("name: Initech"));
    }

    #[test]
    fn test_selection_len() {
        let mut surface = BufferSurface::new("abc\ndef\n");
        surface.set_selection(Some(Selection::new(Position::new(1, 2), Position::new(2, 2))));
        assert_eq!(surface.selection_len(), 4);
        assert!(Selection::new(Position::new(1, 1), Position::new(1, 1)).is_empty());
    }

    /// A surface relying on every default method.
    struct PlainSurface {
        text: String,
        selection: Option<Selection>,
    }

    impl TextSurface for PlainSurface {
        fn text(&self) -> String {
            self.text.clone()
        }

        fn cursor(&self) -> Position {
            Position::default()
        }

        fn set_cursor(&mut self, _position: Position) {}

        fn selection(&self) -> Option<Selection> {
            self.selection
        }

        fn replace_range(&mut self, _start: Position, _end: Position, _text: &str) {}

        fn line_count(&self) -> usize {
            self.text.split('\n').count()
        }

        fn add_decoration(&mut self, _decoration: Decoration) -> DecorationHandle {
            DecorationHandle(0)
        }

        fn clear_decoration(&mut self, _handle: DecorationHandle) {}
    }

    #[test]
    fn test_default_selection_len_matches_buffer() {
        let selection = Selection::new(Position::new(2, 9), Position::new(1, 3));
        let plain = PlainSurface {
            text: "café\r\nnaïve\n".to_string(),
            selection: Some(selection),
        };
        let mut buffer = BufferSurface::new(&plain.text);
        buffer.set_selection(Some(selection));

        // Columns past the line end clamp before the line break
        assert_eq!(plain.selection_len(), 9);
        assert_eq!(buffer.selection_len(), plain.selection_len());

        let empty = PlainSurface {
            text: String::new(),
            selection: None,
        };
        assert_eq!(empty.selection_len(), 0);
    }

    #[test]
    fn test_decoration_handles() {
        let mut surface = BufferSurface::new("a\n");
        let deco = Decoration {
            start: Position::new(1, 1),
            end: Position::new(1, 2),
            style: DecorationStyle::Error,
            whole_line: false,
        };
        let first = surface.add_decoration(deco);
        let second = surface.add_decoration(deco);
        assert_ne!(first, second);
        surface.clear_decoration(first);
        assert_eq!(surface.decorations().count(), 1);
        assert!(surface.decoration(second).is_some());
    }
}
