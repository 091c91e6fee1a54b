use std::ops::Range as CharRange;

use ropey::Rope;

/// A buffer coordinate: zero-based line and byte column within that line.
///
/// Points order by line first, then column, which is document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Point {
    pub line: usize,
    pub col: usize,
}

impl Point {
    pub const fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.col + 1)
    }
}

/// A span between two points, always stored in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    pub start: Point,
    pub end: Point,
}

impl Range {
    /// Build a range from two endpoints given in either order.
    pub fn new(a: Point, b: Point) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether `line` has at least one position inside the range.
    pub const fn touches_line(&self, line: usize) -> bool {
        line >= self.start.line && line <= self.end.line
    }
}

/// Cursor position in the editor buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    /// Zero-based line index.
    pub line: usize,
    /// Zero-based column (byte offset within the line).
    pub col: usize,
    /// Remembered column for vertical movement (sticky column).
    col_memory: usize,
}

impl Cursor {
    /// Create a cursor at line 0, column 0.
    pub const fn new() -> Self {
        Self {
            line: 0,
            col: 0,
            col_memory: 0,
        }
    }

    /// Create a cursor at a specific position.
    pub const fn at(line: usize, col: usize) -> Self {
        Self {
            line,
            col,
            col_memory: col,
        }
    }

    pub const fn point(&self) -> Point {
        Point::new(self.line, self.col)
    }

    /// Update column and reset column memory to match.
    const fn set_col(&mut self, col: usize) {
        self.col = col;
        self.col_memory = col;
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new()
    }
}

/// Direction for cursor movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// A mutation applied to the rope, in char indices of the text at the time
/// of the edit. Consumers replay these in order to keep tracked positions
/// in sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    Insert {
        at: usize,
        len: usize,
    },
    Remove {
        start: usize,
        end: usize,
        /// Content span `[first, last]` of a line the removal deleted
        /// outright, when there was one.
        removed_line: Option<(usize, usize)>,
    },
}

/// A text buffer backed by a rope data structure.
///
/// Tracks a cursor and an optional selection anchor. Every mutation is
/// recorded as an [`Edit`] so that positions held elsewhere can follow it.
pub struct EditorBuffer {
    rope: Rope,
    cursor: Cursor,
    anchor: Option<Point>,
    dirty: bool,
    edits: Vec<Edit>,
}

impl EditorBuffer {
    /// Create a new buffer from a string.
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            cursor: Cursor::new(),
            anchor: None,
            dirty: false,
            edits: Vec::new(),
        }
    }

    /// Create an empty buffer.
    pub fn empty() -> Self {
        Self::from_text("")
    }

    /// The current cursor position.
    pub const fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Whether the buffer has been modified since creation or last save.
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Mark the buffer as clean (e.g., after saving).
    pub const fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Total number of lines in the buffer.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Get the content of a line (without trailing newline).
    pub fn line_at(&self, line_idx: usize) -> Option<String> {
        if line_idx >= self.rope.len_lines() {
            return None;
        }
        let s = self.rope.line(line_idx).to_string();
        Some(s.trim_end_matches('\n').trim_end_matches('\r').to_string())
    }

    /// Length of a line in bytes (without trailing newline).
    pub fn line_len(&self, line_idx: usize) -> usize {
        self.line_at(line_idx).map_or(0, |s| s.len())
    }

    /// The full text content of the buffer.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    // --- Position conversion ---

    /// Clamp a point onto existing text.
    pub fn clamp_point(&self, point: Point) -> Point {
        let line = point.line.min(self.line_count().saturating_sub(1));
        let line_text = self.line_at(line).unwrap_or_default();
        let mut col = point.col.min(line_text.len());
        while !line_text.is_char_boundary(col) {
            col -= 1;
        }
        Point::new(line, col)
    }

    /// Convert a point to a ropey char index.
    pub fn point_to_char(&self, point: Point) -> usize {
        let point = self.clamp_point(point);
        let byte = self.rope.line_to_byte(point.line) + point.col;
        self.rope.byte_to_char(byte)
    }

    /// Convert a ropey char index back to a point.
    pub fn char_to_point(&self, char_idx: usize) -> Point {
        let char_idx = char_idx.min(self.rope.len_chars());
        let line = self.rope.char_to_line(char_idx);
        let col = self.rope.char_to_byte(char_idx) - self.rope.line_to_byte(line);
        self.clamp_point(Point::new(line, col))
    }

    // --- Selection ---

    /// The active selection, if it spans at least one character.
    pub fn selection(&self) -> Option<Range> {
        let anchor = self.anchor?;
        let range = Range::new(anchor, self.cursor.point());
        (!range.is_empty()).then_some(range)
    }

    /// Select `range`, leaving the cursor at its end.
    pub fn select(&mut self, range: Range) {
        let start = self.clamp_point(range.start);
        let end = self.clamp_point(range.end);
        self.anchor = Some(start);
        self.cursor = Cursor::at(end.line, end.col);
    }

    /// Collapse the selection onto the cursor without touching text.
    pub const fn clear_selection(&mut self) {
        self.anchor = None;
    }

    /// Text covered by the selection.
    pub fn selected_text(&self) -> Option<String> {
        let range = self.selection()?;
        let chars = self.char_range(range);
        Some(self.rope.slice(chars).to_string())
    }

    /// Delete the selected text, leaving the cursor at the selection start.
    ///
    /// Returns `true` if anything was deleted.
    pub fn delete_selection(&mut self) -> bool {
        let Some(range) = self.selection() else {
            self.anchor = None;
            return false;
        };
        let chars = self.char_range(range);
        let removed_line = self.whole_line_span(chars.start, chars.end);
        self.rope_remove(chars, removed_line);
        self.anchor = None;
        self.cursor = Cursor::at(range.start.line, range.start.col);
        true
    }

    // --- Editing ---

    /// Insert a character at the cursor position.
    pub fn insert_char(&mut self, ch: char) {
        self.delete_selection();
        let char_idx = self.cursor_char_idx();
        self.rope_insert(char_idx, ch.encode_utf8(&mut [0; 4]));
        self.cursor.set_col(self.cursor.col + ch.len_utf8());
    }

    /// Insert a string at the cursor position.
    pub fn insert_str(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        self.delete_selection();
        let char_idx = self.cursor_char_idx();
        self.rope_insert(char_idx, s);

        // Move cursor to end of inserted text
        let lines: Vec<&str> = s.split('\n').collect();
        if lines.len() > 1 {
            self.cursor.line += lines.len() - 1;
            self.cursor.set_col(lines.last().map_or(0, |l| l.len()));
        } else {
            self.cursor.set_col(self.cursor.col + s.len());
        }
    }

    /// Split the current line at the cursor (Enter key).
    pub fn split_line(&mut self) {
        self.delete_selection();
        let char_idx = self.cursor_char_idx();
        self.rope_insert(char_idx, "\n");
        self.cursor.line += 1;
        self.cursor.set_col(0);
    }

    /// Delete the character before the cursor (Backspace).
    ///
    /// Returns `true` if a character was deleted.
    pub fn delete_back(&mut self) -> bool {
        if self.delete_selection() {
            return true;
        }
        if self.cursor.col == 0 && self.cursor.line == 0 {
            return false;
        }

        let char_idx = self.cursor_char_idx();
        if self.cursor.col == 0 {
            // Join with previous line
            let prev_line_len = self.line_len(self.cursor.line - 1);
            let line_break = self.line_break(self.cursor.line - 1);
            self.rope_remove(line_break, None);
            self.cursor.line -= 1;
            self.cursor.set_col(prev_line_len);
        } else {
            let line = self.line_at(self.cursor.line).unwrap_or_default();
            let prev_char_len = line[..self.cursor.col]
                .chars()
                .next_back()
                .map_or(1, char::len_utf8);
            self.rope_remove(char_idx - 1..char_idx, None);
            self.cursor.set_col(self.cursor.col - prev_char_len);
        }
        true
    }

    /// Delete the character at the cursor (Delete key).
    ///
    /// Returns `true` if a character was deleted.
    pub fn delete_forward(&mut self) -> bool {
        if self.delete_selection() {
            return true;
        }
        let line_len = self.line_len(self.cursor.line);
        if self.cursor.col >= line_len && self.cursor.line + 1 >= self.line_count() {
            return false;
        }

        if self.cursor.col >= line_len {
            let line_break = self.line_break(self.cursor.line);
            self.rope_remove(line_break, None);
        } else {
            let char_idx = self.cursor_char_idx();
            self.rope_remove(char_idx..char_idx + 1, None);
        }
        true
    }

    /// Delete the whole line `line_idx`, including its terminator.
    ///
    /// Returns `true` if a line was removed.
    pub fn delete_line(&mut self, line_idx: usize) -> bool {
        if line_idx >= self.line_count() {
            return false;
        }
        self.anchor = None;
        let line_start = self.rope.line_to_char(line_idx);
        let content_end = line_start + self.line_char_len(line_idx);
        let is_last = line_idx + 1 >= self.line_count();

        let chars = if !is_last {
            line_start..self.rope.line_to_char(line_idx + 1)
        } else if line_idx > 0 {
            // Last line: take the newline that ends the previous line instead.
            line_start - 1..content_end
        } else {
            line_start..content_end
        };
        if chars.is_empty() {
            return false;
        }
        self.rope_remove(chars, Some((line_start, content_end)));

        let target = line_idx.min(self.line_count().saturating_sub(1));
        self.cursor = Cursor::at(target, 0);
        true
    }

    /// Drain the edits recorded since the last call.
    pub fn take_edits(&mut self) -> Vec<Edit> {
        std::mem::take(&mut self.edits)
    }

    // --- Cursor movement ---

    /// Move the cursor in the given direction.
    pub fn move_cursor(&mut self, direction: Direction) {
        self.anchor = None;
        match direction {
            Direction::Left => self.move_left(),
            Direction::Right => self.move_right(),
            Direction::Up => self.move_up(),
            Direction::Down => self.move_down(),
        }
    }

    /// Move cursor to the beginning of the line (Home).
    pub const fn move_home(&mut self) {
        self.anchor = None;
        self.cursor.set_col(0);
    }

    /// Move cursor to the end of the line (End).
    pub fn move_end(&mut self) {
        self.anchor = None;
        let len = self.line_len(self.cursor.line);
        self.cursor.set_col(len);
    }

    /// Move cursor one word to the left (Ctrl+Left).
    pub fn move_word_left(&mut self) {
        self.anchor = None;
        if self.cursor.col == 0 {
            if self.cursor.line > 0 {
                self.cursor.line -= 1;
                self.cursor.set_col(self.line_len(self.cursor.line));
            }
            return;
        }

        let line = self.line_at(self.cursor.line).unwrap_or_default();
        let trimmed = line[..self.cursor.col].trim_end();
        if trimmed.is_empty() {
            self.cursor.set_col(0);
            return;
        }

        let pos = trimmed
            .rfind(|c: char| !c.is_alphanumeric() && c != '_')
            .map_or(0, |i| i + 1);
        self.cursor.set_col(pos);
    }

    /// Move cursor one word to the right (Ctrl+Right).
    pub fn move_word_right(&mut self) {
        self.anchor = None;
        let line_len = self.line_len(self.cursor.line);
        if self.cursor.col >= line_len {
            if self.cursor.line + 1 < self.line_count() {
                self.cursor.line += 1;
                self.cursor.set_col(0);
            }
            return;
        }

        let line = self.line_at(self.cursor.line).unwrap_or_default();
        let after = &line[self.cursor.col..];
        let word_end = after
            .find(|c: char| !c.is_alphanumeric() && c != '_')
            .unwrap_or(after.len());
        let rest = &after[word_end..];
        let space_end = rest
            .find(|c: char| c.is_alphanumeric() || c == '_')
            .unwrap_or(rest.len());

        self.cursor.set_col(self.cursor.col + word_end + space_end);
    }

    /// Move cursor to a specific line and column, collapsing any selection.
    pub fn move_to(&mut self, line: usize, col: usize) {
        self.anchor = None;
        let point = self.clamp_point(Point::new(line, col));
        self.cursor = Cursor::at(point.line, point.col);
    }

    /// Move the cursor to the start of the buffer (Ctrl+Home).
    pub const fn move_to_start(&mut self) {
        self.anchor = None;
        self.cursor = Cursor::new();
    }

    /// Move the cursor to the end of the buffer (Ctrl+End).
    pub fn move_to_end(&mut self) {
        self.anchor = None;
        let last_line = self.line_count().saturating_sub(1);
        self.cursor = Cursor::at(last_line, self.line_len(last_line));
    }

    // --- Private helpers ---

    fn cursor_char_idx(&self) -> usize {
        self.point_to_char(self.cursor.point())
    }

    fn char_range(&self, range: Range) -> CharRange<usize> {
        self.point_to_char(range.start)..self.point_to_char(range.end)
    }

    /// Number of chars on a line, excluding its terminator.
    fn line_char_len(&self, line_idx: usize) -> usize {
        self.line_at(line_idx).map_or(0, |s| s.chars().count())
    }

    /// The terminator of `line_idx` (`\n` or `\r\n`) as a char range.
    fn line_break(&self, line_idx: usize) -> CharRange<usize> {
        let start = self.rope.line_to_char(line_idx) + self.line_char_len(line_idx);
        start..self.rope.line_to_char(line_idx + 1)
    }

    /// The content span of the line starting at `start` when `[start, end)`
    /// removes it together with its terminator.
    fn whole_line_span(&self, start: usize, end: usize) -> Option<(usize, usize)> {
        let line = self.rope.char_to_line(start);
        let line_start = self.rope.line_to_char(line);
        if start != line_start || line + 1 >= self.line_count() {
            return None;
        }
        let next_start = self.rope.line_to_char(line + 1);
        (end >= next_start).then(|| (line_start, line_start + self.line_char_len(line)))
    }

    fn rope_insert(&mut self, char_idx: usize, text: &str) {
        self.rope.insert(char_idx, text);
        self.edits.push(Edit::Insert {
            at: char_idx,
            len: text.chars().count(),
        });
        self.dirty = true;
    }

    fn rope_remove(&mut self, chars: CharRange<usize>, removed_line: Option<(usize, usize)>) {
        self.edits.push(Edit::Remove {
            start: chars.start,
            end: chars.end,
            removed_line,
        });
        self.rope.remove(chars);
        self.dirty = true;
    }

    fn move_left(&mut self) {
        if self.cursor.col > 0 {
            let line = self.line_at(self.cursor.line).unwrap_or_default();
            let prev_char_len = line[..self.cursor.col]
                .chars()
                .next_back()
                .map_or(1, char::len_utf8);
            self.cursor.set_col(self.cursor.col - prev_char_len);
        } else if self.cursor.line > 0 {
            self.cursor.line -= 1;
            self.cursor.set_col(self.line_len(self.cursor.line));
        }
    }

    fn move_right(&mut self) {
        let line_len = self.line_len(self.cursor.line);
        if self.cursor.col < line_len {
            let line = self.line_at(self.cursor.line).unwrap_or_default();
            let next_char_len = line[self.cursor.col..]
                .chars()
                .next()
                .map_or(1, char::len_utf8);
            self.cursor.set_col(self.cursor.col + next_char_len);
        } else if self.cursor.line + 1 < self.line_count() {
            self.cursor.line += 1;
            self.cursor.set_col(0);
        }
    }

    fn move_up(&mut self) {
        if self.cursor.line > 0 {
            self.cursor.line -= 1;
            self.cursor.col = self.sticky_col(self.cursor.line);
        }
    }

    fn move_down(&mut self) {
        if self.cursor.line + 1 < self.line_count() {
            self.cursor.line += 1;
            self.cursor.col = self.sticky_col(self.cursor.line);
        }
    }

    fn sticky_col(&self, line_idx: usize) -> usize {
        self.clamp_point(Point::new(line_idx, self.cursor.col_memory))
            .col
    }
}

impl std::fmt::Debug for EditorBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorBuffer")
            .field(
                "rope",
                &format_args!("Rope({} lines)", self.rope.len_lines()),
            )
            .field("cursor", &self.cursor)
            .field("anchor", &self.anchor)
            .field("dirty", &self.dirty)
            .finish_non_exhaustive()
    }
}
