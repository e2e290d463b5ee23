use std::fmt;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Multi-line text with a cursor, backing the new-prompt box and the inline
/// editor. `col` is a byte offset that always sits on a char boundary.
#[derive(Debug, Clone)]
pub struct TextBuffer {
    lines: Vec<String>,
    row: usize,
    col: usize,
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextBuffer {
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
            row: 0,
            col: 0,
        }
    }

    /// Buffer holding `s` with the cursor at the very end.
    pub fn from_string(s: &str) -> Self {
        let mut buf = Self::new();
        buf.set(s);
        buf
    }

    pub fn set(&mut self, s: &str) {
        self.lines = s.split('\n').map(String::from).collect();
        self.row = self.lines.len() - 1;
        self.col = self.lines[self.row].len();
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }

    pub fn is_empty(&self) -> bool {
        self.lines.len() == 1 && self.lines[0].is_empty()
    }

    pub fn is_multiline(&self) -> bool {
        self.lines.len() > 1
    }

    pub fn cursor(&self) -> (usize, usize) {
        (self.row, self.col)
    }

    /// Cursor column in characters, for placing the terminal cursor.
    pub fn cursor_char_col(&self) -> usize {
        self.lines[self.row][..self.col].chars().count()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    // ── Editing ──

    pub fn insert_char(&mut self, c: char) {
        self.lines[self.row].insert(self.col, c);
        self.col += c.len_utf8();
    }

    /// Insert pasted text; `\n` splits lines and `\r` is dropped.
    pub fn insert_str(&mut self, s: &str) {
        for c in s.chars() {
            match c {
                '\n' => self.insert_newline(),
                '\r' => {}
                c => self.insert_char(c),
            }
        }
    }

    pub fn insert_newline(&mut self) {
        let rest = self.lines[self.row].split_off(self.col);
        self.row += 1;
        self.lines.insert(self.row, rest);
        self.col = 0;
    }

    fn prev_boundary(&self) -> usize {
        self.lines[self.row][..self.col]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    pub fn backspace(&mut self) {
        if self.col > 0 {
            let prev = self.prev_boundary();
            self.lines[self.row].remove(prev);
            self.col = prev;
        } else if self.row > 0 {
            let current = self.lines.remove(self.row);
            self.row -= 1;
            self.col = self.lines[self.row].len();
            self.lines[self.row].push_str(&current);
        }
    }

    pub fn delete(&mut self) {
        if self.col < self.lines[self.row].len() {
            self.lines[self.row].remove(self.col);
        } else if self.row + 1 < self.lines.len() {
            let next = self.lines.remove(self.row + 1);
            self.lines[self.row].push_str(&next);
        }
    }

    // ── Movement ──

    pub fn move_left(&mut self) {
        if self.col > 0 {
            self.col = self.prev_boundary();
        } else if self.row > 0 {
            self.row -= 1;
            self.col = self.lines[self.row].len();
        }
    }

    pub fn move_right(&mut self) {
        if let Some(ch) = self.lines[self.row][self.col..].chars().next() {
            self.col += ch.len_utf8();
        } else if self.row + 1 < self.lines.len() {
            self.row += 1;
            self.col = 0;
        }
    }

    /// Returns `false` when already on the first line.
    pub fn move_up(&mut self) -> bool {
        if self.row == 0 {
            return false;
        }
        self.row -= 1;
        self.clamp_col();
        true
    }

    /// Returns `false` when already on the last line.
    pub fn move_down(&mut self) -> bool {
        if self.row + 1 >= self.lines.len() {
            return false;
        }
        self.row += 1;
        self.clamp_col();
        true
    }

    fn clamp_col(&mut self) {
        let line = &self.lines[self.row];
        let mut col = self.col.min(line.len());
        while !line.is_char_boundary(col) {
            col -= 1;
        }
        self.col = col;
    }

    pub fn move_home(&mut self) {
        self.col = 0;
    }

    pub fn move_end(&mut self) {
        self.col = self.lines[self.row].len();
    }

    /// Apply a plain editing key (typing, deletion, cursor movement).
    /// Alt/Shift+Enter inserts a newline. Returns `false` for keys it
    /// doesn't handle so the caller can try its own bindings.
    pub fn apply_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Enter
                if key.modifiers.intersects(KeyModifiers::SHIFT | KeyModifiers::ALT) =>
            {
                self.insert_newline();
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.insert_char(c);
            }
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Left => self.move_left(),
            KeyCode::Right => self.move_right(),
            KeyCode::Up => return self.move_up(),
            KeyCode::Down => return self.move_down(),
            KeyCode::Home => self.move_home(),
            KeyCode::End => self.move_end(),
            _ => return false,
        }
        true
    }
}

impl fmt::Display for TextBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn new_is_empty() {
        let buf = TextBuffer::new();
        assert!(buf.is_empty());
        assert!(!buf.is_multiline());
        assert_eq!(buf.cursor(), (0, 0));
        assert_eq!(buf.to_string(), "");
    }

    #[test]
    fn from_string_places_cursor_at_end() {
        let buf = TextBuffer::from_string("hello\nworld!");
        assert!(buf.is_multiline());
        assert_eq!(buf.cursor(), (1, 6));
        assert_eq!(buf.lines(), &["hello", "world!"]);
        assert_eq!(buf.to_string(), "hello\nworld!");
    }

    #[test]
    fn from_string_empty() {
        let buf = TextBuffer::from_string("");
        assert!(buf.is_empty());
        assert_eq!(buf.cursor(), (0, 0));
    }

    #[test]
    fn insert_newline_splits_line() {
        let mut buf = TextBuffer::from_string("abcd");
        buf.move_left();
        buf.move_left();
        buf.insert_newline();
        assert_eq!(buf.to_string(), "ab\ncd");
        assert_eq!(buf.cursor(), (1, 0));
    }

    #[test]
    fn backspace_joins_lines() {
        let mut buf = TextBuffer::from_string("ab\ncd");
        buf.move_home();
        buf.backspace();
        assert_eq!(buf.to_string(), "abcd");
        assert_eq!(buf.cursor(), (0, 2));
    }

    #[test]
    fn backspace_at_start_does_nothing() {
        let mut buf = TextBuffer::new();
        buf.backspace();
        assert!(buf.is_empty());
    }

    #[test]
    fn delete_joins_next_line() {
        let mut buf = TextBuffer::from_string("ab\ncd");
        buf.move_up();
        buf.move_end();
        buf.delete();
        assert_eq!(buf.to_string(), "abcd");
    }

    #[test]
    fn movement_wraps_between_lines() {
        let mut buf = TextBuffer::from_string("ab\ncd");
        buf.move_home();
        buf.move_left();
        assert_eq!(buf.cursor(), (0, 2));
        buf.move_right();
        assert_eq!(buf.cursor(), (1, 0));
    }

    #[test]
    fn move_up_down_report_edges() {
        let mut buf = TextBuffer::from_string("long line\nx");
        assert!(!buf.move_down());
        assert!(buf.move_up());
        assert_eq!(buf.cursor(), (0, 1));
        assert!(!buf.move_up());
    }

    #[test]
    fn vertical_move_keeps_char_boundary() {
        let mut buf = TextBuffer::from_string("éé\nabc");
        buf.move_end();
        buf.move_left();
        assert!(buf.move_up());
        assert_eq!(buf.cursor(), (0, 2));

        let mut buf = TextBuffer::from_string("é\nab");
        buf.move_home();
        buf.move_right();
        assert!(buf.move_up());
        assert_eq!(buf.cursor(), (0, 0));
    }

    #[test]
    fn unicode_insert_and_backspace() {
        let mut buf = TextBuffer::new();
        buf.insert_char('★');
        buf.insert_char('x');
        assert_eq!(buf.cursor_char_col(), 2);
        buf.backspace();
        buf.backspace();
        assert!(buf.is_empty());
    }

    #[test]
    fn insert_str_handles_newlines() {
        let mut buf = TextBuffer::new();
        buf.insert_str("one\r\ntwo");
        assert_eq!(buf.to_string(), "one\ntwo");
        assert_eq!(buf.cursor(), (1, 3));
    }

    #[test]
    fn apply_key_edits_and_reports_unhandled() {
        let mut buf = TextBuffer::new();
        assert!(buf.apply_key(key(KeyCode::Char('h'))));
        assert!(buf.apply_key(key(KeyCode::Char('i'))));
        assert!(buf.apply_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::ALT)));
        assert!(buf.apply_key(key(KeyCode::Char('!'))));
        assert_eq!(buf.to_string(), "hi\n!");
        assert!(!buf.apply_key(key(KeyCode::Enter)));
        assert!(!buf.apply_key(key(KeyCode::Esc)));
        assert!(!buf.apply_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(buf.apply_key(key(KeyCode::Backspace)));
        assert_eq!(buf.to_string(), "hi\n");
    }

    #[test]
    fn clear_resets() {
        let mut buf = TextBuffer::from_string("a\nb");
        buf.clear();
        assert!(buf.is_empty());
        assert_eq!(buf.cursor(), (0, 0));
    }
}
