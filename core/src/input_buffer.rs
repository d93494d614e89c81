//! Text buffer with cursor tracking for the transliterating input.
//!
//! The buffer holds the full widget text and a caret offset. Unlike a raw
//! IME preedit buffer, the cursor here is a character offset so that it lines
//! up with what a host text control reports as its selection start.

use crate::word::{self, Replacement};

/// Widget text plus caret position (character offset).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextBuffer {
    text: String,
    cursor: usize,
}

impl TextBuffer {
    /// Create a new empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a buffer holding `text` with the cursor at the end.
    pub fn from_text<S: Into<String>>(text: S) -> Self {
        let text = text.into();
        let cursor = word::char_len(&text);
        Self { text, cursor }
    }

    /// Get the full text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Get the cursor position (character offset).
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Length of the buffer in characters.
    pub fn len(&self) -> usize {
        word::char_len(&self.text)
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Replace the whole text and cursor, as reported by a host edit.
    /// The cursor is clamped to the new text.
    pub fn set(&mut self, text: String, cursor: usize) {
        self.cursor = word::clamp_offset(&text, cursor);
        self.text = text;
    }

    /// Move the cursor, clamping to the text length.
    pub fn set_cursor(&mut self, cursor: usize) {
        self.cursor = word::clamp_offset(&self.text, cursor);
    }

    /// Mirror an externally supplied value into the buffer.
    ///
    /// Returns true if the text changed. The cursor keeps its offset when it
    /// still fits, otherwise it is clamped to the end.
    pub fn resync(&mut self, value: &str) -> bool {
        if self.text == value {
            return false;
        }
        self.text = value.to_string();
        self.cursor = word::clamp_offset(&self.text, self.cursor);
        true
    }

    /// The word ending at the cursor.
    pub fn current_word(&self) -> &str {
        word::current_word(&self.text, self.cursor)
    }

    /// Apply a replacement produced by [`word::apply_candidate`].
    pub fn apply(&mut self, replacement: Replacement) {
        let Replacement { text, cursor } = replacement;
        self.set(text, cursor);
    }

    /// Insert a string at the cursor position.
    pub fn insert_str(&mut self, s: &str) {
        let at = word::byte_index(&self.text, self.cursor);
        self.text.insert_str(at, s);
        self.cursor += word::char_len(s);
    }

    /// Delete the character before the cursor (backspace).
    /// Returns true if a character was deleted.
    pub fn delete_before(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let at = word::byte_index(&self.text, self.cursor - 1);
        self.text.remove(at);
        self.cursor -= 1;
        true
    }

    /// Clear the buffer and reset cursor.
    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_text_puts_cursor_at_end() {
        let buf = TextBuffer::from_text("నమ");
        assert_eq!(buf.cursor(), 2);
        assert_eq!(buf.len(), 2);
    }

    #[test]
    fn test_set_clamps_cursor() {
        let mut buf = TextBuffer::new();
        buf.set("abc".to_string(), 10);
        assert_eq!(buf.cursor(), 3);
        buf.set_cursor(7);
        assert_eq!(buf.cursor(), 3);
    }

    #[test]
    fn test_resync_keeps_cursor_when_possible() {
        let mut buf = TextBuffer::from_text("hello world");
        buf.set_cursor(5);
        assert!(buf.resync("hello there"));
        assert_eq!(buf.cursor(), 5);
        assert!(buf.resync("hi"));
        assert_eq!(buf.cursor(), 2);
        assert!(!buf.resync("hi"));
    }

    #[test]
    fn test_insert_and_delete_multibyte() {
        let mut buf = TextBuffer::from_text("నమ");
        buf.insert_str("్మ");
        assert_eq!(buf.text(), "నమ్మ");
        assert_eq!(buf.cursor(), 4);
        assert!(buf.delete_before());
        assert_eq!(buf.text(), "నమ్");
        assert_eq!(buf.cursor(), 3);
        buf.set_cursor(0);
        assert!(!buf.delete_before());
    }

    #[test]
    fn test_current_word_and_apply() {
        let mut buf = TextBuffer::from_text("say nam");
        assert_eq!(buf.current_word(), "nam");
        buf.apply(word::apply_candidate(buf.text(), buf.cursor(), "నమ"));
        assert_eq!(buf.text(), "say నమ ");
        assert_eq!(buf.cursor(), 7);
        assert_eq!(buf.current_word(), "");
    }
}
