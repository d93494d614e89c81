//! Word boundary analysis for the in-progress word.
//!
//! All offsets in this module are character offsets (Unicode scalar values),
//! not byte offsets. Out-of-range offsets are clamped to the text length.
//!
//! The "current word" is the longest run of non-whitespace characters that
//! ends exactly at the cursor. Accepting a candidate replaces that run and
//! always appends a single space, so the cursor lands just past it.

/// Characters that terminate a word.
pub fn is_separator(ch: char) -> bool {
    ch.is_whitespace()
}

/// Number of characters in `text`.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Byte index of character offset `offset`, clamped to `text.len()`.
pub fn byte_index(text: &str, offset: usize) -> usize {
    text.char_indices()
        .nth(offset)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

/// Clamp a character offset into `[0, char_len(text)]`.
pub fn clamp_offset(text: &str, offset: usize) -> usize {
    offset.min(char_len(text))
}

/// Byte index where the word ending at byte index `end` starts.
fn word_start_byte(text: &str, end: usize) -> usize {
    let before = &text[..end];
    before
        .char_indices()
        .rev()
        .take_while(|(_, ch)| !is_separator(*ch))
        .last()
        .map(|(i, _)| i)
        .unwrap_or(end)
}

/// The word being typed: the trailing non-whitespace run of `text[0:cursor]`.
///
/// Returns an empty slice when the cursor is at 0, right after a separator,
/// or the text is empty.
///
/// ```
/// use libtranslit_core::word::current_word;
///
/// assert_eq!(current_word("hello nam", 9), "nam");
/// assert_eq!(current_word("hello nam", 7), "n");
/// assert_eq!(current_word("hello ", 6), "");
/// ```
pub fn current_word(text: &str, cursor: usize) -> &str {
    let end = byte_index(text, cursor);
    let start = word_start_byte(text, end);
    &text[start..end]
}

/// Character offset at which the current word starts.
pub fn word_start(text: &str, cursor: usize) -> usize {
    let end = byte_index(text, cursor);
    char_len(&text[..word_start_byte(text, end)])
}

/// Result of replacing the current word with a candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    /// Full text after the replacement
    pub text: String,
    /// Cursor placed immediately after the inserted trailing space
    pub cursor: usize,
}

/// Replace the word ending at `cursor` with `candidate` followed by one space.
///
/// The space is inserted even when the text after the cursor already starts
/// with whitespace.
///
/// ```
/// use libtranslit_core::word::apply_candidate;
///
/// let r = apply_candidate("say nam", 7, "నమ్మ");
/// assert_eq!(r.text, "say నమ్మ ");
/// assert_eq!(r.cursor, 9);
/// ```
pub fn apply_candidate(text: &str, cursor: usize, candidate: &str) -> Replacement {
    let end = byte_index(text, cursor);
    let (before, after) = text.split_at(end);
    let prefix = &before[..word_start_byte(text, end)];

    let mut new_text = String::with_capacity(text.len() + candidate.len() + 1);
    new_text.push_str(prefix);
    new_text.push_str(candidate);
    new_text.push(' ');
    new_text.push_str(after);

    Replacement {
        text: new_text,
        cursor: char_len(prefix) + char_len(candidate) + 1,
    }
}
