//! Suggestion candidates for the transliteration overlay.
//!
//! This module provides:
//! - `RawSuggestion`: one entry as returned by a remote lookup
//! - `normalize_suggestions`: turns raw entries into display strings
//! - `CandidateList`: ordered suggestions with keyboard/pointer selection

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

/// A single raw lookup result.
///
/// Services answer either with bare strings or with tuples whose first
/// element is the usable text (e.g. `["నమస్తే", "namaste"]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawSuggestion {
    Text(String),
    Tuple(Vec<Value>),
    Other(Value),
}

impl RawSuggestion {
    /// The usable candidate text, if any.
    pub fn text(&self) -> Option<&str> {
        let text = match self {
            RawSuggestion::Text(s) => s.as_str(),
            RawSuggestion::Tuple(items) => items.first()?.as_str()?,
            RawSuggestion::Other(_) => return None,
        };
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

impl From<&str> for RawSuggestion {
    fn from(s: &str) -> Self {
        RawSuggestion::Text(s.to_string())
    }
}

/// Normalize raw lookup results into at most `limit` display candidates.
///
/// Entries without usable text are dropped and duplicates keep their first
/// (highest ranked) position. Two entries are duplicates when their NFC
/// forms match; the text itself is kept exactly as returned.
pub fn normalize_suggestions(raw: &[RawSuggestion], limit: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.iter()
        .filter_map(RawSuggestion::text)
        .filter(|text| seen.insert(text.nfc().collect::<String>()))
        .take(limit)
        .map(str::to_string)
        .collect()
}

/// Ordered suggestions with an optional highlighted row.
///
/// The order is the relevance rank returned by the lookup. No row is
/// highlighted right after the list is replaced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateList {
    candidates: Vec<String>,
    selected: Option<usize>,
}

impl CandidateList {
    /// Create a new empty candidate list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the candidates, dropping any highlight.
    pub fn set_candidates(&mut self, candidates: Vec<String>) {
        self.candidates = candidates;
        self.selected = None;
    }

    /// Get all candidates.
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Index of the highlighted row, if any.
    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    /// Move the highlight down one row, stopping at the last row.
    /// Returns true if the highlight changed.
    pub fn cursor_down(&mut self) -> bool {
        if self.candidates.is_empty() {
            return false;
        }
        let last = self.candidates.len() - 1;
        let next = self.selected.map_or(0, |i| (i + 1).min(last));
        self.move_to(next)
    }

    /// Move the highlight up one row, stopping at the first row.
    /// With nothing highlighted this selects the first row.
    pub fn cursor_up(&mut self) -> bool {
        if self.candidates.is_empty() {
            return false;
        }
        let next = self.selected.map_or(0, |i| i.saturating_sub(1));
        self.move_to(next)
    }

    /// Highlight a specific row (pointer hover). Out-of-range rows are ignored.
    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.candidates.len() {
            return false;
        }
        self.move_to(index)
    }

    fn move_to(&mut self, index: usize) -> bool {
        let changed = self.selected != Some(index);
        self.selected = Some(index);
        changed
    }

    /// Candidate to accept: the highlighted row, or the first one.
    pub fn choice(&self) -> Option<&str> {
        let index = self.selected.unwrap_or(0);
        self.candidates.get(index).map(String::as_str)
    }

    /// Candidate at a given row.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.candidates.get(index).map(String::as_str)
    }

    /// Clear candidates and highlight.
    pub fn clear(&mut self) {
        self.candidates.clear();
        self.selected = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn list(items: &[&str]) -> CandidateList {
        let mut list = CandidateList::new();
        list.set_candidates(items.iter().map(|s| s.to_string()).collect());
        list
    }

    #[test]
    fn test_raw_suggestion_deserializes_strings_and_pairs() {
        let raw: Vec<RawSuggestion> =
            serde_json::from_value(json!(["నమ", ["నమస్తే", "namaste"], null, 3])).unwrap();
        assert_eq!(raw[0].text(), Some("నమ"));
        assert_eq!(raw[1].text(), Some("నమస్తే"));
        assert_eq!(raw[2].text(), None);
        assert_eq!(raw[3].text(), None);
    }

    #[test]
    fn test_normalize_drops_empty_and_duplicates() {
        let raw = vec![
            RawSuggestion::from("నమ"),
            RawSuggestion::from(""),
            RawSuggestion::Tuple(vec![json!("నమ"), json!("nam")]),
            RawSuggestion::Tuple(vec![]),
            RawSuggestion::from("నమ్మ"),
        ];
        assert_eq!(normalize_suggestions(&raw, 5), vec!["నమ", "నమ్మ"]);
    }

    #[test]
    fn test_normalize_keeps_service_text_verbatim() {
        // U+0958 is a composition exclusion: NFC turns it into U+0915 U+093C
        let precomposed = "\u{0958}";
        let decomposed = "\u{0915}\u{093C}";
        let raw = vec![RawSuggestion::from(precomposed), RawSuggestion::from(decomposed)];
        assert_eq!(normalize_suggestions(&raw, 5), vec![precomposed]);

        // Canonically equivalent forms still collapse onto the first one
        let raw = vec![RawSuggestion::from("e\u{0301}"), RawSuggestion::from("\u{00e9}")];
        assert_eq!(normalize_suggestions(&raw, 5), vec!["e\u{0301}"]);
    }

    #[test]
    fn test_normalize_truncates_to_limit() {
        let raw: Vec<RawSuggestion> = ["a", "b", "c", "d"].iter().map(|s| (*s).into()).collect();
        assert_eq!(normalize_suggestions(&raw, 2), vec!["a", "b"]);
        assert!(normalize_suggestions(&raw, 0).is_empty());
    }

    #[test]
    fn test_navigation_is_clamped() {
        let mut l = list(&["a", "b", "c"]);
        assert_eq!(l.selected_index(), None);
        l.cursor_down();
        assert_eq!(l.selected_index(), Some(0));
        l.cursor_down();
        l.cursor_down();
        l.cursor_down();
        assert_eq!(l.selected_index(), Some(2));
        l.cursor_up();
        l.cursor_up();
        l.cursor_up();
        assert_eq!(l.selected_index(), Some(0));
    }

    #[test]
    fn test_up_without_selection_selects_first() {
        let mut l = list(&["a", "b"]);
        assert!(l.cursor_up());
        assert_eq!(l.selected_index(), Some(0));
    }

    #[test]
    fn test_choice_defaults_to_first() {
        let mut l = list(&["a", "b"]);
        assert_eq!(l.choice(), Some("a"));
        l.select(1);
        assert_eq!(l.choice(), Some("b"));
        assert!(!l.select(5));
        assert_eq!(l.choice(), Some("b"));
    }

    #[test]
    fn test_replace_resets_selection() {
        let mut l = list(&["a", "b"]);
        l.select(1);
        l.set_candidates(vec!["c".into()]);
        assert_eq!(l.selected_index(), None);
        l.clear();
        assert!(l.is_empty());
        assert_eq!(l.choice(), None);
        assert!(!l.cursor_down());
    }
}
