//! Transliterating text widget controller.
//!
//! `TransliterationWidget` owns the text buffer, the suggestion list and the
//! fetcher for one mounted text control. Hosts feed it edit, keyboard and
//! pointer events plus clock ticks, then read [`WidgetContext`] to render.
//!
//! ```
//! use libtranslit_core::{
//!     Config, FnLookup, KeyEvent, KeyResult, MirrorEstimator, RawSuggestion,
//!     TransliterationWidget,
//! };
//! use std::time::{Duration, Instant};
//!
//! let lookup = FnLookup::new(|_word: &str, _lang: &str, _limit: usize| {
//!     Ok(vec![RawSuggestion::from("నమస్తే"), RawSuggestion::from("నమ్మ")])
//! });
//! let mut widget =
//!     TransliterationWidget::new(lookup, MirrorEstimator::default(), &Config::default());
//!
//! let t0 = Instant::now();
//! widget.handle_change("nam", 3, t0);
//! widget.tick(t0 + Duration::from_millis(140));
//! assert_eq!(widget.suggestions(), ["నమస్తే", "నమ్మ"]);
//!
//! assert_eq!(widget.process_key(KeyEvent::Enter), KeyResult::Handled);
//! assert_eq!(widget.text(), "నమస్తే ");
//! assert_eq!(widget.take_change().as_deref(), Some("నమస్తే "));
//! ```

use crate::caret::{CaretEstimator, CaretPosition, MirrorEstimator, WidgetMetrics};
use crate::candidate::{normalize_suggestions, CandidateList, RawSuggestion};
use crate::context::{CaretRestore, WidgetContext};
use crate::fetcher::{FetchState, FetchTicket, SuggestionFetcher};
use crate::input_buffer::TextBuffer;
use crate::lookup::{LookupError, SuggestionLookup};
use crate::word;
use crate::Config;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// Key events the widget reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    /// Up arrow key (highlight previous suggestion)
    Up,
    /// Down arrow key (highlight next suggestion)
    Down,
    /// Enter/Return key (accept highlighted or first suggestion)
    Enter,
    /// Space key (accept highlighted or first suggestion)
    Space,
    /// Any other printable character
    Char(char),
    /// Anything else
    Other,
}

impl KeyEvent {
    /// Map a DOM-style key name (`"ArrowDown"`, `"Enter"`, `" "`, ...).
    pub fn from_key_name(name: &str) -> Self {
        match name {
            "ArrowUp" | "Up" => KeyEvent::Up,
            "ArrowDown" | "Down" => KeyEvent::Down,
            "Enter" => KeyEvent::Enter,
            " " | "Spacebar" => KeyEvent::Space,
            _ => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(ch), None) => KeyEvent::Char(ch),
                    _ => KeyEvent::Other,
                }
            }
        }
    }
}

/// Result of processing a key or pointer press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyResult {
    /// Consumed: the host must suppress its default action
    Handled,
    /// Not consumed: let the host control handle it
    NotHandled,
}

/// Properties the owning page passes on every render.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetProps {
    pub value: String,
    pub is_editing: bool,
    pub lang: String,
    pub limit: usize,
}

/// A lookup the host should run, then hand back via
/// [`TransliterationWidget::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub ticket: FetchTicket,
    pub word: String,
    pub lang: String,
    pub limit: usize,
}

/// Controller for one transliterating text control.
pub struct TransliterationWidget<L, E = MirrorEstimator> {
    lookup: L,
    estimator: E,
    metrics: WidgetMetrics,

    buffer: TextBuffer,
    /// Last value received from the owning page
    external: String,

    candidates: CandidateList,
    /// Word the current suggestions were fetched for
    shown_for: String,
    fetcher: SuggestionFetcher,
    caret: CaretPosition,

    lang: String,
    limit: usize,
    overlay_line_offset: f32,
    placeholder: String,

    editing: bool,
    /// Set while an accepted candidate waits for caret restoration
    applying: bool,
    restore: Option<usize>,
    mounted: bool,

    context: WidgetContext,
}

impl<L: SuggestionLookup, E: CaretEstimator> TransliterationWidget<L, E> {
    /// Create a mounted, editable widget with an empty value.
    pub fn new(lookup: L, estimator: E, config: &Config) -> Self {
        let mut widget = Self {
            lookup,
            estimator,
            metrics: config.metrics.clone(),
            buffer: TextBuffer::new(),
            external: String::new(),
            candidates: CandidateList::new(),
            shown_for: String::new(),
            fetcher: SuggestionFetcher::new(Duration::from_millis(config.debounce_ms)),
            caret: CaretPosition::default(),
            lang: config.lang.clone(),
            limit: config.limit,
            overlay_line_offset: config.overlay_line_offset,
            placeholder: config.placeholder.clone(),
            editing: true,
            applying: false,
            restore: None,
            mounted: true,
            context: WidgetContext::new(),
        };
        widget.sync_context();
        widget
    }

    /// Create a widget and apply the owning page's initial props.
    pub fn with_props(lookup: L, estimator: E, config: &Config, props: &WidgetProps) -> Self {
        let mut widget = Self::new(lookup, estimator, config);
        widget.apply_props(props);
        widget
    }

    // ========== Host contract ==========

    /// Apply the owning page's props for this render.
    pub fn apply_props(&mut self, props: &WidgetProps) {
        self.set_lang(&props.lang);
        self.set_limit(props.limit);
        self.set_editing(props.is_editing);
        self.set_value(&props.value);
    }

    /// Mirror the page's `value` prop.
    ///
    /// Only a change of the prop itself resyncs the buffer, so echoing the
    /// widget's own change notification back is a no-op. Returns true if
    /// the buffer text changed.
    pub fn set_value(&mut self, value: &str) -> bool {
        if value == self.external {
            return false;
        }
        self.external = value.to_string();
        let changed = self.buffer.resync(value);
        if changed {
            debug!("value replaced by owning page");
        }
        self.sync_context();
        changed
    }

    /// Enable or disable editing. Disabling drops suggestions and cancels
    /// any scheduled or in-flight lookup.
    pub fn set_editing(&mut self, editing: bool) {
        if self.editing == editing {
            return;
        }
        self.editing = editing;
        if !editing {
            self.fetcher.cancel();
            self.clear_suggestions();
        }
        self.sync_context();
    }

    pub fn set_lang(&mut self, lang: &str) {
        self.lang = lang.to_string();
    }

    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit;
    }

    /// Update the host control's computed style and geometry.
    pub fn set_metrics(&mut self, metrics: WidgetMetrics) {
        self.metrics = metrics;
    }

    // ========== Events ==========

    /// Text edit reported by the host control.
    ///
    /// Ignored while editing is disabled and while an accepted candidate is
    /// still being applied. Returns true if the edit was taken.
    pub fn handle_change<S: Into<String>>(&mut self, text: S, cursor: usize, now: Instant) -> bool {
        if !self.mounted || !self.editing {
            trace!("edit ignored: widget not editable");
            return false;
        }
        if self.applying {
            trace!("edit ignored while applying replacement");
            return false;
        }

        self.buffer.set(text.into(), cursor);
        self.context.changed_value = Some(self.buffer.text().to_string());
        self.schedule_fetch(now);
        self.sync_context();
        true
    }

    /// Keyboard input while the host control has focus.
    ///
    /// Only acts while suggestions are shown: arrows move the highlight,
    /// Enter and Space accept the highlighted (or first) suggestion.
    pub fn process_key(&mut self, key: KeyEvent) -> KeyResult {
        if self.candidates.is_empty() {
            return KeyResult::NotHandled;
        }

        let result = match key {
            KeyEvent::Down => {
                self.candidates.cursor_down();
                KeyResult::Handled
            }
            KeyEvent::Up => {
                self.candidates.cursor_up();
                KeyResult::Handled
            }
            KeyEvent::Enter | KeyEvent::Space => {
                if let Some(choice) = self.candidates.choice().map(str::to_string) {
                    self.accept(&choice);
                }
                KeyResult::Handled
            }
            KeyEvent::Char(_) | KeyEvent::Other => KeyResult::NotHandled,
        };

        self.sync_context();
        result
    }

    /// Pointer entered a suggestion row.
    pub fn hover(&mut self, row: usize) {
        if self.candidates.select(row) {
            self.sync_context();
        }
    }

    /// Pointer pressed on a suggestion row.
    ///
    /// Returns `Handled` when the row was accepted; the host must then
    /// suppress the press default so the text control keeps focus.
    pub fn press(&mut self, row: usize) -> KeyResult {
        let Some(choice) = self.candidates.get(row).map(str::to_string) else {
            return KeyResult::NotHandled;
        };
        self.accept(&choice);
        self.sync_context();
        KeyResult::Handled
    }

    /// Click inside the text control moved the caret.
    pub fn click(&mut self, cursor: usize) {
        self.select(cursor);
    }

    /// Caret moved without a text change (arrow keys, Home/End, selection).
    ///
    /// Shown suggestions stay up; accepting one replaces the word ending at
    /// the new caret.
    pub fn select(&mut self, cursor: usize) {
        if !self.mounted {
            return;
        }
        self.buffer.set_cursor(cursor);
        self.update_caret_position();
        self.sync_context();
    }

    /// Next render frame: finish a pending candidate acceptance.
    ///
    /// Returns the caret the host must restore (with focus) if any.
    pub fn frame(&mut self) -> Option<CaretRestore> {
        let cursor = self.restore.take()?;
        self.buffer.set_cursor(cursor);
        self.applying = false;
        self.sync_context();
        Some(CaretRestore {
            cursor: self.buffer.cursor(),
            focus: true,
        })
    }

    /// Widget torn down: cancel timers and drop suggestions.
    pub fn unmount(&mut self) {
        self.mounted = false;
        self.fetcher.cancel();
        self.clear_suggestions();
        self.restore = None;
        self.applying = false;
        self.sync_context();
    }

    // ========== Suggestion fetching ==========

    /// Fire the debounce timer if due and run the lookup synchronously.
    ///
    /// Returns true if the suggestion list was updated.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(request) = self.poll_request(now) else {
            return false;
        };
        let result = self
            .lookup
            .lookup(&request.word, &request.lang, request.limit);
        self.resolve(&request.ticket, result)
    }

    /// Fire the debounce timer if due, returning the lookup to run.
    ///
    /// For hosts that perform lookups asynchronously; pair with
    /// [`resolve`](Self::resolve).
    pub fn poll_request(&mut self, now: Instant) -> Option<FetchRequest> {
        if !self.mounted || !self.editing {
            return None;
        }
        let ticket = self.fetcher.poll(now)?;
        Some(FetchRequest {
            word: ticket.word().to_string(),
            lang: self.lang.clone(),
            limit: self.limit,
            ticket,
        })
    }

    /// Apply a finished lookup. Stale or cancelled results are dropped.
    ///
    /// Returns true if the suggestion list was updated.
    pub fn resolve(
        &mut self,
        ticket: &FetchTicket,
        result: Result<Vec<RawSuggestion>, LookupError>,
    ) -> bool {
        if !self.fetcher.resolve(ticket) {
            return false;
        }
        if !self.mounted || !self.editing {
            return false;
        }

        match result {
            Ok(raw) => {
                let suggestions = normalize_suggestions(&raw, self.limit);
                debug!(word = ticket.word(), count = suggestions.len(), "suggestions received");
                self.candidates.set_candidates(suggestions);
                self.shown_for = ticket.word().to_string();
                if !self.candidates.is_empty() {
                    self.update_caret_position();
                }
            }
            Err(err) => {
                debug!(word = ticket.word(), error = %err, "suggestion lookup failed");
                self.clear_suggestions();
            }
        }
        self.sync_context();
        true
    }

    // ========== Accessors ==========

    pub fn text(&self) -> &str {
        self.buffer.text()
    }

    pub fn cursor(&self) -> usize {
        self.buffer.cursor()
    }

    /// The word ending at the caret.
    pub fn current_word(&self) -> &str {
        self.buffer.current_word()
    }

    pub fn suggestions(&self) -> &[String] {
        self.candidates.candidates()
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.candidates.selected_index()
    }

    /// Last successfully measured caret position.
    pub fn caret(&self) -> CaretPosition {
        self.caret
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn is_applying(&self) -> bool {
        self.applying
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn metrics(&self) -> &WidgetMetrics {
        &self.metrics
    }

    pub fn fetch_state(&self) -> FetchState {
        self.fetcher.state()
    }

    /// When the host should call [`tick`](Self::tick) next.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.fetcher.next_deadline()
    }

    pub fn lookup(&self) -> &L {
        &self.lookup
    }

    pub fn estimator(&self) -> &E {
        &self.estimator
    }

    /// Get a reference to the context for rendering.
    pub fn context(&self) -> &WidgetContext {
        &self.context
    }

    /// Take the pending change notification for the owning page.
    pub fn take_change(&mut self) -> Option<String> {
        self.context.take_change()
    }

    // ========== Internals ==========

    fn schedule_fetch(&mut self, now: Instant) {
        let word = self
            .fetcher
            .schedule(self.buffer.text(), self.buffer.cursor(), now)
            .to_string();
        if word.is_empty() || word != self.shown_for {
            self.clear_suggestions();
            // Nothing is shown for the old word any more, so coming back to
            // it must fetch again unless that lookup is still running
            let in_flight = self.fetcher.in_flight().is_some_and(|t| t.word() == word);
            if !in_flight {
                self.fetcher.reset_guard();
            }
        }
    }

    /// Replace the current word with `candidate`.
    fn accept(&mut self, candidate: &str) -> bool {
        if self.candidates.is_empty() {
            return false;
        }
        self.applying = true;
        self.clear_suggestions();
        self.fetcher.cancel();

        let replacement = word::apply_candidate(self.buffer.text(), self.buffer.cursor(), candidate);
        let cursor = replacement.cursor;
        self.buffer.apply(replacement);
        self.context.changed_value = Some(self.buffer.text().to_string());
        self.restore = Some(cursor);
        debug!(candidate, cursor, "candidate accepted");
        true
    }

    fn clear_suggestions(&mut self) {
        self.candidates.clear();
        self.shown_for.clear();
    }

    fn update_caret_position(&mut self) {
        match self
            .estimator
            .estimate(&self.metrics, self.buffer.text(), self.buffer.cursor())
        {
            Ok(pos) => self.caret = pos,
            Err(err) => warn!(error = %err, "caret measurement failed, keeping previous overlay position"),
        }
    }

    fn sync_context(&mut self) {
        let ctx = &mut self.context;
        ctx.value.clear();
        ctx.value.push_str(self.buffer.text());
        ctx.cursor = self.buffer.cursor();
        ctx.suggestions = self.candidates.candidates().to_vec();
        ctx.selected = self.candidates.selected_index();
        ctx.overlay = if self.editing && !self.candidates.is_empty() {
            Some(CaretPosition {
                top: self.caret.top + self.overlay_line_offset,
                left: self.caret.left,
            })
        } else {
            None
        };
        ctx.placeholder.clone_from(&self.placeholder);
        ctx.read_only = !self.editing;
    }
}
