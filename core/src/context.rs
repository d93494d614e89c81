//! Widget context for host communication.
//!
//! The `WidgetContext` struct is a plain data container with public fields.
//! After feeding an event to the widget, the host reads these fields to
//! redraw the text control and the suggestion overlay, forwards
//! `changed_value` to the owning page, and applies the `CaretRestore`
//! returned by the widget's next frame.
//!
//! Design philosophy: Zero abstraction - just data transfer. No callbacks, no
//! traits, no generics. Host code reads fields directly.

use crate::caret::CaretPosition;

/// Caret restoration requested after a candidate was accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaretRestore {
    /// Character offset to place the caret at (selection start = end)
    pub cursor: usize,
    /// Whether the host should refocus the text control first
    pub focus: bool,
}

/// Everything the host needs to render one widget.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WidgetContext {
    /// Text shown in the control
    pub value: String,

    /// Caret position (character offset)
    pub cursor: usize,

    /// New value for the owning page's change handler (consume and clear)
    pub changed_value: Option<String>,

    /// Suggestion rows, in rank order
    pub suggestions: Vec<String>,

    /// Highlighted row, if any
    pub selected: Option<usize>,

    /// Where to draw the overlay; `None` when it must not be shown
    pub overlay: Option<CaretPosition>,

    /// Shown by the host when `value` is empty
    pub placeholder: String,

    /// Whether the control should be rendered read-only
    pub read_only: bool,
}

impl WidgetContext {
    /// Create a new empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the pending change notification, leaving it empty.
    pub fn take_change(&mut self) -> Option<String> {
        self.changed_value.take()
    }

    /// Check if the suggestion overlay should be drawn.
    pub fn has_overlay(&self) -> bool {
        self.overlay.is_some() && !self.suggestions.is_empty()
    }

    /// Check if the placeholder should be drawn.
    pub fn shows_placeholder(&self) -> bool {
        self.value.is_empty()
    }
}
