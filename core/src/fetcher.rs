//! Debounced, de-duplicated suggestion fetching.
//!
//! The fetcher is an explicit state machine driven by caller-supplied
//! instants, so debounce and staleness are checkable without real timers:
//!
//! - **Idle**: nothing scheduled, nothing in flight.
//! - **Pending**: a trailing-edge debounce timer is armed. Scheduling again
//!   re-arms it; only the latest `(text, cursor)` survives.
//! - **Fetching**: a lookup was issued and its [`FetchTicket`] is outstanding.
//!
//! When the timer fires the current word is computed. Empty words and words
//! equal to the fetch guard (the last word actually looked up) return to
//! Idle without a lookup. A resolution is applied only if its ticket is the
//! latest one issued *and* its word is still the latest scheduled word, so
//! the last scheduled word wins, not the last one to resolve.

use crate::word;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Default quiet period before a lookup is issued.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(140);

/// Handle for one issued lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    id: u64,
    word: String,
}

impl FetchTicket {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The word this lookup was issued for.
    pub fn word(&self) -> &str {
        &self.word
    }
}

/// Observable phase of the fetcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    Idle,
    Pending { deadline: Instant },
    Fetching,
}

#[derive(Debug, Clone)]
struct PendingFetch {
    deadline: Instant,
    text: String,
    cursor: usize,
}

/// Debounce + de-duplication + staleness tracking for one widget.
#[derive(Debug, Clone)]
pub struct SuggestionFetcher {
    debounce: Duration,
    pending: Option<PendingFetch>,
    in_flight: Option<FetchTicket>,
    /// Last word a lookup was actually issued for
    guard: String,
    /// Current word of the most recently scheduled edit
    latest_word: String,
    next_id: u64,
}

impl SuggestionFetcher {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            pending: None,
            in_flight: None,
            guard: String::new(),
            latest_word: String::new(),
            next_id: 0,
        }
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    pub fn state(&self) -> FetchState {
        match (&self.pending, &self.in_flight) {
            (Some(p), _) => FetchState::Pending { deadline: p.deadline },
            (None, Some(_)) => FetchState::Fetching,
            (None, None) => FetchState::Idle,
        }
    }

    /// When the armed timer fires, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    /// The fetch guard: last word a lookup was issued for.
    pub fn guard(&self) -> &str {
        &self.guard
    }

    /// Current word of the latest scheduled edit.
    pub fn latest_word(&self) -> &str {
        &self.latest_word
    }

    /// The outstanding lookup, if any.
    pub fn in_flight(&self) -> Option<&FetchTicket> {
        self.in_flight.as_ref()
    }

    /// (Re)arm the debounce timer for an edit at `now`.
    ///
    /// Returns the current word of this edit.
    pub fn schedule(&mut self, text: &str, cursor: usize, now: Instant) -> &str {
        if self.pending.is_some() {
            trace!("debounce timer re-armed");
        }
        self.latest_word = word::current_word(text, cursor).trim().to_string();
        self.pending = Some(PendingFetch {
            deadline: now + self.debounce,
            text: text.to_string(),
            cursor,
        });
        &self.latest_word
    }

    /// Fire the timer if it is due at `now`.
    ///
    /// Returns a ticket when a lookup should be issued.
    pub fn poll(&mut self, now: Instant) -> Option<FetchTicket> {
        if self.pending.as_ref()?.deadline > now {
            return None;
        }
        let pending = self.pending.take()?;
        let word = word::current_word(&pending.text, pending.cursor).trim();

        if word.is_empty() {
            trace!("timer fired on empty word, no lookup");
            return None;
        }
        if word == self.guard {
            trace!(word, "word unchanged since last lookup, skipping");
            return None;
        }

        self.guard = word.to_string();
        self.next_id += 1;
        let ticket = FetchTicket {
            id: self.next_id,
            word: self.guard.clone(),
        };
        debug!(word = %ticket.word, id = ticket.id, "issuing lookup");
        self.in_flight = Some(ticket.clone());
        Some(ticket)
    }

    /// Settle a ticket. Returns true if its result should be applied.
    pub fn resolve(&mut self, ticket: &FetchTicket) -> bool {
        let latest_issued = self.in_flight.as_ref().is_some_and(|t| t.id == ticket.id);
        if latest_issued {
            self.in_flight = None;
        }

        let current = latest_issued && ticket.word == self.latest_word;
        if !current {
            debug!(word = %ticket.word, id = ticket.id, "discarding stale lookup result");
            // Let the word be fetched again if the user comes back to it
            if self.guard == ticket.word {
                self.guard.clear();
            }
        }
        current
    }

    /// Forget the guard so the same word can be fetched again.
    pub fn reset_guard(&mut self) {
        self.guard.clear();
    }

    /// Disarm the timer and orphan any in-flight lookup.
    pub fn cancel(&mut self) {
        if self.pending.is_some() || self.in_flight.is_some() {
            debug!("cancelling pending suggestion fetch");
        }
        self.pending = None;
        self.in_flight = None;
        self.latest_word.clear();
        self.guard.clear();
    }
}

impl Default for SuggestionFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}
