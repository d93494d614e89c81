// core/src/lookup.rs
//
// Boundary to the remote transliteration service, plus an LRU cache in front
// of it. The widget never sees transport details: a lookup is a word, a
// language tag and a limit in, ranked raw suggestions out.

use crate::candidate::RawSuggestion;
use std::cell::{Cell, RefCell};
use std::num::NonZeroUsize;
use thiserror::Error;

/// Why a lookup produced no suggestions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("lookup is disabled")]
    Disabled,
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Word + language tag + limit → ranked raw candidates.
pub trait SuggestionLookup {
    fn lookup(
        &self,
        word: &str,
        lang: &str,
        limit: usize,
    ) -> Result<Vec<RawSuggestion>, LookupError>;
}

impl<L: SuggestionLookup + ?Sized> SuggestionLookup for &L {
    fn lookup(&self, word: &str, lang: &str, limit: usize) -> Result<Vec<RawSuggestion>, LookupError> {
        (**self).lookup(word, lang, limit)
    }
}

impl<L: SuggestionLookup + ?Sized> SuggestionLookup for Box<L> {
    fn lookup(&self, word: &str, lang: &str, limit: usize) -> Result<Vec<RawSuggestion>, LookupError> {
        (**self).lookup(word, lang, limit)
    }
}

/// Adapter turning a closure into a [`SuggestionLookup`].
pub struct FnLookup<F>(pub F);

impl<F> FnLookup<F>
where
    F: Fn(&str, &str, usize) -> Result<Vec<RawSuggestion>, LookupError>,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> SuggestionLookup for FnLookup<F>
where
    F: Fn(&str, &str, usize) -> Result<Vec<RawSuggestion>, LookupError>,
{
    fn lookup(&self, word: &str, lang: &str, limit: usize) -> Result<Vec<RawSuggestion>, LookupError> {
        (self.0)(word, lang, limit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    word: String,
    lang: String,
    limit: usize,
}

/// LRU cache in front of another lookup.
///
/// Only successful answers are cached; failures always reach the inner
/// lookup again on the next request.
pub struct CachedLookup<L> {
    inner: L,
    cache: RefCell<lru::LruCache<CacheKey, Vec<RawSuggestion>>>,
    hits: Cell<usize>,
    misses: Cell<usize>,
}

impl<L: SuggestionLookup> CachedLookup<L> {
    /// Wrap `inner` with a cache of at most `capacity` entries (minimum 1).
    pub fn new(inner: L, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            cache: RefCell::new(lru::LruCache::new(capacity)),
            hits: Cell::new(0),
            misses: Cell::new(0),
        }
    }

    /// Get the wrapped lookup.
    pub fn inner(&self) -> &L {
        &self.inner
    }

    /// Returns (hits, misses).
    pub fn cache_stats(&self) -> (usize, usize) {
        (self.hits.get(), self.misses.get())
    }

    /// Hit rate as a percentage, or None before the first access.
    pub fn cache_hit_rate(&self) -> Option<f32> {
        let (hits, misses) = self.cache_stats();
        let total = hits + misses;
        if total == 0 {
            None
        } else {
            Some((hits as f32 / total as f32) * 100.0)
        }
    }

    pub fn cache_size(&self) -> usize {
        self.cache.borrow().len()
    }

    pub fn cache_capacity(&self) -> usize {
        self.cache.borrow().cap().get()
    }

    /// Drop all cached answers and reset statistics.
    pub fn clear_cache(&self) {
        self.cache.borrow_mut().clear();
        self.hits.set(0);
        self.misses.set(0);
    }
}

impl<L: SuggestionLookup> SuggestionLookup for CachedLookup<L> {
    fn lookup(&self, word: &str, lang: &str, limit: usize) -> Result<Vec<RawSuggestion>, LookupError> {
        let key = CacheKey {
            word: word.to_string(),
            lang: lang.to_string(),
            limit,
        };
        if let Some(cached) = self.cache.borrow_mut().get(&key) {
            self.hits.set(self.hits.get() + 1);
            return Ok(cached.clone());
        }

        self.misses.set(self.misses.get() + 1);
        let result = self.inner.lookup(word, lang, limit)?;
        self.cache.borrow_mut().put(key, result.clone());
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    fn counting_lookup(calls: Rc<Cell<usize>>) -> impl SuggestionLookup {
        FnLookup::new(move |word: &str, _lang: &str, _limit: usize| {
            calls.set(calls.get() + 1);
            if word == "fail" {
                Err(LookupError::Network("offline".into()))
            } else {
                Ok(vec![RawSuggestion::from(word)])
            }
        })
    }

    #[test]
    fn test_cache_hits_repeat_queries() {
        let calls = Rc::new(Cell::new(0));
        let cached = CachedLookup::new(counting_lookup(calls.clone()), 8);

        assert_eq!(cached.cache_hit_rate(), None);
        cached.lookup("nam", "te-t-i0-und", 5).unwrap();
        cached.lookup("nam", "te-t-i0-und", 5).unwrap();
        assert_eq!(calls.get(), 1);
        assert_eq!(cached.cache_stats(), (1, 1));
        assert_eq!(cached.cache_hit_rate(), Some(50.0));

        // A different language is a different key
        cached.lookup("nam", "hi-t-i0-und", 5).unwrap();
        assert_eq!(calls.get(), 2);
        assert_eq!(cached.cache_size(), 2);
    }

    #[test]
    fn test_failures_are_not_cached() {
        let calls = Rc::new(Cell::new(0));
        let cached = CachedLookup::new(counting_lookup(calls.clone()), 8);

        assert!(cached.lookup("fail", "te", 5).is_err());
        assert!(cached.lookup("fail", "te", 5).is_err());
        assert_eq!(calls.get(), 2);
        assert_eq!(cached.cache_size(), 0);
    }

    #[test]
    fn test_capacity_evicts_least_recent() {
        let calls = Rc::new(Cell::new(0));
        let cached = CachedLookup::new(counting_lookup(calls.clone()), 1);
        assert_eq!(cached.cache_capacity(), 1);

        cached.lookup("a", "te", 5).unwrap();
        cached.lookup("b", "te", 5).unwrap();
        cached.lookup("a", "te", 5).unwrap();
        assert_eq!(calls.get(), 3);

        cached.clear_cache();
        assert_eq!(cached.cache_stats(), (0, 0));
        assert_eq!(cached.cache_size(), 0);
    }

    #[test]
    fn test_zero_capacity_falls_back_to_one() {
        let calls = Rc::new(Cell::new(0));
        let cached = CachedLookup::new(counting_lookup(calls), 0);
        assert_eq!(cached.cache_capacity(), 1);
    }
}
