//! Filtered-order cache.
//!
//! Filtering a million ids costs a full scan, and a client paging through
//! search results asks for the same filtered sequence once per page. Entries
//! are keyed by the order revision they were computed from, so a mutation of
//! the order makes every older entry unreachable.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use lru::LruCache;

use crate::domain::ItemId;

/// Cache key: the order revision and the search term.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilterCacheKey {
    revision: u64,
    term: String,
}

impl FilterCacheKey {
    /// Creates a key for `term` filtered over the order at `revision`.
    #[must_use]
    pub fn new(revision: u64, term: impl Into<String>) -> Self {
        Self {
            revision,
            term: term.into(),
        }
    }
}

/// Hit/miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterCacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that had to filter.
    pub misses: u64,
}

/// LRU cache of filtered sequences.
pub struct FilterCache {
    entries: Mutex<LruCache<FilterCacheKey, Arc<[ItemId]>>>,
    stats: Mutex<FilterCacheStats>,
}

impl FilterCache {
    /// Creates a cache holding at most `capacity` filtered sequences.
    #[must_use]
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            stats: Mutex::new(FilterCacheStats::default()),
        }
    }

    /// Looks up a filtered sequence.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn get(&self, key: &FilterCacheKey) -> Option<Arc<[ItemId]>> {
        let found = self
            .entries
            .lock()
            .expect("filter cache mutex poisoned")
            .get(key)
            .cloned();

        let mut stats = self.stats.lock().expect("stats mutex poisoned");
        if found.is_some() {
            stats.hits += 1;
        } else {
            stats.misses += 1;
        }
        found
    }

    /// Stores a filtered sequence, evicting the least recently used one if full.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn put(&self, key: FilterCacheKey, filtered: Arc<[ItemId]>) {
        self.entries
            .lock()
            .expect("filter cache mutex poisoned")
            .put(key, filtered);
    }

    /// Drops every entry. Counters are kept.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn clear(&self) {
        self.entries
            .lock()
            .expect("filter cache mutex poisoned")
            .clear();
    }

    /// Number of cached sequences.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().expect("filter cache mutex poisoned").len()
    }

    /// Returns true if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current hit/miss counters.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn stats(&self) -> FilterCacheStats {
        *self.stats.lock().expect("stats mutex poisoned")
    }
}

impl std::fmt::Debug for FilterCache {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stats = self.stats();
        formatter
            .debug_struct("FilterCache")
            .field("len", &self.len())
            .field("hits", &stats.hits)
            .field("misses", &stats.misses)
            .finish_non_exhaustive()
    }
}
