//! State service.
//!
//! The boundary between transports (HTTP handlers, the in-process client
//! transport) and the collection store. Reads take a shared lock just long
//! enough to clone an `Arc` of the current order, so every read sees one
//! consistent snapshot; writes take the exclusive lock for their whole
//! validate-then-commit step. Concurrent writers are not coordinated beyond
//! that: the last write wins.

use std::num::NonZeroUsize;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::cache::{FilterCache, FilterCacheKey};
use crate::domain::{CollectionStore, ItemId, Page, StoreError, filter};

// =============================================================================
// Commands and Results
// =============================================================================

/// Full replacement of the client-saved state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveCommand {
    /// New selection set. Values outside the collection are dropped.
    pub selected: Vec<ItemId>,
    /// New order. Empty keeps the current order.
    pub ordered: Vec<ItemId>,
    /// Search term the client had applied.
    pub search_term: String,
}

/// Result of a committed save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOutcome {
    /// Size of the stored selection.
    pub selected_count: usize,
    /// Length of the order that was stored (0 if the order was kept).
    pub sorted_count: usize,
}

/// Snapshot a client needs at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitialState {
    /// Stored selection.
    pub selected: Vec<ItemId>,
    /// First page of the current order, unfiltered.
    pub first_page: Vec<ItemId>,
    /// Last saved search term.
    pub last_search: String,
}

// =============================================================================
// Collection Service
// =============================================================================

#[derive(Debug)]
struct Guarded {
    store: CollectionStore,
    /// Bumped on every order mutation; keys the filter cache.
    revision: u64,
}

/// Shared handle to the collection state.
///
/// Cloning is cheap; all clones observe the same store.
#[derive(Debug, Clone)]
pub struct CollectionService {
    state: Arc<RwLock<Guarded>>,
    cache: Option<Arc<FilterCache>>,
}

impl CollectionService {
    /// Creates a service over a fresh store of `size` items without a filter cache.
    #[must_use]
    pub fn new(size: ItemId) -> Self {
        Self::from_store(CollectionStore::initialize(size), 0)
    }

    /// Creates a service over a fresh store of `size` items.
    ///
    /// A `cache_capacity` of 0 disables the filter cache.
    #[must_use]
    pub fn with_cache_capacity(size: ItemId, cache_capacity: usize) -> Self {
        Self::from_store(CollectionStore::initialize(size), cache_capacity)
    }

    /// Wraps an existing store.
    #[must_use]
    pub fn from_store(store: CollectionStore, cache_capacity: usize) -> Self {
        Self {
            state: Arc::new(RwLock::new(Guarded { store, revision: 0 })),
            cache: NonZeroUsize::new(cache_capacity).map(|capacity| Arc::new(FilterCache::new(capacity))),
        }
    }

    /// The filter cache, if enabled.
    #[must_use]
    pub fn filter_cache(&self) -> Option<&FilterCache> {
        self.cache.as_deref()
    }

    async fn snapshot(&self) -> (Arc<Vec<ItemId>>, u64) {
        let guarded = self.state.read().await;
        (Arc::clone(guarded.store.current_order()), guarded.revision)
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Filters the current order by `search` and returns page `page`.
    ///
    /// Pages past the end come back empty with the correct total.
    pub async fn get_page(&self, page: u32, search: &str) -> Page {
        let (order, revision) = self.snapshot().await;

        if search.is_empty() {
            return Page::from_filtered(&order, page);
        }

        let Some(cache) = &self.cache else {
            return Page::compute(&order, search, page);
        };

        let key = FilterCacheKey::new(revision, search);
        let filtered = match cache.get(&key) {
            Some(filtered) => filtered,
            None => {
                let filtered: Arc<[ItemId]> = Arc::from(filter(&order, search).into_owned());
                cache.put(key, Arc::clone(&filtered));
                filtered
            }
        };

        tracing::debug!(search, page, total = filtered.len(), "Served filtered page");
        Page::from_filtered(&filtered, page)
    }

    /// The full current order, unfiltered.
    pub async fn all_ids(&self) -> Arc<Vec<ItemId>> {
        self.snapshot().await.0
    }

    /// The stored selection. Iteration order is unspecified.
    pub async fn selected_items(&self) -> Vec<ItemId> {
        self.state.read().await.store.selection().iter().copied().collect()
    }

    /// Selection, last search term and first page, read under one lock.
    pub async fn initial_state(&self) -> InitialState {
        let guarded = self.state.read().await;
        let store = &guarded.store;
        InitialState {
            selected: store.selection().iter().copied().collect(),
            first_page: Page::from_filtered(store.current_order(), 1).items,
            last_search: store.last_search_term().to_owned(),
        }
    }

    // -------------------------------------------------------------------------
    // Writes
    // -------------------------------------------------------------------------

    /// Swaps the positions of `moved` and `target` in the current order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::IdNotFound`] if either id is absent.
    pub async fn update_order(&self, moved: ItemId, target: ItemId) -> Result<(), StoreError> {
        let mut guarded = self.state.write().await;
        guarded.store.swap(moved, target).inspect_err(|error| {
            tracing::warn!(%error, moved, target, "Rejected order update");
        })?;
        guarded.revision += 1;
        tracing::info!(moved, target, "Swapped items");
        Ok(())
    }

    /// Replaces selection, order and last search term in one step.
    ///
    /// Nothing is committed if the order is invalid.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidOrder`] if `command.ordered` is non-empty
    /// and not a permutation of the collection.
    pub async fn save_state(&self, command: SaveCommand) -> Result<SaveOutcome, StoreError> {
        let SaveCommand {
            selected,
            ordered,
            search_term,
        } = command;
        let sorted_count = ordered.len();

        let mut guarded = self.state.write().await;
        if !ordered.is_empty() {
            guarded.store.replace_order(ordered).inspect_err(|error| {
                tracing::warn!(%error, "Rejected state save");
            })?;
            guarded.revision += 1;
        }

        let store = &mut guarded.store;
        let known: Vec<ItemId> = selected.into_iter().filter(|&id| store.contains(id)).collect();
        store.replace_selection(known);
        store.set_last_search_term(search_term);

        let outcome = SaveOutcome {
            selected_count: store.selection().len(),
            sorted_count,
        };
        tracing::info!(
            selected = outcome.selected_count,
            sorted = outcome.sorted_count,
            "State saved"
        );
        Ok(outcome)
    }

    /// Restores the base order and clears selection and search term.
    ///
    /// Returns the number of items in the collection.
    pub async fn reset(&self) -> usize {
        let mut guarded = self.state.write().await;
        guarded.store.reset();
        guarded.revision += 1;
        let count = guarded.store.len();
        drop(guarded);

        if let Some(cache) = &self.cache {
            cache.clear();
        }
        tracing::info!(count, "State reset to initial order");
        count
    }
}

// =============================================================================
// Tests
// =============================================================================
