//! Collection store.
//!
//! Owns the immutable base sequence of item identifiers and the mutable view
//! derived from it: the custom order, the selection set and the last search
//! term. The store is a plain owned value; sharing and locking are the
//! responsibility of the application layer.

use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;

/// Identifier of a single list item.
pub type ItemId = u32;

// =============================================================================
// Store Error
// =============================================================================

/// Errors signalled by store mutations. State is unchanged whenever one is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The proposed order is not a permutation of the base sequence.
    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    /// An identifier is not present in the current order.
    #[error("Item {0} not found in the current order")]
    IdNotFound(ItemId),
}

// =============================================================================
// Collection Store
// =============================================================================

/// Authoritative ordering, selection and search state.
///
/// The base sequence is always `[1..=n]`, so membership checks are range checks.
#[derive(Debug, Clone)]
pub struct CollectionStore {
    base: Arc<Vec<ItemId>>,
    order: Option<Arc<Vec<ItemId>>>,
    selection: HashSet<ItemId>,
    last_search_term: String,
}

impl CollectionStore {
    /// Creates a store whose base sequence is `[1..=size]`.
    #[must_use]
    pub fn initialize(size: ItemId) -> Self {
        Self {
            base: Arc::new((1..=size).collect()),
            order: None,
            selection: HashSet::new(),
            last_search_term: String::new(),
        }
    }

    /// Number of items in the base sequence.
    #[must_use]
    pub fn len(&self) -> usize {
        self.base.len()
    }

    /// Returns true if the base sequence is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.base.is_empty()
    }

    /// Returns true if `id` belongs to the base sequence.
    #[must_use]
    pub fn contains(&self, id: ItemId) -> bool {
        id >= 1 && (id as usize) <= self.base.len()
    }

    /// The immutable base sequence.
    #[must_use]
    pub const fn base_sequence(&self) -> &Arc<Vec<ItemId>> {
        &self.base
    }

    /// The order in effect: the custom order if one was set, else the base sequence.
    ///
    /// Returns a shared handle, so callers can keep a consistent snapshot
    /// after releasing whatever lock guards the store.
    #[must_use]
    pub fn current_order(&self) -> &Arc<Vec<ItemId>> {
        self.order.as_ref().unwrap_or(&self.base)
    }

    /// Returns true if a custom order is in effect.
    #[must_use]
    pub const fn has_custom_order(&self) -> bool {
        self.order.is_some()
    }

    /// Replaces the current order wholesale.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidOrder`] if `new_order` adds, omits or
    /// duplicates a value of the base sequence.
    pub fn replace_order(&mut self, new_order: Vec<ItemId>) -> Result<(), StoreError> {
        self.validate_permutation(&new_order)?;
        self.order = Some(Arc::new(new_order));
        Ok(())
    }

    /// Exchanges the positions of `first` and `second` in the current order.
    ///
    /// Materializes the custom order from the base sequence on first use.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::IdNotFound`] if either value is absent.
    pub fn swap(&mut self, first: ItemId, second: ItemId) -> Result<(), StoreError> {
        let current = self.current_order();
        let first_index = position_of(current, first)?;
        let second_index = position_of(current, second)?;

        let mut order = self.order.take().unwrap_or_else(|| Arc::clone(&self.base));
        Arc::make_mut(&mut order).swap(first_index, second_index);
        self.order = Some(order);
        Ok(())
    }

    /// Replaces the selection set. Values are stored verbatim.
    pub fn replace_selection(&mut self, ids: impl IntoIterator<Item = ItemId>) {
        self.selection = ids.into_iter().collect();
    }

    /// The current selection set.
    #[must_use]
    pub const fn selection(&self) -> &HashSet<ItemId> {
        &self.selection
    }

    /// Records the last applied search term.
    pub fn set_last_search_term(&mut self, term: impl Into<String>) {
        self.last_search_term = term.into();
    }

    /// The last applied search term.
    #[must_use]
    pub fn last_search_term(&self) -> &str {
        &self.last_search_term
    }

    /// Drops the custom order, the selection and the last search term.
    pub fn reset(&mut self) {
        self.order = None;
        self.selection.clear();
        self.last_search_term.clear();
    }

    /// Checks that `candidate` is a permutation of the base sequence.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidOrder`] describing the first violation found.
    pub fn validate_permutation(&self, candidate: &[ItemId]) -> Result<(), StoreError> {
        if candidate.len() != self.base.len() {
            return Err(StoreError::InvalidOrder(format!(
                "expected {} items, got {}",
                self.base.len(),
                candidate.len()
            )));
        }

        let mut seen = vec![false; self.base.len()];
        for &id in candidate {
            if !self.contains(id) {
                return Err(StoreError::InvalidOrder(format!(
                    "item {id} is not part of the collection"
                )));
            }
            let slot = &mut seen[id as usize - 1];
            if *slot {
                return Err(StoreError::InvalidOrder(format!("item {id} appears twice")));
            }
            *slot = true;
        }
        Ok(())
    }
}

fn position_of(order: &[ItemId], id: ItemId) -> Result<usize, StoreError> {
    order
        .iter()
        .position(|&candidate| candidate == id)
        .ok_or(StoreError::IdNotFound(id))
}

// =============================================================================
// Tests
// =============================================================================
