//! Query engine: substring filtering and page slicing over an ordered sequence.
//!
//! All functions are pure. For a fixed input they return the same output on
//! every call.

use std::borrow::Cow;
use std::fmt::Write;

use super::collection::ItemId;

/// Number of items in one page. Not configurable by clients.
pub const PAGE_SIZE: u32 = 20;

// =============================================================================
// Filter
// =============================================================================

/// Keeps the ids whose decimal form contains `term`, preserving order.
///
/// An empty term borrows `sequence` unchanged.
#[must_use]
pub fn filter<'a>(sequence: &'a [ItemId], term: &str) -> Cow<'a, [ItemId]> {
    if term.is_empty() {
        return Cow::Borrowed(sequence);
    }

    let mut buffer = String::with_capacity(10);
    let matches: Vec<ItemId> = sequence
        .iter()
        .copied()
        .filter(|id| {
            buffer.clear();
            // Writing into a String cannot fail.
            let _ = write!(buffer, "{id}");
            buffer.contains(term)
        })
        .collect();
    Cow::Owned(matches)
}

// =============================================================================
// Paginate
// =============================================================================

/// Returns the `page`-th (1-indexed) window of `page_size` items.
///
/// Bounds are clamped: a page past the end yields an empty slice, and page 0
/// is treated as page 1.
#[must_use]
pub fn paginate(sequence: &[ItemId], page: u32, page_size: u32) -> &[ItemId] {
    let start = (page.max(1) as usize - 1).saturating_mul(page_size as usize);
    if start >= sequence.len() {
        return &[];
    }
    let end = start.saturating_add(page_size as usize).min(sequence.len());
    &sequence[start..end]
}

// =============================================================================
// Page
// =============================================================================

/// A server-computed window of the filtered current order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Items in this page.
    pub items: Vec<ItemId>,
    /// Length of the filtered sequence the page was cut from.
    pub total: u64,
    /// Page number (1-indexed).
    pub page: u32,
    /// Fixed page size.
    pub page_size: u32,
}

impl Page {
    /// Filters `sequence` by `term` and cuts out page `page`.
    #[must_use]
    pub fn compute(sequence: &[ItemId], term: &str, page: u32) -> Self {
        let filtered = filter(sequence, term);
        Self::from_filtered(&filtered, page)
    }

    /// Cuts page `page` out of an already filtered sequence.
    #[must_use]
    pub fn from_filtered(filtered: &[ItemId], page: u32) -> Self {
        Self {
            items: paginate(filtered, page, PAGE_SIZE).to_vec(),
            total: filtered.len() as u64,
            page: page.max(1),
            page_size: PAGE_SIZE,
        }
    }

    /// Total number of pages in the filtered sequence.
    #[must_use]
    pub const fn total_pages(&self) -> u64 {
        if self.page_size == 0 {
            return 0;
        }
        self.total.div_ceil(self.page_size as u64)
    }

    /// Returns true if a page follows this one.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        (self.page as u64) < self.total_pages()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    fn test_filter_empty_term_borrows() {
        let sequence = [3, 1, 2];

        let result = filter(&sequence, "");

        assert!(matches!(result, Cow::Borrowed(_)));
        assert_eq!(result.as_ref(), &[3, 1, 2]);
    }

    #[rstest]
    fn test_filter_matches_digit_substring() {
        let sequence = [12, 5, 120, 512, 21, 1];

        let result = filter(&sequence, "12");

        assert_eq!(result.as_ref(), &[12, 120, 512]);
    }

    #[rstest]
    fn test_filter_non_digit_term_matches_nothing() {
        let sequence: Vec<ItemId> = (1..=100).collect();

        assert!(filter(&sequence, "a").is_empty());
    }

    #[rstest]
    #[case(1, &[1, 2, 3])]
    #[case(2, &[4, 5, 6])]
    #[case(4, &[10])]
    #[case(5, &[])]
    #[case(0, &[1, 2, 3])]
    fn test_paginate(#[case] page: u32, #[case] expected: &[ItemId]) {
        let sequence: Vec<ItemId> = (1..=10).collect();

        assert_eq!(paginate(&sequence, page, 3), expected);
    }

    #[rstest]
    fn test_paginate_huge_page_is_empty() {
        let sequence: Vec<ItemId> = (1..=10).collect();

        assert!(paginate(&sequence, u32::MAX, PAGE_SIZE).is_empty());
    }

    #[rstest]
    fn test_first_page_of_million() {
        let sequence: Vec<ItemId> = (1..=1_000_000).collect();

        let page = Page::compute(&sequence, "", 1);

        assert_eq!(page.items, (1..=20).collect::<Vec<_>>());
        assert_eq!(page.total, 1_000_000);
        assert_eq!(page.page, 1);
        assert_eq!(page.page_size, 20);
        assert_eq!(page.total_pages(), 50_000);
        assert!(page.has_next());
    }

    #[rstest]
    fn test_search_123_on_million() {
        let sequence: Vec<ItemId> = (1..=1_000_000).collect();

        let page = Page::compute(&sequence, "123", 1);
        let expected_total = sequence
            .iter()
            .filter(|id| id.to_string().contains("123"))
            .count() as u64;

        assert_eq!(page.total, expected_total);
        assert_eq!(&page.items[..3], &[123, 1123, 1230]);
        assert!(page.items.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[rstest]
    fn test_out_of_range_page_keeps_total() {
        let sequence: Vec<ItemId> = (1..=30).collect();

        let page = Page::compute(&sequence, "", 3);

        assert!(page.items.is_empty());
        assert_eq!(page.total, 30);
        assert!(!page.has_next());
    }

    proptest! {
        #[test]
        fn prop_filter_empty_is_identity(sequence in proptest::collection::vec(1_u32..10_000, 0..300)) {
            let filtered = filter(&sequence, "");
            prop_assert_eq!(filtered.as_ref(), sequence.as_slice());
        }

        #[test]
        fn prop_pages_reconstruct_sequence(sequence in proptest::collection::vec(1_u32..10_000, 0..300)) {
            let page_count = sequence.len().div_ceil(PAGE_SIZE as usize) as u32;
            let mut rebuilt = Vec::with_capacity(sequence.len());
            for page in 1..=page_count {
                let slice = paginate(&sequence, page, PAGE_SIZE);
                prop_assert!(slice.len() <= PAGE_SIZE as usize);
                rebuilt.extend_from_slice(slice);
            }
            prop_assert_eq!(rebuilt, sequence);
        }

        #[test]
        fn prop_filter_preserves_order(term in "[0-9]{1,2}") {
            let sequence: Vec<ItemId> = (1..=2_000).rev().collect();
            let filtered = filter(&sequence, &term);
            prop_assert!(filtered.windows(2).all(|pair| pair[0] > pair[1]));
            prop_assert!(filtered.iter().all(|id| id.to_string().contains(term.as_str())));
        }
    }
}
