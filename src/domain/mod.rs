//! Domain module for the item collection.
//!
//! This module contains the collection store and the pure query engine
//! that pages and filters it.

pub mod collection;
pub mod query;

pub use collection::{CollectionStore, ItemId, StoreError};
pub use query::{PAGE_SIZE, Page, filter, paginate};
