//! Application layer.
//!
//! The state service shared by every transport, and the cache it uses to
//! avoid re-filtering the collection on each page request.

pub mod cache;
pub mod service;

pub use cache::{FilterCache, FilterCacheKey, FilterCacheStats};
pub use service::{CollectionService, InitialState, SaveCommand, SaveOutcome};
