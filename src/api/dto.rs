//! Data Transfer Objects for API requests and responses.
//!
//! Field names are camelCase on the wire. Every response carries
//! `success`; the same types are deserialized by the client transport.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::application::{InitialState, SaveCommand, SaveOutcome};
use crate::domain::{ItemId, Page};

// =============================================================================
// Query Parameters
// =============================================================================

/// Query parameters for `GET /api/items`.
///
/// Unknown parameters (such as a cache-busting `_`) are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemsQuery {
    /// Page number (1-indexed, default 1).
    #[serde(default = "default_page")]
    pub page: u32,
    /// Substring filter (default empty).
    #[serde(default)]
    pub search: String,
}

const fn default_page() -> u32 {
    1
}

// =============================================================================
// Request DTOs
// =============================================================================

/// Request body for `POST /api/update-order`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderRequest {
    /// Item being moved.
    pub moved_item_id: ItemId,
    /// Item whose position it takes.
    pub target_item_id: ItemId,
}

/// Request body for `POST /api/save-state`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveStateRequest {
    /// Selected ids.
    #[serde(default)]
    pub selected_items: Vec<ItemId>,
    /// Full new order, or empty to keep the current one.
    #[serde(default)]
    pub sorted_items: Vec<ItemId>,
    /// Search term in effect on the client.
    #[serde(default)]
    pub search_term: String,
}

impl From<SaveStateRequest> for SaveCommand {
    fn from(request: SaveStateRequest) -> Self {
        Self {
            selected: request.selected_items,
            ordered: request.sorted_items,
            search_term: request.search_term,
        }
    }
}

// =============================================================================
// Response DTOs
// =============================================================================

/// Response for `GET /api/items`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemsResponse {
    pub success: bool,
    pub items: Vec<ItemId>,
    /// Length of the filtered sequence.
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

impl From<Page> for ItemsResponse {
    fn from(page: Page) -> Self {
        Self {
            success: true,
            items: page.items,
            total: page.total,
            page: page.page,
            page_size: page.page_size,
        }
    }
}

/// Response for `GET /api/all-items-ids`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllIdsResponse {
    pub success: bool,
    pub ids: Arc<Vec<ItemId>>,
}

/// Response for `GET /api/selected-items`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedItemsResponse {
    pub success: bool,
    pub selected_items: Vec<ItemId>,
}

/// Response for `GET /api/initial-state`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialStateResponse {
    pub success: bool,
    /// Stored selection.
    pub selected: Vec<ItemId>,
    /// First page of the current order.
    pub last_sorted: Vec<ItemId>,
    /// Last saved search term.
    #[serde(default)]
    pub last_search: String,
}

impl From<InitialState> for InitialStateResponse {
    fn from(state: InitialState) -> Self {
        Self {
            success: true,
            selected: state.selected,
            last_sorted: state.first_page,
            last_search: state.last_search,
        }
    }
}

/// Generic acknowledgement for writes without a payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    /// A successful acknowledgement.
    #[must_use]
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Response for `POST /api/save-state`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveStateResponse {
    pub success: bool,
    pub message: String,
    pub selected_count: usize,
    pub sorted_count: usize,
}

impl From<SaveOutcome> for SaveStateResponse {
    fn from(outcome: SaveOutcome) -> Self {
        Self {
            success: true,
            message: "State saved successfully".to_owned(),
            selected_count: outcome.selected_count,
            sorted_count: outcome.sorted_count,
        }
    }
}

/// Response for `POST /api/reset-state`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetStateResponse {
    pub success: bool,
    pub message: String,
    pub initial_items_count: usize,
}

impl ResetStateResponse {
    /// Acknowledges a reset of a collection of `count` items.
    #[must_use]
    pub fn new(count: usize) -> Self {
        Self {
            success: true,
            message: "State reset to initial".to_owned(),
            initial_items_count: count,
        }
    }
}
