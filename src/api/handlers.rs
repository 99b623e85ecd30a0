//! HTTP handlers for the list-state API.
//!
//! Each handler validates its input at the boundary, calls the
//! [`CollectionService`] and converts the result into a wire DTO.

use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};

use super::dto::{
    AllIdsResponse, InitialStateResponse, ItemsQuery, ItemsResponse, MessageResponse,
    ResetStateResponse, SaveStateRequest, SaveStateResponse, SelectedItemsResponse,
    UpdateOrderRequest,
};
use super::error::ApiErrorResponse;
use crate::application::CollectionService;

// =============================================================================
// Application State
// =============================================================================

/// Shared handler dependencies.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The collection state every handler reads and writes.
    pub service: CollectionService,
}

impl AppState {
    /// Creates handler state around a service handle.
    #[must_use]
    pub const fn new(service: CollectionService) -> Self {
        Self { service }
    }
}

// =============================================================================
// Read Handlers
// =============================================================================

/// `GET /api/items?page&search`: one page of the filtered current order.
///
/// # Errors
///
/// Returns 400 if the query string cannot be parsed (e.g. a non-numeric page).
pub async fn get_items(
    State(state): State<AppState>,
    query: Result<Query<ItemsQuery>, QueryRejection>,
) -> Result<Json<ItemsResponse>, ApiErrorResponse> {
    let Query(query) = query?;
    let page = state.service.get_page(query.page, &query.search).await;
    Ok(Json(ItemsResponse::from(page)))
}

/// `GET /api/all-items-ids`: the full current order, unfiltered.
pub async fn get_all_item_ids(State(state): State<AppState>) -> Json<AllIdsResponse> {
    Json(AllIdsResponse {
        success: true,
        ids: state.service.all_ids().await,
    })
}

/// `GET /api/selected-items`.
pub async fn get_selected_items(State(state): State<AppState>) -> Json<SelectedItemsResponse> {
    Json(SelectedItemsResponse {
        success: true,
        selected_items: state.service.selected_items().await,
    })
}

/// `GET /api/initial-state`: selection, first page and last search in one round trip.
pub async fn get_initial_state(State(state): State<AppState>) -> Json<InitialStateResponse> {
    Json(InitialStateResponse::from(state.service.initial_state().await))
}

// =============================================================================
// Write Handlers
// =============================================================================

/// `POST /api/update-order`: swaps two items by id.
///
/// # Errors
///
/// Returns 400 if the body is malformed or either id is not in the current order.
pub async fn update_order(
    State(state): State<AppState>,
    request: Result<Json<UpdateOrderRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiErrorResponse> {
    let Json(request) = request?;
    state
        .service
        .update_order(request.moved_item_id, request.target_item_id)
        .await?;
    Ok(Json(MessageResponse::ok("Order updated successfully")))
}

/// `POST /api/save-state`: replaces selection, order and last search term.
///
/// # Errors
///
/// Returns 400 if the body is malformed or `sortedItems` is non-empty and
/// not a permutation of the collection. Nothing is committed in that case.
pub async fn save_state(
    State(state): State<AppState>,
    request: Result<Json<SaveStateRequest>, JsonRejection>,
) -> Result<Json<SaveStateResponse>, ApiErrorResponse> {
    let Json(request) = request?;
    let outcome = state.service.save_state(request.into()).await?;
    Ok(Json(SaveStateResponse::from(outcome)))
}

/// `POST /api/reset-state`: back to the base order with nothing selected.
pub async fn reset_state(State(state): State<AppState>) -> Json<ResetStateResponse> {
    Json(ResetStateResponse::new(state.service.reset().await))
}

// =============================================================================
// Fallback and Health
// =============================================================================

/// Fallback for unmatched routes.
pub async fn endpoint_not_found() -> ApiErrorResponse {
    ApiErrorResponse::not_found("Endpoint not found")
}

/// Health check response body.
#[derive(Debug, Clone, serde::Serialize)]
pub struct HealthResponse {
    pub success: bool,
    /// Service status.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
}

/// `GET /health`.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        success: true,
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// =============================================================================
// Tests
// =============================================================================
