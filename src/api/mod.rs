//! API module for HTTP handlers.
//!
//! This module contains route definitions and request/response handlers.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod routes;

pub use dto::{
    AllIdsResponse, InitialStateResponse, ItemsQuery, ItemsResponse, MessageResponse,
    ResetStateResponse, SaveStateRequest, SaveStateResponse, SelectedItemsResponse,
    UpdateOrderRequest,
};
pub use error::{ApiErrorResponse, ErrorBody};
pub use handlers::{AppState, HealthResponse};
pub use routes::router;
