//! Router assembly.

use std::any::Any;

use axum::{
    Router,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use super::error::ApiErrorResponse;
use super::handlers::{
    AppState, endpoint_not_found, get_all_item_ids, get_initial_state, get_items,
    get_selected_items, health_check, reset_state, save_state, update_order,
};

/// Builds the application router with tracing, CORS and panic recovery.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods(AnyOrigin)
        .allow_headers(AnyOrigin);

    // A known path with the wrong method is treated as an unmatched route.
    Router::new()
        .route("/health", get(health_check).fallback(endpoint_not_found))
        .route("/api/items", get(get_items).fallback(endpoint_not_found))
        .route(
            "/api/all-items-ids",
            get(get_all_item_ids).fallback(endpoint_not_found),
        )
        .route(
            "/api/selected-items",
            get(get_selected_items).fallback(endpoint_not_found),
        )
        .route(
            "/api/initial-state",
            get(get_initial_state).fallback(endpoint_not_found),
        )
        .route(
            "/api/update-order",
            post(update_order).fallback(endpoint_not_found),
        )
        .route("/api/save-state", post(save_state).fallback(endpoint_not_found))
        .route(
            "/api/reset-state",
            post(reset_state).fallback(endpoint_not_found),
        )
        .fallback(endpoint_not_found)
        .layer(CatchPanicLayer::custom(internal_error_response))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn internal_error_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(detail, "Handler panicked");
    ApiErrorResponse::internal_error("Internal server error").into_response()
}
