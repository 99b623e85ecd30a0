//! Integration tests for the REST endpoints.
//!
//! Each test drives the full router (routing, extraction, error mapping,
//! fallback) with `tower::ServiceExt::oneshot`.

mod common;

use axum::http::{Method, StatusCode};
use rstest::rstest;
use serde_json::json;

use common::{create_test_app, get, ids, post, send};

// =============================================================================
// GET /api/items
// =============================================================================

#[rstest]
#[tokio::test]
async fn test_first_page_of_a_million() {
    let (app, _) = create_test_app(1_000_000);

    let (status, body) = get(&app, "/api/items?page=1&search=").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(ids(&body["items"]), (1..=20).collect::<Vec<_>>());
    assert_eq!(body["total"], json!(1_000_000));
    assert_eq!(body["page"], json!(1));
    assert_eq!(body["pageSize"], json!(20));
}

#[rstest]
#[tokio::test]
async fn test_search_returns_matching_ids_in_order() {
    let (app, _) = create_test_app(1_000_000);

    let (status, body) = get(&app, "/api/items?page=1&search=123&_=1700000000000").await;

    assert_eq!(status, StatusCode::OK);
    let items = ids(&body["items"]);
    assert_eq!(items[..3], [123, 1123, 1230]);
    assert!(items.windows(2).all(|pair| pair[0] < pair[1]));
    assert!(items.iter().all(|id| id.to_string().contains("123")));
    let expected_total = (1..=1_000_000_u32)
        .filter(|id| id.to_string().contains("123"))
        .count();
    assert_eq!(body["total"], json!(expected_total));
}

#[rstest]
#[tokio::test]
async fn test_defaults_and_out_of_range_page() {
    let (app, _) = create_test_app(30);

    let (_, first) = get(&app, "/api/items").await;
    let (status, beyond) = get(&app, "/api/items?page=9").await;

    assert_eq!(ids(&first["items"]).len(), 20);
    assert_eq!(status, StatusCode::OK);
    assert!(ids(&beyond["items"]).is_empty());
    assert_eq!(beyond["total"], json!(30));
    assert_eq!(beyond["page"], json!(9));
}

#[rstest]
#[tokio::test]
async fn test_non_numeric_page_is_bad_request() {
    let (app, _) = create_test_app(30);

    let (status, body) = get(&app, "/api/items?page=two").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert!(body["error"].is_string());
}

// =============================================================================
// Reads
// =============================================================================

#[rstest]
#[tokio::test]
async fn test_all_ids_ignores_search() {
    let (app, _) = create_test_app(100);
    post(&app, "/api/save-state", json!({"searchTerm": "7"})).await;

    let (status, body) = get(&app, "/api/all-items-ids").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body["ids"]), (1..=100).collect::<Vec<_>>());
}

#[rstest]
#[tokio::test]
async fn test_initial_state_snapshot() {
    let (app, _) = create_test_app(100);
    post(
        &app,
        "/api/save-state",
        json!({"selectedItems": [4, 8], "searchTerm": "4"}),
    )
    .await;

    let (status, body) = get(&app, "/api/initial-state").await;

    assert_eq!(status, StatusCode::OK);
    let mut selected = ids(&body["selected"]);
    selected.sort_unstable();
    assert_eq!(selected, vec![4, 8]);
    assert_eq!(ids(&body["lastSorted"]), (1..=20).collect::<Vec<_>>());
    assert_eq!(body["lastSearch"], json!("4"));
}

#[rstest]
#[tokio::test]
async fn test_selected_items_contains_exactly_saved_ids() {
    let (app, _) = create_test_app(100);
    post(&app, "/api/save-state", json!({"selectedItems": [9, 3, 3, 500]})).await;

    let (_, body) = get(&app, "/api/selected-items").await;

    let mut selected = ids(&body["selectedItems"]);
    selected.sort_unstable();
    assert_eq!(selected, vec![3, 9]);
}

// =============================================================================
// POST /api/save-state
// =============================================================================

#[rstest]
#[tokio::test]
async fn test_save_valid_permutation() {
    let (app, _) = create_test_app(50);
    let mut order: Vec<u32> = (1..=50).collect();
    order.swap(0, 1);

    let (status, body) = post(
        &app,
        "/api/save-state",
        json!({"selectedItems": [1], "sortedItems": order, "searchTerm": ""}),
    )
    .await;
    let (_, all) = get(&app, "/api/all-items-ids").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["selectedCount"], json!(1));
    assert_eq!(body["sortedCount"], json!(50));
    assert_eq!(ids(&all["ids"]), order);
}

#[rstest]
#[case::foreign_value({ let mut order: Vec<u32> = (1..=50).collect(); order[10] = 51; order })]
#[case::missing_value((1..=49).collect())]
#[case::duplicate_value({ let mut order: Vec<u32> = (1..=50).collect(); order[0] = 2; order })]
#[tokio::test]
async fn test_save_invalid_permutation_changes_nothing(#[case] order: Vec<u32>) {
    let (app, _) = create_test_app(50);
    post(&app, "/api/update-order", json!({"movedItemId": 1, "targetItemId": 2})).await;
    post(&app, "/api/save-state", json!({"selectedItems": [5], "searchTerm": "5"})).await;
    let (_, before) = get(&app, "/api/all-items-ids").await;

    let (status, body) = post(
        &app,
        "/api/save-state",
        json!({"selectedItems": [6, 7], "sortedItems": order, "searchTerm": "6"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    let (_, after) = get(&app, "/api/all-items-ids").await;
    assert_eq!(after["ids"], before["ids"]);
    let (_, initial) = get(&app, "/api/initial-state").await;
    assert_eq!(ids(&initial["selected"]), vec![5]);
    assert_eq!(initial["lastSearch"], json!("5"));
}

#[rstest]
#[tokio::test]
async fn test_save_malformed_body_is_bad_request() {
    let (app, _) = create_test_app(10);

    let (status, body) = post(&app, "/api/save-state", json!({"selectedItems": "all"})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
}

// =============================================================================
// POST /api/update-order
// =============================================================================

#[rstest]
#[tokio::test]
async fn test_update_order_swaps_and_restores() {
    let (app, _) = create_test_app(20);
    let request = json!({"movedItemId": 5, "targetItemId": 9});

    let (status, body) = post(&app, "/api/update-order", request.clone()).await;
    let (_, swapped) = get(&app, "/api/all-items-ids").await;
    post(&app, "/api/update-order", request).await;
    let (_, restored) = get(&app, "/api/all-items-ids").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    let swapped = ids(&swapped["ids"]);
    assert_eq!(swapped[4], 9);
    assert_eq!(swapped[8], 5);
    assert_eq!(ids(&restored["ids"]), (1..=20).collect::<Vec<_>>());
}

#[rstest]
#[tokio::test]
async fn test_update_order_invalid_id() {
    let (app, _) = create_test_app(20);

    let (status, body) = post(
        &app,
        "/api/update-order",
        json!({"movedItemId": 5, "targetItemId": 21}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
}

#[rstest]
#[tokio::test]
async fn test_search_sees_swapped_order() {
    let (app, _) = create_test_app(100);
    get(&app, "/api/items?search=1").await;

    post(&app, "/api/update-order", json!({"movedItemId": 1, "targetItemId": 10})).await;
    let (_, body) = get(&app, "/api/items?search=1").await;

    assert_eq!(ids(&body["items"])[..2], [10, 1]);
}

// =============================================================================
// POST /api/reset-state and fallback
// =============================================================================

#[rstest]
#[tokio::test]
async fn test_reset_state() {
    let (app, service) = create_test_app(40);
    post(
        &app,
        "/api/save-state",
        json!({"selectedItems": [1], "sortedItems": (1..=40).rev().collect::<Vec<u32>>()}),
    )
    .await;

    let (status, body) = post(&app, "/api/reset-state", json!({})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["initialItemsCount"], json!(40));
    assert_eq!(service.all_ids().await.as_slice(), (1..=40).collect::<Vec<_>>().as_slice());
    assert!(service.selected_items().await.is_empty());
}

#[rstest]
#[case("/api/unknown")]
#[case("/items")]
#[case("/")]
#[tokio::test]
async fn test_unmatched_route(#[case] uri: &str) {
    let (app, _) = create_test_app(10);

    let (status, body) = get(&app, uri).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"success": false, "error": "Endpoint not found"}));
}

#[rstest]
#[case::get_on_save_state(Method::GET, "/api/save-state")]
#[case::get_on_reset_state(Method::GET, "/api/reset-state")]
#[case::post_on_items(Method::POST, "/api/items")]
#[case::delete_on_all_ids(Method::DELETE, "/api/all-items-ids")]
#[tokio::test]
async fn test_wrong_method_is_endpoint_not_found(#[case] method: Method, #[case] uri: &str) {
    let (app, _) = create_test_app(10);

    let (status, body) = send(&app, method, uri, Some(json!({}))).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"success": false, "error": "Endpoint not found"}));
}

#[rstest]
#[tokio::test]
async fn test_health() {
    let (app, _) = create_test_app(10);

    let (status, body) = get(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["status"], json!("healthy"));
}
