//! Integration tests for map listing.
//!
//! Tests verify:
//! - Distinct top-level prefixes come back as bare map names
//! - Nested keys do not produce duplicate or extra entries
//! - Listing failures map to a 500

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use maptile_streamer::server::{create_router, RouterConfig};
use maptile_streamer::tile::TileResolver;

use super::test_utils::MockTileStore;

fn test_router_config() -> RouterConfig {
    RouterConfig::new().with_tracing(false)
}

async fn get(router: axum::Router, uri: &str) -> axum::response::Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    router.oneshot(request).await.unwrap()
}

#[tokio::test]
async fn test_list_maps_strips_delimiters_and_deduplicates() {
    // objects under a/, b/ and a nested key under a/ again
    let store = MockTileStore::new()
        .with_object("a/s1/0/0/0.png", &b"t"[..])
        .with_object("b/settings.json", &b"{}"[..])
        .with_object("a/x", &b"t"[..]);
    let router = create_router(TileResolver::new(store), test_router_config());

    let response = get(router, "/maps/").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/json"
    );

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let maps: Vec<String> = serde_json::from_slice(&body).unwrap();
    assert_eq!(maps, vec!["a".to_string(), "b".to_string()]);
}

#[tokio::test]
async fn test_list_maps_without_trailing_slash() {
    let store = MockTileStore::new().with_object("osm/s1/0/0/0.png", &b"t"[..]);
    let router = create_router(TileResolver::new(store), test_router_config());

    let response = get(router, "/maps").await;

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let maps: Vec<String> = serde_json::from_slice(&body).unwrap();
    assert_eq!(maps, vec!["osm".to_string()]);
}

#[tokio::test]
async fn test_list_maps_empty_store() {
    let store = MockTileStore::new();
    let router = create_router(TileResolver::new(store), test_router_config());

    let response = get(router, "/maps/").await;

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let maps: Vec<String> = serde_json::from_slice(&body).unwrap();
    assert!(maps.is_empty());
}

#[tokio::test]
async fn test_list_maps_failure_returns_500() {
    let store = MockTileStore::new().with_list_failure();
    let router = create_router(TileResolver::new(store), test_router_config());

    let response = get(router, "/maps/").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let error: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(error["error"], "list_error");
}
