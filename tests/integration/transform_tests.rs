//! Integration tests for coordinate transforms.
//!
//! Tests verify:
//! - The remap formula end-to-end (updated level drives the scale factor)
//! - Lookup order: style-scoped rule first, map-scoped fallback second
//! - No transform lookup without a (non-empty) `transform` parameter
//! - Error mapping for missing and malformed transform objects

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
async fn test_transform_remaps_coordinates() {
    // rule {level: 2, col: 1, row: 1} applied to (5, 10, 3):
    //   level 5 - 2 = 3, col 10 - (3+1)*1 = 6, row 3 - (3+1)*1 = -1
    let store = MockTileStore::new()
        .with_object("m1/s1/t1.json", &br#"{"level": 2, "col": 1, "row": 1}"#[..])
        .with_object("m1/s1/3/6/-1.png", &b"remapped-tile"[..]);
    let log = store.request_log();
    let router = create_router(TileResolver::new(store), test_router_config());

    let response = get(router, "/map/m1/s1/5/10/3/tile.png?transform=t1").await;

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"remapped-tile");

    assert_eq!(
        log.entries(),
        vec!["m1/s1/t1.json".to_string(), "m1/s1/3/6/-1.png".to_string()]
    );
}

#[tokio::test]
async fn test_no_transform_param_skips_transform_lookup() {
    let store = MockTileStore::new()
        .with_object("m1/s1/t1.json", &br#"{"level": 1, "col": 0, "row": 0}"#[..])
        .with_object("m1/s1/2/3/4.png", &b"plain-tile"[..]);
    let log = store.request_log();
    let router = create_router(TileResolver::new(store), test_router_config());

    let response = get(router, "/map/m1/s1/2/3/4/tile.png").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(log.entries(), vec!["m1/s1/2/3/4.png".to_string()]);
}

#[tokio::test]
async fn test_empty_transform_param_skips_transform_lookup() {
    let store = MockTileStore::new().with_object("m1/s1/2/3/4.png", &b"plain-tile"[..]);
    let log = store.request_log();
    let router = create_router(TileResolver::new(store), test_router_config());

    let response = get(router, "/map/m1/s1/2/3/4/tile.png?transform=").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(log.entries(), vec!["m1/s1/2/3/4.png".to_string()]);
}

#[tokio::test]
async fn test_style_scoped_rule_preferred_over_map_scoped() {
    // both rules exist; only the style-scoped one maps onto an existing tile
    let store = MockTileStore::new()
        .with_object("m1/s1/t1.json", &br#"{"level": 1, "col": 0, "row": 0}"#[..])
        .with_object("m1/t1.json", &br#"{"level": 2, "col": 0, "row": 0}"#[..])
        .with_object("m1/s1/1/3/4.png", &b"styled"[..]);
    let log = store.request_log();
    let router = create_router(TileResolver::new(store), test_router_config());

    let response = get(router, "/map/m1/s1/2/3/4/tile.png?transform=t1").await;

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"styled");

    let entries = log.entries();
    assert!(entries.contains(&"m1/s1/t1.json".to_string()));
    assert!(
        !entries.contains(&"m1/t1.json".to_string()),
        "the map-scoped rule must not be consulted when the style-scoped one exists"
    );
}

#[tokio::test]
async fn test_map_scoped_fallback_on_absence() {
    let store = MockTileStore::new()
        .with_object("m1/t1.json", &br#"{"level": 2, "col": 0, "row": 0}"#[..])
        .with_object("m1/s1/0/3/4.png", &b"fallback"[..]);
    let log = store.request_log();
    let router = create_router(TileResolver::new(store), test_router_config());

    let response = get(router, "/map/m1/s1/2/3/4/tile.png?transform=t1").await;

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"fallback");

    assert_eq!(
        log.entries(),
        vec![
            "m1/s1/t1.json".to_string(),
            "m1/t1.json".to_string(),
            "m1/s1/0/3/4.png".to_string()
        ]
    );
}

#[tokio::test]
async fn test_transform_missing_returns_400_naming_fallback_key() {
    let store = MockTileStore::new().with_object("m1/s1/2/3/4.png", &b"tile"[..]);
    let router = create_router(TileResolver::new(store), test_router_config());

    let response = get(router, "/map/m1/s1/2/3/4/tile.png?transform=t1").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let error: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let message = error["message"].as_str().unwrap();
    assert!(message.contains("could not get transformation"));
    assert!(message.contains("m1/t1.json"));
}

#[tokio::test]
async fn test_transform_malformed_json_returns_500() {
    let store = MockTileStore::new()
        .with_object("m1/s1/t1.json", &b"not json at all"[..])
        .with_object("m1/s1/2/3/4.png", &b"tile"[..]);
    let router = create_router(TileResolver::new(store), test_router_config());

    let response = get(router, "/map/m1/s1/2/3/4/tile.png?transform=t1").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let error: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(error["error"], "transform_invalid");
}

#[tokio::test]
async fn test_transform_missing_field_returns_500() {
    let store = MockTileStore::new()
        .with_object("m1/s1/t1.json", &br#"{"level": 2, "col": 1}"#[..])
        .with_object("m1/s1/2/3/4.png", &b"tile"[..]);
    let router = create_router(TileResolver::new(store), test_router_config());

    let response = get(router, "/map/m1/s1/2/3/4/tile.png?transform=t1").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_transform_float_fields_truncate() {
    // numeric fields are truncated toward zero: behaves like {2, 1, 1}
    let store = MockTileStore::new()
        .with_object(
            "m1/s1/t1.json",
            &br#"{"level": 2.9, "col": 1.2, "row": 1.8}"#[..],
        )
        .with_object("m1/s1/3/6/-1.png", &b"truncated"[..]);
    let router = create_router(TileResolver::new(store), test_router_config());

    let response = get(router, "/map/m1/s1/5/10/3/tile.png?transform=t1").await;

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"truncated");
}
