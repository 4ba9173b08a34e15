//! # maptile-streamer
//!
//! A read-only tile server for map tiles stored in S3-compatible object
//! storage.
//!
//! The server maps URL-encoded tile coordinates (map name, style, zoom level,
//! column, row) onto objects in a bucket, optionally applying a coordinate
//! transformation loaded from a companion configuration object before
//! resolving the final storage key. Transforms let a derived map layer reuse
//! another layer's imagery without duplicating it.
//!
//! ## Storage layout
//!
//! ```text
//! {map}/{style}/{level}/{col}/{row}.png   - tile imagery
//! {map}/{config}.json                     - map configuration documents
//! {map}/{style}/{transform}.json          - style-scoped transform rules
//! {map}/{transform}.json                  - map-scoped transform rules
//! ```
//!
//! ## Architecture
//!
//! - [`store`] - object store abstraction and the S3 implementation
//! - [`tile`] - coordinate model, transform rules and the resolver
//! - [`server`] - Axum-based HTTP routes and handlers
//! - [`config`] - CLI and configuration types
//! - [`error`] - error taxonomy shared by all layers
//!
//! ## Example
//!
//! ```rust,no_run
//! use maptile_streamer::server::{create_router, RouterConfig};
//! use maptile_streamer::store::{create_s3_client, S3TileStore};
//! use maptile_streamer::tile::TileResolver;
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = create_s3_client(None, "us-east-1").await;
//!     let store = S3TileStore::new(client, "my-tiles".to_string());
//!     let resolver = TileResolver::new(store);
//!
//!     let router = create_router(resolver, RouterConfig::new());
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8080")
//!         .await
//!         .unwrap();
//!     axum::serve(listener, router).await.unwrap();
//! }
//! ```

pub mod config;
pub mod error;
pub mod server;
pub mod store;
pub mod tile;

// Re-export commonly used types
pub use config::{CheckConfig, Cli, Command, ServeConfig};
pub use error::{ResolveError, StoreError};
pub use server::{
    config_handler, create_router, health_handler, maps_handler, path_echo_handler, tile_handler,
    AppState, ErrorResponse, HealthResponse, RouterConfig, TileQueryParams,
};
pub use store::{create_s3_client, ObjectReader, S3ObjectReader, S3TileStore, TileStore};
pub use tile::{
    config_key, transform_key, validate_segment, TileCoordinate, TileResolver, TransformRule,
};
