//! Router configuration and assembly.
//!
//! # Route Structure
//!
//! ```text
//! /health                                        - health check
//! /map/{mapname}/{style}/{level}/{col}/{row}/tile.png - tile endpoint
//! /maps/                                         - list map namespaces
//! /mapconfig/{mapname}/{configuration}           - configuration endpoint
//! (anything else)                                - path echo
//! ```
//!
//! The tile and config routes are registered as wildcards and parsed by hand
//! in the handlers, so a path with the wrong segment count still reaches the
//! arity check and comes back as a 400 rather than a router-level 404.
//!
//! # Example
//!
//! ```ignore
//! use maptile_streamer::server::{create_router, RouterConfig};
//! use maptile_streamer::store::{create_s3_client, S3TileStore};
//! use maptile_streamer::tile::TileResolver;
//!
//! let client = create_s3_client(None, "us-east-1").await;
//! let store = S3TileStore::new(client, "my-tiles".to_string());
//! let resolver = TileResolver::new(store);
//!
//! let router = create_router(resolver, RouterConfig::new());
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, router).await?;
//! ```

use std::time::Duration;

use axum::{routing::get, Router};
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::Method;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{
    config_handler, health_handler, maps_handler, path_echo_handler, tile_handler, AppState,
};
use crate::store::TileStore;
use crate::tile::TileResolver;

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Clone)]
pub struct RouterConfig {
    /// Allowed CORS origins (None = allow any origin)
    pub cors_origins: Option<Vec<String>>,

    /// Cache-Control max-age in seconds for tile and config responses
    pub cache_max_age: u32,

    /// Whether to enable request tracing
    pub enable_tracing: bool,
}

impl RouterConfig {
    /// Create a router configuration with defaults:
    /// CORS allows any origin, cache max-age is 1 hour, tracing is enabled.
    pub fn new() -> Self {
        Self {
            cors_origins: None,
            cache_max_age: 3600,
            enable_tracing: true,
        }
    }

    /// Set specific allowed CORS origins.
    ///
    /// Pass an empty vec to disallow all cross-origin requests.
    /// Pass None (or don't call this method) to allow any origin.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    /// Allow any CORS origin.
    pub fn with_cors_any_origin(mut self) -> Self {
        self.cors_origins = None;
        self
    }

    /// Set the Cache-Control max-age in seconds.
    pub fn with_cache_max_age(mut self, seconds: u32) -> Self {
        self.cache_max_age = seconds;
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the main application router.
///
/// Builds the complete Axum router with the tile API routes, the path-echo
/// fallback, CORS configuration and optional request tracing.
pub fn create_router<S>(resolver: TileResolver<S>, config: RouterConfig) -> Router
where
    S: TileStore + 'static,
{
    let app_state = AppState::with_cache_max_age(resolver, config.cache_max_age);
    let cors = build_cors_layer(&config);

    // A wildcard does not match an empty tail, so "/map/" and "/mapconfig/"
    // get their own entries; both shapes fail the arity check with a 400.
    let router = Router::new()
        .route("/health", get(health_handler))
        .route("/maps", get(maps_handler::<S>))
        .route("/maps/", get(maps_handler::<S>))
        .route("/map/", get(tile_handler::<S>))
        .route("/map/{*rest}", get(tile_handler::<S>))
        .route("/mapconfig/", get(config_handler::<S>))
        .route("/mapconfig/{*rest}", get(config_handler::<S>))
        .fallback(get(path_echo_handler))
        .with_state(app_state)
        .layer(cors);

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Build the CORS layer based on configuration.
fn build_cors_layer(config: &RouterConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .max_age(Duration::from_secs(86400)); // 24 hours

    match &config.cors_origins {
        None => cors.allow_origin(Any),
        Some(origins) if origins.is_empty() => {
            // No origins allowed - this effectively disables CORS
            cors
        }
        Some(origins) => {
            let parsed_origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            cors.allow_origin(parsed_origins)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
