//! HTTP request handlers for the tile API.
//!
//! # Endpoints
//!
//! - `GET /map/{mapname}/{style}/{level}/{col}/{row}/tile.png` - serve a tile
//! - `GET /maps/` - list map namespaces
//! - `GET /mapconfig/{mapname}/{configuration}` - serve a configuration document
//! - `GET /health` - health check
//! - any other path - echo the request path
//!
//! Paths for the tile and config routes are split and arity-checked here,
//! before any store access; the resolver only ever sees validated segments.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::error::ResolveError;
use crate::store::{ObjectReader, TileStore};
use crate::tile::{TileCoordinate, TileResolver};

/// Expected shape of the tile route, quoted in 400 messages.
const TILE_PATH_FORMAT: &str = "/map/{mapname}/{style}/{level}/{col}/{row}/tile.png";

/// Expected shape of the config route, quoted in 400 messages.
const CONFIG_PATH_FORMAT: &str = "/mapconfig/{mapname}/{configuration}";

// =============================================================================
// Application State
// =============================================================================

/// Shared application state containing the tile resolver.
///
/// Passed to all handlers via Axum's State extractor.
pub struct AppState<S: TileStore> {
    /// The resolver for tile, config and listing requests
    pub resolver: Arc<TileResolver<S>>,

    /// Cache-Control max-age in seconds for tile and config responses
    pub cache_max_age: u32,
}

impl<S: TileStore> AppState<S> {
    /// Create a new application state with the given resolver.
    pub fn new(resolver: TileResolver<S>) -> Self {
        Self {
            resolver: Arc::new(resolver),
            cache_max_age: 3600,
        }
    }

    /// Create a new application state with a custom cache max-age.
    pub fn with_cache_max_age(resolver: TileResolver<S>, cache_max_age: u32) -> Self {
        Self {
            resolver: Arc::new(resolver),
            cache_max_age,
        }
    }
}

impl<S: TileStore> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            resolver: Arc::clone(&self.resolver),
            cache_max_age: self.cache_max_age,
        }
    }
}

// =============================================================================
// Request Parameters
// =============================================================================

/// Query parameters for tile requests.
#[derive(Debug, Deserialize)]
pub struct TileQueryParams {
    /// Name of the coordinate transform to apply; empty or absent disables it
    #[serde(default)]
    pub transform: Option<String>,
}

/// Split a tile route path and build the requested coordinate.
///
/// The path must have exactly 8 slash-delimited segments, counting the empty
/// leading segment and the trailing filename. The filename itself is not
/// inspected.
fn parse_tile_path(path: &str) -> Result<TileCoordinate, ResolveError> {
    let segments: Vec<&str> = path.split('/').collect();
    if segments.len() != 8 {
        return Err(ResolveError::BadPath {
            expected: TILE_PATH_FORMAT,
        });
    }

    Ok(TileCoordinate {
        map: segments[2].to_string(),
        style: segments[3].to_string(),
        level: parse_coordinate(segments[4]),
        col: parse_coordinate(segments[5]),
        row: parse_coordinate(segments[6]),
    })
}

/// Split a config route path into (map, configuration).
fn parse_config_path(path: &str) -> Result<(String, String), ResolveError> {
    let segments: Vec<&str> = path.split('/').collect();
    if segments.len() != 4 {
        return Err(ResolveError::BadPath {
            expected: CONFIG_PATH_FORMAT,
        });
    }

    Ok((segments[2].to_string(), segments[3].to_string()))
}

/// Parse one level/col/row segment.
///
/// A segment that is not a base-10 integer resolves to 0 rather than
/// rejecting the request; previously-served URLs depend on this.
fn parse_coordinate(segment: &str) -> i64 {
    segment.parse().unwrap_or(0)
}

// =============================================================================
// Response Types
// =============================================================================

/// JSON error response returned for all error conditions.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error type identifier (e.g., "bad_path", "object_unavailable")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code (included for convenience)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ErrorResponse {
    /// Create a new error response.
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: None,
        }
    }

    /// Create a new error response with status code.
    pub fn with_status(
        error: impl Into<String>,
        message: impl Into<String>,
        status: StatusCode,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: Some(status.as_u16()),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Convert ResolveError to an HTTP response.
///
/// The single place request failures become status codes:
/// - malformed paths and missing objects are client errors (400),
/// - failures after the store committed to serving (body reads), malformed
///   transform documents and listing failures are server errors (500).
///
/// 4xx errors are logged at WARN, 5xx at ERROR.
impl IntoResponse for ResolveError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            ResolveError::BadPath { .. } | ResolveError::InvalidSegment { .. } => {
                (StatusCode::BAD_REQUEST, "bad_path")
            }

            ResolveError::TransformUnavailable { .. } => {
                (StatusCode::BAD_REQUEST, "transform_unavailable")
            }

            ResolveError::ObjectUnavailable { .. } => {
                (StatusCode::BAD_REQUEST, "object_unavailable")
            }

            ResolveError::TransformInvalid { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "transform_invalid")
            }

            ResolveError::Stream { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "stream_error"),

            ResolveError::List(_) => (StatusCode::INTERNAL_SERVER_ERROR, "list_error"),
        };

        let message = self.to_string();

        if status.is_server_error() {
            error!(
                error_type = error_type,
                status = status.as_u16(),
                "Server error: {}",
                message
            );
        } else {
            warn!(
                error_type = error_type,
                status = status.as_u16(),
                "Client error: {}",
                message
            );
        }

        let error_response = ErrorResponse::with_status(error_type, message, status);

        (status, Json(error_response)).into_response()
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle tile requests.
///
/// # Endpoint
///
/// `GET /map/{mapname}/{style}/{level}/{col}/{row}/tile.png[?transform=NAME]`
///
/// # Response
///
/// - `200 OK`: tile bytes with `Content-Type: image/png`
/// - `400 Bad Request`: malformed path, missing tile, or missing transform
/// - `500 Internal Server Error`: transform parse failure or body-read failure
///
/// # Headers
///
/// - `Content-Type: image/png`
/// - `Cache-Control: public, max-age={cache_max_age}`
pub async fn tile_handler<S: TileStore>(
    State(state): State<AppState<S>>,
    uri: Uri,
    Query(query): Query<TileQueryParams>,
) -> Result<Response, ResolveError> {
    let coord = parse_tile_path(uri.path())?;
    let transform = query.transform.as_deref().filter(|name| !name.is_empty());

    let reader = state.resolver.resolve_tile(coord, transform).await?;
    let data = read_object(reader).await?;

    Ok(bytes_response(data, "image/png", state.cache_max_age))
}

/// Handle map listing requests.
///
/// # Endpoint
///
/// `GET /maps/`
///
/// # Response
///
/// `200 OK` with a JSON array of map names, e.g. `["osm","satellite"]`.
/// A listing failure is a `500 Internal Server Error`.
pub async fn maps_handler<S: TileStore>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<String>>, ResolveError> {
    let maps = state.resolver.list_maps().await?;
    Ok(Json(maps))
}

/// Handle map configuration requests.
///
/// # Endpoint
///
/// `GET /mapconfig/{mapname}/{configuration}`
///
/// # Response
///
/// - `200 OK`: configuration bytes with `Content-Type: application/json`
/// - `400 Bad Request`: malformed path or missing configuration object
/// - `500 Internal Server Error`: body-read failure
pub async fn config_handler<S: TileStore>(
    State(state): State<AppState<S>>,
    uri: Uri,
) -> Result<Response, ResolveError> {
    let (map, config) = parse_config_path(uri.path())?;

    let reader = state.resolver.map_config(&map, &config).await?;
    let data = read_object(reader).await?;

    Ok(bytes_response(data, "application/json", state.cache_max_age))
}

/// Handle health check requests.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response
///
/// `200 OK` with JSON body:
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0"
/// }
/// ```
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Fallback handler: echo the request path as plain text.
pub async fn path_echo_handler(uri: Uri) -> String {
    format!("url {}", uri.path())
}

/// Copy phase: read an opened object to the end.
///
/// A failure here happens after the store already committed to serving the
/// object, so it maps to a 500 rather than a 400.
async fn read_object<R: ObjectReader>(reader: R) -> Result<Bytes, ResolveError> {
    let key = reader.key().to_string();
    reader
        .read_to_end()
        .await
        .map_err(|source| ResolveError::Stream { key, source })
}

/// Build a success response around collected object bytes.
fn bytes_response(data: Bytes, content_type: &'static str, cache_max_age: u32) -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CACHE_CONTROL,
            format!("public, max-age={}", cache_max_age),
        )
        .body(axum::body::Body::from(data))
        .unwrap()
}

// =============================================================================
// Tests
// =============================================================================
