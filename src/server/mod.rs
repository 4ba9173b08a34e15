//! Axum-based HTTP server layer.
//!
//! `handlers` contains the request handlers and the centralized error→status
//! mapping; `routes` assembles the router and its middleware.

mod handlers;
mod routes;

pub use handlers::{
    config_handler, health_handler, maps_handler, path_echo_handler, tile_handler, AppState,
    ErrorResponse, HealthResponse, TileQueryParams,
};
pub use routes::{create_router, RouterConfig};
