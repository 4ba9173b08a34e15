//! The tile resolver: transform lookup and store access.
//!
//! `TileResolver` is the single entry point between the HTTP layer and the
//! object store. It performs at most two store lookups per tile request (the
//! optional transform rule, then the tile itself) and returns opened readers;
//! copying bytes out is the caller's phase so open failures and read failures
//! keep distinct error mappings.

use tracing::debug;

use crate::error::ResolveError;
use crate::store::{ObjectReader, TileStore};

use super::coord::{config_key, transform_key, validate_segment, TileCoordinate, TransformRule};

/// Delimiter separating key segments in the object store.
const KEY_DELIMITER: &str = "/";

/// Resolves tile, configuration and listing requests against an object store.
///
/// Holds no per-request state; one instance is constructed at startup and
/// shared by every handler for the lifetime of the process.
pub struct TileResolver<S> {
    store: S,
}

impl<S: TileStore> TileResolver<S> {
    /// Create a resolver over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Get the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Resolve a tile request to an opened store read.
    ///
    /// When `transform` names a rule, the rule is loaded and applied before
    /// the tile key is built, replacing level/col/row. The returned reader is
    /// positioned at the start of the tile bytes.
    pub async fn resolve_tile(
        &self,
        coord: TileCoordinate,
        transform: Option<&str>,
    ) -> Result<S::Reader, ResolveError> {
        validate_segment(&coord.map)?;
        validate_segment(&coord.style)?;

        let coord = match transform {
            Some(name) if !name.is_empty() => {
                let rule = self
                    .resolve_transform(&coord.map, &coord.style, name)
                    .await?;
                coord.transformed(&rule)
            }
            _ => coord,
        };

        let key = coord.storage_key();
        debug!(key = %key, "resolving tile");

        self.store
            .open(&key)
            .await
            .map_err(|source| ResolveError::ObjectUnavailable { key, source })
    }

    /// Load a transform rule by name.
    ///
    /// The style-scoped object `{map}/{style}/{name}.json` wins; the
    /// map-scoped `{map}/{name}.json` is only consulted when the first open
    /// fails. When both fail, the error names the last attempted key.
    pub async fn resolve_transform(
        &self,
        map: &str,
        style: &str,
        name: &str,
    ) -> Result<TransformRule, ResolveError> {
        validate_segment(name)?;

        let styled_key = transform_key(map, Some(style), name);
        let (reader, key) = match self.store.open(&styled_key).await {
            Ok(reader) => (reader, styled_key),
            Err(_) => {
                let fallback_key = transform_key(map, None, name);
                match self.store.open(&fallback_key).await {
                    Ok(reader) => (reader, fallback_key),
                    Err(err) => {
                        return Err(ResolveError::TransformUnavailable {
                            key: fallback_key,
                            reason: err.to_string(),
                        });
                    }
                }
            }
        };

        debug!(key = %key, "loading transform rule");

        let body = reader
            .read_to_end()
            .await
            .map_err(|source| ResolveError::Stream {
                key: key.clone(),
                source,
            })?;

        serde_json::from_slice(&body).map_err(|err| ResolveError::TransformInvalid {
            key,
            reason: err.to_string(),
        })
    }

    /// Open a read on a map configuration object.
    pub async fn map_config(&self, map: &str, config: &str) -> Result<S::Reader, ResolveError> {
        validate_segment(map)?;
        validate_segment(config)?;

        let key = config_key(map, config);
        debug!(key = %key, "resolving map config");

        self.store
            .open(&key)
            .await
            .map_err(|source| ResolveError::ObjectUnavailable { key, source })
    }

    /// Enumerate the map namespaces in the store.
    ///
    /// Lists the distinct top-level prefixes and strips the trailing
    /// delimiter from each. The sequence is fully materialized before the
    /// caller serializes it.
    pub async fn list_maps(&self) -> Result<Vec<String>, ResolveError> {
        let prefixes = self
            .store
            .list_prefixes(KEY_DELIMITER, "")
            .await
            .map_err(ResolveError::List)?;

        Ok(prefixes
            .into_iter()
            .map(|prefix| {
                let stripped = prefix.strip_suffix(KEY_DELIMITER).map(str::to_string);
                stripped.unwrap_or(prefix)
            })
            .collect())
    }
}

// =============================================================================
// Tests
// =============================================================================
