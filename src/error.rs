use thiserror::Error;

/// Errors raised by the object store backend.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The requested object does not exist in the bucket
    #[error("object not found: {0}")]
    NotFound(String),

    /// Error from S3 or S3-compatible storage
    #[error("storage error: {0}")]
    Storage(String),

    /// Network or connection error while reading a body
    #[error("connection error: {0}")]
    Connection(String),
}

/// Errors that can occur while resolving a tile request.
///
/// Every request failure is one of these variants; the HTTP layer maps them to
/// status codes in a single place (`server::handlers`). Store failures keep the
/// attempted storage key so client-facing messages can name it.
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    /// The request path does not have the expected segment count
    #[error("incorrect url format, expected {expected}")]
    BadPath { expected: &'static str },

    /// A path or query segment is empty or a path-traversal token
    #[error("invalid path segment: {segment:?}")]
    InvalidSegment { segment: String },

    /// Neither the style-scoped nor the map-scoped transform object exists
    #[error("could not get transformation: {reason} for {key}")]
    TransformUnavailable { key: String, reason: String },

    /// The transform object exists but is not a valid rule document
    #[error("could not parse transformation {key}: {reason}")]
    TransformInvalid { key: String, reason: String },

    /// The tile or configuration object could not be opened
    #[error("could not get file from store: {source} for {key}")]
    ObjectUnavailable { key: String, source: StoreError },

    /// The object was opened but its body could not be read to the end
    #[error("could not read file: {source} for {key}")]
    Stream { key: String, source: StoreError },

    /// Listing the bucket's top-level prefixes failed
    #[error("could not list maps: {0}")]
    List(StoreError),
}
