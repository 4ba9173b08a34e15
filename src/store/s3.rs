//! S3-backed implementation of the tile store.
//!
//! Works against AWS S3 and S3-compatible services (MinIO, GCS interop mode)
//! via an optional custom endpoint with path-style addressing.

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;

use crate::error::StoreError;

use super::{ObjectReader, TileStore};

/// S3-backed implementation of `TileStore`.
///
/// The client is internally reference-counted; cloning the store is cheap and
/// one instance is safe to share across all request handlers.
#[derive(Clone)]
pub struct S3TileStore {
    client: Client,
    bucket: String,
}

impl S3TileStore {
    /// Create a new store over the given bucket.
    pub fn new(client: Client, bucket: String) -> Self {
        Self { client, bucket }
    }

    /// Get the bucket name.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

/// An opened S3 object. Holds the response body stream of a GetObject call.
pub struct S3ObjectReader {
    key: String,
    body: ByteStream,
}

#[async_trait]
impl ObjectReader for S3ObjectReader {
    async fn read_to_end(self) -> Result<Bytes, StoreError> {
        let data = self
            .body
            .collect()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?
            .into_bytes();
        Ok(data)
    }

    fn key(&self) -> &str {
        &self.key
    }
}

#[async_trait]
impl TileStore for S3TileStore {
    type Reader = S3ObjectReader;

    async fn open(&self, key: &str) -> Result<S3ObjectReader, StoreError> {
        let resp = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let location = format!("s3://{}/{}", self.bucket, key);

                // The typed error covers the common case; some S3-compatible
                // services only surface a bare 404, so fall back to the raw
                // status and the error string.
                let is_no_such_key = e
                    .as_service_error()
                    .map(|se| se.is_no_such_key())
                    .unwrap_or(false);
                if is_no_such_key {
                    return StoreError::NotFound(location);
                }

                let status_is_404 = e
                    .raw_response()
                    .map(|r| r.status().as_u16() == 404)
                    .unwrap_or(false);
                if status_is_404 {
                    return StoreError::NotFound(location);
                }

                let err_str = e.to_string();
                if err_str.contains("NoSuchKey") || err_str.contains("NotFound") {
                    return StoreError::NotFound(location);
                }

                StoreError::Storage(err_str)
            })?;

        Ok(S3ObjectReader {
            key: key.to_string(),
            body: resp.body,
        })
    }

    async fn list_prefixes(
        &self,
        delimiter: &str,
        prefix: &str,
    ) -> Result<Vec<String>, StoreError> {
        let mut prefixes = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .delimiter(delimiter);

            if !prefix.is_empty() {
                request = request.prefix(prefix);
            }
            if let Some(token) = continuation_token {
                request = request.continuation_token(token);
            }

            let result = request
                .send()
                .await
                .map_err(|e| StoreError::Storage(e.to_string()))?;

            for common in result.common_prefixes() {
                if let Some(p) = common.prefix() {
                    prefixes.push(p.to_string());
                }
            }

            if result.is_truncated() == Some(true) {
                continuation_token = result.next_continuation_token().map(|s| s.to_string());
            } else {
                break;
            }
        }

        Ok(prefixes)
    }
}

/// Create an S3 client with optional custom endpoint and region.
///
/// Use a custom endpoint for S3-compatible services:
/// ```ignore
/// let client = create_s3_client(Some("http://localhost:9000"), "us-east-1").await;
/// ```
///
/// For AWS S3, pass `None` to use the default endpoint:
/// ```ignore
/// let client = create_s3_client(None, "us-east-1").await;
/// ```
pub async fn create_s3_client(endpoint_url: Option<&str>, region: &str) -> Client {
    let region = aws_config::Region::new(region.to_string());
    let mut config_loader =
        aws_config::defaults(aws_config::BehaviorVersion::latest()).region(region);

    if let Some(endpoint) = endpoint_url {
        config_loader = config_loader.endpoint_url(endpoint);
    }

    let sdk_config = config_loader.load().await;

    // S3-compatible services usually require path-style addressing
    let s3_config = if endpoint_url.is_some() {
        aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(true)
            .build()
    } else {
        aws_sdk_s3::config::Builder::from(&sdk_config).build()
    };

    Client::from_conf(s3_config)
}
