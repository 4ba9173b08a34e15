//! Test utilities for integration tests.
//!
//! Provides an in-memory `TileStore` with request tracking and failure
//! injection, so tests can assert not only on responses but also on which
//! store lookups a request did (or did not) trigger.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;

use maptile_streamer::error::StoreError;
use maptile_streamer::store::{ObjectReader, TileStore};

// =============================================================================
// Request Log
// =============================================================================

/// Shared record of every store call made through a `MockTileStore`.
///
/// Clone a handle out of the store before handing the store to the router;
/// the log stays readable after the store has been moved.
#[derive(Clone, Default)]
pub struct RequestLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl RequestLog {
    fn record(&self, entry: impl Into<String>) {
        self.entries.lock().unwrap().push(entry.into());
    }

    /// Total number of store calls (opens and listings).
    pub fn count(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    /// All recorded entries, in call order. Opens are recorded as the bare
    /// key; listings as `list:{prefix}`.
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }
}

// =============================================================================
// Mock Tile Store
// =============================================================================

/// An in-memory tile store with request tracking and failure injection.
pub struct MockTileStore {
    objects: HashMap<String, Bytes>,
    fail_open: Vec<String>,
    fail_read: Vec<String>,
    fail_list: bool,
    log: RequestLog,
}

impl MockTileStore {
    pub fn new() -> Self {
        Self {
            objects: HashMap::new(),
            fail_open: Vec::new(),
            fail_read: Vec::new(),
            fail_list: false,
            log: RequestLog::default(),
        }
    }

    /// Add an object under the given key.
    pub fn with_object(mut self, key: impl Into<String>, data: impl Into<Bytes>) -> Self {
        self.objects.insert(key.into(), data.into());
        self
    }

    /// Make opens of the given key fail with a storage error.
    pub fn with_open_failure(mut self, key: impl Into<String>) -> Self {
        self.fail_open.push(key.into());
        self
    }

    /// Make the given key open successfully but fail on the body read.
    pub fn with_read_failure(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.objects.entry(key.clone()).or_insert_with(Bytes::new);
        self.fail_read.push(key);
        self
    }

    /// Make prefix listings fail with a storage error.
    pub fn with_list_failure(mut self) -> Self {
        self.fail_list = true;
        self
    }

    /// Get a handle on the request log.
    pub fn request_log(&self) -> RequestLog {
        self.log.clone()
    }
}

impl Default for MockTileStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Reader over an in-memory object, optionally failing on read.
pub struct MockObjectReader {
    key: String,
    body: Bytes,
    fail_read: bool,
}

#[async_trait]
impl ObjectReader for MockObjectReader {
    async fn read_to_end(self) -> Result<Bytes, StoreError> {
        if self.fail_read {
            return Err(StoreError::Connection("simulated read failure".to_string()));
        }
        Ok(self.body)
    }

    fn key(&self) -> &str {
        &self.key
    }
}

#[async_trait]
impl TileStore for MockTileStore {
    type Reader = MockObjectReader;

    async fn open(&self, key: &str) -> Result<MockObjectReader, StoreError> {
        self.log.record(key);

        if self.fail_open.iter().any(|k| k == key) {
            return Err(StoreError::Storage("simulated open failure".to_string()));
        }

        match self.objects.get(key) {
            Some(body) => Ok(MockObjectReader {
                key: key.to_string(),
                body: body.clone(),
                fail_read: self.fail_read.iter().any(|k| k == key),
            }),
            None => Err(StoreError::NotFound(key.to_string())),
        }
    }

    async fn list_prefixes(
        &self,
        delimiter: &str,
        prefix: &str,
    ) -> Result<Vec<String>, StoreError> {
        self.log.record(format!("list:{}", prefix));

        if self.fail_list {
            return Err(StoreError::Storage("simulated list failure".to_string()));
        }

        // Group keys the way S3 does: distinct prefixes up to and including
        // the first delimiter past `prefix`, in lexicographic order.
        let mut prefixes: Vec<String> = Vec::new();
        for key in self.objects.keys() {
            if let Some(rest) = key.strip_prefix(prefix) {
                if let Some(idx) = rest.find(delimiter) {
                    let grouped = format!("{}{}", prefix, &rest[..idx + delimiter.len()]);
                    if !prefixes.contains(&grouped) {
                        prefixes.push(grouped);
                    }
                }
            }
        }
        prefixes.sort();

        Ok(prefixes)
    }
}
