//! Finished recordings and their local preview URLs
//!
//! A captured recording is an immutable byte blob. Before upload it can be
//! previewed through a `blob:` URL issued by the registry; every URL must be
//! revoked when its draft is discarded.

use super::encoding::Encoding;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

const BLOB_URL_PREFIX: &str = "blob:tacet/";

/// Immutable encoded audio produced by a capture session
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBlob {
    bytes: Arc<[u8]>,
    encoding: Encoding,
    duration_seconds: f64,
}

impl AudioBlob {
    pub fn new(bytes: Vec<u8>, encoding: Encoding, duration_seconds: f64) -> Self {
        Self {
            bytes: Arc::from(bytes),
            encoding,
            duration_seconds,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn mime_type(&self) -> &'static str {
        self.encoding.mime_type()
    }

    pub fn duration_seconds(&self) -> f64 {
        self.duration_seconds
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// A playable local reference to a blob
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobUrl(String);

impl BlobUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blob_url(url: &str) -> bool {
        url.starts_with(BLOB_URL_PREFIX)
    }

    /// Recover a URL previously issued by a registry
    pub fn parse(url: &str) -> Option<Self> {
        Self::is_blob_url(url).then(|| Self(url.to_string()))
    }
}

impl fmt::Display for BlobUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Issues and tracks local blob URLs
///
/// Cloning yields another handle to the same registry.
#[derive(Clone, Default)]
pub struct BlobRegistry {
    entries: Arc<Mutex<HashMap<String, AudioBlob>>>,
}

impl BlobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a blob and return a fresh URL for it
    pub fn create_url(&self, blob: AudioBlob) -> BlobUrl {
        let url = format!("{}{}", BLOB_URL_PREFIX, uuid::Uuid::new_v4());
        self.entries.lock().insert(url.clone(), blob);
        tracing::debug!("Created blob URL {}", url);
        BlobUrl(url)
    }

    pub fn resolve(&self, url: &str) -> Option<AudioBlob> {
        self.entries.lock().get(url).cloned()
    }

    /// Release a URL. Returns false if it was already revoked.
    pub fn revoke(&self, url: &BlobUrl) -> bool {
        let removed = self.entries.lock().remove(url.as_str()).is_some();
        if removed {
            tracing::debug!("Revoked blob URL {}", url);
        }
        removed
    }

    /// Number of URLs that have been created and not yet revoked
    pub fn live_count(&self) -> usize {
        self.entries.lock().len()
    }
}
