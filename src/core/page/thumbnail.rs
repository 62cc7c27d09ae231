//! Thumbnail handles attached to cards.
//!
//! A thumbnail is opaque to the engine: it can be fetched as bytes and
//! decoded into pixels. Fetching may touch the network, so every failure is
//! reported as an error for the caller to absorb.

use crate::core::hasher::FastDecoder;
use crate::error::{ExposureError, ThumbnailError};
use image::DynamicImage;
use std::fmt;
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;
use xxhash_rust::xxh3::xxh3_64;

/// Default cap on a remote thumbnail body
pub const DEFAULT_MAX_THUMBNAIL_BYTES: u64 = 5 * 1024 * 1024;

/// Image attached to a card
pub trait Thumbnail: Send + Sync + fmt::Debug {
    /// Stable identifier (path or URL) used for caching and logging
    fn source(&self) -> &str;

    /// Read the encoded image bytes
    fn fetch(&self) -> Result<Vec<u8>, ThumbnailError>;

    /// Key under which this thumbnail's hash is cached
    fn cache_key(&self) -> String {
        self.source().to_string()
    }

    /// Fetch, rejecting an empty body
    fn read(&self) -> Result<Vec<u8>, ThumbnailError> {
        let bytes = self.fetch()?;
        if bytes.is_empty() {
            return Err(ThumbnailError::Empty {
                source_id: self.source().to_string(),
            });
        }
        Ok(bytes)
    }

    /// Read and decode the image pixels
    fn decode(&self) -> Result<DynamicImage, ExposureError> {
        let bytes = self.read()?;
        Ok(FastDecoder::decode_bytes(&bytes, self.source())?)
    }
}

/// Thumbnail stored on disk
#[derive(Debug, Clone)]
pub struct FileThumbnail {
    path: PathBuf,
    source: String,
}

impl FileThumbnail {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let source = path.display().to_string();
        Self { path, source }
    }
}

impl Thumbnail for FileThumbnail {
    fn source(&self) -> &str {
        &self.source
    }

    fn fetch(&self) -> Result<Vec<u8>, ThumbnailError> {
        std::fs::read(&self.path).map_err(|e| ThumbnailError::Io {
            source_id: self.source.clone(),
            source: e,
        })
    }
}

/// Thumbnail already held in memory (e.g. an element screenshot)
#[derive(Clone)]
pub struct MemoryThumbnail {
    source: String,
    bytes: Vec<u8>,
}

impl MemoryThumbnail {
    pub fn new(source: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            source: source.into(),
            bytes,
        }
    }
}

impl fmt::Debug for MemoryThumbnail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryThumbnail")
            .field("source", &self.source)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl Thumbnail for MemoryThumbnail {
    fn source(&self) -> &str {
        &self.source
    }

    fn fetch(&self) -> Result<Vec<u8>, ThumbnailError> {
        Ok(self.bytes.clone())
    }

    /// Screenshots often share a generic source label, so the key also
    /// carries a digest of the bytes.
    fn cache_key(&self) -> String {
        format!("{}#{:016x}", self.source, xxh3_64(&self.bytes))
    }
}

/// Limits applied when fetching remote thumbnails
#[derive(Debug, Clone, Copy)]
pub struct ThumbnailOptions {
    pub connect_timeout: Duration,
    pub timeout: Duration,
    /// Bodies larger than this are rejected before decoding
    pub max_bytes: u64,
}

impl Default for ThumbnailOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(3),
            timeout: Duration::from_secs(5),
            max_bytes: DEFAULT_MAX_THUMBNAIL_BYTES,
        }
    }
}

/// Shared HTTP client for remote thumbnails
#[derive(Debug, Clone)]
pub struct ThumbnailClient {
    http: reqwest::blocking::Client,
    max_bytes: u64,
}

impl ThumbnailClient {
    pub fn new(options: ThumbnailOptions) -> Result<Self, ThumbnailError> {
        let http = reqwest::blocking::Client::builder()
            .connect_timeout(options.connect_timeout)
            .timeout(options.timeout)
            .build()
            .map_err(|e| ThumbnailError::Fetch {
                url: String::new(),
                reason: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            http,
            max_bytes: options.max_bytes,
        })
    }

    /// A thumbnail at `url` fetched through this client
    pub fn remote(&self, url: impl Into<String>) -> RemoteThumbnail {
        RemoteThumbnail {
            url: url.into(),
            client: self.clone(),
        }
    }
}

/// Thumbnail referenced by URL, fetched over HTTP on demand
#[derive(Debug, Clone)]
pub struct RemoteThumbnail {
    url: String,
    client: ThumbnailClient,
}

impl Thumbnail for RemoteThumbnail {
    fn source(&self) -> &str {
        &self.url
    }

    fn fetch(&self) -> Result<Vec<u8>, ThumbnailError> {
        let fetch_error = |reason: String| ThumbnailError::Fetch {
            url: self.url.clone(),
            reason,
        };

        let response = self
            .client
            .http
            .get(&self.url)
            .send()
            .map_err(|e| fetch_error(e.to_string()))?
            .error_for_status()
            .map_err(|e| fetch_error(e.to_string()))?;

        let limit = self.client.max_bytes;
        if response.content_length().is_some_and(|len| len > limit) {
            return Err(ThumbnailError::TooLarge {
                source_id: self.url.clone(),
                limit,
            });
        }

        read_capped(response, limit, &self.url)
    }
}

/// Read at most `limit` bytes; a longer body is an error, not a truncation
fn read_capped<R: Read>(reader: R, limit: u64, source_id: &str) -> Result<Vec<u8>, ThumbnailError> {
    let mut bytes = Vec::new();
    reader
        .take(limit.saturating_add(1))
        .read_to_end(&mut bytes)
        .map_err(|source| ThumbnailError::Io {
            source_id: source_id.to_string(),
            source,
        })?;

    if bytes.len() as u64 > limit {
        return Err(ThumbnailError::TooLarge {
            source_id: source_id.to_string(),
            limit,
        });
    }
    Ok(bytes)
}
