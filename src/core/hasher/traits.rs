//! Hash value type and the hashing seam used by template loading and
//! thumbnail matching.

use super::fast_decode::FastDecoder;
use crate::error::HashError;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Fixed-width fingerprint compared by Hamming distance
pub trait PerceptualHash: Clone + Send + Sync {
    /// Number of differing bits between `self` and `other`
    fn distance(&self, other: &Self) -> u32;

    fn as_bytes(&self) -> &[u8];

    /// Lowercase hex, two digits per byte
    fn to_hex(&self) -> String {
        self.as_bytes().iter().map(|b| format!("{b:02x}")).collect()
    }

    fn bit_count(&self) -> u32 {
        (self.as_bytes().len() * 8) as u32
    }
}

/// Turns an image into an [`ImageHashValue`].
///
/// Templates and thumbnails must go through the same implementation, or
/// their distances mean nothing.
pub trait HashAlgorithm: Send + Sync {
    fn hash_image(&self, image: &DynamicImage) -> Result<ImageHashValue, HashError>;

    /// Decode `bytes` then hash. `source_id` only appears in errors.
    fn hash_bytes(&self, bytes: &[u8], source_id: &str) -> Result<ImageHashValue, HashError> {
        let decoded = FastDecoder::decode_bytes(bytes, source_id)?;
        self.hash_image(&decoded)
    }

    fn hash_file(&self, path: &Path) -> Result<ImageHashValue, HashError> {
        let decoded = FastDecoder::decode_file(path)?;
        self.hash_image(&decoded)
    }

    /// Stable identifier, also part of cache keys
    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageHashValue {
    bytes: Vec<u8>,
}

impl ImageHashValue {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Rebuild a value stored by the hash cache
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::new(bytes.to_vec())
    }
}

impl PerceptualHash for ImageHashValue {
    fn distance(&self, other: &Self) -> u32 {
        // Bytes past the shorter value count as fully different.
        let overlap: u32 = self
            .bytes
            .iter()
            .zip(&other.bytes)
            .map(|(a, b)| (a ^ b).count_ones())
            .sum();
        overlap + self.bytes.len().abs_diff(other.bytes.len()) as u32 * 8
    }

    fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}
