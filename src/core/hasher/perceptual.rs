//! Perceptual Hash (pHash) implementation.
//!
//! pHash uses the Discrete Cosine Transform (DCT) to extract
//! frequency information from the image. This makes it robust to:
//! - Scaling
//! - Brightness/contrast changes
//! - Compression artifacts
//!
//! Logos are re-encoded and rescaled by the search page, so exact byte
//! comparison never works; pHash distances stay small across those changes.
//! We use the image_hasher crate's DCT preprocessing with a mean threshold,
//! which gives the classic 64-bit pHash at the default 8x8 size.

use super::traits::{HashAlgorithm, ImageHashValue};
use crate::error::HashError;
use image::DynamicImage;
use image_hasher::{HashAlg, HasherConfig as ImageHasherConfig};

/// Default hash edge length (8x8 = 64 bits)
pub const DEFAULT_HASH_SIZE: u32 = 8;

/// Perceptual Hash (pHash) implementation using DCT
pub struct PerceptualHasher {
    hasher: image_hasher::Hasher,
}

impl PerceptualHasher {
    /// Create a new pHash hasher
    pub fn new(hash_size: u32) -> Self {
        let hasher = ImageHasherConfig::new()
            .hash_size(hash_size, hash_size)
            .hash_alg(HashAlg::Mean)
            .preproc_dct()
            .to_hasher();

        Self { hasher }
    }
}

impl Default for PerceptualHasher {
    fn default() -> Self {
        Self::new(DEFAULT_HASH_SIZE)
    }
}

impl HashAlgorithm for PerceptualHasher {
    fn hash_image(&self, image: &DynamicImage) -> Result<ImageHashValue, HashError> {
        // The RGB conversion drops alpha so transparent logo backgrounds hash
        // the same as their flattened thumbnails.
        let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
        let hash = self.hasher.hash_image(&rgb);
        let bytes = hash.as_bytes().to_vec();
        if bytes.is_empty() {
            return Err(HashError::ComputationFailed(
                "pHash produced an empty hash".to_string(),
            ));
        }

        Ok(ImageHashValue::new(bytes))
    }

    fn name(&self) -> &'static str {
        "pHash"
    }
}
