//! # Hasher Module
//!
//! Computes perceptual hashes for logo templates and card thumbnails.
//!
//! ## How It Works
//! 1. Decode the image (zune-jpeg for JPEG, image crate otherwise)
//! 2. Resize and convert to grayscale
//! 3. Take the DCT and keep the low-frequency block
//! 4. Compare hashes using Hamming distance
//!
//! ## Example
//! ```rust,ignore
//! use keyword_exposure_monitor::core::hasher::{HashAlgorithm, PerceptualHasher};
//!
//! let hasher = PerceptualHasher::default();
//! let hash = hasher.hash_file(&path)?;
//! ```

pub mod fast_decode;
mod perceptual;
mod traits;

pub use fast_decode::FastDecoder;
pub use perceptual::{PerceptualHasher, DEFAULT_HASH_SIZE};
pub use traits::{HashAlgorithm, ImageHashValue, PerceptualHash};
