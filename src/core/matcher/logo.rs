//! Nearest-template perceptual-hash evidence over card thumbnails.
//!
//! ## Distance Bands
//! | Distance | Classification |
//! |----------|----------------|
//! | 0-5      | Same           |
//! | 6-14     | Similar        |
//! | 15+      | Different      |
//!
//! Only `Same` and `Similar` count as evidence. Re-encoding and scaling by
//! the results page move a logo's hash by a few bits, so exact equality is
//! too strict.

use super::{FallbackMatcher, FallbackStrategy, MatchEvidence};
use crate::core::cache::{CacheBackend, CacheEntry};
use crate::core::hasher::{HashAlgorithm, ImageHashValue, PerceptualHash, PerceptualHasher};
use crate::core::page::Thumbnail;
use crate::core::templates::TemplateLibrary;
use crate::error::{ConfigError, ExposureError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Classification of the nearest-template distance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogoClassification {
    Same,
    Similar,
    Different,
}

impl LogoClassification {
    /// Classify using the default distance bands
    pub fn from_distance(distance: u32) -> Self {
        LogoThresholds::default().classify(distance)
    }

    /// Check if this classification counts as exposure evidence
    pub fn is_match(&self) -> bool {
        matches!(self, LogoClassification::Same | LogoClassification::Similar)
    }
}

impl std::fmt::Display for LogoClassification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogoClassification::Same => write!(f, "same"),
            LogoClassification::Similar => write!(f, "similar"),
            LogoClassification::Different => write!(f, "different"),
        }
    }
}

/// Upper bounds (inclusive) of the `Same` and `Similar` distance bands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogoThresholds {
    pub same_max: u32,
    pub similar_max: u32,
}

impl LogoThresholds {
    pub fn classify(&self, distance: u32) -> LogoClassification {
        if distance <= self.same_max {
            LogoClassification::Same
        } else if distance <= self.similar_max {
            LogoClassification::Similar
        } else {
            LogoClassification::Different
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.same_max > self.similar_max || self.similar_max > 64 {
            return Err(ConfigError::InvalidThresholds {
                same_max: self.same_max,
                similar_max: self.similar_max,
            });
        }
        Ok(())
    }
}

impl Default for LogoThresholds {
    fn default() -> Self {
        Self {
            same_max: 5,
            similar_max: 14,
        }
    }
}

/// Result of comparing one thumbnail against the library
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoMatch {
    pub template: String,
    pub distance: u32,
    pub classification: LogoClassification,
}

/// Logo evidence via nearest perceptual-hash template
pub struct LogoMatcher {
    library: Arc<TemplateLibrary>,
    hasher: Box<dyn HashAlgorithm>,
    thresholds: LogoThresholds,
    cache: Option<Arc<dyn CacheBackend>>,
}

impl LogoMatcher {
    /// Create a matcher over a library built with `hasher`.
    ///
    /// Thumbnails are hashed with the same algorithm, so distances compare
    /// like with like.
    pub fn new(library: Arc<TemplateLibrary>, hasher: Box<dyn HashAlgorithm>) -> Self {
        Self {
            library,
            hasher,
            thresholds: LogoThresholds::default(),
            cache: None,
        }
    }

    /// Load templates from a directory with the default pHash hasher.
    ///
    /// Fails when the directory yields no template.
    pub fn from_dir(dir: &Path) -> Result<Self, ExposureError> {
        let hasher = PerceptualHasher::default();
        let library = TemplateLibrary::load_dir(dir, &hasher)?;
        Ok(Self::new(Arc::new(library), Box::new(hasher)))
    }

    pub fn with_thresholds(mut self, thresholds: LogoThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Memoize thumbnail hashes in `cache`
    pub fn with_cache(mut self, cache: Arc<dyn CacheBackend>) -> Self {
        self.cache = Some(cache);
        self
    }

    fn match_hash(&self, hash: &ImageHashValue) -> LogoMatch {
        let (template, distance) = self.library.nearest(hash);
        LogoMatch {
            template: template.name().to_string(),
            distance,
            classification: self.thresholds.classify(distance),
        }
    }

    fn thumbnail_hash(&self, thumbnail: &dyn Thumbnail) -> Result<ImageHashValue, ExposureError> {
        let key = thumbnail.cache_key();
        let algorithm = self.hasher.name();

        if let Some(cache) = &self.cache {
            match cache.get(&key, algorithm) {
                Ok(Some(entry)) => return Ok(ImageHashValue::from_bytes(&entry.hash)),
                Ok(None) => {}
                Err(e) => warn!(thumbnail = %key, error = %e, "hash cache lookup failed"),
            }
        }

        let bytes = thumbnail.read()?;
        let hash = self.hasher.hash_bytes(&bytes, thumbnail.source())?;

        if let Some(cache) = &self.cache {
            let entry = CacheEntry::new(key.as_str(), algorithm, hash.as_bytes().to_vec());
            if let Err(e) = cache.set(entry) {
                warn!(thumbnail = %key, error = %e, "hash cache store failed");
            }
        }

        Ok(hash)
    }
}

impl FallbackMatcher for LogoMatcher {
    fn strategy(&self) -> FallbackStrategy {
        FallbackStrategy::Logo
    }

    fn examine(&self, thumbnail: &dyn Thumbnail) -> Result<Option<MatchEvidence>, ExposureError> {
        let hash = self.thumbnail_hash(thumbnail)?;
        let result = self.match_hash(&hash);

        debug!(
            thumbnail = thumbnail.source(),
            template = %result.template,
            distance = result.distance,
            classification = %result.classification,
            "logo comparison"
        );

        if !result.classification.is_match() {
            return Ok(None);
        }

        Ok(Some(MatchEvidence::Logo {
            template: result.template,
            distance: result.distance,
            classification: result.classification,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cache::InMemoryCache;
    use crate::core::page::MemoryThumbnail;
    use crate::core::templates::LogoTemplate;
    use crate::error::HashError;
    use image::{DynamicImage, ImageBuffer, Luma};
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Hashes an image to the value of its top-left pixel, so tests pick
    /// exact distances.
    struct PixelHasher {
        calls: Arc<AtomicUsize>,
    }

    impl HashAlgorithm for PixelHasher {
        fn hash_image(&self, image: &DynamicImage) -> Result<ImageHashValue, HashError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ImageHashValue::new(vec![image.to_luma8().get_pixel(0, 0)[0]]))
        }

        fn name(&self) -> &'static str {
            "pixel"
        }
    }

    fn thumbnail(value: u8) -> MemoryThumbnail {
        let img = DynamicImage::ImageLuma8(ImageBuffer::from_pixel(4, 4, Luma([value])));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        MemoryThumbnail::new(format!("mem://{}", value), bytes)
    }

    fn matcher(calls: Arc<AtomicUsize>) -> LogoMatcher {
        let library = TemplateLibrary::from_templates(
            vec![LogoTemplate::new("logo_v1", ImageHashValue::new(vec![0x00]))],
            Path::new("/templates"),
        )
        .unwrap();
        LogoMatcher::new(Arc::new(library), Box::new(PixelHasher { calls }))
    }

    #[test]
    fn classification_boundaries() {
        assert_eq!(LogoClassification::from_distance(0), LogoClassification::Same);
        assert_eq!(LogoClassification::from_distance(5), LogoClassification::Same);
        assert_eq!(LogoClassification::from_distance(6), LogoClassification::Similar);
        assert_eq!(LogoClassification::from_distance(14), LogoClassification::Similar);
        assert_eq!(LogoClassification::from_distance(15), LogoClassification::Different);
    }

    #[test]
    fn only_same_and_similar_are_matches() {
        assert!(LogoClassification::Same.is_match());
        assert!(LogoClassification::Similar.is_match());
        assert!(!LogoClassification::Different.is_match());
    }

    #[test]
    fn thresholds_are_validated() {
        assert!(LogoThresholds::default().validate().is_ok());
        assert!(LogoThresholds { same_max: 10, similar_max: 5 }.validate().is_err());
        assert!(LogoThresholds { same_max: 5, similar_max: 65 }.validate().is_err());
    }

    #[test]
    fn close_thumbnail_yields_logo_evidence() {
        let matcher = matcher(Arc::new(AtomicUsize::new(0)));

        // 0b0000_1111 is 4 bits away from the 0x00 template
        let evidence = matcher.examine(&thumbnail(0b0000_1111)).unwrap();

        assert_eq!(
            evidence,
            Some(MatchEvidence::Logo {
                template: "logo_v1".to_string(),
                distance: 4,
                classification: LogoClassification::Same,
            })
        );
    }

    #[test]
    fn distant_thumbnail_yields_nothing() {
        let matcher = matcher(Arc::new(AtomicUsize::new(0)));

        assert_eq!(
            matcher.examine(&thumbnail(0xFF)).unwrap(),
            Some(MatchEvidence::Logo {
                template: "logo_v1".to_string(),
                distance: 8,
                classification: LogoClassification::Similar,
            })
        );

        let strict = matcher.with_thresholds(LogoThresholds { same_max: 2, similar_max: 6 });
        assert_eq!(strict.examine(&thumbnail(0xFF)).unwrap(), None);
    }

    #[test]
    fn undecodable_thumbnail_is_a_hash_error() {
        let matcher = matcher(Arc::new(AtomicUsize::new(0)));
        let broken = MemoryThumbnail::new("mem://broken", b"nope".to_vec());

        let err = matcher.examine(&broken).unwrap_err();
        assert!(matches!(err, ExposureError::Hash(HashError::DecodeError { .. })));
    }

    #[test]
    fn cached_hash_skips_rehashing() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = Arc::new(InMemoryCache::new());
        let matcher = matcher(calls.clone()).with_cache(cache.clone());
        let thumb = thumbnail(0b0000_0011);

        matcher.examine(&thumb).unwrap();
        matcher.examine(&thumb).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.stats().unwrap().hits, 1);
    }

    #[test]
    fn same_label_with_different_pixels_is_hashed_again() {
        let calls = Arc::new(AtomicUsize::new(0));
        let matcher = matcher(calls.clone()).with_cache(Arc::new(InMemoryCache::new()));
        let relabel = |value| {
            let original = thumbnail(value);
            MemoryThumbnail::new("screenshot", original.fetch().unwrap())
        };

        matcher.examine(&relabel(0x01)).unwrap();
        let second = matcher.examine(&relabel(0xFF)).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(matches!(second, Some(MatchEvidence::Logo { distance: 8, .. })));
    }
}
