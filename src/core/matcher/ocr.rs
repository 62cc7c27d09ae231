//! Brand-token evidence from text recognized on thumbnails.

use super::{FallbackMatcher, FallbackStrategy, MatchEvidence};
use crate::core::ocr::TextRecognizer;
use crate::core::page::{snippet_of, Thumbnail};
use crate::error::{ConfigError, ExposureError};
use regex::Regex;
use tracing::debug;

/// Uppercases recognized text and strips characters outside an alphabet.
#[derive(Debug, Clone)]
pub struct OcrNormalizer {
    brand_token: String,
    strip: Regex,
}

impl OcrNormalizer {
    /// Build a normalizer for `brand_token` over a character-class body
    /// such as `A-Z`.
    pub fn new(brand_token: &str, alphabet: &str) -> Result<Self, ConfigError> {
        let pattern = format!("[^{}]", alphabet);
        let strip = Regex::new(&pattern).map_err(|e| ConfigError::InvalidPattern {
            pattern: pattern.clone(),
            reason: e.to_string(),
        })?;

        let brand_token = brand_token.to_uppercase();
        if brand_token.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "ocr.brand_token",
                reason: "must not be empty".to_string(),
            });
        }

        let normalizer = Self { brand_token, strip };
        if normalizer.normalize(&normalizer.brand_token) != normalizer.brand_token {
            return Err(ConfigError::InvalidValue {
                field: "ocr.brand_token",
                reason: format!(
                    "'{}' has characters outside the alphabet [{}]",
                    normalizer.brand_token, alphabet
                ),
            });
        }

        Ok(normalizer)
    }

    pub fn normalize(&self, text: &str) -> String {
        self.strip.replace_all(&text.to_uppercase(), "").into_owned()
    }

    pub fn contains_brand(&self, text: &str) -> bool {
        self.normalize(text).contains(&self.brand_token)
    }
}

/// OCR fallback over a [`TextRecognizer`] backend
pub struct OcrMatcher {
    recognizer: Box<dyn TextRecognizer>,
    normalizer: OcrNormalizer,
}

impl OcrMatcher {
    pub fn new(recognizer: Box<dyn TextRecognizer>, normalizer: OcrNormalizer) -> Self {
        Self {
            recognizer,
            normalizer,
        }
    }
}

impl FallbackMatcher for OcrMatcher {
    fn strategy(&self) -> FallbackStrategy {
        FallbackStrategy::Ocr
    }

    fn examine(&self, thumbnail: &dyn Thumbnail) -> Result<Option<MatchEvidence>, ExposureError> {
        let image = thumbnail.decode()?;
        let text = self.recognizer.recognize(&image)?;

        let snippet = snippet_of(&text);
        let exposed = self.normalizer.contains_brand(&text);
        debug!(
            thumbnail = thumbnail.source(),
            backend = self.recognizer.name(),
            recognized = %snippet,
            exposed,
            "ocr comparison"
        );

        Ok(exposed.then_some(MatchEvidence::Ocr { snippet }))
    }
}
