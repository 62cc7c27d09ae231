//! # Matcher Module
//!
//! Evidence strategies that decide whether a card exposes the brand.
//!
//! ## Escalation
//! 1. **Text** - any target keyword is a substring of the card text
//! 2. **Fallback** (only when text finds nothing), one of:
//!    - **Logo** - nearest logo template by pHash Hamming distance
//!    - **OCR** - brand token in text recognized from the thumbnail
//!
//! Exactly one fallback strategy is active per engine; the two are never
//! layered.

mod logo;
mod ocr;
mod text;

pub use logo::{LogoClassification, LogoMatch, LogoMatcher, LogoThresholds};
pub use ocr::{OcrMatcher, OcrNormalizer};
pub use text::TextMatcher;

use crate::core::page::Thumbnail;
use crate::error::ExposureError;
use serde::{Deserialize, Serialize};

/// Basis on which a card was judged to expose the brand
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchEvidence {
    /// Keywords found in the card text, in keyword-set order
    Text { keywords: Vec<String> },
    /// Thumbnail close to a known logo template
    Logo {
        template: String,
        distance: u32,
        classification: LogoClassification,
    },
    /// Brand token found in recognized thumbnail text
    Ocr { snippet: String },
}

impl MatchEvidence {
    /// Evidence kind name used in flat records
    pub fn kind(&self) -> &'static str {
        match self {
            MatchEvidence::Text { .. } => "text",
            MatchEvidence::Logo { .. } => "logo",
            MatchEvidence::Ocr { .. } => "ocr",
        }
    }

    /// One-line human-readable evidence detail
    pub fn detail(&self) -> String {
        match self {
            MatchEvidence::Text { keywords } => keywords.join(", "),
            MatchEvidence::Logo {
                template,
                distance,
                classification,
            } => format!("{} (distance {}, {})", template, distance, classification),
            MatchEvidence::Ocr { snippet } => snippet.clone(),
        }
    }
}

/// Which secondary evidence strategy the engine runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackStrategy {
    /// Perceptual-hash comparison against logo templates
    #[default]
    Logo,
    /// Text recognition on the thumbnail
    Ocr,
    /// Text evidence only
    None,
}

impl std::fmt::Display for FallbackStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FallbackStrategy::Logo => write!(f, "logo"),
            FallbackStrategy::Ocr => write!(f, "ocr"),
            FallbackStrategy::None => write!(f, "none"),
        }
    }
}

/// Secondary evidence strategy run on thumbnails of cards without a text hit
pub trait FallbackMatcher: Send + Sync {
    /// The strategy this matcher implements
    fn strategy(&self) -> FallbackStrategy;

    /// Examine a thumbnail.
    ///
    /// `Ok(None)` means the thumbnail was read but shows no brand.
    fn examine(&self, thumbnail: &dyn Thumbnail) -> Result<Option<MatchEvidence>, ExposureError>;
}
