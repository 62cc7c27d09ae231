//! # Config Module
//!
//! Engine configuration, read from a JSON file.
//!
//! Every field has a default, so an empty object `{}` is a valid
//! configuration. Target keywords and thresholds live here and are handed
//! to the engine at construction.
//!
//! ## Example
//! ```json
//! {
//!   "keywords": ["YK", "법무법인 YK"],
//!   "templates_dir": "templates",
//!   "fallback": "logo",
//!   "logo_thresholds": { "same_max": 5, "similar_max": 14 },
//!   "popular_rank_mode": "position"
//! }
//! ```

use crate::core::cache::InMemoryCache;
use crate::core::classifier::ClassifierRules;
use crate::core::exclusion::{
    DEFAULT_PAID_LINK_PATTERN, DEFAULT_QA_HOST_PATTERN, DEFAULT_SPONSORED_MARKER,
};
use crate::core::matcher::{FallbackStrategy, LogoThresholds};
use crate::core::ocr::TesseractConfig;
use crate::core::page::{ThumbnailOptions, DEFAULT_MAX_THUMBNAIL_BYTES};
use crate::core::rank::PopularRankMode;
use crate::core::section::SectionKind;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Directory name under the platform config dir
const APP_DIR: &str = "keyword-exposure-monitor";

/// OCR fallback settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSettings {
    /// Token that must appear in the normalized recognized text
    pub brand_token: String,
    /// Character-class body of the characters kept after normalization
    pub alphabet: String,
    /// Tesseract invocation (`binary`, `language`, `engine_mode`,
    /// `page_segmentation_mode`)
    #[serde(flatten)]
    pub tesseract: TesseractConfig,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            brand_token: "YK".to_string(),
            alphabet: "A-Z".to_string(),
            tesseract: TesseractConfig::default(),
        }
    }
}

/// Bounds of the thumbnail hash cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HashCacheSettings {
    pub max_entries: usize,
    /// Entries older than this are re-hashed; `None` keeps them for the run
    pub max_age_secs: Option<u64>,
}

impl Default for HashCacheSettings {
    fn default() -> Self {
        Self {
            max_entries: 4096,
            max_age_secs: None,
        }
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Target keyword set, matched case-insensitively
    pub keywords: Vec<String>,
    /// Directory holding logo template images
    pub templates_dir: PathBuf,
    /// Secondary evidence strategy
    pub fallback: FallbackStrategy,
    pub logo_thresholds: LogoThresholds,
    pub ocr: OcrSettings,
    /// Region recognition rules, in priority order
    pub classifier: ClassifierRules,
    pub qa_host_pattern: String,
    /// Links matching this are ad-redirector links
    pub paid_link_pattern: String,
    pub sponsored_marker: String,
    pub popular_rank_mode: PopularRankMode,
    /// Sections the brand is expected to appear in
    pub expected_sections: Vec<SectionKind>,
    /// Read timeout for remote thumbnails
    pub thumbnail_timeout_secs: u64,
    /// Largest remote thumbnail body accepted
    pub thumbnail_max_bytes: u64,
    pub hash_cache: HashCacheSettings,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            keywords: Vec::new(),
            templates_dir: PathBuf::from("templates"),
            fallback: FallbackStrategy::default(),
            logo_thresholds: LogoThresholds::default(),
            ocr: OcrSettings::default(),
            classifier: ClassifierRules::default(),
            qa_host_pattern: DEFAULT_QA_HOST_PATTERN.to_string(),
            paid_link_pattern: DEFAULT_PAID_LINK_PATTERN.to_string(),
            sponsored_marker: DEFAULT_SPONSORED_MARKER.to_string(),
            popular_rank_mode: PopularRankMode::default(),
            expected_sections: SectionKind::ALL.to_vec(),
            thumbnail_timeout_secs: 5,
            thumbnail_max_bytes: DEFAULT_MAX_THUMBNAIL_BYTES,
            hash_cache: HashCacheSettings::default(),
        }
    }
}

impl MonitorConfig {
    /// Read and validate a configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = serde_json::from_str(&raw).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        debug!(path = %path.display(), keywords = config.keywords.len(), "configuration loaded");
        Ok(config)
    }

    /// Load `path` when given, else the default location when it exists,
    /// else the built-in defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// `<config dir>/keyword-exposure-monitor/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.json"))
    }

    /// Check values that serde cannot.
    ///
    /// Patterns are compiled again when the engine is built; this only
    /// reports problems early with the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.logo_thresholds.validate()?;

        for pattern in [&self.qa_host_pattern, &self.paid_link_pattern] {
            regex::Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern {
                pattern: pattern.clone(),
                reason: e.to_string(),
            })?;
        }

        if self.ocr.brand_token.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "ocr.brand_token",
                reason: "must not be empty".to_string(),
            });
        }

        let positive = [
            ("thumbnail_timeout_secs", self.thumbnail_timeout_secs),
            ("thumbnail_max_bytes", self.thumbnail_max_bytes),
            ("hash_cache.max_entries", self.hash_cache.max_entries as u64),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: "must be at least 1".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Thumbnail fetch options derived from this configuration
    pub fn thumbnail_options(&self) -> ThumbnailOptions {
        ThumbnailOptions {
            timeout: Duration::from_secs(self.thumbnail_timeout_secs),
            max_bytes: self.thumbnail_max_bytes,
            ..ThumbnailOptions::default()
        }
    }

    /// Empty hash cache bounded by [`HashCacheSettings`]
    pub fn build_hash_cache(&self) -> InMemoryCache {
        let cache = InMemoryCache::new().with_max_entries(self.hash_cache.max_entries);
        match self.hash_cache.max_age_secs {
            Some(secs) => cache.with_max_age(Duration::from_secs(secs)),
            None => cache,
        }
    }
}
