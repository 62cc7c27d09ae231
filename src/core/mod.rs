//! # Core Module
//!
//! The browser-agnostic exposure detection engine.
//!
//! ## Modules
//! - `page` - Page model: regions, cards, thumbnails, JSON snapshots
//! - `section` - Section and region kinds with their labels
//! - `keywords` - Target keyword set
//! - `classifier` - Finds the monitored regions on a page
//! - `exclusion` - Drops cards that must not count as exposure
//! - `matcher` - Text, logo and OCR evidence
//! - `hasher` - Perceptual hashes for logo comparison
//! - `templates` - Logo template library
//! - `ocr` - Text recognition backends
//! - `cache` - Memoizes thumbnail hashes
//! - `rank` - Per-section rank counters
//! - `report` - Exposure reports, summaries and export
//! - `pipeline` - Orchestrates the full evaluation

pub mod cache;
pub mod classifier;
pub mod exclusion;
pub mod hasher;
pub mod keywords;
pub mod matcher;
pub mod ocr;
pub mod page;
pub mod pipeline;
pub mod rank;
pub mod report;
pub mod section;
pub mod templates;

// Re-export commonly used types
pub use matcher::{FallbackStrategy, MatchEvidence};
pub use page::{Card, CardFlag, PageModel, Region, RegionMarkers, StaticPage};
pub use pipeline::{EngineBuilder, ExposureEngine};
pub use report::{ExposureReport, RankedMatch};
pub use section::{RegionKind, SectionKind};
