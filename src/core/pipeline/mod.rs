//! # Pipeline Module
//!
//! Orchestrates the evaluation of one results page.
//!
//! ## Pipeline Stages
//! 1. **Classify** - Find the monitored regions on the page
//! 2. **Exclude** - Drop brand-originated and Q&A cards from popular content
//! 3. **Match** - Text first, then the configured fallback on the thumbnail
//! 4. **Rank** - Stamp per-section ranks
//! 5. **Aggregate** - Build the report and its unexposed sections
//!
//! ## Parallelism
//! A single page is evaluated synchronously. Batches of independent pages
//! are spread across CPU cores with rayon, sharing one engine.

mod executor;

pub use executor::{EngineBuilder, ExposureEngine};
