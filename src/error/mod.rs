//! # Error Module
//!
//! Error types for the exposure engine.
//!
//! ## Design Principles
//! - **Fatal only at startup** - missing templates or bad configuration
//! - **Per-card failures are absorbed** - thumbnail, hashing and OCR
//!   errors degrade a single card to "no evidence"
//! - **Include context** - paths, sources, what went wrong

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum ExposureError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    #[error("Thumbnail error: {0}")]
    Thumbnail(#[from] ThumbnailError),

    #[error("Hashing error: {0}")]
    Hash(#[from] HashError),

    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Page model error: {0}")]
    Page(#[from] PageError),
}

/// Errors raised while loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Invalid logo thresholds: same ≤ {same_max}, similar ≤ {similar_max} (need same ≤ similar ≤ 64)")]
    InvalidThresholds { same_max: u32, similar_max: u32 },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Errors that occur while loading the logo template library
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("No logo templates could be loaded from {path}. Add at least one .png/.jpg template.")]
    Empty { path: PathBuf },

    #[error("Template directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Failed to read template directory {path}: {reason}")]
    ReadDirectory { path: PathBuf, reason: String },
}

/// Errors that occur while reading a card thumbnail
#[derive(Error, Debug)]
pub enum ThumbnailError {
    #[error("Failed to read thumbnail {source_id}: {source}")]
    Io {
        source_id: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to fetch thumbnail {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("Thumbnail {source_id} is empty")]
    Empty { source_id: String },

    #[error("Thumbnail {source_id} exceeds {limit} bytes")]
    TooLarge { source_id: String, limit: u64 },
}

/// Errors that occur during image decoding and hashing
#[derive(Error, Debug)]
pub enum HashError {
    #[error("Failed to decode image {source_id}: {reason}")]
    DecodeError { source_id: String, reason: String },

    #[error("Failed to open image file {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Hash computation failed: {0}")]
    ComputationFailed(String),
}

/// Errors that occur with the hash cache
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache lock poisoned by a panicked thread")]
    Poisoned,
}

/// Errors raised by a text-recognition backend
#[derive(Error, Debug)]
pub enum OcrError {
    #[error("OCR backend not available: {0}")]
    BackendNotAvailable(String),

    #[error("OCR failed: {0}")]
    OcrFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while building a page model from a snapshot
#[derive(Error, Debug)]
pub enum PageError {
    #[error("Failed to read page snapshot {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse page snapshot {path}: {reason}")]
    Parse { path: PathBuf, reason: String },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, ExposureError>;
