//! # Keyword Exposure Monitor
//!
//! Inspects a rendered search-results page and reports, section by section,
//! whether and where a brand is exposed.
//!
//! ## Architecture
//! The library is split into a core engine (browser-agnostic) and
//! presentation layers:
//! - `core` - Section classification, matching, ranking and reporting
//! - `config` - Engine configuration loaded from JSON
//! - `events` - Event-driven progress reporting
//! - `error` - Error taxonomy (fatal at startup, absorbed per card)

pub mod config;
pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use config::MonitorConfig;
pub use error::{ExposureError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point.
pub fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::debug!("global tracing subscriber already set");
    }
}
