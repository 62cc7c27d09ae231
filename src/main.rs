//! # exposure-scan CLI
//!
//! Command-line interface for the keyword exposure monitor.
//!
//! ## Usage
//! ```bash
//! exposure-scan evaluate pages/*.json --config monitor.json
//! RUST_LOG=keyword_exposure_monitor=debug exposure-scan evaluate page.json --output json
//! ```

mod cli;

use keyword_exposure_monitor::Result;

fn main() -> Result<()> {
    keyword_exposure_monitor::init_tracing();
    cli::run()
}
