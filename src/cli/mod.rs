//! # CLI Module
//!
//! Command-line interface for the exposure engine.
//!
//! ## Usage
//! ```bash
//! # Evaluate saved result pages
//! exposure-scan evaluate pages/*.json
//!
//! # With an explicit config and the OCR fallback
//! exposure-scan evaluate pages/*.json --config monitor.json --fallback ocr
//!
//! # Flat records for a spreadsheet
//! exposure-scan evaluate pages/*.json --output csv > exposure.csv
//!
//! # Inspect the logo template library
//! exposure-scan templates ./templates
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use keyword_exposure_monitor::config::MonitorConfig;
use keyword_exposure_monitor::core::hasher::{PerceptualHash, PerceptualHasher};
use keyword_exposure_monitor::core::matcher::FallbackStrategy;
use keyword_exposure_monitor::core::page::{LoadedPage, PageSnapshot, ThumbnailClient};
use keyword_exposure_monitor::core::pipeline::ExposureEngine;
use keyword_exposure_monitor::core::report::{write_records, ExportFormat, ExposureReport};
use keyword_exposure_monitor::core::templates::TemplateLibrary;
use keyword_exposure_monitor::error::Result;
use keyword_exposure_monitor::events::{BatchEvent, CardEvent, Event, EventChannel};
use std::path::PathBuf;
use std::thread;
use tracing::warn;

/// Pending events before batch workers wait on the progress thread
const EVENT_BUFFER: usize = 256;

/// Keyword Exposure Monitor - Where does the brand show up?
#[derive(Parser, Debug)]
#[command(name = "exposure-scan")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate page snapshots for brand exposure
    Evaluate {
        /// Page snapshot JSON files
        #[arg(required = true)]
        snapshots: Vec<PathBuf>,

        /// Configuration file (defaults to the user config dir)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the configured fallback strategy
        #[arg(short, long)]
        fallback: Option<Fallback>,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,

        /// Show card snippets
        #[arg(short, long)]
        verbose: bool,
    },
    /// List the logo templates loaded from a directory
    Templates {
        /// Template directory
        dir: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Fallback {
    /// Compare thumbnails with logo templates (default)
    Logo,
    /// Recognize text on thumbnails
    Ocr,
    /// Text evidence only
    None,
}

impl From<Fallback> for FallbackStrategy {
    fn from(fallback: Fallback) -> Self {
        match fallback {
            Fallback::Logo => FallbackStrategy::Logo,
            Fallback::Ocr => FallbackStrategy::Ocr,
            Fallback::None => FallbackStrategy::None,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// One JSON record per match
    Json,
    /// CSV records
    Csv,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Evaluate {
            snapshots,
            config,
            fallback,
            output,
            verbose,
        } => run_evaluate(snapshots, config, fallback, output, verbose),
        Commands::Templates { dir } => run_templates(dir),
    }
}

fn run_evaluate(
    snapshots: Vec<PathBuf>,
    config_path: Option<PathBuf>,
    fallback: Option<Fallback>,
    output: OutputFormat,
    verbose: bool,
) -> Result<()> {
    let term = Term::stderr();

    if matches!(output, OutputFormat::Pretty) {
        term.write_line(&format!(
            "{} {}",
            style("Keyword Exposure Monitor").bold().cyan(),
            style(format!("v{}", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        term.write_line("").ok();
    }

    let mut config = MonitorConfig::load_or_default(config_path.as_deref())?;
    if let Some(fallback) = fallback {
        config.fallback = fallback.into();
    }

    let engine = ExposureEngine::from_config(&config)?;
    let client = ThumbnailClient::new(config.thumbnail_options())?;

    let mut jobs: Vec<(String, LoadedPage)> = Vec::with_capacity(snapshots.len());
    for path in &snapshots {
        let page = PageSnapshot::load(path, &client)?;
        jobs.push((page.query().to_string(), page));
    }

    let (sender, receiver) = EventChannel::bounded(EVENT_BUFFER);

    let progress = if matches!(output, OutputFormat::Pretty) {
        let pb = ProgressBar::new(jobs.len() as u64);
        if let Ok(bar_style) =
            ProgressStyle::default_bar().template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(bar_style.progress_chars("█▓░"));
        }
        Some(pb)
    } else {
        None
    };

    let progress_clone = progress.clone();

    let event_thread = thread::spawn(move || {
        let mut failed_cards = 0usize;
        for event in receiver.iter() {
            match event {
                Event::Batch(BatchEvent::Progress(p)) => {
                    if let Some(ref pb) = progress_clone {
                        pb.set_position(p.completed as u64);
                        pb.set_message(p.keyword);
                    }
                }
                Event::Card(CardEvent::EvidenceFailed { .. }) => failed_cards += 1,
                Event::Batch(BatchEvent::Completed { .. }) => {
                    if let Some(ref pb) = progress_clone {
                        pb.finish_and_clear();
                    }
                }
                _ => {}
            }
        }
        failed_cards
    });

    let reports = engine.evaluate_batch(&jobs, &sender);

    drop(sender);
    let failed_cards = event_thread.join().unwrap_or(0);

    match output {
        OutputFormat::Pretty => print_pretty_results(&term, &reports, failed_cards, verbose),
        OutputFormat::Json | OutputFormat::Csv => {
            let format = if matches!(output, OutputFormat::Json) {
                ExportFormat::JsonLines
            } else {
                ExportFormat::Csv
            };
            let records: Vec<_> = reports.iter().flat_map(ExposureReport::records).collect();
            if let Err(e) = write_records(format, &records, std::io::stdout().lock()) {
                warn!(error = %e, ?format, "failed to write exposure records");
            }
        }
    }

    Ok(())
}

fn print_pretty_results(term: &Term, reports: &[ExposureReport], failed_cards: usize, verbose: bool) {
    term.write_line(&format!("{} Evaluation Complete", style("✓").green().bold()))
        .ok();
    term.write_line("").ok();

    term.write_line(&format!("  {} pages evaluated", style(reports.len()).cyan()))
        .ok();
    let total_matches: usize = reports.iter().map(|r| r.matches().len()).sum();
    term.write_line(&format!("  {} exposures found", style(total_matches).cyan()))
        .ok();
    if failed_cards > 0 {
        term.write_line(&format!(
            "  {} thumbnails could not be examined",
            style(failed_cards).yellow()
        ))
        .ok();
    }
    term.write_line("").ok();

    for report in reports {
        term.write_line(&format!("{}", style(report.keyword()).bold().underlined()))
            .ok();

        for hit in report.matches() {
            term.write_line(&format!(
                "  {} {} {}: {}",
                style(hit.section.label()).cyan(),
                style(format!("#{}", hit.rank)).bold(),
                style(hit.evidence.kind()).yellow(),
                hit.evidence.detail()
            ))
            .ok();

            if let Some(url) = &hit.url {
                term.write_line(&format!("      {}", style(url).dim())).ok();
            }
            if verbose {
                term.write_line(&format!("      {}", style(&hit.snippet).dim()))
                    .ok();
            }
        }

        if report.matches().is_empty() {
            term.write_line(&format!("  {}", style("No exposure found").dim()))
                .ok();
        }

        term.write_line(&format!("  {}", report.summary())).ok();
        term.write_line("").ok();
    }
}

fn run_templates(dir: PathBuf) -> Result<()> {
    let term = Term::stdout();
    let library = TemplateLibrary::load_dir(&dir, &PerceptualHasher::default())?;

    term.write_line(&format!(
        "{} templates in {}",
        style(library.len()).cyan(),
        dir.display()
    ))
    .ok();

    for template in library.templates() {
        term.write_line(&format!(
            "  {}  {}",
            style(template.hash().to_hex()).dim(),
            template.name()
        ))
        .ok();
    }

    Ok(())
}
