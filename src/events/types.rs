//! Event type definitions for evaluation progress reporting.

use crate::core::exclusion::ExclusionReason;
use crate::core::matcher::MatchEvidence;
use crate::core::section::{RegionKind, SectionKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// All events emitted by the exposure engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Single page evaluation events
    Evaluation(EvaluationEvent),
    /// Per-card decisions
    Card(CardEvent),
    /// Multi-page batch events
    Batch(BatchEvent),
}

/// Events during one keyword-page evaluation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EvaluationEvent {
    /// Evaluation has started
    Started { keyword: String, regions: usize },
    /// A region was identified as a monitored kind
    SectionClassified {
        region: RegionKind,
        region_index: usize,
        cards: usize,
    },
    /// Evaluation completed with its report
    Completed {
        keyword: String,
        matches: usize,
        unexposed: BTreeSet<SectionKind>,
    },
}

/// Position of a card on the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardPosition {
    pub section: SectionKind,
    /// Zero-based index within its region
    pub index: usize,
}

/// Decisions taken on individual cards
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CardEvent {
    /// Card was removed from consideration
    Excluded {
        position: CardPosition,
        reason: ExclusionReason,
    },
    /// Card exposes the brand
    Matched {
        position: CardPosition,
        rank: u32,
        evidence: MatchEvidence,
    },
    /// Fallback evidence could not be computed; treated as no evidence
    EvidenceFailed {
        position: CardPosition,
        thumbnail: String,
        message: String,
    },
}

/// Events while evaluating many pages in parallel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BatchEvent {
    /// Batch has started
    Started { total_pages: usize },
    /// One more page finished
    Progress(BatchProgress),
    /// Batch completed
    Completed { total_reports: usize },
}

/// Progress information during a batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchProgress {
    /// Pages evaluated so far
    pub completed: usize,
    /// Total number of pages
    pub total: usize,
    /// Keyword of the page just finished
    pub keyword: String,
}
