//! # Exclusion Module
//!
//! Rules that remove regions or cards from consideration before matching.
//!
//! ## Rules
//! - **Image regions**: `data-block-id` containing `image` or
//!   `data-meta-area` equal to `image`; never classified
//! - **Popular content**: brand-originated cards first, then Q&A-platform
//!   cards; the first rule that applies is the reason reported
//! - **Paid placement**: a card is a candidate unless it carries a link
//!   that is not an ad-redirector link; cards without link information
//!   are always candidates
//! - **Local listing**: not an exclusion; splits cards into ad and organic

use crate::core::page::{Card, CardFlag, RegionMarkers};
use crate::core::section::SectionKind;
use crate::error::ConfigError;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Default pattern for links into the Q&A platform
pub const DEFAULT_QA_HOST_PATTERN: &str = r"(^|[/.])kin\.naver\.com";

/// Default pattern for links through the ad-click redirector
pub const DEFAULT_PAID_LINK_PATTERN: &str = r"(^|[/.])ader\.naver\.com";

/// Default text marker of a sponsored listing
pub const DEFAULT_SPONSORED_MARKER: &str = "광고";

/// Why a card was removed from consideration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    /// Paid-link or brand-template card inside popular content
    BrandOrigin,
    /// Card linking into the Q&A platform
    QaPlatform,
}

impl std::fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExclusionReason::BrandOrigin => write!(f, "brand_origin"),
            ExclusionReason::QaPlatform => write!(f, "qa_platform"),
        }
    }
}

/// Compiled exclusion rules
#[derive(Debug, Clone)]
pub struct ExclusionRules {
    qa_host: Regex,
    paid_link: Regex,
    sponsored_marker: String,
}

fn compile(pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

impl ExclusionRules {
    pub fn new(
        qa_host_pattern: &str,
        paid_link_pattern: &str,
        sponsored_marker: &str,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            qa_host: compile(qa_host_pattern)?,
            paid_link: compile(paid_link_pattern)?,
            sponsored_marker: sponsored_marker.to_lowercase(),
        })
    }

    /// Rules with the default patterns and sponsored marker
    pub fn standard() -> Result<Self, ConfigError> {
        Self::new(
            DEFAULT_QA_HOST_PATTERN,
            DEFAULT_PAID_LINK_PATTERN,
            DEFAULT_SPONSORED_MARKER,
        )
    }

    fn is_paid_link(&self, card: &Card) -> bool {
        card.has_flag(CardFlag::PaidLink)
            || card.link().is_some_and(|link| self.paid_link.is_match(link))
    }

    /// Check if a card in the paid region takes part in ranking
    pub fn is_paid_candidate(&self, card: &Card) -> bool {
        card.link().is_none() || self.is_paid_link(card)
    }

    /// Check if a region only holds images and no content cards
    pub fn is_image_region(&self, markers: &RegionMarkers) -> bool {
        let block_image = markers
            .get("data-block-id")
            .is_some_and(|id| id.contains("image"));
        let area_image = markers.get("data-meta-area") == Some("image");
        block_image || area_image
    }

    /// Reason a popular-content card must be skipped, if any
    pub fn popular_exclusion(&self, card: &Card) -> Option<ExclusionReason> {
        if self.is_paid_link(card) || card.has_flag(CardFlag::BrandTemplate) {
            return Some(ExclusionReason::BrandOrigin);
        }

        if card.link().is_some_and(|link| self.qa_host.is_match(link)) {
            return Some(ExclusionReason::QaPlatform);
        }

        None
    }

    /// Sub-kind of a local-listing card
    pub fn listing_section(&self, card: &Card) -> SectionKind {
        let marked = !self.sponsored_marker.is_empty()
            && card.lowered_text().contains(&self.sponsored_marker);

        if card.has_flag(CardFlag::Sponsored) || marked {
            SectionKind::LocalListingAd
        } else {
            SectionKind::LocalListingOrganic
        }
    }
}
