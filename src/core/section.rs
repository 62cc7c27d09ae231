//! Section and region kinds of a search-results page.

use serde::{Deserialize, Serialize};

/// A section of the results page in which exposure is counted.
///
/// Each kind owns an independent rank counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    /// Paid search placements (power links)
    PaidPlacement,
    /// Brand-sponsored content block
    BrandedContent,
    /// Sponsored entries inside the local listing
    LocalListingAd,
    /// Organic entries inside the local listing
    LocalListingOrganic,
    /// Aggregated popular-post cards
    PopularContent,
}

impl SectionKind {
    /// Every section kind, in page order.
    pub const ALL: [SectionKind; 5] = [
        SectionKind::PaidPlacement,
        SectionKind::BrandedContent,
        SectionKind::LocalListingAd,
        SectionKind::LocalListingOrganic,
        SectionKind::PopularContent,
    ];

    /// Label used in summaries and exported records
    pub fn label(&self) -> &'static str {
        match self {
            SectionKind::PaidPlacement => "파워링크",
            SectionKind::BrandedContent => "브랜드콘텐츠",
            SectionKind::LocalListingAd => "플레이스_광고",
            SectionKind::LocalListingOrganic => "플레이스_일반",
            SectionKind::PopularContent => "인기글",
        }
    }

    /// Stable machine-readable name
    pub fn name(&self) -> &'static str {
        match self {
            SectionKind::PaidPlacement => "paid_placement",
            SectionKind::BrandedContent => "branded_content",
            SectionKind::LocalListingAd => "local_listing_ad",
            SectionKind::LocalListingOrganic => "local_listing_organic",
            SectionKind::PopularContent => "popular_content",
        }
    }

    /// The region kind this section is found in
    pub fn region(&self) -> RegionKind {
        match self {
            SectionKind::PaidPlacement => RegionKind::PaidPlacement,
            SectionKind::BrandedContent => RegionKind::BrandedContent,
            SectionKind::LocalListingAd | SectionKind::LocalListingOrganic => {
                RegionKind::LocalListing
            }
            SectionKind::PopularContent => RegionKind::PopularContent,
        }
    }
}

impl std::fmt::Display for SectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A classified page region. The local listing holds both ad and organic
/// sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionKind {
    PaidPlacement,
    BrandedContent,
    LocalListing,
    PopularContent,
}

impl RegionKind {
    /// Every region kind, in classification priority order.
    pub const ALL: [RegionKind; 4] = [
        RegionKind::PaidPlacement,
        RegionKind::BrandedContent,
        RegionKind::LocalListing,
        RegionKind::PopularContent,
    ];

    /// Section kinds that can be produced from this region
    pub fn sections(&self) -> &'static [SectionKind] {
        match self {
            RegionKind::PaidPlacement => &[SectionKind::PaidPlacement],
            RegionKind::BrandedContent => &[SectionKind::BrandedContent],
            RegionKind::LocalListing => {
                &[SectionKind::LocalListingAd, SectionKind::LocalListingOrganic]
            }
            RegionKind::PopularContent => &[SectionKind::PopularContent],
        }
    }
}

impl std::fmt::Display for RegionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegionKind::PaidPlacement => write!(f, "Paid placement"),
            RegionKind::BrandedContent => write!(f, "Branded content"),
            RegionKind::LocalListing => write!(f, "Local listing"),
            RegionKind::PopularContent => write!(f, "Popular content"),
        }
    }
}
