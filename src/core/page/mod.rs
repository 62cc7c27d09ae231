//! # Page Module
//!
//! The page model consumed by the engine.
//!
//! A page is an ordered sequence of regions, each holding an ordered
//! sequence of cards. The engine never queries page structure itself;
//! whatever drives the browser builds these values and hands them over.
//!
//! ## Example
//! ```rust,ignore
//! let region = Region::new(RegionMarkers::with_header("파워링크"))
//!     .with_card(Card::new("법무법인 YK").with_flag(CardFlag::PaidLink));
//! let page = StaticPage::new(vec![region]);
//! ```

mod snapshot;
mod thumbnail;

pub use snapshot::{LoadedPage, PageSnapshot, SnapshotCard, SnapshotRegion};
pub use thumbnail::{
    FileThumbnail, MemoryThumbnail, RemoteThumbnail, Thumbnail, ThumbnailClient, ThumbnailOptions,
    DEFAULT_MAX_THUMBNAIL_BYTES,
};

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Maximum number of characters kept in a card snippet
pub const SNIPPET_MAX_CHARS: usize = 200;

/// Structural flags reported by the page model for a card
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardFlag {
    /// The card links through the ad-click redirector
    PaidLink,
    /// The card is rendered with the brand-content template
    BrandTemplate,
    /// The card carries an explicit "sponsored" marker
    Sponsored,
}

/// One candidate exposure unit
#[derive(Debug, Clone)]
pub struct Card {
    text: String,
    lowered_text: String,
    link: Option<String>,
    thumbnail: Option<Arc<dyn Thumbnail>>,
    flags: BTreeSet<CardFlag>,
}

impl Card {
    /// Create a card from its rendered text
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let lowered_text = text.to_lowercase();
        Self {
            text,
            lowered_text,
            link: None,
            thumbnail: None,
            flags: BTreeSet::new(),
        }
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn with_thumbnail(mut self, thumbnail: Arc<dyn Thumbnail>) -> Self {
        self.thumbnail = Some(thumbnail);
        self
    }

    pub fn with_flag(mut self, flag: CardFlag) -> Self {
        self.flags.insert(flag);
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Case-folded text used for keyword matching
    pub fn lowered_text(&self) -> &str {
        &self.lowered_text
    }

    pub fn link(&self) -> Option<&str> {
        self.link.as_deref()
    }

    pub fn thumbnail(&self) -> Option<&dyn Thumbnail> {
        self.thumbnail.as_deref()
    }

    pub fn has_flag(&self, flag: CardFlag) -> bool {
        self.flags.contains(&flag)
    }

    /// Single-line excerpt of the card text
    pub fn snippet(&self) -> String {
        snippet_of(&self.text)
    }
}

/// Collapse newlines and truncate to [`SNIPPET_MAX_CHARS`] characters
pub fn snippet_of(text: &str) -> String {
    text.replace('\n', " ").chars().take(SNIPPET_MAX_CHARS).collect()
}

/// Structural markers used to classify a region
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionMarkers {
    /// Element id of the region container
    #[serde(default)]
    pub id: Option<String>,
    /// Visible header label of the region
    #[serde(default)]
    pub header: Option<String>,
    /// Other attributes (e.g. `data-block-id`, `data-meta-area`)
    #[serde(flatten)]
    pub attributes: BTreeMap<String, String>,
}

impl RegionMarkers {
    pub fn with_header(header: impl Into<String>) -> Self {
        Self {
            header: Some(header.into()),
            ..Self::default()
        }
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// An ordered group of cards under one set of markers
#[derive(Debug, Clone, Default)]
pub struct Region {
    pub markers: RegionMarkers,
    pub cards: Vec<Card>,
}

impl Region {
    pub fn new(markers: RegionMarkers) -> Self {
        Self {
            markers,
            cards: Vec::new(),
        }
    }

    pub fn with_card(mut self, card: Card) -> Self {
        self.cards.push(card);
        self
    }

    pub fn with_cards(mut self, cards: impl IntoIterator<Item = Card>) -> Self {
        self.cards.extend(cards);
        self
    }
}

/// Source of the regions of one loaded page.
///
/// Implementations are transient and scoped to a single page load.
pub trait PageModel: Send + Sync {
    /// Regions in document order
    fn regions(&self) -> &[Region];
}

/// A page model over an in-memory list of regions
#[derive(Debug, Clone, Default)]
pub struct StaticPage {
    regions: Vec<Region>,
}

impl StaticPage {
    pub fn new(regions: Vec<Region>) -> Self {
        Self { regions }
    }
}

impl PageModel for StaticPage {
    fn regions(&self) -> &[Region] {
        &self.regions
    }
}
