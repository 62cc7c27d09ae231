//! JSON page snapshots.
//!
//! A snapshot is a page model serialized by the crawler after render, so a
//! page can be evaluated (or re-evaluated) without a live browser session.
//!
//! ```json
//! {
//!   "query": "이혼 변호사",
//!   "regions": [
//!     { "header": "파워링크",
//!       "cards": [{ "text": "법무법인 YK", "flags": ["paid_link"] }] }
//!   ]
//! }
//! ```
//!
//! Thumbnails are file paths (relative to the snapshot) or `http(s)` URLs.

use super::{Card, CardFlag, FileThumbnail, PageModel, Region, RegionMarkers, ThumbnailClient};
use crate::error::PageError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Serialized form of one rendered page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSnapshot {
    /// Search query the page was loaded for
    pub query: String,
    #[serde(default)]
    pub regions: Vec<SnapshotRegion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotRegion {
    #[serde(flatten)]
    pub markers: RegionMarkers,
    #[serde(default)]
    pub cards: Vec<SnapshotCard>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotCard {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub flags: Vec<CardFlag>,
}

/// A snapshot resolved into a page model
#[derive(Debug, Clone)]
pub struct LoadedPage {
    query: String,
    regions: Vec<Region>,
}

impl LoadedPage {
    pub fn query(&self) -> &str {
        &self.query
    }
}

impl PageModel for LoadedPage {
    fn regions(&self) -> &[Region] {
        &self.regions
    }
}

impl PageSnapshot {
    /// Parse a snapshot from a JSON file
    pub fn read(path: &Path) -> Result<Self, PageError> {
        let raw = std::fs::read_to_string(path).map_err(|e| PageError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&raw).map_err(|e| PageError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Read a snapshot and resolve its thumbnails
    ///
    /// Relative thumbnail paths are resolved against the snapshot's directory.
    pub fn load(path: &Path, client: &ThumbnailClient) -> Result<LoadedPage, PageError> {
        let snapshot = Self::read(path)?;
        let base = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(snapshot.into_page(&base, client))
    }

    /// Convert into a page model
    pub fn into_page(self, base: &Path, client: &ThumbnailClient) -> LoadedPage {
        let regions = self
            .regions
            .into_iter()
            .map(|region| {
                let cards = region
                    .cards
                    .into_iter()
                    .map(|card| card.into_card(base, client));
                Region::new(region.markers).with_cards(cards)
            })
            .collect();

        LoadedPage {
            query: self.query,
            regions,
        }
    }
}

impl SnapshotCard {
    fn into_card(self, base: &Path, client: &ThumbnailClient) -> Card {
        let mut card = Card::new(self.text);
        if let Some(link) = self.link {
            card = card.with_link(link);
        }
        if let Some(thumbnail) = self.thumbnail {
            card = if thumbnail.starts_with("http://") || thumbnail.starts_with("https://") {
                card.with_thumbnail(Arc::new(client.remote(thumbnail)))
            } else {
                let path = PathBuf::from(&thumbnail);
                let path = if path.is_absolute() { path } else { base.join(path) };
                card.with_thumbnail(Arc::new(FileThumbnail::new(path)))
            };
        }
        for flag in self.flags {
            card = card.with_flag(flag);
        }
        card
    }
}
