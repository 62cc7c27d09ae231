//! # Report Module
//!
//! Per-keyword exposure reports and their flat, exportable form.
//!
//! A report lists every ranked match found on one page, the sections that
//! were present on it, and the sections in the expected universe where the
//! brand did not appear.

mod export;

pub use export::{export_csv, export_json_lines, write_records, ExportFormat};

use crate::core::matcher::MatchEvidence;
use crate::core::section::SectionKind;
use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::Display;
use std::num::NonZeroU32;
use uuid::Uuid;

/// Summary placeholder when every expected section shows the brand
pub const NONE_UNEXPOSED: &str = "없음";

/// Kind of content a matched card links to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Cafe,
    Blog,
    /// Any other destination, carrying the url itself
    Other(String),
}

impl ContentType {
    /// Derive the content type of a card link
    pub fn from_url(url: &str) -> Self {
        if url.contains("cafe.naver.com") {
            ContentType::Cafe
        } else if url.contains("blog.naver.com") {
            ContentType::Blog
        } else {
            ContentType::Other(url.to_string())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            ContentType::Cafe => "카페",
            ContentType::Blog => "블로그",
            ContentType::Other(url) => url,
        }
    }
}

/// One card judged to expose the brand, with its section rank
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedMatch {
    pub section: SectionKind,
    pub rank: NonZeroU32,
    pub evidence: MatchEvidence,
    pub url: Option<String>,
    pub content_type: Option<ContentType>,
    pub snippet: String,
}

impl RankedMatch {
    pub fn new(
        section: SectionKind,
        rank: NonZeroU32,
        evidence: MatchEvidence,
        url: Option<String>,
        snippet: String,
    ) -> Self {
        let content_type = url.as_deref().map(ContentType::from_url);
        Self {
            section,
            rank,
            evidence,
            url,
            content_type,
            snippet,
        }
    }
}

/// Result of evaluating one keyword against one page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExposureReport {
    id: Uuid,
    keyword: String,
    timestamp: DateTime<Utc>,
    matches: Vec<RankedMatch>,
    observed_sections: BTreeSet<SectionKind>,
    unexposed_sections: BTreeSet<SectionKind>,
}

impl ExposureReport {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Matches in document order
    pub fn matches(&self) -> &[RankedMatch] {
        &self.matches
    }

    /// Sections whose region was present on the page
    pub fn observed_sections(&self) -> &BTreeSet<SectionKind> {
        &self.observed_sections
    }

    pub fn unexposed_sections(&self) -> &BTreeSet<SectionKind> {
        &self.unexposed_sections
    }

    /// Summary line rendered in local time
    pub fn summary(&self) -> String {
        summary_line(
            &self.timestamp.with_timezone(&Local),
            &self.keyword,
            &self.unexposed_sections,
        )
    }

    /// Flatten into one record per match
    pub fn records(&self) -> Vec<ExposureRecord> {
        self.matches
            .iter()
            .map(|m| ExposureRecord {
                report_id: self.id.to_string(),
                keyword: self.keyword.clone(),
                timestamp: self.timestamp.to_rfc3339(),
                section: m.section.label().to_string(),
                rank: m.rank.get(),
                evidence_kind: m.evidence.kind().to_string(),
                evidence_detail: m.evidence.detail(),
                url: m.url.clone(),
                content_type: m.content_type.as_ref().map(|c| c.label().to_string()),
                snippet: m.snippet.clone(),
            })
            .collect()
    }
}

/// Flat, export-ready view of one match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExposureRecord {
    pub report_id: String,
    pub keyword: String,
    pub timestamp: String,
    pub section: String,
    pub rank: u32,
    pub evidence_kind: String,
    pub evidence_detail: String,
    pub url: Option<String>,
    pub content_type: Option<String>,
    pub snippet: String,
}

/// Expected sections with no match at all
pub fn unexposed_sections(
    expected: &BTreeSet<SectionKind>,
    matches: &[RankedMatch],
) -> BTreeSet<SectionKind> {
    expected
        .iter()
        .copied()
        .filter(|section| !matches.iter().any(|m| m.section == *section))
        .collect()
}

/// `MM-dd HH:mm | keyword | 미노출영역: labels`, labels sorted and
/// comma-joined, or [`NONE_UNEXPOSED`] when nothing is missing.
pub fn summary_line<Tz>(
    timestamp: &DateTime<Tz>,
    keyword: &str,
    unexposed: &BTreeSet<SectionKind>,
) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut labels: Vec<&str> = unexposed.iter().map(SectionKind::label).collect();
    labels.sort_unstable();

    let missing = if labels.is_empty() {
        NONE_UNEXPOSED.to_string()
    } else {
        labels.join(", ")
    };

    format!(
        "{} | {} | 미노출영역: {}",
        timestamp.format("%m-%d %H:%M"),
        keyword,
        missing
    )
}

/// Builds reports against a fixed expected universe of sections
#[derive(Debug, Clone)]
pub struct ExposureAggregator {
    expected: BTreeSet<SectionKind>,
}

impl ExposureAggregator {
    pub fn new(expected: impl IntoIterator<Item = SectionKind>) -> Self {
        Self {
            expected: expected.into_iter().collect(),
        }
    }

    pub fn aggregate(
        &self,
        keyword: &str,
        timestamp: DateTime<Utc>,
        matches: Vec<RankedMatch>,
        observed_sections: BTreeSet<SectionKind>,
    ) -> ExposureReport {
        let unexposed_sections = unexposed_sections(&self.expected, &matches);
        ExposureReport {
            id: Uuid::new_v4(),
            keyword: keyword.to_string(),
            timestamp,
            matches,
            observed_sections,
            unexposed_sections,
        }
    }
}

impl Default for ExposureAggregator {
    fn default() -> Self {
        Self::new(SectionKind::ALL)
    }
}
