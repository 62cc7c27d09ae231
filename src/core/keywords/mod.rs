//! # Keywords Module
//!
//! The target keyword set: brand strings whose presence in a card counts
//! as exposure. Matching is case-insensitive, so each keyword keeps both
//! its configured spelling (reported as evidence) and a lowered form.

use serde::{Deserialize, Serialize};

/// One target keyword
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyword {
    original: String,
    lowered: String,
}

impl Keyword {
    pub fn new(original: impl Into<String>) -> Self {
        let original = original.into();
        let lowered = original.to_lowercase();
        Self { original, lowered }
    }

    /// Spelling as configured
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Case-folded spelling used for matching
    pub fn lowered(&self) -> &str {
        &self.lowered
    }
}

/// Ordered set of target keywords, immutable for a run.
///
/// Duplicates are kept; blank entries are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordSet {
    keywords: Vec<Keyword>,
}

impl KeywordSet {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_string())
            .filter(|k| !k.is_empty())
            .map(Keyword::new)
            .collect();
        Self { keywords }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Keyword> {
        self.keywords.iter()
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}
