//! Literal keyword evidence over card text.

use crate::core::keywords::{Keyword, KeywordSet};
use std::sync::Arc;

/// Case-insensitive substring matcher over the keyword set
#[derive(Debug, Clone)]
pub struct TextMatcher {
    keywords: Arc<KeywordSet>,
}

impl TextMatcher {
    pub fn new(keywords: Arc<KeywordSet>) -> Self {
        Self { keywords }
    }

    /// Keywords contained in `lowered_text`, in keyword-set order.
    ///
    /// No tokenization or whitespace normalization: a keyword matches when
    /// its lowered form appears verbatim.
    pub fn find<'a>(&'a self, lowered_text: &str) -> Vec<&'a Keyword> {
        self.keywords
            .iter()
            .filter(|kw| lowered_text.contains(kw.lowered()))
            .collect()
    }

    pub fn keywords(&self) -> &KeywordSet {
        &self.keywords
    }
}
