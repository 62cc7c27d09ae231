//! # Rank Module
//!
//! Per-section rank counters for one page evaluation.
//!
//! ## Counting Rules
//! | Section               | Counter advances on                       |
//! |-----------------------|-------------------------------------------|
//! | PaidPlacement         | every paid-placement candidate            |
//! | LocalListingAd        | every sponsored listing card              |
//! | LocalListingOrganic   | every organic listing card                |
//! | BrandedContent        | every card                                |
//! | PopularContent        | every non-excluded card, or matches only  |
//!
//! Excluded cards and paid-region cards that are not candidates never
//! reach the assigner. Counters start at zero for every page.

use crate::core::section::SectionKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::num::NonZeroU32;

/// How popular-content ranks are counted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PopularRankMode {
    /// Rank is the card's position among non-excluded cards
    #[default]
    Position,
    /// Rank is the ordinal of the match among matches
    MatchSequence,
}

/// Rank counters for one page
#[derive(Debug, Clone)]
pub struct RankAssigner {
    popular_mode: PopularRankMode,
    counters: BTreeMap<SectionKind, u32>,
}

impl RankAssigner {
    pub fn new(popular_mode: PopularRankMode) -> Self {
        Self {
            popular_mode,
            counters: BTreeMap::new(),
        }
    }

    /// Record a ranked card and return its rank when it matched.
    pub fn record(&mut self, section: SectionKind, matched: bool) -> Option<NonZeroU32> {
        let advances = matched
            || section != SectionKind::PopularContent
            || self.popular_mode == PopularRankMode::Position;

        let counter = self.counters.entry(section).or_insert(0);
        if advances {
            *counter += 1;
        }

        if matched {
            NonZeroU32::new(*counter)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranks(assigner: &mut RankAssigner, section: SectionKind, matches: &[bool]) -> Vec<u32> {
        matches
            .iter()
            .filter_map(|&matched| assigner.record(section, matched))
            .map(NonZeroU32::get)
            .collect()
    }

    #[test]
    fn rank_is_position_for_counted_sections() {
        let mut assigner = RankAssigner::new(PopularRankMode::Position);
        assert_eq!(
            ranks(&mut assigner, SectionKind::PaidPlacement, &[false, true, false, true]),
            vec![2, 4]
        );
    }

    #[test]
    fn listing_sub_kinds_count_independently() {
        let mut assigner = RankAssigner::new(PopularRankMode::Position);

        assigner.record(SectionKind::LocalListingAd, false);
        assigner.record(SectionKind::LocalListingOrganic, false);
        assigner.record(SectionKind::LocalListingAd, false);

        let organic = assigner.record(SectionKind::LocalListingOrganic, true);
        let ad = assigner.record(SectionKind::LocalListingAd, true);

        assert_eq!(organic.map(NonZeroU32::get), Some(2));
        assert_eq!(ad.map(NonZeroU32::get), Some(3));
    }

    #[test]
    fn popular_match_sequence_counts_matches_only() {
        let mut by_position = RankAssigner::new(PopularRankMode::Position);
        let mut by_match = RankAssigner::new(PopularRankMode::MatchSequence);
        let pattern = [false, false, true, false, true];

        assert_eq!(ranks(&mut by_position, SectionKind::PopularContent, &pattern), vec![3, 5]);
        assert_eq!(ranks(&mut by_match, SectionKind::PopularContent, &pattern), vec![1, 2]);
    }

    #[test]
    fn match_sequence_only_affects_popular_content() {
        let mut assigner = RankAssigner::new(PopularRankMode::MatchSequence);
        assert_eq!(
            ranks(&mut assigner, SectionKind::BrandedContent, &[false, true]),
            vec![2]
        );
    }

    #[test]
    fn first_counted_match_is_rank_one_in_every_section() {
        for section in SectionKind::ALL {
            let mut assigner = RankAssigner::new(PopularRankMode::Position);
            assert_eq!(assigner.record(section, true).map(NonZeroU32::get), Some(1));
        }
    }
}
