//! # Classifier Module
//!
//! Maps the ordered regions of a page to the region kinds being monitored.
//!
//! At most one region is taken per kind and the first match in document
//! order wins. A missing kind is not an error; its sections simply have
//! nothing to rank.
//!
//! ## Matching
//! A region matches a rule when its trimmed header equals one of the
//! rule's header labels, or its id matches the rule's id pattern. When a
//! region matches several rules it is assigned to the first rule, in rule
//! order, whose kind is still unassigned.

use crate::core::exclusion::ExclusionRules;
use crate::core::page::{Region, RegionMarkers};
use crate::core::section::RegionKind;
use crate::error::ConfigError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Configured recognition rule for one region kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionRule {
    pub region: RegionKind,
    #[serde(default)]
    pub headers: Vec<String>,
    #[serde(default)]
    pub id_pattern: Option<String>,
}

impl SectionRule {
    pub fn new(region: RegionKind, headers: &[&str], id_pattern: Option<&str>) -> Self {
        Self {
            region,
            headers: headers.iter().map(|h| h.to_string()).collect(),
            id_pattern: id_pattern.map(str::to_string),
        }
    }
}

/// Ordered set of region recognition rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassifierRules {
    pub rules: Vec<SectionRule>,
}

impl Default for ClassifierRules {
    fn default() -> Self {
        Self {
            rules: vec![
                SectionRule::new(
                    RegionKind::PaidPlacement,
                    &["파워링크", "Sponsored"],
                    Some("^power_?link"),
                ),
                SectionRule::new(
                    RegionKind::BrandedContent,
                    &["브랜드 콘텐츠", "Branded Content"],
                    None,
                ),
                SectionRule::new(
                    RegionKind::LocalListing,
                    &["플레이스", "Places"],
                    Some("^place-app-root$"),
                ),
                SectionRule::new(RegionKind::PopularContent, &["인기글", "Popular Posts"], None),
            ],
        }
    }
}

#[derive(Debug, Clone)]
struct CompiledRule {
    region: RegionKind,
    headers: Vec<String>,
    id_pattern: Option<Regex>,
}

impl CompiledRule {
    fn matches(&self, markers: &RegionMarkers) -> bool {
        let header_hit = markers
            .header
            .as_deref()
            .map(str::trim)
            .is_some_and(|header| self.headers.iter().any(|label| label == header));

        let id_hit = match (&self.id_pattern, markers.id.as_deref()) {
            (Some(pattern), Some(id)) => pattern.is_match(id),
            _ => false,
        };

        header_hit || id_hit
    }
}

/// Regions of one page keyed by kind, each holding its document index
#[derive(Debug, Clone, Copy)]
pub struct ClassifiedPage<'a> {
    regions: [Option<(usize, &'a Region)>; 4],
}

impl<'a> ClassifiedPage<'a> {
    fn slot(kind: RegionKind) -> usize {
        match kind {
            RegionKind::PaidPlacement => 0,
            RegionKind::BrandedContent => 1,
            RegionKind::LocalListing => 2,
            RegionKind::PopularContent => 3,
        }
    }

    pub fn get(&self, kind: RegionKind) -> Option<&'a Region> {
        self.regions[Self::slot(kind)].map(|(_, region)| region)
    }

    pub fn contains(&self, kind: RegionKind) -> bool {
        self.get(kind).is_some()
    }

    /// Classified regions with their document index, in document order
    pub fn in_document_order(&self) -> Vec<(usize, RegionKind, &'a Region)> {
        let mut found: BTreeMap<usize, (RegionKind, &'a Region)> = BTreeMap::new();
        for kind in RegionKind::ALL {
            if let Some((index, region)) = self.regions[Self::slot(kind)] {
                found.insert(index, (kind, region));
            }
        }
        found
            .into_iter()
            .map(|(index, (kind, region))| (index, kind, region))
            .collect()
    }
}

/// Compiled classifier over [`ClassifierRules`]
#[derive(Debug, Clone)]
pub struct SectionClassifier {
    rules: Vec<CompiledRule>,
}

impl SectionClassifier {
    pub fn new(rules: &ClassifierRules) -> Result<Self, ConfigError> {
        let rules = rules
            .rules
            .iter()
            .map(|rule| {
                let id_pattern = rule
                    .id_pattern
                    .as_deref()
                    .map(|pattern| {
                        Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern {
                            pattern: pattern.to_string(),
                            reason: e.to_string(),
                        })
                    })
                    .transpose()?;

                Ok(CompiledRule {
                    region: rule.region,
                    headers: rule.headers.iter().map(|h| h.trim().to_string()).collect(),
                    id_pattern,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(Self { rules })
    }

    /// Find at most one region per kind, first in document order.
    ///
    /// Image-only regions are skipped before any rule is tried.
    pub fn classify<'a>(
        &self,
        regions: &'a [Region],
        exclusions: &ExclusionRules,
    ) -> ClassifiedPage<'a> {
        let mut page = ClassifiedPage {
            regions: [None; 4],
        };

        for (index, region) in regions.iter().enumerate() {
            if exclusions.is_image_region(&region.markers) {
                debug!(index, "skipping image-only region");
                continue;
            }

            let assigned = self.rules.iter().find(|rule| {
                page.regions[ClassifiedPage::slot(rule.region)].is_none()
                    && rule.matches(&region.markers)
            });

            if let Some(rule) = assigned {
                debug!(index, region = %rule.region, cards = region.cards.len(), "region classified");
                page.regions[ClassifiedPage::slot(rule.region)] = Some((index, region));
            }
        }

        page
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::page::Card;

    fn classifier() -> SectionClassifier {
        SectionClassifier::new(&ClassifierRules::default()).unwrap()
    }

    fn exclusions() -> ExclusionRules {
        ExclusionRules::standard().unwrap()
    }

    fn region(markers: RegionMarkers, text: &str) -> Region {
        Region::new(markers).with_card(Card::new(text))
    }

    #[test]
    fn regions_are_found_by_header_or_id() {
        let regions = vec![
            region(RegionMarkers::with_id("power_link_body"), "ad"),
            region(RegionMarkers::with_header("  인기글 "), "popular"),
            region(RegionMarkers::with_id("place-app-root"), "place"),
        ];

        let page = classifier().classify(&regions, &exclusions());

        assert_eq!(page.get(RegionKind::PaidPlacement).unwrap().cards[0].text(), "ad");
        assert_eq!(page.get(RegionKind::PopularContent).unwrap().cards[0].text(), "popular");
        assert_eq!(page.get(RegionKind::LocalListing).unwrap().cards[0].text(), "place");
        assert!(!page.contains(RegionKind::BrandedContent));
    }

    #[test]
    fn first_region_in_document_order_wins() {
        let regions = vec![
            region(RegionMarkers::with_header("인기글"), "first"),
            region(RegionMarkers::with_header("인기글"), "second"),
        ];

        let page = classifier().classify(&regions, &exclusions());

        assert_eq!(page.get(RegionKind::PopularContent).unwrap().cards[0].text(), "first");
    }

    #[test]
    fn image_regions_are_never_classified() {
        let regions = vec![
            region(
                RegionMarkers::with_header("인기글").attribute("data-meta-area", "image"),
                "images",
            ),
            region(RegionMarkers::with_header("인기글"), "posts"),
        ];

        let page = classifier().classify(&regions, &exclusions());

        assert_eq!(page.get(RegionKind::PopularContent).unwrap().cards[0].text(), "posts");
    }

    #[test]
    fn region_matching_two_rules_takes_first_unassigned() {
        // Header says popular, id says paid; the paid rule comes first.
        let both = || {
            RegionMarkers {
                id: Some("powerlink".to_string()),
                header: Some("인기글".to_string()),
                ..RegionMarkers::default()
            }
        };
        let regions = vec![region(both(), "one"), region(both(), "two")];

        let page = classifier().classify(&regions, &exclusions());

        assert_eq!(page.get(RegionKind::PaidPlacement).unwrap().cards[0].text(), "one");
        assert_eq!(page.get(RegionKind::PopularContent).unwrap().cards[0].text(), "two");
    }

    #[test]
    fn document_order_is_preserved() {
        let regions = vec![
            region(RegionMarkers::with_header("인기글"), "popular"),
            region(RegionMarkers::with_header("파워링크"), "paid"),
        ];

        let page = classifier().classify(&regions, &exclusions());
        let kinds: Vec<_> = page.in_document_order().into_iter().map(|(_, k, _)| k).collect();

        assert_eq!(kinds, vec![RegionKind::PopularContent, RegionKind::PaidPlacement]);
    }

    #[test]
    fn empty_page_classifies_nothing() {
        let page = classifier().classify(&[], &exclusions());
        assert!(RegionKind::ALL.iter().all(|kind| !page.contains(*kind)));
    }

    #[test]
    fn invalid_id_pattern_is_rejected() {
        let rules = ClassifierRules {
            rules: vec![SectionRule::new(RegionKind::PaidPlacement, &[], Some("(power"))],
        };
        assert!(SectionClassifier::new(&rules).is_err());
    }

    #[test]
    fn rules_deserialize_from_a_list() {
        let json = r#"[{"region": "popular_content", "headers": ["인기 글"]}]"#;
        let rules: ClassifierRules = serde_json::from_str(json).unwrap();
        assert_eq!(rules.rules[0].region, RegionKind::PopularContent);
        assert_eq!(rules.rules[0].id_pattern, None);
    }
}
