//! Engine execution implementation.

use crate::config::MonitorConfig;
use crate::core::classifier::{ClassifierRules, SectionClassifier};
use crate::core::exclusion::ExclusionRules;
use crate::core::keywords::KeywordSet;
use crate::core::matcher::{
    FallbackMatcher, FallbackStrategy, LogoMatcher, MatchEvidence, OcrMatcher, OcrNormalizer,
    TextMatcher,
};
use crate::core::ocr::TesseractRecognizer;
use crate::core::page::{Card, PageModel};
use crate::core::rank::{PopularRankMode, RankAssigner};
use crate::core::report::{ExposureAggregator, ExposureReport, RankedMatch};
use crate::core::section::{RegionKind, SectionKind};
use crate::error::{ConfigError, ExposureError};
use crate::events::{
    null_sender, BatchEvent, BatchProgress, CardEvent, CardPosition, Event, EvaluationEvent,
    EventSender,
};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Builder for engine configuration
pub struct EngineBuilder {
    keywords: Vec<String>,
    classifier_rules: ClassifierRules,
    exclusions: Option<ExclusionRules>,
    fallback: Option<Box<dyn FallbackMatcher>>,
    popular_rank_mode: PopularRankMode,
    expected_sections: Vec<SectionKind>,
}

impl EngineBuilder {
    /// Create a new engine builder
    pub fn new() -> Self {
        Self {
            keywords: Vec::new(),
            classifier_rules: ClassifierRules::default(),
            exclusions: None,
            fallback: None,
            popular_rank_mode: PopularRankMode::default(),
            expected_sections: SectionKind::ALL.to_vec(),
        }
    }

    /// Set the target keywords
    pub fn keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.keywords = keywords.into_iter().map(|k| k.as_ref().to_string()).collect();
        self
    }

    /// Set the region recognition rules
    pub fn classifier_rules(mut self, rules: ClassifierRules) -> Self {
        self.classifier_rules = rules;
        self
    }

    /// Set the exclusion rules
    pub fn exclusion_rules(mut self, rules: ExclusionRules) -> Self {
        self.exclusions = Some(rules);
        self
    }

    /// Set the fallback matcher run when text finds nothing
    pub fn fallback(mut self, matcher: Box<dyn FallbackMatcher>) -> Self {
        self.fallback = Some(matcher);
        self
    }

    /// Set how popular-content ranks are counted
    pub fn popular_rank_mode(mut self, mode: PopularRankMode) -> Self {
        self.popular_rank_mode = mode;
        self
    }

    /// Set the universe of sections the brand is expected in
    pub fn expected_sections(mut self, sections: impl IntoIterator<Item = SectionKind>) -> Self {
        self.expected_sections = sections.into_iter().collect();
        self
    }

    /// Build the engine
    pub fn build(self) -> Result<ExposureEngine, ConfigError> {
        let classifier = SectionClassifier::new(&self.classifier_rules)?;
        let exclusions = match self.exclusions {
            Some(rules) => rules,
            None => ExclusionRules::standard()?,
        };

        Ok(ExposureEngine {
            text: TextMatcher::new(Arc::new(KeywordSet::new(&self.keywords))),
            fallback: self.fallback,
            classifier,
            exclusions,
            popular_rank_mode: self.popular_rank_mode,
            aggregator: ExposureAggregator::new(self.expected_sections),
        })
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The exposure detection and ranking engine.
///
/// Read-only after construction; one engine serves any number of pages,
/// in parallel.
pub struct ExposureEngine {
    text: TextMatcher,
    fallback: Option<Box<dyn FallbackMatcher>>,
    classifier: SectionClassifier,
    exclusions: ExclusionRules,
    popular_rank_mode: PopularRankMode,
    aggregator: ExposureAggregator,
}

impl ExposureEngine {
    /// Create a new engine builder
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// Build an engine from validated configuration.
    ///
    /// Loads the logo template library when the logo fallback is selected
    /// and fails when it is empty.
    pub fn from_config(config: &MonitorConfig) -> Result<Self, ExposureError> {
        config.validate()?;

        let fallback: Option<Box<dyn FallbackMatcher>> = match config.fallback {
            FallbackStrategy::Logo => {
                let matcher = LogoMatcher::from_dir(&config.templates_dir)?
                    .with_thresholds(config.logo_thresholds)
                    .with_cache(Arc::new(config.build_hash_cache()));
                Some(Box::new(matcher))
            }
            FallbackStrategy::Ocr => {
                let normalizer = OcrNormalizer::new(&config.ocr.brand_token, &config.ocr.alphabet)?;
                let recognizer = TesseractRecognizer::with_config(config.ocr.tesseract.clone());
                Some(Box::new(OcrMatcher::new(Box::new(recognizer), normalizer)))
            }
            FallbackStrategy::None => None,
        };

        let mut builder = EngineBuilder::new()
            .keywords(&config.keywords)
            .classifier_rules(config.classifier.clone())
            .exclusion_rules(ExclusionRules::new(
                &config.qa_host_pattern,
                &config.paid_link_pattern,
                &config.sponsored_marker,
            )?)
            .popular_rank_mode(config.popular_rank_mode)
            .expected_sections(config.expected_sections.iter().copied());

        if let Some(fallback) = fallback {
            builder = builder.fallback(fallback);
        }

        Ok(builder.build()?)
    }

    /// Active fallback strategy
    pub fn fallback_strategy(&self) -> FallbackStrategy {
        self.fallback
            .as_ref()
            .map(|f| f.strategy())
            .unwrap_or(FallbackStrategy::None)
    }

    pub fn keywords(&self) -> &KeywordSet {
        self.text.keywords()
    }

    /// Evaluate one page for `keyword` without events
    pub fn evaluate(&self, keyword: &str, page: &dyn PageModel) -> ExposureReport {
        self.evaluate_with_events(keyword, page, &null_sender())
    }

    /// Evaluate one page for `keyword` with event reporting
    pub fn evaluate_with_events(
        &self,
        keyword: &str,
        page: &dyn PageModel,
        events: &EventSender,
    ) -> ExposureReport {
        self.evaluate_at(keyword, page, Utc::now(), events)
    }

    /// Evaluate one page, stamping the report with `timestamp`.
    ///
    /// Always yields exactly one report; per-card failures degrade that
    /// card to no evidence.
    pub fn evaluate_at(
        &self,
        keyword: &str,
        page: &dyn PageModel,
        timestamp: DateTime<Utc>,
        events: &EventSender,
    ) -> ExposureReport {
        let regions = page.regions();

        events.send(Event::Evaluation(EvaluationEvent::Started {
            keyword: keyword.to_string(),
            regions: regions.len(),
        }));

        let classified = self.classifier.classify(regions, &self.exclusions);
        for kind in RegionKind::ALL {
            if !classified.contains(kind) {
                debug!(keyword, region = %kind, "region not on page");
            }
        }
        let mut ranks = RankAssigner::new(self.popular_rank_mode);
        let mut observed = BTreeSet::new();
        let mut matches = Vec::new();

        for (region_index, kind, region) in classified.in_document_order() {
            events.send(Event::Evaluation(EvaluationEvent::SectionClassified {
                region: kind,
                region_index,
                cards: region.cards.len(),
            }));
            observed.extend(kind.sections().iter().copied());

            for (index, card) in region.cards.iter().enumerate() {
                let section = self.section_for(kind, card);
                let position = CardPosition { section, index };

                if kind == RegionKind::PopularContent {
                    if let Some(reason) = self.exclusions.popular_exclusion(card) {
                        debug!(section = %section, index, reason = %reason, "card excluded");
                        events.send(Event::Card(CardEvent::Excluded { position, reason }));
                        continue;
                    }
                }

                if kind == RegionKind::PaidPlacement && !self.exclusions.is_paid_candidate(card) {
                    debug!(section = %section, index, "card is not a paid placement");
                    continue;
                }

                let evidence = self.examine_card(card, position, events);
                let rank = ranks.record(section, evidence.is_some());

                if let (Some(rank), Some(evidence)) = (rank, evidence) {
                    debug!(
                        section = %section,
                        index,
                        rank = rank.get(),
                        evidence = evidence.kind(),
                        "card matched"
                    );
                    events.send(Event::Card(CardEvent::Matched {
                        position,
                        rank: rank.get(),
                        evidence: evidence.clone(),
                    }));
                    matches.push(RankedMatch::new(
                        section,
                        rank,
                        evidence,
                        card.link().map(str::to_string),
                        card.snippet(),
                    ));
                }
            }
        }

        let report = self.aggregator.aggregate(keyword, timestamp, matches, observed);

        info!(
            keyword,
            matches = report.matches().len(),
            unexposed = report.unexposed_sections().len(),
            "exposure report ready"
        );
        events.send(Event::Evaluation(EvaluationEvent::Completed {
            keyword: keyword.to_string(),
            matches: report.matches().len(),
            unexposed: report.unexposed_sections().clone(),
        }));

        report
    }

    /// Evaluate many `(keyword, page)` pairs in parallel.
    ///
    /// Reports come back in input order.
    pub fn evaluate_batch<P: PageModel>(
        &self,
        jobs: &[(String, P)],
        events: &EventSender,
    ) -> Vec<ExposureReport> {
        let total = jobs.len();
        let completed = AtomicUsize::new(0);
        let timestamp = Utc::now();

        events.send(Event::Batch(BatchEvent::Started { total_pages: total }));

        let reports: Vec<ExposureReport> = jobs
            .par_iter()
            .map(|(keyword, page)| {
                let report = self.evaluate_at(keyword, page, timestamp, events);

                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                events.send(Event::Batch(BatchEvent::Progress(BatchProgress {
                    completed: done,
                    total,
                    keyword: keyword.clone(),
                })));

                report
            })
            .collect();

        events.send(Event::Batch(BatchEvent::Completed {
            total_reports: reports.len(),
        }));

        reports
    }

    fn section_for(&self, kind: RegionKind, card: &Card) -> SectionKind {
        match kind {
            RegionKind::PaidPlacement => SectionKind::PaidPlacement,
            RegionKind::BrandedContent => SectionKind::BrandedContent,
            RegionKind::LocalListing => self.exclusions.listing_section(card),
            RegionKind::PopularContent => SectionKind::PopularContent,
        }
    }

    /// Text first; the fallback only when text finds nothing
    fn examine_card(
        &self,
        card: &Card,
        position: CardPosition,
        events: &EventSender,
    ) -> Option<MatchEvidence> {
        let found = self.text.find(card.lowered_text());
        if !found.is_empty() {
            return Some(MatchEvidence::Text {
                keywords: found.iter().map(|k| k.original().to_string()).collect(),
            });
        }

        let fallback = self.fallback.as_ref()?;
        let thumbnail = card.thumbnail()?;

        match fallback.examine(thumbnail) {
            Ok(evidence) => evidence,
            Err(e) => {
                warn!(
                    strategy = %fallback.strategy(),
                    thumbnail = thumbnail.source(),
                    error = %e,
                    "fallback evidence unavailable"
                );
                events.send(Event::Card(CardEvent::EvidenceFailed {
                    position,
                    thumbnail: thumbnail.source().to_string(),
                    message: e.to_string(),
                }));
                None
            }
        }
    }
}
