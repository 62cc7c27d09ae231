//! Integration tests for the exposure engine.
//!
//! These tests verify end-to-end evaluation behavior including:
//! - Paid-placement ranking
//! - Popular-content exclusion with logo fallback
//! - OCR fallback, its failures and its configuration
//! - Unexposed sections for missing regions
//! - Rank stability across keywords

use image::{DynamicImage, ImageBuffer, Luma};
use keyword_exposure_monitor::config::MonitorConfig;
use keyword_exposure_monitor::core::hasher::{HashAlgorithm, ImageHashValue};
use keyword_exposure_monitor::core::matcher::{
    FallbackStrategy, LogoClassification, LogoMatcher, MatchEvidence, OcrMatcher, OcrNormalizer,
};
use keyword_exposure_monitor::core::ocr::TextRecognizer;
use keyword_exposure_monitor::core::page::{
    Card, CardFlag, MemoryThumbnail, Region, RegionMarkers, StaticPage,
};
use keyword_exposure_monitor::core::pipeline::ExposureEngine;
use keyword_exposure_monitor::core::rank::PopularRankMode;
use keyword_exposure_monitor::core::report::ExposureAggregator;
use keyword_exposure_monitor::core::section::SectionKind;
use keyword_exposure_monitor::core::templates::{LogoTemplate, TemplateLibrary};
use keyword_exposure_monitor::error::{ConfigError, ExposureError, HashError, OcrError};
use keyword_exposure_monitor::events::{CardEvent, Event, EventChannel};
use std::collections::BTreeSet;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

/// Hashes an image to the value of its top-left pixel
struct PixelHasher;

impl HashAlgorithm for PixelHasher {
    fn hash_image(&self, image: &DynamicImage) -> Result<ImageHashValue, HashError> {
        Ok(ImageHashValue::new(vec![image.to_luma8().get_pixel(0, 0)[0]]))
    }

    fn name(&self) -> &'static str {
        "pixel"
    }
}

/// Returns a fixed recognition result for every image
struct ScriptedRecognizer(Result<&'static str, &'static str>);

impl TextRecognizer for ScriptedRecognizer {
    fn recognize(&self, _image: &DynamicImage) -> Result<String, OcrError> {
        self.0
            .map(str::to_string)
            .map_err(|reason| OcrError::OcrFailed(reason.to_string()))
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

fn ocr_engine(script: Result<&'static str, &'static str>) -> ExposureEngine {
    let matcher = OcrMatcher::new(
        Box::new(ScriptedRecognizer(script)),
        OcrNormalizer::new("YK", "A-Z").unwrap(),
    );
    ExposureEngine::builder()
        .keywords(["YK"])
        .fallback(Box::new(matcher))
        .build()
        .unwrap()
}

fn branded_logo_region() -> Region {
    Region::new(RegionMarkers::with_header("브랜드 콘텐츠")).with_cards([
        Card::new("가사 전문 상담")
            .with_thumbnail(png_thumbnail("https://img/card-1.png", 0x80)),
        Card::new("caption-less banner")
            .with_thumbnail(png_thumbnail("https://img/card-2.png", 0x40)),
    ])
}

fn png_thumbnail(source: &str, value: u8) -> Arc<MemoryThumbnail> {
    let img = DynamicImage::ImageLuma8(ImageBuffer::from_pixel(8, 8, Luma([value])));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    Arc::new(MemoryThumbnail::new(source, bytes))
}

fn logo_matcher() -> LogoMatcher {
    let library = TemplateLibrary::from_templates(
        vec![
            LogoTemplate::new("logo_v1", ImageHashValue::new(vec![0x00])),
            LogoTemplate::new("logo_v2", ImageHashValue::new(vec![0xF0])),
        ],
        Path::new("templates"),
    )
    .unwrap();
    LogoMatcher::new(Arc::new(library), Box::new(PixelHasher))
}

fn paid_region() -> Region {
    Region::new(RegionMarkers::with_header("파워링크")).with_cards([
        Card::new("이혼 전문 로펌"),
        Card::new("법무법인 YK 가사센터"),
        Card::new("상속 전문 변호사"),
    ])
}

fn popular_region() -> Region {
    Region::new(RegionMarkers::with_header("인기글")).with_cards([
        Card::new("법무법인 YK 공식 블로그").with_flag(CardFlag::BrandTemplate),
        Card::new("이혼 소송 후기")
            .with_link("https://blog.naver.com/someone/1")
            .with_thumbnail(png_thumbnail("https://img/thumb-1.png", 0x0F)),
        Card::new("양육권 질문").with_link("https://cafe.naver.com/law/7"),
    ])
}

#[test]
fn paid_region_second_card_is_rank_two() {
    let engine = ExposureEngine::builder().keywords(["YK"]).build().unwrap();

    let report = engine.evaluate("이혼변호사", &StaticPage::new(vec![paid_region()]));

    assert_eq!(report.matches().len(), 1);
    let hit = &report.matches()[0];
    assert_eq!(hit.section, SectionKind::PaidPlacement);
    assert_eq!(hit.rank.get(), 2);
    assert_eq!(
        hit.evidence,
        MatchEvidence::Text {
            keywords: vec!["YK".to_string()]
        }
    );
}

#[test]
fn popular_logo_hit_after_excluded_brand_card() {
    let engine = ExposureEngine::builder()
        .keywords(["YK"])
        .fallback(Box::new(logo_matcher()))
        .build()
        .unwrap();

    let report = engine.evaluate("이혼변호사", &StaticPage::new(vec![popular_region()]));

    assert_eq!(report.matches().len(), 1);
    let hit = &report.matches()[0];
    assert_eq!(hit.section, SectionKind::PopularContent);
    // The brand card is excluded, so the thumbnail card is first
    assert_eq!(hit.rank.get(), 1);
    assert_eq!(
        hit.evidence,
        MatchEvidence::Logo {
            template: "logo_v1".to_string(),
            distance: 4,
            classification: LogoClassification::Same,
        }
    );
    assert_eq!(hit.content_type.as_ref().map(|c| c.label()), Some("블로그"));
}

#[test]
fn ocr_fallback_finds_brand_on_caption_less_card() {
    let page = StaticPage::new(vec![branded_logo_region()]);

    let report = ocr_engine(Ok("Y.K LAW")).evaluate("q", &page);

    let hits: Vec<_> = report
        .matches()
        .iter()
        .map(|m| (m.section, m.rank.get(), m.evidence.clone()))
        .collect();
    let evidence = MatchEvidence::Ocr {
        snippet: "Y.K LAW".to_string(),
    };

    // The script answers for both thumbnails.
    assert_eq!(
        hits,
        vec![
            (SectionKind::BrandedContent, 1, evidence.clone()),
            (SectionKind::BrandedContent, 2, evidence),
        ]
    );
}

#[test]
fn ocr_text_without_brand_yields_nothing() {
    let page = StaticPage::new(vec![branded_logo_region()]);

    let report = ocr_engine(Ok("KIM & LEE")).evaluate("q", &page);

    assert!(report.matches().is_empty());
    assert!(report.unexposed_sections().contains(&SectionKind::BrandedContent));
}

#[test]
fn recognizer_failure_degrades_and_is_reported() {
    let engine = ocr_engine(Err("tesseract exited with status 1"));
    let (sender, receiver) = EventChannel::new();

    let report =
        engine.evaluate_with_events("q", &StaticPage::new(vec![branded_logo_region()]), &sender);
    drop(sender);

    assert!(report.matches().is_empty());
    let failures: Vec<_> = receiver
        .iter()
        .filter_map(|event| match event {
            Event::Card(CardEvent::EvidenceFailed {
                position,
                thumbnail,
                message,
            }) => Some((position.index, thumbnail, message)),
            _ => None,
        })
        .collect();

    assert_eq!(failures.len(), 2);
    assert_eq!(failures[0].0, 0);
    assert_eq!(failures[1].1, "https://img/card-2.png");
    assert!(failures[1].2.contains("tesseract exited"));
}

#[test]
fn config_selects_the_ocr_fallback() {
    let config = MonitorConfig {
        keywords: vec!["YK".to_string()],
        fallback: FallbackStrategy::Ocr,
        templates_dir: "/nonexistent/templates".into(),
        ..MonitorConfig::default()
    };

    let engine = ExposureEngine::from_config(&config).unwrap();
    assert_eq!(engine.fallback_strategy(), FallbackStrategy::Ocr);

    let mut unmatchable = config.clone();
    unmatchable.ocr.brand_token = "Y.K".to_string();
    assert!(matches!(
        ExposureEngine::from_config(&unmatchable),
        Err(ExposureError::Config(ConfigError::InvalidValue { .. }))
    ));
}

#[test]
fn paid_link_flag_still_ranks_alongside_unlinked_cards() {
    let region = Region::new(RegionMarkers::with_header("파워링크")).with_cards([
        Card::new("가사 소송").with_flag(CardFlag::PaidLink),
        Card::new("법무법인 YK").with_link("https://ader.naver.com/v1/yk"),
    ]);
    let engine = ExposureEngine::builder().keywords(["YK"]).build().unwrap();

    let report = engine.evaluate("q", &StaticPage::new(vec![region]));

    assert_eq!(report.matches()[0].rank.get(), 2);
}

#[test]
fn brand_card_is_not_a_popular_match_even_with_keyword() {
    let engine = ExposureEngine::builder().keywords(["YK"]).build().unwrap();

    let report = engine.evaluate("q", &StaticPage::new(vec![popular_region()]));

    assert!(report.matches().is_empty());
    assert!(report.unexposed_sections().contains(&SectionKind::PopularContent));
}

#[test]
fn missing_branded_region_is_unexposed() {
    let engine = ExposureEngine::builder().keywords(["YK"]).build().unwrap();

    let report = engine.evaluate("q", &StaticPage::new(vec![paid_region(), popular_region()]));

    assert!(report.unexposed_sections().contains(&SectionKind::BrandedContent));
    assert!(!report.unexposed_sections().contains(&SectionKind::PaidPlacement));
    assert!(report.summary().contains("브랜드콘텐츠"));
}

#[test]
fn rank_sequences_are_identical_across_keywords() {
    let engine = ExposureEngine::builder()
        .keywords(["YK"])
        .fallback(Box::new(logo_matcher()))
        .build()
        .unwrap();
    let page = StaticPage::new(vec![paid_region(), popular_region()]);

    let ranks = |keyword: &str| -> Vec<(SectionKind, u32)> {
        engine
            .evaluate(keyword, &page)
            .matches()
            .iter()
            .map(|m| (m.section, m.rank.get()))
            .collect()
    };

    assert_eq!(ranks("이혼변호사"), ranks("상속변호사"));
    assert_eq!(
        ranks("이혼변호사"),
        vec![(SectionKind::PaidPlacement, 2), (SectionKind::PopularContent, 1)]
    );
}

#[test]
fn match_sequence_mode_counts_only_matches() {
    let region = Region::new(RegionMarkers::with_header("인기글")).with_cards([
        Card::new("이혼 후기"),
        Card::new("YK 상담 후기"),
    ]);
    let page = StaticPage::new(vec![region]);

    let by_position = ExposureEngine::builder().keywords(["yk"]).build().unwrap();
    let by_match = ExposureEngine::builder()
        .keywords(["yk"])
        .popular_rank_mode(PopularRankMode::MatchSequence)
        .build()
        .unwrap();

    assert_eq!(by_position.evaluate("q", &page).matches()[0].rank.get(), 2);
    assert_eq!(by_match.evaluate("q", &page).matches()[0].rank.get(), 1);
}

#[test]
fn aggregator_edges() {
    let aggregator = ExposureAggregator::default();

    let empty = aggregator.aggregate("q", chrono::Utc::now(), Vec::new(), BTreeSet::new());
    assert_eq!(
        empty.unexposed_sections().iter().copied().collect::<Vec<_>>(),
        SectionKind::ALL.to_vec()
    );

    let engine = ExposureEngine::builder()
        .keywords(["YK"])
        .expected_sections([SectionKind::PaidPlacement])
        .build()
        .unwrap();
    let report = engine.evaluate("q", &StaticPage::new(vec![paid_region()]));
    assert!(report.summary().ends_with("미노출영역: 없음"));
}
