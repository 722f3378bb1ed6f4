// ==========================================
// 报价会话 API 端到端测试
// ==========================================
// 覆盖: 向导完整流程 / NA / 类别替换 / 目录失败 / 定稿幂等 / 草稿与定稿推送
// ==========================================

mod helpers;

use helpers::mock_catalog::{MockCatalog, MockContent};
use helpers::test_data_builder::{
    freight_id, session_with, standard_catalog, standard_session, RecordBuilder,
};
use rust_decimal::Decimal;
use std::str::FromStr;
use tension_frame_quote::api::{ApiError, QuoteRequest};
use tension_frame_quote::domain::{
    DimensionKey, DimensionSet, FreightTier, LineGroup, QuoteCategory, QuoteStatus, Shape,
};

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

#[tokio::test]
async fn test_square_frame_fabric_freight_totals_210() {
    let mut s = standard_session();

    s.api.set_shape("SQUARE").await.unwrap();
    s.api.set_dimension(DimensionKey::A, "1000").await.unwrap();
    s.api.select(QuoteCategory::Frame, "F-40").await.unwrap();
    let fabric = s.api.select(QuoteCategory::FabricFace, "FAB-1").await.unwrap();
    assert_eq!(fabric.line_cost, 50.0);
    assert_eq!(fabric.weight_delta, 1.0);

    let aggregate = s.api.aggregate();
    assert_eq!(aggregate.geometry().lm, 4.0);
    assert_eq!(aggregate.geometry().sqm, 1.0);
    assert!((aggregate.weight().total_kg() - 2.2).abs() < 1e-9);
    assert_eq!(aggregate.freight_tier(), Some(FreightTier::SmallComplete));

    let freight = s.api.select_freight("Sydney").await.unwrap();
    assert_eq!(freight.line_cost, 80.0);

    let finalized = s.api.finalize().await.unwrap();
    assert_eq!(finalized.grand_total, dec("210.00"));
    assert_eq!(finalized.grand_total.to_string(), "210.00");
    assert_eq!(finalized.status, QuoteStatus::Completed);
    assert_eq!(finalized.freight_tier, Some(FreightTier::SmallComplete));
    assert_eq!(finalized.item(QuoteCategory::Frame).unwrap().value, dec("80"));
    assert_eq!(finalized.item(QuoteCategory::FabricFace).unwrap().value, dec("50"));
    assert_eq!(finalized.item(QuoteCategory::Freight).unwrap().value, dec("80"));
    assert_eq!(finalized.items_in(LineGroup::Materials).count(), 9);
    assert_eq!(finalized.items_in(LineGroup::Services).count(), 2);
    assert_eq!(finalized.items_in(LineGroup::Freight).count(), 1);

    assert_eq!(s.sink.finals().len(), 1);
    assert_eq!(s.sink.finals()[0], finalized);
}

#[tokio::test]
async fn test_all_not_applicable_totals_zero() {
    let mut s = standard_session();
    s.api.set_shape("rectangle").await.unwrap();
    s.api
        .set_dimensions(DimensionSet::new().with(DimensionKey::A, 2000.0).with(DimensionKey::B, 1000.0))
        .await
        .unwrap();

    let finalized = s.api.finalize().await.unwrap();
    assert_eq!(finalized.grand_total.to_string(), "0.00");
    assert!(finalized.line_items.iter().all(|item| item.value.is_zero()));
}

#[tokio::test]
async fn test_finalize_twice_returns_same_total_and_persists_once() {
    let mut s = standard_session();
    s.api.set_shape("SQUARE").await.unwrap();
    s.api.set_dimension(DimensionKey::A, "1000").await.unwrap();
    s.api.select(QuoteCategory::Frame, "F-40").await.unwrap();

    let first = s.api.finalize().await.unwrap();
    let second = s.api.finalize().await.unwrap();
    assert_eq!(first.grand_total, second.grand_total);
    assert_eq!(first, second);
    assert_eq!(s.sink.finals().len(), 1);
}

#[tokio::test]
async fn test_frame_replacement_leaves_no_residue() {
    let mut s = standard_session();
    s.api.set_shape("SQUARE").await.unwrap();
    s.api.set_dimension(DimensionKey::A, "1000").await.unwrap();

    s.api.select(QuoteCategory::Frame, "F-40").await.unwrap();
    s.api.select(QuoteCategory::Frame, "F-60").await.unwrap();

    let aggregate = s.api.aggregate();
    assert_eq!(aggregate.selection(QuoteCategory::Frame).unwrap().id, "F-60");
    assert_eq!(aggregate.pricing().line(QuoteCategory::Frame).cost, 140.0);
    assert!((aggregate.weight().total_kg() - 2.0).abs() < 1e-9);

    let finalized = s.api.finalize().await.unwrap();
    assert_eq!(finalized.grand_total, dec("140.00"));
}

#[tokio::test]
async fn test_catalog_failure_keeps_previous_selection() {
    let mut s = standard_session();
    s.api.set_shape("SQUARE").await.unwrap();
    s.api.set_dimension(DimensionKey::A, "1000").await.unwrap();
    s.api.select(QuoteCategory::Frame, "F-40").await.unwrap();
    let revision = s.api.aggregate().revision();

    s.catalog.fail_category("frame");
    let err = s.api.select(QuoteCategory::Frame, "F-60").await.unwrap_err();
    assert!(matches!(err, ApiError::CatalogLookup { ref category, .. } if category == "FRAME"));

    let aggregate = s.api.aggregate();
    assert_eq!(aggregate.selection(QuoteCategory::Frame).unwrap().id, "F-40");
    assert_eq!(aggregate.pricing().line(QuoteCategory::Frame).cost, 80.0);
    assert_eq!(aggregate.revision(), revision);

    // 未知记录同样按目录失败处理
    s.catalog.recover_category("frame");
    let err = s.api.select(QuoteCategory::Frame, "F-99").await.unwrap_err();
    assert!(matches!(err, ApiError::CatalogLookup { .. }));
    assert_eq!(s.api.aggregate().selection(QuoteCategory::Frame).unwrap().id, "F-40");
}

#[tokio::test]
async fn test_completed_quote_rejects_changes() {
    let mut s = standard_session();
    s.api.set_shape("ROUND").await.unwrap();
    s.api.set_dimension(DimensionKey::A, "500").await.unwrap();
    s.api.finalize().await.unwrap();

    let lookups_before = s.catalog.lookups().len();
    assert!(matches!(
        s.api.set_shape("SQUARE").await,
        Err(ApiError::QuoteFinalized(_))
    ));
    assert!(matches!(
        s.api.select(QuoteCategory::Frame, "F-40").await,
        Err(ApiError::QuoteFinalized(_))
    ));
    assert!(matches!(
        s.api.clear(QuoteCategory::Design).await,
        Err(ApiError::QuoteFinalized(_))
    ));
    assert_eq!(s.catalog.lookups().len(), lookups_before);
    assert_eq!(s.api.aggregate().shape(), Some(Shape::Round));
}

#[tokio::test]
async fn test_cleared_category_blocks_finalize_until_reselected() {
    let mut s = standard_session();
    s.api.set_shape("SQUARE").await.unwrap();
    s.api.set_dimension(DimensionKey::A, "1000").await.unwrap();
    s.api.clear(QuoteCategory::Design).await.unwrap();

    match s.api.finalize().await {
        Err(ApiError::IncompleteQuote { missing }) => assert_eq!(missing, vec!["DESIGN".to_string()]),
        other => panic!("unexpected: {:?}", other),
    }
    assert!(!s.api.aggregate().is_completed());
    assert!(s.sink.finals().is_empty());

    s.api.select(QuoteCategory::Design, "NA").await.unwrap();
    assert!(s.api.finalize().await.is_ok());
}

#[tokio::test]
async fn test_missing_dimension_blocks_finalize() {
    let mut s = standard_session();
    s.api.set_shape("TRIANGLE").await.unwrap();
    s.api.set_dimension(DimensionKey::A, "3000").await.unwrap();
    s.api.set_dimension(DimensionKey::B, "abc").await.unwrap();

    match s.api.finalize().await {
        Err(ApiError::IncompleteQuote { missing }) => {
            assert_eq!(missing, vec!["dimension b".to_string(), "dimension c".to_string()]);
        }
        other => panic!("unexpected: {:?}", other),
    }
}

#[tokio::test]
async fn test_stale_freight_must_be_reselected() {
    let mut s = standard_session();
    s.api.set_shape("RECTANGLE").await.unwrap();
    s.api.set_dimension(DimensionKey::A, "1500").await.unwrap();
    s.api.set_dimension(DimensionKey::B, "1000").await.unwrap();
    s.api.select(QuoteCategory::Frame, "F-40").await.unwrap();
    s.api.select_freight("Sydney").await.unwrap();

    s.api.set_dimension(DimensionKey::A, "2600").await.unwrap();
    assert_eq!(s.api.aggregate().freight_tier(), Some(FreightTier::LargeComplete));

    let err = s.api.finalize().await.unwrap_err();
    assert!(err.to_string().contains("freight tier mismatch"));

    let freight = s.api.select_freight("sydney").await.unwrap();
    assert_eq!(freight.selection.id, freight_id(FreightTier::LargeComplete, "Sydney"));
    assert_eq!(freight.line_cost, 180.0);

    // 7.2 延米 × 20 + 180
    let finalized = s.api.finalize().await.unwrap();
    assert_eq!(finalized.grand_total, dec("324.00"));
}

#[tokio::test]
async fn test_fabric_without_frame_ships_fabric_only() {
    let mut s = standard_session();
    s.api.set_shape("SQUARE").await.unwrap();
    s.api.set_dimension(DimensionKey::A, "2800").await.unwrap();
    s.api.select(QuoteCategory::FabricFace, "FAB-2").await.unwrap();

    assert_eq!(s.api.aggregate().freight_tier(), Some(FreightTier::FabricOnly));
    let freight = s.api.select_freight("Perth").await.unwrap();
    assert_eq!(freight.line_cost, 60.0);
}

#[tokio::test]
async fn test_select_freight_without_match_is_not_found() {
    let mut s = standard_session();
    s.api.set_shape("SQUARE").await.unwrap();
    s.api.set_dimension(DimensionKey::A, "1000").await.unwrap();

    let err = s.api.select_freight("Darwin").await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
    assert!(s
        .api
        .aggregate()
        .selection(QuoteCategory::Freight)
        .unwrap()
        .is_not_applicable());
}

#[tokio::test]
async fn test_lighting_adds_overhead_weight() {
    let mut s = standard_session();
    s.api.set_shape("RECTANGLE").await.unwrap();
    s.api
        .set_dimensions(DimensionSet::new().with(DimensionKey::A, 2000.0).with(DimensionKey::B, 1000.0))
        .await
        .unwrap();
    s.api.select(QuoteCategory::Lighting, "LED-1").await.unwrap();

    let aggregate = s.api.aggregate();
    assert_eq!(aggregate.pricing().line(QuoteCategory::Lighting).cost, 240.0);
    assert!((aggregate.weight().contribution(QuoteCategory::Lighting) - 2.4).abs() < 1e-9);

    s.api.select(QuoteCategory::Lighting, "NA").await.unwrap();
    assert_eq!(s.api.aggregate().weight().total_kg(), 0.0);
}

#[tokio::test]
async fn test_every_mutation_emits_a_draft() {
    let mut s = standard_session();
    s.api.set_shape("SQUARE").await.unwrap();
    s.api.set_dimension(DimensionKey::A, "1000").await.unwrap();
    s.api.select(QuoteCategory::Frame, "F-40").await.unwrap();

    let drafts = s.sink.drafts();
    assert_eq!(drafts.len(), 3);
    let revisions: Vec<u32> = drafts.iter().map(|d| d.revision).collect();
    assert_eq!(revisions, vec![1, 2, 3]);
    assert!(drafts.iter().all(|d| d.status == QuoteStatus::Draft));
    assert_eq!(drafts[2].aggregate.pricing().line(QuoteCategory::Frame).cost, 80.0);

    s.api.finalize().await.unwrap();
    assert_eq!(s.sink.drafts().len(), 3);
}

#[tokio::test]
async fn test_draft_sink_failure_does_not_block_session() {
    let mut s = standard_session();
    s.sink.set_fail_drafts(true);

    s.api.set_shape("SQUARE").await.unwrap();
    s.api.set_dimension(DimensionKey::A, "1000").await.unwrap();
    assert!(s.sink.drafts().is_empty());
    assert_eq!(s.api.aggregate().geometry().lm, 4.0);
}

#[tokio::test]
async fn test_final_sink_failure_is_reported_and_retryable() {
    let mut s = standard_session();
    s.api.set_shape("SQUARE").await.unwrap();
    s.api.set_dimension(DimensionKey::A, "1000").await.unwrap();
    s.sink.set_fail_finals(true);

    let err = s.api.finalize().await.unwrap_err();
    assert!(matches!(err, ApiError::DatabaseConnectionError(_)));
    assert!(s.api.aggregate().is_completed());

    s.sink.set_fail_finals(false);
    let finalized = s.api.finalize().await.unwrap();
    assert_eq!(s.sink.finals(), vec![finalized]);
}

#[tokio::test]
async fn test_load_options_keyed_by_category() {
    let s = session_with(
        MockCatalog::new(standard_catalog())
            .with_delay("frame", 30)
            .with_delay("fabric", 5),
        MockContent::new(),
    );

    let options = s
        .api
        .load_options(&[
            QuoteCategory::Frame,
            QuoteCategory::FabricFace,
            QuoteCategory::FabricRear,
            QuoteCategory::Freight,
        ])
        .await
        .unwrap();

    assert_eq!(options.len(), 4);
    assert_eq!(options[&QuoteCategory::Frame].len(), 2);
    assert_eq!(options[&QuoteCategory::FabricFace].len(), 2);
    assert_eq!(options[&QuoteCategory::FabricRear].len(), 2);
    assert_eq!(options[&QuoteCategory::Freight].len(), 10);
}

#[tokio::test]
async fn test_load_options_failure_names_category() {
    let s = standard_session();
    s.catalog.fail_category("lighting");

    let err = s
        .api
        .load_options(&[QuoteCategory::Frame, QuoteCategory::Lighting])
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::CatalogLookup { ref category, .. } if category == "LIGHTING"));
}

#[tokio::test]
async fn test_step_header_falls_back_to_builtin_text() {
    let s = standard_session();

    let frame = s.api.step_header("frame").await;
    assert_eq!(frame.title, "Frame profile");

    let lighting = s.api.step_header("lighting").await;
    assert!(!lighting.title.is_empty());
    assert!(!lighting.title.contains("steps."));
}

#[tokio::test]
async fn test_preview_tracks_running_total() {
    let mut s = standard_session();
    s.api.set_shape("SQUARE").await.unwrap();
    s.api.set_dimension(DimensionKey::A, "1000").await.unwrap();
    s.api.select(QuoteCategory::Frame, "F-40").await.unwrap();
    s.api.select(QuoteCategory::Design, "D-STD").await.unwrap();

    let preview = s.api.preview().unwrap();
    assert_eq!(preview.running_total, dec("125.00"));
    assert!(preview.is_complete());
    assert!(!s.api.aggregate().is_completed());
}

#[tokio::test]
async fn test_replay_request() {
    let mut s = standard_session();
    let request: QuoteRequest = serde_json::from_value(serde_json::json!({
        "shape": "square",
        "dimensions": { "a": "1000" },
        "selections": { "FRAME": "F-40", "fabric_face": "FAB-1", "SETUP": "NA" },
        "freight_destination": "Sydney"
    }))
    .unwrap();

    let finalized = s.api.replay(&request).await.unwrap();
    assert_eq!(finalized.grand_total.to_string(), "210.00");
}

#[tokio::test]
async fn test_replay_rejects_unknown_category() {
    let mut s = standard_session();
    let request = QuoteRequest {
        shape: "SQUARE".to_string(),
        selections: [("WINDOWS".to_string(), "W-1".to_string())].into_iter().collect(),
        ..Default::default()
    };
    assert!(matches!(s.api.replay(&request).await, Err(ApiError::InvalidInput(_))));
    assert_eq!(s.api.aggregate().revision(), 0);
}

#[tokio::test]
async fn test_overflowing_total_is_rejected_not_zeroed() {
    let mut records = standard_catalog();
    records.push(RecordBuilder::new("design", "D-BIG").sell(5e28).build());
    records.push(RecordBuilder::new("setup", "S-BIG").sell(5e28).build());
    let mut s = session_with(MockCatalog::new(records), MockContent::new());

    s.api.set_shape("SQUARE").await.unwrap();
    s.api.set_dimension(DimensionKey::A, "1000").await.unwrap();
    s.api.select(QuoteCategory::Design, "D-BIG").await.unwrap();
    s.api.select(QuoteCategory::Setup, "S-BIG").await.unwrap();

    assert!(matches!(s.api.preview(), Err(ApiError::PricingError(_))));
    assert!(matches!(s.api.finalize().await, Err(ApiError::PricingError(_))));
    assert_eq!(s.api.aggregate().status(), QuoteStatus::Draft);
    assert!(s.sink.finals().is_empty());

    // 改选正常价格后可以定稿
    s.api.select(QuoteCategory::Design, "D-STD").await.unwrap();
    s.api.select(QuoteCategory::Setup, "S-STD").await.unwrap();
    let finalized = s.api.finalize().await.unwrap();
    assert_eq!(finalized.grand_total, dec("70.00"));
    assert_eq!(s.sink.finals().len(), 1);
}
