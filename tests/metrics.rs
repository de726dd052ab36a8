// tests/metrics.rs
// One test per binary: the Prometheus recorder is process-global.
use chrono::{TimeZone, Utc};
use market_traction::metrics::Metrics;
use market_traction::{
    Asset, AssetAggregates, Calibration, CategoryInput, CategoryMap, InfluenceTier,
    LifecycleStage, SnapshotRepository, Taxonomy, TieredMentionEvent, TractionEngine,
};
use std::sync::Arc;

#[tokio::test]
async fn run_emits_expected_series() {
    let metrics = Metrics::install().expect("recorder");

    let now = Utc.with_ymd_and_hms(2025, 6, 15, 0, 0, 0).unwrap();
    let mut repo = SnapshotRepository::new();
    let hyped = Asset::new("HYPE", LifecycleStage::PostLaunch);
    repo.insert(
        hyped.clone(),
        AssetAggregates {
            categories: CategoryMap::new(Some(CategoryInput::magnitude(500.0)), None, None, None),
            mentions_24h: Some(5_000),
            liquidity_24h_usd: Some(1_000_000.0),
        },
    );
    let empty = Asset::new("EMPTY", LifecycleStage::PreLaunch);
    repo.insert(empty.clone(), AssetAggregates::default());
    repo.push_mention(TieredMentionEvent::new(
        "$HYPE listing",
        InfluenceTier::A,
        now - chrono::Duration::hours(5),
        2,
    ));
    repo.push_mention(TieredMentionEvent::new(
        "$HYPE listing",
        InfluenceTier::D,
        now - chrono::Duration::hours(1),
        9,
    ));

    let engine = TractionEngine::new(Calibration::default(), Taxonomy::default_seed()).unwrap();
    let report = engine
        .run(Arc::new(repo), &[hyped, empty], now)
        .await
        .unwrap();
    assert_eq!(report.lags.len(), 1);

    let out = metrics.render();
    assert!(out.contains("traction_assets_scored_total 2"));
    assert!(out.contains("traction_composite_absent_total 1"));
    assert!(out.contains(r#"traction_category_absent_total{category="video"} 2"#));
    assert!(out.contains(r#"traction_shill_tier_total{tier="hype"} 1"#));
    assert!(out.contains("traction_lag_records_total 1"));
    assert!(out.contains("traction_run_ms"));
}
