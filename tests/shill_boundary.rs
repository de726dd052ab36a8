// tests/shill_boundary.rs
use market_traction::{shill_index, ShillThresholds, ShillTier};

#[test]
fn tiers_at_default_scale() {
    let t = ShillThresholds::default();
    // mentions per $1M of liquidity
    let hype = shill_index(1_000, 5_000_000.0, &t).unwrap();
    assert_eq!(hype.ratio, Some(200.0));
    assert_eq!(hype.tier, Some(ShillTier::Hype));

    let healthy = shill_index(10, 5_000_000.0, &t).unwrap();
    assert_eq!(healthy.ratio, Some(2.0));
    assert_eq!(healthy.tier, Some(ShillTier::Healthy));
}

#[test]
fn exact_threshold_stays_lower() {
    let t = ShillThresholds::default();
    let at_caution = shill_index(10, 1_000_000.0, &t).unwrap();
    assert_eq!(at_caution.ratio, Some(10.0));
    assert_eq!(at_caution.tier, Some(ShillTier::Healthy));

    let at_hype = shill_index(100, 1_000_000.0, &t).unwrap();
    assert_eq!(at_hype.tier, Some(ShillTier::Caution));

    assert_eq!(t.classify(10.01), ShillTier::Caution);
    assert_eq!(t.classify(100.01), ShillTier::Hype);
}

#[test]
fn per_thousand_scale_reproduces_reference_values() {
    let t = ShillThresholds {
        ratio_scale: 1_000.0,
        ..Default::default()
    };
    let hype = shill_index(1_000, 5_000.0, &t).unwrap();
    assert_eq!(hype.ratio, Some(200.0));
    assert_eq!(hype.tier, Some(ShillTier::Hype));

    let healthy = shill_index(10, 5_000.0, &t).unwrap();
    assert_eq!(healthy.ratio, Some(2.0));
    assert_eq!(healthy.tier, Some(ShillTier::Healthy));
}

#[test]
fn zero_liquidity_is_null_not_infinite() {
    let r = shill_index(1_000_000, 0.0, &ShillThresholds::default()).unwrap();
    assert_eq!(r.ratio, None);
    assert_eq!(r.tier, None);
    assert_eq!(r.mentions, 1_000_000);
}

#[test]
fn zero_mentions_is_healthy() {
    let r = shill_index(0, 2_000_000.0, &ShillThresholds::default()).unwrap();
    assert_eq!(r.ratio, Some(0.0));
    assert_eq!(r.tier, Some(ShillTier::Healthy));
}

#[test]
fn invalid_liquidity_rejected() {
    let t = ShillThresholds::default();
    assert!(shill_index(1, -10.0, &t).is_err());
    assert!(shill_index(1, f64::NAN, &t).is_err());
}

#[test]
fn tier_labels_serialize_snake_case() {
    assert_eq!(serde_json::to_string(&ShillTier::Caution).unwrap(), "\"caution\"");
}
