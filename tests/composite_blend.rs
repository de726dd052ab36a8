// tests/composite_blend.rs
use market_traction::{blend, Category, CategoryMap, LifecycleStage, WeightTables};

fn scores(m: Option<u8>, s: Option<u8>, v: Option<u8>, e: Option<u8>) -> CategoryMap<Option<u8>> {
    CategoryMap::new(m, s, v, e)
}

#[test]
fn post_launch_all_present() {
    let c = blend(
        &scores(Some(20), Some(40), Some(60), Some(80)),
        LifecycleStage::PostLaunch,
        &WeightTables::default(),
    )
    .unwrap();
    // .25*20 + .20*40 + .15*60 + .40*80 = 54
    assert_eq!(c.value, 54);
    assert_eq!(c.categories_used().count(), 4);
    let total: f64 = c.weights.iter().map(|w| w.weight).sum();
    assert!((total - 1.0).abs() < 1e-9);
}

#[test]
fn weighted_sum_with_custom_table() {
    let mut tables = WeightTables::default();
    tables.post_launch = CategoryMap::new(0.4, 0.3, 0.2, 0.1);
    let c = blend(
        &scores(Some(80), Some(60), Some(40), Some(20)),
        LifecycleStage::PostLaunch,
        &tables,
    )
    .unwrap();
    // 32 + 18 + 8 + 2
    assert_eq!(c.value, 60);
}

#[test]
fn absent_category_weight_redistributed() {
    let c = blend(
        &scores(Some(80), Some(60), Some(40), None),
        LifecycleStage::PostLaunch,
        &WeightTables::default(),
    )
    .unwrap();
    // (.25*80 + .20*60 + .15*40) / .60 = 38/.6 = 63.33
    assert_eq!(c.value, 63);
    assert_eq!(c.weight_of(Category::Exchange), None);
    assert!((c.weight_of(Category::Messaging).unwrap() - 0.25 / 0.60).abs() < 1e-9);
}

#[test]
fn absent_is_not_zero() {
    let tables = WeightTables::default();
    let with_zero = blend(&scores(Some(90), Some(0), None, None), LifecycleStage::PreLaunch, &tables)
        .unwrap();
    let with_absent = blend(&scores(Some(90), None, None, None), LifecycleStage::PreLaunch, &tables)
        .unwrap();
    assert!(with_absent.value > with_zero.value);
    assert_eq!(with_absent.value, 90);
}

#[test]
fn nothing_present_is_none() {
    let tables = WeightTables::default();
    assert!(blend(&scores(None, None, None, None), LifecycleStage::PostLaunch, &tables).is_none());
    // exchange carries zero weight before launch
    assert!(blend(&scores(None, None, None, Some(99)), LifecycleStage::PreLaunch, &tables).is_none());
}

#[test]
fn same_scores_differ_by_stage() {
    let tables = WeightTables::default();
    let s = scores(Some(90), Some(70), Some(50), Some(10));
    let pre = blend(&s, LifecycleStage::PreLaunch, &tables).unwrap();
    let post = blend(&s, LifecycleStage::PostLaunch, &tables).unwrap();
    // pre: 45 + 21 + 10 = 76; post: 22.5 + 14 + 7.5 + 4 = 48
    assert_eq!(pre.value, 76);
    assert_eq!(post.value, 48);
    assert_eq!(pre.stage, LifecycleStage::PreLaunch);
}

#[test]
fn unknown_stage_label_rejected() {
    assert!("pre-launch".parse::<LifecycleStage>().is_ok());
    assert!("mid-launch".parse::<LifecycleStage>().is_err());
}
