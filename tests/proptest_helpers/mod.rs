#![allow(dead_code)]

use facelabel::model::{AnnotationInterval, LabelConfig, Progression};
use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

/// Labels drawn from the catalog, plus one the catalog does not know.
pub const LABELS: &[&str] = &[
    "jawOpen",
    "mouthSmileLeft",
    "cheekPuff",
    "browInnerUp",
    "tongueOut",
    "tongueUp",
    "tongueRoll",
    "eyeBlinkLeft",
];

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

pub fn arb_progression() -> impl Strategy<Value = Progression> {
    prop_oneof![Just(Progression::Linear), Just(Progression::Constant)]
}

pub fn arb_label_config() -> impl Strategy<Value = LabelConfig> {
    (prop::sample::select(LABELS), 0.0f64..=1.0, arb_progression())
        .prop_map(|(label, intensity, progression)| LabelConfig::new(label, intensity, progression))
}

/// 1-4 configs with distinct labels.
pub fn arb_labels() -> impl Strategy<Value = Vec<LabelConfig>> {
    prop::collection::vec(arb_label_config(), 1..=4).prop_map(|mut configs| {
        let mut seen = std::collections::HashSet::new();
        configs.retain(|c| seen.insert(c.label.clone()));
        configs
    })
}

/// Intervals on a 0.25 s grid, so times survive JSON exactly and touching
/// endpoints are common.
pub fn arb_interval() -> BoxedStrategy<AnnotationInterval> {
    (0u32..200, 1u32..20, arb_labels())
        .prop_map(|(start, len, labels)| {
            let start = start as f64 * 0.25;
            let end = start + len as f64 * 0.25;
            AnnotationInterval::new(start, end, labels).expect("grid interval is valid")
        })
        .boxed()
}

pub fn arb_intervals(max: usize) -> BoxedStrategy<Vec<AnnotationInterval>> {
    prop::collection::vec(arb_interval(), 0..=max).boxed()
}
