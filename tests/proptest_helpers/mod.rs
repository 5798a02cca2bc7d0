#![allow(dead_code)]

use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};
use yolo2coco::ir::NormalizedBox;

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(256);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// Image dimensions from a single pixel up to a large photo.
pub fn arb_image_dims() -> impl Strategy<Value = (u32, u32)> {
    (1u32..=8192, 1u32..=8192)
}

/// Normalized boxes inside the unit square.
pub fn arb_unit_box() -> impl Strategy<Value = NormalizedBox> {
    (0.0f64..=1.0, 0.0f64..=1.0, 0.0f64..=1.0, 0.0f64..=1.0)
        .prop_map(|(cx, cy, w, h)| NormalizedBox::new(cx, cy, w, h))
}

/// Normalized boxes with components well outside `[0, 1]`, negatives included.
pub fn arb_wild_box() -> impl Strategy<Value = NormalizedBox> {
    (-2.0f64..3.0, -2.0f64..3.0, -1.0f64..3.0, -1.0f64..3.0)
        .prop_map(|(cx, cy, w, h)| NormalizedBox::new(cx, cy, w, h))
}

/// Distinct image-like names, as a sorted directory listing would give them.
pub fn arb_file_names(max: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set("[a-z]{1,8}\\.(jpg|png)", 0..=max)
        .prop_map(|set| set.into_iter().collect())
}

/// Ratios strictly between 0 and 1.
pub fn arb_ratio() -> impl Strategy<Value = f64> {
    (1u32..100).prop_map(|pct| pct as f64 / 100.0)
}
