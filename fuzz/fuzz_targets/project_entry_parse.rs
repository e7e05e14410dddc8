//! Fuzz target for single annotation entries.
//!
//! Any JSON value is fed to the entry parser, which must pick a layout
//! (labels array or legacy scalar label) without panicking. Migrated
//! legacy intensities must land in [0, 1].

#![no_main]

use libfuzzer_sys::fuzz_target;
use facelabel::project::parse_annotation_entry;

fuzz_target!(|data: &[u8]| {
    let Ok(entry) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    let is_legacy = !entry.get("labels").is_some_and(|l| l.is_array());

    if let Ok(interval) = parse_annotation_entry(&entry) {
        assert!(!interval.id.is_empty());
        if is_legacy {
            assert_eq!(interval.labels.len(), 1);
            assert!((0.0..=1.0).contains(&interval.labels[0].intensity));
        }
    }
});
