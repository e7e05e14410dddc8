//! Fuzz target for project file parsing.
//!
//! This fuzzer feeds arbitrary byte sequences to the project loader,
//! covering both the current and the legacy annotation layouts. A load
//! may fail, but it must never panic, and whatever it loads must satisfy
//! the store's non-overlap invariant.

#![no_main]

use libfuzzer_sys::fuzz_target;
use facelabel::project::from_json_slice;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    if let Ok(load) = from_json_slice(data) {
        let intervals = load.store.intervals();
        for (i, a) in intervals.iter().enumerate() {
            for b in &intervals[i + 1..] {
                assert!(!a.overlaps(b));
            }
        }
    }
});
