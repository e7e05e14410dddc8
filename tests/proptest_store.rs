use facelabel::project::{from_json_str, to_json_string};
use facelabel::store::{AnnotationStore, Rejected};
use proptest::prelude::*;

mod proptest_helpers;

fn fill(intervals: Vec<facelabel::model::AnnotationInterval>) -> AnnotationStore {
    let mut store = AnnotationStore::new();
    for interval in intervals {
        let _ = store.add(interval);
    }
    store
}

proptest! {
    #![proptest_config(proptest_helpers::proptest_config())]

    #[test]
    fn store_never_holds_overlapping_intervals(intervals in proptest_helpers::arb_intervals(30)) {
        let store = fill(intervals);
        let members = store.intervals();

        for (i, a) in members.iter().enumerate() {
            for b in &members[i + 1..] {
                prop_assert!(!a.overlaps(b), "{} overlaps {}", a.id, b.id);
            }
        }
        for pair in members.windows(2) {
            prop_assert!(pair[0].start_time <= pair[1].start_time);
        }
    }

    #[test]
    fn rejected_add_leaves_store_untouched(
        intervals in proptest_helpers::arb_intervals(20),
        candidate in proptest_helpers::arb_interval(),
    ) {
        let mut store = fill(intervals);
        store.mark_saved();
        let before = store.intervals().to_vec();

        match store.add(candidate.clone()) {
            Ok(()) => {
                prop_assert_eq!(store.len(), before.len() + 1);
                prop_assert!(store.is_dirty());
                prop_assert!(before.iter().all(|m| !m.overlaps(&candidate)));
            }
            Err(Rejected::Overlap { existing, .. }) => {
                prop_assert_eq!(store.intervals(), before.as_slice());
                prop_assert!(!store.is_dirty());
                let existing = store.get(&existing).expect("named member exists");
                prop_assert!(existing.overlaps(&candidate));
            }
            Err(other) => prop_assert!(false, "unexpected rejection {other}"),
        }
    }

    #[test]
    fn add_then_remove_restores_snapshot(
        intervals in proptest_helpers::arb_intervals(20),
        candidate in proptest_helpers::arb_interval(),
    ) {
        let mut store = fill(intervals);
        let before = store.intervals().to_vec();

        if store.add(candidate.clone()).is_ok() {
            prop_assert!(store.remove(&candidate.id));
            prop_assert_eq!(store.intervals(), before.as_slice());
        }
    }

    #[test]
    fn point_query_matches_closed_containment(
        intervals in proptest_helpers::arb_intervals(20),
        step in 0u32..220,
    ) {
        let store = fill(intervals);
        let t = step as f64 * 0.25;

        let hits: Vec<_> = store.query_at_time(t).into_iter().map(|i| i.id.clone()).collect();
        let expected: Vec<_> = store
            .intervals()
            .iter()
            .filter(|i| i.start_time <= t && t <= i.end_time)
            .map(|i| i.id.clone())
            .collect();
        prop_assert_eq!(hits, expected);
    }

    #[test]
    fn range_query_includes_touching_intervals(
        intervals in proptest_helpers::arb_intervals(20),
        a in 0u32..220,
        len in 0u32..20,
    ) {
        let store = fill(intervals);
        let from = a as f64 * 0.25;
        let to = from + len as f64 * 0.25;

        for interval in store.intervals() {
            let hit = store.query_range(from, to).iter().any(|i| i.id == interval.id);
            prop_assert_eq!(hit, !(interval.end_time < from || interval.start_time > to));
        }
    }

    #[test]
    fn project_roundtrip_is_lossless(intervals in proptest_helpers::arb_intervals(20)) {
        let store = fill(intervals);
        let json = to_json_string(&store).expect("serialize project");
        let load = from_json_str(&json).expect("parse project");

        prop_assert!(load.issues.is_empty());
        prop_assert_eq!(load.store.intervals(), store.intervals());
    }

    #[test]
    fn project_roundtrip_is_idempotent(intervals in proptest_helpers::arb_intervals(20)) {
        let store = fill(intervals);
        let first_json = to_json_string(&store).expect("serialize first pass");
        let first = from_json_str(&first_json).expect("parse first pass");

        let second_json = to_json_string(&first.store).expect("serialize second pass");
        prop_assert_eq!(first_json, second_json);
    }
}
