/// Property-based tests using proptest
/// Tests invariants of the reconciliation plan that should hold for all datasets
use chrono::NaiveTime;
use proptest::prelude::*;
use shift_maintenance::models::{ScheduleEntry, ShiftSignature, ShiftType};
use shift_maintenance::reconciler::{reconcile, NoopObserver, ReconcilePlan};
use std::collections::{BTreeSet, HashMap};

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

/// Small pool of signatures so generated datasets actually contain
/// duplicates instead of all-distinct records.
fn signature_pool() -> Vec<(&'static str, NaiveTime, NaiveTime)> {
    vec![
        ("Morning", t(8, 0), t(16, 0)),
        ("Evening", t(16, 0), t(0, 0)),
        ("Night", t(0, 0), t(8, 0)),
        ("Bar", t(20, 0), t(3, 0)),
        ("Door", t(19, 0), t(4, 0)),
        ("Morning", t(9, 0), t(16, 0)), // same title, different start
    ]
}

#[derive(Debug, Clone)]
struct Dataset {
    shift_types: Vec<ShiftType>,
    entries_by_type: HashMap<i64, Vec<ScheduleEntry>>,
}

fn dataset_strategy() -> impl Strategy<Value = Dataset> {
    (
        prop::collection::vec(0usize..signature_pool().len(), 0..16),
        prop::collection::vec(0usize..16, 0..40),
    )
        .prop_map(|(sig_picks, entry_picks)| {
            let pool = signature_pool();
            let shift_types: Vec<ShiftType> = sig_picks
                .iter()
                .enumerate()
                .map(|(i, &sig)| {
                    let (title, start, end) = pool[sig];
                    ShiftType {
                        // Gaps in the id sequence, like a real table.
                        id: (i as i64) * 3 + 1,
                        title: title.to_string(),
                        start_time: start,
                        end_time: end,
                    }
                })
                .collect();

            let mut entries_by_type: HashMap<i64, Vec<ScheduleEntry>> = HashMap::new();
            if !shift_types.is_empty() {
                for (j, pick) in entry_picks.iter().enumerate() {
                    let target = shift_types[pick % shift_types.len()].id;
                    entries_by_type.entry(target).or_default().push(ScheduleEntry {
                        id: 1000 + j as i64,
                        shift_type_id: target,
                    });
                }
            }

            Dataset {
                shift_types,
                entries_by_type,
            }
        })
}

fn apply(dataset: &Dataset, plan: &ReconcilePlan) -> Dataset {
    let shift_types: Vec<ShiftType> = dataset
        .shift_types
        .iter()
        .filter(|s| !plan.deletions.contains(&s.id))
        .cloned()
        .collect();

    let mut entries: Vec<ScheduleEntry> = dataset
        .entries_by_type
        .values()
        .flatten()
        .cloned()
        .collect();
    for r in &plan.reassignments {
        if let Some(e) = entries.iter_mut().find(|e| e.id == r.entry_id) {
            e.shift_type_id = r.new_shift_type_id;
        }
    }
    let mut entries_by_type: HashMap<i64, Vec<ScheduleEntry>> = HashMap::new();
    for e in entries {
        entries_by_type.entry(e.shift_type_id).or_default().push(e);
    }

    Dataset {
        shift_types,
        entries_by_type,
    }
}

proptest! {
    // No reassignment may target an id scheduled for deletion, and every
    // target must exist in the dataset.
    #[test]
    fn reassignments_target_surviving_shift_types(dataset in dataset_strategy()) {
        let plan = reconcile(&dataset.shift_types, &dataset.entries_by_type, &mut NoopObserver).unwrap();
        let known: BTreeSet<i64> = dataset.shift_types.iter().map(|s| s.id).collect();
        for r in &plan.reassignments {
            prop_assert!(known.contains(&r.new_shift_type_id));
            prop_assert!(!plan.deletions.contains(&r.new_shift_type_id));
        }
    }

    // Entries are only ever redirected, never created or lost.
    #[test]
    fn reference_count_is_preserved(dataset in dataset_strategy()) {
        let before: usize = dataset.entries_by_type.values().map(Vec::len).sum();
        let plan = reconcile(&dataset.shift_types, &dataset.entries_by_type, &mut NoopObserver).unwrap();
        let after_state = apply(&dataset, &plan);
        let after: usize = after_state.entries_by_type.values().map(Vec::len).sum();
        prop_assert_eq!(before, after);
    }

    // After applying the plan the table is canonical: every survivor is
    // referenced, every entry points at a survivor, and no two survivors
    // share a (title, start, end) combination.
    #[test]
    fn applied_plan_leaves_a_canonical_table(dataset in dataset_strategy()) {
        let plan = reconcile(&dataset.shift_types, &dataset.entries_by_type, &mut NoopObserver).unwrap();
        let state = apply(&dataset, &plan);

        let surviving_ids: BTreeSet<i64> = state.shift_types.iter().map(|s| s.id).collect();
        for s in &state.shift_types {
            prop_assert!(
                state.entries_by_type.get(&s.id).map(|v| !v.is_empty()).unwrap_or(false),
                "unused shift type {} survived", s.id
            );
        }
        for id in state.entries_by_type.keys() {
            prop_assert!(surviving_ids.contains(id));
        }
        let mut signatures: BTreeSet<String> = BTreeSet::new();
        for s in &state.shift_types {
            let key = format!("{}|{}|{}", s.title, s.start_time, s.end_time);
            prop_assert!(signatures.insert(key), "duplicate survived: {:?}", s);
        }
    }

    // The survivor of a referenced equivalence class is its smallest id.
    #[test]
    fn survivor_is_smallest_class_id(dataset in dataset_strategy()) {
        let plan = reconcile(&dataset.shift_types, &dataset.entries_by_type, &mut NoopObserver).unwrap();
        let state = apply(&dataset, &plan);

        let mut min_by_signature: HashMap<ShiftSignature, i64> = HashMap::new();
        for s in &dataset.shift_types {
            let entry = min_by_signature.entry(s.signature()).or_insert(s.id);
            if s.id < *entry {
                *entry = s.id;
            }
        }
        for s in &state.shift_types {
            prop_assert_eq!(min_by_signature[&s.signature()], s.id);
        }
    }

    // Running the cleanup on an already-clean table plans nothing.
    #[test]
    fn second_run_is_a_noop(dataset in dataset_strategy()) {
        let plan = reconcile(&dataset.shift_types, &dataset.entries_by_type, &mut NoopObserver).unwrap();
        let state = apply(&dataset, &plan);
        let second = reconcile(&state.shift_types, &state.entries_by_type, &mut NoopObserver).unwrap();
        prop_assert!(second.is_empty(), "second run produced {:?}", second);
    }
}
