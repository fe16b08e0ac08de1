/// Pure reconciliation logic for the shift type reference table.
///
/// Given the full set of shift types and, for each, its referencing
/// schedule entries, this module computes a plan:
/// 1. Unused shift types (zero referencing entries) are deleted outright.
/// 2. Duplicate shift types (same title/start/end as an older record) are
///    merged: their entries are re-pointed to the lowest-id twin, then the
///    duplicate is deleted.
///
/// The computation performs no I/O. The caller loads the dataset, runs
/// `reconcile`, and applies the returned plan (see `db_storage::apply_plan`).
use crate::errors::AppError;
use crate::models::{Reassignment, ScheduleEntry, ShiftSignature, ShiftType};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// The result of a reconciliation pass: which shift types to delete and
/// which schedule entries to re-point first.
///
/// Applying the plan is safe in any reassignment order (reassignments for
/// different source shift types touch disjoint entries), as long as all
/// reassignments land before the deletions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcilePlan {
    /// Ids of shift types to delete once reassignments are applied.
    pub deletions: BTreeSet<i64>,
    /// Schedule entry re-pointings required before deletion is safe.
    pub reassignments: Vec<Reassignment>,
}

impl ReconcilePlan {
    /// True when the dataset was already clean: nothing to delete,
    /// nothing to re-point.
    pub fn is_empty(&self) -> bool {
        self.deletions.is_empty() && self.reassignments.is_empty()
    }
}

/// Observer notified of each decision while the plan is being computed.
///
/// The cleanup command uses this to emit the per-record log lines the
/// original console output had, without pushing I/O into the algorithm.
pub trait ReconcileObserver {
    /// A shift type was marked for deletion because nothing references it.
    fn on_deleted(&mut self, shift_type: &ShiftType);
    /// A duplicate was merged: `count` entries move from `old` to `new`.
    fn on_substituted(&mut self, old: &ShiftType, new: &ShiftType, count: usize);
}

/// Observer that ignores every event; use for pure computation.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ReconcileObserver for NoopObserver {
    fn on_deleted(&mut self, _shift_type: &ShiftType) {}
    fn on_substituted(&mut self, _old: &ShiftType, _new: &ShiftType, _count: usize) {}
}

/// Compute the cleanup plan for a shift type dataset.
///
/// `entries_by_type` maps a shift type id to the schedule entries currently
/// referencing it; ids with no entries may simply be absent. Every key must
/// belong to a shift type in `shift_types`, otherwise the caller passed a
/// stale or foreign dataset and we fail with `AppError::NotFound`.
///
/// Records are visited newest first (descending id). That order matters:
/// the canonical lookup always resolves to the lowest id of an equivalence
/// class, so the surviving twin of a duplicate is never a record we already
/// planned to delete, and rarely-used recent duplicates are retired before
/// their heavily-referenced older twins, which keeps the number of entry
/// re-pointings low.
///
/// Within one class the survivor is the lowest-id member that still has
/// references; a class nobody references disappears entirely.
pub fn reconcile<O: ReconcileObserver>(
    shift_types: &[ShiftType],
    entries_by_type: &HashMap<i64, Vec<ScheduleEntry>>,
    observer: &mut O,
) -> Result<ReconcilePlan, AppError> {
    let known_ids: BTreeSet<i64> = shift_types.iter().map(|s| s.id).collect();
    if let Some(foreign) = entries_by_type.keys().find(|id| !known_ids.contains(id)) {
        return Err(AppError::NotFound(format!(
            "schedule entries reference shift type id {} which is not in the dataset",
            foreign
        )));
    }

    // Canonical index: signature -> lowest id carrying it. Built once up
    // front instead of issuing one lookup query per record.
    let mut canonical_by_signature: HashMap<ShiftSignature, &ShiftType> = HashMap::new();
    for shift_type in shift_types {
        canonical_by_signature
            .entry(shift_type.signature())
            .and_modify(|current| {
                if shift_type.id < current.id {
                    *current = shift_type;
                }
            })
            .or_insert(shift_type);
    }

    let mut ordered: Vec<&ShiftType> = shift_types.iter().collect();
    ordered.sort_by(|a, b| b.id.cmp(&a.id));

    let no_entries: Vec<ScheduleEntry> = Vec::new();
    let mut plan = ReconcilePlan::default();

    // Entries re-pointed to a canonical record earlier in the pass count as
    // references when that record is visited. The source worked off live
    // queries and saw these automatically; with a snapshot we track them.
    let mut incoming: HashMap<i64, usize> = HashMap::new();

    for shift_type in ordered {
        let entries = entries_by_type.get(&shift_type.id).unwrap_or(&no_entries);

        if entries.is_empty() && incoming.get(&shift_type.id).copied().unwrap_or(0) == 0 {
            // Not used in any schedule, safe to drop without side effects.
            observer.on_deleted(shift_type);
            plan.deletions.insert(shift_type.id);
            continue;
        }

        let canonical = canonical_by_signature
            .get(&shift_type.signature())
            .copied()
            .ok_or_else(|| {
                AppError::IntegrityError(format!(
                    "shift type {} (\"{}\") is missing from its own equivalence class",
                    shift_type.id, shift_type.title
                ))
            })?;

        if canonical.id == shift_type.id {
            // Only (or earliest) representation of this title/times
            // combination, keep it.
            continue;
        }

        // An older twin exists: move every referencing entry over, then
        // the record is unused and can go.
        for entry in entries {
            plan.reassignments.push(Reassignment {
                entry_id: entry.id,
                new_shift_type_id: canonical.id,
            });
        }
        *incoming.entry(canonical.id).or_insert(0) += entries.len();
        observer.on_substituted(shift_type, canonical, entries.len());
        observer.on_deleted(shift_type);
        plan.deletions.insert(shift_type.id);
    }

    Ok(plan)
}
