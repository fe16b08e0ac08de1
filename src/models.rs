use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ============ Database Models ============

/// Represents a shift type: a named, timed work-shift template reused
/// across schedule entries.
///
/// Shift types are created by the scheduling UI and accumulate duplicates
/// over time; the reconciler collapses them.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ShiftType {
    /// Unique identifier, totally ordered by creation time.
    pub id: i64,
    /// Display title of the shift (e.g., "Morning").
    pub title: String,
    /// Time of day the shift starts.
    pub start_time: NaiveTime,
    /// Time of day the shift ends.
    pub end_time: NaiveTime,
}

impl ShiftType {
    /// The equivalence key: two shift types are considered the same
    /// shift iff title, start and end time all match.
    pub fn signature(&self) -> ShiftSignature {
        ShiftSignature {
            title: self.title.clone(),
            start_time: self.start_time,
            end_time: self.end_time,
        }
    }
}

/// Represents a scheduled assignment referencing one shift type.
///
/// Only `shift_type_id` is ever mutated by this tool, and only while
/// re-pointing entries from a duplicate shift type to its canonical twin.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Unique identifier for the entry.
    pub id: i64,
    /// Foreign key to the shift type this entry is scheduled as.
    pub shift_type_id: i64,
}

// ============ Reconciliation Models ============

/// The (title, start, end) combination identifying an equivalence class
/// of shift types. Used as the key of the in-memory canonical index.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ShiftSignature {
    pub title: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

/// A single schedule entry re-pointing: entry `entry_id` must reference
/// `new_shift_type_id` instead of its current shift type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reassignment {
    /// The schedule entry being re-pointed.
    pub entry_id: i64,
    /// The canonical shift type the entry will reference afterwards.
    pub new_shift_type_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn signatures_match_on_identical_fields() {
        let a = ShiftType {
            id: 1,
            title: "Morning".into(),
            start_time: t(8, 0),
            end_time: t(16, 0),
        };
        let b = ShiftType {
            id: 9,
            title: "Morning".into(),
            start_time: t(8, 0),
            end_time: t(16, 0),
        };
        assert_eq!(a.signature(), b.signature());
    }

    #[test]
    fn signatures_differ_on_any_field() {
        let base = ShiftType {
            id: 1,
            title: "Morning".into(),
            start_time: t(8, 0),
            end_time: t(16, 0),
        };
        let other_title = ShiftType {
            title: "Evening".into(),
            ..base.clone()
        };
        let other_start = ShiftType {
            start_time: t(9, 0),
            ..base.clone()
        };
        let other_end = ShiftType {
            end_time: t(17, 0),
            ..base.clone()
        };
        assert_ne!(base.signature(), other_title.signature());
        assert_ne!(base.signature(), other_start.signature());
        assert_ne!(base.signature(), other_end.signature());
    }
}
