use crate::errors::{AppError, ResultExt};
use crate::models::{ScheduleEntry, ShiftType};
use crate::reconciler::ReconcilePlan;
use sqlx::PgPool;
use std::collections::HashMap;

/// Counters describing what a plan application actually touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyOutcome {
    /// Schedule entry rows updated to point at a canonical shift type.
    pub entries_repointed: u64,
    /// Shift type rows deleted.
    pub shift_types_deleted: u64,
}

/// Database storage service for the shift type cleanup.
///
/// Loads the dataset the reconciler works on and applies the plan it
/// produces. All reads happen up front; writes happen in one transaction,
/// reassignments strictly before deletions so no entry ever references a
/// missing shift type, even observed mid-apply.
pub struct ShiftTypeStorage {
    pool: PgPool,
}

impl ShiftTypeStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load every shift type, newest first.
    pub async fn load_shift_types(&self) -> Result<Vec<ShiftType>, AppError> {
        sqlx::query_as::<_, ShiftType>(
            r#"
            SELECT id, title, start_time, end_time
            FROM shift_types
            ORDER BY id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("loading shift types")
    }

    /// Load every schedule entry, grouped by the shift type it references.
    pub async fn load_entries_by_type(&self) -> Result<HashMap<i64, Vec<ScheduleEntry>>, AppError> {
        let entries = sqlx::query_as::<_, ScheduleEntry>(
            r#"
            SELECT id, shift_type_id
            FROM schedule_entries
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("loading schedule entries")?;

        let mut by_type: HashMap<i64, Vec<ScheduleEntry>> = HashMap::new();
        for entry in entries {
            by_type.entry(entry.shift_type_id).or_default().push(entry);
        }
        Ok(by_type)
    }

    /// Apply a reconciliation plan: re-point schedule entries, then delete
    /// the now-unreferenced shift types. One transaction; a failure rolls
    /// everything back and the cleanup can simply be re-run.
    pub async fn apply_plan(&self, plan: &ReconcilePlan) -> Result<ApplyOutcome, AppError> {
        let mut outcome = ApplyOutcome::default();
        if plan.is_empty() {
            return Ok(outcome);
        }

        let mut tx = self.pool.begin().await.context("starting transaction")?;

        for reassignment in &plan.reassignments {
            let result = sqlx::query(
                r#"
                UPDATE schedule_entries
                SET shift_type_id = $1
                WHERE id = $2
                "#,
            )
            .bind(reassignment.new_shift_type_id)
            .bind(reassignment.entry_id)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("re-pointing schedule entry {}", reassignment.entry_id))?;
            outcome.entries_repointed += result.rows_affected();
        }

        let deletions: Vec<i64> = plan.deletions.iter().copied().collect();
        let result = sqlx::query(
            r#"
            DELETE FROM shift_types
            WHERE id = ANY($1)
            "#,
        )
        .bind(&deletions)
        .execute(&mut *tx)
        .await
        .context("deleting shift types")?;
        outcome.shift_types_deleted = result.rows_affected();

        tx.commit().await.context("committing cleanup")?;

        Ok(outcome)
    }
}
