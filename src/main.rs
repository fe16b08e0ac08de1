//! Console command that cleans the shift type reference table.
//!
//! Removes shift types no schedule entry uses, and merges duplicates
//! (same title, start and end time) by re-pointing their schedule entries
//! to the earliest equivalent shift type before deleting them.
//!
//! Reads `DB_URL`/`DATABASE_URL` from the environment; set `DRY_RUN=1` to
//! log the plan without touching the database.

use std::time::Instant;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shift_maintenance::config::Config;
use shift_maintenance::db::Database;
use shift_maintenance::db_storage::ShiftTypeStorage;
use shift_maintenance::models::ShiftType;
use shift_maintenance::reconciler::{reconcile, ReconcileObserver};

/// Observer that mirrors the per-record console output of the original
/// cleanup command and tallies summary counters.
#[derive(Default)]
struct CleanupReporter {
    deleted: u64,
    merged: u64,
    entries_repointed: u64,
}

impl ReconcileObserver for CleanupReporter {
    fn on_deleted(&mut self, shift_type: &ShiftType) {
        tracing::info!(
            "Shift type deleted: \"{}\" (id:{}), it is not used in any schedule.",
            shift_type.title,
            shift_type.id
        );
        self.deleted += 1;
    }

    fn on_substituted(&mut self, old: &ShiftType, new: &ShiftType, count: usize) {
        tracing::info!(
            "Substituted \"{}\" with id {} for id {} in {} shifts.",
            old.title,
            old.id,
            new.id,
            count
        );
        self.merged += 1;
        self.entries_repointed += count as u64;
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shift_maintenance=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize database connection pool
    let db = Database::new(&config.database_url).await?;
    tracing::info!("Database connection pool established");

    tracing::info!("Starting shift type cleanup...");
    let started = Instant::now();

    let storage = ShiftTypeStorage::new(db.pool.clone());
    let shift_types = storage.load_shift_types().await?;
    let entries_by_type = storage.load_entries_by_type().await?;
    tracing::info!(
        "Loaded {} shift types and {} schedule entries",
        shift_types.len(),
        entries_by_type.values().map(Vec::len).sum::<usize>()
    );

    let mut reporter = CleanupReporter::default();
    let plan = reconcile(&shift_types, &entries_by_type, &mut reporter)?;

    if plan.is_empty() {
        tracing::info!("Nothing to clean up, shift types are already canonical.");
    } else if config.dry_run {
        tracing::info!(
            "Dry run: would delete {} shift types and re-point {} schedule entries",
            plan.deletions.len(),
            plan.reassignments.len()
        );
        // Full plan on stdout so it can be reviewed or archived.
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        let outcome = storage.apply_plan(&plan).await?;
        tracing::info!(
            "Applied cleanup plan: {} shift types deleted ({} unused, {} merged duplicates), {} schedule entries re-pointed",
            outcome.shift_types_deleted,
            reporter.deleted - reporter.merged,
            reporter.merged,
            outcome.entries_repointed
        );
    }

    tracing::info!(
        "Finished shift type cleanup after {:.3} seconds.",
        started.elapsed().as_secs_f64()
    );

    Ok(())
}
