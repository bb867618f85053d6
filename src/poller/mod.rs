mod reconciler;

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{MissedTickBehavior, interval};
use tracing::{error, info};

pub use reconciler::{LeaderboardReconciler, ReconcilePlan, ReconcileReport};

use crate::riot::Platform;

/// Runs `reconcile(region)` every `interval_secs`.
///
/// A failed run is logged and the next tick runs as usual. Runs never
/// overlap: a tick that fires while a run is in progress waits for it, and
/// the schedule restarts from there instead of replaying missed ticks.
pub async fn start_polling(
    reconciler: Arc<LeaderboardReconciler>,
    region: Platform,
    interval_secs: u64,
) {
    let mut interval = interval(Duration::from_secs(interval_secs));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(
        interval_secs,
        %region,
        table = %reconciler.table().name,
        "🔄 Leaderboard poller started"
    );

    loop {
        interval.tick().await;

        match reconciler.reconcile(region.as_str()).await {
            Ok(report) if report.skipped => info!("🔄 Reconcile cycle skipped"),
            Ok(report) => info!(
                deleted = report.deleted,
                written = report.written,
                "🔄 ✅ Reconcile cycle done"
            ),
            Err(e) => error!(error = ?e, "🔄 ❌ Reconcile cycle failed"),
        }
    }
}
