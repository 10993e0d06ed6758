use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::info;

use crate::config::Settings;
use crate::manager::Manager;
use crate::stats::now_ms;

/// Spawn the periodic refresh loop. Each tick refreshes every source under
/// the configured deadline and logs a per-run summary; the fetch-stats
/// snapshot goes out on its own throttled interval. The first tick fires
/// immediately, so the store has data before the first interval elapses.
pub fn spawn(manager: Arc<Manager>, settings: Settings) -> JoinHandle<()> {
    tokio::spawn(async move {
        // a zero interval would panic; clamp to one second
        let period = settings.fetch_interval().max(std::time::Duration::from_secs(1));
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            info!("starting scheduled refresh");
            let outcomes = manager.refresh_all(settings.refresh_deadline()).await;
            let ok = outcomes.values().filter(|o| o.success).count();
            info!(ok, total = outcomes.len(), "scheduled refresh complete");

            let stats = manager.stats();
            let now = now_ms();
            if stats.should_log(now, settings.stats_log_sec) {
                let snap = stats.snapshot(now);
                info!(
                    up_sec = snap.up_sec,
                    refreshes = snap.refreshes,
                    fetches_ok = snap.fetches_ok,
                    fetches_failed = snap.fetches_failed,
                    matches = snap.matches_last_refresh,
                    quotes = snap.quotes_last_refresh,
                    "fetch stats"
                );
                stats.mark_logged(now);
            }
        }
    })
}
