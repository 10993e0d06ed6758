use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub fn now_ms() -> u64 {
    chrono::Utc::now().timestamp_millis() as u64
}

/// Process-lifetime fetch counters, updated by the manager after each
/// refresh and logged periodically by the scheduler.
#[derive(Default)]
pub struct FetchStats {
    start_ms: AtomicU64,
    last_log_ms: AtomicU64,

    refreshes: AtomicU64,
    fetches_ok: AtomicU64,
    fetches_failed: AtomicU64,
    matches_last_refresh: AtomicU64,
    quotes_last_refresh: AtomicU64,
}

impl FetchStats {
    pub fn new(now_ms: u64) -> Arc<Self> {
        let s = Arc::new(Self::default());
        s.start_ms.store(now_ms, Ordering::Relaxed);
        s.last_log_ms.store(now_ms, Ordering::Relaxed);
        s
    }

    pub fn record_refresh(&self, ok: u64, failed: u64, matches: u64, quotes: u64) {
        self.refreshes.fetch_add(1, Ordering::Relaxed);
        self.fetches_ok.fetch_add(ok, Ordering::Relaxed);
        self.fetches_failed.fetch_add(failed, Ordering::Relaxed);
        self.matches_last_refresh.store(matches, Ordering::Relaxed);
        self.quotes_last_refresh.store(quotes, Ordering::Relaxed);
    }

    pub fn should_log(&self, now_ms: u64, every_sec: u64) -> bool {
        if every_sec == 0 {
            return false;
        }
        let last = self.last_log_ms.load(Ordering::Relaxed);
        now_ms.saturating_sub(last) >= every_sec.saturating_mul(1000)
    }

    pub fn mark_logged(&self, now_ms: u64) {
        self.last_log_ms.store(now_ms, Ordering::Relaxed);
    }

    pub fn snapshot(&self, now_ms: u64) -> FetchStatsSnapshot {
        let start = self.start_ms.load(Ordering::Relaxed);
        FetchStatsSnapshot {
            now_ms,
            up_sec: now_ms.saturating_sub(start) / 1000,
            refreshes: self.refreshes.load(Ordering::Relaxed),
            fetches_ok: self.fetches_ok.load(Ordering::Relaxed),
            fetches_failed: self.fetches_failed.load(Ordering::Relaxed),
            matches_last_refresh: self.matches_last_refresh.load(Ordering::Relaxed),
            quotes_last_refresh: self.quotes_last_refresh.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FetchStatsSnapshot {
    pub now_ms: u64,
    pub up_sec: u64,
    pub refreshes: u64,
    pub fetches_ok: u64,
    pub fetches_failed: u64,
    pub matches_last_refresh: u64,
    pub quotes_last_refresh: u64,
}
