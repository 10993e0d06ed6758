use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use futures::{stream, StreamExt};
use tracing::{info, warn};

use crate::aggregate;
use crate::models::{BestOdds, FetchOutcome, SiteIdentity};
use crate::source::OddsSource;
use crate::stats::{now_ms, FetchStats};
use crate::store::OddsStore;

/// Owns the adapter registry and the aggregation store, and coordinates
/// refresh runs across all registered sources.
pub struct Manager {
    sources: HashMap<String, Arc<dyn OddsSource>>,
    store: Arc<OddsStore>,
    stats: Arc<FetchStats>,
    max_concurrent_fetches: usize,
    request_timeout: Duration,
}

impl Manager {
    pub fn new(max_concurrent_fetches: usize, request_timeout: Duration) -> Self {
        Self {
            sources: HashMap::new(),
            store: Arc::new(OddsStore::new()),
            stats: FetchStats::new(now_ms()),
            max_concurrent_fetches: max_concurrent_fetches.max(1),
            request_timeout,
        }
    }

    /// Register an adapter under its site id. A second registration with the
    /// same id silently replaces the first. Registration happens at startup,
    /// before any refresh runs.
    pub fn register_source(&mut self, source: Arc<dyn OddsSource>) {
        let site = source.site();
        if self.sources.insert(site.id.clone(), source).is_some() {
            warn!(site_id = %site.id, "replacing previously registered source");
        } else {
            info!(site_id = %site.id, site_name = %site.name, "registered source");
        }
    }

    /// Identities of all registered sites.
    pub fn sites(&self) -> Vec<SiteIdentity> {
        self.sources.values().map(|s| s.site()).collect()
    }

    pub fn stats(&self) -> Arc<FetchStats> {
        self.stats.clone()
    }

    /// Run one fetch per registered source with at most
    /// `max_concurrent_fetches` in flight, each bounded by
    /// `min(remaining deadline, request_timeout)`.
    ///
    /// Always returns exactly one outcome per source: adapter errors,
    /// timeouts and panics all surface as failed outcomes, never as errors,
    /// and a failed fetch leaves that source's stored data untouched.
    ///
    /// The deadline covers the whole run, so late-admitted sources see less
    /// of it; callers should allow at least roughly
    /// `sources * request_timeout / max_concurrent_fetches`.
    pub async fn refresh_all(&self, deadline: Duration) -> HashMap<String, FetchOutcome> {
        let parent_deadline = Instant::now() + deadline;

        let sources: Vec<(String, Arc<dyn OddsSource>)> = self
            .sources
            .iter()
            .map(|(id, source)| (id.clone(), source.clone()))
            .collect();

        let store = self.store.clone();
        let request_timeout = self.request_timeout;

        let fetches: Vec<_> = sources
            .into_iter()
            .map(|(id, source)| {
                run_one(
                    id,
                    source,
                    store.clone(),
                    parent_deadline,
                    request_timeout,
                )
            })
            .collect();

        let outcomes: HashMap<String, FetchOutcome> = stream::iter(fetches)
            .buffer_unordered(self.max_concurrent_fetches)
            .collect()
            .await;

        let ok = outcomes.values().filter(|o| o.success).count() as u64;
        let failed = outcomes.len() as u64 - ok;
        let matches: u64 = outcomes.values().map(|o| o.match_count as u64).sum();
        let quotes: u64 = outcomes.values().map(|o| o.quote_count as u64).sum();
        self.stats.record_refresh(ok, failed, matches, quotes);

        info!(ok, total = outcomes.len(), "refresh complete");
        outcomes
    }

    /// Best price per market for every stored match. Pure read over a store
    /// snapshot; a merge landing right after the snapshot is picked up by
    /// the next call.
    pub async fn best_odds(&self) -> Vec<BestOdds> {
        let (matches, quotes_by_source) = self.store.snapshot().await;
        aggregate::best_odds(&matches, &quotes_by_source)
    }

    /// Bounded fetch history per source, oldest first.
    pub async fn outcome_history(&self) -> HashMap<String, Vec<FetchOutcome>> {
        self.store.outcome_history().await
    }

    /// Most recent outcome per source.
    pub async fn latest_outcomes(&self) -> HashMap<String, FetchOutcome> {
        self.store.latest_outcomes().await
    }
}

/// Run one source's fetch to completion and record its outcome, returning the
/// `(id, outcome)` pair for collection. Spawned internally so a panicking
/// adapter becomes a `JoinError` instead of unwinding through the join barrier.
async fn run_one(
    id: String,
    source: Arc<dyn OddsSource>,
    store: Arc<OddsStore>,
    parent_deadline: Instant,
    request_timeout: Duration,
) -> (String, FetchOutcome) {
    let handle = tokio::spawn(fetch_one(
        id.clone(),
        source,
        store.clone(),
        parent_deadline,
        request_timeout,
    ));
    let outcome = match handle.await {
        Ok(outcome) => outcome,
        Err(err) => FetchOutcome {
            source_id: id.clone(),
            success: false,
            match_count: 0,
            quote_count: 0,
            error: Some(format!("fetch task panicked: {err}")),
            elapsed_ms: 0,
            completed_at: Utc::now(),
        },
    };
    store.append_outcome(outcome.clone()).await;
    (id, outcome)
}

/// One source's fetch: derive the task budget, run the adapter under it,
/// merge on success. The outcome is appended by the caller after this
/// returns, so a recorded success already has its data visible.
async fn fetch_one(
    source_id: String,
    source: Arc<dyn OddsSource>,
    store: Arc<OddsStore>,
    parent_deadline: Instant,
    request_timeout: Duration,
) -> FetchOutcome {
    let start = Instant::now();
    let budget = parent_deadline
        .saturating_duration_since(start)
        .min(request_timeout);

    let result = tokio::time::timeout(budget, source.fetch_odds(budget)).await;
    let elapsed_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(Ok((matches, quotes))) => {
            let (match_count, quote_count) = (matches.len(), quotes.len());
            store.merge_fetch(&source_id, matches, quotes).await;
            info!(
                site_id = %source_id,
                matches = match_count,
                quotes = quote_count,
                elapsed_ms,
                "fetch succeeded"
            );
            FetchOutcome {
                source_id,
                success: true,
                match_count,
                quote_count,
                error: None,
                elapsed_ms,
                completed_at: Utc::now(),
            }
        }
        Ok(Err(err)) => {
            warn!(site_id = %source_id, error = %err, elapsed_ms, "fetch failed");
            FetchOutcome {
                source_id,
                success: false,
                match_count: 0,
                quote_count: 0,
                error: Some(format!("{err:#}")),
                elapsed_ms,
                completed_at: Utc::now(),
            }
        }
        Err(_) => {
            warn!(site_id = %source_id, elapsed_ms, "fetch timed out");
            FetchOutcome {
                source_id,
                success: false,
                match_count: 0,
                quote_count: 0,
                error: Some(format!("deadline exceeded after {elapsed_ms}ms")),
                elapsed_ms,
                completed_at: Utc::now(),
            }
        }
    }
}
