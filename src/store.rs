use std::collections::{HashMap, VecDeque};

use tokio::sync::RwLock;

use crate::models::{FetchOutcome, Match, Quote};

/// Fetch outcomes retained per source; the oldest entry is evicted first.
pub const OUTCOME_HISTORY_CAP: usize = 10;

#[derive(Default)]
struct StoreInner {
    matches: HashMap<String, Match>,
    quotes_by_source: HashMap<String, Vec<Quote>>,
    outcomes: HashMap<String, VecDeque<FetchOutcome>>,
}

/// In-memory tables of matches-by-id, quotes-by-source and per-source fetch
/// history, behind a single reader/writer lock. Accessors hand out copies;
/// the internal maps never escape.
#[derive(Default)]
pub struct OddsStore {
    inner: RwLock<StoreInner>,
}

impl OddsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert every match by id and replace `source_id`'s quote set
    /// wholesale. One source's merge is atomic with respect to readers.
    pub async fn merge_fetch(&self, source_id: &str, matches: Vec<Match>, quotes: Vec<Quote>) {
        let mut inner = self.inner.write().await;
        for m in matches {
            inner.matches.insert(m.id.clone(), m);
        }
        inner.quotes_by_source.insert(source_id.to_string(), quotes);
    }

    /// Append to the owning source's outcome history, evicting the oldest
    /// entry once the cap is exceeded.
    pub async fn append_outcome(&self, outcome: FetchOutcome) {
        let mut inner = self.inner.write().await;
        let history = inner.outcomes.entry(outcome.source_id.clone()).or_default();
        history.push_back(outcome);
        if history.len() > OUTCOME_HISTORY_CAP {
            history.pop_front();
        }
    }

    /// Copy of the full outcome history, oldest first per source.
    pub async fn outcome_history(&self) -> HashMap<String, Vec<FetchOutcome>> {
        let inner = self.inner.read().await;
        inner
            .outcomes
            .iter()
            .map(|(id, h)| (id.clone(), h.iter().cloned().collect()))
            .collect()
    }

    /// Most recent outcome per source.
    pub async fn latest_outcomes(&self) -> HashMap<String, FetchOutcome> {
        let inner = self.inner.read().await;
        inner
            .outcomes
            .iter()
            .filter_map(|(id, h)| h.back().map(|o| (id.clone(), o.clone())))
            .collect()
    }

    /// Copies of the match table and per-source quote sets. The lock is held
    /// only for the copy, not for whatever the caller computes on it.
    pub async fn snapshot(&self) -> (HashMap<String, Match>, HashMap<String, Vec<Quote>>) {
        let inner = self.inner.read().await;
        (inner.matches.clone(), inner.quotes_by_source.clone())
    }
}
