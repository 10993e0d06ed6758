//! End-to-end tests of the fetch orchestration through the public manager
//! surface, using stub adapters.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::bail;
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use odds_aggregator::manager::Manager;
use odds_aggregator::models::{Match, Quote, SiteIdentity};
use odds_aggregator::source::OddsSource;
use odds_aggregator::store::OUTCOME_HISTORY_CAP;

fn site(id: &str) -> SiteIdentity {
    SiteIdentity {
        id: id.to_string(),
        name: id.to_uppercase(),
        url: format!("https://www.{id}.com"),
        active: true,
    }
}

fn sample_match(id: &str, home: &str, away: &str) -> Match {
    Match {
        id: id.to_string(),
        home_team: home.to_string(),
        away_team: away.to_string(),
        sport: "football".to_string(),
        league: "Premier League".to_string(),
        start_time: Utc::now(),
        status: "upcoming".to_string(),
    }
}

fn quote(
    match_id: &str,
    source: &SiteIdentity,
    home: Decimal,
    draw: Option<Decimal>,
    away: Decimal,
) -> Quote {
    Quote {
        id: Uuid::new_v4(),
        match_id: match_id.to_string(),
        source_id: source.id.clone(),
        source_name: source.name.clone(),
        home_win: home,
        draw,
        away_win: away,
        over_2_5: None,
        under_2_5: None,
        btts: None,
        quoted_at: Utc::now(),
    }
}

/// Returns the same batch on every fetch.
struct StaticSource {
    site: SiteIdentity,
    matches: Vec<Match>,
    quotes: Vec<Quote>,
}

impl StaticSource {
    fn new(site: SiteIdentity, matches: Vec<Match>, quotes: Vec<Quote>) -> Self {
        Self { site, matches, quotes }
    }
}

#[async_trait]
impl OddsSource for StaticSource {
    fn site(&self) -> SiteIdentity {
        self.site.clone()
    }

    async fn fetch_odds(&self, _budget: Duration) -> anyhow::Result<(Vec<Match>, Vec<Quote>)> {
        Ok((self.matches.clone(), self.quotes.clone()))
    }
}

/// Fails every fetch.
struct FailingSource {
    site: SiteIdentity,
}

#[async_trait]
impl OddsSource for FailingSource {
    fn site(&self) -> SiteIdentity {
        self.site.clone()
    }

    async fn fetch_odds(&self, _budget: Duration) -> anyhow::Result<(Vec<Match>, Vec<Quote>)> {
        bail!("connection refused")
    }
}

/// Succeeds on the first fetch, fails afterwards.
struct FlakySource {
    site: SiteIdentity,
    matches: Vec<Match>,
    quotes: Vec<Quote>,
    calls: AtomicUsize,
}

#[async_trait]
impl OddsSource for FlakySource {
    fn site(&self) -> SiteIdentity {
        self.site.clone()
    }

    async fn fetch_odds(&self, _budget: Duration) -> anyhow::Result<(Vec<Match>, Vec<Quote>)> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            Ok((self.matches.clone(), self.quotes.clone()))
        } else {
            bail!("site temporarily unavailable")
        }
    }
}

/// Reports n matches on the n-th fetch, to make history entries orderable.
struct CountUpSource {
    site: SiteIdentity,
    calls: AtomicUsize,
}

#[async_trait]
impl OddsSource for CountUpSource {
    fn site(&self) -> SiteIdentity {
        self.site.clone()
    }

    async fn fetch_odds(&self, _budget: Duration) -> anyhow::Result<(Vec<Match>, Vec<Quote>)> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let matches = (0..n)
            .map(|i| sample_match(&format!("{}_m{i}", self.site.id), "X", "Y"))
            .collect();
        Ok((matches, Vec::new()))
    }
}

/// Records the number of concurrently running fetches.
struct CountingSource {
    site: SiteIdentity,
    live: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

#[async_trait]
impl OddsSource for CountingSource {
    fn site(&self) -> SiteIdentity {
        self.site.clone()
    }

    async fn fetch_odds(&self, _budget: Duration) -> anyhow::Result<(Vec<Match>, Vec<Quote>)> {
        let live = self.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(live, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        self.live.fetch_sub(1, Ordering::SeqCst);
        Ok((Vec::new(), Vec::new()))
    }
}

/// Ignores its budget and blocks far past any sane deadline.
struct BlockingSource {
    site: SiteIdentity,
}

#[async_trait]
impl OddsSource for BlockingSource {
    fn site(&self) -> SiteIdentity {
        self.site.clone()
    }

    async fn fetch_odds(&self, _budget: Duration) -> anyhow::Result<(Vec<Match>, Vec<Quote>)> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok((Vec::new(), Vec::new()))
    }
}

struct PanickingSource {
    site: SiteIdentity,
}

#[async_trait]
impl OddsSource for PanickingSource {
    fn site(&self) -> SiteIdentity {
        self.site.clone()
    }

    async fn fetch_odds(&self, _budget: Duration) -> anyhow::Result<(Vec<Match>, Vec<Quote>)> {
        panic!("adapter bug")
    }
}

#[tokio::test]
async fn one_outcome_per_source_even_when_some_fail() {
    let a = site("a");
    let b = site("b");

    let mut manager = Manager::new(5, Duration::from_secs(5));
    manager.register_source(Arc::new(StaticSource::new(
        a.clone(),
        vec![sample_match("a_m1", "X", "Y")],
        vec![quote("a_m1", &a, dec!(2.0), Some(dec!(3.0)), dec!(3.5))],
    )));
    manager.register_source(Arc::new(FailingSource { site: b }));

    let outcomes = manager.refresh_all(Duration::from_secs(5)).await;

    assert_eq!(outcomes.len(), 2);
    assert!(outcomes["a"].success);
    assert_eq!(outcomes["a"].match_count, 1);
    assert_eq!(outcomes["a"].quote_count, 1);

    assert!(!outcomes["b"].success);
    let err = outcomes["b"].error.as_deref().unwrap();
    assert!(err.contains("connection refused"), "unexpected error: {err}");
    assert_eq!(outcomes["b"].match_count, 0);
}

#[tokio::test]
async fn concurrent_fetches_never_exceed_cap() {
    let live = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let mut manager = Manager::new(3, Duration::from_secs(5));
    for i in 0..8 {
        manager.register_source(Arc::new(CountingSource {
            site: site(&format!("s{i}")),
            live: live.clone(),
            peak: peak.clone(),
        }));
    }

    let outcomes = manager.refresh_all(Duration::from_secs(10)).await;

    assert_eq!(outcomes.len(), 8);
    assert!(outcomes.values().all(|o| o.success));
    let peak = peak.load(Ordering::SeqCst);
    assert!(peak <= 3, "in-flight fetches peaked at {peak}");
    assert_eq!(live.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn failed_fetch_preserves_previous_data() {
    let a = site("a");
    let m = sample_match("a_m1", "X", "Y");
    let q = quote("a_m1", &a, dec!(2.0), Some(dec!(3.0)), dec!(3.5));

    let mut manager = Manager::new(5, Duration::from_secs(5));
    manager.register_source(Arc::new(FlakySource {
        site: a,
        matches: vec![m],
        quotes: vec![q],
        calls: AtomicUsize::new(0),
    }));

    let first = manager.refresh_all(Duration::from_secs(5)).await;
    assert!(first["a"].success);
    assert_eq!(manager.best_odds().await.len(), 1);

    let second = manager.refresh_all(Duration::from_secs(5)).await;
    assert!(!second["a"].success);

    let best = manager.best_odds().await;
    assert_eq!(best.len(), 1, "failed fetch must not wipe stored data");
    assert_eq!(best[0].match_info.id, "a_m1");
    assert_eq!(best[0].all_odds.len(), 1);

    let history = manager.outcome_history().await;
    let flags: Vec<bool> = history["a"].iter().map(|o| o.success).collect();
    assert_eq!(flags, vec![true, false]);
}

#[tokio::test]
async fn outcome_history_keeps_only_newest_ten() {
    let mut manager = Manager::new(5, Duration::from_secs(5));
    manager.register_source(Arc::new(CountUpSource {
        site: site("a"),
        calls: AtomicUsize::new(0),
    }));

    for _ in 0..11 {
        manager.refresh_all(Duration::from_secs(5)).await;
    }

    let history = manager.outcome_history().await;
    let entries = &history["a"];
    assert_eq!(entries.len(), OUTCOME_HISTORY_CAP);
    let counts: Vec<usize> = entries.iter().map(|o| o.match_count).collect();
    assert_eq!(counts, (2..=11).collect::<Vec<_>>(), "oldest entry evicted first");
}

#[tokio::test]
async fn best_odds_merge_across_sources_with_zero_draw() {
    let a = site("a");
    let b = site("b");

    let mut manager = Manager::new(5, Duration::from_secs(5));
    manager.register_source(Arc::new(StaticSource::new(
        a.clone(),
        vec![sample_match("m1", "X", "Y")],
        vec![quote("m1", &a, dec!(2.0), Some(dec!(3.0)), dec!(3.5))],
    )));
    manager.register_source(Arc::new(StaticSource::new(
        b.clone(),
        vec![sample_match("m1", "X", "Y")],
        vec![quote("m1", &b, dec!(2.2), Some(dec!(0)), dec!(3.3))],
    )));

    manager.refresh_all(Duration::from_secs(5)).await;
    let best = manager.best_odds().await;

    assert_eq!(best.len(), 1);
    let m1 = &best[0];
    assert_eq!(m1.match_info.id, "m1");
    assert_eq!(m1.best_home_win.as_ref().unwrap().value, dec!(2.2));
    assert_eq!(m1.best_home_win.as_ref().unwrap().source_id, "b");
    assert_eq!(m1.best_draw.as_ref().unwrap().value, dec!(3.0));
    assert_eq!(m1.best_draw.as_ref().unwrap().source_id, "a");
    assert_eq!(m1.best_away_win.as_ref().unwrap().value, dec!(3.5));
    assert_eq!(m1.best_away_win.as_ref().unwrap().source_id, "a");
    assert_eq!(m1.all_odds.len(), 2);
}

#[tokio::test]
async fn blocking_source_times_out_without_stalling_the_run() {
    let mut manager = Manager::new(5, Duration::from_millis(200));
    manager.register_source(Arc::new(BlockingSource { site: site("slow") }));

    let started = Instant::now();
    let outcomes = manager.refresh_all(Duration::from_millis(500)).await;
    let elapsed = started.elapsed();

    assert!(
        elapsed < Duration::from_secs(2),
        "refresh took {elapsed:?}, deadline was 500ms"
    );
    let slow = &outcomes["slow"];
    assert!(!slow.success);
    let err = slow.error.as_deref().unwrap();
    assert!(err.contains("deadline exceeded"), "unexpected error: {err}");
}

#[tokio::test]
async fn panicking_source_is_a_failed_outcome_not_a_crash() {
    let a = site("a");

    let mut manager = Manager::new(5, Duration::from_secs(5));
    manager.register_source(Arc::new(PanickingSource { site: site("bad") }));
    manager.register_source(Arc::new(StaticSource::new(
        a.clone(),
        vec![sample_match("a_m1", "X", "Y")],
        vec![quote("a_m1", &a, dec!(2.0), Some(dec!(3.0)), dec!(3.5))],
    )));

    let outcomes = manager.refresh_all(Duration::from_secs(5)).await;

    assert_eq!(outcomes.len(), 2);
    assert!(outcomes["a"].success);
    assert!(!outcomes["bad"].success);
    let err = outcomes["bad"].error.as_deref().unwrap();
    assert!(err.contains("panicked"), "unexpected error: {err}");
}

#[tokio::test]
async fn duplicate_registration_replaces_earlier_source() {
    let mut manager = Manager::new(5, Duration::from_secs(5));

    let first = site("a");
    let mut second = site("a");
    second.name = "A Prime".to_string();

    manager.register_source(Arc::new(StaticSource::new(first, Vec::new(), Vec::new())));
    manager.register_source(Arc::new(StaticSource::new(second, Vec::new(), Vec::new())));

    let sites = manager.sites();
    assert_eq!(sites.len(), 1);
    assert_eq!(sites[0].name, "A Prime");
}
