pub mod demo;
mod sample;
pub mod web;

use std::time::Duration;

use async_trait::async_trait;

use crate::models::{Match, Quote, SiteIdentity};

/// Abstraction over one betting site's odds feed (demo data, page loads,
/// upstream APIs).
///
/// `fetch_odds` receives the time budget the caller grants it and should
/// return within that window. The orchestrator additionally drops the fetch
/// future once the budget elapses, so implementations only need to be
/// cancel-safe at their await points; blocking a runtime thread past the
/// budget is the one thing an adapter must not do. The manager issues at
/// most one in-flight fetch per adapter instance.
#[async_trait]
pub trait OddsSource: Send + Sync {
    /// Identity of the site this adapter serves. Idempotent, no side effects.
    fn site(&self) -> SiteIdentity;

    /// Fetch the site's current matches and price quotes.
    async fn fetch_odds(&self, budget: Duration) -> anyhow::Result<(Vec<Match>, Vec<Quote>)>;
}

pub use demo::DemoSource;
pub use web::WebSource;
