use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use super::{sample, OddsSource};
use crate::models::{Match, Quote, SiteIdentity};

/// Adapter that fabricates odds without touching the network, keeping the
/// full pipeline runnable offline. Registered when `demo_mode` is set.
pub struct DemoSource {
    site: SiteIdentity,
}

impl DemoSource {
    pub fn new(site_id: &str, site_name: &str) -> Self {
        Self {
            site: SiteIdentity {
                id: site_id.to_string(),
                name: site_name.to_string(),
                url: format!("https://www.{site_id}.com"),
                active: true,
            },
        }
    }
}

#[async_trait]
impl OddsSource for DemoSource {
    fn site(&self) -> SiteIdentity {
        self.site.clone()
    }

    async fn fetch_odds(&self, budget: Duration) -> anyhow::Result<(Vec<Match>, Vec<Quote>)> {
        // Simulated upstream latency, never more than half the budget.
        let delay = Duration::from_millis(rand::thread_rng().gen_range(500..2500));
        tokio::time::sleep(delay.min(budget / 2)).await;

        Ok(sample::batch(&self.site))
    }
}
