use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use odds_aggregator::api::{self, AppState};
use odds_aggregator::config::Settings;
use odds_aggregator::manager::Manager;
use odds_aggregator::scheduler;
use odds_aggregator::source::{DemoSource, WebSource};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let settings = Settings::from_env()?;

    let mut manager = Manager::new(settings.max_concurrent_fetches, settings.request_timeout());
    if settings.demo_mode {
        manager.register_source(Arc::new(DemoSource::new("betika", "Betika")));
        manager.register_source(Arc::new(DemoSource::new("sportpesa", "SportPesa")));
        manager.register_source(Arc::new(DemoSource::new("betway", "Betway")));
        manager.register_source(Arc::new(DemoSource::new("odibets", "Odibets")));
    } else {
        manager.register_source(Arc::new(WebSource::betika()));
        manager.register_source(Arc::new(WebSource::sportpesa()));
        manager.register_source(Arc::new(WebSource::betway()));
        manager.register_source(Arc::new(WebSource::odibets()));
    }
    let manager = Arc::new(manager);

    scheduler::spawn(manager.clone(), settings.clone());

    let app = api::router(AppState {
        manager,
        refresh_deadline: settings.refresh_deadline(),
    });

    let addr = format!("0.0.0.0:{}", settings.port);
    tracing::info!(%addr, demo_mode = settings.demo_mode, "starting server");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
