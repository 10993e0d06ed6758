use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default = "default_port")]
    pub port: u16,

    /// Seconds between scheduled refresh runs.
    #[serde(default = "default_fetch_interval_sec")]
    pub fetch_interval_sec: u64,

    /// Maximum fetches in flight at once during a refresh.
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,

    /// Per-source fetch timeout in seconds.
    #[serde(default = "default_request_timeout_sec")]
    pub request_timeout_sec: u64,

    /// Overall deadline for one refresh run in seconds.
    #[serde(default = "default_refresh_deadline_sec")]
    pub refresh_deadline_sec: u64,

    /// Register synthetic demo sources instead of the real sites.
    #[serde(default = "default_demo_mode")]
    pub demo_mode: bool,

    /// Seconds between fetch-stats log lines; 0 disables them.
    #[serde(default = "default_stats_log_sec")]
    pub stats_log_sec: u64,
}

fn default_port() -> u16 {
    8080
}

fn default_fetch_interval_sec() -> u64 {
    300
}

fn default_max_concurrent_fetches() -> usize {
    5
}

fn default_request_timeout_sec() -> u64 {
    30
}

fn default_refresh_deadline_sec() -> u64 {
    300
}

fn default_demo_mode() -> bool {
    true
}

fn default_stats_log_sec() -> u64 {
    60
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let c = config::Config::builder()
            .add_source(config::Environment::default())
            .build()?;
        Ok(c.try_deserialize()?)
    }

    pub fn fetch_interval(&self) -> Duration {
        Duration::from_secs(self.fetch_interval_sec)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_sec)
    }

    pub fn refresh_deadline(&self) -> Duration {
        Duration::from_secs(self.refresh_deadline_sec)
    }
}
