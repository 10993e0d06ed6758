use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Descriptor for one tracked betting site. Created once at adapter
/// registration and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteIdentity {
    pub id: String,
    pub name: String,
    pub url: String,
    pub active: bool,
}

/// A sports match as reported by one source. Ids are source-namespaced;
/// a later fetch of the same id overwrites the whole record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: String,
    pub home_team: String,
    pub away_team: String,
    pub sport: String,
    pub league: String,
    pub start_time: DateTime<Utc>,
    pub status: String,
}

/// One site's complete price set for one match at one observation time.
/// Immutable once created; a fetch replaces its source's full quote set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub id: Uuid,
    pub match_id: String,
    pub source_id: String,
    pub source_name: String,
    pub home_win: Decimal,
    /// `None` (or zero) means the site does not offer the draw market.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draw: Option<Decimal>,
    pub away_win: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub over_2_5: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub under_2_5: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub btts: Option<Decimal>,
    pub quoted_at: DateTime<Utc>,
}

/// Audit record of one attempt to refresh one source's data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchOutcome {
    pub source_id: String,
    pub success: bool,
    pub match_count: usize,
    pub quote_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub elapsed_ms: u64,
    pub completed_at: DateTime<Utc>,
}

/// Best price seen for one market, with the site that posted it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceComparison {
    pub value: Decimal,
    pub source_id: String,
    pub source_name: String,
}

/// Per-match rollup of the maximum observed price per market across sites.
/// Derived on demand from the store, never kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestOdds {
    #[serde(rename = "match")]
    pub match_info: Match,
    pub best_home_win: Option<PriceComparison>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_draw: Option<PriceComparison>,
    pub best_away_win: Option<PriceComparison>,
    pub all_odds: Vec<Quote>,
    pub updated_at: DateTime<Utc>,
}
