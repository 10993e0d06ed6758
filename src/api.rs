//! HTTP surface over the manager: read-only odds/status queries plus a
//! manual refresh trigger. All state lives in the manager; handlers only
//! serialize it.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::Method;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::manager::Manager;

#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<Manager>,
    /// Deadline handed to manually triggered refresh runs.
    pub refresh_deadline: Duration,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/odds/best", get(get_best_odds))
        .route("/api/v1/odds/stats", get(get_odds_stats))
        .route("/api/v1/fetch/outcomes", get(get_fetch_outcomes))
        .route("/api/v1/fetch/trigger", post(trigger_fetch))
        .route("/api/v1/sites", get(get_sites))
        .route("/api/v1/sites/status", get(get_sites_status))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now(),
        "service": "odds-aggregator",
    }))
}

async fn get_best_odds(State(state): State<AppState>) -> Json<Value> {
    let best = state.manager.best_odds().await;
    Json(json!({
        "success": true,
        "count": best.len(),
        "data": best,
    }))
}

async fn get_odds_stats(State(state): State<AppState>) -> Json<Value> {
    let best = state.manager.best_odds().await;

    // average best price per market, ignoring matches where the market is absent
    let mut sums = [Decimal::ZERO; 3];
    let mut counts = [0u32; 3];
    for b in &best {
        let markets = [&b.best_home_win, &b.best_draw, &b.best_away_win];
        for (i, market) in markets.into_iter().enumerate() {
            if let Some(cmp) = market {
                sums[i] += cmp.value;
                counts[i] += 1;
            }
        }
    }
    let avg = |i: usize| {
        if counts[i] > 0 {
            sums[i] / Decimal::from(counts[i])
        } else {
            Decimal::ZERO
        }
    };

    Json(json!({
        "success": true,
        "data": {
            "total_matches": best.len(),
            "total_sites": state.manager.sites().len(),
            "average_home_odds": avg(0),
            "average_draw_odds": avg(1),
            "average_away_odds": avg(2),
            "last_updated": Utc::now(),
        },
    }))
}

async fn get_fetch_outcomes(State(state): State<AppState>) -> Json<Value> {
    let history = state.manager.outcome_history().await;
    Json(json!({
        "success": true,
        "data": history,
    }))
}

async fn trigger_fetch(State(state): State<AppState>) -> Json<Value> {
    let outcomes = state.manager.refresh_all(state.refresh_deadline).await;
    Json(json!({
        "success": true,
        "message": "refresh completed",
        "results": outcomes,
    }))
}

async fn get_sites(State(state): State<AppState>) -> Json<Value> {
    let sites = state.manager.sites();
    Json(json!({
        "success": true,
        "data": sites,
    }))
}

async fn get_sites_status(State(state): State<AppState>) -> Json<Value> {
    let latest = state.manager.latest_outcomes().await;

    let sites: Vec<Value> = state
        .manager
        .sites()
        .into_iter()
        .map(|site| {
            let status = match latest.get(&site.id) {
                Some(o) => json!({
                    "active": o.success,
                    "last_fetch": o.completed_at,
                    "match_count": o.match_count,
                    "quote_count": o.quote_count,
                    "error": o.error.clone(),
                }),
                None => json!({
                    "active": false,
                    "last_fetch": null,
                    "match_count": 0,
                    "quote_count": 0,
                    "error": "no data available",
                }),
            };
            json!({
                "id": site.id,
                "name": site.name,
                "url": site.url,
                "status": status,
            })
        })
        .collect();

    Json(json!({
        "success": true,
        "data": sites,
    }))
}
