use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::api::latency::LatencyStats;
use crate::detector::cooldown::now_ms;
use crate::state::ScanBoard;
use crate::types::AnalyzedOpportunity;

#[derive(Clone)]
pub struct ApiState {
    pub board: Arc<ScanBoard>,
    pub latency: Arc<LatencyStats>,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(get_health))
        .route("/opportunities", get(get_opportunities))
        .route("/stats/summary", get(get_stats_summary))
        .route("/stats/latency", get(get_stats_latency))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub uptime_secs: u64,
    pub scans: u64,
    /// Epoch ms, None before the first cycle completes.
    pub last_scan_at_ms: Option<u64>,
    pub errors: u64,
}

#[derive(Serialize)]
pub struct SummaryResponse {
    pub scans: u64,
    pub skipped_scans: u64,
    pub opinion_records: u64,
    pub polymarket_records: u64,
    pub matched_pairs_last_cycle: u64,
    pub opportunities_found: u64,
    pub notifications_sent: u64,
}

#[derive(Serialize)]
pub struct LatencyResponse {
    pub samples: u64,
    pub p50_ms: Option<u64>,
    pub p95_ms: Option<u64>,
    pub p99_ms: Option<u64>,
    pub max_ms: Option<u64>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn get_health(State(state): State<ApiState>) -> Json<HealthResponse> {
    let s = state.board.snapshot();
    Json(HealthResponse {
        status: "ok",
        uptime_secs: now_ms().saturating_sub(s.started_at_ms) / 1000,
        scans: s.scans,
        last_scan_at_ms: (s.last_scan_at_ms > 0).then_some(s.last_scan_at_ms),
        errors: s.errors,
    })
}

async fn get_opportunities(State(state): State<ApiState>) -> Json<Vec<AnalyzedOpportunity>> {
    Json(state.board.latest_opportunities())
}

async fn get_stats_summary(State(state): State<ApiState>) -> Json<SummaryResponse> {
    let s = state.board.snapshot();
    Json(SummaryResponse {
        scans: s.scans,
        skipped_scans: s.skipped_scans,
        opinion_records: s.opinion_records,
        polymarket_records: s.polymarket_records,
        matched_pairs_last_cycle: s.last_matched_pairs,
        opportunities_found: s.opportunities_found,
        notifications_sent: s.notifications_sent,
    })
}

async fn get_stats_latency(State(state): State<ApiState>) -> Json<LatencyResponse> {
    let (p50_ms, p95_ms, p99_ms) = state.latency.percentiles();
    Json(LatencyResponse {
        samples: state.latency.len(),
        p50_ms,
        p95_ms,
        p99_ms,
        max_ms: state.latency.max_ms(),
    })
}
