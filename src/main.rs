mod analysis;
mod api;
mod config;
mod detector;
mod error;
mod keywords;
mod matcher;
mod notify;
mod scan;
mod state;
mod types;
mod venues;

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::api::routes::{router, ApiState};
use crate::api::LatencyStats;
use crate::config::Config;
use crate::detector::cooldown::now_ms;
use crate::error::Result;
use crate::matcher::manual::{default_mappings, load_mappings};
use crate::matcher::MarketMatcher;
use crate::notify::{should_notify_error, Notifier};
use crate::scan::ScanPipeline;
use crate::state::ScanBoard;
use crate::venues::{OpinionClient, PolymarketClient};

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    cfg.log_summary();

    // --- Matcher setup ---
    let mappings = match &cfg.manual_mappings_path {
        Some(path) => {
            let mappings = load_mappings(path)?;
            info!("[MATCHER] loaded mapping table from {path}");
            mappings
        }
        None => default_mappings(),
    };
    let matcher = MarketMatcher::new(mappings);
    info!("[MATCHER] {} manual mappings active", matcher.mappings().len());
    let mut pipeline = ScanPipeline::new(&cfg, matcher);

    // --- Venue clients ---
    let opinion = OpinionClient::new(&cfg.opinion_api_url)?;
    let polymarket = PolymarketClient::new(&cfg.gamma_api_url)?;
    let notifier = Notifier::new(&cfg)?;

    // --- Shared state ---
    let board = ScanBoard::new(now_ms());
    let latency = Arc::new(LatencyStats::new()?);

    // --- HTTP API server ---
    let api_state = ApiState {
        board: Arc::clone(&board),
        latency: Arc::clone(&latency),
    };
    let bind_addr = format!("0.0.0.0:{}", cfg.api_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("HTTP API listening on {bind_addr}");
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router(api_state)).await {
            error!("HTTP API stopped: {e}");
        }
    });

    if notifier.notify_startup(&cfg).await {
        board.add_notifications_sent(1);
    }

    // --- Scan loop ---
    let mut ticker = tokio::time::interval(Duration::from_millis(cfg.poll_interval_ms.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let started = Instant::now();

        let (opinion_records, polymarket_records) =
            tokio::join!(opinion.fetch_all(), polymarket.fetch_all());

        let outcome = pipeline.evaluate(&opinion_records, &polymarket_records);
        latency.record(started.elapsed());
        board.record_scan(
            opinion_records.len(),
            polymarket_records.len(),
            &outcome,
            now_ms(),
        );

        if outcome.skipped {
            let errors = board.record_error();
            warn!(errors, "[SCAN] cycle skipped: a venue returned no data");
            if should_notify_error(errors) {
                let msg = format!(
                    "Venue data unavailable (Opinion: {} records, Polymarket: {} records)",
                    opinion_records.len(),
                    polymarket_records.len(),
                );
                if notifier.notify_error(&msg).await {
                    board.add_notifications_sent(1);
                }
            }
            continue;
        }

        if outcome.worthy.is_empty() {
            info!(
                matched = outcome.matched,
                detected = outcome.detected,
                fresh = outcome.fresh,
                "[SCAN] no new opportunities this cycle",
            );
            continue;
        }

        info!(
            worthy = outcome.worthy.len(),
            "[SCAN] {} new opportunities",
            outcome.worthy.len()
        );
        let sent = notifier.notify_opportunities(&outcome.worthy).await;
        board.add_notifications_sent(sent);
    }
}
