use tracing::{info, warn};

use super::{http_client, id_field, num_field, num_value, str_field};
use crate::config::POLYMARKET_EVENT_LIMIT;
use crate::error::{AppError, Result};
use crate::keywords::polymarket_keywords;
use crate::types::{MarketRecord, Platform};

/// Client for Polymarket's Gamma events listing (venue B).
pub struct PolymarketClient {
    client: reqwest::Client,
    gamma_api_url: String,
}

impl PolymarketClient {
    pub fn new(gamma_api_url: &str) -> Result<Self> {
        Ok(Self {
            client: http_client()?,
            gamma_api_url: gamma_api_url.trim_end_matches('/').to_string(),
        })
    }

    /// One page of active, open events with their nested markets.
    pub async fn fetch_events(&self, limit: usize, offset: usize) -> Result<Vec<serde_json::Value>> {
        let url = format!(
            "{}/events?limit={}&active=true&closed=false&offset={}",
            self.gamma_api_url, limit, offset
        );

        let resp = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(AppError::Venue(format!("Gamma /events returned {}", resp.status())));
        }

        let body: serde_json::Value = resp.json().await?;
        match body.as_array() {
            Some(events) => Ok(events.clone()),
            None => Err(AppError::Venue("Gamma /events response was not an array".to_string())),
        }
    }

    /// All open Polymarket options this cycle. Failures log and yield an empty list.
    pub async fn fetch_all(&self) -> Vec<MarketRecord> {
        let events = match self.fetch_events(POLYMARKET_EVENT_LIMIT, 0).await {
            Ok(events) => events,
            Err(e) => {
                warn!("[POLYMARKET] fetch failed: {e}");
                return Vec::new();
            }
        };

        if events.is_empty() {
            info!("[POLYMARKET] no events returned");
            return Vec::new();
        }

        let records = parse_polymarket_markets(&events);
        info!(
            events = events.len(),
            records = records.len(),
            "[POLYMARKET] {} events → {} records",
            events.len(),
            records.len(),
        );
        records
    }
}

/// Flatten events into one record per active, open sub-market.
pub fn parse_polymarket_markets(events: &[serde_json::Value]) -> Vec<MarketRecord> {
    let mut records = Vec::new();

    for event in events {
        let event_title = str_field(event, "title").unwrap_or("").to_string();
        let event_slug = str_field(event, "slug").map(str::to_string);

        let Some(markets) = event.get("markets").and_then(|m| m.as_array()) else {
            continue;
        };

        for market in markets {
            let closed = market.get("closed").and_then(|c| c.as_bool()).unwrap_or(false);
            let active = market.get("active").and_then(|a| a.as_bool()).unwrap_or(false);
            if closed || !active {
                continue;
            }
            let Some(id) = id_field(market, "id") else {
                continue;
            };

            let (yes_price, no_price) = outcome_prices(market);

            let title = str_field(market, "groupItemTitle")
                .filter(|t| !t.trim().is_empty())
                .or_else(|| str_field(market, "question"))
                .unwrap_or("")
                .to_string();

            let volume = match num_field(market, "volumeNum") {
                v if v > 0.0 => v,
                _ => num_field(market, "volume"),
            };

            records.push(MarketRecord {
                platform: Platform::Polymarket,
                id,
                full_title: format!("{event_title} - {title}"),
                keywords: polymarket_keywords(&event_title, &title),
                title,
                parent_title: event_title.clone(),
                period: None,
                country_code: None,
                event_slug: event_slug.clone(),
                slug: str_field(market, "slug").map(str::to_string),
                yes_price,
                no_price,
                volume,
                liquidity: num_field(market, "liquidityNum"),
            });
        }
    }

    records
}

/// `outcomePrices` is `[yes, no]`, sent either as a JSON array or as a
/// JSON-encoded string of one.
fn outcome_prices(market: &serde_json::Value) -> (f64, f64) {
    let prices: Vec<serde_json::Value> = match market.get("outcomePrices") {
        Some(serde_json::Value::Array(a)) => a.clone(),
        Some(serde_json::Value::String(s)) => serde_json::from_str(s).unwrap_or_default(),
        _ => Vec::new(),
    };
    let yes = prices.first().map(num_value).unwrap_or(0.0);
    let no = prices.get(1).map(num_value).unwrap_or(0.0);
    (yes, no)
}
