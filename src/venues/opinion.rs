use tracing::{info, warn};

use super::{http_client, id_field, num_field, str_field};
use crate::config::OPINION_PAGE_LIMIT;
use crate::error::{AppError, Result};
use crate::keywords::opinion_keywords;
use crate::types::{MarketRecord, Platform};

/// Child topics with this status are open for trading.
const ACTIVE_STATUS: i64 = 2;

/// BNB chain id the Opinion indicator endpoint is queried for.
const CHAIN_ID: u32 = 56;

/// Client for Opinion's indicator listing (venue A).
pub struct OpinionClient {
    client: reqwest::Client,
    base_url: String,
}

impl OpinionClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            client: http_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// One page of raw indicators.
    pub async fn fetch_indicators(&self, limit: usize, page: usize) -> Result<Vec<serde_json::Value>> {
        let url = format!(
            "{}/indicator?sortDirection=0&limit={}&page={}&chainId={}",
            self.base_url, limit, page, CHAIN_ID
        );

        let resp: serde_json::Value = self
            .client
            .get(&url)
            .header("x-device-kind", "web")
            .header("Referer", "https://app.opinion.trade/")
            .header("Accept", "application/json")
            .send()
            .await?
            .json()
            .await?;

        let errno = resp.get("errno").and_then(|e| e.as_i64()).unwrap_or(-1);
        if errno != 0 {
            let msg = str_field(&resp, "errmsg").unwrap_or("unknown error");
            return Err(AppError::Venue(format!("Opinion errno {errno}: {msg}")));
        }

        Ok(resp
            .get("result")
            .and_then(|r| r.get("list"))
            .and_then(|l| l.as_array())
            .cloned()
            .unwrap_or_default())
    }

    /// All tradable Opinion options this cycle. Failures log and yield an empty list.
    pub async fn fetch_all(&self) -> Vec<MarketRecord> {
        let indicators = match self.fetch_indicators(OPINION_PAGE_LIMIT, 1).await {
            Ok(list) => list,
            Err(e) => {
                warn!("[OPINION] fetch failed: {e}");
                return Vec::new();
            }
        };

        if indicators.is_empty() {
            info!("[OPINION] no indicators returned");
            return Vec::new();
        }

        let records = parse_opinion_markets(&indicators);
        info!(
            indicators = indicators.len(),
            records = records.len(),
            "[OPINION] {} indicators → {} records",
            indicators.len(),
            records.len(),
        );
        records
    }
}

/// Flatten indicators into one record per active child option.
pub fn parse_opinion_markets(indicators: &[serde_json::Value]) -> Vec<MarketRecord> {
    let mut records = Vec::new();

    for indicator in indicators {
        let parent_title = str_field(indicator, "title").unwrap_or("").to_string();
        let period = str_field(indicator, "period").map(str::to_string);
        let country_code = str_field(indicator, "countryCode").map(str::to_string);

        let children = indicator
            .get("topic")
            .and_then(|t| t.get("childList"))
            .and_then(|c| c.as_array());
        let Some(children) = children else {
            continue;
        };

        for child in children {
            if child.get("status").and_then(|s| s.as_i64()) != Some(ACTIVE_STATUS) {
                continue;
            }
            let Some(id) = id_field(child, "topicId") else {
                continue;
            };
            let title = str_field(child, "title").unwrap_or("").to_string();
            let full_title = format!(
                "{} {} - {}",
                parent_title,
                period.as_deref().unwrap_or(""),
                title
            );
            let keywords = opinion_keywords(
                &parent_title,
                &title,
                period.as_deref(),
                country_code.as_deref(),
            );

            records.push(MarketRecord {
                platform: Platform::Opinion,
                id,
                title,
                parent_title: parent_title.clone(),
                full_title,
                period: period.clone(),
                country_code: country_code.clone(),
                event_slug: None,
                slug: None,
                yes_price: num_field(child, "yesMarketPrice"),
                no_price: num_field(child, "noMarketPrice"),
                volume: num_field(child, "volume"),
                liquidity: 0.0,
                keywords,
            });
        }
    }

    records
}
