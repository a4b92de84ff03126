//! Venue collaborators: HTTP retrieval plus normalization into `MarketRecord`s.
//!
//! Retrieval failures never reach the scan pipeline as errors. Each client
//! logs the failure and hands back an empty list, which the pipeline treats
//! as "no data this cycle".

pub mod opinion;
pub mod polymarket;

use std::time::Duration;

use crate::config::HTTP_TIMEOUT_SECS;
use crate::error::Result;

pub use opinion::OpinionClient;
pub use polymarket::PolymarketClient;

const USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko)";

fn http_client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .user_agent(USER_AGENT)
        .build()?)
}

/// Numeric field that may arrive as a JSON number or a numeric string.
/// Missing or malformed values read as 0.
fn num_field(v: &serde_json::Value, key: &str) -> f64 {
    v.get(key).map(num_value).unwrap_or(0.0)
}

fn num_value(v: &serde_json::Value) -> f64 {
    v.as_f64()
        .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
        .filter(|x: &f64| x.is_finite())
        .unwrap_or(0.0)
}

/// Identifier that may arrive as a JSON string or number.
fn id_field(v: &serde_json::Value, key: &str) -> Option<String> {
    match v.get(key)? {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn str_field<'a>(v: &'a serde_json::Value, key: &str) -> Option<&'a str> {
    v.get(key).and_then(|s| s.as_str())
}
