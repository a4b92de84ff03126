use tracing::{info, warn};

use crate::error::{AppError, Result};

pub const OPINION_API_URL: &str = "https://proxy.opinion.trade:8443/api/bsc/api/v2";
pub const GAMMA_API_URL: &str = "https://gamma-api.polymarket.com";
pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Links rendered into alert messages.
pub const OPINION_TOPIC_URL: &str = "https://app.opinion.trade/topic";
pub const POLYMARKET_EVENT_URL: &str = "https://polymarket.com/event";

/// Timeout for every venue and Telegram HTTP request (seconds).
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// Opinion indicators requested per cycle (single page).
pub const OPINION_PAGE_LIMIT: usize = 100;

/// Polymarket events requested per cycle (single page).
pub const POLYMARKET_EVENT_LIMIT: usize = 200;

/// Dedup entries older than this are purged regardless of cooldown (ms).
pub const DEDUP_RETENTION_MS: u64 = 24 * 60 * 60 * 1000;

/// Score given to every pair produced by the manual mapping table.
pub const MANUAL_MATCH_SCORE: u32 = 10;

/// Minimum keyword score for an automatically matched pair.
pub const MIN_AUTO_MATCH_SCORE: u32 = 5;

/// Pause between consecutive Telegram detail messages (ms).
pub const TELEGRAM_SEND_GAP_MS: u64 = 500;

/// Opportunities listed in a cycle summary message.
pub const SUMMARY_MAX_ITEMS: usize = 5;

/// Matched pairs dumped to the log on the first cycle.
pub const FIRST_CYCLE_PAIR_SAMPLE: usize = 10;

/// Error notices go out on the 1st, 11th, 21st... failed cycle.
pub const ERROR_NOTIFY_EVERY: u64 = 10;

/// Cost and profit bands applied by the arbitrage detector.
pub mod arb_bounds {
    /// Quotes below this are treated as "no market".
    pub const PRICE_FLOOR: f64 = 0.001;
    /// Combined cost below this is a data error, not an arbitrage.
    pub const MIN_TOTAL_COST: f64 = 0.50;
    pub const MIN_PROFIT_PERCENT: f64 = 3.0;
    pub const MAX_PROFIT_PERCENT: f64 = 50.0;
    /// Float tolerance for the inclusive cost bounds.
    pub const COST_EPSILON: f64 = 1e-9;
    /// Float tolerance for the inclusive profit-percent band.
    pub const PERCENT_EPSILON: f64 = 1e-9;
}

/// Liquidity rating volume cutoffs (USD, strictly greater than).
pub mod liquidity_thresholds {
    pub const HIGH_MIN_VOLUME: f64 = 100_000.0;
    pub const MEDIUM_MIN_VOLUME: f64 = 10_000.0;
}

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub opinion_api_url: String,
    pub gamma_api_url: String,
    pub log_level: String,
    pub api_port: u16,
    /// Combined cost at or below which a strategy counts (ARBITRAGE_THRESHOLD)
    pub threshold: f64,
    /// Per-leg fee rate used by the economics analyzer (FEE_RATE)
    pub fee_rate: f64,
    /// Scan interval in ms (ARBITRAGE_POLL_INTERVAL)
    pub poll_interval_ms: u64,
    /// Minimum gap before the same opportunity is re-notified, ms (NOTIFICATION_COOLDOWN)
    pub notification_cooldown_ms: u64,
    /// Detail messages per cycle (MAX_NOTIFICATIONS)
    pub max_notifications_per_cycle: usize,
    /// Net profit % an opportunity needs before it is notified (MIN_PROFIT_PERCENT)
    pub min_profit_percent: f64,
    /// Declared but never enforced (MIN_LIQUIDITY)
    pub min_liquidity: f64,
    /// Notional used when computing expected returns (ANALYSIS_INVESTMENT)
    pub analysis_investment: f64,
    /// Optional JSON file replacing the built-in manual mapping table (MANUAL_MAPPINGS_PATH)
    pub manual_mappings_path: Option<String>,
    pub telegram: Option<TelegramConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            opinion_api_url: OPINION_API_URL.to_string(),
            gamma_api_url: GAMMA_API_URL.to_string(),
            log_level: "info".to_string(),
            api_port: 3000,
            threshold: 0.97,
            fee_rate: 0.02,
            poll_interval_ms: 30_000,
            notification_cooldown_ms: 5 * 60 * 1000,
            max_notifications_per_cycle: 3,
            min_profit_percent: 1.0,
            min_liquidity: 1000.0,
            analysis_investment: 100.0,
            manual_mappings_path: None,
            telegram: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let telegram = match (
            std::env::var("TELEGRAM_BOT_TOKEN").ok().filter(|s| !s.is_empty()),
            std::env::var("TELEGRAM_CHAT_ID").ok().filter(|s| !s.is_empty()),
        ) {
            (Some(bot_token), Some(chat_id)) => Some(TelegramConfig { bot_token, chat_id }),
            (None, None) => None,
            _ => {
                return Err(AppError::Config(
                    "TELEGRAM_BOT_TOKEN and TELEGRAM_CHAT_ID must be set together".to_string(),
                ))
            }
        };

        Ok(Self {
            opinion_api_url: std::env::var("OPINION_API_URL")
                .unwrap_or_else(|_| OPINION_API_URL.to_string()),
            gamma_api_url: std::env::var("GAMMA_API_URL")
                .unwrap_or_else(|_| GAMMA_API_URL.to_string()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            api_port: std::env::var("API_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse::<u16>()
                .map_err(|_| AppError::Config("API_PORT must be a valid port number".to_string()))?,
            threshold: env_parse("ARBITRAGE_THRESHOLD", defaults.threshold),
            fee_rate: env_parse("FEE_RATE", defaults.fee_rate),
            poll_interval_ms: env_parse("ARBITRAGE_POLL_INTERVAL", defaults.poll_interval_ms),
            notification_cooldown_ms: env_parse(
                "NOTIFICATION_COOLDOWN",
                defaults.notification_cooldown_ms,
            ),
            max_notifications_per_cycle: env_parse(
                "MAX_NOTIFICATIONS",
                defaults.max_notifications_per_cycle,
            ),
            min_profit_percent: env_parse("MIN_PROFIT_PERCENT", defaults.min_profit_percent),
            min_liquidity: env_parse("MIN_LIQUIDITY", defaults.min_liquidity),
            analysis_investment: env_parse("ANALYSIS_INVESTMENT", defaults.analysis_investment),
            manual_mappings_path: std::env::var("MANUAL_MAPPINGS_PATH")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            telegram,
        })
    }

    pub fn log_summary(&self) {
        info!(
            threshold = self.threshold,
            fee_rate = self.fee_rate,
            poll_interval_ms = self.poll_interval_ms,
            cooldown_ms = self.notification_cooldown_ms,
            max_notifications = self.max_notifications_per_cycle,
            min_profit_percent = self.min_profit_percent,
            "[CONFIG] threshold: {:.0}¢ | fee: {:.1}% | poll: {}s | cooldown: {}s | max notifications/cycle: {}",
            self.threshold * 100.0,
            self.fee_rate * 100.0,
            self.poll_interval_ms / 1000,
            self.notification_cooldown_ms / 1000,
            self.max_notifications_per_cycle,
        );
        warn!(
            min_liquidity = self.min_liquidity,
            "[CONFIG] MIN_LIQUIDITY is declared but not enforced by matching or detection",
        );
        if self.telegram.is_none() {
            warn!("[CONFIG] TELEGRAM_BOT_TOKEN/TELEGRAM_CHAT_ID not set, alerts will only be logged");
        }
    }
}

/// Parse an env var, falling back to `default` when unset or malformed.
fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}
