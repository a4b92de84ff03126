pub mod format;
pub mod telegram;

use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};

use crate::config::{Config, ERROR_NOTIFY_EVERY, TELEGRAM_SEND_GAP_MS};
use crate::error::Result;
use crate::types::AnalyzedOpportunity;
use format::{
    format_error_message, format_opportunity_message, format_startup_message,
    format_summary_message,
};
use telegram::TelegramClient;

/// Error notices go out on the 1st, 11th, 21st... consecutive failure count.
pub fn should_notify_error(error_count: u64) -> bool {
    error_count % ERROR_NOTIFY_EVERY == 1
}

/// Delivers alerts to Telegram, or only to the log when no bot is configured.
///
/// Delivery failures are logged and never fail the scan cycle.
pub struct Notifier {
    telegram: Option<TelegramClient>,
    max_details: usize,
}

impl Notifier {
    pub fn new(cfg: &Config) -> Result<Self> {
        match &cfg.telegram {
            Some(tg) => Ok(Self {
                telegram: Some(TelegramClient::new(tg)?),
                max_details: cfg.max_notifications_per_cycle,
            }),
            None => Ok(Self::log_only(cfg.max_notifications_per_cycle)),
        }
    }

    pub fn log_only(max_details: usize) -> Self {
        Self {
            telegram: None,
            max_details,
        }
    }

    pub async fn notify_startup(&self, cfg: &Config) -> bool {
        self.deliver(&format_startup_message(cfg)).await
    }

    /// Summary plus up to `max_details` detail messages, paced for the Bot API
    /// rate limit. Returns how many messages were delivered.
    pub async fn notify_opportunities(&self, opportunities: &[AnalyzedOpportunity]) -> usize {
        let Some(summary) = format_summary_message(opportunities) else {
            return 0;
        };

        let mut delivered = usize::from(self.deliver(&summary).await);

        let now = Utc::now();
        for analyzed in opportunities.iter().take(self.max_details) {
            if self.deliver(&format_opportunity_message(analyzed, now)).await {
                delivered += 1;
            }
            if self.telegram.is_some() {
                tokio::time::sleep(Duration::from_millis(TELEGRAM_SEND_GAP_MS)).await;
            }
        }

        info!(
            opportunities = opportunities.len(),
            delivered,
            "[NOTIFY] {} opportunities → {} messages",
            opportunities.len(),
            delivered,
        );
        delivered
    }

    pub async fn notify_error(&self, error: &str) -> bool {
        self.deliver(&format_error_message(error, Utc::now())).await
    }

    async fn deliver(&self, text: &str) -> bool {
        match &self.telegram {
            Some(client) => match client.send_message(text).await {
                Ok(()) => true,
                Err(e) => {
                    warn!("[NOTIFY] telegram delivery failed: {e}");
                    false
                }
            },
            None => {
                info!("[NOTIFY]\n{text}");
                true
            }
        }
    }
}
