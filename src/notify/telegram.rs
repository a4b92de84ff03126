use std::time::Duration;

use serde::Serialize;

use crate::config::{TelegramConfig, HTTP_TIMEOUT_SECS, TELEGRAM_API_URL};
use crate::error::{AppError, Result};

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
}

/// Thin Bot API client: one chat, HTML messages, no link previews.
pub struct TelegramClient {
    client: reqwest::Client,
    send_url: String,
    chat_id: String,
}

impl TelegramClient {
    pub fn new(cfg: &TelegramConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            send_url: format!("{}/bot{}/sendMessage", TELEGRAM_API_URL, cfg.bot_token),
            chat_id: cfg.chat_id.clone(),
        })
    }

    pub async fn send_message(&self, text: &str) -> Result<()> {
        let body = SendMessage {
            chat_id: &self.chat_id,
            text,
            parse_mode: "HTML",
            disable_web_page_preview: true,
        };

        let resp: serde_json::Value = self
            .client
            .post(&self.send_url)
            .json(&body)
            .send()
            .await?
            .json()
            .await?;

        if resp.get("ok").and_then(|v| v.as_bool()) != Some(true) {
            let description = resp
                .get("description")
                .and_then(|d| d.as_str())
                .unwrap_or("no description");
            return Err(AppError::Notify(format!("sendMessage rejected: {description}")));
        }
        Ok(())
    }
}
