//! Telegram Bot API notifier.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info};

use crate::models::Signal;

use super::{format_signal_alert, AlertDetails, AlertSink};

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
}

/// Posts Markdown messages to a single chat.
pub struct TelegramNotifier {
    client: Client,
    token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(token: impl Into<String>, chat_id: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            token: token.into(),
            chat_id: chat_id.into(),
        })
    }

    /// Both token and chat id must be set and non-empty.
    pub fn is_configured(token: Option<&str>, chat_id: Option<&str>) -> bool {
        token.is_some_and(|t| !t.is_empty()) && chat_id.is_some_and(|c| !c.is_empty())
    }

    /// Build a notifier only when [`Self::is_configured`] holds.
    pub fn from_parts(token: Option<&str>, chat_id: Option<&str>) -> Result<Option<Self>> {
        match (token, chat_id) {
            (Some(token), Some(chat_id)) if Self::is_configured(Some(token), Some(chat_id)) => {
                Ok(Some(Self::new(token, chat_id)?))
            }
            _ => Ok(None),
        }
    }

    async fn send_message(&self, text: &str) -> Result<()> {
        let url = format!("{}/bot{}/sendMessage", TELEGRAM_API_BASE, self.token);
        let body = SendMessage {
            chat_id: &self.chat_id,
            text,
            parse_mode: "Markdown",
        };

        debug!(chat_id = %self.chat_id, len = text.len(), "Sending Telegram message");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .context("Failed to send Telegram message")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Telegram request failed: {} - {}", status, body);
        }

        info!(chat_id = %self.chat_id, "Telegram message delivered");
        Ok(())
    }
}

impl AlertSink for TelegramNotifier {
    async fn emit_report(&self, text: &str) -> Result<()> {
        self.send_message(text).await
    }

    async fn emit_alert(&self, symbol: &str, signal: Signal, details: &AlertDetails) -> Result<()> {
        self.send_message(&format_signal_alert(symbol, signal, details)).await
    }
}
