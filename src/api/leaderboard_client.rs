//! Binance futures leaderboard client for fetching top traders and their open positions.

use std::time::Duration;

use anyhow::{Context, Result};
use backoff::future::retry;
use backoff::ExponentialBackoff;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, COOKIE, ORIGIN, REFERER, USER_AGENT};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::TraderFilter;
use crate::models::{Position, PositionBook, Trader};

use super::error::CollectorError;
use super::types::*;
use super::validate::validate_position;
use super::{PositionSource, Snapshot};

const LEADERBOARD_API_BASE: &str = "https://www.binance.com";
const LEADERBOARD_PATH: &str = "/bapi/futures/v1/public/future/leaderboard/getLeaderboard";
const POSITION_PATH: &str = "/bapi/futures/v1/public/future/leaderboard/getOtherPosition";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_RETRY_ELAPSED: Duration = Duration::from_secs(60);
const MAX_ERROR_BODY: usize = 500;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Client for the public leaderboard API (read-only).
pub struct LeaderboardClient {
    client: Client,
    base_url: String,
}

impl LeaderboardClient {
    /// Create a client sending browser-like headers and the given session cookie.
    pub fn new(cookies: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        headers.insert(ORIGIN, HeaderValue::from_static(LEADERBOARD_API_BASE));
        headers.insert(
            REFERER,
            HeaderValue::from_static("https://www.binance.com/en/futures-activity/leaderboard"),
        );
        headers.insert("clienttype", HeaderValue::from_static("web"));
        if !cookies.is_empty() {
            headers.insert(
                COOKIE,
                HeaderValue::from_str(cookies).context("Invalid characters in session cookie")?,
            );
        }

        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: LEADERBOARD_API_BASE.to_string(),
        })
    }

    /// POST a JSON body and decode the envelope, retrying transient failures.
    async fn post<B, T>(&self, path: &str, body: &B) -> Result<ApiEnvelope<T>, CollectorError>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let url = url.as_str();
        let policy = ExponentialBackoff {
            max_elapsed_time: Some(MAX_RETRY_ELAPSED),
            ..ExponentialBackoff::default()
        };

        retry(policy, move || async move {
            self.send_once(url, body).await.map_err(|e| {
                if e.is_transient() {
                    debug!(url = %url, error = %e, "Transient failure, retrying");
                    backoff::Error::transient(e)
                } else {
                    backoff::Error::permanent(e)
                }
            })
        })
        .await
    }

    async fn send_once<B, T>(&self, url: &str, body: &B) -> Result<ApiEnvelope<T>, CollectorError>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let response = self.client.post(url).json(body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CollectorError::Api {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        Ok(response.json().await?)
    }

    /// Fetch the top traders by all-time ROI.
    pub async fn get_top_traders(&self, limit: u32) -> Result<Vec<Trader>> {
        debug!(limit = limit, "Fetching leaderboard");

        let envelope: ApiEnvelope<LeaderboardData> = self
            .post(LEADERBOARD_PATH, &LeaderboardRequest::top_by_roi(limit))
            .await
            .context("Failed to fetch leaderboard")?;

        if !envelope.success {
            anyhow::bail!(
                "Leaderboard request rejected: {} - {}",
                envelope.code.unwrap_or_default(),
                envelope.message.unwrap_or_default()
            );
        }

        let traders: Vec<Trader> = envelope
            .data
            .unwrap_or_default()
            .list
            .into_iter()
            .zip(1..)
            .map(|(entry, rank)| entry.into_trader(rank))
            .collect();

        info!(count = traders.len(), "Fetched leaderboard");
        Ok(traders)
    }

    /// Fetch the open perpetual positions of one trader.
    ///
    /// Positions that fail validation are logged and dropped.
    pub async fn get_trader_positions(&self, trader_id: &str) -> Result<Vec<Position>> {
        let envelope: ApiEnvelope<PositionData> = self
            .post(POSITION_PATH, &PositionRequest::perpetual(trader_id))
            .await
            .with_context(|| format!("Failed to fetch positions for {}", trader_id))?;

        if !envelope.success {
            anyhow::bail!(
                "Position request rejected: {} - {}",
                envelope.code.unwrap_or_default(),
                envelope.message.unwrap_or_default()
            );
        }

        let positions = envelope
            .data
            .and_then(|d| d.other_position_ret_list)
            .unwrap_or_default()
            .into_iter()
            .map(PositionEntry::into_position)
            .filter(|p| match validate_position(trader_id, p) {
                Ok(()) => true,
                Err(e) => {
                    warn!(error = %e, "Dropping invalid position");
                    false
                }
            })
            .collect();

        Ok(positions)
    }

    /// Fetch positions for every trader, one request at a time.
    ///
    /// Failing traders are skipped; traders without positions are omitted.
    pub async fn get_all_positions(&self, traders: &[Trader], delay: Duration) -> PositionBook {
        let mut book = PositionBook::new();

        for (i, trader) in traders.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(delay).await;
            }

            match self.get_trader_positions(&trader.id).await {
                Ok(positions) if !positions.is_empty() => {
                    debug!(
                        trader = %trader.display_name(),
                        count = positions.len(),
                        "Fetched positions"
                    );
                    book.insert(trader.id.clone(), positions);
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(trader = %trader.display_name(), error = %e, "Failed to fetch positions");
                }
            }
        }

        info!(
            traders = traders.len(),
            with_positions = book.len(),
            "Collected open positions"
        );
        book
    }
}

/// Live leaderboard source: top traders filtered by track record, then their positions.
pub struct LeaderboardSource {
    client: LeaderboardClient,
    top_traders: u32,
    filter: TraderFilter,
    request_delay: Duration,
}

impl LeaderboardSource {
    pub fn new(client: LeaderboardClient, top_traders: u32, filter: TraderFilter, request_delay: Duration) -> Self {
        Self {
            client,
            top_traders,
            filter,
            request_delay,
        }
    }
}

impl PositionSource for LeaderboardSource {
    async fn fetch_snapshot(&self) -> Result<Snapshot> {
        let leaderboard = self.client.get_top_traders(self.top_traders).await?;
        let fetched = leaderboard.len();

        let traders = self.filter.apply(leaderboard)?;

        info!(fetched = fetched, qualified = traders.len(), "Filtered traders");

        let positions = self.client.get_all_positions(&traders, self.request_delay).await;

        Ok(Snapshot { traders, positions })
    }
}
