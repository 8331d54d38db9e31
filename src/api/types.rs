//! Request and response types for the Binance futures leaderboard API.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Position, PositionSide, Trader};

/// Common response wrapper: `{code, message, data, success}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
    #[serde(default)]
    pub success: bool,
}

/// Body for the getLeaderboard endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardRequest {
    pub is_shared: bool,
    pub is_trader: bool,
    pub period_type: String,
    pub sort_type: String,
    pub sort_order: String,
    pub limit: u32,
    pub offset: u32,
}

impl LeaderboardRequest {
    /// All-time ranking by ROI, best first.
    pub fn top_by_roi(limit: u32) -> Self {
        Self {
            is_shared: true,
            is_trader: false,
            period_type: "ALL".to_string(),
            sort_type: "ROI".to_string(),
            sort_order: "DESC".to_string(),
            limit,
            offset: 0,
        }
    }
}

/// Body for the getOtherPosition endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionRequest {
    pub encrypted_uid: String,
    pub trade_type: String,
}

impl PositionRequest {
    pub fn perpetual(encrypted_uid: &str) -> Self {
        Self {
            encrypted_uid: encrypted_uid.to_string(),
            trade_type: "PERPETUAL".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeaderboardData {
    #[serde(default)]
    pub list: Vec<LeaderboardEntry>,
}

/// One leaderboard row.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    #[serde(default)]
    pub encrypted_uid: String,
    #[serde(default)]
    pub nick_name: Option<String>,
    #[serde(default)]
    pub roi: f64,
    #[serde(default)]
    pub win_rate: Option<f64>,
    #[serde(default)]
    pub pnl: Decimal,
    #[serde(default)]
    pub following_count: u64,
    #[serde(default)]
    pub trade_period_days: Option<u32>,
}

impl LeaderboardEntry {
    /// Convert to a trader at the given 1-based rank.
    pub fn into_trader(self, rank: u32) -> Trader {
        Trader {
            id: self.encrypted_uid,
            name: self.nick_name.unwrap_or_else(|| "Unknown".to_string()),
            rank,
            roi_pct: self.roi,
            win_rate_pct: self.win_rate,
            pnl: self.pnl,
            following_count: self.following_count,
            trading_days: self.trade_period_days,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionData {
    #[serde(default)]
    pub other_position_ret_list: Option<Vec<PositionEntry>>,
}

/// One open position as returned by getOtherPosition.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionEntry {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub entry_price: Decimal,
    #[serde(default)]
    pub mark_price: Decimal,
    #[serde(default)]
    pub pnl: Decimal,
    #[serde(default)]
    pub roe: f64,
    /// Signed size: positive for long, negative for short
    #[serde(default)]
    pub amount: Decimal,
    #[serde(default)]
    pub leverage: Option<u32>,
    /// Last update in epoch milliseconds
    #[serde(default)]
    pub update_time_stamp: Option<i64>,
}

impl PositionEntry {
    pub fn into_position(self) -> Position {
        let side = PositionSide::from_amount(self.amount);
        Position {
            roe_pct: self.roe,
            update_time: self.update_time_stamp.map(|ms| ms / 1000).unwrap_or(0),
            ..Position::new(self.symbol.trim().to_uppercase(), side, self.entry_price, self.mark_price)
                .with_pnl(self.pnl)
                .with_leverage(self.leverage.unwrap_or(1))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_leaderboard_response() {
        let json = r#"{
            "code": "000000",
            "message": null,
            "data": {"list": [
                {"encryptedUid": "ABC", "nickName": "Whale", "roi": 152.5, "winRate": 61.0,
                 "pnl": 12000.5, "followingCount": 10, "tradePeriodDays": 90},
                {"encryptedUid": "DEF", "roi": 99.0}
            ]},
            "success": true
        }"#;

        let envelope: ApiEnvelope<LeaderboardData> = serde_json::from_str(json).unwrap();
        assert!(envelope.success);
        let list = envelope.data.unwrap().list;
        assert_eq!(list.len(), 2);

        let traders: Vec<Trader> = list
            .into_iter()
            .zip(1..)
            .map(|(entry, rank)| entry.into_trader(rank))
            .collect();
        assert_eq!(traders[0].name, "Whale");
        assert_eq!(traders[0].pnl, dec!(12000.5));
        assert_eq!(traders[1].rank, 2);
        assert_eq!(traders[1].name, "Unknown");
        assert_eq!(traders[0].win_rate_pct, Some(61.0));
        assert_eq!(traders[1].win_rate_pct, None);
        assert_eq!(traders[1].trading_days, None);
    }

    #[test]
    fn test_parse_position_response() {
        let json = r#"{
            "code": "000000",
            "data": {"otherPositionRetList": [
                {"symbol": "btcusdt", "entryPrice": 40000.0, "markPrice": 41000.5, "pnl": 100.25,
                 "roe": 0.025, "amount": -0.5, "leverage": 20, "updateTimeStamp": 1700000000123}
            ]},
            "success": true
        }"#;

        let envelope: ApiEnvelope<PositionData> = serde_json::from_str(json).unwrap();
        let entries = envelope.data.unwrap().other_position_ret_list.unwrap();
        let position = entries.into_iter().next().unwrap().into_position();

        assert_eq!(position.symbol, "BTCUSDT");
        assert_eq!(position.side, PositionSide::Short);
        assert_eq!(position.mark_price, dec!(41000.5));
        assert_eq!(position.leverage, 20);
        assert_eq!(position.update_time, 1_700_000_000);
    }

    #[test]
    fn test_request_bodies_are_camel_case() {
        let body = serde_json::to_value(LeaderboardRequest::top_by_roi(100)).unwrap();
        assert_eq!(body["isShared"], true);
        assert_eq!(body["sortType"], "ROI");
        assert_eq!(body["limit"], 100);

        let body = serde_json::to_value(PositionRequest::perpetual("ABC")).unwrap();
        assert_eq!(body["encryptedUid"], "ABC");
        assert_eq!(body["tradeType"], "PERPETUAL");
    }
}
