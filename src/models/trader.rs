//! Trader model representing a leaderboard profile.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Leaderboard trader profile, produced fresh each scan cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trader {
    /// Opaque leaderboard identity (encrypted UID)
    pub id: String,

    /// Display name / nickname
    #[serde(default)]
    pub name: String,

    /// 1-based position on the leaderboard
    #[serde(default)]
    pub rank: u32,

    /// Return on investment percent
    #[serde(default)]
    pub roi_pct: f64,

    /// Win rate percent (0-100), when the leaderboard reports it
    #[serde(default)]
    pub win_rate_pct: Option<f64>,

    /// Realized PnL
    #[serde(default)]
    pub pnl: Decimal,

    /// Number of followers
    #[serde(default)]
    pub following_count: u64,

    /// Days of active trading, when the leaderboard reports it
    #[serde(default)]
    pub trading_days: Option<u32>,
}

impl Trader {
    /// Create a new trader with only identity and name set.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            rank: 0,
            roi_pct: 0.0,
            win_rate_pct: None,
            pnl: Decimal::ZERO,
            following_count: 0,
            trading_days: None,
        }
    }

    /// Get display name (nickname or truncated id).
    pub fn display_name(&self) -> String {
        if !self.name.is_empty() {
            self.name.clone()
        } else if self.id.len() > 10 {
            format!("{}...", self.id.chars().take(10).collect::<String>())
        } else {
            self.id.clone()
        }
    }

    /// Check if trader meets minimum requirements for being followed.
    ///
    /// Stats the leaderboard did not report are not held against the trader.
    pub fn meets_requirements(&self, min_roi_pct: f64, min_win_rate_pct: f64, min_trading_days: u32) -> bool {
        self.roi_pct >= min_roi_pct
            && self.win_rate_pct.map_or(true, |w| w >= min_win_rate_pct)
            && self.trading_days.map_or(true, |d| d >= min_trading_days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meets_requirements() {
        let mut trader = Trader::new("uid1", "Whale");
        trader.roi_pct = 150.0;
        trader.win_rate_pct = Some(60.0);
        trader.trading_days = Some(90);

        assert!(trader.meets_requirements(100.0, 55.0, 30));
        assert!(!trader.meets_requirements(200.0, 55.0, 30));
        assert!(!trader.meets_requirements(100.0, 65.0, 30));
        assert!(!trader.meets_requirements(100.0, 55.0, 120));
    }

    #[test]
    fn test_unreported_stats_pass_requirements() {
        let mut trader = Trader::new("uid1", "Whale");
        trader.roi_pct = 500.0;

        assert!(trader.meets_requirements(100.0, 55.0, 30));

        trader.trading_days = Some(10);
        assert!(!trader.meets_requirements(100.0, 55.0, 30));
    }

    #[test]
    fn test_display_name_falls_back_to_id() {
        let trader = Trader::new("0123456789ABCDEF", "");
        assert_eq!(trader.display_name(), "0123456789...");
    }
}
