//! Position model representing one open futures position held by a trader.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Direction of a futures position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PositionSide {
    Long,
    Short,
}

impl PositionSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            PositionSide::Long => "LONG",
            PositionSide::Short => "SHORT",
        }
    }

    /// Side implied by a signed position amount (positive = long).
    pub fn from_amount(amount: Decimal) -> Self {
        if amount > Decimal::ZERO {
            PositionSide::Long
        } else {
            PositionSide::Short
        }
    }
}

impl std::fmt::Display for PositionSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Open position snapshot as reported by the leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Instrument ticker, uppercase (e.g. "BTCUSDT")
    pub symbol: String,

    /// Long or short
    pub side: PositionSide,

    /// Average entry price
    pub entry_price: Decimal,

    /// Current mark price
    pub mark_price: Decimal,

    /// PnL recorded upstream; never recomputed from prices
    #[serde(default)]
    pub pnl: Decimal,

    /// Return on equity percent
    #[serde(default)]
    pub roe_pct: f64,

    /// Leverage multiplier (>= 1)
    #[serde(default = "default_leverage")]
    pub leverage: u32,

    /// Last update time, epoch seconds
    #[serde(default)]
    pub update_time: i64,
}

fn default_leverage() -> u32 {
    1
}

/// Open positions keyed by trader identity.
pub type PositionBook = BTreeMap<String, Vec<Position>>;

impl Position {
    /// Create a position with leverage 1 and no recorded PnL.
    pub fn new(
        symbol: impl Into<String>,
        side: PositionSide,
        entry_price: Decimal,
        mark_price: Decimal,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            entry_price,
            mark_price,
            pnl: Decimal::ZERO,
            roe_pct: 0.0,
            leverage: 1,
            update_time: 0,
        }
    }

    pub fn with_pnl(mut self, pnl: Decimal) -> Self {
        self.pnl = pnl;
        self
    }

    pub fn with_leverage(mut self, leverage: u32) -> Self {
        self.leverage = leverage;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_side_from_amount() {
        assert_eq!(PositionSide::from_amount(dec!(0.5)), PositionSide::Long);
        assert_eq!(PositionSide::from_amount(dec!(-2)), PositionSide::Short);
        // Zero amount is reported as short upstream
        assert_eq!(PositionSide::from_amount(Decimal::ZERO), PositionSide::Short);
    }

    #[test]
    fn test_position_deserialize_defaults() {
        let json = r#"{"symbol":"ETHUSDT","side":"SHORT","entry_price":2500,"mark_price":"2450.5"}"#;
        let pos: Position = serde_json::from_str(json).unwrap();

        assert_eq!(pos.side, PositionSide::Short);
        assert_eq!(pos.entry_price, dec!(2500));
        assert_eq!(pos.mark_price, dec!(2450.5));
        assert_eq!(pos.leverage, 1);
        assert_eq!(pos.pnl, Decimal::ZERO);
    }
}
