//! Trade model for synthetic trades emitted by the backtest simulator.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::consensus::Signal;
use super::position::PositionSide;

/// One aggregate trade taken on an actionable consensus signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub symbol: String,

    /// Trade direction, chosen from the signal family
    pub side: PositionSide,

    /// Mean entry price across every position on the symbol
    pub entry_price: Decimal,

    /// Mean exit price across every position on the symbol
    pub exit_price: Decimal,

    pub entry_time: DateTime<Utc>,
    pub exit_time: DateTime<Utc>,

    /// Price-unit P&L in the trade direction
    pub pnl: Decimal,

    /// P&L as a percentage of the entry price
    pub pnl_percent: Decimal,

    /// Signal the trade was taken on
    pub signal: Signal,
}

impl Trade {
    /// Open a trade at `entry_price` and close it at `exit_price` at the same instant.
    pub fn settle(
        symbol: impl Into<String>,
        side: PositionSide,
        entry_price: Decimal,
        exit_price: Decimal,
        at: DateTime<Utc>,
        signal: Signal,
    ) -> Self {
        let pnl = match side {
            PositionSide::Long => exit_price - entry_price,
            PositionSide::Short => entry_price - exit_price,
        };
        let pnl_percent = if entry_price.is_zero() {
            Decimal::ZERO
        } else {
            pnl / entry_price * Decimal::ONE_HUNDRED
        };

        Self {
            symbol: symbol.into(),
            side,
            entry_price,
            exit_price,
            entry_time: at,
            exit_time: at,
            pnl,
            pnl_percent,
            signal,
        }
    }

    /// Strictly positive P&L; a flat trade is not a win.
    pub fn is_winner(&self) -> bool {
        self.pnl > Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_settle_long() {
        let trade = Trade::settle("BTCUSDT", PositionSide::Long, dec!(100), dec!(110), Utc::now(), Signal::Buy);

        assert_eq!(trade.pnl, dec!(10));
        assert_eq!(trade.pnl_percent, dec!(10));
        assert!(trade.is_winner());
        assert_eq!(trade.entry_time, trade.exit_time);
    }

    #[test]
    fn test_settle_short() {
        // Price went up: loss for a short
        let trade = Trade::settle("ETHUSDT", PositionSide::Short, dec!(200), dec!(210), Utc::now(), Signal::Sell);

        assert_eq!(trade.pnl, dec!(-10));
        assert_eq!(trade.pnl_percent, dec!(-5));
        assert!(!trade.is_winner());
    }

    #[test]
    fn test_flat_trade_is_not_a_winner() {
        let trade = Trade::settle("SOLUSDT", PositionSide::Long, dec!(50), dec!(50), Utc::now(), Signal::StrongBuy);
        assert_eq!(trade.pnl, Decimal::ZERO);
        assert!(!trade.is_winner());
    }

    #[test]
    fn test_zero_entry_price_has_zero_percent() {
        let trade = Trade::settle("XUSDT", PositionSide::Long, Decimal::ZERO, dec!(1), Utc::now(), Signal::Buy);
        assert_eq!(trade.pnl_percent, Decimal::ZERO);
    }
}
