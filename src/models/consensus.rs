//! Per-symbol consensus row and the classified signal it carries.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::position::PositionSide;

/// Trading recommendation derived from consensus percentages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Signal {
    StrongBuy,
    Buy,
    Neutral,
    Sell,
    StrongSell,
}

impl Signal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::StrongBuy => "STRONG_BUY",
            Signal::Buy => "BUY",
            Signal::Neutral => "NEUTRAL",
            Signal::Sell => "SELL",
            Signal::StrongSell => "STRONG_SELL",
        }
    }

    /// Short text badge used in reports and alerts.
    pub fn marker(&self) -> &'static str {
        match self {
            Signal::StrongBuy => "[++]",
            Signal::Buy => "[+]",
            Signal::Neutral => "[=]",
            Signal::Sell => "[-]",
            Signal::StrongSell => "[--]",
        }
    }

    /// Any signal other than NEUTRAL.
    pub fn is_actionable(&self) -> bool {
        !matches!(self, Signal::Neutral)
    }

    /// STRONG_BUY or STRONG_SELL.
    pub fn is_strong(&self) -> bool {
        matches!(self, Signal::StrongBuy | Signal::StrongSell)
    }

    /// Direction a trade on this signal takes; `None` for NEUTRAL.
    pub fn trade_side(&self) -> Option<PositionSide> {
        match self {
            Signal::StrongBuy | Signal::Buy => Some(PositionSide::Long),
            Signal::StrongSell | Signal::Sell => Some(PositionSide::Short),
            Signal::Neutral => None,
        }
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregated trader lean for one symbol.
///
/// Rows are only produced for symbols with at least one position, so
/// `total_count > 0` and `long_percent + short_percent == 100` always hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolConsensus {
    pub symbol: String,
    pub long_count: usize,
    pub short_count: usize,
    pub total_count: usize,
    pub long_percent: f64,
    pub short_percent: f64,

    /// Mean leverage of long positions, 0 when there are none
    pub avg_leverage_long: f64,

    /// Mean leverage of short positions, 0 when there are none
    pub avg_leverage_short: f64,

    /// Sum of recorded PnL across long positions
    pub total_long_pnl: Decimal,

    /// Sum of recorded PnL across short positions
    pub total_short_pnl: Decimal,

    pub signal: Signal,
}

impl SymbolConsensus {
    /// Percentage on the side the signal points to (long for NEUTRAL).
    pub fn dominant_percent(&self) -> f64 {
        match self.signal.trade_side() {
            Some(PositionSide::Short) => self.short_percent,
            Some(PositionSide::Long) | None => self.long_percent,
        }
    }
}
