//! Data models for traders, positions, consensus rows, trades, and backtest results.

mod consensus;
mod metrics;
mod position;
mod trade;
mod trader;

pub use consensus::{Signal, SymbolConsensus};
pub use metrics::BacktestResult;
pub use position::{Position, PositionBook, PositionSide};
pub use trade::Trade;
pub use trader::Trader;

use rust_decimal::{Decimal, RoundingStrategy};

/// Round a money amount to cents for display.
///
/// `Decimal` formatting with a precision truncates, so amounts are rounded first.
pub fn round_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
