//! Performance metrics over backtest trades.

mod calculator;

pub use calculator::MetricsCalculator;
