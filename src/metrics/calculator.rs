//! Calculator for backtest performance metrics: win rate, average profit/loss, drawdown.

use rust_decimal::Decimal;

use crate::models::{BacktestResult, Trade};

/// Calculator for reducing a trade sequence into a [`BacktestResult`].
pub struct MetricsCalculator;

impl MetricsCalculator {
    /// Calculate metrics over trades in the order given.
    ///
    /// A trade with zero P&L counts as a loss.
    pub fn calculate(trades: &[Trade]) -> BacktestResult {
        if trades.is_empty() {
            return BacktestResult::empty();
        }

        let (winners, losers): (Vec<&Trade>, Vec<&Trade>) =
            trades.iter().partition(|t| t.is_winner());

        let total_pnl: Decimal = trades.iter().map(|t| t.pnl).sum();

        BacktestResult {
            total_trades: trades.len(),
            winning_trades: winners.len(),
            losing_trades: losers.len(),
            win_rate: winners.len() as f64 / trades.len() as f64 * 100.0,
            total_pnl,
            avg_profit: Self::mean_pnl(&winners),
            avg_loss: Self::mean_pnl(&losers),
            max_drawdown: Self::largest_loss(trades),
            equity_drawdown: Self::equity_drawdown(trades),
            trades: trades.to_vec(),
        }
    }

    fn mean_pnl(trades: &[&Trade]) -> Decimal {
        if trades.is_empty() {
            return Decimal::ZERO;
        }
        trades.iter().map(|t| t.pnl).sum::<Decimal>() / Decimal::from(trades.len())
    }

    /// Magnitude of the single worst losing trade, 0 without losses.
    ///
    /// This is what `max_drawdown` reports; it is not a cumulative measure.
    fn largest_loss(trades: &[Trade]) -> Decimal {
        trades
            .iter()
            .filter(|t| !t.is_winner())
            .map(|t| t.pnl.abs())
            .max()
            .unwrap_or(Decimal::ZERO)
    }

    /// Largest peak-to-trough drop of the running P&L sum, starting from zero equity.
    fn equity_drawdown(trades: &[Trade]) -> Decimal {
        let mut equity = Decimal::ZERO;
        let mut peak = Decimal::ZERO;
        let mut max_dd = Decimal::ZERO;

        for trade in trades {
            equity += trade.pnl;

            if equity > peak {
                peak = equity;
            }

            let dd = peak - equity;
            if dd > max_dd {
                max_dd = dd;
            }
        }

        max_dd
    }
}
