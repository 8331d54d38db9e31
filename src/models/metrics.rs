//! Backtest performance summary: win rate, average profit/loss, drawdown.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::round_cents;
use super::trade::Trade;

/// Aggregate statistics over a sequence of backtest trades.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    // === Counts ===
    /// Total number of trades
    pub total_trades: usize,

    /// Trades with P&L > 0
    pub winning_trades: usize,

    /// Trades with P&L <= 0
    pub losing_trades: usize,

    /// Win rate percent (0 to 100)
    pub win_rate: f64,

    // === P&L ===
    /// Sum of all trade P&L
    pub total_pnl: Decimal,

    /// Mean P&L of winners, 0 if none
    pub avg_profit: Decimal,

    /// Mean P&L of losers, 0 if none (never positive)
    pub avg_loss: Decimal,

    // === Risk ===
    /// Magnitude of the single largest losing trade
    pub max_drawdown: Decimal,

    /// Peak-to-trough drop of the cumulative P&L curve
    pub equity_drawdown: Decimal,

    /// All trades in the order they were produced
    pub trades: Vec<Trade>,
}

/// Coarse assessment of a backtest outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyVerdict {
    Profitable,
    Neutral,
    Losing,
}

impl StrategyVerdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyVerdict::Profitable => "PROFITABLE",
            StrategyVerdict::Neutral => "NEUTRAL",
            StrategyVerdict::Losing => "LOSING",
        }
    }
}

impl BacktestResult {
    /// Zeroed result for an empty trade list.
    pub fn empty() -> Self {
        Self {
            total_trades: 0,
            winning_trades: 0,
            losing_trades: 0,
            win_rate: 0.0,
            total_pnl: Decimal::ZERO,
            avg_profit: Decimal::ZERO,
            avg_loss: Decimal::ZERO,
            max_drawdown: Decimal::ZERO,
            equity_drawdown: Decimal::ZERO,
            trades: Vec::new(),
        }
    }

    /// Reward per unit of risk, `|avg_profit / avg_loss|`; `None` without losses to divide by.
    pub fn risk_reward_ratio(&self) -> Option<f64> {
        if self.avg_loss.is_zero() {
            return None;
        }
        (self.avg_profit / self.avg_loss).abs().to_f64()
    }

    /// PROFITABLE needs a 60% win rate and positive total P&L; 50% is NEUTRAL.
    pub fn verdict(&self) -> StrategyVerdict {
        if self.win_rate >= 60.0 && self.total_pnl > Decimal::ZERO {
            StrategyVerdict::Profitable
        } else if self.win_rate >= 50.0 {
            StrategyVerdict::Neutral
        } else {
            StrategyVerdict::Losing
        }
    }
}

impl Default for BacktestResult {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Display for BacktestResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n{:=^60}", " BACKTEST RESULTS ")?;
        writeln!(f)?;
        writeln!(f, "--- Trades ---")?;
        writeln!(f, "Total:        {}", self.total_trades)?;
        writeln!(f, "Winners:      {}", self.winning_trades)?;
        writeln!(f, "Losers:       {}", self.losing_trades)?;
        writeln!(f, "Win Rate:     {:.1}%", self.win_rate)?;
        writeln!(f)?;
        writeln!(f, "--- P&L ---")?;
        writeln!(f, "Total P&L:    ${:+.2}", round_cents(self.total_pnl))?;
        writeln!(f, "Avg Profit:   ${:+.2}", round_cents(self.avg_profit))?;
        writeln!(f, "Avg Loss:     ${:+.2}", round_cents(self.avg_loss))?;
        writeln!(f, "Max Drawdown: ${:.2} (largest single loss)", round_cents(self.max_drawdown))?;
        writeln!(f, "Equity DD:    ${:.2} (cumulative P&L curve)", round_cents(self.equity_drawdown))?;
        if let Some(rr) = self.risk_reward_ratio() {
            writeln!(f, "Risk/Reward:  1:{:.2}", rr)?;
        }
        writeln!(f)?;
        writeln!(f, "Verdict:      {}", self.verdict().as_str())?;
        writeln!(f, "{:=^60}", "")?;
        Ok(())
    }
}
