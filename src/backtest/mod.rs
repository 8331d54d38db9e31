//! Backtesting engine for replaying historical position snapshots through the consensus engine.
//!
//! Features:
//! - Replay labeled scenarios (snapshot + known exit prices)
//! - Synthesize one aggregate trade per actionable signal
//! - Compare observed consensus with each scenario's expectation
//! - Summarize trades with the metrics calculator

pub mod scenarios;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::consensus::{ConsensusBuilder, DEFAULT_MIN_CONSENSUS_PERCENT};
use crate::metrics::MetricsCalculator;
use crate::models::{BacktestResult, Position, PositionBook, PositionSide, SymbolConsensus, Trade, Trader};

/// Long-percent difference tolerated before a scenario expectation is reported.
const EXPECTATION_TOLERANCE_PCT: f64 = 0.1;

/// A historical position with the price it was marked at when the scenario closes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalPosition {
    pub symbol: String,
    pub side: PositionSide,
    pub entry_price: Decimal,
    pub exit_price: Decimal,
    pub entry_time: DateTime<Utc>,
    pub exit_time: DateTime<Utc>,
    #[serde(default)]
    pub pnl: Decimal,
}

impl HistoricalPosition {
    /// Live-position shape the aggregator expects; the exit price becomes the mark price.
    pub fn to_position(&self) -> Position {
        Position {
            update_time: self.exit_time.timestamp(),
            ..Position::new(self.symbol.clone(), self.side, self.entry_price, self.exit_price).with_pnl(self.pnl)
        }
    }
}

/// A fixed point in time with traders, their positions, and known outcomes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub date: DateTime<Utc>,
    pub traders: Vec<Trader>,
    pub positions: BTreeMap<String, Vec<HistoricalPosition>>,

    /// Expected long percent per symbol
    #[serde(default)]
    pub expected_consensus: BTreeMap<String, f64>,
}

impl Scenario {
    /// Convert to the position book the consensus builder consumes.
    ///
    /// Only listed traders with at least one position are included.
    pub fn position_book(&self) -> PositionBook {
        self.traders
            .iter()
            .filter_map(|trader| {
                let positions: Vec<Position> = self
                    .positions
                    .get(&trader.id)?
                    .iter()
                    .map(HistoricalPosition::to_position)
                    .collect();
                (!positions.is_empty()).then(|| (trader.id.clone(), positions))
            })
            .collect()
    }
}

/// Expected vs. observed long percent for one symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsensusDeviation {
    pub symbol: String,
    pub expected_long_percent: f64,
    /// `None` when the symbol produced no consensus row
    pub observed_long_percent: Option<f64>,
}

/// Outcome of replaying one scenario.
#[derive(Debug, Clone)]
pub struct ScenarioRun {
    pub name: String,
    pub description: String,
    pub consensus: Vec<SymbolConsensus>,
    pub trades: Vec<Trade>,
    pub deviations: Vec<ConsensusDeviation>,
}

/// All scenario runs plus the combined metrics.
#[derive(Debug, Clone)]
pub struct BacktestReport {
    pub runs: Vec<ScenarioRun>,
    pub result: BacktestResult,
}

/// Replays scenarios through the consensus engine and scores the resulting trades.
pub struct BacktestSimulator {
    builder: ConsensusBuilder,
}

impl BacktestSimulator {
    pub fn new(min_consensus_percent: f64) -> Self {
        Self {
            builder: ConsensusBuilder::new(min_consensus_percent),
        }
    }

    /// Run one scenario: build consensus and emit one trade per actionable symbol.
    pub fn run_scenario(&self, scenario: &Scenario) -> ScenarioRun {
        let book = scenario.position_book();
        let consensus = self.builder.build(&scenario.traders, &book, None);

        let trades: Vec<Trade> = consensus
            .iter()
            .filter_map(|c| Self::trade_for(c, &book, scenario.date))
            .collect();

        for trade in &trades {
            debug!(
                scenario = %scenario.name,
                symbol = %trade.symbol,
                side = %trade.side,
                pnl = %trade.pnl,
                "Simulated trade"
            );
        }

        ScenarioRun {
            name: scenario.name.clone(),
            description: scenario.description.clone(),
            deviations: Self::deviations(scenario, &consensus),
            consensus,
            trades,
        }
    }

    /// Run every scenario in order and compute metrics over the concatenated trades.
    pub fn run(&self, scenarios: &[Scenario]) -> BacktestReport {
        let runs: Vec<ScenarioRun> = scenarios.iter().map(|s| self.run_scenario(s)).collect();
        let trades: Vec<Trade> = runs.iter().flat_map(|r| r.trades.iter().cloned()).collect();

        BacktestReport {
            result: MetricsCalculator::calculate(&trades),
            runs,
        }
    }

    /// Aggregate trade for one consensus row; `None` for NEUTRAL.
    ///
    /// Entry and exit are averaged over every position on the symbol, both
    /// LONG and SHORT, while only the signal decides the trade direction.
    fn trade_for(consensus: &SymbolConsensus, book: &PositionBook, at: DateTime<Utc>) -> Option<Trade> {
        let side = consensus.signal.trade_side()?;

        let symbol_positions: Vec<&Position> = book
            .values()
            .flatten()
            .filter(|p| p.symbol == consensus.symbol)
            .collect();
        if symbol_positions.is_empty() {
            return None;
        }

        let count = Decimal::from(symbol_positions.len());
        let avg_entry = symbol_positions.iter().map(|p| p.entry_price).sum::<Decimal>() / count;
        let avg_exit = symbol_positions.iter().map(|p| p.mark_price).sum::<Decimal>() / count;

        Some(Trade::settle(
            consensus.symbol.clone(),
            side,
            avg_entry,
            avg_exit,
            at,
            consensus.signal,
        ))
    }

    fn deviations(scenario: &Scenario, consensus: &[SymbolConsensus]) -> Vec<ConsensusDeviation> {
        scenario
            .expected_consensus
            .iter()
            .filter_map(|(symbol, &expected)| {
                let observed = consensus
                    .iter()
                    .find(|c| &c.symbol == symbol)
                    .map(|c| c.long_percent);

                let matches = observed.is_some_and(|o| (o - expected).abs() <= EXPECTATION_TOLERANCE_PCT);
                (!matches).then(|| ConsensusDeviation {
                    symbol: symbol.clone(),
                    expected_long_percent: expected,
                    observed_long_percent: observed,
                })
            })
            .collect()
    }
}

impl Default for BacktestSimulator {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_CONSENSUS_PERCENT)
    }
}
