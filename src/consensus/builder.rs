//! Builds the ordered consensus list for a full position snapshot.

use std::collections::HashSet;

use tracing::debug;

use crate::models::{PositionBook, SymbolConsensus, Trader};

use super::aggregator::{SymbolAggregator, SymbolTally};
use super::classifier::SignalClassifier;

/// Consensus threshold used when none is configured.
pub const DEFAULT_MIN_CONSENSUS_PERCENT: f64 = 60.0;

/// Runs aggregation and classification over a snapshot.
#[derive(Debug, Clone, Copy)]
pub struct ConsensusBuilder {
    classifier: SignalClassifier,
}

impl ConsensusBuilder {
    pub fn new(min_consensus_percent: f64) -> Self {
        Self {
            classifier: SignalClassifier::new(min_consensus_percent),
        }
    }

    pub fn min_consensus_percent(&self) -> f64 {
        self.classifier.min_consensus_percent()
    }

    /// Consensus rows sorted by `total_count` descending, then symbol ascending.
    ///
    /// `traders` only links identities; every position in `positions` is
    /// considered whether or not its trader is listed.
    pub fn build(
        &self,
        traders: &[Trader],
        positions: &PositionBook,
        allowlist: Option<&HashSet<String>>,
    ) -> Vec<SymbolConsensus> {
        let tallies = SymbolAggregator::aggregate(positions, allowlist);

        let mut consensus: Vec<SymbolConsensus> = tallies
            .into_values()
            .map(|tally| self.materialize(tally))
            .collect();

        consensus.sort_by(|a, b| {
            b.total_count
                .cmp(&a.total_count)
                .then_with(|| a.symbol.cmp(&b.symbol))
        });

        debug!(
            traders = traders.len(),
            holders = positions.len(),
            symbols = consensus.len(),
            "Consensus built"
        );

        consensus
    }

    /// Only rows with an actionable (non-NEUTRAL) signal, order preserved.
    pub fn actionable(consensus: &[SymbolConsensus]) -> Vec<&SymbolConsensus> {
        consensus.iter().filter(|c| c.signal.is_actionable()).collect()
    }

    fn materialize(&self, tally: SymbolTally) -> SymbolConsensus {
        let (long_percent, short_percent) = tally.percentages();

        debug!(
            symbol = %tally.symbol,
            long_traders = ?tally.long.traders,
            short_traders = ?tally.short.traders,
            "Symbol tally"
        );

        SymbolConsensus {
            long_count: tally.long.count(),
            short_count: tally.short.count(),
            total_count: tally.total_count(),
            long_percent,
            short_percent,
            avg_leverage_long: tally.long.avg_leverage(),
            avg_leverage_short: tally.short.avg_leverage(),
            total_long_pnl: tally.long.total_pnl(),
            total_short_pnl: tally.short.total_pnl(),
            signal: self.classifier.classify(long_percent, short_percent),
            symbol: tally.symbol,
        }
    }
}

impl Default for ConsensusBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_CONSENSUS_PERCENT)
    }
}
