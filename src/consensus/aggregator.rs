//! Reduces (trader, position) pairs into per-symbol tallies.

use std::collections::{BTreeMap, HashSet};

use rust_decimal::Decimal;
use statrs::statistics::Statistics;

use crate::models::{Position, PositionBook, PositionSide};

/// Positions collected for one side of one symbol.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SideBucket {
    /// Trader ids holding this side, in book order
    pub traders: Vec<String>,
    pub pnls: Vec<Decimal>,
    pub leverages: Vec<u32>,
}

impl SideBucket {
    fn push(&mut self, trader_id: &str, position: &Position) {
        self.traders.push(trader_id.to_string());
        self.pnls.push(position.pnl);
        self.leverages.push(position.leverage);
    }

    pub fn count(&self) -> usize {
        self.traders.len()
    }

    /// Arithmetic mean of leverage values, 0 for an empty side.
    pub fn avg_leverage(&self) -> f64 {
        if self.leverages.is_empty() {
            return 0.0;
        }
        self.leverages.iter().map(|&l| f64::from(l)).mean()
    }

    /// Raw sum of the recorded PnL values.
    pub fn total_pnl(&self) -> Decimal {
        self.pnls.iter().copied().sum()
    }
}

/// Long and short buckets for one symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolTally {
    pub symbol: String,
    pub long: SideBucket,
    pub short: SideBucket,
}

impl SymbolTally {
    fn new(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            long: SideBucket::default(),
            short: SideBucket::default(),
        }
    }

    fn bucket_mut(&mut self, side: PositionSide) -> &mut SideBucket {
        match side {
            PositionSide::Long => &mut self.long,
            PositionSide::Short => &mut self.short,
        }
    }

    pub fn total_count(&self) -> usize {
        self.long.count() + self.short.count()
    }

    /// `(long_percent, short_percent)` of the total position count.
    pub fn percentages(&self) -> (f64, f64) {
        let total = self.total_count() as f64;
        if total == 0.0 {
            return (0.0, 0.0);
        }
        // Scale before dividing so whole-number shares stay exact at the thresholds
        (
            self.long.count() as f64 * 100.0 / total,
            self.short.count() as f64 * 100.0 / total,
        )
    }
}

/// Groups positions by symbol and side, honoring an optional symbol allowlist.
pub struct SymbolAggregator;

impl SymbolAggregator {
    /// Fold every position into its symbol's tally.
    ///
    /// Positions whose symbol is outside `allowlist` contribute nothing. The
    /// result only contains symbols with at least one position, keyed by symbol.
    pub fn aggregate(
        positions: &PositionBook,
        allowlist: Option<&HashSet<String>>,
    ) -> BTreeMap<String, SymbolTally> {
        positions
            .iter()
            .flat_map(|(trader_id, list)| list.iter().map(move |p| (trader_id.as_str(), p)))
            .filter(|(_, p)| allowlist.map_or(true, |allowed| allowed.contains(&p.symbol)))
            .fold(BTreeMap::new(), |mut tallies, (trader_id, position)| {
                tallies
                    .entry(position.symbol.clone())
                    .or_insert_with(|| SymbolTally::new(&position.symbol))
                    .bucket_mut(position.side)
                    .push(trader_id, position);
                tallies
            })
            .into_iter()
            .filter(|(_, tally)| tally.total_count() > 0)
            .collect()
    }
}
