//! Threshold classification of consensus percentages into signals.

use crate::models::Signal;

/// Share of positions on one side at which a signal becomes STRONG.
pub const STRONG_CONSENSUS_PERCENT: f64 = 70.0;

/// Map long/short percentages to a signal. First matching rule wins:
///
/// 1. long >= 70 -> STRONG_BUY
/// 2. long >= `min_consensus_percent` -> BUY
/// 3. short >= 70 -> STRONG_SELL
/// 4. short >= `min_consensus_percent` -> SELL
/// 5. otherwise NEUTRAL
pub fn classify(long_percent: f64, short_percent: f64, min_consensus_percent: f64) -> Signal {
    if long_percent >= STRONG_CONSENSUS_PERCENT {
        Signal::StrongBuy
    } else if long_percent >= min_consensus_percent {
        Signal::Buy
    } else if short_percent >= STRONG_CONSENSUS_PERCENT {
        Signal::StrongSell
    } else if short_percent >= min_consensus_percent {
        Signal::Sell
    } else {
        Signal::Neutral
    }
}

/// [`classify`] bound to a configured minimum consensus.
#[derive(Debug, Clone, Copy)]
pub struct SignalClassifier {
    min_consensus_percent: f64,
}

impl SignalClassifier {
    pub fn new(min_consensus_percent: f64) -> Self {
        Self { min_consensus_percent }
    }

    pub fn min_consensus_percent(&self) -> f64 {
        self.min_consensus_percent
    }

    pub fn classify(&self, long_percent: f64, short_percent: f64) -> Signal {
        classify(long_percent, short_percent, self.min_consensus_percent)
    }
}
