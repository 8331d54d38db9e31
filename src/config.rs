//! Scanner configuration.

use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use anyhow::Result;
use tracing::warn;

use crate::consensus::DEFAULT_MIN_CONSENSUS_PERCENT;
use crate::models::Trader;

/// Symbol allowlist; `None` means every symbol is tracked.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackedSymbols(Option<HashSet<String>>);

impl TrackedSymbols {
    /// Parse a comma-separated list such as `"BTCUSDT, ethusdt"`.
    pub fn parse(raw: &str) -> Self {
        let symbols: HashSet<String> = raw
            .split(',')
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect();

        Self((!symbols.is_empty()).then_some(symbols))
    }

    pub fn as_filter(&self) -> Option<&HashSet<String>> {
        self.0.as_ref()
    }
}

impl fmt::Display for TrackedSymbols {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            None => write!(f, "all"),
            Some(symbols) => {
                let mut sorted: Vec<&str> = symbols.iter().map(String::as_str).collect();
                sorted.sort_unstable();
                write!(f, "{}", sorted.join(", "))
            }
        }
    }
}

/// Minimum track record a leaderboard trader needs to be counted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraderFilter {
    /// Minimum lifetime ROI in percent
    pub min_roi_pct: f64,

    /// Minimum win rate in percent
    pub min_win_rate_pct: f64,

    /// Minimum number of trading days
    pub min_trading_days: u32,
}

impl Default for TraderFilter {
    fn default() -> Self {
        Self {
            min_roi_pct: 100.0,
            min_win_rate_pct: 55.0,
            min_trading_days: 30,
        }
    }
}

impl TraderFilter {
    /// Keep the qualifying traders in leaderboard order.
    ///
    /// Fails when a non-empty leaderboard is rejected entirely, so the cycle
    /// reports the filter rather than an empty source.
    pub fn apply(&self, traders: Vec<Trader>) -> Result<Vec<Trader>> {
        let fetched = traders.len();
        let kept: Vec<Trader> = traders
            .into_iter()
            .filter(|t| t.meets_requirements(self.min_roi_pct, self.min_win_rate_pct, self.min_trading_days))
            .collect();

        if fetched > 0 && kept.is_empty() {
            warn!(
                fetched,
                min_roi_pct = self.min_roi_pct,
                min_win_rate_pct = self.min_win_rate_pct,
                min_trading_days = self.min_trading_days,
                "Trader filter rejected every leaderboard trader"
            );
            anyhow::bail!(
                "All {} leaderboard traders rejected by the trader filter (min ROI {}%, min win rate {}%, min trading days {})",
                fetched,
                self.min_roi_pct,
                self.min_win_rate_pct,
                self.min_trading_days
            );
        }

        Ok(kept)
    }
}

/// Configuration for one scan cycle and the polling loop.
#[derive(Debug, Clone)]
pub struct ConsensusConfig {
    /// Minimum share of traders on one side for a BUY/SELL signal
    pub min_consensus_percent: f64,

    /// How many leaderboard entries to request
    pub top_traders_count: u32,

    /// Time between scan cycles in watch mode
    pub update_interval: Duration,

    /// Pause between per-trader position requests
    pub request_delay: Duration,

    pub tracked_symbols: TrackedSymbols,

    pub trader_filter: TraderFilter,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            min_consensus_percent: DEFAULT_MIN_CONSENSUS_PERCENT,
            top_traders_count: 100,
            update_interval: Duration::from_secs(15 * 60),
            request_delay: Duration::from_millis(1000),
            tracked_symbols: TrackedSymbols::default(),
            trader_filter: TraderFilter::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes_symbols() {
        let tracked = TrackedSymbols::parse(" btcusdt, ETHUSDT ,,solusdt ");
        let filter = tracked.as_filter().unwrap();

        assert_eq!(filter.len(), 3);
        assert!(filter.contains("BTCUSDT"));
        assert!(filter.contains("SOLUSDT"));
        assert_eq!(tracked.to_string(), "BTCUSDT, ETHUSDT, SOLUSDT");
    }

    #[test]
    fn test_empty_list_tracks_everything() {
        assert_eq!(TrackedSymbols::parse(""), TrackedSymbols::default());
        assert!(TrackedSymbols::parse(" , ").as_filter().is_none());
        assert_eq!(TrackedSymbols::default().to_string(), "all");
    }

    fn trader(id: &str, roi_pct: f64, win_rate_pct: Option<f64>, trading_days: Option<u32>) -> Trader {
        Trader {
            roi_pct,
            win_rate_pct,
            trading_days,
            ..Trader::new(id, id)
        }
    }

    #[test]
    fn test_filter_keeps_qualified_and_unreported() {
        let traders = vec![
            trader("veteran", 150.0, Some(60.0), Some(90)),
            trader("low_roi", 50.0, Some(70.0), Some(90)),
            trader("new", 300.0, Some(80.0), Some(5)),
            trader("no_stats", 500.0, None, None),
        ];

        let kept = TraderFilter::default().apply(traders).unwrap();
        let ids: Vec<&str> = kept.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["veteran", "no_stats"]);
    }

    #[test]
    fn test_filter_rejecting_everyone_is_an_error() {
        let traders = vec![trader("a", 10.0, None, None), trader("b", 20.0, Some(90.0), Some(100))];

        let err = TraderFilter::default().apply(traders).unwrap_err();
        assert!(err.to_string().contains("All 2 leaderboard traders rejected"));
    }

    #[test]
    fn test_filter_passes_empty_leaderboard_through() {
        assert!(TraderFilter::default().apply(Vec::new()).unwrap().is_empty());
    }

    #[test]
    fn test_defaults() {
        let config = ConsensusConfig::default();
        assert_eq!(config.min_consensus_percent, 60.0);
        assert_eq!(config.top_traders_count, 100);
        assert_eq!(config.update_interval, Duration::from_secs(900));
        assert_eq!(config.trader_filter.min_trading_days, 30);
    }
}
