//! Scan orchestration: collect, build consensus, report, alert.
//!
//! Handles:
//! - One full scan cycle over a position source
//! - Console output of the consensus table
//! - Delivery of the report and strong-signal alerts
//! - The polling loop with Ctrl+C shutdown

use std::future::Future;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::Notify;
use tokio::time::interval;
use tracing::{debug, error, info, warn};

use crate::api::PositionSource;
use crate::config::{ConsensusConfig, TrackedSymbols};
use crate::consensus::{format_console_table, format_consensus_report, ConsensusBuilder};
use crate::notify::{AlertDetails, AlertSink};

/// Leaderboard entries echoed to the log each cycle.
const LOGGED_TOP_TRADERS: usize = 5;

/// Counts from one scan cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanSummary {
    pub traders: usize,
    pub traders_with_positions: usize,
    pub symbols: usize,
    pub actionable: usize,
    pub alerts_sent: usize,
}

/// Runs scan cycles from a position source into an alert sink.
pub struct Scanner<S, N> {
    source: S,
    sink: N,
    builder: ConsensusBuilder,
    tracked_symbols: TrackedSymbols,
    update_interval: Duration,
}

impl<S: PositionSource, N: AlertSink> Scanner<S, N> {
    pub fn new(source: S, sink: N, config: &ConsensusConfig) -> Self {
        Self {
            source,
            sink,
            builder: ConsensusBuilder::new(config.min_consensus_percent),
            tracked_symbols: config.tracked_symbols.clone(),
            update_interval: config.update_interval,
        }
    }

    /// Single scan cycle. Nothing is carried over between cycles.
    pub async fn run_once(&self) -> Result<ScanSummary> {
        let snapshot = self
            .source
            .fetch_snapshot()
            .await
            .context("Failed to collect trader snapshot")?;

        if snapshot.traders.is_empty() {
            anyhow::bail!("No traders returned by the position source");
        }

        for trader in snapshot.traders.iter().take(LOGGED_TOP_TRADERS) {
            info!(
                rank = trader.rank,
                trader = %trader.display_name(),
                roi_pct = trader.roi_pct,
                win_rate_pct = trader.win_rate_pct,
                "Top trader"
            );
        }

        let consensus = self.builder.build(
            &snapshot.traders,
            &snapshot.positions,
            self.tracked_symbols.as_filter(),
        );

        println!("{}", format_console_table(&consensus));

        let report = format_consensus_report(&consensus, self.builder.min_consensus_percent());
        if let Err(e) = self.sink.emit_report(&report).await {
            warn!(error = %e, "Failed to deliver consensus report");
        }

        let mut alerts_sent = 0;
        for c in consensus.iter().filter(|c| c.signal.is_strong()) {
            match self.sink.emit_alert(&c.symbol, c.signal, &AlertDetails::from(c)).await {
                Ok(()) => alerts_sent += 1,
                Err(e) => warn!(symbol = %c.symbol, signal = %c.signal, error = %e, "Failed to deliver alert"),
            }
        }

        let summary = ScanSummary {
            traders: snapshot.traders.len(),
            traders_with_positions: snapshot.positions.len(),
            symbols: consensus.len(),
            actionable: ConsensusBuilder::actionable(&consensus).len(),
            alerts_sent,
        };

        info!(
            traders = summary.traders,
            with_positions = summary.traders_with_positions,
            symbols = summary.symbols,
            actionable = summary.actionable,
            alerts = summary.alerts_sent,
            "Scan complete"
        );

        Ok(summary)
    }

    /// Scan immediately, then every update interval until Ctrl+C.
    ///
    /// A failed cycle is logged and the loop waits for the next tick.
    pub async fn run(&self) -> Result<()> {
        info!(
            interval_mins = self.update_interval.as_secs() / 60,
            "Starting watch loop"
        );

        let shutdown = Arc::new(AtomicBool::new(false));
        let wake = Arc::new(Notify::new());

        tokio::spawn(watch_for_shutdown(
            tokio::signal::ctrl_c(),
            shutdown.clone(),
            wake.clone(),
        ));

        let mut ticker = interval(self.update_interval);

        while !shutdown.load(Ordering::SeqCst) {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = wake.notified() => break,
            }

            if shutdown.load(Ordering::SeqCst) {
                break;
            }

            debug!("Scan tick");
            if let Err(e) = self.run_once().await {
                error!(error = ?e, "Scan cycle failed");
            }
        }

        info!("Watch loop stopped");
        Ok(())
    }
}

/// Raise `shutdown` and wake the loop once `signal` resolves.
///
/// If the handler cannot be installed the task parks forever so the loop keeps running.
async fn watch_for_shutdown<F>(signal: F, shutdown: Arc<AtomicBool>, wake: Arc<Notify>)
where
    F: Future<Output = io::Result<()>>,
{
    match signal.await {
        Ok(()) => {
            info!("Shutdown signal received");
            shutdown.store(true, Ordering::SeqCst);
            wake.notify_one();
        }
        Err(e) => {
            error!(error = %e, "Failed to install Ctrl+C handler; watch loop runs until the process is killed");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Snapshot;
    use crate::models::{Position, PositionBook, PositionSide, Signal, Trader};
    use rust_decimal_macros::dec;
    use std::sync::Mutex;

    struct StaticSource(Snapshot);

    impl PositionSource for StaticSource {
        async fn fetch_snapshot(&self) -> Result<Snapshot> {
            Ok(self.0.clone())
        }
    }

    struct FailingSource;

    impl PositionSource for FailingSource {
        async fn fetch_snapshot(&self) -> Result<Snapshot> {
            anyhow::bail!("leaderboard unavailable")
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        reports: Mutex<Vec<String>>,
        alerts: Mutex<Vec<(String, Signal)>>,
        fail_reports: bool,
    }

    impl AlertSink for RecordingSink {
        async fn emit_report(&self, text: &str) -> Result<()> {
            if self.fail_reports {
                anyhow::bail!("chat not found");
            }
            self.reports.lock().unwrap().push(text.to_string());
            Ok(())
        }

        async fn emit_alert(&self, symbol: &str, signal: Signal, _details: &AlertDetails) -> Result<()> {
            self.alerts.lock().unwrap().push((symbol.to_string(), signal));
            Ok(())
        }
    }

    /// Five traders: 4/5 long BTC, ETH split 1/1, SOL 2/3 long.
    fn snapshot() -> Snapshot {
        let long = |symbol: &str| Position::new(symbol, PositionSide::Long, dec!(100), dec!(110));
        let short = |symbol: &str| Position::new(symbol, PositionSide::Short, dec!(100), dec!(90));

        let positions: PositionBook = [
            ("t1", vec![long("BTCUSDT"), long("ETHUSDT"), long("SOLUSDT")]),
            ("t2", vec![long("BTCUSDT"), short("ETHUSDT"), long("SOLUSDT")]),
            ("t3", vec![long("BTCUSDT"), short("SOLUSDT")]),
            ("t4", vec![long("BTCUSDT")]),
            ("t5", vec![short("BTCUSDT")]),
        ]
        .into_iter()
        .map(|(id, list)| (id.to_string(), list))
        .collect();

        Snapshot {
            traders: (1..=5).map(|i| Trader::new(format!("t{i}"), format!("Trader {i}"))).collect(),
            positions,
        }
    }

    #[tokio::test]
    async fn test_run_once_reports_and_alerts_strong_signals() {
        let scanner = Scanner::new(
            StaticSource(snapshot()),
            RecordingSink::default(),
            &ConsensusConfig::default(),
        );

        let summary = scanner.run_once().await.unwrap();
        assert_eq!(
            summary,
            ScanSummary {
                traders: 5,
                traders_with_positions: 5,
                symbols: 3,
                actionable: 2,
                alerts_sent: 1,
            }
        );

        let reports = scanner.sink.reports.lock().unwrap();
        assert_eq!(reports.len(), 1);
        assert!(reports[0].starts_with("*CONSENSUS REPORT*"));
        assert!(reports[0].contains("*BTCUSDT* STRONG_BUY"));
        assert!(reports[0].contains("*SOLUSDT* BUY"));

        let alerts = scanner.sink.alerts.lock().unwrap();
        assert_eq!(*alerts, vec![("BTCUSDT".to_string(), Signal::StrongBuy)]);
    }

    #[tokio::test]
    async fn test_allowlist_limits_symbols() {
        let config = ConsensusConfig {
            tracked_symbols: TrackedSymbols::parse("ethusdt"),
            ..ConsensusConfig::default()
        };
        let scanner = Scanner::new(StaticSource(snapshot()), RecordingSink::default(), &config);

        let summary = scanner.run_once().await.unwrap();
        assert_eq!(summary.symbols, 1);
        assert_eq!(summary.actionable, 0);
        assert_eq!(summary.alerts_sent, 0);
        assert!(scanner.sink.reports.lock().unwrap()[0].contains("No clear consensus (minimum 60% required)"));
    }

    #[tokio::test]
    async fn test_report_failure_does_not_abort_scan() {
        let sink = RecordingSink {
            fail_reports: true,
            ..Default::default()
        };
        let scanner = Scanner::new(StaticSource(snapshot()), sink, &ConsensusConfig::default());

        let summary = scanner.run_once().await.unwrap();
        assert_eq!(summary.alerts_sent, 1);
    }

    #[tokio::test]
    async fn test_empty_leaderboard_fails_cycle() {
        let scanner = Scanner::new(
            StaticSource(Snapshot::default()),
            RecordingSink::default(),
            &ConsensusConfig::default(),
        );

        let err = scanner.run_once().await.unwrap_err();
        assert!(err.to_string().contains("No traders"));
        assert!(scanner.sink.reports.lock().unwrap().is_empty());
    }

    #[test]
    fn test_source_error_is_propagated_with_context() {
        let scanner = Scanner::new(FailingSource, None::<RecordingSink>, &ConsensusConfig::default());

        let err = tokio_test::block_on(scanner.run_once()).unwrap_err();
        assert_eq!(err.to_string(), "Failed to collect trader snapshot");
        assert!(format!("{err:#}").contains("leaderboard unavailable"));
    }

    #[tokio::test]
    async fn test_shutdown_signal_sets_flag() {
        let shutdown = Arc::new(AtomicBool::new(false));
        let wake = Arc::new(Notify::new());

        watch_for_shutdown(async { Ok(()) }, shutdown.clone(), wake.clone()).await;

        assert!(shutdown.load(Ordering::SeqCst));
        // notify_one stores a permit for the next waiter
        tokio::time::timeout(Duration::from_millis(100), wake.notified())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_failed_signal_handler_keeps_loop_running() {
        let shutdown = Arc::new(AtomicBool::new(false));
        let wake = Arc::new(Notify::new());

        let watcher = watch_for_shutdown(
            async { Err(io::Error::other("signal driver unavailable")) },
            shutdown.clone(),
            wake,
        );

        assert!(tokio::time::timeout(Duration::from_millis(50), watcher).await.is_err());
        assert!(!shutdown.load(Ordering::SeqCst));
    }
}
