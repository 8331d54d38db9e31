//! Consensus Trader
//!
//! Scans the open positions of top futures-leaderboard traders, turns the
//! per-symbol long/short split into trading signals, and backtests the
//! signal rules against historical scenarios.

mod api;
mod backtest;
mod config;
mod consensus;
mod metrics;
mod models;
mod notify;
mod scanner;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::api::{LeaderboardClient, LeaderboardSource, PositionSource, SnapshotFile};
use crate::backtest::{scenarios, BacktestSimulator};
use crate::config::{ConsensusConfig, TrackedSymbols, TraderFilter};
use crate::consensus::format_console_table;
use crate::models::round_cents;
use crate::notify::{Broadcast, ConsoleSink, TelegramNotifier};
use crate::scanner::Scanner;

/// Futures leaderboard consensus scanner CLI.
#[derive(Parser)]
#[command(name = "consensus-trader")]
#[command(about = "Follow the consensus of top futures traders", long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Commands,
}

/// Settings shared by every subcommand, readable from the environment or `.env`.
#[derive(Args, Debug)]
struct Settings {
    /// Minimum share of traders on one side for a BUY/SELL signal (percent)
    #[arg(long, env = "MIN_CONSENSUS_PERCENT", default_value_t = 60.0, global = true)]
    min_consensus: f64,

    /// Number of leaderboard traders to scan
    #[arg(long, env = "TOP_TRADERS_COUNT", default_value_t = 100, global = true)]
    top_traders: u32,

    /// Minutes between scans in watch mode
    #[arg(
        long,
        env = "UPDATE_INTERVAL_MINUTES",
        default_value_t = 15,
        value_parser = clap::value_parser!(u64).range(1..),
        global = true
    )]
    interval_minutes: u64,

    /// Minimum trader ROI (percent)
    #[arg(long, env = "MIN_ROI_PERCENT", default_value_t = 100.0, global = true)]
    min_roi: f64,

    /// Minimum trader win rate (percent)
    #[arg(long, env = "MIN_WIN_RATE", default_value_t = 55.0, global = true)]
    min_win_rate: f64,

    /// Minimum number of trading days
    #[arg(long, env = "MIN_TRADING_DAYS", default_value_t = 30, global = true)]
    min_trading_days: u32,

    /// Comma-separated symbols to track (empty = all)
    #[arg(long, env = "TRACKED_SYMBOLS", default_value = "", global = true)]
    tracked_symbols: String,

    /// Pause between per-trader position requests (milliseconds)
    #[arg(long, env = "POSITION_REQUEST_DELAY_MS", default_value_t = 1000, global = true)]
    request_delay_ms: u64,

    /// Leaderboard session cookie
    #[arg(long, env = "BINANCE_COOKIES", hide_env_values = true, global = true)]
    binance_cookies: Option<String>,

    /// Telegram bot token for alerts
    #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true, global = true)]
    telegram_bot_token: Option<String>,

    /// Telegram chat to post alerts to
    #[arg(long, env = "TELEGRAM_CHAT_ID", global = true)]
    telegram_chat_id: Option<String>,
}

impl Settings {
    fn consensus_config(&self) -> ConsensusConfig {
        ConsensusConfig {
            min_consensus_percent: self.min_consensus,
            top_traders_count: self.top_traders,
            update_interval: Duration::from_secs(self.interval_minutes * 60),
            request_delay: Duration::from_millis(self.request_delay_ms),
            tracked_symbols: TrackedSymbols::parse(&self.tracked_symbols),
            trader_filter: TraderFilter {
                min_roi_pct: self.min_roi,
                min_win_rate_pct: self.min_win_rate,
                min_trading_days: self.min_trading_days,
            },
        }
    }

    fn leaderboard_source(&self, config: &ConsensusConfig) -> Result<LeaderboardSource> {
        let cookies = self.binance_cookies.as_deref().unwrap_or_default();
        if cookies.is_empty() {
            anyhow::bail!("BINANCE_COOKIES is not set; export it or pass --snapshot <file> to scan offline");
        }

        Ok(LeaderboardSource::new(
            LeaderboardClient::new(cookies)?,
            config.top_traders_count,
            config.trader_filter,
            config.request_delay,
        ))
    }

    fn telegram(&self) -> Result<Option<TelegramNotifier>> {
        let notifier = TelegramNotifier::from_parts(
            self.telegram_bot_token.as_deref(),
            self.telegram_chat_id.as_deref(),
        )?;
        if notifier.is_none() {
            warn!("Telegram is not configured; alerts go to the console only");
        }
        Ok(notifier)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single scan cycle
    Scan {
        /// Read traders and positions from a JSON snapshot instead of the leaderboard
        #[arg(long)]
        snapshot: Option<PathBuf>,
    },

    /// Scan repeatedly until Ctrl+C
    Watch {
        /// Read traders and positions from a JSON snapshot instead of the leaderboard
        #[arg(long)]
        snapshot: Option<PathBuf>,
    },

    /// Replay historical scenarios through the consensus rules
    Backtest {
        /// JSON file with scenarios (defaults to the built-in set)
        #[arg(long)]
        scenarios: Option<PathBuf>,
    },

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Setup logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level.to_lowercase()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let settings = cli.settings;
    let config = settings.consensus_config();

    match cli.command {
        Commands::Scan { snapshot } => match snapshot {
            Some(path) => scan(SnapshotFile::new(path), &settings, &config, false).await?,
            None => scan(settings.leaderboard_source(&config)?, &settings, &config, false).await?,
        },

        Commands::Watch { snapshot } => match snapshot {
            Some(path) => scan(SnapshotFile::new(path), &settings, &config, true).await?,
            None => scan(settings.leaderboard_source(&config)?, &settings, &config, true).await?,
        },

        Commands::Backtest { scenarios: path } => {
            let scenarios = match &path {
                Some(path) => scenarios::load(path)?,
                None => scenarios::builtin(),
            };

            info!(
                scenarios = scenarios.len(),
                min_consensus = config.min_consensus_percent,
                "Starting backtest"
            );

            println!("\n=== Consensus Backtest ===");
            println!("Scenarios:      {}", scenarios.len());
            println!("Min Consensus:  {:.0}%", config.min_consensus_percent);

            let report = BacktestSimulator::new(config.min_consensus_percent).run(&scenarios);

            for run in &report.runs {
                println!("\n--- {} ---", run.name);
                if !run.description.is_empty() {
                    println!("{}", run.description);
                }
                println!("{}", format_console_table(&run.consensus));

                if run.trades.is_empty() {
                    println!("\n  No trades (no actionable signal)");
                }
                for trade in &run.trades {
                    println!(
                        "\n  {} {} [{}] {:.2} -> {:.2} | P&L: {:.2} ({:.2}%)",
                        trade.side,
                        trade.symbol,
                        trade.signal,
                        round_cents(trade.entry_price),
                        round_cents(trade.exit_price),
                        round_cents(trade.pnl),
                        round_cents(trade.pnl_percent)
                    );
                }

                for deviation in &run.deviations {
                    warn!(
                        scenario = %run.name,
                        symbol = %deviation.symbol,
                        expected_long_pct = deviation.expected_long_percent,
                        observed_long_pct = ?deviation.observed_long_percent,
                        "Consensus differs from scenario expectation"
                    );
                }
            }

            println!("\n{}", report.result);
        }

        Commands::Config => {
            println!("\n=== Consensus Configuration ===\n");
            println!("Signals:");
            println!("  Min Consensus:        {:.0}%", config.min_consensus_percent);
            println!("  Tracked Symbols:      {}", config.tracked_symbols);

            println!("\nCollection:");
            println!("  Top Traders:          {}", config.top_traders_count);
            println!("  Update Interval:      {}m", config.update_interval.as_secs() / 60);
            println!("  Request Delay:        {}ms", config.request_delay.as_millis());
            println!(
                "  Session Cookie:       {}",
                if settings.binance_cookies.as_deref().is_some_and(|c| !c.is_empty()) { "set" } else { "missing" }
            );

            println!("\nTrader Requirements:");
            println!("  Min ROI:              {:.0}%", config.trader_filter.min_roi_pct);
            println!("  Min Win Rate:         {:.0}%", config.trader_filter.min_win_rate_pct);
            println!("  Min Trading Days:     {}", config.trader_filter.min_trading_days);

            println!("\nNotifications:");
            println!(
                "  Telegram:             {}",
                if TelegramNotifier::is_configured(
                    settings.telegram_bot_token.as_deref(),
                    settings.telegram_chat_id.as_deref(),
                ) {
                    "enabled"
                } else {
                    "disabled"
                }
            );
        }
    }

    Ok(())
}

/// Run one cycle or the watch loop over `source`, alerting to the console and Telegram.
async fn scan<S: PositionSource>(source: S, settings: &Settings, config: &ConsensusConfig, watch: bool) -> Result<()> {
    let sink = Broadcast(ConsoleSink, settings.telegram()?);
    let scanner = Scanner::new(source, sink, config);

    if watch {
        println!("\n=== Consensus Watch ===");
        println!("Interval: {}m", config.update_interval.as_secs() / 60);
        println!("Press Ctrl+C to stop.\n");
        scanner.run().await
    } else {
        scanner.run_once().await.map(|_| ())
    }
}
