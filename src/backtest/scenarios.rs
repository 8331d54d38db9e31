//! Built-in historical scenarios and JSON scenario loading.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::{HistoricalPosition, Scenario};
use crate::models::{PositionSide, Trader};

/// The three reference scenarios: bull run, crash, and an even split.
pub fn builtin() -> Vec<Scenario> {
    vec![btc_bull_run(), eth_crash(), mixed_signals()]
}

/// Load scenarios from a JSON array file.
pub fn load(path: &Path) -> Result<Vec<Scenario>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse scenario file {}", path.display()))
}

/// BTC rallies from ~40k to 44k while 4 of 5 traders are long.
pub fn btc_bull_run() -> Scenario {
    let date = Utc::now();
    let traders = vec![
        trader("t1", "ProTrader1", 1, 250.0, 70.0),
        trader("t2", "CryptoKing", 2, 200.0, 65.0),
        trader("t3", "WhaleHunter", 3, 180.0, 62.0),
        trader("t4", "AlphaBot", 4, 150.0, 58.0),
        trader("t5", "TrendMaster", 5, 140.0, 60.0),
    ];

    use PositionSide::*;
    let positions = [
        ("t1", Long, dec!(40000), 2, dec!(10.0)),
        ("t2", Long, dec!(40200), 1, dec!(9.45)),
        ("t3", Long, dec!(39800), 3, dec!(10.55)),
        ("t4", Short, dec!(41000), 1, dec!(-7.3)),
        ("t5", Long, dec!(40500), 2, dec!(8.6)),
    ]
    .into_iter()
    .map(|(id, side, entry, hours, pnl)| {
        (id.to_string(), vec![historical("BTCUSDT", side, entry, dec!(44000), date, hours, pnl)])
    })
    .collect();

    Scenario {
        name: "BTC Bull Run".to_string(),
        description: "BTC rises from 40k to 44k, 80% of traders LONG".to_string(),
        date,
        traders,
        positions,
        expected_consensus: [("BTCUSDT".to_string(), 80.0)].into_iter().collect(),
    }
}

/// ETH falls from ~2500 to 2200 while 5 of 6 traders are short.
pub fn eth_crash() -> Scenario {
    let date = Utc::now();
    let traders = vec![
        trader("t1", "BearMaster", 1, 300.0, 75.0),
        trader("t2", "ShortKing", 2, 250.0, 70.0),
        trader("t3", "Doomer", 3, 200.0, 68.0),
        trader("t4", "RektProof", 4, 180.0, 65.0),
        trader("t5", "Cautious", 5, 150.0, 60.0),
        trader("t6", "Bullish", 6, 140.0, 55.0),
    ];

    use PositionSide::*;
    let positions = [
        ("t1", Short, dec!(2500), 2, dec!(12.0)),
        ("t2", Short, dec!(2520), 1, dec!(12.7)),
        ("t3", Short, dec!(2480), 3, dec!(11.3)),
        ("t4", Short, dec!(2550), 2, dec!(13.7)),
        ("t5", Short, dec!(2490), 1, dec!(11.6)),
        ("t6", Long, dec!(2450), 2, dec!(-10.2)),
    ]
    .into_iter()
    .map(|(id, side, entry, hours, pnl)| {
        (id.to_string(), vec![historical("ETHUSDT", side, entry, dec!(2200), date, hours, pnl)])
    })
    .collect();

    Scenario {
        name: "ETH Crash".to_string(),
        description: "ETH falls from 2500 to 2200, 83% of traders SHORT".to_string(),
        date,
        traders,
        positions,
        // 16.7% LONG = 83.3% SHORT
        expected_consensus: [("ETHUSDT".to_string(), 16.7)].into_iter().collect(),
    }
}

/// SOL split 50/50 between longs and shorts; no consensus.
pub fn mixed_signals() -> Scenario {
    let date = Utc::now();
    let traders = vec![
        trader("t1", "BullA", 1, 200.0, 60.0),
        trader("t2", "BearA", 2, 190.0, 58.0),
        trader("t3", "BullB", 3, 180.0, 55.0),
        trader("t4", "BearB", 4, 170.0, 57.0),
        trader("t5", "BullC", 5, 160.0, 54.0),
        trader("t6", "BearC", 6, 150.0, 56.0),
    ];

    use PositionSide::*;
    let positions = [
        ("t1", Long, dec!(100), 1, dec!(-2.0)),
        ("t2", Short, dec!(102), 1, dec!(3.9)),
        ("t3", Long, dec!(101), 2, dec!(-3.0)),
        ("t4", Short, dec!(103), 1, dec!(4.9)),
        ("t5", Long, dec!(99), 3, dec!(-1.0)),
        ("t6", Short, dec!(100), 2, dec!(2.0)),
    ]
    .into_iter()
    .map(|(id, side, entry, hours, pnl)| {
        (id.to_string(), vec![historical("SOLUSDT", side, entry, dec!(98), date, hours, pnl)])
    })
    .collect();

    Scenario {
        name: "Mixed Signals".to_string(),
        description: "SOL split 50/50, no consensus".to_string(),
        date,
        traders,
        positions,
        expected_consensus: [("SOLUSDT".to_string(), 50.0)].into_iter().collect(),
    }
}

fn trader(id: &str, name: &str, rank: u32, roi_pct: f64, win_rate_pct: f64) -> Trader {
    Trader {
        rank,
        roi_pct,
        win_rate_pct: Some(win_rate_pct),
        trading_days: Some(30),
        ..Trader::new(id, name)
    }
}

fn historical(
    symbol: &str,
    side: PositionSide,
    entry_price: Decimal,
    exit_price: Decimal,
    closed_at: DateTime<Utc>,
    hours_held: i64,
    pnl: Decimal,
) -> HistoricalPosition {
    HistoricalPosition {
        symbol: symbol.to_string(),
        side,
        entry_price,
        exit_price,
        entry_time: closed_at - Duration::hours(hours_held),
        exit_time: closed_at,
        pnl,
    }
}
