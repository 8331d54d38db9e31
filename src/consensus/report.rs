//! Plain-text renderings of a consensus list.

use crate::models::SymbolConsensus;

/// Actionable signals surfaced in the notifier report.
pub const REPORT_SIGNAL_LIMIT: usize = 5;

/// Most-held symbols listed at the end of the notifier report.
pub const REPORT_TOP_SYMBOLS: usize = 3;

/// Rows shown in the console table.
pub const CONSOLE_ROWS: usize = 10;

/// Markdown report handed to the notifier: up to five actionable signals
/// followed by the three symbols with the most positions.
pub fn format_consensus_report(consensus: &[SymbolConsensus], min_consensus_percent: f64) -> String {
    if consensus.is_empty() {
        return "No position data".to_string();
    }

    let mut lines = vec!["*CONSENSUS REPORT*".to_string(), String::new()];

    let actionable: Vec<&SymbolConsensus> = consensus
        .iter()
        .filter(|c| c.signal.is_actionable())
        .take(REPORT_SIGNAL_LIMIT)
        .collect();

    if actionable.is_empty() {
        lines.push(format!(
            "No clear consensus (minimum {:.0}% required)",
            min_consensus_percent
        ));
        lines.push(String::new());
    } else {
        lines.push("*SIGNALS:*".to_string());
        lines.push(String::new());

        for c in actionable {
            let direction = c
                .signal
                .trade_side()
                .map(|side| side.as_str())
                .unwrap_or("NEUTRAL");
            lines.push(format!("{} *{}* {}", c.signal.marker(), c.symbol, c.signal));
            lines.push(format!("  {}: {:.1}%", direction, c.dominant_percent()));
            lines.push(format!(
                "  Traders: {} ({} LONG / {} SHORT)",
                c.total_count, c.long_count, c.short_count
            ));
            lines.push(String::new());
        }
    }

    lines.push("*Most active:*".to_string());
    lines.push(String::new());
    for c in consensus.iter().take(REPORT_TOP_SYMBOLS) {
        lines.push(format!(
            "  {}: {:.1}% LONG ({} traders)",
            c.symbol, c.long_percent, c.total_count
        ));
    }

    lines.join("\n")
}

/// Fixed-width table of the first rows for terminal output.
pub fn format_console_table(consensus: &[SymbolConsensus]) -> String {
    let mut out = format!(
        "\n{:<12} {:<12} {:>14} {:>14} {:>8} {:>8}\n",
        "SYMBOL", "SIGNAL", "LONG", "SHORT", "LEV L", "LEV S"
    );
    out.push_str(&"-".repeat(73));

    for c in consensus.iter().take(CONSOLE_ROWS) {
        out.push_str(&format!(
            "\n{:<12} {:<12} {:>8.1}% ({:>3}) {:>8.1}% ({:>3}) {:>7.1}x {:>7.1}x",
            c.symbol,
            c.signal.as_str(),
            c.long_percent,
            c.long_count,
            c.short_percent,
            c.short_count,
            c.avg_leverage_long,
            c.avg_leverage_short
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Signal;
    use rust_decimal::Decimal;

    fn row(symbol: &str, long_count: usize, short_count: usize, signal: Signal) -> SymbolConsensus {
        let total = long_count + short_count;
        SymbolConsensus {
            symbol: symbol.to_string(),
            long_count,
            short_count,
            total_count: total,
            long_percent: long_count as f64 * 100.0 / total as f64,
            short_percent: short_count as f64 * 100.0 / total as f64,
            avg_leverage_long: 0.0,
            avg_leverage_short: 0.0,
            total_long_pnl: Decimal::ZERO,
            total_short_pnl: Decimal::ZERO,
            signal,
        }
    }

    #[test]
    fn test_empty_report() {
        assert_eq!(format_consensus_report(&[], 60.0), "No position data");
    }

    #[test]
    fn test_report_lists_signals_then_top_symbols() {
        let consensus = vec![
            row("ETHUSDT", 1, 5, Signal::StrongSell),
            row("BTCUSDT", 4, 1, Signal::StrongBuy),
            row("SOLUSDT", 2, 2, Signal::Neutral),
            row("XRPUSDT", 1, 0, Signal::StrongBuy),
        ];

        let report = format_consensus_report(&consensus, 60.0);
        assert!(report.contains("*ETHUSDT* STRONG_SELL"));
        assert!(report.contains("SHORT: 83.3%"));
        assert!(report.contains("Traders: 5 (4 LONG / 1 SHORT)"));
        assert!(!report.contains("*SOLUSDT*"));

        let top = report.split("*Most active:*").nth(1).unwrap();
        assert!(top.contains("ETHUSDT: 16.7% LONG (6 traders)"));
        assert!(top.contains("SOLUSDT: 50.0% LONG (4 traders)"));
        assert!(!top.contains("XRPUSDT"));
    }

    #[test]
    fn test_report_caps_signal_blocks() {
        let consensus: Vec<SymbolConsensus> = (0..8)
            .map(|i| row(&format!("SYM{i}USDT"), 3, 0, Signal::StrongBuy))
            .collect();

        let report = format_consensus_report(&consensus, 60.0);
        assert_eq!(report.matches("STRONG_BUY").count(), REPORT_SIGNAL_LIMIT);
    }

    #[test]
    fn test_report_without_actionable_signals() {
        let consensus = vec![row("SOLUSDT", 3, 3, Signal::Neutral)];
        let report = format_consensus_report(&consensus, 65.0);
        assert!(report.contains("No clear consensus (minimum 65% required)"));
    }

    #[test]
    fn test_console_table_rows() {
        let consensus: Vec<SymbolConsensus> = (0..12)
            .map(|i| row(&format!("S{i}"), 1, 1, Signal::Neutral))
            .collect();
        let table = format_console_table(&consensus);
        // Header, rule, and ten rows
        assert_eq!(table.trim_start().lines().count(), 2 + CONSOLE_ROWS);
    }
}
