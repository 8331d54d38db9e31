//! Delivery of consensus reports and strong-signal alerts.

mod telegram;

use anyhow::Result;
use rust_decimal::Decimal;

use crate::models::{round_cents, Signal, SymbolConsensus};

pub use telegram::TelegramNotifier;

/// Numbers quoted in a strong-signal alert.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertDetails {
    pub long_percent: f64,
    pub short_percent: f64,
    pub long_count: usize,
    pub short_count: usize,
    pub long_pnl: Decimal,
    pub short_pnl: Decimal,
}

impl From<&SymbolConsensus> for AlertDetails {
    fn from(c: &SymbolConsensus) -> Self {
        Self {
            long_percent: c.long_percent,
            short_percent: c.short_percent,
            long_count: c.long_count,
            short_count: c.short_count,
            long_pnl: c.total_long_pnl,
            short_pnl: c.total_short_pnl,
        }
    }
}

/// Destination for scan output.
pub trait AlertSink {
    /// Deliver the full consensus report.
    async fn emit_report(&self, text: &str) -> Result<()>;

    /// Deliver a single-symbol signal alert.
    async fn emit_alert(&self, symbol: &str, signal: Signal, details: &AlertDetails) -> Result<()>;
}

/// Markdown alert for one symbol.
pub fn format_signal_alert(symbol: &str, signal: Signal, details: &AlertDetails) -> String {
    let heading = match signal {
        Signal::StrongBuy => "STRONG BUY SIGNAL",
        Signal::Buy => "BUY SIGNAL",
        Signal::Neutral => "NO SIGNAL",
        Signal::Sell => "SELL SIGNAL",
        Signal::StrongSell => "STRONG SELL SIGNAL",
    };

    [
        format!("*{} {}*", signal.marker(), heading),
        String::new(),
        format!("*{}*", symbol),
        String::new(),
        "*Consensus:*".to_string(),
        format!("LONG: {:.1}% ({} traders)", details.long_percent, details.long_count),
        format!("SHORT: {:.1}% ({} traders)", details.short_percent, details.short_count),
        String::new(),
        "*Total PnL:*".to_string(),
        format!("LONG: ${:.2}", round_cents(details.long_pnl)),
        format!("SHORT: ${:.2}", round_cents(details.short_pnl)),
        String::new(),
        "_Not financial advice._".to_string(),
    ]
    .join("\n")
}

/// Prints everything to stdout.
pub struct ConsoleSink;

impl AlertSink for ConsoleSink {
    async fn emit_report(&self, text: &str) -> Result<()> {
        println!("\n{}\n", text);
        Ok(())
    }

    async fn emit_alert(&self, symbol: &str, signal: Signal, details: &AlertDetails) -> Result<()> {
        println!("\n{}\n", format_signal_alert(symbol, signal, details));
        Ok(())
    }
}

/// Sends to both sinks; both are attempted even if the first fails.
pub struct Broadcast<A, B>(pub A, pub B);

impl<A: AlertSink, B: AlertSink> AlertSink for Broadcast<A, B> {
    async fn emit_report(&self, text: &str) -> Result<()> {
        let first = self.0.emit_report(text).await;
        let second = self.1.emit_report(text).await;
        first.and(second)
    }

    async fn emit_alert(&self, symbol: &str, signal: Signal, details: &AlertDetails) -> Result<()> {
        let first = self.0.emit_alert(symbol, signal, details).await;
        let second = self.1.emit_alert(symbol, signal, details).await;
        first.and(second)
    }
}

/// An unconfigured sink drops everything.
impl<S: AlertSink> AlertSink for Option<S> {
    async fn emit_report(&self, text: &str) -> Result<()> {
        match self {
            Some(sink) => sink.emit_report(text).await,
            None => Ok(()),
        }
    }

    async fn emit_alert(&self, symbol: &str, signal: Signal, details: &AlertDetails) -> Result<()> {
        match self {
            Some(sink) => sink.emit_alert(symbol, signal, details).await,
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        messages: Mutex<Vec<String>>,
        fail: bool,
    }

    impl AlertSink for Recorder {
        async fn emit_report(&self, text: &str) -> Result<()> {
            self.messages.lock().unwrap().push(text.to_string());
            if self.fail {
                anyhow::bail!("delivery failed");
            }
            Ok(())
        }

        async fn emit_alert(&self, symbol: &str, signal: Signal, _details: &AlertDetails) -> Result<()> {
            self.messages.lock().unwrap().push(format!("{symbol} {signal}"));
            Ok(())
        }
    }

    fn details() -> AlertDetails {
        AlertDetails {
            long_percent: 80.0,
            short_percent: 20.0,
            long_count: 4,
            short_count: 1,
            long_pnl: dec!(1234.5),
            short_pnl: dec!(-56.789),
        }
    }

    #[test]
    fn test_format_signal_alert() {
        let text = format_signal_alert("BTCUSDT", Signal::StrongBuy, &details());

        assert!(text.starts_with("*[++] STRONG BUY SIGNAL*"));
        assert!(text.contains("*BTCUSDT*"));
        assert!(text.contains("LONG: 80.0% (4 traders)"));
        assert!(text.contains("SHORT: 20.0% (1 traders)"));
        assert!(text.contains("LONG: $1234.50"));
        assert!(text.contains("SHORT: $-56.79"));
        assert!(text.ends_with("_Not financial advice._"));
    }

    #[tokio::test]
    async fn test_broadcast_attempts_both_sinks() {
        let sink = Broadcast(
            Recorder {
                fail: true,
                ..Default::default()
            },
            Recorder::default(),
        );

        assert!(sink.emit_report("report").await.is_err());
        assert_eq!(sink.0.messages.lock().unwrap().len(), 1);
        assert_eq!(*sink.1.messages.lock().unwrap(), vec!["report".to_string()]);

        sink.emit_alert("ETHUSDT", Signal::StrongSell, &details()).await.unwrap();
        assert_eq!(sink.1.messages.lock().unwrap()[1], "ETHUSDT STRONG_SELL");
    }

    #[tokio::test]
    async fn test_none_sink_is_noop() {
        let sink: Option<Recorder> = None;
        sink.emit_report("ignored").await.unwrap();
        sink.emit_alert("BTCUSDT", Signal::Buy, &details()).await.unwrap();
    }
}
