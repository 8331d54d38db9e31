//! Sanity checks applied to collected positions before aggregation.

use rust_decimal::Decimal;
use tracing::warn;

use crate::models::{Position, PositionBook};

use super::error::CollectorError;

/// Check a single position reported for `trader`.
pub fn validate_position(trader: &str, position: &Position) -> Result<(), CollectorError> {
    let invalid = |field: &'static str, reason: String| CollectorError::Validation {
        trader: trader.to_string(),
        field,
        reason,
    };

    if position.symbol.trim().is_empty() {
        return Err(invalid("symbol", "empty".to_string()));
    }
    if position.entry_price < Decimal::ZERO {
        return Err(invalid("entry_price", format!("negative ({})", position.entry_price)));
    }
    if position.mark_price < Decimal::ZERO {
        return Err(invalid("mark_price", format!("negative ({})", position.mark_price)));
    }
    if position.leverage < 1 {
        return Err(invalid("leverage", "must be at least 1".to_string()));
    }
    if !position.roe_pct.is_finite() {
        return Err(invalid("roe", format!("not finite ({})", position.roe_pct)));
    }

    Ok(())
}

/// Drop invalid positions, then traders left with nothing.
pub fn sanitize_book(book: PositionBook) -> PositionBook {
    book.into_iter()
        .filter_map(|(trader, positions)| {
            let kept: Vec<Position> = positions
                .into_iter()
                .filter(|p| match validate_position(&trader, p) {
                    Ok(()) => true,
                    Err(e) => {
                        warn!(error = %e, "Dropping invalid position");
                        false
                    }
                })
                .collect();
            (!kept.is_empty()).then_some((trader, kept))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PositionSide;
    use rust_decimal_macros::dec;

    fn btc() -> Position {
        Position::new("BTCUSDT", PositionSide::Long, dec!(40000), dec!(41000))
    }

    #[test]
    fn test_valid_position_passes() {
        assert!(validate_position("t1", &btc()).is_ok());
    }

    #[test]
    fn test_rejects_bad_fields() {
        let mut empty_symbol = btc();
        empty_symbol.symbol = "  ".to_string();
        let negative = Position::new("BTCUSDT", PositionSide::Long, dec!(-1), dec!(41000));
        let zero_leverage = btc().with_leverage(0);

        for (position, field) in [
            (empty_symbol, "symbol"),
            (negative, "entry_price"),
            (zero_leverage, "leverage"),
        ] {
            match validate_position("t1", &position) {
                Err(CollectorError::Validation { field: f, trader, .. }) => {
                    assert_eq!(f, field);
                    assert_eq!(trader, "t1");
                }
                other => panic!("expected validation error for {field}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_sanitize_drops_invalid_and_empty_traders() {
        let book: PositionBook = [
            ("t1".to_string(), vec![btc(), btc().with_leverage(0)]),
            ("t2".to_string(), vec![btc().with_leverage(0)]),
        ]
        .into_iter()
        .collect();

        let clean = sanitize_book(book);
        assert_eq!(clean.len(), 1);
        assert_eq!(clean["t1"].len(), 1);
    }
}
