//! Candle record and structural validation of a candle series.

use crate::domain::error::SignalError;
use chrono::NaiveDateTime;

/// Minimum rows for any "previous value" comparison.
pub const MIN_CANDLES: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct Candle {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// Name of the first non-finite price field, if any.
    fn non_finite_field(&self) -> Option<&'static str> {
        [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
            ("volume", self.volume),
        ]
        .into_iter()
        .find(|(_, v)| !v.is_finite())
        .map(|(name, _)| name)
    }
}

/// Rejects non-finite price fields and timestamps that are not strictly increasing.
///
/// Rows are never reordered; an out-of-order row is reported with its position.
pub fn validate_candles(candles: &[Candle]) -> Result<(), SignalError> {
    validate_continuation(None, candles, 0)
}

/// Validates `candles` as a continuation of a series whose last timestamp is `after`.
/// `offset` is the row position of `candles[0]` in the full series.
pub(crate) fn validate_continuation(
    after: Option<NaiveDateTime>,
    candles: &[Candle],
    offset: usize,
) -> Result<(), SignalError> {
    let mut prev = after;
    for (i, candle) in candles.iter().enumerate() {
        let row = offset + i;
        if let Some(field) = candle.non_finite_field() {
            return Err(SignalError::malformed(row, format!("{field} is not a finite number")));
        }
        if let Some(p) = prev {
            if candle.timestamp <= p {
                return Err(SignalError::malformed(
                    row,
                    format!(
                        "timestamps must be strictly increasing ({} follows {})",
                        candle.timestamp, p
                    ),
                ));
            }
        }
        prev = Some(candle.timestamp);
    }
    Ok(())
}

/// Explicit pre-flight check: structural validation plus the two-row minimum.
pub fn preflight(candles: &[Candle]) -> Result<(), SignalError> {
    if candles.len() < MIN_CANDLES {
        return Err(SignalError::InsufficientData {
            bars: candles.len(),
            minimum: MIN_CANDLES,
        });
    }
    validate_candles(candles)
}
