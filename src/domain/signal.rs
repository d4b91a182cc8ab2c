//! Entry and exit signal rules.
//!
//! # Evaluation Semantics
//!
//! - Entry (all must hold): close > EMA, EMA rising, MACD crosses above its
//!   signal at this row, RSI inside the inclusive entry band
//! - Exit (any may hold): MACD crosses below its signal at this row,
//!   RSI below the exit threshold, close < EMA
//! - A comparison that references an undefined value is `false`
//! - Rows inside the warm-up span are always `false`

use crate::domain::candle::Candle;
use crate::domain::error::SignalError;
use crate::domain::indicator::{IndicatorRow, IndicatorSeries};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterSpace {
    Buy,
}

/// Optimisable integer parameter: inclusive search range plus default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntParameter {
    pub low: u32,
    pub high: u32,
    pub default: u32,
    pub space: ParameterSpace,
}

impl IntParameter {
    pub const fn new(low: u32, high: u32, default: u32, space: ParameterSpace) -> Self {
        Self {
            low,
            high,
            default,
            space,
        }
    }

    pub fn contains(&self, value: u32) -> bool {
        (self.low..=self.high).contains(&value)
    }
}

pub const RSI_ENTRY_LOW: IntParameter = IntParameter::new(45, 50, 45, ParameterSpace::Buy);
pub const RSI_ENTRY_HIGH: IntParameter = IntParameter::new(50, 55, 55, ParameterSpace::Buy);
pub const DEFAULT_RSI_EXIT: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalParams {
    pub rsi_entry_low: u32,
    pub rsi_entry_high: u32,
    pub rsi_exit: u32,
}

impl Default for SignalParams {
    fn default() -> Self {
        Self {
            rsi_entry_low: RSI_ENTRY_LOW.default,
            rsi_entry_high: RSI_ENTRY_HIGH.default,
            rsi_exit: DEFAULT_RSI_EXIT,
        }
    }
}

impl SignalParams {
    pub fn validate(&self) -> Result<(), SignalError> {
        if self.rsi_entry_low > self.rsi_entry_high {
            return Err(SignalError::invalid(
                "signals",
                "rsi_entry_low",
                format!(
                    "rsi_entry_low ({}) must not exceed rsi_entry_high ({})",
                    self.rsi_entry_low, self.rsi_entry_high
                ),
            ));
        }
        check_range("rsi_entry_low", self.rsi_entry_low, &RSI_ENTRY_LOW)?;
        check_range("rsi_entry_high", self.rsi_entry_high, &RSI_ENTRY_HIGH)?;
        if self.rsi_exit > 100 {
            return Err(SignalError::invalid(
                "signals",
                "rsi_exit",
                "rsi_exit must be between 0 and 100",
            ));
        }
        Ok(())
    }
}

fn check_range(key: &str, value: u32, param: &IntParameter) -> Result<(), SignalError> {
    if !param.contains(value) {
        return Err(SignalError::invalid(
            "signals",
            key,
            format!("{key} must be between {} and {}", param.low, param.high),
        ));
    }
    Ok(())
}

fn gt(a: Option<f64>, b: Option<f64>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a > b)
}

fn lt(a: Option<f64>, b: Option<f64>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a < b)
}

fn le(a: Option<f64>, b: Option<f64>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a <= b)
}

fn ge(a: Option<f64>, b: Option<f64>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a >= b)
}

fn crossed_above(row: &IndicatorRow) -> bool {
    gt(row.macd, row.macd_signal) && le(row.macd_prev, row.macd_signal_prev)
}

fn crossed_below(row: &IndicatorRow) -> bool {
    lt(row.macd, row.macd_signal) && ge(row.macd_prev, row.macd_signal_prev)
}

/// Entry rule for a single row, without warm-up masking.
pub fn entry_condition(close: f64, row: &IndicatorRow, params: &SignalParams) -> bool {
    let in_band = row.rsi.is_some_and(|rsi| {
        rsi >= f64::from(params.rsi_entry_low) && rsi <= f64::from(params.rsi_entry_high)
    });

    gt(Some(close), row.ema) && gt(row.ema, row.ema_prev) && crossed_above(row) && in_band
}

/// Exit rule for a single row, without warm-up masking.
pub fn exit_condition(close: f64, row: &IndicatorRow, params: &SignalParams) -> bool {
    let rsi_breakdown = row.rsi.is_some_and(|rsi| rsi < f64::from(params.rsi_exit));

    crossed_below(row) || rsi_breakdown || lt(Some(close), row.ema)
}

fn evaluate<F>(
    candles: &[Candle],
    indicators: &IndicatorSeries,
    rule: F,
) -> Result<Vec<bool>, SignalError>
where
    F: Fn(f64, &IndicatorRow) -> bool,
{
    if candles.len() != indicators.len() {
        return Err(SignalError::malformed(
            candles.len().min(indicators.len()),
            format!(
                "candle series has {} rows but indicator series has {}",
                candles.len(),
                indicators.len()
            ),
        ));
    }
    let warmup = indicators.config().warmup_len();

    Ok(candles
        .iter()
        .zip(indicators.rows())
        .enumerate()
        .map(|(t, (candle, row))| t >= warmup && rule(candle.close, row))
        .collect())
}

pub fn compute_entry_signal(
    candles: &[Candle],
    indicators: &IndicatorSeries,
    params: &SignalParams,
) -> Result<Vec<bool>, SignalError> {
    params.validate()?;
    evaluate(candles, indicators, |close, row| {
        entry_condition(close, row, params)
    })
}

pub fn compute_exit_signal(
    candles: &[Candle],
    indicators: &IndicatorSeries,
    params: &SignalParams,
) -> Result<Vec<bool>, SignalError> {
    params.validate()?;
    evaluate(candles, indicators, |close, row| {
        exit_condition(close, row, params)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::IndicatorConfig;
    use chrono::{Duration, NaiveDate};

    fn entry_row(rsi: f64) -> IndicatorRow {
        IndicatorRow {
            ema: Some(100.0),
            ema_prev: Some(99.5),
            macd: Some(0.6),
            macd_signal: Some(0.5),
            macd_hist: Some(0.1),
            macd_prev: Some(0.4),
            macd_signal_prev: Some(0.5),
            rsi: Some(rsi),
        }
    }

    fn quiet_row() -> IndicatorRow {
        IndicatorRow {
            ema: Some(100.0),
            ema_prev: Some(99.5),
            macd: Some(0.6),
            macd_signal: Some(0.5),
            macd_hist: Some(0.1),
            macd_prev: Some(0.7),
            macd_signal_prev: Some(0.5),
            rsi: Some(50.0),
        }
    }

    fn candles(n: usize, close: f64) -> Vec<Candle> {
        let base = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        (0..n)
            .map(|i| Candle {
                timestamp: base + Duration::hours(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1.0,
            })
            .collect()
    }

    fn small_config() -> IndicatorConfig {
        IndicatorConfig {
            ema_length: 3,
            macd_fast: 2,
            macd_slow: 3,
            macd_signal: 2,
            rsi_length: 2,
        }
    }

    #[test]
    fn entry_fires_when_all_conditions_hold() {
        assert!(entry_condition(101.0, &entry_row(50.0), &SignalParams::default()));
    }

    #[test]
    fn entry_rsi_lower_bound_inclusive() {
        let params = SignalParams::default();
        assert!(entry_condition(101.0, &entry_row(45.0), &params));
        assert!(!entry_condition(101.0, &entry_row(44.999), &params));
    }

    #[test]
    fn entry_rsi_upper_bound_inclusive() {
        let params = SignalParams::default();
        assert!(entry_condition(101.0, &entry_row(55.0), &params));
        assert!(!entry_condition(101.0, &entry_row(55.001), &params));
    }

    #[test]
    fn entry_requires_close_above_ema() {
        let params = SignalParams::default();
        assert!(!entry_condition(100.0, &entry_row(50.0), &params));
        assert!(!entry_condition(99.0, &entry_row(50.0), &params));
    }

    #[test]
    fn entry_requires_rising_ema() {
        let mut row = entry_row(50.0);
        row.ema_prev = Some(100.0);
        assert!(!entry_condition(101.0, &row, &SignalParams::default()));
    }

    #[test]
    fn entry_requires_fresh_cross() {
        // Already above the signal on the previous row.
        assert!(!entry_condition(101.0, &quiet_row(), &SignalParams::default()));
    }

    #[test]
    fn entry_cross_from_equal_counts() {
        let mut row = entry_row(50.0);
        row.macd_prev = Some(0.5);
        assert!(entry_condition(101.0, &row, &SignalParams::default()));
    }

    #[test]
    fn entry_false_on_undefined_values() {
        let params = SignalParams::default();

        let mut row = entry_row(50.0);
        row.ema_prev = None;
        assert!(!entry_condition(101.0, &row, &params));

        let mut row = entry_row(50.0);
        row.macd_signal_prev = None;
        assert!(!entry_condition(101.0, &row, &params));

        let mut row = entry_row(50.0);
        row.rsi = None;
        assert!(!entry_condition(101.0, &row, &params));

        assert!(!entry_condition(101.0, &IndicatorRow::default(), &params));
    }

    #[test]
    fn exit_on_bearish_cross_only() {
        let row = IndicatorRow {
            macd: Some(0.4),
            macd_signal: Some(0.5),
            macd_prev: Some(0.5),
            macd_signal_prev: Some(0.5),
            ..quiet_row()
        };
        assert!(exit_condition(101.0, &row, &SignalParams::default()));
    }

    #[test]
    fn exit_on_rsi_breakdown_only() {
        let row = IndicatorRow {
            rsi: Some(29.9),
            ..quiet_row()
        };
        assert!(exit_condition(101.0, &row, &SignalParams::default()));

        let row = IndicatorRow {
            rsi: Some(30.0),
            ..quiet_row()
        };
        assert!(!exit_condition(101.0, &row, &SignalParams::default()));
    }

    #[test]
    fn exit_on_regime_violation_only() {
        assert!(exit_condition(99.0, &quiet_row(), &SignalParams::default()));
        assert!(!exit_condition(101.0, &quiet_row(), &SignalParams::default()));
    }

    #[test]
    fn exit_false_when_everything_undefined() {
        assert!(!exit_condition(50.0, &IndicatorRow::default(), &SignalParams::default()));
    }

    #[test]
    fn entry_and_exit_can_coincide() {
        let params = SignalParams {
            rsi_entry_low: 45,
            rsi_entry_high: 55,
            rsi_exit: 50,
        };
        let row = entry_row(48.0);
        assert!(entry_condition(101.0, &row, &params));
        assert!(exit_condition(101.0, &row, &params));
    }

    #[test]
    fn default_params_match_declared_defaults() {
        let params = SignalParams::default();
        assert_eq!(params.rsi_entry_low, 45);
        assert_eq!(params.rsi_entry_high, 55);
        assert_eq!(params.rsi_exit, 30);
        assert_eq!(RSI_ENTRY_LOW.space, ParameterSpace::Buy);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn entry_band_is_the_only_search_space() {
        for param in [RSI_ENTRY_LOW, RSI_ENTRY_HIGH] {
            assert_eq!(param.space, ParameterSpace::Buy);
            assert!(param.contains(param.default));
        }
        // rsi_exit is a plain threshold with no declared range.
        for rsi_exit in [0, 100] {
            let params = SignalParams {
                rsi_exit,
                ..SignalParams::default()
            };
            assert!(params.validate().is_ok());
        }
    }

    #[test]
    fn single_point_band_accepted() {
        let params = SignalParams {
            rsi_entry_low: 50,
            rsi_entry_high: 50,
            rsi_exit: 30,
        };
        assert!(params.validate().is_ok());
    }

    #[test]
    fn inverted_band_rejected() {
        let params = SignalParams {
            rsi_entry_low: 52,
            rsi_entry_high: 51,
            rsi_exit: 30,
        };
        match params.validate().unwrap_err() {
            SignalError::InvalidParameter { key, reason, .. } => {
                assert_eq!(key, "rsi_entry_low");
                assert!(reason.contains("must not exceed"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn out_of_range_bounds_rejected() {
        let params = SignalParams {
            rsi_entry_high: 56,
            ..SignalParams::default()
        };
        let err = params.validate().unwrap_err();
        assert!(matches!(
            err,
            SignalError::InvalidParameter { key, .. } if key == "rsi_entry_high"
        ));

        let params = SignalParams {
            rsi_exit: 101,
            ..SignalParams::default()
        };
        let err = params.validate().unwrap_err();
        assert!(matches!(err, SignalError::InvalidParameter { key, .. } if key == "rsi_exit"));
    }

    #[test]
    fn warmup_rows_are_masked() {
        let config = small_config();
        let warmup = config.warmup_len();
        let n = warmup + 3;
        let candles = candles(n, 101.0);
        let series = IndicatorSeries::from_rows(config, vec![entry_row(50.0); n]).unwrap();

        let entries = compute_entry_signal(&candles, &series, &SignalParams::default()).unwrap();
        for (t, &e) in entries.iter().enumerate() {
            assert_eq!(e, t >= warmup, "position {}", t);
        }

        let low = candles.iter().map(|c| Candle { close: 90.0, ..c.clone() }).collect::<Vec<_>>();
        let exits = compute_exit_signal(&low, &series, &SignalParams::default()).unwrap();
        for (t, &x) in exits.iter().enumerate() {
            assert_eq!(x, t >= warmup, "position {}", t);
        }
    }

    #[test]
    fn length_mismatch_is_malformed_input() {
        let config = small_config();
        let series = IndicatorSeries::from_rows(config, vec![entry_row(50.0); 4]).unwrap();
        let err = compute_entry_signal(&candles(5, 101.0), &series, &SignalParams::default())
            .unwrap_err();
        assert!(matches!(err, SignalError::MalformedInput { row: 4, .. }));
    }

    #[test]
    fn invalid_params_fail_before_rows() {
        let config = small_config();
        let series = IndicatorSeries::from_rows(config, vec![entry_row(50.0); 8]).unwrap();
        let params = SignalParams {
            rsi_entry_low: 44,
            ..SignalParams::default()
        };
        assert!(compute_exit_signal(&candles(8, 101.0), &series, &params).is_err());
    }
}
