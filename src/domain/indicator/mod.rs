//! Technical indicator computation.
//!
//! This module provides:
//! - `IndicatorConfig`: window lengths for every indicator, validated up front
//! - `IndicatorType`: indicator identity + parameters, used for labels and logs
//! - `IndicatorRow`: all indicator values at one candle position
//! - `IndicatorEngine`: one-pass rolling accumulators producing `IndicatorRow`s
//! - `IndicatorSeries`: rows aligned 1:1 with a candle series, extendable in place
//!
//! Undefined values (insufficient history) are `None`, never zero.

pub mod ema;
pub mod macd;
pub mod rsi;

use crate::domain::candle::{validate_candles, validate_continuation, Candle};
use crate::domain::error::SignalError;
use chrono::NaiveDateTime;
use std::fmt;

pub use ema::{calculate_ema, Ema};
pub use macd::{calculate_macd, calculate_macd_default, Macd, MacdPoint};
pub use rsi::{calculate_rsi, Rsi};

pub const DEFAULT_EMA_LENGTH: usize = 200;
pub const DEFAULT_RSI_LENGTH: usize = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorConfig {
    pub ema_length: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub rsi_length: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            ema_length: DEFAULT_EMA_LENGTH,
            macd_fast: macd::DEFAULT_FAST,
            macd_slow: macd::DEFAULT_SLOW,
            macd_signal: macd::DEFAULT_SIGNAL,
            rsi_length: DEFAULT_RSI_LENGTH,
        }
    }
}

impl IndicatorConfig {
    pub fn validate(&self) -> Result<(), SignalError> {
        let windows = [
            ("ema_length", self.ema_length),
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("macd_signal", self.macd_signal),
            ("rsi_length", self.rsi_length),
        ];
        for (key, value) in windows {
            if value == 0 {
                return Err(SignalError::invalid(
                    "indicators",
                    key,
                    format!("{key} must be a positive integer"),
                ));
            }
        }
        if self.macd_fast >= self.macd_slow {
            return Err(SignalError::invalid(
                "indicators",
                "macd_fast",
                "macd_fast must be less than macd_slow",
            ));
        }
        Ok(())
    }

    /// Rows before this position cannot carry a fully defined signal:
    /// EMA plus its lag, the MACD/signal pair plus their lag, and RSI.
    pub fn warmup_len(&self) -> usize {
        (self.ema_length + 1)
            .max(self.macd_slow + self.macd_signal)
            .max(self.rsi_length + 1)
    }

    pub fn indicator_types(&self) -> [IndicatorType; 3] {
        [
            IndicatorType::Ema(self.ema_length),
            IndicatorType::Macd {
                fast: self.macd_fast,
                slow: self.macd_slow,
                signal: self.macd_signal,
            },
            IndicatorType::Rsi(self.rsi_length),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Ema(usize),
    Rsi(usize),
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
        }
    }
}

/// Indicator values at one position. `*_prev` fields are one-step lags.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct IndicatorRow {
    pub ema: Option<f64>,
    pub ema_prev: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_hist: Option<f64>,
    pub macd_prev: Option<f64>,
    pub macd_signal_prev: Option<f64>,
    pub rsi: Option<f64>,
}

/// Rolling accumulators for every indicator, advanced one candle at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorEngine {
    ema: Ema,
    macd: Macd,
    rsi: Rsi,
    last: Option<IndicatorRow>,
    last_timestamp: Option<NaiveDateTime>,
    processed: usize,
}

impl IndicatorEngine {
    pub fn new(config: IndicatorConfig) -> Result<Self, SignalError> {
        config.validate()?;
        Ok(Self {
            ema: Ema::new(config.ema_length),
            macd: Macd::new(config.macd_fast, config.macd_slow, config.macd_signal),
            rsi: Rsi::new(config.rsi_length),
            last: None,
            last_timestamp: None,
            processed: 0,
        })
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    /// Advances every accumulator by one candle. Only values at or before
    /// this candle are ever consulted.
    pub fn update(&mut self, candle: &Candle) -> IndicatorRow {
        let prev = self.last.unwrap_or_default();
        let ema = self.ema.next(candle.close);
        let macd = self.macd.next(candle.close);
        let rsi = self.rsi.next(candle.close);

        let row = IndicatorRow {
            ema,
            ema_prev: prev.ema,
            macd: macd.line,
            macd_signal: macd.signal,
            macd_hist: macd.histogram,
            macd_prev: prev.macd,
            macd_signal_prev: prev.macd_signal,
            rsi,
        };

        self.last = Some(row);
        self.last_timestamp = Some(candle.timestamp);
        self.processed += 1;
        row
    }
}

/// Indicator rows aligned by position with the candle series they were computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    config: IndicatorConfig,
    rows: Vec<IndicatorRow>,
    // None when the rows were supplied directly rather than computed.
    engine: Option<IndicatorEngine>,
}

impl IndicatorSeries {
    /// Wraps precomputed rows. The series cannot be extended afterwards
    /// since no accumulator state backs it.
    pub fn from_rows(
        config: IndicatorConfig,
        rows: Vec<IndicatorRow>,
    ) -> Result<Self, SignalError> {
        config.validate()?;
        Ok(Self {
            config,
            rows,
            engine: None,
        })
    }

    pub fn config(&self) -> &IndicatorConfig {
        &self.config
    }

    pub fn rows(&self) -> &[IndicatorRow] {
        &self.rows
    }

    pub fn get(&self, index: usize) -> Option<&IndicatorRow> {
        self.rows.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Computes rows for candles appended after the ones already processed,
    /// reusing the retained accumulator state.
    pub fn extend(&mut self, appended: &[Candle]) -> Result<(), SignalError> {
        let offset = self.rows.len();
        let engine = self.engine.as_mut().ok_or_else(|| {
            SignalError::malformed(
                offset,
                "series was built from precomputed rows and cannot be extended",
            )
        })?;
        validate_continuation(engine.last_timestamp, appended, offset)?;
        self.rows.reserve(appended.len());
        for candle in appended {
            self.rows.push(engine.update(candle));
        }
        Ok(())
    }
}

/// Computes the full indicator series for `candles` in one linear pass.
///
/// Configuration and structural problems are reported before any row is computed.
pub fn compute_indicators(
    candles: &[Candle],
    config: &IndicatorConfig,
) -> Result<IndicatorSeries, SignalError> {
    validate_candles(candles)?;
    let mut engine = IndicatorEngine::new(*config)?;
    let rows = candles.iter().map(|c| engine.update(c)).collect();
    Ok(IndicatorSeries {
        config: *config,
        rows,
        engine: Some(engine),
    })
}
