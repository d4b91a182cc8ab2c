#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
pub use steddock::domain::candle::Candle;
use steddock::domain::error::SignalError;
use steddock::domain::frame::CandleFrame;
use steddock::domain::indicator::{IndicatorConfig, IndicatorRow, IndicatorSeries};
use steddock::domain::strategy::Timeframe;
use steddock::ports::data_port::DataPort;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<Candle>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_candles(mut self, pair: &str, candles: Vec<Candle>) -> Self {
        self.data.insert(pair.to_string(), candles);
        self
    }

    pub fn with_error(mut self, pair: &str, reason: &str) -> Self {
        self.errors.insert(pair.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_candles(&self, pair: &str, _timeframe: Timeframe) -> Result<Vec<Candle>, SignalError> {
        if let Some(reason) = self.errors.get(pair) {
            return Err(SignalError::DataSource {
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(pair).cloned().unwrap_or_default())
    }

    fn list_pairs(&self, _timeframe: Timeframe) -> Result<Vec<String>, SignalError> {
        let mut pairs: Vec<String> = self.data.keys().cloned().collect();
        pairs.sort();
        Ok(pairs)
    }
}

pub fn base_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// Hourly candle at position `i`; open/high/low bracket the close.
pub fn make_candle(i: usize, close: f64) -> Candle {
    Candle {
        timestamp: base_time() + Duration::hours(i as i64),
        open: close,
        high: close + 0.5,
        low: close - 0.5,
        close,
        volume: 1_000.0,
    }
}

pub fn candles_from_closes(closes: &[f64]) -> Vec<Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_candle(i, c))
        .collect()
}

pub fn make_frame(closes: &[f64]) -> CandleFrame {
    CandleFrame::new(candles_from_closes(closes)).unwrap()
}

/// Gently rising series with a sine wobble so RSI and MACD move.
pub fn wavy_uptrend(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 100.0 + i as f64 * 0.05 + (i as f64 * 0.3).sin() * 2.0)
        .collect()
}

/// Row satisfying every entry clause at close 110 with default parameters.
pub fn entry_row() -> IndicatorRow {
    IndicatorRow {
        ema: Some(100.0),
        ema_prev: Some(99.9),
        macd: Some(0.5),
        macd_signal: Some(0.3),
        macd_hist: Some(0.2),
        macd_prev: Some(0.2),
        macd_signal_prev: Some(0.3),
        rsi: Some(50.0),
    }
}

/// Row where no entry clause and no exit clause holds at close 110.
pub fn quiet_row() -> IndicatorRow {
    IndicatorRow {
        ema: Some(100.0),
        ema_prev: Some(99.9),
        macd: Some(0.5),
        macd_signal: Some(0.3),
        macd_hist: Some(0.2),
        macd_prev: Some(0.45),
        macd_signal_prev: Some(0.3),
        rsi: Some(60.0),
    }
}

/// `n` quiet rows with the given overrides applied by position.
pub fn series_with(n: usize, overrides: &[(usize, IndicatorRow)]) -> IndicatorSeries {
    let mut rows = vec![quiet_row(); n];
    for &(t, row) in overrides {
        rows[t] = row;
    }
    IndicatorSeries::from_rows(IndicatorConfig::default(), rows).unwrap()
}

pub fn write_candle_csv(dir: &std::path::Path, file: &str, candles: &[Candle]) {
    let mut content = String::from("date,open,high,low,close,volume\n");
    for c in candles {
        content.push_str(&format!(
            "{},{},{},{},{},{}\n",
            c.timestamp.format("%Y-%m-%d %H:%M:%S"),
            c.open,
            c.high,
            c.low,
            c.close,
            c.volume
        ));
    }
    std::fs::write(dir.join(file), content).unwrap();
}
