//! MACD / EMA200 / RSI trend-following strategy and its host-facing configuration.
//!
//! The three `populate_*` entry points are pure: each takes a frame, returns a
//! new frame with extra columns, and touches no shared state.

use crate::domain::error::SignalError;
use crate::domain::frame::CandleFrame;
use crate::domain::indicator::{compute_indicators, IndicatorConfig, IndicatorRow, IndicatorSeries};
use crate::domain::signal::{compute_entry_signal, compute_exit_signal, SignalParams};
use crate::ports::strategy_port::StrategyPort;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

pub const COL_EMA: &str = "ema200";
pub const COL_EMA_PREV: &str = "ema200_prev";
pub const COL_MACD: &str = "macd";
pub const COL_MACD_SIGNAL: &str = "macdsignal";
pub const COL_MACD_HIST: &str = "macdhist";
pub const COL_MACD_PREV: &str = "macd_prev";
pub const COL_MACD_SIGNAL_PREV: &str = "macdsignal_prev";
pub const COL_RSI: &str = "rsi";
pub const COL_ENTER_LONG: &str = "enter_long";
pub const COL_EXIT_LONG: &str = "exit_long";

pub const INDICATOR_COLUMNS: [&str; 8] = [
    COL_EMA,
    COL_EMA_PREV,
    COL_MACD,
    COL_MACD_SIGNAL,
    COL_MACD_HIST,
    COL_MACD_PREV,
    COL_MACD_SIGNAL_PREV,
    COL_RSI,
];

/// Per-call context supplied by the host.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PairMetadata {
    pub pair: String,
}

impl PairMetadata {
    pub fn new(pair: impl Into<String>) -> Self {
        Self { pair: pair.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timeframe {
    Minute1,
    Minute5,
    Minute15,
    Minute30,
    Hour1,
    Hour4,
    Day1,
}

impl Timeframe {
    pub fn minutes(&self) -> u32 {
        match self {
            Timeframe::Minute1 => 1,
            Timeframe::Minute5 => 5,
            Timeframe::Minute15 => 15,
            Timeframe::Minute30 => 30,
            Timeframe::Hour1 => 60,
            Timeframe::Hour4 => 240,
            Timeframe::Day1 => 1440,
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Timeframe::Minute1 => "1m",
            Timeframe::Minute5 => "5m",
            Timeframe::Minute15 => "15m",
            Timeframe::Minute30 => "30m",
            Timeframe::Hour1 => "1h",
            Timeframe::Hour4 => "4h",
            Timeframe::Day1 => "1d",
        };
        f.write_str(s)
    }
}

impl FromStr for Timeframe {
    type Err = SignalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1m" => Ok(Timeframe::Minute1),
            "5m" => Ok(Timeframe::Minute5),
            "15m" => Ok(Timeframe::Minute15),
            "30m" => Ok(Timeframe::Minute30),
            "1h" => Ok(Timeframe::Hour1),
            "4h" => Ok(Timeframe::Hour4),
            "1d" => Ok(Timeframe::Day1),
            other => Err(SignalError::invalid(
                "host",
                "timeframe",
                format!("unsupported timeframe '{other}'"),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoiStep {
    pub after_minutes: u32,
    pub min_profit: f64,
}

/// Minimum-profit schedule keyed by minutes since entry, sorted ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct MinimalRoi {
    steps: Vec<RoiStep>,
}

impl MinimalRoi {
    pub fn new(mut steps: Vec<RoiStep>) -> Result<Self, SignalError> {
        if steps.is_empty() {
            return Err(SignalError::invalid(
                "host",
                "minimal_roi",
                "minimal_roi needs at least one step",
            ));
        }
        if let Some(step) = steps.iter().find(|s| !s.min_profit.is_finite()) {
            return Err(SignalError::invalid(
                "host",
                "minimal_roi",
                format!("profit for step {} is not a finite number", step.after_minutes),
            ));
        }
        steps.sort_by_key(|s| s.after_minutes);
        if steps.windows(2).any(|w| w[0].after_minutes == w[1].after_minutes) {
            return Err(SignalError::invalid(
                "host",
                "minimal_roi",
                "minimal_roi steps must have distinct minute keys",
            ));
        }
        Ok(Self { steps })
    }

    pub fn steps(&self) -> &[RoiStep] {
        &self.steps
    }

    /// Required profit after `elapsed_minutes`: the step with the greatest key
    /// not exceeding the elapsed time. `None` before the first step.
    pub fn threshold_at(&self, elapsed_minutes: u32) -> Option<f64> {
        self.steps
            .iter()
            .rev()
            .find(|s| s.after_minutes <= elapsed_minutes)
            .map(|s| s.min_profit)
    }
}

impl Default for MinimalRoi {
    fn default() -> Self {
        Self {
            steps: vec![RoiStep {
                after_minutes: 0,
                min_profit: 0.05,
            }],
        }
    }
}

impl fmt::Display for MinimalRoi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .steps
            .iter()
            .map(|s| format!("{}:{}", s.after_minutes, s.min_profit))
            .collect();
        f.write_str(&parts.join(","))
    }
}

/// Static configuration advertised to the host runtime. Not interpreted here
/// beyond validation.
#[derive(Debug, Clone, PartialEq)]
pub struct HostConfig {
    pub timeframe: Timeframe,
    pub can_short: bool,
    pub minimal_roi: MinimalRoi,
    pub stoploss: f64,
    pub startup_candle_count: usize,
    pub process_only_new_candles: bool,
    pub cooldown_period: usize,
    pub use_exit_signal: bool,
    pub exit_profit_only: bool,
    pub ignore_roi_if_entry_signal: bool,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            timeframe: Timeframe::Hour1,
            can_short: false,
            minimal_roi: MinimalRoi::default(),
            stoploss: -0.10,
            startup_candle_count: 210,
            process_only_new_candles: true,
            cooldown_period: 5,
            use_exit_signal: true,
            exit_profit_only: false,
            ignore_roi_if_entry_signal: false,
        }
    }
}

impl HostConfig {
    pub fn validate(&self, indicators: &IndicatorConfig) -> Result<(), SignalError> {
        if self.can_short {
            return Err(SignalError::invalid(
                "host",
                "can_short",
                "strategy only emits long signals",
            ));
        }
        if !(self.stoploss > -1.0 && self.stoploss < 0.0) {
            return Err(SignalError::invalid(
                "host",
                "stoploss",
                "stoploss must be between -1 and 0 (exclusive)",
            ));
        }
        let warmup = indicators.warmup_len();
        if self.startup_candle_count < warmup {
            return Err(SignalError::invalid(
                "host",
                "startup_candle_count",
                format!(
                    "startup_candle_count ({}) must cover the indicator warm-up ({})",
                    self.startup_candle_count, warmup
                ),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MacdEma200Rsi {
    indicators: IndicatorConfig,
    params: SignalParams,
    host: HostConfig,
}

impl MacdEma200Rsi {
    pub const NAME: &'static str = "MacdEma200Rsi";

    /// Validates every parameter before anything is computed.
    pub fn new(
        indicators: IndicatorConfig,
        params: SignalParams,
        host: HostConfig,
    ) -> Result<Self, SignalError> {
        indicators.validate()?;
        params.validate()?;
        host.validate(&indicators)?;
        Ok(Self {
            indicators,
            params,
            host,
        })
    }

    pub fn indicator_config(&self) -> &IndicatorConfig {
        &self.indicators
    }

    pub fn params(&self) -> &SignalParams {
        &self.params
    }

    /// Rebuilds the indicator series from the frame's named columns.
    fn indicators_from_frame(&self, frame: &CandleFrame) -> Result<IndicatorSeries, SignalError> {
        let ema = frame.require_float(COL_EMA)?;
        let ema_prev = frame.require_float(COL_EMA_PREV)?;
        let macd = frame.require_float(COL_MACD)?;
        let macd_signal = frame.require_float(COL_MACD_SIGNAL)?;
        let macd_hist = frame.require_float(COL_MACD_HIST)?;
        let macd_prev = frame.require_float(COL_MACD_PREV)?;
        let macd_signal_prev = frame.require_float(COL_MACD_SIGNAL_PREV)?;
        let rsi = frame.require_float(COL_RSI)?;

        let rows = (0..frame.len())
            .map(|t| IndicatorRow {
                ema: ema[t],
                ema_prev: ema_prev[t],
                macd: macd[t],
                macd_signal: macd_signal[t],
                macd_hist: macd_hist[t],
                macd_prev: macd_prev[t],
                macd_signal_prev: macd_signal_prev[t],
                rsi: rsi[t],
            })
            .collect();
        IndicatorSeries::from_rows(self.indicators, rows)
    }
}

impl StrategyPort for MacdEma200Rsi {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn host_config(&self) -> &HostConfig {
        &self.host
    }

    fn populate_indicators(
        &self,
        frame: &CandleFrame,
        metadata: &PairMetadata,
    ) -> Result<CandleFrame, SignalError> {
        let series = compute_indicators(frame.candles(), &self.indicators)?;
        let rows = series.rows();
        let column = |f: fn(&IndicatorRow) -> Option<f64>| rows.iter().map(f).collect::<Vec<_>>();

        let mut out = frame.clone();
        out.set_float(COL_EMA, column(|r| r.ema))?;
        out.set_float(COL_EMA_PREV, column(|r| r.ema_prev))?;
        out.set_float(COL_MACD, column(|r| r.macd))?;
        out.set_float(COL_MACD_SIGNAL, column(|r| r.macd_signal))?;
        out.set_float(COL_MACD_HIST, column(|r| r.macd_hist))?;
        out.set_float(COL_MACD_PREV, column(|r| r.macd_prev))?;
        out.set_float(COL_MACD_SIGNAL_PREV, column(|r| r.macd_signal_prev))?;
        out.set_float(COL_RSI, column(|r| r.rsi))?;

        let [ema, macd, rsi] = self.indicators.indicator_types();
        debug!(
            pair = %metadata.pair,
            rows = out.len(),
            %ema,
            %macd,
            %rsi,
            "populated indicators"
        );
        Ok(out)
    }

    fn populate_entry_trend(
        &self,
        frame: &CandleFrame,
        metadata: &PairMetadata,
    ) -> Result<CandleFrame, SignalError> {
        let series = self.indicators_from_frame(frame)?;
        let entries = compute_entry_signal(frame.candles(), &series, &self.params)?;
        let count = entries.iter().filter(|&&e| e).count();

        let mut out = frame.clone();
        out.set_flag(COL_ENTER_LONG, entries)?;
        debug!(pair = %metadata.pair, rows = out.len(), entries = count, "populated entry trend");
        Ok(out)
    }

    fn populate_exit_trend(
        &self,
        frame: &CandleFrame,
        metadata: &PairMetadata,
    ) -> Result<CandleFrame, SignalError> {
        let series = self.indicators_from_frame(frame)?;
        let exits = compute_exit_signal(frame.candles(), &series, &self.params)?;
        let count = exits.iter().filter(|&&x| x).count();

        let mut out = frame.clone();
        out.set_flag(COL_EXIT_LONG, exits)?;
        debug!(pair = %metadata.pair, rows = out.len(), exits = count, "populated exit trend");
        Ok(out)
    }
}
