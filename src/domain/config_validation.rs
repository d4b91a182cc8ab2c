//! Configuration loading and validation.
//!
//! Every key is optional and falls back to the strategy defaults. All fields
//! are checked before any candle is processed.

use crate::domain::error::SignalError;
use crate::domain::indicator::IndicatorConfig;
use crate::domain::signal::SignalParams;
use crate::domain::strategy::{HostConfig, MacdEma200Rsi, MinimalRoi, RoiStep, Timeframe};
use crate::ports::config_port::ConfigPort;

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), SignalError> {
    build_strategy(config).map(|_| ())
}

pub fn build_strategy(config: &dyn ConfigPort) -> Result<MacdEma200Rsi, SignalError> {
    let indicators = build_indicator_config(config)?;
    let params = build_signal_params(config)?;
    let host = build_host_config(config)?;
    MacdEma200Rsi::new(indicators, params, host)
}

pub fn build_indicator_config(config: &dyn ConfigPort) -> Result<IndicatorConfig, SignalError> {
    let defaults = IndicatorConfig::default();
    let config = IndicatorConfig {
        ema_length: read_count(config, "indicators", "ema_length", defaults.ema_length)?,
        macd_fast: read_count(config, "indicators", "macd_fast", defaults.macd_fast)?,
        macd_slow: read_count(config, "indicators", "macd_slow", defaults.macd_slow)?,
        macd_signal: read_count(config, "indicators", "macd_signal", defaults.macd_signal)?,
        rsi_length: read_count(config, "indicators", "rsi_length", defaults.rsi_length)?,
    };
    config.validate()?;
    Ok(config)
}

pub fn build_signal_params(config: &dyn ConfigPort) -> Result<SignalParams, SignalError> {
    let defaults = SignalParams::default();
    let params = SignalParams {
        rsi_entry_low: read_u32(config, "signals", "rsi_entry_low", defaults.rsi_entry_low)?,
        rsi_entry_high: read_u32(config, "signals", "rsi_entry_high", defaults.rsi_entry_high)?,
        rsi_exit: read_u32(config, "signals", "rsi_exit", defaults.rsi_exit)?,
    };
    params.validate()?;
    Ok(params)
}

pub fn build_host_config(config: &dyn ConfigPort) -> Result<HostConfig, SignalError> {
    let defaults = HostConfig::default();

    let timeframe = match config.get_string("host", "timeframe") {
        Some(s) => s.parse::<Timeframe>()?,
        None => defaults.timeframe,
    };
    let minimal_roi = match config.get_string("host", "minimal_roi") {
        Some(s) => parse_minimal_roi(&s)?,
        None => defaults.minimal_roi,
    };

    Ok(HostConfig {
        timeframe,
        can_short: config.get_bool("host", "can_short", defaults.can_short)?,
        minimal_roi,
        stoploss: config.get_double("host", "stoploss", defaults.stoploss)?,
        startup_candle_count: read_count(
            config,
            "host",
            "startup_candle_count",
            defaults.startup_candle_count,
        )?,
        process_only_new_candles: config.get_bool(
            "host",
            "process_only_new_candles",
            defaults.process_only_new_candles,
        )?,
        cooldown_period: read_usize(config, "host", "cooldown_period", defaults.cooldown_period)?,
        use_exit_signal: config.get_bool("host", "use_exit_signal", defaults.use_exit_signal)?,
        exit_profit_only: config.get_bool("host", "exit_profit_only", defaults.exit_profit_only)?,
        ignore_roi_if_entry_signal: config.get_bool(
            "host",
            "ignore_roi_if_entry_signal",
            defaults.ignore_roi_if_entry_signal,
        )?,
    })
}

/// Parses `minutes:fraction` pairs separated by commas, e.g. `0:0.05,60:0.02`.
pub fn parse_minimal_roi(value: &str) -> Result<MinimalRoi, SignalError> {
    let invalid = |reason: String| SignalError::invalid("host", "minimal_roi", reason);

    let steps = value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|entry| {
            let (minutes, profit) = entry
                .split_once(':')
                .ok_or_else(|| invalid(format!("expected minutes:profit, got '{entry}'")))?;
            let after_minutes = minutes
                .trim()
                .parse::<u32>()
                .map_err(|_| invalid(format!("invalid minute key '{}'", minutes.trim())))?;
            let min_profit = profit
                .trim()
                .parse::<f64>()
                .map_err(|_| invalid(format!("invalid profit '{}'", profit.trim())))?;
            Ok(RoiStep {
                after_minutes,
                min_profit,
            })
        })
        .collect::<Result<Vec<_>, SignalError>>()?;

    MinimalRoi::new(steps)
}

fn read_usize(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: usize,
) -> Result<usize, SignalError> {
    let value = config.get_int(section, key, default as i64)?;
    usize::try_from(value)
        .map_err(|_| SignalError::invalid(section, key, format!("{key} must not be negative")))
}

/// Window lengths: positive integers.
fn read_count(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: usize,
) -> Result<usize, SignalError> {
    let value = config.get_int(section, key, default as i64)?;
    if value < 1 {
        return Err(SignalError::invalid(
            section,
            key,
            format!("{key} must be a positive integer"),
        ));
    }
    Ok(value as usize)
}

fn read_u32(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: u32,
) -> Result<u32, SignalError> {
    let value = config.get_int(section, key, i64::from(default))?;
    u32::try_from(value)
        .map_err(|_| SignalError::invalid(section, key, format!("{key} must not be negative")))
}
