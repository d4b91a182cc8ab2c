//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line
//! Histogram = MACD Line - Signal Line
//!
//! Default parameters: fast=12, slow=26, signal=9
//! Warmup: the line is defined from slow - 1, signal and histogram from slow - 1 + signal - 1.

use crate::domain::indicator::ema::Ema;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MacdPoint {
    pub line: Option<f64>,
    pub signal: Option<f64>,
    pub histogram: Option<f64>,
}

/// Rolling MACD accumulator built from three [`Ema`]s.
#[derive(Debug, Clone, PartialEq)]
pub struct Macd {
    fast: Ema,
    slow: Ema,
    signal: Ema,
}

impl Macd {
    pub fn new(fast: usize, slow: usize, signal: usize) -> Self {
        Self {
            fast: Ema::new(fast),
            slow: Ema::new(slow),
            signal: Ema::new(signal),
        }
    }

    pub fn next(&mut self, close: f64) -> MacdPoint {
        let fast = self.fast.next(close);
        let slow = self.slow.next(close);

        let line = match (fast, slow) {
            (Some(f), Some(s)) => Some(f - s),
            _ => None,
        };
        // The signal EMA only starts consuming once the line exists.
        let signal = line.and_then(|l| self.signal.next(l));
        let histogram = match (line, signal) {
            (Some(l), Some(s)) => Some(l - s),
            _ => None,
        };

        MacdPoint {
            line,
            signal,
            histogram,
        }
    }
}

pub fn calculate_macd(
    closes: &[f64],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> Vec<MacdPoint> {
    let mut macd = Macd::new(fast, slow, signal_period);
    closes.iter().map(|&c| macd.next(c)).collect()
}

pub fn calculate_macd_default(closes: &[f64]) -> Vec<MacdPoint> {
    calculate_macd(closes, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL)
}
