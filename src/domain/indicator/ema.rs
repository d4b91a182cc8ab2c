//! Exponential Moving Average indicator.
//!
//! k = 2/(n+1), seed with first SMA, then EMA[i] = C[i]*k + EMA[i-1]*(1-k).
//! Warmup: first (n-1) inputs are undefined.

/// Rolling EMA accumulator. Feed values in chronological order with [`Ema::next`].
#[derive(Debug, Clone, PartialEq)]
pub struct Ema {
    period: usize,
    k: f64,
    seed_sum: f64,
    seen: usize,
    value: Option<f64>,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            k: 2.0 / (period as f64 + 1.0),
            seed_sum: 0.0,
            seen: 0,
            value: None,
        }
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }

    /// Consumes one input and returns the EMA at this position, or `None`
    /// while fewer than `period` inputs have been seen.
    pub fn next(&mut self, input: f64) -> Option<f64> {
        if self.period == 0 {
            return None;
        }
        self.seen += 1;
        match self.value {
            Some(prev) => {
                self.value = Some(input * self.k + prev * (1.0 - self.k));
            }
            None => {
                self.seed_sum += input;
                if self.seen == self.period {
                    self.value = Some(self.seed_sum / self.period as f64);
                }
            }
        }
        self.value
    }
}

pub fn calculate_ema(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut ema = Ema::new(period);
    values.iter().map(|&v| ema.next(v)).collect()
}
