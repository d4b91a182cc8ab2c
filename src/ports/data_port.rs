//! Candle data access port trait.

use crate::domain::candle::Candle;
use crate::domain::error::SignalError;
use crate::domain::strategy::Timeframe;

pub trait DataPort {
    /// Candles for `pair` in chronological order, exactly as stored.
    fn fetch_candles(&self, pair: &str, timeframe: Timeframe) -> Result<Vec<Candle>, SignalError>;

    fn list_pairs(&self, timeframe: Timeframe) -> Result<Vec<String>, SignalError>;
}
