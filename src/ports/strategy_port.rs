//! Host-facing strategy port: the three entry points a trading runtime calls.

use crate::domain::error::SignalError;
use crate::domain::frame::CandleFrame;
use crate::domain::strategy::{HostConfig, PairMetadata};

/// Implementations must be free of shared mutable state so a host may call
/// them concurrently for independent pairs.
pub trait StrategyPort: Send + Sync {
    fn name(&self) -> &str;

    /// Static configuration advertised to the host.
    fn host_config(&self) -> &HostConfig;

    /// Returns `frame` with the indicator columns appended (or overwritten).
    fn populate_indicators(
        &self,
        frame: &CandleFrame,
        metadata: &PairMetadata,
    ) -> Result<CandleFrame, SignalError>;

    /// Returns `frame` with the `enter_long` flag column set.
    fn populate_entry_trend(
        &self,
        frame: &CandleFrame,
        metadata: &PairMetadata,
    ) -> Result<CandleFrame, SignalError>;

    /// Returns `frame` with the `exit_long` flag column set.
    fn populate_exit_trend(
        &self,
        frame: &CandleFrame,
        metadata: &PairMetadata,
    ) -> Result<CandleFrame, SignalError>;

    /// Runs all three entry points in order.
    fn analyze(
        &self,
        frame: &CandleFrame,
        metadata: &PairMetadata,
    ) -> Result<CandleFrame, SignalError> {
        let frame = self.populate_indicators(frame, metadata)?;
        let frame = self.populate_entry_trend(&frame, metadata)?;
        self.populate_exit_trend(&frame, metadata)
    }
}
