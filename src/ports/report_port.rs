//! Output port for annotated candle frames.

use crate::domain::error::SignalError;
use crate::domain::frame::CandleFrame;
use std::path::Path;

/// Port for writing a frame with its indicator and signal columns.
pub trait ReportPort {
    fn write(&self, frame: &CandleFrame, output_path: &Path) -> Result<(), SignalError>;
}
