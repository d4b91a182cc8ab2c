//! Domain error types.

/// Top-level error type for steddock.
///
/// Undefined indicator values during warm-up are not errors; they are absorbed
/// into `false` signals. Everything here is surfaced before per-row work starts.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid parameter [{section}] {key}: {reason}")]
    InvalidParameter {
        section: String,
        key: String,
        reason: String,
    },

    #[error("malformed input at row {row}: {reason}")]
    MalformedInput { row: usize, reason: String },

    #[error("insufficient data: have {bars} candles, need {minimum}")]
    InsufficientData { bars: usize, minimum: usize },

    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SignalError {
    pub(crate) fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        SignalError::InvalidParameter {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed(row: usize, reason: impl Into<String>) -> Self {
        SignalError::MalformedInput {
            row,
            reason: reason.into(),
        }
    }
}

impl SignalError {
    /// Process exit status for this error category.
    pub fn exit_code(&self) -> u8 {
        match self {
            SignalError::Io(_) => 1,
            SignalError::ConfigParse { .. } | SignalError::InvalidParameter { .. } => 2,
            SignalError::MalformedInput { .. } | SignalError::DataSource { .. } => 3,
            SignalError::InsufficientData { .. } => 5,
        }
    }
}

impl From<&SignalError> for std::process::ExitCode {
    fn from(err: &SignalError) -> Self {
        std::process::ExitCode::from(err.exit_code())
    }
}
