//! Domain error types.

/// Top-level error type for gaptrader.
#[derive(Debug, thiserror::Error)]
pub enum GaptraderError {
    #[error("malformed input: {reason}")]
    MalformedInput { reason: String },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&GaptraderError> for std::process::ExitCode {
    fn from(err: &GaptraderError) -> Self {
        let code: u8 = match err {
            GaptraderError::Io(_) => 1,
            GaptraderError::ConfigParse { .. }
            | GaptraderError::ConfigMissing { .. }
            | GaptraderError::ConfigInvalid { .. } => 2,
            GaptraderError::Data { .. } => 3,
            GaptraderError::MalformedInput { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}
