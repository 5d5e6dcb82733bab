use thiserror::Error;

/// Every failure the library can report. Nothing in the crate aborts the
/// host process; callers decide whether to retry, skip or give up.
#[derive(Debug, Error)]
pub enum NnError {
    /// Shape mismatch between operands, between adjacent layers, or between
    /// a model and a persisted file.
    #[error("invalid dimension: {0}")]
    InvalidDimension(String),

    /// A required value was absent, e.g. `backward` before `forward`.
    #[error("missing argument: {0}")]
    MissingArgument(String),

    #[error("allocation failure: {0}")]
    AllocationFailure(String),

    /// Bad header, truncated file, unknown code or malformed number.
    #[error("file format error: {0}")]
    FileFormat(String),

    /// NaN found in loss inputs.
    #[error("numerical instability: {0}")]
    NumericalInstability(String),

    #[error("model must be compiled before training or evaluation")]
    NotCompiled,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, NnError>;

impl NnError {
    pub(crate) fn dims(msg: impl Into<String>) -> Self {
        NnError::InvalidDimension(msg.into())
    }

    pub(crate) fn format(msg: impl Into<String>) -> Self {
        NnError::FileFormat(msg.into())
    }
}
