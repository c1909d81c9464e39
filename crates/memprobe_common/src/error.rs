//! Error taxonomy for the memory check
//!
//! Every variant is reported to the monitoring supervisor as UNKNOWN.

use thiserror::Error;

/// Result type alias using ProbeError
pub type Result<T> = std::result::Result<T, ProbeError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    /// A mandatory counter was absent from the meminfo source
    #[error("required field {0} not found in meminfo")]
    MissingRequiredField(&'static str),

    /// MemTotal was zero, so no percentage can be computed
    #[error("invalid MemTotal: total memory reported as 0 kB")]
    InvalidTotal,

    /// The meminfo source could not be opened or read
    #[error("cannot read {path}: {reason}")]
    InputUnreadable { path: String, reason: String },

    /// A warning/critical range did not parse
    #[error("invalid threshold range '{0}'")]
    InvalidThreshold(String),

    /// Config file could not be loaded or contained bad values
    #[error("configuration error: {0}")]
    Config(String),
}

impl ProbeError {
    pub fn unreadable(path: impl Into<String>, err: &std::io::Error) -> Self {
        Self::InputUnreadable {
            path: path.into(),
            reason: err.to_string(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
