//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug)]
pub enum A2cError {
    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// Record value type error.
    #[error("Record value type error: {0}")]
    RecordValueTypeError(String),

    /// A hyperparameter is out of its valid range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Rewards, values and done flags of a segment disagree in length.
    #[error("Invalid segment: {0}")]
    InvalidSegment(String),

    /// The environment kept failing after being reset.
    #[error("Environment fault: {0}")]
    EnvironmentFault(String),

    /// Loss or gradient became NaN or infinite.
    #[error("Non-finite loss: {0}")]
    NonFiniteLoss(f32),
}
