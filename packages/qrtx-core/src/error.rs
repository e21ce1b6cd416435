//! Trial loop error types.

use thiserror::Error;

/// Environment configuration errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Variable is set but cannot be parsed
    #[error("Invalid value '{value}' for {var}: {reason}")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Errors that stop the trial loop.
///
/// Submission failures are not errors: they are recorded in the trial row.
#[derive(Error, Debug)]
pub enum QrTxError {
    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// QR symbol could not be built for the payload
    #[error("QR encoding failed: {0}")]
    Qr(String),

    /// Canvas rendering failed
    #[error("Render error: {0}")]
    Render(String),

    /// Panel rejected an operation
    #[error("Panel error: {0}")]
    Panel(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV log error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
