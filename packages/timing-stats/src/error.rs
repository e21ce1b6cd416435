//! Statistics and plotting error types.

use thiserror::Error;

/// Errors raised while reading timing data or rendering plots.
#[derive(Error, Debug)]
pub enum StatsError {
    /// CSV file has no header row
    #[error("CSV header not found in '{path}'")]
    MissingHeader { path: String },

    /// Requested column does not exist in the header
    #[error("Column '{column}' not found. Available: {available:?}")]
    ColumnNotFound {
        column: String,
        available: Vec<String>,
    },

    /// Nothing left to plot after filtering
    #[error("No numeric data to plot for: {title}")]
    NoData { title: String },

    /// Histogram needs at least one bin
    #[error("Invalid bin count {bins}: must be at least 1")]
    InvalidBins { bins: usize },

    /// Font file could not be loaded or registered
    #[error("Font error: {0}")]
    Font(String),

    /// Chart drawing failed
    #[error("Plot error: {0}")]
    Plot(String),

    /// CSV decoding error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
