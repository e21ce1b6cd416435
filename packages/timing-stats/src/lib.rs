//! Timing column extraction, summary statistics and histogram rendering.
//!
//! Provides CSV column parsing with lenient value filtering, percentile
//! based summaries and PNG histogram output.

pub mod column;
pub mod error;
pub mod fonts;
pub mod histogram;
pub mod stats;

pub use column::{parse_value, read_column};
pub use error::StatsError;
pub use histogram::{plot_hist, Histogram};
pub use stats::{describe, percentile, Summary};

/// Result type for timing-stats operations.
pub type Result<T> = std::result::Result<T, StatsError>;
