//! Per-trial phase timings.

use std::time::Instant;

/// Milliseconds spent in each trial phase, measured on a monotonic clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrialTiming {
    /// Payload start until the submitter returned (t1 - t0)
    pub txhash_ms: f64,
    /// Submitter return until the QR canvas was shown (t2 - t1)
    pub display_ms: f64,
    /// Whole trial (t2 - t0)
    pub total_ms: f64,
}

fn elapsed_ms(from: Instant, to: Instant) -> f64 {
    to.saturating_duration_since(from).as_nanos() as f64 / 1e6
}

impl TrialTiming {
    pub fn from_instants(t0: Instant, t1: Instant, t2: Instant) -> Self {
        Self {
            txhash_ms: elapsed_ms(t0, t1),
            display_ms: elapsed_ms(t1, t2),
            total_ms: elapsed_ms(t0, t2),
        }
    }
}
