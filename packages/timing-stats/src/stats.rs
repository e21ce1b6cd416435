//! Summary statistics over timing samples.

use std::fmt;

/// Summary of a sample of timing values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    /// Sample count
    pub n: usize,
    pub min: f64,
    pub p50: f64,
    pub p95: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "n={} min={:.3} p50={:.3} p95={:.3} max={:.3} mean={:.3} median={:.3}",
            self.n, self.min, self.p50, self.p95, self.max, self.mean, self.median
        )
    }
}

/// Linear-interpolation percentile over an ascending slice.
///
/// `p` is a fraction in `[0, 1]`. The rank is `(n - 1) * p`; values between
/// the two neighbouring ranks are interpolated. Returns `None` for an empty
/// slice.
pub fn percentile(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }

    let rank = (sorted.len() - 1) as f64 * p.clamp(0.0, 1.0);
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return Some(sorted[lo]);
    }

    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64))
}

fn median_of_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Describes a sample. Returns `None` when `values` is empty.
pub fn describe(values: &[f64]) -> Option<Summary> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let n = sorted.len();
    let mean = sorted.iter().sum::<f64>() / n as f64;

    Some(Summary {
        n,
        min: sorted[0],
        p50: percentile(&sorted, 0.50)?,
        p95: percentile(&sorted, 0.95)?,
        max: sorted[n - 1],
        mean,
        median: median_of_sorted(&sorted),
    })
}
