//! Histogram binning and PNG rendering.
//!
//! Charts are written with the [`plotters`] bitmap backend at a fixed
//! 1280x960 resolution.

use std::path::Path;

use plotters::prelude::*;

use crate::error::StatsError;
use crate::fonts::CHART_FONT_FAMILY;
use crate::Result;

/// Output resolution of rendered histograms.
const CHART_SIZE: (u32, u32) = (1280, 960);

/// Equal-width histogram.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// Bin edges, `counts.len() + 1` entries in ascending order
    pub edges: Vec<f64>,
    /// Sample count per bin
    pub counts: Vec<u64>,
}

impl Histogram {
    /// Bins `values` into `bins` equal-width buckets spanning `[min, max]`.
    ///
    /// Every bucket is half-open except the last, which also holds `max`.
    /// A sample with a single distinct value is centred in a range of
    /// width 1. An empty sample is binned over `[0, 1]`.
    pub fn compute(values: &[f64], bins: usize) -> Result<Self> {
        if bins == 0 {
            return Err(StatsError::InvalidBins { bins });
        }

        let (mut lo, mut hi) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });

        if values.is_empty() {
            lo = 0.0;
            hi = 1.0;
        } else if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }

        let width = (hi - lo) / bins as f64;
        let edges: Vec<f64> = (0..=bins)
            .map(|i| if i == bins { hi } else { lo + width * i as f64 })
            .collect();

        let mut counts = vec![0u64; bins];
        for &v in values {
            let idx = (((v - lo) / width).floor() as usize).min(bins - 1);
            counts[idx] += 1;
        }

        Ok(Self { edges, counts })
    }

    /// Number of buckets.
    pub fn bins(&self) -> usize {
        self.counts.len()
    }

    /// Largest bucket count.
    pub fn max_count(&self) -> u64 {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    /// Iterates `(lower_edge, upper_edge, count)` per bucket.
    pub fn buckets(&self) -> impl Iterator<Item = (f64, f64, u64)> + '_ {
        self.edges
            .windows(2)
            .zip(&self.counts)
            .map(|(edge, &count)| (edge[0], edge[1], count))
    }
}

fn plot_err<E: std::fmt::Display>(e: E) -> StatsError {
    StatsError::Plot(e.to_string())
}

/// Renders a histogram of `values` to `out_png`.
///
/// # Arguments
/// * `values` - Samples to bin
/// * `title` - Chart caption
/// * `xlabel` - X axis description; the Y axis is always `count`
/// * `out_png` - Output path; parent directories are created
/// * `bins` - Bucket count
/// * `labels` - Draw caption and axes. Requires a registered chart font
///
/// # Returns
/// `NoData` when `values` is empty.
pub fn plot_hist(
    values: &[f64],
    title: &str,
    xlabel: &str,
    out_png: &Path,
    bins: usize,
    labels: bool,
) -> Result<()> {
    if values.is_empty() {
        return Err(StatsError::NoData {
            title: title.to_string(),
        });
    }

    let histogram = Histogram::compute(values, bins)?;

    if let Some(parent) = out_png.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let root = BitMapBackend::new(out_png, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let x_range = histogram.edges[0]..histogram.edges[histogram.bins()];
    let y_max = histogram.max_count().max(1) as f64 * 1.05;

    let mut builder = ChartBuilder::on(&root);
    builder.margin(20);
    if labels {
        builder
            .caption(title, (CHART_FONT_FAMILY, 40))
            .x_label_area_size(70)
            .y_label_area_size(90);
    }
    let mut chart = builder
        .build_cartesian_2d(x_range, 0f64..y_max)
        .map_err(plot_err)?;

    if labels {
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_desc(xlabel)
            .y_desc("count")
            .label_style((CHART_FONT_FAMILY, 24))
            .axis_desc_style((CHART_FONT_FAMILY, 30))
            .draw()
            .map_err(plot_err)?;
    } else {
        tracing::warn!("No chart font registered; rendering '{}' without labels", title);
    }

    chart
        .draw_series(histogram.buckets().map(|(lo, hi, count)| {
            Rectangle::new([(lo, 0.0), (hi, count as f64)], BLUE.mix(0.8).filled())
        }))
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;

    Ok(())
}
