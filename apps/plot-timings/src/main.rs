//! Plot histogram(s) from a timings CSV.
//!
//! Always plots `broadcast_ms`; `confirm_ms` and any `--extra-column` are
//! plotted when present and non-empty, otherwise skipped with a note.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use timing_stats::{describe, fonts, plot_hist, read_column, StatsError, Summary};
use tracing_subscriber::EnvFilter;

/// Column that must be present in every timings file.
const REQUIRED_COLUMN: &str = "broadcast_ms";

/// Column plotted only when it carries data.
const OPTIONAL_COLUMN: &str = "confirm_ms";

/// Command-line arguments for the plotter.
#[derive(Parser, Debug)]
#[command(author, version, about = "Plot histogram(s) from timings CSV.", long_about = None)]
struct Args {
    /// Input CSV path (e.g., timings_100_run20snun4.csv)
    csv: PathBuf,

    /// Histogram bins
    #[arg(long, default_value_t = 30)]
    bins: usize,

    /// Output directory
    #[arg(long, default_value = "plots")]
    outdir: PathBuf,

    /// Output file prefix
    #[arg(long, default_value = "")]
    prefix: String,

    /// Additional optional columns to plot (repeatable)
    #[arg(long = "extra-column")]
    extra_columns: Vec<String>,

    /// Font file for chart labels (defaults to a common system font)
    #[arg(long)]
    font: Option<PathBuf>,
}

/// Output path for a column histogram.
fn output_path(outdir: &Path, prefix: &str, column: &str) -> PathBuf {
    outdir.join(format!("{}hist_{}.png", prefix, column))
}

/// Console summary line; an empty column reports `n=0`.
fn summary_line(column: &str, summary: Option<&Summary>) -> String {
    match summary {
        Some(summary) => format!("[{}] {}", column, summary),
        None => format!("[{}] n=0", column),
    }
}

/// Registers a label font, returning whether labels can be drawn.
fn setup_fonts(explicit: Option<&Path>) -> anyhow::Result<bool> {
    // An explicitly requested font must load
    if let Some(path) = explicit {
        fonts::register_font_file(path)
            .with_context(|| format!("Failed to load font {}", path.display()))?;
        return Ok(true);
    }

    let Some(path) = fonts::find_system_font() else {
        return Ok(false);
    };

    match fonts::register_font_file(&path) {
        Ok(()) => Ok(true),
        Err(e) => {
            tracing::warn!("Ignoring system font {}: {}", path.display(), e);
            Ok(false)
        }
    }
}

/// Describes and plots one column. Returns false when there was nothing to plot.
fn plot_column(
    values: &[f64],
    column: &str,
    args: &Args,
    outdir: &Path,
    labels: bool,
) -> anyhow::Result<bool> {
    let Some(summary) = describe(values) else {
        return Ok(false);
    };
    println!("{}", summary_line(column, Some(&summary)));

    let out = output_path(outdir, &args.prefix, column);
    plot_hist(
        values,
        &format!("{} histogram (n={})", column, summary.n),
        &format!("{} (ms)", column),
        &out,
        args.bins,
        labels,
    )
    .with_context(|| format!("Failed to plot {}", column))?;

    println!("[✓] wrote: {}", out.display());
    Ok(true)
}

/// Plots a column that may be absent or empty.
fn plot_optional_column(
    csv_path: &Path,
    column: &str,
    args: &Args,
    outdir: &Path,
    labels: bool,
) -> anyhow::Result<()> {
    let values = match read_column(csv_path, column) {
        Ok(values) => values,
        Err(StatsError::ColumnNotFound { .. }) => Vec::new(),
        Err(e) => return Err(e.into()),
    };

    if !plot_column(&values, column, args, outdir, labels)? {
        println!(
            "[info] {} column not found or has no numeric data; skipped.",
            column
        );
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let csv_path = std::fs::canonicalize(&args.csv)
        .with_context(|| format!("Cannot open {}", args.csv.display()))?;
    let outdir = args.outdir.clone();
    let labels = setup_fonts(args.font.as_deref())?;

    // 1) required column: missing column or no data is fatal
    let required = read_column(&csv_path, REQUIRED_COLUMN)?;
    if !plot_column(&required, REQUIRED_COLUMN, &args, &outdir, labels)? {
        println!("{}", summary_line(REQUIRED_COLUMN, None));
        return Err(StatsError::NoData {
            title: format!("{} histogram (n=0)", REQUIRED_COLUMN),
        }
        .into());
    }

    // 2) optional columns
    plot_optional_column(&csv_path, OPTIONAL_COLUMN, &args, &outdir, labels)?;
    for column in &args.extra_columns {
        plot_optional_column(&csv_path, column, &args, &outdir, labels)?;
    }

    Ok(())
}
