//! Column extraction tests against real CSV files.

use std::fs;
use std::path::PathBuf;

use tempfile::{tempdir, TempDir};
use timing_stats::{describe, read_column, StatsError};

fn write_csv(contents: &str) -> (TempDir, PathBuf) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("timings.csv");
    fs::write(&path, contents).unwrap();
    (dir, path)
}

#[test]
fn test_read_column_filters_bad_cells() {
    let (_dir, path) = write_csv(
        "trial,broadcast_ms,confirm_ms\n\
         1,120.5,900\n\
         2,timeout,timeout\n\
         3,,NaN\n\
         4,98,null\n\
         5,inf,1200.25\n\
         6,abc,\n",
    );

    let broadcast = read_column(&path, "broadcast_ms").unwrap();
    assert_eq!(broadcast, vec![120.5, 98.0]);

    let confirm = read_column(&path, "confirm_ms").unwrap();
    assert_eq!(confirm, vec![900.0, 1200.25]);
}

#[test]
fn test_read_column_tolerates_short_rows() {
    let (_dir, path) = write_csv("a,b\n1,2\n3\n5,6\n");
    let b = read_column(&path, "b").unwrap();
    assert_eq!(b, vec![2.0, 6.0]);
}

#[test]
fn test_read_column_missing_column_lists_available() {
    let (_dir, path) = write_csv("trial,broadcast_ms\n1,10\n");

    let err = read_column(&path, "confirm_ms").unwrap_err();
    match err {
        StatsError::ColumnNotFound { column, available } => {
            assert_eq!(column, "confirm_ms");
            assert_eq!(available, vec!["trial".to_string(), "broadcast_ms".to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_read_column_empty_file_has_no_header() {
    let (_dir, path) = write_csv("");
    let err = read_column(&path, "broadcast_ms").unwrap_err();
    assert!(matches!(err, StatsError::MissingHeader { .. }));
}

#[test]
fn test_read_column_missing_file_is_error() {
    let dir = tempdir().unwrap();
    let result = read_column(&dir.path().join("absent.csv"), "broadcast_ms");
    assert!(result.is_err());
}

#[test]
fn test_header_only_yields_no_summary() {
    let (_dir, path) = write_csv("broadcast_ms\n");
    let values = read_column(&path, "broadcast_ms").unwrap();
    assert!(values.is_empty());
    assert!(describe(&values).is_none());
}

#[test]
fn test_read_then_describe() -> anyhow::Result<()> {
    let mut csv = String::from("broadcast_ms\n");
    for v in 1..=20 {
        csv.push_str(&format!("{}\n", v * 10));
    }
    let (_dir, path) = write_csv(&csv);

    let values = read_column(&path, "broadcast_ms")?;
    let summary = describe(&values).unwrap();
    assert_eq!(summary.n, 20);
    assert_eq!(summary.min, 10.0);
    assert_eq!(summary.max, 200.0);
    assert!((summary.p50 - 105.0).abs() < 1e-9);
    // rank 19 * 0.95 = 18.05 -> 190 + 0.05 * 10
    assert!((summary.p95 - 190.5).abs() < 1e-9);
    Ok(())
}
