//! CSV column extraction.

use std::path::Path;

use crate::error::StatsError;
use crate::Result;

/// Cell markers treated as missing data (compared case-insensitively).
const MISSING_MARKERS: [&str; 5] = ["nan", "none", "null", "timeout", "time_out"];

/// Parses a single CSV cell into a number.
///
/// Blank cells, missing-data markers such as `null` or `timeout`, and
/// anything that does not parse as a float yield `None`.
pub fn parse_value(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    let lower = s.to_ascii_lowercase();
    if MISSING_MARKERS.contains(&lower.as_str()) {
        return None;
    }

    s.parse::<f64>().ok()
}

/// Reads every finite numeric value of `column` from the CSV at `path`.
///
/// # Arguments
/// * `path` - CSV file with a header row
/// * `column` - Header name of the column to extract
///
/// # Returns
/// Values in file order. Malformed and non-finite cells are dropped.
pub fn read_column(path: &Path, column: &str) -> Result<Vec<f64>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Err(StatsError::MissingHeader {
            path: path.display().to_string(),
        });
    }

    let index = headers
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| StatsError::ColumnNotFound {
            column: column.to_string(),
            available: headers.iter().map(str::to_string).collect(),
        })?;

    let mut values = Vec::new();
    let mut dropped = 0usize;
    for record in reader.records() {
        let record = record?;
        match record.get(index).and_then(parse_value) {
            Some(v) if v.is_finite() => values.push(v),
            _ => dropped += 1,
        }
    }

    tracing::debug!(
        "Column '{}' in {}: {} values kept, {} dropped",
        column,
        path.display(),
        values.len(),
        dropped
    );

    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value_numbers() {
        assert_eq!(parse_value("12.5"), Some(12.5));
        assert_eq!(parse_value("  7 "), Some(7.0));
        assert_eq!(parse_value("-3"), Some(-3.0));
        assert_eq!(parse_value("1e3"), Some(1000.0));
    }

    #[test]
    fn test_parse_value_missing_markers() {
        for marker in ["", "   ", "NaN", "none", "NULL", "timeout", "Time_Out"] {
            assert_eq!(parse_value(marker), None, "marker {:?}", marker);
        }
    }

    #[test]
    fn test_parse_value_garbage() {
        assert_eq!(parse_value("fast"), None);
        assert_eq!(parse_value("12ms"), None);
    }

    #[test]
    fn test_parse_value_infinity_is_parsed_but_not_finite() {
        let v = parse_value("inf").unwrap();
        assert!(!v.is_finite());
    }
}
