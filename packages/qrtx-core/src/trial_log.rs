//! Append-only CSV log of trial results.

use std::fs::OpenOptions;
use std::path::Path;

use serde::{Serialize, Serializer};

use crate::Result;

/// Column order of the trial log.
pub const LOG_HEADER: [&str; 18] = [
    "trial",
    "local_time",
    "node_id",
    "qr_id",
    "unique_id",
    "tx_ok",
    "txhash",
    "txhash_ms",
    "display_ms",
    "total_ms",
    "broadcast_ms_node",
    "height",
    "code",
    "gasWanted",
    "gasUsed",
    "timestamp_chain",
    "value_len",
    "error",
];

/// One trial row. Field order must match [`LOG_HEADER`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialRecord {
    pub trial: u64,
    pub local_time: String,
    pub node_id: String,
    pub qr_id: String,
    pub unique_id: String,
    #[serde(serialize_with = "serialize_flag")]
    pub tx_ok: bool,
    pub txhash: String,
    pub txhash_ms: f64,
    pub display_ms: f64,
    pub total_ms: f64,
    pub broadcast_ms_node: String,
    pub height: String,
    pub code: String,
    #[serde(rename = "gasWanted")]
    pub gas_wanted: String,
    #[serde(rename = "gasUsed")]
    pub gas_used: String,
    pub timestamp_chain: String,
    pub value_len: usize,
    pub error: String,
}

/// Writes flags as `True` / `False`, the spelling existing logs use.
fn serialize_flag<S: Serializer>(value: &bool, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(if *value { "True" } else { "False" })
}

/// Rounds milliseconds to three decimals.
pub fn round_ms(ms: f64) -> f64 {
    (ms * 1000.0).round() / 1000.0
}

/// Appends `record` to the CSV at `path`.
///
/// The header is written only when the file is new or empty. An existing
/// file with a different header is still appended to, with a warning.
pub fn append_record(path: &Path, record: &TrialRecord) -> Result<()> {
    let has_content = path.metadata().map(|m| m.len() > 0).unwrap_or(false);

    if has_content {
        let mut reader = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;
        let existing = reader.headers()?;
        if !existing.iter().eq(LOG_HEADER.iter().copied()) {
            tracing::warn!(
                "{} has a different header; appending rows in the current layout",
                path.display()
            );
        }
    }

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(!has_content)
        .from_writer(file);
    writer.serialize(record)?;
    writer.flush()?;

    Ok(())
}
