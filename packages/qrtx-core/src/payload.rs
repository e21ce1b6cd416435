//! QR payload construction.

use chrono::Local;
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::Result;

/// Display name stored in every payload.
pub const PAYLOAD_NAME: &str = "yama log e-paper";

/// Description stored in every payload.
pub const PAYLOAD_DESCRIPTION: &str = "yama log QRe-paper";

/// Local time format used for payload and log timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Number of `qr_id` characters carried in the transaction memo.
const MEMO_QR_ID_CHARS: usize = 12;

/// Payload shown in the QR code and optionally written on chain.
///
/// Field order is the serialized key order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QrPayload {
    pub node_id: String,
    pub name: String,
    pub description: String,
    pub unique_id: String,
    pub qr_id: String,
    pub timestamp: String,
}

/// QR content: the payload plus an optional txhash.
#[derive(Serialize)]
struct QrContent<'a> {
    #[serde(flatten)]
    payload: &'a QrPayload,
    #[serde(skip_serializing_if = "Option::is_none")]
    txhash: Option<&'a str>,
}

/// JSON string literal with every non-ASCII character `\u`-escaped.
fn ascii_json_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    for c in Value::from(s).to_string().chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                out.push_str(&format!("\\u{:04x}", unit));
            }
        }
    }
    out
}

/// Current local time in [`TIMESTAMP_FORMAT`].
pub fn local_timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

impl QrPayload {
    /// Creates a payload with a fresh `qr_id` and the current local time.
    pub fn generate(node_id: &str) -> Self {
        let qr_id = Uuid::new_v4().simple().to_string();
        Self::build(node_id, qr_id, local_timestamp())
    }

    /// Creates a payload from fixed parts.
    pub fn build(node_id: &str, qr_id: String, timestamp: String) -> Self {
        let unique_id = Self::unique_id_for(node_id, &qr_id, &timestamp);
        Self {
            node_id: node_id.to_string(),
            name: PAYLOAD_NAME.to_string(),
            description: PAYLOAD_DESCRIPTION.to_string(),
            unique_id,
            qr_id,
            timestamp,
        }
    }

    /// SHA-256 (lowercase hex) over the sorted-key JSON of the identity fields.
    ///
    /// The hashed text uses `", "` and `": "` separators and ASCII-only
    /// escaping, e.g. `{"node_id": "n", "qr_id": "q", "timestamp": "t"}`.
    pub fn unique_id_for(node_id: &str, qr_id: &str, timestamp: &str) -> String {
        let source = format!(
            "{{\"node_id\": {}, \"qr_id\": {}, \"timestamp\": {}}}",
            ascii_json_string(node_id),
            ascii_json_string(qr_id),
            ascii_json_string(timestamp)
        );
        hex::encode(Sha256::digest(source.as_bytes()))
    }

    /// Value written on chain: compact payload JSON, or just `unique_id`.
    pub fn onchain_value(&self, full_payload: bool) -> Result<String> {
        if full_payload {
            Ok(serde_json::to_string(self)?)
        } else {
            Ok(self.unique_id.clone())
        }
    }

    /// Transaction memo: `qr:` followed by the start of `qr_id`.
    pub fn memo(&self) -> String {
        let prefix: String = self.qr_id.chars().take(MEMO_QR_ID_CHARS).collect();
        format!("qr:{}", prefix)
    }

    /// Compact JSON encoded into the QR symbol.
    ///
    /// `txhash` is appended only when `include_txhash` is set and the hash
    /// is non-empty.
    pub fn qr_content(&self, txhash: &str, include_txhash: bool) -> Result<String> {
        let content = QrContent {
            payload: self,
            txhash: (include_txhash && !txhash.is_empty()).then_some(txhash),
        };
        Ok(serde_json::to_string(&content)?)
    }
}
