//! Transaction submission through an external script.
//!
//! The script receives `{"value": ..., "memo": ...}` on stdin and prints a
//! single JSON object on stdout. Anything that goes wrong on the way is
//! folded into an `ok: false` response with an `error` string, so a failed
//! submission never stops the trial loop.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Maximum stdout characters quoted in a "not json" error.
const STDOUT_EXCERPT_CHARS: usize = 200;

/// Maximum stderr characters kept in a response.
const STDERR_KEEP_CHARS: usize = 2000;

fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Response object reported by the submit script.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TxResponse {
    fields: Map<String, Value>,
}

impl TxResponse {
    /// Wraps a decoded JSON object.
    pub fn from_map(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Failed submission carrying `error`.
    pub fn failure(error: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert("ok".to_string(), Value::Bool(false));
        fields.insert("error".to_string(), Value::String(error.into()));
        Self { fields }
    }

    /// Raw field access.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Whether the script reported success. Any truthy `ok` value counts.
    pub fn ok(&self) -> bool {
        match self.fields.get("ok") {
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Array(a)) => !a.is_empty(),
            Some(Value::Object(o)) => !o.is_empty(),
            Some(Value::Null) | None => false,
        }
    }

    /// Transaction hash of a successful submission, empty otherwise.
    pub fn txhash(&self) -> String {
        if self.ok() {
            self.field("txhash")
        } else {
            String::new()
        }
    }

    /// Field rendered as a CSV cell: strings verbatim, other values as
    /// JSON, missing or null as empty.
    pub fn field(&self, key: &str) -> String {
        match self.fields.get(key) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    /// Attaches captured stderr (truncated).
    pub fn set_stderr(&mut self, stderr: &str) {
        self.fields.insert(
            "stderr".to_string(),
            Value::String(truncate_chars(stderr, STDERR_KEEP_CHARS).to_string()),
        );
    }
}

/// Decodes the script output into a response.
///
/// # Arguments
/// * `stdout` - Script stdout; surrounding whitespace is ignored
/// * `stderr` - Script stderr; kept in the `stderr` field when non-empty
pub fn parse_output(stdout: &str, stderr: &str) -> TxResponse {
    let out = stdout.trim();
    let err = stderr.trim();

    let mut response = if out.is_empty() {
        TxResponse::failure("empty stdout")
    } else {
        match serde_json::from_str::<Value>(out) {
            Ok(Value::Object(fields)) => TxResponse::from_map(fields),
            _ => TxResponse::failure(format!(
                "stdout not json: {}",
                truncate_chars(out, STDOUT_EXCERPT_CHARS)
            )),
        }
    };

    if !err.is_empty() {
        response.set_stderr(err);
    }
    response
}

/// Something that can put a value on chain.
#[async_trait]
pub trait Submitter: Send {
    /// Submits `value` with `memo`. Never fails; errors are in the response.
    async fn submit(&mut self, value: &str, memo: &str) -> TxResponse;
}

/// Runs `<node_bin> <script>` in `cwd` for every submission.
#[derive(Debug, Clone)]
pub struct NodeScriptSubmitter {
    node_bin: String,
    script: String,
    cwd: PathBuf,
    timeout: Duration,
}

impl NodeScriptSubmitter {
    /// Create a new submitter
    pub fn new(
        node_bin: impl Into<String>,
        script: impl Into<String>,
        cwd: impl Into<PathBuf>,
        timeout: Duration,
    ) -> Self {
        Self {
            node_bin: node_bin.into(),
            script: script.into(),
            cwd: cwd.into(),
            timeout,
        }
    }

    async fn run_script(&self, input: Vec<u8>) -> std::io::Result<std::process::Output> {
        let mut child = Command::new(&self.node_bin)
            .arg(&self.script)
            .current_dir(&self.cwd)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        // Dropping stdin closes the pipe so the script sees EOF
        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(&input).await {
                // The script may exit without reading its input
                if e.kind() != std::io::ErrorKind::BrokenPipe {
                    return Err(e);
                }
            }
        }

        child.wait_with_output().await
    }
}

#[async_trait]
impl Submitter for NodeScriptSubmitter {
    async fn submit(&mut self, value: &str, memo: &str) -> TxResponse {
        let input = json!({ "value": value, "memo": memo }).to_string().into_bytes();

        match tokio::time::timeout(self.timeout, self.run_script(input)).await {
            Ok(Ok(output)) => {
                let stdout = String::from_utf8_lossy(&output.stdout);
                let stderr = String::from_utf8_lossy(&output.stderr);
                if !output.status.success() {
                    tracing::debug!("Submit script exited with {}", output.status);
                }
                parse_output(&stdout, &stderr)
            }
            Ok(Err(e)) => {
                tracing::error!("Failed to run {} {}: {}", self.node_bin, self.script, e);
                TxResponse::failure(format!("failed to run submit script: {}", e))
            }
            Err(_) => {
                tracing::error!("Submit script timed out after {:?}", self.timeout);
                TxResponse::failure(format!("timeout after {}s", self.timeout.as_secs_f64()))
            }
        }
    }
}
