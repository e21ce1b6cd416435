//! Trial loop tests with an in-memory panel and a stub submitter.

mod common;

use std::fs;

use ntest::timeout;
use qrtx_core::panel::{EPD_HEIGHT, EPD_WIDTH};
use qrtx_core::submit::parse_output;
use qrtx_core::trial_log::LOG_HEADER;
use qrtx_core::{FontSet, Panel, Renderer, TrialRunner, TxResponse};
use tempfile::tempdir;

use common::{runtime, test_config, MemoryPanel, StubSubmitter};

fn renderer() -> Renderer {
    Renderer::new(EPD_WIDTH, EPD_HEIGHT, FontSet::unavailable())
}

fn ready_panel() -> MemoryPanel {
    let mut panel = MemoryPanel::default();
    panel.init().unwrap();
    panel
}

fn ok_response() -> TxResponse {
    parse_output(
        r#"{"ok":true,"txhash":"0xDEADBEEF00112233445566","broadcast_ms":812,"height":1234,"code":0,"gasWanted":"200000","gasUsed":"98765","timestamp":"2025-01-02T03:04:06Z"}"#,
        "",
    )
}

#[timeout(5000)]
#[test]
fn test_successful_trial_row() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path(), Some(1));
    let mut runner = TrialRunner::new(
        config.clone(),
        ready_panel(),
        StubSubmitter::always(ok_response()),
        renderer(),
    );

    let record = runtime().block_on(runner.run_trial(1)).unwrap();

    assert_eq!(record.trial, 1);
    assert!(record.tx_ok);
    assert_eq!(record.txhash, "0xDEADBEEF00112233445566");
    assert_eq!(record.node_id, "node-test");
    assert_eq!(record.broadcast_ms_node, "812");
    assert_eq!(record.height, "1234");
    assert_eq!(record.code, "0");
    assert_eq!(record.gas_wanted, "200000");
    assert_eq!(record.gas_used, "98765");
    assert_eq!(record.timestamp_chain, "2025-01-02T03:04:06Z");
    assert_eq!(record.error, "");
    assert!(record.total_ms >= record.txhash_ms);
    assert_eq!(record.unique_id.len(), 64);
    assert_eq!(record.qr_id.len(), 32);

    // status, outcome, canvas
    assert_eq!(runner.panel().frames.len(), 3);
    let canvas = &runner.panel().frames[2];
    assert!(canvas.black_pixels() > 0);

    let contents = fs::read_to_string(&config.csv_filename).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], LOG_HEADER.join(","));
}

#[timeout(5000)]
#[test]
fn test_submitter_receives_full_payload_and_memo() {
    let dir = tempdir().unwrap();
    let mut runner = TrialRunner::new(
        test_config(dir.path(), Some(1)),
        ready_panel(),
        StubSubmitter::always(ok_response()),
        renderer(),
    );

    let record = runtime().block_on(runner.run_trial(1)).unwrap();

    let calls = &runner.submitter().calls;
    assert_eq!(calls.len(), 1);
    let (value, memo) = &calls[0];
    assert!(value.starts_with("{\"node_id\":\"node-test\""));
    assert!(value.contains(&record.unique_id));
    assert_eq!(memo, &format!("qr:{}", &record.qr_id[..12]));
    assert_eq!(record.value_len, value.chars().count());
}

#[timeout(5000)]
#[test]
fn test_unique_id_only_value() {
    let dir = tempdir().unwrap();
    let mut config = test_config(dir.path(), Some(1));
    config.send_full_payload = false;
    let mut runner = TrialRunner::new(
        config,
        ready_panel(),
        StubSubmitter::always(ok_response()),
        renderer(),
    );

    let record = runtime().block_on(runner.run_trial(1)).unwrap();

    let calls = &runner.submitter().calls;
    assert_eq!(calls[0].0, record.unique_id);
    assert_eq!(record.value_len, 64);
}

#[timeout(5000)]
#[test]
fn test_failed_submission_is_logged_not_fatal() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path(), Some(2));
    let mut runner = TrialRunner::new(
        config.clone(),
        ready_panel(),
        StubSubmitter::always(TxResponse::failure("insufficient fees")),
        renderer(),
    );

    let completed = runtime().block_on(runner.run()).unwrap();
    assert_eq!(completed, 2);

    let mut reader = csv::Reader::from_path(&config.csv_filename).unwrap();
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 2);
    for (i, row) in rows.iter().enumerate() {
        assert_eq!(&row[0], (i + 1).to_string().as_str());
        assert_eq!(&row[5], "False");
        assert_eq!(&row[6], "");
        assert_eq!(&row[17], "insufficient fees");
    }
}

#[timeout(5000)]
#[test]
fn test_run_honours_trial_count_and_clears() {
    let dir = tempdir().unwrap();
    let mut runner = TrialRunner::new(
        test_config(dir.path(), Some(3)),
        ready_panel(),
        StubSubmitter::always(ok_response()),
        renderer(),
    );

    let completed = runtime().block_on(runner.run()).unwrap();

    assert_eq!(completed, 3);
    assert_eq!(runner.completed(), 3);
    assert_eq!(runner.panel().frames.len(), 9);
    assert_eq!(runner.panel().clears, 3);
    assert_eq!(runner.panel().sleeps, 0);
}

#[timeout(5000)]
#[test]
fn test_run_until_finishes_and_shuts_down_panel() {
    let dir = tempdir().unwrap();
    let mut runner = TrialRunner::new(
        test_config(dir.path(), Some(2)),
        ready_panel(),
        StubSubmitter::always(ok_response()),
        renderer(),
    );

    let completed = runtime()
        .block_on(runner.run_until(std::future::pending()))
        .unwrap();

    assert_eq!(completed, 2);
    // one clear per trial plus the shutdown clear
    assert_eq!(runner.panel().clears, 3);
    assert_eq!(runner.panel().sleeps, 1);
    assert!(!runner.panel().awake);
}

#[timeout(5000)]
#[test]
fn test_run_until_stops_on_shutdown() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path(), None);
    let mut runner = TrialRunner::new(
        config.clone(),
        ready_panel(),
        StubSubmitter::always(ok_response()),
        renderer(),
    );

    let completed = runtime()
        .block_on(runner.run_until(std::future::ready(())))
        .unwrap();

    assert_eq!(completed, 0);
    assert_eq!(runner.panel().sleeps, 1);
    assert!(!config.csv_filename.exists());
}

#[timeout(5000)]
#[test]
fn test_panel_error_still_shuts_down() {
    let dir = tempdir().unwrap();
    // panel never initialised: first display fails
    let mut runner = TrialRunner::new(
        test_config(dir.path(), Some(1)),
        MemoryPanel::default(),
        StubSubmitter::always(ok_response()),
        renderer(),
    );

    let result = runtime().block_on(runner.run_until(std::future::pending()));

    assert!(result.is_err());
    assert_eq!(runner.panel().sleeps, 1);
}
