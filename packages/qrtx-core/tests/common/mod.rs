//! Shared test doubles for the trial loop.

#![allow(dead_code)]

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use qrtx_core::panel::{EPD_HEIGHT, EPD_WIDTH};
use qrtx_core::{Frame, LoopConfig, Panel, QrTxError, Submitter, TxResponse};

/// Panel that keeps frames in memory and counts lifecycle calls.
#[derive(Debug, Default)]
pub struct MemoryPanel {
    pub frames: Vec<Frame>,
    pub clears: usize,
    pub sleeps: usize,
    pub awake: bool,
}

impl Panel for MemoryPanel {
    fn width(&self) -> u32 {
        EPD_WIDTH
    }

    fn height(&self) -> u32 {
        EPD_HEIGHT
    }

    fn init(&mut self) -> qrtx_core::Result<()> {
        self.awake = true;
        Ok(())
    }

    fn clear(&mut self) -> qrtx_core::Result<()> {
        self.clears += 1;
        Ok(())
    }

    fn display(&mut self, frame: &Frame) -> qrtx_core::Result<()> {
        if !self.awake {
            return Err(QrTxError::Panel("display while asleep".to_string()));
        }
        self.frames.push(frame.clone());
        Ok(())
    }

    fn sleep(&mut self) -> qrtx_core::Result<()> {
        self.sleeps += 1;
        self.awake = false;
        Ok(())
    }
}

/// Submitter returning canned responses and recording its inputs.
#[derive(Debug, Default)]
pub struct StubSubmitter {
    pub responses: Vec<TxResponse>,
    pub calls: Vec<(String, String)>,
}

impl StubSubmitter {
    pub fn always(response: TxResponse) -> Self {
        Self {
            responses: vec![response],
            calls: Vec::new(),
        }
    }
}

#[async_trait]
impl Submitter for StubSubmitter {
    async fn submit(&mut self, value: &str, memo: &str) -> TxResponse {
        self.calls.push((value.to_string(), memo.to_string()));
        let idx = (self.calls.len() - 1).min(self.responses.len().saturating_sub(1));
        self.responses
            .get(idx)
            .cloned()
            .unwrap_or_else(|| TxResponse::failure("no stub response"))
    }
}

/// Fast loop configuration logging into `dir`.
pub fn test_config(dir: &Path, trials: Option<u64>) -> LoopConfig {
    LoopConfig {
        node_id: "node-test".to_string(),
        csv_filename: dir.join("log.csv"),
        trials,
        display_hold: Duration::ZERO,
        sleep_between: Duration::ZERO,
        frame_dir: dir.join("frames"),
        ..Default::default()
    }
}

/// Single-threaded runtime for async tests.
pub fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}
