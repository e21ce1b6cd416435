//! Sequential trial loop.
//!
//! Each trial: build payload, show "Sending TX...", submit, show the
//! outcome, show the QR canvas, append a CSV row. Between trials the canvas
//! is held, the panel cleared, and an optional pause taken.

use std::future::Future;
use std::time::Instant;

use crate::config::LoopConfig;
use crate::panel::Panel;
use crate::payload::{local_timestamp, QrPayload};
use crate::render::{tail_chars, Renderer, ERROR_FONT_SIZE, SUCCESS_FONT_SIZE};
use crate::submit::Submitter;
use crate::timing::TrialTiming;
use crate::trial_log::{append_record, round_ms, TrialRecord};
use crate::Result;

/// Drives trials against a panel and a submitter.
pub struct TrialRunner<P: Panel, S: Submitter> {
    config: LoopConfig,
    panel: P,
    submitter: S,
    renderer: Renderer,
    /// Trials fully completed so far
    completed: u64,
}

impl<P: Panel, S: Submitter> TrialRunner<P, S> {
    /// Create a new runner. The panel must already be initialised.
    pub fn new(config: LoopConfig, panel: P, submitter: S, renderer: Renderer) -> Self {
        Self {
            config,
            panel,
            submitter,
            renderer,
            completed: 0,
        }
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }

    pub fn submitter(&self) -> &S {
        &self.submitter
    }

    pub fn completed(&self) -> u64 {
        self.completed
    }

    /// Runs a single trial and logs its row.
    pub async fn run_trial(&mut self, trial: u64) -> Result<TrialRecord> {
        let t0 = Instant::now();
        let payload = QrPayload::generate(&self.config.node_id);
        let value = payload.onchain_value(self.config.send_full_payload)?;
        let memo = payload.memo();

        let frame = self.renderer.message_frame("Sending TX...", SUCCESS_FONT_SIZE)?;
        self.panel.display(&frame)?;

        let response = self.submitter.submit(&value, &memo).await;
        let t1 = Instant::now();

        let ok = response.ok();
        let txhash = response.txhash();

        // Outcome first, then the QR canvas
        let status = if ok {
            self.renderer.message_frame("TX OK - Display", SUCCESS_FONT_SIZE)?
        } else {
            self.renderer.message_frame("TX FAIL - Display", ERROR_FONT_SIZE)?
        };
        self.panel.display(&status)?;

        let canvas =
            self.renderer
                .qr_canvas(&payload, &txhash, self.config.include_txhash_in_qr)?;
        self.panel.display(&canvas)?;
        let t2 = Instant::now();

        let timing = TrialTiming::from_instants(t0, t1, t2);
        let record = TrialRecord {
            trial,
            local_time: local_timestamp(),
            node_id: payload.node_id.clone(),
            qr_id: payload.qr_id.clone(),
            unique_id: payload.unique_id.clone(),
            tx_ok: ok,
            txhash: txhash.clone(),
            txhash_ms: round_ms(timing.txhash_ms),
            display_ms: round_ms(timing.display_ms),
            total_ms: round_ms(timing.total_ms),
            broadcast_ms_node: response.field("broadcast_ms"),
            height: response.field("height"),
            code: response.field("code"),
            gas_wanted: response.field("gasWanted"),
            gas_used: response.field("gasUsed"),
            timestamp_chain: response.field("timestamp"),
            value_len: value.chars().count(),
            error: response.field("error"),
        };
        append_record(&self.config.csv_filename, &record)?;

        let short_hash = if txhash.is_empty() {
            "-"
        } else {
            tail_chars(&txhash, 10)
        };
        tracing::info!(
            "[{}] ok={} txhash_ms={} display_ms={} total_ms={} txhash={}",
            trial,
            ok,
            record.txhash_ms,
            record.display_ms,
            record.total_ms,
            short_hash
        );

        Ok(record)
    }

    /// Runs trials until the configured count is reached.
    ///
    /// # Returns
    /// Number of trials completed.
    pub async fn run(&mut self) -> Result<u64> {
        let mut trial = 0u64;
        loop {
            trial += 1;
            if self.config.trials.is_some_and(|max| trial > max) {
                break;
            }

            self.run_trial(trial).await?;
            self.completed += 1;

            if !self.config.display_hold.is_zero() {
                tokio::time::sleep(self.config.display_hold).await;
            }

            self.panel.clear()?;
            if !self.config.sleep_between.is_zero() {
                tokio::time::sleep(self.config.sleep_between).await;
            }
        }

        Ok(self.completed)
    }

    /// Runs trials until finished or `shutdown` resolves, then shuts the
    /// panel down in either case.
    pub async fn run_until<F>(&mut self, shutdown: F) -> Result<u64>
    where
        F: Future<Output = ()>,
    {
        let finished = tokio::select! {
            biased;
            _ = shutdown => {
                tracing::info!("ctrl + c");
                None
            }
            result = self.run() => Some(result),
        };

        self.shutdown_panel();
        finished.unwrap_or(Ok(self.completed))
    }

    /// Clears the panel and puts it to sleep, ignoring failures.
    pub fn shutdown_panel(&mut self) {
        if let Err(e) = self.panel.clear() {
            tracing::debug!("Panel clear during shutdown failed: {}", e);
        }
        if let Err(e) = self.panel.sleep() {
            tracing::debug!("Panel sleep during shutdown failed: {}", e);
        }
    }
}
