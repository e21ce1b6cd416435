//! QR transaction trial loop.
//!
//! Builds a unique QR payload, hands it to an external transaction
//! submitter, renders the outcome on an e-paper panel and appends one CSV
//! row per trial.

pub mod config;
pub mod error;
pub mod frame;
pub mod panel;
pub mod payload;
pub mod render;
pub mod runner;
pub mod submit;
pub mod timing;
pub mod trial_log;

pub use config::LoopConfig;
pub use error::{ConfigError, QrTxError};
pub use frame::Frame;
pub use panel::{FramePanel, Panel};
pub use payload::QrPayload;
pub use render::{FontSet, Renderer};
pub use runner::TrialRunner;
pub use submit::{NodeScriptSubmitter, Submitter, TxResponse};
pub use trial_log::TrialRecord;

/// Result type for qrtx-core operations.
pub type Result<T> = std::result::Result<T, QrTxError>;
