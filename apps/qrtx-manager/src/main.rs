//! QR transaction trial loop.
//!
//! Reads its configuration from the environment (`NODE_ID`, `N_TRIALS`,
//! `CSV_FILENAME`, ...), then loops payload -> tx -> display -> csv until the
//! trial count is reached or Ctrl+C is pressed.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use qrtx_core::{FontSet, FramePanel, LoopConfig, NodeScriptSubmitter, Panel, Renderer, TrialRunner};
use tokio::signal;
use tracing_subscriber::EnvFilter;

/// Command-line overrides on top of the environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of trials, 0 runs until interrupted (overrides N_TRIALS)
    #[arg(long)]
    trials: Option<u64>,

    /// Directory the panel frames are written to (overrides FRAME_DIR)
    #[arg(long)]
    frame_dir: Option<PathBuf>,
}

impl Args {
    fn apply(&self, config: &mut LoopConfig) {
        if let Some(n) = self.trials {
            config.trials = (n > 0).then_some(n);
        }
        if let Some(dir) = &self.frame_dir {
            config.frame_dir = dir.clone();
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut config = LoopConfig::from_env().context("Invalid environment configuration")?;
    args.apply(&mut config);

    tracing::info!(
        "SEND_FULL_PAYLOAD={} INCLUDE_TXHASH_IN_QR={}",
        u8::from(config.send_full_payload),
        u8::from(config.include_txhash_in_qr)
    );
    tracing::info!("Trial loop: payload -> tx (txhash) -> display -> csv (Ctrl+C to stop)");

    let mut panel = FramePanel::new(&config.frame_dir);
    panel
        .init()
        .with_context(|| format!("Failed to initialise panel in {}", config.frame_dir.display()))?;
    panel.clear().context("Failed to clear panel")?;

    let fonts = FontSet::load(&config.font_path);
    let renderer = Renderer::new(panel.width(), panel.height(), fonts);
    let submitter = NodeScriptSubmitter::new(
        config.node_bin.clone(),
        config.send_js.clone(),
        config.base_dir.clone(),
        config.send_timeout,
    );

    let mut runner = TrialRunner::new(config, panel, submitter, renderer);
    let completed = runner
        .run_until(async {
            if let Err(e) = signal::ctrl_c().await {
                tracing::error!("Failed to listen for ctrl_c: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await?;

    tracing::info!("Finished after {} trial(s)", completed);
    Ok(())
}
