//! E-paper panel abstraction.
//!
//! The vendor driver is not part of this crate. [`FramePanel`] stands in for
//! it by writing every displayed frame to disk as a PBM image.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::QrTxError;
use crate::frame::Frame;
use crate::Result;

/// Width of the 2.7" panel in pixels.
pub const EPD_WIDTH: u32 = 176;

/// Height of the 2.7" panel in pixels.
pub const EPD_HEIGHT: u32 = 264;

/// Monochrome display the trial loop draws on.
pub trait Panel {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Wakes the panel; required before `clear` or `display`.
    fn init(&mut self) -> Result<()>;

    /// Blanks the panel to white.
    fn clear(&mut self) -> Result<()>;

    /// Shows a full frame. The frame must match the panel size.
    fn display(&mut self, frame: &Frame) -> Result<()>;

    /// Puts the panel into deep sleep.
    fn sleep(&mut self) -> Result<()>;
}

/// Panel that records frames as numbered PBM files.
#[derive(Debug)]
pub struct FramePanel {
    dir: PathBuf,
    width: u32,
    height: u32,
    sequence: u64,
    awake: bool,
}

impl FramePanel {
    /// Panel of the 2.7" size writing into `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_size(dir, EPD_WIDTH, EPD_HEIGHT)
    }

    pub fn with_size(dir: impl Into<PathBuf>, width: u32, height: u32) -> Self {
        Self {
            dir: dir.into(),
            width,
            height,
            sequence: 0,
            awake: false,
        }
    }

    /// Number of frames written so far.
    pub fn frames_written(&self) -> u64 {
        self.sequence
    }

    fn ensure_awake(&self, op: &str) -> Result<()> {
        if self.awake {
            Ok(())
        } else {
            Err(QrTxError::Panel(format!("{} while panel is asleep", op)))
        }
    }

    fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
        let tmp = path.with_extension("pbm.tmp");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

impl Panel for FramePanel {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn init(&mut self) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        self.awake = true;
        tracing::debug!("Frame panel ready in {}", self.dir.display());
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.ensure_awake("clear")?;
        Self::write_atomic(
            &self.dir.join("current.pbm"),
            &Frame::new(self.width, self.height).to_pbm(),
        )
    }

    fn display(&mut self, frame: &Frame) -> Result<()> {
        self.ensure_awake("display")?;
        if frame.width() != self.width || frame.height() != self.height {
            return Err(QrTxError::Panel(format!(
                "frame is {}x{}, panel is {}x{}",
                frame.width(),
                frame.height(),
                self.width,
                self.height
            )));
        }

        self.sequence += 1;
        let pbm = frame.to_pbm();
        Self::write_atomic(&self.dir.join(format!("frame_{:05}.pbm", self.sequence)), &pbm)?;
        Self::write_atomic(&self.dir.join("current.pbm"), &pbm)
    }

    fn sleep(&mut self) -> Result<()> {
        self.awake = false;
        Ok(())
    }
}
