//! Panel frame rendering: status messages and the QR canvas.
//!
//! Text is drawn with plotters on an RGB buffer which is then thresholded
//! into a [`Frame`]. Text output is best effort: strings the font cannot
//! render are retried as ASCII, and skipped with a warning after that.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use plotters::coord::Shift;
use plotters::prelude::*;
use qrcode::{Color as QrColor, EcLevel, QrCode};

use crate::error::QrTxError;
use crate::frame::Frame;
use crate::payload::QrPayload;
use crate::Result;

/// Family name the panel font is registered under.
pub const PANEL_FONT_FAMILY: &str = "epd-panel";

/// Small labels on the QR canvas.
pub const INFO_FONT_SIZE: u32 = 14;
/// Node id on the QR canvas.
pub const MAIN_FONT_SIZE: u32 = 18;
/// Status messages after a successful submission.
pub const SUCCESS_FONT_SIZE: u32 = 22;
/// Status messages after a failed submission.
pub const ERROR_FONT_SIZE: u32 = 20;

/// Side of the QR image on the canvas, in pixels.
const QR_SIZE: u32 = 180;
/// Pixels per QR module before resizing.
const QR_BOX_SIZE: u32 = 4;
/// Quiet zone in modules.
const QR_BORDER: u32 = 4;

/// Panel font availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontSet {
    available: bool,
}

impl FontSet {
    /// Registers the font file at `path`, falling back to a system font.
    pub fn load(path: &Path) -> Self {
        Self::load_with_fallbacks(path, label_fonts::system_font_candidates())
    }

    /// Registers `path`, or else the first usable font among `fallbacks`.
    ///
    /// When nothing is usable, text rendering is disabled and frames are
    /// drawn without text.
    pub fn load_with_fallbacks<I>(path: &Path, fallbacks: I) -> Self
    where
        I: IntoIterator<Item = PathBuf>,
    {
        match label_fonts::register_first_usable(PANEL_FONT_FAMILY, path, fallbacks) {
            Some(_) => Self { available: true },
            None => {
                tracing::warn!("No usable panel font; text will not be drawn");
                Self::unavailable()
            }
        }
    }

    /// No font: text is skipped.
    pub fn unavailable() -> Self {
        Self { available: false }
    }

    pub fn is_available(&self) -> bool {
        self.available
    }
}

/// Keeps text that fits Latin-1; otherwise replaces non-ASCII characters with `?`.
pub fn safe_text(s: &str) -> Cow<'_, str> {
    if s.chars().all(|c| (c as u32) <= 0xFF) {
        Cow::Borrowed(s)
    } else {
        Cow::Owned(ascii_replace(s))
    }
}

fn ascii_replace(s: &str) -> String {
    s.chars().map(|c| if c.is_ascii() { c } else { '?' }).collect()
}

/// Last `n` characters of `s`.
pub(crate) fn tail_chars(s: &str, n: usize) -> &str {
    let count = s.chars().count();
    match s.char_indices().nth(count.saturating_sub(n)) {
        Some((idx, _)) => &s[idx..],
        None => s,
    }
}

fn text_style(size: u32) -> TextStyle<'static> {
    (PANEL_FONT_FAMILY, size as f64).into_font().color(&BLACK)
}

type CanvasArea<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// Draws `text` at `pos`, falling back to ASCII, then to nothing.
fn draw_text_lossy(area: &CanvasArea<'_>, text: &str, pos: (i32, i32), size: u32) {
    let style = text_style(size);
    let text = safe_text(text);
    if area.draw_text(&text, &style, pos).is_ok() {
        return;
    }

    let ascii = ascii_replace(&text);
    if let Err(e) = area.draw_text(&ascii, &style, pos) {
        tracing::warn!("Could not draw {:?}: {}", ascii, e);
    }
}

/// Renders `content` as a QR symbol: EC level L, 4 px modules, 4 module border.
pub fn qr_frame(content: &str) -> Result<Frame> {
    let code = QrCode::with_error_correction_level(content.as_bytes(), EcLevel::L)
        .map_err(|e| QrTxError::Qr(e.to_string()))?;

    let modules = code.width() as u32;
    let side = (modules + 2 * QR_BORDER) * QR_BOX_SIZE;
    let mut frame = Frame::new(side, side);

    for (i, color) in code.to_colors().into_iter().enumerate() {
        if color != QrColor::Dark {
            continue;
        }
        let mx = i as u32 % modules + QR_BORDER;
        let my = i as u32 / modules + QR_BORDER;
        for py in 0..QR_BOX_SIZE {
            for px in 0..QR_BOX_SIZE {
                frame.set(mx * QR_BOX_SIZE + px, my * QR_BOX_SIZE + py, false);
            }
        }
    }

    Ok(frame)
}

/// Builds panel-sized frames.
#[derive(Debug, Clone)]
pub struct Renderer {
    width: u32,
    height: u32,
    fonts: FontSet,
}

impl Renderer {
    pub fn new(width: u32, height: u32, fonts: FontSet) -> Self {
        Self {
            width,
            height,
            fonts,
        }
    }

    /// Runs `draw` on a white canvas and thresholds the result.
    fn render_text_layer<F>(&self, draw: F) -> Result<Frame>
    where
        F: FnOnce(&CanvasArea<'_>),
    {
        let mut rgb = vec![255u8; self.width as usize * self.height as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut rgb, (self.width, self.height))
                .into_drawing_area();
            if self.fonts.is_available() {
                draw(&root);
            }
            root.present()
                .map_err(|e| QrTxError::Render(e.to_string()))?;
        }

        Frame::from_rgb(self.width, self.height, &rgb)
            .ok_or_else(|| QrTxError::Render("canvas buffer size mismatch".to_string()))
    }

    /// Single message centred on the panel.
    pub fn message_frame(&self, message: &str, size: u32) -> Result<Frame> {
        self.render_text_layer(|root| {
            let style = text_style(size);
            let mut text = safe_text(message).into_owned();

            let dims = match root.estimate_text_size(&text, &style) {
                Ok(dims) => Some(dims),
                Err(_) => {
                    text = ascii_replace(&text);
                    root.estimate_text_size(&text, &style).ok()
                }
            };
            let Some((text_w, text_h)) = dims else {
                tracing::warn!("Could not measure message {:?}; leaving panel blank", text);
                return;
            };

            let x = (self.width as i32 - text_w as i32).div_euclid(2);
            let y = (self.height as i32 - text_h as i32).div_euclid(2);
            draw_text_lossy(root, &text, (x, y), size);
        })
    }

    /// Trial result canvas: identity labels on top, QR symbol at the bottom.
    ///
    /// An empty `txhash` marks a failed submission.
    pub fn qr_canvas(&self, payload: &QrPayload, txhash: &str, include_txhash: bool) -> Result<Frame> {
        let qr_id_tail: String = payload.qr_id.chars().skip(8).collect();
        let tx_line = if txhash.is_empty() {
            "Tx: (failed)".to_string()
        } else {
            format!("Tx: ..{}", tail_chars(txhash, 10))
        };

        let lines = [
            ("Node ID:".to_string(), (10, 5), INFO_FONT_SIZE),
            (payload.node_id.clone(), (10, 21), MAIN_FONT_SIZE),
            ("Timestamp:".to_string(), (10, 47), INFO_FONT_SIZE),
            (payload.timestamp.clone(), (10, 63), INFO_FONT_SIZE),
            (format!("(QR ID: {})", qr_id_tail), (10, 89), INFO_FONT_SIZE),
            (tx_line, (10, 105), INFO_FONT_SIZE),
        ];

        let mut canvas = self.render_text_layer(|root| {
            for (text, pos, size) in &lines {
                draw_text_lossy(root, text, *pos, *size);
            }
        })?;

        let content = payload.qr_content(txhash, include_txhash)?;
        let qr = qr_frame(&content)?.resize_nearest(QR_SIZE, QR_SIZE);
        let qr_x = (self.width as i32 - QR_SIZE as i32).div_euclid(2);
        let qr_y = self.height as i32 - QR_SIZE as i32;
        canvas.paste(&qr, qr_x, qr_y);

        Ok(canvas)
    }
}
