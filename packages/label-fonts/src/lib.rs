//! Font discovery and registration for plotters' `ab_glyph` text backend.
//!
//! The backend only draws with fonts registered by family name, so every
//! tool that renders text goes through [`register_font_file`] once at
//! startup and falls back to [`find_system_font`] when its configured font
//! is missing.

use std::path::{Path, PathBuf};

use plotters::style::{register_font, FontStyle};
use thiserror::Error;

/// Well-known locations of a plain sans-serif font on Linux systems.
pub const SYSTEM_FONT_CANDIDATES: [&str; 5] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
];

/// Errors raised while loading a font file.
#[derive(Error, Debug)]
pub enum FontError {
    #[error("cannot read font '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{path}' is not a usable font")]
    Invalid { path: PathBuf },
}

/// Candidate system fonts in lookup order, existing or not.
pub fn system_font_candidates() -> Vec<PathBuf> {
    SYSTEM_FONT_CANDIDATES.iter().map(PathBuf::from).collect()
}

/// Returns the first system font candidate that exists on disk.
pub fn find_system_font() -> Option<PathBuf> {
    system_font_candidates().into_iter().find(|p| p.is_file())
}

/// Registers the font at `path` under `family`.
///
/// The font bytes are leaked: plotters keeps a `'static` reference for the
/// lifetime of the process. Registering the same family again replaces it.
pub fn register_font_file(family: &str, path: &Path) -> Result<(), FontError> {
    let bytes = std::fs::read(path).map_err(|source| FontError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());

    register_font(family, FontStyle::Normal, bytes).map_err(|_| FontError::Invalid {
        path: path.to_path_buf(),
    })?;

    tracing::debug!("Registered font {} as '{}'", path.display(), family);
    Ok(())
}

/// Registers the first usable font of `preferred` followed by `fallbacks`.
///
/// Failures are logged and the next candidate is tried. Candidates that do
/// not exist are skipped quietly.
///
/// # Returns
/// The path that was registered, or `None` when nothing was usable.
pub fn register_first_usable<I>(family: &str, preferred: &Path, fallbacks: I) -> Option<PathBuf>
where
    I: IntoIterator<Item = PathBuf>,
{
    match register_font_file(family, preferred) {
        Ok(()) => return Some(preferred.to_path_buf()),
        Err(e) => tracing::warn!("{}", e),
    }

    for candidate in fallbacks.into_iter().filter(|p| p.is_file()) {
        match register_font_file(family, &candidate) {
            Ok(()) => {
                tracing::info!("Falling back to font {}", candidate.display());
                return Some(candidate);
            }
            Err(e) => tracing::debug!("{}", e),
        }
    }

    None
}
