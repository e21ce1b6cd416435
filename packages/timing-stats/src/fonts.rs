//! Font registration for chart labels.
//!
//! Charts are drawn with plotters' `ab_glyph` text backend, which only knows
//! fonts that were registered explicitly. Without a registered font the
//! histogram is still rendered, minus caption and axis labels.

use std::path::Path;

pub use label_fonts::find_system_font;

use crate::error::StatsError;
use crate::Result;

/// Family name the chart code asks plotters for.
pub const CHART_FONT_FAMILY: &str = "sans-serif";

/// Registers the font at `path` as [`CHART_FONT_FAMILY`]. Call once at startup.
pub fn register_font_file(path: &Path) -> Result<()> {
    label_fonts::register_font_file(CHART_FONT_FAMILY, path)
        .map_err(|e| StatsError::Font(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_font_is_font_error() {
        let result = register_font_file(Path::new("/nonexistent/chart.ttf"));
        assert!(matches!(result, Err(StatsError::Font(_))));
    }
}
