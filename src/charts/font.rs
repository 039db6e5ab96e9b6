//! Chart font registration.
//! Plotters draws text through `ab_glyph`, which needs font bytes registered
//! before the first caption or tick label is laid out.

use log::{debug, info, warn};
use plotters::style::{register_font, FontStyle};
use std::path::PathBuf;
use std::sync::OnceLock;

/// Family name used for every piece of chart text.
pub const CHART_FONT_FAMILY: &str = "sans-serif";

static REGISTERED: OnceLock<bool> = OnceLock::new();

/// Register the first loadable font among `candidates`.
///
/// Returns whether chart text can be drawn. Registration happens once per process.
pub fn ensure_chart_font(candidates: &[PathBuf]) -> bool {
    *REGISTERED.get_or_init(|| register_first(candidates))
}

fn register_first(candidates: &[PathBuf]) -> bool {
    for path in candidates {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) => {
                debug!("Font {} unavailable: {}", path.display(), err);
                continue;
            }
        };

        // Registered fonts live for the rest of the process
        let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
        match register_font(CHART_FONT_FAMILY, FontStyle::Normal, bytes) {
            Ok(()) => {
                info!("Chart font: {}", path.display());
                return true;
            }
            Err(_) => warn!("{} is not a usable font file", path.display()),
        }
    }

    warn!("No chart font could be loaded; charts are drawn without text");
    false
}
