//! Notatio Sinistra WASM Module
//!
//! Reads MusicXML and MIDI into a notation model, mirrors scores for
//! right-to-left (Sinistra) reading, and renders either orientation to SVG,
//! PNG or PDF. Scores can also be built note by note through the manual
//! entry state machine.

pub mod api;
pub mod entry;
pub mod export;
pub mod import;
pub mod models;
pub mod renderers;
pub mod transform;

// Re-export commonly used types
pub use entry::ManualEntryState;
pub use export::{export_score, ExportArtifact, ExportError, ExportFormat, ExportOptions};
pub use import::{import_bytes, import_file, ImportError};
pub use models::*;
pub use renderers::{render, render_svg, DisplayList, RenderError, RenderOptions};
pub use transform::{is_sinistra_score, transform_to_sinistra};

use wasm_bindgen::prelude::*;

// This is like the `main` function, but for WASM modules.
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    #[cfg(feature = "console_log")]
    if console_log::init_with_level(log::Level::Debug).is_err() {
        // A logger is already installed
        return;
    }

    log::info!("Notatio Sinistra WASM module initialized");
}
