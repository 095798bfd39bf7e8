//! Import, transform, render and export operations for the WASM API
//!
//! Scores cross the boundary as plain JS objects (serde-wasm-bindgen). A
//! mirrored score keeps its `isTransformed` marker, which is how the render
//! and export calls pick the orientation.

use wasm_bindgen::prelude::*;

use crate::api::helpers::{deserialize, js_error, parse_settings, serialize};
use crate::export::{self, ExportArtifact, ExportFormat, ExportOptions};
use crate::import;
use crate::models::{AnyScore, Score};
use crate::renderers::{self, RenderOptions};
use crate::transform;

// ============================================================================
// Import
// ============================================================================

/// Parse a MusicXML document (score-partwise)
#[wasm_bindgen(js_name = parseMusicXML)]
pub fn parse_musicxml(xml: &str) -> Result<JsValue, JsValue> {
    let score = import::parse_musicxml(xml).map_err(|e| js_error("MusicXML import failed", e))?;
    serialize(&score, "Failed to serialize score")
}

/// Parse a Standard MIDI File
#[wasm_bindgen(js_name = parseMIDI)]
pub fn parse_midi(bytes: &[u8]) -> Result<JsValue, JsValue> {
    let score = import::parse_midi(bytes).map_err(|e| js_error("MIDI import failed", e))?;
    serialize(&score, "Failed to serialize score")
}

/// Import a file's bytes, choosing the reader from the file extension
///
/// A score without a title is named after the file.
#[wasm_bindgen(js_name = importFile)]
pub fn import_file(file_name: &str, bytes: &[u8]) -> Result<JsValue, JsValue> {
    let mut score = import::import_bytes(file_name, bytes)
        .map_err(|e| js_error(&format!("Failed to import '{}'", file_name), e))?;
    if score.title.is_none() {
        score.title = Some(import::title_from_file_name(file_name));
    }
    serialize(&score, "Failed to serialize score")
}

// ============================================================================
// Transform
// ============================================================================

#[wasm_bindgen(js_name = transformToSinistra)]
pub fn transform_to_sinistra(score_js: JsValue) -> Result<JsValue, JsValue> {
    let score: Score = deserialize(score_js, "Invalid score")?;
    let sinistra = transform::transform_to_sinistra(&score);
    serialize(&sinistra, "Failed to serialize Sinistra score")
}

#[wasm_bindgen(js_name = isSinistraScore)]
pub fn is_sinistra_score(score_js: JsValue) -> Result<bool, JsValue> {
    let score: AnyScore = deserialize(score_js, "Invalid score")?;
    Ok(transform::is_sinistra_score(&score))
}

/// Check the structural invariants of a score in performance order
#[wasm_bindgen(js_name = validateScore)]
pub fn validate_score(score_js: JsValue) -> Result<(), JsValue> {
    let score: Score = deserialize(score_js, "Invalid score")?;
    score.validate().map_err(|e| js_error("Score validation failed", e))
}

// ============================================================================
// Render
// ============================================================================

/// Lay out a score and return its display list
///
/// # Arguments
/// * `score_js` - A score or Sinistra score
/// * `options_json` - Optional JSON `RenderOptions`; missing fields use defaults
#[wasm_bindgen(js_name = renderScore)]
pub fn render_score(score_js: JsValue, options_json: Option<String>) -> Result<JsValue, JsValue> {
    let score: AnyScore = deserialize(score_js, "Invalid score")?;
    let options: RenderOptions = parse_settings(options_json).map_err(|e| js_error("Render options", e))?;
    let list = renderers::render(&score, &options).map_err(|e| js_error("Render failed", e))?;
    serialize(&list, "Failed to serialize display list")
}

/// Lay out a score and return it as an SVG document string
#[wasm_bindgen(js_name = renderSvg)]
pub fn render_svg(score_js: JsValue, options_json: Option<String>) -> Result<String, JsValue> {
    let score: AnyScore = deserialize(score_js, "Invalid score")?;
    let options: RenderOptions = parse_settings(options_json).map_err(|e| js_error("Render options", e))?;
    renderers::render_svg(&score, &options).map_err(|e| js_error("Render failed", e))
}

// ============================================================================
// Export
// ============================================================================

/// A finished export handed to JavaScript for download
#[wasm_bindgen]
pub struct ExportedFile {
    filename: String,
    mime_type: String,
    bytes: Vec<u8>,
}

#[wasm_bindgen]
impl ExportedFile {
    #[wasm_bindgen(getter)]
    pub fn filename(&self) -> String {
        self.filename.clone()
    }

    #[wasm_bindgen(getter, js_name = mimeType)]
    pub fn mime_type(&self) -> String {
        self.mime_type.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn bytes(&self) -> js_sys::Uint8Array {
        js_sys::Uint8Array::from(self.bytes.as_slice())
    }
}

impl From<ExportArtifact> for ExportedFile {
    fn from(artifact: ExportArtifact) -> Self {
        Self {
            filename: artifact.filename,
            mime_type: artifact.mime_type.to_string(),
            bytes: artifact.bytes,
        }
    }
}

/// Export a score as `svg`, `png` or `pdf`
///
/// # Arguments
/// * `score_js` - A score or Sinistra score
/// * `format` - Output format name
/// * `options_json` - Optional JSON `ExportOptions` (filename, scale, render)
#[wasm_bindgen(js_name = exportScore)]
pub fn export_score(
    score_js: JsValue,
    format: &str,
    options_json: Option<String>,
) -> Result<ExportedFile, JsValue> {
    let score: AnyScore = deserialize(score_js, "Invalid score")?;
    let format: ExportFormat = format.parse().map_err(|e| js_error("Export failed", e))?;
    let options: ExportOptions = parse_settings(options_json).map_err(|e| js_error("Export options", e))?;

    let artifact = export::export_score(&score, format, &options).map_err(|e| js_error("Export failed", e))?;
    log::info!("exportScore: {} ({} bytes)", artifact.filename, artifact.bytes.len());
    Ok(artifact.into())
}
