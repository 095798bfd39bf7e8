//! Score export
//!
//! Every format starts from the same rendered [`DisplayList`]:
//! - SVG: the display list serialised as a standalone vector document
//! - PNG: the display list rasterised at `scale` pixels per unit
//! - PDF: one page the size of the display list
//!
//! Exports draw into a [`RenderTarget`] that is released when the export
//! returns, on success and on failure alike.

pub mod pdf;
pub mod raster;
pub mod target;

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::AnyScore;
use crate::renderers::{self, DisplayList, RenderError, RenderOptions};

pub use target::RenderTarget;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("png encoding failed: {0}")]
    Png(#[from] png::EncodingError),
    #[error("invalid export options: {0}")]
    InvalidOptions(String),
    #[error("unsupported export format '{0}': use svg, png or pdf")]
    UnsupportedFormat(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Svg,
    Png,
    Pdf,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Svg => "svg",
            ExportFormat::Png => "png",
            ExportFormat::Pdf => "pdf",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Svg => "image/svg+xml",
            ExportFormat::Png => "image/png",
            ExportFormat::Pdf => "application/pdf",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "svg" => Ok(ExportFormat::Svg),
            "png" => Ok(ExportFormat::Png),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(ExportError::UnsupportedFormat(other.to_string())),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportOptions {
    /// File name without extension
    pub filename: String,

    /// Raster pixels per layout unit (PNG only)
    pub scale: f32,

    /// Layout used to render the score before export
    pub render: RenderOptions,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            filename: "sinistra-score".to_string(),
            scale: 1.0,
            render: RenderOptions::default(),
        }
    }
}

impl ExportOptions {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// A finished export, ready to hand to a download or write to disk
#[derive(Debug, Clone, PartialEq)]
pub struct ExportArtifact {
    pub filename: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    /// Write the artifact into `dir` under its file name
    pub fn save_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf, ExportError> {
        let path = dir.as_ref().join(&self.filename);
        std::fs::write(&path, &self.bytes)?;
        log::info!("Saved {} ({} bytes)", path.display(), self.bytes.len());
        Ok(path)
    }
}

/// Render a score and export it in the requested format
pub fn export_score(
    score: &AnyScore,
    format: ExportFormat,
    options: &ExportOptions,
) -> Result<ExportArtifact, ExportError> {
    let list = renderers::render(score, &options.render)?;
    export_display_list(&list, format, options)
}

/// Export an already rendered display list
pub fn export_display_list(
    list: &DisplayList,
    format: ExportFormat,
    options: &ExportOptions,
) -> Result<ExportArtifact, ExportError> {
    let base = options.filename.trim();
    if base.is_empty() {
        return Err(ExportError::InvalidOptions("filename must not be empty".to_string()));
    }

    let bytes = match format {
        ExportFormat::Svg => {
            let mut target = RenderTarget::acquire("svg", String::new());
            target.surface_mut().push_str(&renderers::to_svg(list)?);
            target.surface().as_bytes().to_vec()
        }
        ExportFormat::Png => export_png(list, options.scale)?,
        ExportFormat::Pdf => {
            let mut target = RenderTarget::acquire("pdf", pdf::PdfPage::new(list.height));
            pdf::write_pdf(list, target.surface_mut())
        }
    };

    log::info!(
        "Exported {} ({} bytes)",
        format.extension(),
        bytes.len()
    );
    Ok(ExportArtifact {
        filename: format!("{}.{}", base, format.extension()),
        mime_type: format.mime_type(),
        bytes,
    })
}

fn export_png(list: &DisplayList, scale: f32) -> Result<Vec<u8>, ExportError> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(ExportError::InvalidOptions(format!(
            "scale must be positive, got {}",
            scale
        )));
    }
    let width = (list.width * scale).ceil() as u32;
    let height = (list.height * scale).ceil() as u32;

    let mut target = RenderTarget::acquire("png", raster::Canvas::new(width, height)?);
    raster::paint(target.surface_mut(), list, scale);
    target.surface().encode_png()
}
