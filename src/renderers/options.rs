//! Layout options for the score renderer

use serde::{Deserialize, Serialize};

use crate::models::Orientation;

/// Page and stave geometry, all in pixels
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderOptions {
    /// Target page width
    pub width: f32,

    /// Minimum page height (grows to fit every system)
    pub height: f32,

    /// Measures per system (visual line)
    pub measures_per_line: usize,

    /// Horizontal space given to each measure
    pub stave_width: f32,

    /// Vertical space given to each staff of a system
    pub stave_height: f32,

    /// Distance between adjacent staff lines
    pub line_spacing: f32,

    pub margin_left: f32,
    pub margin_top: f32,

    /// Force an orientation instead of reading the score's transform marker
    pub orientation: Option<Orientation>,

    /// Draw the title/composer header when the score has one
    pub show_header: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            measures_per_line: 4,
            stave_width: 250.0,
            stave_height: 150.0,
            line_spacing: 10.0,
            margin_left: 50.0,
            margin_top: 50.0,
            orientation: None,
            show_header: true,
        }
    }
}

impl RenderOptions {
    /// Parse options from a JSON object; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
