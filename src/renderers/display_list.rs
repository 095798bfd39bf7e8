//! Display List for score rendering
//!
//! The layout engine resolves every glyph of a score to absolute page
//! coordinates. Output backends (SVG, PNG, PDF) only draw what is listed here
//! and never perform layout themselves.

use serde::{Deserialize, Serialize};

use crate::models::{Clef, Orientation};

/// Everything needed to draw one rendered score
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DisplayList {
    /// Page width in pixels
    pub width: f32,

    /// Page height in pixels
    pub height: f32,

    /// Orientation the measures were laid out in
    pub orientation: Orientation,

    /// Optional document header (title, composer)
    pub header: Option<DocumentHeader>,

    /// One entry per measure box, in stored sequence order
    pub staves: Vec<RenderStave>,

    /// Drawing primitives in paint order
    pub commands: Vec<DrawCommand>,
}

/// Document header information
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DocumentHeader {
    pub title: Option<String>,
    pub composer: Option<String>,
}

/// Placement of one measure of one staff
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RenderStave {
    /// System (visual line) index
    pub system_index: usize,

    /// Staff index within the score
    pub staff_index: usize,

    /// Position within the system in reading order (0 = visually first)
    pub slot: usize,

    /// Source measure number
    pub measure_number: u32,

    /// Left edge
    pub x: f32,

    /// Top edge of the stave box
    pub y: f32,

    pub width: f32,
    pub height: f32,

    /// Clef in effect for this measure
    pub clef: Clef,

    /// Key in effect, as a major-key name (`Bb`, `F#`, ...)
    pub key: String,

    /// Meter in effect, as `beats/beat_type`
    pub time: String,
}

/// Horizontal anchor of a text command
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

impl TextAnchor {
    pub fn as_svg(self) -> &'static str {
        match self {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
            TextAnchor::End => "end",
        }
    }
}

/// A single drawing primitive
///
/// `class` names the notational role (`staff-line`, `notehead`, `beam`, ...)
/// and becomes the SVG class attribute.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DrawCommand {
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        stroke_width: f32,
        class: String,
    },
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        filled: bool,
        class: String,
    },
    Ellipse {
        cx: f32,
        cy: f32,
        rx: f32,
        ry: f32,
        filled: bool,
        class: String,
    },
    /// Open polyline (stroked) or closed polygon (filled)
    Path {
        points: Vec<(f32, f32)>,
        closed: bool,
        stroke_width: f32,
        class: String,
    },
    Text {
        x: f32,
        y: f32,
        text: String,
        size: f32,
        anchor: TextAnchor,
        class: String,
    },
}

impl DrawCommand {
    pub fn class(&self) -> &str {
        match self {
            DrawCommand::Line { class, .. }
            | DrawCommand::Rect { class, .. }
            | DrawCommand::Ellipse { class, .. }
            | DrawCommand::Path { class, .. }
            | DrawCommand::Text { class, .. } => class,
        }
    }
}

impl DisplayList {
    /// Commands carrying the given class
    pub fn commands_with_class<'a>(&'a self, class: &'a str) -> impl Iterator<Item = &'a DrawCommand> + 'a {
        self.commands.iter().filter(move |c| c.class() == class)
    }

    /// Measure boxes of one system, in slot order
    pub fn system(&self, system_index: usize, staff_index: usize) -> Vec<&RenderStave> {
        let mut staves: Vec<&RenderStave> = self
            .staves
            .iter()
            .filter(|s| s.system_index == system_index && s.staff_index == staff_index)
            .collect();
        staves.sort_by_key(|s| s.slot);
        staves
    }
}
