//! Layout Engine - turns a score into a positioned DisplayList
//!
//! Systems are built by chunking each staff's stored measure sequence. Within
//! a system, slot 0 is the visually first measure: leftmost for a standard
//! score, rightmost for a mirrored one. Each measure opens with a prefix
//! (clef, key, meter) on its reading-start edge when something has to be
//! announced there, and its elements are spread evenly across the rest of the
//! box in stored order.

use std::collections::HashMap;

use super::beams::{beam_groups, BeamGroup};
use super::context::{ContextChange, ContextTracker, MeasureContext};
use super::display_list::*;
use super::glyphs::{self, MIDDLE_LINE, TOP_LINE};
use super::options::RenderOptions;
use super::RenderError;
use crate::models::{
    Clef, KeySignature, Measure, MeasureElement, NoteDuration, Orientation, Score, TimeSignature,
};
use crate::transform::calculate_system_layout;

const HEADER_HEIGHT: f32 = 60.0;
const MEASURE_PADDING: f32 = 10.0;

/// What a measure announces before its first element
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Prefix {
    clef: Option<Clef>,
    key_signature: Option<KeySignature>,
    time_signature: Option<TimeSignature>,
}

impl Prefix {
    fn full(context: &MeasureContext) -> Self {
        Self {
            clef: Some(context.clef),
            key_signature: Some(context.key_signature),
            time_signature: Some(context.time_signature),
        }
    }

    fn changes(context: &MeasureContext, change: ContextChange) -> Self {
        Self {
            clef: change.clef.then_some(context.clef),
            key_signature: change.key_signature.then_some(context.key_signature),
            time_signature: change.time_signature.then_some(context.time_signature),
        }
    }

    fn is_empty(&self) -> bool {
        self.clef.is_none() && self.key_signature.is_none() && self.time_signature.is_none()
    }
}

/// Vertical geometry of one stave box
#[derive(Debug, Clone, Copy)]
struct StaffGeometry {
    bottom_line: f32,
    spacing: f32,
}

impl StaffGeometry {
    fn new(top: f32, height: f32, spacing: f32) -> Self {
        let first_line = top + (height - 4.0 * spacing) / 2.0;
        Self {
            bottom_line: first_line + 4.0 * spacing,
            spacing,
        }
    }

    fn y(&self, step: i32) -> f32 {
        self.bottom_line - step as f32 * self.spacing / 2.0
    }
}

/// Stem direction and beam height shared by a beam group
#[derive(Debug, Clone, Copy)]
struct BeamedStem {
    up: bool,
    end_y: f32,
}

/// Main layout engine for computing display lists
pub struct LayoutEngine<'a> {
    options: &'a RenderOptions,
}

impl<'a> LayoutEngine<'a> {
    /// Create a layout engine, rejecting geometry nothing can be drawn into
    pub fn new(options: &'a RenderOptions) -> Result<Self, RenderError> {
        let dimensions = [
            ("width", options.width),
            ("height", options.height),
            ("staveWidth", options.stave_width),
            ("staveHeight", options.stave_height),
            ("lineSpacing", options.line_spacing),
        ];
        for (name, value) in dimensions {
            if !value.is_finite() || value <= 0.0 {
                return Err(RenderError::InvalidOptions(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }
        if options.measures_per_line == 0 {
            return Err(RenderError::InvalidOptions(
                "measuresPerLine must be at least 1".to_string(),
            ));
        }
        if options.stave_height < options.line_spacing * 4.0 {
            return Err(RenderError::InvalidOptions(format!(
                "staveHeight {} cannot hold a staff with lineSpacing {}",
                options.stave_height, options.line_spacing
            )));
        }
        Ok(Self { options })
    }

    /// Lay out every staff of a score in the given orientation
    pub fn compute_layout(&self, score: &Score, orientation: Orientation) -> DisplayList {
        let opts = self.options;
        let per_line = opts.measures_per_line;

        let header = (opts.show_header && (score.title.is_some() || score.composer.is_some()))
            .then(|| DocumentHeader {
                title: score.title.clone(),
                composer: score.composer.clone(),
            });
        let header_height = if header.is_some() { HEADER_HEIGHT } else { 0.0 };

        let width = opts
            .width
            .max(opts.margin_left * 2.0 + per_line as f32 * opts.stave_width);
        let staff_count = score.staves.len();
        let system_count = score
            .staves
            .iter()
            .map(|s| s.measures.len().div_ceil(per_line))
            .max()
            .unwrap_or(0);
        let content_bottom = opts.margin_top
            + header_height
            + (system_count * staff_count) as f32 * opts.stave_height
            + opts.margin_top;
        let height = opts.height.max(content_bottom);

        let mut list = DisplayList {
            width,
            height,
            orientation,
            header: None,
            staves: Vec::new(),
            commands: Vec::new(),
        };

        if let Some(header) = &header {
            self.draw_header(&mut list.commands, header, width);
        }
        list.header = header;

        for (staff_index, staff) in score.staves.iter().enumerate() {
            let tracker = ContextTracker::for_staff(score, staff, orientation);
            let fallback = MeasureContext::staff_default(score, staff);
            let layout = calculate_system_layout(staff, per_line);

            for (system_index, measures) in layout.systems.iter().enumerate() {
                let top = opts.margin_top
                    + header_height
                    + (system_index * staff_count + staff_index) as f32 * opts.stave_height;

                for (slot, measure) in measures.iter().enumerate() {
                    let index = system_index * per_line + slot;
                    // A mirrored staff opens with the staff defaults, whatever
                    // overrides its first stored measure carries
                    let context = match orientation {
                        Orientation::Sinistra if index == 0 => fallback,
                        _ => tracker.context(index).copied().unwrap_or(fallback),
                    };
                    let prefix = match (system_index, slot) {
                        (0, 0) => Prefix::full(&context),
                        (_, 0) => Prefix {
                            clef: Some(context.clef),
                            ..Prefix::changes(&context, tracker.change(index))
                        },
                        _ => Prefix::changes(&context, tracker.change(index)),
                    };
                    let x = self.slot_x(slot, orientation, width);

                    self.draw_measure(&mut list.commands, measure, x, top, &context, prefix, orientation);
                    list.staves.push(RenderStave {
                        system_index,
                        staff_index,
                        slot,
                        measure_number: measure.number,
                        x,
                        y: top,
                        width: opts.stave_width,
                        height: opts.stave_height,
                        clef: context.clef,
                        key: glyphs::key_name(&context.key_signature).to_string(),
                        time: format!(
                            "{}/{}",
                            context.time_signature.beats, context.time_signature.beat_type
                        ),
                    });
                }
            }
        }

        log::debug!(
            "Layout ({:?}): {} measure boxes, {} commands, {}x{}",
            orientation,
            list.staves.len(),
            list.commands.len(),
            list.width,
            list.height
        );
        list
    }

    /// Left edge of a slot; mirrored scores fill systems from the right
    fn slot_x(&self, slot: usize, orientation: Orientation, page_width: f32) -> f32 {
        let opts = self.options;
        match orientation {
            Orientation::Dextra => opts.margin_left + slot as f32 * opts.stave_width,
            Orientation::Sinistra => {
                page_width - opts.margin_left - opts.stave_width - slot as f32 * opts.stave_width
            }
        }
    }

    fn draw_header(&self, commands: &mut Vec<DrawCommand>, header: &DocumentHeader, width: f32) {
        let top = self.options.margin_top;
        if let Some(title) = &header.title {
            commands.push(DrawCommand::Text {
                x: width / 2.0,
                y: top + 20.0,
                text: title.clone(),
                size: 24.0,
                anchor: TextAnchor::Middle,
                class: "title".to_string(),
            });
        }
        if let Some(composer) = &header.composer {
            commands.push(DrawCommand::Text {
                x: width - self.options.margin_left,
                y: top + 45.0,
                text: composer.clone(),
                size: 14.0,
                anchor: TextAnchor::End,
                class: "composer".to_string(),
            });
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_measure(
        &self,
        commands: &mut Vec<DrawCommand>,
        measure: &Measure,
        x: f32,
        top: f32,
        context: &MeasureContext,
        prefix: Prefix,
        orientation: Orientation,
    ) {
        let opts = self.options;
        let geometry = StaffGeometry::new(top, opts.stave_height, opts.line_spacing);
        let right = x + opts.stave_width;

        for line in 0..5 {
            let y = geometry.y(line * 2);
            commands.push(line_cmd(x, y, right, y, 1.0, "staff-line"));
        }
        for edge in [x, right] {
            commands.push(line_cmd(edge, geometry.y(TOP_LINE), edge, geometry.y(0), 1.0, "barline"));
        }

        // Prefix sits on the reading-start edge of the box
        let prefix_width = self.prefix_width(&prefix, context.clef);
        let (prefix_left, content_left, content_right) = match orientation {
            Orientation::Dextra => (x, x + prefix_width, right),
            Orientation::Sinistra => (right - prefix_width, x, right - prefix_width),
        };
        if !prefix.is_empty() {
            self.draw_prefix(commands, &prefix, context.clef, prefix_left, &geometry);
        }

        let elements = &measure.elements;
        if elements.is_empty() {
            return;
        }
        let inner_left = content_left + MEASURE_PADDING;
        let inner_width = (content_right - MEASURE_PADDING - inner_left).max(1.0);
        let slot = inner_width / elements.len() as f32;
        let centres: Vec<f32> = (0..elements.len())
            .map(|i| inner_left + (i as f32 + 0.5) * slot)
            .collect();

        let mut beamed: HashMap<usize, BeamedStem> = HashMap::new();
        for group in beam_groups(elements) {
            match group {
                Ok(group) => {
                    let stem = self.draw_beam(commands, elements, &group, &centres, context.clef, &geometry);
                    beamed.extend((group.first..=group.last).map(|i| (i, stem)));
                }
                Err(e) => log::debug!("Measure {}: {}; drawing unbeamed", measure.number, e),
            }
        }

        for (index, element) in elements.iter().enumerate() {
            self.draw_element(
                commands,
                element,
                centres[index],
                context.clef,
                &geometry,
                beamed.get(&index).copied(),
            );
        }
    }

    fn prefix_width(&self, prefix: &Prefix, clef: Clef) -> f32 {
        let s = self.options.line_spacing;
        let mut width = 0.0;
        if prefix.clef.is_some() {
            width += s * 3.5;
        }
        if let Some(key) = &prefix.key_signature {
            width += glyphs::key_signature_steps(key, clef).len() as f32 * s * 0.9 + s * 0.5;
        }
        if prefix.time_signature.is_some() {
            width += s * 2.5;
        }
        if width > 0.0 {
            width += MEASURE_PADDING / 2.0;
        }
        width.min(self.options.stave_width / 2.0)
    }

    fn draw_prefix(
        &self,
        commands: &mut Vec<DrawCommand>,
        prefix: &Prefix,
        clef: Clef,
        left: f32,
        geometry: &StaffGeometry,
    ) {
        let s = self.options.line_spacing;
        let mut cursor = left + MEASURE_PADDING / 2.0;

        if let Some(prefix_clef) = prefix.clef {
            commands.push(text_cmd(
                cursor,
                geometry.y(glyphs::clef_anchor_step(prefix_clef)),
                glyphs::clef_symbol(prefix_clef),
                s * 4.0,
                TextAnchor::Start,
                "clef",
            ));
            cursor += s * 3.5;
        }
        if let Some(key) = &prefix.key_signature {
            for (accidental, step) in glyphs::key_signature_steps(key, clef) {
                commands.push(text_cmd(
                    cursor,
                    geometry.y(step) + s * 0.5,
                    glyphs::accidental_symbol(accidental),
                    s * 2.4,
                    TextAnchor::Start,
                    "key-signature",
                ));
                cursor += s * 0.9;
            }
            cursor += s * 0.5;
        }
        if let Some(time) = prefix.time_signature {
            let centre = cursor + s;
            for (value, step) in [(time.beats, 6), (time.beat_type, 2)] {
                commands.push(text_cmd(
                    centre,
                    geometry.y(step) + s * 0.7,
                    &value.to_string(),
                    s * 2.2,
                    TextAnchor::Middle,
                    "time-signature",
                ));
            }
        }
    }

    /// Draw the beam bars of a group and return the stem shared by its members
    fn draw_beam(
        &self,
        commands: &mut Vec<DrawCommand>,
        elements: &[MeasureElement],
        group: &BeamGroup,
        centres: &[f32],
        clef: Clef,
        geometry: &StaffGeometry,
    ) -> BeamedStem {
        let s = self.options.line_spacing;
        let members = &elements[group.first..=group.last];
        let steps: Vec<i32> = members.iter().flat_map(|e| pitch_steps(e, clef)).collect();
        let average = steps.iter().sum::<i32>() as f32 / steps.len().max(1) as f32;
        let up = glyphs::stem_up(average);

        let end_y = if up {
            geometry.y(steps.iter().copied().max().unwrap_or(MIDDLE_LINE)) - s * 3.5
        } else {
            geometry.y(steps.iter().copied().min().unwrap_or(MIDDLE_LINE)) + s * 3.5
        };
        let offset = s * 0.65;
        let (x_first, x_last) = if up {
            (centres[group.first] + offset, centres[group.last] + offset)
        } else {
            (centres[group.first] - offset, centres[group.last] - offset)
        };

        let bars = members
            .iter()
            .map(|e| e.duration().flag_count())
            .min()
            .unwrap_or(1);
        let thickness = s * 0.5;
        for bar in 0..bars {
            let shift = bar as f32 * s * 0.75;
            let y = if up { end_y + shift } else { end_y - shift };
            let (y_outer, y_inner) = if up { (y, y + thickness) } else { (y, y - thickness) };
            commands.push(DrawCommand::Path {
                points: vec![(x_first, y_outer), (x_last, y_outer), (x_last, y_inner), (x_first, y_inner)],
                closed: true,
                stroke_width: 0.0,
                class: "beam".to_string(),
            });
        }

        BeamedStem { up, end_y }
    }

    fn draw_element(
        &self,
        commands: &mut Vec<DrawCommand>,
        element: &MeasureElement,
        cx: f32,
        clef: Clef,
        geometry: &StaffGeometry,
        beamed: Option<BeamedStem>,
    ) {
        if element.is_rest() {
            self.draw_rest(commands, element.duration(), element.dots(), cx, geometry);
            return;
        }

        let s = self.options.line_spacing;
        let glyph = glyphs::note_glyph(element.duration());
        let (rx, ry) = (s * 0.65, s * 0.45);
        let steps = pitch_steps(element, clef);

        for (note, step) in element.notes().iter().zip(&steps) {
            let y = geometry.y(*step);
            for ledger in glyphs::ledger_steps(*step) {
                let ly = geometry.y(ledger);
                commands.push(line_cmd(cx - rx * 1.6, ly, cx + rx * 1.6, ly, 1.0, "ledger-line"));
            }
            commands.push(DrawCommand::Ellipse {
                cx,
                cy: y,
                rx,
                ry,
                filled: glyph.filled,
                class: "notehead".to_string(),
            });
            if let Some(accidental) = note.accidental() {
                commands.push(text_cmd(
                    cx - rx - s * 0.3,
                    y + s * 0.4,
                    glyphs::accidental_symbol(accidental),
                    s * 2.0,
                    TextAnchor::End,
                    "accidental",
                ));
            }
            self.draw_dots(commands, element.dots(), cx + rx, *step, geometry);
        }

        if !glyph.has_stem || steps.is_empty() {
            return;
        }
        let (lowest, highest) = match (steps.iter().min(), steps.iter().max()) {
            (Some(lo), Some(hi)) => (*lo, *hi),
            _ => return,
        };
        let average = steps.iter().sum::<i32>() as f32 / steps.len() as f32;
        let up = beamed.map(|b| b.up).unwrap_or_else(|| glyphs::stem_up(average));
        let (stem_x, start_y, default_end) = if up {
            (cx + rx, geometry.y(lowest), geometry.y(highest) - s * 3.5)
        } else {
            (cx - rx, geometry.y(highest), geometry.y(lowest) + s * 3.5)
        };
        let end_y = beamed.map(|b| b.end_y).unwrap_or(default_end);
        commands.push(line_cmd(stem_x, start_y, stem_x, end_y, 1.2, "stem"));

        if beamed.is_none() {
            for flag in 0..glyph.flags {
                let shift = flag as f32 * s * 0.8;
                let (y0, y1) = if up {
                    (end_y + shift, end_y + shift + s * 1.5)
                } else {
                    (end_y - shift, end_y - shift - s * 1.5)
                };
                commands.push(DrawCommand::Path {
                    points: vec![(stem_x, y0), (stem_x + s * 0.9, y1)],
                    closed: false,
                    stroke_width: 1.5,
                    class: "flag".to_string(),
                });
            }
        }
    }

    fn draw_dots(&self, commands: &mut Vec<DrawCommand>, dots: u8, after_x: f32, step: i32, geometry: &StaffGeometry) {
        let s = self.options.line_spacing;
        // Dots sit in a space, never on a line
        let dot_step = if step % 2 == 0 { step + 1 } else { step };
        for dot in 0..dots {
            commands.push(DrawCommand::Ellipse {
                cx: after_x + s * 0.5 + dot as f32 * s * 0.6,
                cy: geometry.y(dot_step),
                rx: s * 0.18,
                ry: s * 0.18,
                filled: true,
                class: "dot".to_string(),
            });
        }
    }

    fn draw_rest(
        &self,
        commands: &mut Vec<DrawCommand>,
        duration: NoteDuration,
        dots: u8,
        cx: f32,
        geometry: &StaffGeometry,
    ) {
        let s = self.options.line_spacing;
        let mid = geometry.y(MIDDLE_LINE);
        match duration {
            NoteDuration::Whole => commands.push(rest_block(cx, geometry.y(6), s)),
            NoteDuration::Half => commands.push(rest_block(cx, mid - s * 0.5, s)),
            NoteDuration::Quarter => commands.push(DrawCommand::Path {
                points: vec![
                    (cx - s * 0.3, mid - s * 1.5),
                    (cx + s * 0.3, mid - s * 0.7),
                    (cx - s * 0.3, mid + s * 0.1),
                    (cx + s * 0.3, mid + s * 0.9),
                    (cx - s * 0.2, mid + s * 1.3),
                ],
                closed: false,
                stroke_width: 2.0,
                class: "rest".to_string(),
            }),
            short => {
                let flags = short.flag_count();
                for flag in 0..flags {
                    commands.push(DrawCommand::Ellipse {
                        cx: cx - s * 0.3,
                        cy: mid - s * 0.8 + flag as f32 * s,
                        rx: s * 0.25,
                        ry: s * 0.25,
                        filled: true,
                        class: "rest".to_string(),
                    });
                }
                commands.push(DrawCommand::Path {
                    points: vec![
                        (cx + s * 0.4, mid - s),
                        (cx - s * 0.1, mid + s * 1.5 + (flags.saturating_sub(1)) as f32 * s),
                    ],
                    closed: false,
                    stroke_width: 1.5,
                    class: "rest".to_string(),
                });
            }
        }
        self.draw_dots(commands, dots, cx + s * 0.6, MIDDLE_LINE + 1, geometry);
    }
}

/// Staff steps of an element's pitched notes
fn pitch_steps(element: &MeasureElement, clef: Clef) -> Vec<i32> {
    element
        .notes()
        .iter()
        .filter_map(|n| n.pitch.as_ref())
        .map(|p| glyphs::staff_step(p, clef))
        .collect()
}

fn rest_block(cx: f32, y: f32, s: f32) -> DrawCommand {
    DrawCommand::Rect {
        x: cx - s * 0.6,
        y,
        width: s * 1.2,
        height: s * 0.5,
        filled: true,
        class: "rest".to_string(),
    }
}

fn line_cmd(x1: f32, y1: f32, x2: f32, y2: f32, stroke_width: f32, class: &str) -> DrawCommand {
    DrawCommand::Line {
        x1,
        y1,
        x2,
        y2,
        stroke_width,
        class: class.to_string(),
    }
}

fn text_cmd(x: f32, y: f32, text: &str, size: f32, anchor: TextAnchor, class: &str) -> DrawCommand {
    DrawCommand::Text {
        x,
        y,
        text: text.to_string(),
        size,
        anchor,
        class: class.to_string(),
    }
}
