//! Single-page PDF writer
//!
//! Emits a PDF 1.4 file with one page the size of the display list. Shapes
//! map directly onto path operators. ASCII text (titles, meters) uses the
//! built-in Helvetica font; music symbols are stroked from their outlines.
//! Other text is left out.

use std::fmt::Write as _;

use crate::renderers::display_list::{DisplayList, DrawCommand, TextAnchor};
use crate::renderers::outlines;
use crate::renderers::svg::fmt_num;

/// Bezier control distance for a quarter ellipse
const KAPPA: f32 = 0.552_284_8;

/// Accumulates a page content stream in PDF user space (origin bottom left)
pub struct PdfPage {
    height: f32,
    content: String,
}

impl PdfPage {
    pub fn new(height: f32) -> Self {
        Self {
            height,
            content: String::new(),
        }
    }

    fn point(&self, x: f32, y: f32) -> String {
        format!("{} {}", fmt_num(x), fmt_num(self.height - y))
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    fn op(&mut self, line: String) {
        self.content.push_str(&line);
        self.content.push('\n');
    }

    pub fn draw(&mut self, command: &DrawCommand) -> bool {
        match command {
            DrawCommand::Line {
                x1,
                y1,
                x2,
                y2,
                stroke_width,
                ..
            } => {
                let (a, b) = (self.point(*x1, *y1), self.point(*x2, *y2));
                self.op(format!("{} w {} m {} l S", fmt_num(*stroke_width), a, b));
            }
            DrawCommand::Rect {
                x,
                y,
                width,
                height,
                filled,
                ..
            } => {
                let corner = self.point(*x, y + height);
                let paint = if *filled { "f" } else { "S" };
                self.op(format!(
                    "{} {} {} re {}",
                    corner,
                    fmt_num(*width),
                    fmt_num(*height),
                    paint
                ));
            }
            DrawCommand::Ellipse {
                cx,
                cy,
                rx,
                ry,
                filled,
                ..
            } => {
                let (cx, cy, rx, ry) = (*cx, *cy, *rx, *ry);
                let (kx, ky) = (rx * KAPPA, ry * KAPPA);
                let mut path = format!("{} m", self.point(cx + rx, cy));
                let quarters = [
                    ((cx + rx, cy - ky), (cx + kx, cy - ry), (cx, cy - ry)),
                    ((cx - kx, cy - ry), (cx - rx, cy - ky), (cx - rx, cy)),
                    ((cx - rx, cy + ky), (cx - kx, cy + ry), (cx, cy + ry)),
                    ((cx + kx, cy + ry), (cx + rx, cy + ky), (cx + rx, cy)),
                ];
                for (c1, c2, end) in quarters {
                    let _ = write!(
                        path,
                        " {} {} {} c",
                        self.point(c1.0, c1.1),
                        self.point(c2.0, c2.1),
                        self.point(end.0, end.1)
                    );
                }
                path.push_str(if *filled { " f" } else { " S" });
                self.op(path);
            }
            DrawCommand::Path {
                points,
                closed,
                stroke_width,
                ..
            } => {
                let Some((first, rest)) = points.split_first() else {
                    return true;
                };
                let mut path = format!("{} w {} m", fmt_num(*stroke_width), self.point(first.0, first.1));
                for (x, y) in rest {
                    let _ = write!(path, " {} l", self.point(*x, *y));
                }
                path.push_str(if *closed { " h f" } else { " S" });
                self.op(path);
            }
            DrawCommand::Text {
                x,
                y,
                text,
                size,
                anchor,
                ..
            } => {
                if !text.is_ascii() {
                    return self.stroke_outlines(text, *x, *y, *size, *anchor);
                }
                // Helvetica averages roughly half an em per glyph
                let approx_width = text.chars().count() as f32 * size * 0.5;
                let x = match anchor {
                    TextAnchor::Start => *x,
                    TextAnchor::Middle => x - approx_width / 2.0,
                    TextAnchor::End => x - approx_width,
                };
                self.op(format!(
                    "BT /F1 {} Tf {} Td ({}) Tj ET",
                    fmt_num(*size),
                    self.point(x, *y),
                    escape_text(text)
                ));
            }
        }
        true
    }

    /// Stroke the outlined characters of `text`; false when none have one
    fn stroke_outlines(&mut self, text: &str, x: f32, y: f32, size: f32, anchor: TextAnchor) -> bool {
        let strokes = outlines::text_strokes(text, x, y, size, anchor);
        if strokes.is_empty() {
            return false;
        }
        let width = outlines::stroke_width(size);
        for stroke in strokes {
            let Some((first, rest)) = stroke.split_first() else {
                continue;
            };
            let mut path = format!("{} w {} m", fmt_num(width), self.point(first.0, first.1));
            for (px, py) in rest {
                let _ = write!(path, " {} l", self.point(*px, *py));
            }
            path.push_str(" S");
            self.op(path);
        }
        true
    }
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_ascii_control() => out.push(' '),
            c => out.push(c),
        }
    }
    out
}

/// Serialise a display list as a one-page PDF document
pub fn write_pdf(list: &DisplayList, page: &mut PdfPage) -> Vec<u8> {
    let mut skipped = 0usize;
    page.op("0 g 0 G".to_string());
    for command in &list.commands {
        if !page.draw(command) {
            skipped += 1;
        }
    }
    if skipped > 0 {
        log::trace!("PDF export skipped {} text commands it cannot draw", skipped);
    }

    let content = page.content();
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] /Contents 4 0 R /Resources << /Font << /F1 5 0 R >> >> >>",
            fmt_num(list.width),
            fmt_num(list.height)
        ),
        format!("<< /Length {} >>\nstream\n{}endstream", content.len(), content),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_string(),
    ];

    let mut out = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        let _ = write!(out, "{} 0 obj\n{}\nendobj\n", i + 1, body);
    }

    let xref_at = out.len();
    let _ = write!(out, "xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for offset in offsets {
        let _ = write!(out, "{:010} 00000 n \n", offset);
    }
    let _ = write!(
        out,
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_at
    );
    out.into_bytes()
}
