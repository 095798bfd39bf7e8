//! Software rasteriser for PNG export
//!
//! Paints display list shapes into an RGBA buffer with plain coverage tests
//! (no anti-aliasing). Text is drawn from stroke outlines, so music symbols
//! and digits appear while plain words (titles) are left out.

use crate::renderers::display_list::{DisplayList, DrawCommand};
use crate::renderers::outlines;

use super::ExportError;

const MAX_DIMENSION: u32 = 16_384;
const INK: [u8; 4] = [0, 0, 0, 255];

/// RGBA pixel buffer, initialised to opaque white
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Result<Self, ExportError> {
        if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(ExportError::InvalidOptions(format!(
                "raster size {}x{} outside 1..={}",
                width, height, MAX_DIMENSION
            )));
        }
        Ok(Self {
            width,
            height,
            pixels: vec![255; width as usize * height as usize * 4],
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Colour of a pixel, if inside the canvas
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let mut px = [0u8; 4];
        px.copy_from_slice(&self.pixels[i..i + 4]);
        Some(px)
    }

    pub fn ink_count(&self) -> usize {
        self.pixels.chunks_exact(4).filter(|p| p[0] == 0).count()
    }

    fn plot(&mut self, x: i64, y: i64) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        self.pixels[i..i + 4].copy_from_slice(&INK);
    }

    /// Pixel range covering [lo, hi] along one axis, clipped to `limit`
    fn span(lo: f32, hi: f32, limit: u32) -> std::ops::Range<i64> {
        let start = (lo.floor() as i64).max(0);
        let end = (hi.ceil() as i64 + 1).min(limit as i64);
        start..end.max(start)
    }

    fn fill_where(&mut self, bounds: (f32, f32, f32, f32), inside: impl Fn(f32, f32) -> bool) {
        let (x0, y0, x1, y1) = bounds;
        for py in Self::span(y0, y1, self.height) {
            for px in Self::span(x0, x1, self.width) {
                if inside(px as f32 + 0.5, py as f32 + 0.5) {
                    self.plot(px, py);
                }
            }
        }
    }

    pub fn line(&mut self, a: (f32, f32), b: (f32, f32), width: f32) {
        let half = (width / 2.0).max(0.5);
        let bounds = (
            a.0.min(b.0) - half,
            a.1.min(b.1) - half,
            a.0.max(b.0) + half,
            a.1.max(b.1) + half,
        );
        self.fill_where(bounds, |x, y| distance_to_segment((x, y), a, b) <= half);
    }

    pub fn rect(&mut self, x: f32, y: f32, w: f32, h: f32, filled: bool) {
        if filled {
            self.fill_where((x, y, x + w, y + h), |px, py| {
                px >= x && px <= x + w && py >= y && py <= y + h
            });
        } else {
            let corners = [(x, y), (x + w, y), (x + w, y + h), (x, y + h)];
            for i in 0..4 {
                self.line(corners[i], corners[(i + 1) % 4], 1.0);
            }
        }
    }

    pub fn ellipse(&mut self, cx: f32, cy: f32, rx: f32, ry: f32, filled: bool) {
        let (rx, ry) = (rx.max(0.5), ry.max(0.5));
        let bounds = (cx - rx - 1.0, cy - ry - 1.0, cx + rx + 1.0, cy + ry + 1.0);
        let norm = move |x: f32, y: f32| ((x - cx) / rx).powi(2) + ((y - cy) / ry).powi(2);
        if filled {
            self.fill_where(bounds, |x, y| norm(x, y) <= 1.0);
        } else {
            // One pixel ring around the outline
            let inner = ((rx - 1.0).max(0.1) / rx).min((ry - 1.0).max(0.1) / ry).powi(2);
            self.fill_where(bounds, |x, y| {
                let n = norm(x, y);
                n <= 1.0 && n >= inner
            });
        }
    }

    pub fn polyline(&mut self, points: &[(f32, f32)], width: f32) {
        for pair in points.windows(2) {
            self.line(pair[0], pair[1], width);
        }
    }

    pub fn polygon(&mut self, points: &[(f32, f32)]) {
        if points.len() < 3 {
            self.polyline(points, 1.0);
            return;
        }
        let (mut x0, mut y0, mut x1, mut y1) = (f32::MAX, f32::MAX, f32::MIN, f32::MIN);
        for &(x, y) in points {
            x0 = x0.min(x);
            y0 = y0.min(y);
            x1 = x1.max(x);
            y1 = y1.max(y);
        }
        self.fill_where((x0, y0, x1, y1), |x, y| point_in_polygon((x, y), points));
    }

    /// Encode as an 8-bit RGBA PNG
    pub fn encode_png(&self) -> Result<Vec<u8>, ExportError> {
        let mut png_data = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut png_data, self.width, self.height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header()?;
            writer.write_image_data(&self.pixels)?;
        }
        Ok(png_data)
    }
}

fn distance_to_segment(p: (f32, f32), a: (f32, f32), b: (f32, f32)) -> f32 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq == 0.0 {
        0.0
    } else {
        (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len_sq).clamp(0.0, 1.0)
    };
    let (qx, qy) = (a.0 + t * dx, a.1 + t * dy);
    ((p.0 - qx).powi(2) + (p.1 - qy).powi(2)).sqrt()
}

/// Even-odd rule
fn point_in_polygon(p: (f32, f32), points: &[(f32, f32)]) -> bool {
    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (xi, yi) = points[i];
        let (xj, yj) = points[j];
        if (yi > p.1) != (yj > p.1) && p.0 < (xj - xi) * (p.1 - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Paint every shape of a display list, scaled by `scale`
pub fn paint(canvas: &mut Canvas, list: &DisplayList, scale: f32) {
    let s = |v: f32| v * scale;
    let mut skipped_text = 0usize;

    for command in &list.commands {
        match command {
            DrawCommand::Line {
                x1,
                y1,
                x2,
                y2,
                stroke_width,
                ..
            } => canvas.line((s(*x1), s(*y1)), (s(*x2), s(*y2)), s(*stroke_width)),
            DrawCommand::Rect {
                x,
                y,
                width,
                height,
                filled,
                ..
            } => canvas.rect(s(*x), s(*y), s(*width), s(*height), *filled),
            DrawCommand::Ellipse {
                cx,
                cy,
                rx,
                ry,
                filled,
                ..
            } => canvas.ellipse(s(*cx), s(*cy), s(*rx), s(*ry), *filled),
            DrawCommand::Path {
                points,
                closed,
                stroke_width,
                ..
            } => {
                let scaled: Vec<(f32, f32)> = points.iter().map(|(x, y)| (s(*x), s(*y))).collect();
                if *closed {
                    canvas.polygon(&scaled);
                } else {
                    canvas.polyline(&scaled, s(*stroke_width));
                }
            }
            DrawCommand::Text {
                x,
                y,
                text,
                size,
                anchor,
                ..
            } => {
                let strokes = outlines::text_strokes(text, *x, *y, *size, *anchor);
                if strokes.is_empty() {
                    skipped_text += 1;
                }
                let width = s(outlines::stroke_width(*size));
                for stroke in strokes {
                    let scaled: Vec<(f32, f32)> = stroke.iter().map(|(x, y)| (s(*x), s(*y))).collect();
                    canvas.polyline(&scaled, width);
                }
            }
        }
    }

    if skipped_text > 0 {
        log::trace!("Raster export skipped {} text commands without outlines", skipped_text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_canvas() {
        assert!(Canvas::new(0, 10).is_err());
        assert!(Canvas::new(10, MAX_DIMENSION + 1).is_err());
    }

    #[test]
    fn test_starts_white() {
        let canvas = Canvas::new(4, 3).unwrap();
        assert_eq!(canvas.pixel(3, 2), Some([255, 255, 255, 255]));
        assert_eq!(canvas.pixel(4, 0), None);
        assert_eq!(canvas.ink_count(), 0);
    }

    #[test]
    fn test_horizontal_line() {
        let mut canvas = Canvas::new(20, 10).unwrap();
        canvas.line((2.0, 5.0), (17.0, 5.0), 1.0);
        assert_eq!(canvas.pixel(10, 5), Some(INK));
        assert_eq!(canvas.pixel(10, 8), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_filled_shapes() {
        let mut canvas = Canvas::new(30, 30).unwrap();
        canvas.ellipse(10.0, 10.0, 4.0, 3.0, true);
        assert_eq!(canvas.pixel(10, 10), Some(INK));

        canvas.polygon(&[(20.0, 20.0), (28.0, 20.0), (28.0, 28.0), (20.0, 28.0)]);
        assert_eq!(canvas.pixel(24, 24), Some(INK));
        assert_eq!(canvas.pixel(24, 18), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_hollow_ellipse_keeps_centre_clear() {
        let mut canvas = Canvas::new(30, 30).unwrap();
        canvas.ellipse(15.0, 15.0, 8.0, 6.0, false);
        assert_eq!(canvas.pixel(15, 15), Some([255, 255, 255, 255]));
        assert!(canvas.ink_count() > 0);
    }

    #[test]
    fn test_symbols_are_painted_from_outlines() {
        use crate::models::Orientation;
        use crate::renderers::display_list::TextAnchor;

        let text = |text: &str| DrawCommand::Text {
            x: 20.0,
            y: 30.0,
            text: text.to_string(),
            size: 20.0,
            anchor: TextAnchor::End,
            class: "accidental".to_string(),
        };
        let list = |commands| DisplayList {
            width: 40.0,
            height: 40.0,
            orientation: Orientation::Dextra,
            header: None,
            staves: Vec::new(),
            commands,
        };

        let mut sharp = Canvas::new(40, 40).unwrap();
        paint(&mut sharp, &list(vec![text("\u{266F}")]), 1.0);
        let mut flat = Canvas::new(40, 40).unwrap();
        paint(&mut flat, &list(vec![text("\u{266D}")]), 1.0);
        let mut words = Canvas::new(40, 40).unwrap();
        paint(&mut words, &list(vec![text("Suite")]), 1.0);

        assert!(sharp.ink_count() > 0);
        assert!(flat.ink_count() > 0);
        assert_ne!(sharp.encode_png().unwrap(), flat.encode_png().unwrap());
        assert_eq!(words.ink_count(), 0);
    }

    #[test]
    fn test_png_signature() {
        let canvas = Canvas::new(2, 2).unwrap();
        let bytes = canvas.encode_png().unwrap();
        assert_eq!(&bytes[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }
}
