//! Stroke outlines for music symbols and digits
//!
//! Backends without a font (PNG, and PDF for anything outside Helvetica)
//! draw the symbols of text commands from these polylines. Coordinates are
//! in ems: x grows right from the glyph origin, y grows down from the
//! baseline, so most of a glyph sits at negative y.

use super::display_list::TextAnchor;

/// One glyph: its advance width and the polylines that draw it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Outline {
    pub advance: f32,
    pub strokes: &'static [&'static [(f32, f32)]],
}

static SHARP: Outline = Outline {
    advance: 0.35,
    strokes: &[
        &[(0.11, -0.5), (0.11, 0.1)],
        &[(0.21, -0.55), (0.21, 0.05)],
        &[(0.03, -0.25), (0.29, -0.33)],
        &[(0.03, -0.07), (0.29, -0.15)],
    ],
};

static FLAT: Outline = Outline {
    advance: 0.3,
    strokes: &[
        &[(0.05, -0.75), (0.05, 0.05)],
        &[(0.05, -0.2), (0.15, -0.28), (0.23, -0.22), (0.21, -0.1), (0.05, 0.05)],
    ],
};

static NATURAL: Outline = Outline {
    advance: 0.3,
    strokes: &[
        &[(0.05, -0.6), (0.05, -0.05)],
        &[(0.2, -0.35), (0.2, 0.2)],
        &[(0.05, -0.3), (0.2, -0.35)],
        &[(0.05, -0.05), (0.2, -0.1)],
    ],
};

static DOUBLE_SHARP: Outline = Outline {
    advance: 0.35,
    strokes: &[
        &[(0.03, -0.38), (0.29, -0.08)],
        &[(0.03, -0.08), (0.29, -0.38)],
    ],
};

static DOUBLE_FLAT: Outline = Outline {
    advance: 0.5,
    strokes: &[
        &[(0.05, -0.75), (0.05, 0.05)],
        &[(0.05, -0.2), (0.15, -0.28), (0.23, -0.22), (0.21, -0.1), (0.05, 0.05)],
        &[(0.25, -0.75), (0.25, 0.05)],
        &[(0.25, -0.2), (0.35, -0.28), (0.43, -0.22), (0.41, -0.1), (0.25, 0.05)],
    ],
};

// Anchored on the G line
static TREBLE_CLEF: Outline = Outline {
    advance: 0.4,
    strokes: &[&[
        (0.1, 0.4),
        (0.14, 0.45),
        (0.2, 0.42),
        (0.21, 0.3),
        (0.18, -0.6),
        (0.22, -0.85),
        (0.27, -0.95),
        (0.3, -0.85),
        (0.25, -0.65),
        (0.08, -0.35),
        (0.03, -0.1),
        (0.08, 0.08),
        (0.2, 0.13),
        (0.3, 0.05),
        (0.3, -0.1),
        (0.2, -0.17),
        (0.12, -0.1),
        (0.15, 0.0),
    ]],
};

// Anchored on the F line, dots either side of it
static BASS_CLEF: Outline = Outline {
    advance: 0.45,
    strokes: &[
        &[
            (0.05, 0.0),
            (0.03, -0.12),
            (0.12, -0.22),
            (0.25, -0.2),
            (0.3, -0.05),
            (0.22, 0.15),
            (0.05, 0.35),
        ],
        &[(0.38, -0.14), (0.38, -0.1)],
        &[(0.38, 0.1), (0.38, 0.14)],
    ],
};

// Anchored on the middle C line
static C_CLEF: Outline = Outline {
    advance: 0.4,
    strokes: &[
        &[(0.03, -0.5), (0.03, 0.5)],
        &[(0.09, -0.5), (0.09, 0.5)],
        &[(0.09, 0.0), (0.17, -0.15), (0.25, -0.48), (0.32, -0.4), (0.3, -0.25), (0.22, -0.2)],
        &[(0.09, 0.0), (0.17, 0.15), (0.25, 0.48), (0.32, 0.4), (0.3, 0.25), (0.22, 0.2)],
    ],
};

static DIGITS: [Outline; 10] = [
    Outline {
        advance: 0.5,
        strokes: &[&[
            (0.25, -0.7),
            (0.42, -0.6),
            (0.45, -0.35),
            (0.42, -0.1),
            (0.25, 0.0),
            (0.08, -0.1),
            (0.05, -0.35),
            (0.08, -0.6),
            (0.25, -0.7),
        ]],
    },
    Outline {
        advance: 0.5,
        strokes: &[&[(0.15, -0.55), (0.27, -0.7), (0.27, 0.0)], &[(0.15, 0.0), (0.39, 0.0)]],
    },
    Outline {
        advance: 0.5,
        strokes: &[&[
            (0.08, -0.55),
            (0.2, -0.7),
            (0.38, -0.68),
            (0.44, -0.52),
            (0.38, -0.36),
            (0.06, 0.0),
            (0.45, 0.0),
        ]],
    },
    Outline {
        advance: 0.5,
        strokes: &[&[
            (0.08, -0.62),
            (0.25, -0.7),
            (0.42, -0.62),
            (0.42, -0.45),
            (0.25, -0.37),
            (0.42, -0.28),
            (0.44, -0.1),
            (0.25, 0.0),
            (0.06, -0.08),
        ]],
    },
    Outline {
        advance: 0.5,
        strokes: &[&[(0.35, 0.0), (0.35, -0.7), (0.05, -0.2), (0.45, -0.2)]],
    },
    Outline {
        advance: 0.5,
        strokes: &[&[
            (0.42, -0.7),
            (0.1, -0.7),
            (0.08, -0.4),
            (0.3, -0.43),
            (0.44, -0.28),
            (0.42, -0.08),
            (0.25, 0.0),
            (0.06, -0.06),
        ]],
    },
    Outline {
        advance: 0.5,
        strokes: &[&[
            (0.4, -0.65),
            (0.25, -0.7),
            (0.1, -0.58),
            (0.05, -0.3),
            (0.1, -0.07),
            (0.25, 0.0),
            (0.42, -0.1),
            (0.42, -0.3),
            (0.25, -0.4),
            (0.06, -0.3),
        ]],
    },
    Outline {
        advance: 0.5,
        strokes: &[&[(0.05, -0.7), (0.45, -0.7), (0.2, 0.0)]],
    },
    Outline {
        advance: 0.5,
        strokes: &[&[
            (0.25, -0.38),
            (0.1, -0.45),
            (0.1, -0.63),
            (0.25, -0.7),
            (0.4, -0.63),
            (0.4, -0.45),
            (0.25, -0.38),
            (0.07, -0.28),
            (0.07, -0.08),
            (0.25, 0.0),
            (0.43, -0.08),
            (0.43, -0.28),
            (0.25, -0.38),
        ]],
    },
    Outline {
        advance: 0.5,
        strokes: &[&[
            (0.44, -0.4),
            (0.25, -0.3),
            (0.08, -0.4),
            (0.08, -0.6),
            (0.25, -0.7),
            (0.44, -0.6),
            (0.44, -0.3),
            (0.38, -0.08),
            (0.25, 0.0),
            (0.1, -0.05),
        ]],
    },
];

/// Outline for a symbol the renderer emits, if there is one
pub fn outline(ch: char) -> Option<&'static Outline> {
    let glyph = match ch {
        '\u{266F}' => &SHARP,
        '\u{266D}' => &FLAT,
        '\u{266E}' => &NATURAL,
        '\u{1D12A}' => &DOUBLE_SHARP,
        '\u{1D12B}' => &DOUBLE_FLAT,
        '\u{1D11E}' => &TREBLE_CLEF,
        '\u{1D122}' => &BASS_CLEF,
        '\u{1D121}' => &C_CLEF,
        '0'..='9' => &DIGITS[ch as usize - '0' as usize],
        _ => return None,
    };
    Some(glyph)
}

/// Whether every character of `text` can be drawn from outlines
pub fn has_outlines(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| outline(c).is_some())
}

/// Polylines in page coordinates for the outlined characters of `text`
///
/// Characters without an outline are skipped and take no space.
pub fn text_strokes(text: &str, x: f32, y: f32, size: f32, anchor: TextAnchor) -> Vec<Vec<(f32, f32)>> {
    let glyphs: Vec<&Outline> = text.chars().filter_map(outline).collect();
    let width: f32 = glyphs.iter().map(|g| g.advance).sum::<f32>() * size;
    let mut origin = match anchor {
        TextAnchor::Start => x,
        TextAnchor::Middle => x - width / 2.0,
        TextAnchor::End => x - width,
    };

    let mut strokes = Vec::new();
    for glyph in glyphs {
        for stroke in glyph.strokes {
            strokes.push(
                stroke
                    .iter()
                    .map(|(gx, gy)| (origin + gx * size, y + gy * size))
                    .collect(),
            );
        }
        origin += glyph.advance * size;
    }
    strokes
}

/// Stroke width for outlines drawn at `size`
pub fn stroke_width(size: f32) -> f32 {
    (size * 0.06).max(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Accidental, Clef};
    use crate::renderers::glyphs::{accidental_symbol, clef_symbol};

    #[test]
    fn test_every_emitted_symbol_has_an_outline() {
        for accidental in [
            Accidental::Sharp,
            Accidental::Flat,
            Accidental::Natural,
            Accidental::DoubleSharp,
            Accidental::DoubleFlat,
        ] {
            assert!(has_outlines(accidental_symbol(accidental)), "{:?}", accidental);
        }
        for clef in [Clef::Treble, Clef::Bass, Clef::Alto, Clef::Tenor] {
            assert!(has_outlines(clef_symbol(clef)), "{:?}", clef);
        }
        assert!(has_outlines("12"));
        assert!(!has_outlines("Title"));
        assert!(!has_outlines(""));
    }

    #[test]
    fn test_anchor_shifts_strokes() {
        let start = text_strokes("1", 100.0, 50.0, 10.0, TextAnchor::Start);
        let end = text_strokes("1", 100.0, 50.0, 10.0, TextAnchor::End);
        assert_eq!(start.len(), 2);
        // "1" advances half an em
        assert!((start[0][0].0 - end[0][0].0 - 5.0).abs() < 1e-4);
        assert!(start.iter().flatten().all(|(_, y)| *y <= 50.0));
    }

    #[test]
    fn test_digits_advance_in_sequence() {
        let strokes = text_strokes("11", 0.0, 0.0, 10.0, TextAnchor::Start);
        assert_eq!(strokes.len(), 4);
        assert!((strokes[2][0].0 - strokes[0][0].0 - 5.0).abs() < 1e-4);
    }
}
