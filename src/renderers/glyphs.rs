//! Orientation-independent glyph selection
//!
//! Staff positions are counted in half line spaces ("steps") upward from the
//! bottom staff line: 0 = bottom line, 8 = top line, 4 = middle line.

use crate::models::{Accidental, Clef, KeySignature, NoteDuration, Pitch};

/// Step of the middle staff line
pub const MIDDLE_LINE: i32 = 4;
/// Step of the top staff line
pub const TOP_LINE: i32 = 8;

/// Diatonic number of the pitch sitting on the bottom line of each clef
fn bottom_line(clef: Clef) -> i32 {
    match clef {
        // E4, G2, F3, D3
        Clef::Treble => 4 * 7 + 2,
        Clef::Bass => 2 * 7 + 4,
        Clef::Alto => 3 * 7 + 3,
        Clef::Tenor => 3 * 7 + 1,
    }
}

/// Vertical staff step of a pitch under a clef
pub fn staff_step(pitch: &Pitch, clef: Clef) -> i32 {
    pitch.diatonic_number() - bottom_line(clef)
}

/// Steps needing ledger lines (even steps outside the staff)
pub fn ledger_steps(step: i32) -> Vec<i32> {
    if step <= -2 {
        (step..=-2).filter(|s| s % 2 == 0).collect()
    } else if step >= TOP_LINE + 2 {
        (TOP_LINE + 2..=step).filter(|s| s % 2 == 0).collect()
    } else {
        Vec::new()
    }
}

/// How a duration is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteGlyph {
    pub filled: bool,
    pub has_stem: bool,
    pub flags: u8,
}

pub fn note_glyph(duration: NoteDuration) -> NoteGlyph {
    NoteGlyph {
        filled: duration.log2() >= 2,
        has_stem: duration != NoteDuration::Whole,
        flags: duration.flag_count(),
    }
}

/// Stems point down for notes on or above the middle line
pub fn stem_up(average_step: f32) -> bool {
    average_step < MIDDLE_LINE as f32
}

pub fn accidental_symbol(accidental: Accidental) -> &'static str {
    match accidental {
        Accidental::Sharp => "\u{266F}",
        Accidental::Flat => "\u{266D}",
        Accidental::Natural => "\u{266E}",
        Accidental::DoubleSharp => "\u{1D12A}",
        Accidental::DoubleFlat => "\u{1D12B}",
    }
}

pub fn clef_symbol(clef: Clef) -> &'static str {
    match clef {
        Clef::Treble => "\u{1D11E}",
        Clef::Bass => "\u{1D122}",
        Clef::Alto | Clef::Tenor => "\u{1D121}",
    }
}

/// Staff step the clef glyph is anchored on
pub fn clef_anchor_step(clef: Clef) -> i32 {
    match clef {
        Clef::Treble => 2,
        Clef::Bass => 6,
        Clef::Alto => 4,
        Clef::Tenor => 6,
    }
}

const KEY_NAMES: [&str; 15] = [
    "Cb", "Gb", "Db", "Ab", "Eb", "Bb", "F", "C", "G", "D", "A", "E", "B", "F#", "C#",
];

/// Major-key name for a key signature; out-of-range values clamp to 7 accidentals
pub fn key_name(key: &KeySignature) -> &'static str {
    KEY_NAMES[(key.fifths.clamp(-7, 7) + 7) as usize]
}

// Treble-clef steps of key signature accidentals, in order of appearance
const SHARP_STEPS: [i32; 7] = [8, 5, 9, 6, 3, 7, 4];
const FLAT_STEPS: [i32; 7] = [4, 7, 3, 6, 2, 5, 1];

/// Accidental and staff step for each symbol of a key signature
pub fn key_signature_steps(key: &KeySignature, clef: Clef) -> Vec<(Accidental, i32)> {
    let count = key.fifths.unsigned_abs().min(7) as usize;
    let (accidental, steps) = if key.fifths >= 0 {
        (Accidental::Sharp, &SHARP_STEPS)
    } else {
        (Accidental::Flat, &FLAT_STEPS)
    };
    let shift = match clef {
        Clef::Treble => 0,
        Clef::Bass => -2,
        Clef::Alto => -1,
        Clef::Tenor => 1,
    };
    steps[..count]
        .iter()
        .map(|s| {
            let mut step = s + shift;
            if step > TOP_LINE + 1 {
                step -= 7;
            } else if step < -1 {
                step += 7;
            }
            (accidental, step)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Mode, Step};

    #[test]
    fn test_staff_steps_per_clef() {
        let e4 = Pitch::natural(Step::E, 4);
        let f5 = Pitch::natural(Step::F, 5);
        let c4 = Pitch::natural(Step::C, 4);
        assert_eq!(staff_step(&e4, Clef::Treble), 0);
        assert_eq!(staff_step(&f5, Clef::Treble), 8);
        assert_eq!(staff_step(&c4, Clef::Treble), -2);
        assert_eq!(staff_step(&Pitch::natural(Step::A, 3), Clef::Bass), 8);
        assert_eq!(staff_step(&c4, Clef::Alto), 4);
        assert_eq!(staff_step(&c4, Clef::Tenor), 6);
    }

    #[test]
    fn test_accidental_does_not_move_notehead() {
        let fs = Pitch::new(Step::F, 4, Some(Accidental::Sharp));
        let f = Pitch::natural(Step::F, 4);
        assert_eq!(staff_step(&fs, Clef::Treble), staff_step(&f, Clef::Treble));
    }

    #[test]
    fn test_ledger_lines() {
        assert_eq!(ledger_steps(-2), vec![-2]);
        assert_eq!(ledger_steps(-5), vec![-4, -2]);
        assert!(ledger_steps(-1).is_empty());
        assert!(ledger_steps(4).is_empty());
        assert_eq!(ledger_steps(11), vec![10]);
    }

    #[test]
    fn test_note_glyphs() {
        let whole = note_glyph(NoteDuration::Whole);
        assert!(!whole.filled && !whole.has_stem);
        let half = note_glyph(NoteDuration::Half);
        assert!(!half.filled && half.has_stem);
        assert_eq!(note_glyph(NoteDuration::Quarter).flags, 0);
        assert_eq!(note_glyph(NoteDuration::Sixteenth).flags, 2);
    }

    #[test]
    fn test_key_names() {
        assert_eq!(key_name(&KeySignature::new(0, Mode::Major)), "C");
        assert_eq!(key_name(&KeySignature::new(-7, Mode::Major)), "Cb");
        assert_eq!(key_name(&KeySignature::new(7, Mode::Major)), "C#");
        assert_eq!(key_name(&KeySignature::new(-2, Mode::Minor)), "Bb");
        assert_eq!(key_name(&KeySignature::new(12, Mode::Major)), "C#");
    }

    #[test]
    fn test_key_signature_steps() {
        let d_major = key_signature_steps(&KeySignature::new(2, Mode::Major), Clef::Treble);
        assert_eq!(d_major, vec![(Accidental::Sharp, 8), (Accidental::Sharp, 5)]);
        let f_bass = key_signature_steps(&KeySignature::new(-1, Mode::Major), Clef::Bass);
        assert_eq!(f_bass, vec![(Accidental::Flat, 2)]);
        assert!(key_signature_steps(&KeySignature::default(), Clef::Alto).is_empty());
    }
}
