//! Western pitch representation
//!
//! A pitch is a diatonic step, an octave (scientific pitch notation, C4 =
//! middle C) and an optional written accidental.

use serde::{Deserialize, Serialize};

/// Diatonic step letter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Step {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Step {
    pub const ALL: [Step; 7] = [Step::C, Step::D, Step::E, Step::F, Step::G, Step::A, Step::B];

    /// Parse a step letter (case-insensitive)
    pub fn from_letter(letter: &str) -> Option<Self> {
        match letter.trim().to_ascii_uppercase().as_str() {
            "C" => Some(Step::C),
            "D" => Some(Step::D),
            "E" => Some(Step::E),
            "F" => Some(Step::F),
            "G" => Some(Step::G),
            "A" => Some(Step::A),
            "B" => Some(Step::B),
            _ => None,
        }
    }

    pub fn letter(self) -> &'static str {
        match self {
            Step::C => "C",
            Step::D => "D",
            Step::E => "E",
            Step::F => "F",
            Step::G => "G",
            Step::A => "A",
            Step::B => "B",
        }
    }

    /// Semitones above C within the octave
    pub fn semitone(self) -> i32 {
        match self {
            Step::C => 0,
            Step::D => 2,
            Step::E => 4,
            Step::F => 5,
            Step::G => 7,
            Step::A => 9,
            Step::B => 11,
        }
    }

    /// Position within the octave counted in diatonic steps (C = 0, B = 6)
    pub fn diatonic_index(self) -> i32 {
        match self {
            Step::C => 0,
            Step::D => 1,
            Step::E => 2,
            Step::F => 3,
            Step::G => 4,
            Step::A => 5,
            Step::B => 6,
        }
    }
}

/// Written accidental
///
/// The absence of an accidental is modelled as `Option::None` on [`Pitch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Accidental {
    Sharp,
    Flat,
    Natural,
    DoubleSharp,
    DoubleFlat,
}

impl Accidental {
    /// Parse a MusicXML-style accidental name (`sharp`, `double-flat`, ...)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "sharp" => Some(Accidental::Sharp),
            "flat" => Some(Accidental::Flat),
            "natural" => Some(Accidental::Natural),
            "double-sharp" | "sharp-sharp" => Some(Accidental::DoubleSharp),
            "double-flat" | "flat-flat" => Some(Accidental::DoubleFlat),
            _ => None,
        }
    }

    /// Map a semitone alteration to an accidental (0 and out-of-range map to none)
    pub fn from_alter(alter: i32) -> Option<Self> {
        match alter {
            1 => Some(Accidental::Sharp),
            -1 => Some(Accidental::Flat),
            2 => Some(Accidental::DoubleSharp),
            -2 => Some(Accidental::DoubleFlat),
            _ => None,
        }
    }

    /// Semitone alteration applied by this accidental
    pub fn alter(self) -> i32 {
        match self {
            Accidental::Sharp => 1,
            Accidental::Flat => -1,
            Accidental::Natural => 0,
            Accidental::DoubleSharp => 2,
            Accidental::DoubleFlat => -2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Accidental::Sharp => "sharp",
            Accidental::Flat => "flat",
            Accidental::Natural => "natural",
            Accidental::DoubleSharp => "double-sharp",
            Accidental::DoubleFlat => "double-flat",
        }
    }
}

/// A single sounding pitch: step, octave and optional accidental
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pitch {
    pub step: Step,
    pub octave: i8,
    pub accidental: Option<Accidental>,
}

/// Sharps-only spelling of the twelve chromatic pitch classes
const CHROMATIC_SPELLING: [(Step, Option<Accidental>); 12] = [
    (Step::C, None),
    (Step::C, Some(Accidental::Sharp)),
    (Step::D, None),
    (Step::D, Some(Accidental::Sharp)),
    (Step::E, None),
    (Step::F, None),
    (Step::F, Some(Accidental::Sharp)),
    (Step::G, None),
    (Step::G, Some(Accidental::Sharp)),
    (Step::A, None),
    (Step::A, Some(Accidental::Sharp)),
    (Step::B, None),
];

impl Pitch {
    pub fn new(step: Step, octave: i8, accidental: Option<Accidental>) -> Self {
        Self {
            step,
            octave,
            accidental,
        }
    }

    /// Natural pitch without an accidental
    pub fn natural(step: Step, octave: i8) -> Self {
        Self::new(step, octave, None)
    }

    /// MIDI note number (C4 = 60), clamped to 0-127
    pub fn to_midi(&self) -> u8 {
        let alter = self.accidental.map(Accidental::alter).unwrap_or(0);
        let semi = self.step.semitone() + alter + (self.octave as i32 + 1) * 12;
        semi.clamp(0, 127) as u8
    }

    /// Spell a MIDI note number using sharps only
    pub fn from_midi(note: u8) -> Self {
        let octave = (note / 12) as i8 - 1;
        let (step, accidental) = CHROMATIC_SPELLING[(note % 12) as usize];
        Self {
            step,
            octave,
            accidental,
        }
    }

    /// Diatonic distance from C0, used for vertical staff placement
    pub fn diatonic_number(&self) -> i32 {
        self.octave as i32 * 7 + self.step.diatonic_index()
    }
}

impl std::fmt::Display for Pitch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let acc = match self.accidental {
            Some(Accidental::Sharp) => "#",
            Some(Accidental::Flat) => "b",
            Some(Accidental::Natural) => "n",
            Some(Accidental::DoubleSharp) => "##",
            Some(Accidental::DoubleFlat) => "bb",
            None => "",
        };
        write!(f, "{}{}{}", self.step.letter(), acc, self.octave)
    }
}
