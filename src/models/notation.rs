//! Notes, chords, measures and staves
//!
//! These are plain value types. Every consumer treats them as immutable:
//! operations that "change" a measure build a new one.

use num_rational::Rational32;
use serde::{Deserialize, Serialize};

use super::pitch::{Accidental, Pitch};

/// Written rhythmic value of a note, rest or chord
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoteDuration {
    #[serde(rename = "whole")]
    Whole,
    #[serde(rename = "half")]
    Half,
    #[serde(rename = "quarter")]
    Quarter,
    #[serde(rename = "eighth")]
    Eighth,
    #[serde(rename = "16th")]
    Sixteenth,
    #[serde(rename = "32nd")]
    ThirtySecond,
}

impl NoteDuration {
    /// Parse a MusicXML `<type>` token
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim() {
            "whole" => Some(NoteDuration::Whole),
            "half" => Some(NoteDuration::Half),
            "quarter" => Some(NoteDuration::Quarter),
            "eighth" => Some(NoteDuration::Eighth),
            "16th" => Some(NoteDuration::Sixteenth),
            "32nd" => Some(NoteDuration::ThirtySecond),
            _ => None,
        }
    }

    pub fn token(self) -> &'static str {
        match self {
            NoteDuration::Whole => "whole",
            NoteDuration::Half => "half",
            NoteDuration::Quarter => "quarter",
            NoteDuration::Eighth => "eighth",
            NoteDuration::Sixteenth => "16th",
            NoteDuration::ThirtySecond => "32nd",
        }
    }

    /// Logarithmic value (whole = 0, half = 1, quarter = 2, ...)
    pub fn log2(self) -> u8 {
        match self {
            NoteDuration::Whole => 0,
            NoteDuration::Half => 1,
            NoteDuration::Quarter => 2,
            NoteDuration::Eighth => 3,
            NoteDuration::Sixteenth => 4,
            NoteDuration::ThirtySecond => 5,
        }
    }

    /// Undotted length as a fraction of a whole note
    pub fn whole_fraction(self) -> Rational32 {
        Rational32::new(1, 1 << self.log2())
    }

    /// Length including augmentation dots: base * (2 - 1/2^dots)
    pub fn dotted_fraction(self, dots: u8) -> Rational32 {
        let dots = dots.min(8) as i32;
        let multiplier = Rational32::new((1 << (dots + 1)) - 1, 1 << dots);
        self.whole_fraction() * multiplier
    }

    /// Number of flags (or beams) drawn for this value
    pub fn flag_count(self) -> u8 {
        self.log2().saturating_sub(2)
    }

    /// Values short enough to be joined by a beam
    pub fn is_beamable(self) -> bool {
        self.flag_count() > 0
    }
}

/// Position of a note within a beam group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Beam {
    Begin,
    Continue,
    End,
}

impl Beam {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim() {
            "begin" => Some(Beam::Begin),
            "continue" => Some(Beam::Continue),
            "end" => Some(Beam::End),
            _ => None,
        }
    }
}

/// A single note or rest
///
/// `is_rest` must agree with `pitch.is_none()`; use [`Note::pitched`] and
/// [`Note::rest`] to get that for free, or [`Note::validate`] to check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub pitch: Option<Pitch>,
    pub duration: NoteDuration,
    #[serde(default)]
    pub dots: u8,
    pub is_rest: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tied: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slurred: Option<bool>,
    #[serde(default = "default_voice")]
    pub voice: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beam: Option<Beam>,
}

fn default_voice() -> u32 {
    1
}

impl Note {
    /// Pitched note in voice 1 with no dots
    pub fn pitched(pitch: Pitch, duration: NoteDuration) -> Self {
        Self {
            pitch: Some(pitch),
            duration,
            dots: 0,
            is_rest: false,
            tied: None,
            slurred: None,
            voice: 1,
            beam: None,
        }
    }

    /// Rest in voice 1 with no dots
    pub fn rest(duration: NoteDuration) -> Self {
        Self {
            pitch: None,
            duration,
            dots: 0,
            is_rest: true,
            tied: None,
            slurred: None,
            voice: 1,
            beam: None,
        }
    }

    pub fn with_dots(mut self, dots: u8) -> Self {
        self.dots = dots;
        self
    }

    pub fn with_beam(mut self, beam: Option<Beam>) -> Self {
        self.beam = beam;
        self
    }

    pub fn accidental(&self) -> Option<Accidental> {
        self.pitch.and_then(|p| p.accidental)
    }

    /// Sounding length as a fraction of a whole note
    pub fn total_fraction(&self) -> Rational32 {
        self.duration.dotted_fraction(self.dots)
    }
}

/// Simultaneous notes sharing one rhythmic value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chord {
    pub notes: Vec<Note>,
    pub duration: NoteDuration,
    #[serde(default)]
    pub dots: u8,
}

/// One rhythmic event inside a measure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MeasureElement {
    Note(Note),
    Chord(Chord),
}

impl MeasureElement {
    pub fn duration(&self) -> NoteDuration {
        match self {
            MeasureElement::Note(note) => note.duration,
            MeasureElement::Chord(chord) => chord.duration,
        }
    }

    pub fn dots(&self) -> u8 {
        match self {
            MeasureElement::Note(note) => note.dots,
            MeasureElement::Chord(chord) => chord.dots,
        }
    }

    /// Member notes in stored order (a lone note yields itself)
    pub fn notes(&self) -> &[Note] {
        match self {
            MeasureElement::Note(note) => std::slice::from_ref(note),
            MeasureElement::Chord(chord) => &chord.notes,
        }
    }

    pub fn is_rest(&self) -> bool {
        matches!(self, MeasureElement::Note(note) if note.is_rest)
    }

    pub fn beam(&self) -> Option<Beam> {
        match self {
            MeasureElement::Note(note) => note.beam,
            MeasureElement::Chord(chord) => chord.notes.first().and_then(|n| n.beam),
        }
    }

    pub fn total_fraction(&self) -> Rational32 {
        self.duration().dotted_fraction(self.dots())
    }
}

impl From<Note> for MeasureElement {
    fn from(note: Note) -> Self {
        MeasureElement::Note(note)
    }
}

impl From<Chord> for MeasureElement {
    fn from(chord: Chord) -> Self {
        MeasureElement::Chord(chord)
    }
}

/// Clef fixing the pitch-to-line mapping of a staff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Clef {
    #[default]
    Treble,
    Bass,
    Alto,
    Tenor,
}

impl Clef {
    /// Map a MusicXML sign/line pair; anything unrecognised is `None`
    pub fn from_sign_line(sign: &str, line: &str) -> Option<Self> {
        match (sign.trim().to_ascii_uppercase().as_str(), line.trim()) {
            ("G", "2") => Some(Clef::Treble),
            ("F", "4") => Some(Clef::Bass),
            ("C", "3") => Some(Clef::Alto),
            ("C", "4") => Some(Clef::Tenor),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Clef::Treble => "treble",
            Clef::Bass => "bass",
            Clef::Alto => "alto",
            Clef::Tenor => "tenor",
        }
    }
}

/// Meter: `beats` per measure of `beat_type` notes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSignature {
    pub beats: u32,
    pub beat_type: u32,
}

impl TimeSignature {
    pub fn new(beats: u32, beat_type: u32) -> Self {
        Self { beats, beat_type }
    }

    /// Measure capacity as a fraction of a whole note
    pub fn capacity(&self) -> Rational32 {
        Rational32::new(self.beats as i32, self.beat_type.max(1) as i32)
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self::new(4, 4)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Major,
    Minor,
}

/// Key signature counted on the circle of fifths (negative = flats)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct KeySignature {
    pub fifths: i8,
    pub mode: Mode,
}

impl KeySignature {
    pub fn new(fifths: i8, mode: Mode) -> Self {
        Self { fifths, mode }
    }
}

/// A bar of music
///
/// The optional context fields are change markers: present only where the
/// clef, meter or key changes. Readers scanning measures must carry the last
/// seen value forward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measure {
    pub number: u32,
    pub elements: Vec<MeasureElement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_signature: Option<TimeSignature>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_signature: Option<KeySignature>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clef: Option<Clef>,
}

impl Measure {
    /// Empty measure with no context markers
    pub fn new(number: u32) -> Self {
        Self {
            number,
            elements: Vec::new(),
            time_signature: None,
            key_signature: None,
            clef: None,
        }
    }

    pub fn with_elements(number: u32, elements: Vec<MeasureElement>) -> Self {
        Self {
            elements,
            ..Self::new(number)
        }
    }

    pub fn has_context_change(&self) -> bool {
        self.time_signature.is_some() || self.key_signature.is_some() || self.clef.is_some()
    }

    /// Written content length as a fraction of a whole note
    pub fn total_duration(&self) -> Rational32 {
        self.elements
            .iter()
            .fold(Rational32::new(0, 1), |acc, el| acc + el.total_fraction())
    }
}

/// One continuous line of notation for a single instrument or voice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Staff {
    pub clef: Clef,
    pub measures: Vec<Measure>,
}

impl Staff {
    pub fn new(clef: Clef, measures: Vec<Measure>) -> Self {
        Self { clef, measures }
    }

    /// Total number of rhythmic events across all measures
    pub fn element_count(&self) -> usize {
        self.measures.iter().map(|m| m.elements.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::pitch::Step;

    #[test]
    fn test_dotted_fraction() {
        assert_eq!(NoteDuration::Quarter.dotted_fraction(0), Rational32::new(1, 4));
        assert_eq!(NoteDuration::Quarter.dotted_fraction(1), Rational32::new(3, 8));
        assert_eq!(NoteDuration::Half.dotted_fraction(2), Rational32::new(7, 8));
    }

    #[test]
    fn test_flag_count() {
        assert_eq!(NoteDuration::Quarter.flag_count(), 0);
        assert_eq!(NoteDuration::Eighth.flag_count(), 1);
        assert_eq!(NoteDuration::ThirtySecond.flag_count(), 3);
        assert!(!NoteDuration::Half.is_beamable());
        assert!(NoteDuration::Sixteenth.is_beamable());
    }

    #[test]
    fn test_note_constructors_agree_with_rest_flag() {
        let note = Note::pitched(Pitch::natural(Step::C, 4), NoteDuration::Quarter);
        assert!(!note.is_rest);
        assert!(note.pitch.is_some());

        let rest = Note::rest(NoteDuration::Half);
        assert!(rest.is_rest);
        assert!(rest.pitch.is_none());
        assert_eq!(rest.voice, 1);
    }

    #[test]
    fn test_measure_total_duration() {
        let measure = Measure::with_elements(
            1,
            vec![
                Note::pitched(Pitch::natural(Step::C, 4), NoteDuration::Half).into(),
                Note::rest(NoteDuration::Quarter).with_dots(1).into(),
                Note::pitched(Pitch::natural(Step::D, 4), NoteDuration::Eighth).into(),
            ],
        );
        assert_eq!(measure.total_duration(), Rational32::new(1, 1));
    }

    #[test]
    fn test_clef_from_sign_line() {
        assert_eq!(Clef::from_sign_line("G", "2"), Some(Clef::Treble));
        assert_eq!(Clef::from_sign_line("f", "4"), Some(Clef::Bass));
        assert_eq!(Clef::from_sign_line("C", "4"), Some(Clef::Tenor));
        assert_eq!(Clef::from_sign_line("percussion", "3"), None);
    }

    #[test]
    fn test_element_serde_uses_kind_tag() {
        let element: MeasureElement = Note::rest(NoteDuration::Sixteenth).into();
        let json = serde_json::to_value(&element).unwrap();
        assert_eq!(json["kind"], "note");
        assert_eq!(json["duration"], "16th");
        assert_eq!(json["isRest"], true);

        let back: MeasureElement = serde_json::from_value(json).unwrap();
        assert_eq!(back, element);
    }
}
