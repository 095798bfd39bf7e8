//! Construction-time consistency checks for the notation model
//!
//! The model types are plain structs; adapters are expected to build them
//! consistently. These checks give adapters and tests an assertion path.

use thiserror::Error;

use super::notation::{Chord, KeySignature, Measure, MeasureElement, Note, Staff, TimeSignature};
use super::score::Score;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("note rest flag disagrees with pitch (is_rest={is_rest}, has_pitch={has_pitch})")]
    RestMismatch { is_rest: bool, has_pitch: bool },
    #[error("voice must be 1 or greater")]
    InvalidVoice,
    #[error("chord needs at least two notes, got {0}")]
    ChordTooSmall(usize),
    #[error("chord member {index} has {found} but the chord is {expected}")]
    ChordDurationMismatch {
        index: usize,
        expected: String,
        found: String,
    },
    #[error("measure number {found} does not follow {previous}")]
    MeasureOrder { previous: u32, found: u32 },
    #[error("measure numbers are 1-based, got 0")]
    MeasureNumberZero,
    #[error("time signature {beats}/{beat_type} must be positive")]
    InvalidTimeSignature { beats: u32, beat_type: u32 },
    #[error("key signature fifths {0} outside -7..=7")]
    InvalidKeySignature(i8),
}

impl Note {
    pub fn validate(&self) -> Result<(), ModelError> {
        let has_pitch = self.pitch.is_some();
        if self.is_rest == has_pitch {
            return Err(ModelError::RestMismatch {
                is_rest: self.is_rest,
                has_pitch,
            });
        }
        if self.voice == 0 {
            return Err(ModelError::InvalidVoice);
        }
        Ok(())
    }
}

impl Chord {
    /// Build a chord whose duration and dots come from its first note
    pub fn new(notes: Vec<Note>) -> Result<Self, ModelError> {
        let first = notes.first().ok_or(ModelError::ChordTooSmall(0))?;
        let chord = Self {
            duration: first.duration,
            dots: first.dots,
            notes,
        };
        chord.validate()?;
        Ok(chord)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.notes.len() < 2 {
            return Err(ModelError::ChordTooSmall(self.notes.len()));
        }
        for (index, note) in self.notes.iter().enumerate() {
            note.validate()?;
            if note.duration != self.duration || note.dots != self.dots {
                return Err(ModelError::ChordDurationMismatch {
                    index,
                    expected: format!("{}+{} dots", self.duration.token(), self.dots),
                    found: format!("{}+{} dots", note.duration.token(), note.dots),
                });
            }
        }
        Ok(())
    }
}

impl MeasureElement {
    pub fn validate(&self) -> Result<(), ModelError> {
        match self {
            MeasureElement::Note(note) => note.validate(),
            MeasureElement::Chord(chord) => chord.validate(),
        }
    }
}

impl TimeSignature {
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.beats == 0 || self.beat_type == 0 {
            return Err(ModelError::InvalidTimeSignature {
                beats: self.beats,
                beat_type: self.beat_type,
            });
        }
        Ok(())
    }
}

impl KeySignature {
    pub fn validate(&self) -> Result<(), ModelError> {
        if !(-7..=7).contains(&self.fifths) {
            return Err(ModelError::InvalidKeySignature(self.fifths));
        }
        Ok(())
    }
}

impl Measure {
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.number == 0 {
            return Err(ModelError::MeasureNumberZero);
        }
        if let Some(ts) = &self.time_signature {
            ts.validate()?;
        }
        if let Some(ks) = &self.key_signature {
            ks.validate()?;
        }
        self.elements.iter().try_for_each(MeasureElement::validate)
    }
}

impl Staff {
    /// Checks every measure and that numbers are unique and increasing
    ///
    /// Only meaningful for a staff in performance order; a mirrored staff
    /// has decreasing numbers by construction.
    pub fn validate(&self) -> Result<(), ModelError> {
        let mut previous: Option<u32> = None;
        for measure in &self.measures {
            measure.validate()?;
            if let Some(prev) = previous {
                if measure.number <= prev {
                    return Err(ModelError::MeasureOrder {
                        previous: prev,
                        found: measure.number,
                    });
                }
            }
            previous = Some(measure.number);
        }
        Ok(())
    }
}

impl Score {
    pub fn validate(&self) -> Result<(), ModelError> {
        self.time_signature.validate()?;
        self.key_signature.validate()?;
        self.staves.iter().try_for_each(Staff::validate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::notation::NoteDuration;
    use crate::models::pitch::{Pitch, Step};

    fn c4(duration: NoteDuration) -> Note {
        Note::pitched(Pitch::natural(Step::C, 4), duration)
    }

    #[test]
    fn test_rest_mismatch_detected() {
        let mut note = c4(NoteDuration::Quarter);
        note.is_rest = true;
        assert!(matches!(note.validate(), Err(ModelError::RestMismatch { .. })));

        let mut rest = Note::rest(NoteDuration::Quarter);
        rest.is_rest = false;
        assert!(rest.validate().is_err());
    }

    #[test]
    fn test_chord_new_takes_first_note_duration() {
        let chord = Chord::new(vec![c4(NoteDuration::Half), c4(NoteDuration::Half)]).unwrap();
        assert_eq!(chord.duration, NoteDuration::Half);
        assert_eq!(chord.dots, 0);
    }

    #[test]
    fn test_chord_rejects_mismatch_and_singletons() {
        assert_eq!(
            Chord::new(vec![c4(NoteDuration::Half)]),
            Err(ModelError::ChordTooSmall(1))
        );
        assert_eq!(Chord::new(vec![]), Err(ModelError::ChordTooSmall(0)));

        let err = Chord::new(vec![c4(NoteDuration::Half), c4(NoteDuration::Quarter)]).unwrap_err();
        assert!(matches!(err, ModelError::ChordDurationMismatch { index: 1, .. }));
    }

    #[test]
    fn test_staff_measure_order() {
        let staff = Staff::new(Default::default(), vec![Measure::new(1), Measure::new(1)]);
        assert_eq!(
            staff.validate(),
            Err(ModelError::MeasureOrder { previous: 1, found: 1 })
        );
    }

    #[test]
    fn test_score_signature_ranges() {
        let mut score = Score::default();
        assert!(score.validate().is_ok());

        score.key_signature.fifths = 8;
        assert_eq!(score.validate(), Err(ModelError::InvalidKeySignature(8)));

        score.key_signature.fifths = 0;
        score.time_signature.beat_type = 0;
        assert!(matches!(
            score.validate(),
            Err(ModelError::InvalidTimeSignature { .. })
        ));
    }
}
