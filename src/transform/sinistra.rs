//! Right-to-left (Sinistra) mirroring
//!
//! Measures are reversed within each staff and events are reversed within
//! each measure. Chords keep their internal note order since their notes
//! sound together. Nothing about a note (pitch, duration, ties, beams) is
//! touched, and measure numbers are kept so a displayed measure can always
//! be traced back to its source bar.

use crate::models::{AnyScore, Measure, Orientation, Score, SinistraScore, Staff};

fn mirror_measure(measure: &Measure) -> Measure {
    Measure {
        elements: measure.elements.iter().rev().cloned().collect(),
        ..measure.clone_context()
    }
}

fn mirror_staff(staff: &Staff) -> Staff {
    Staff {
        clef: staff.clef,
        measures: staff.measures.iter().rev().map(mirror_measure).collect(),
    }
}

fn mirror_score(score: &Score) -> Score {
    Score {
        staves: score.staves.iter().map(mirror_staff).collect(),
        ..score.clone_header()
    }
}

/// Derive the right-to-left counterpart of a score
///
/// The source score is left untouched.
pub fn transform_to_sinistra(score: &Score) -> SinistraScore {
    let mirrored = mirror_score(score);
    log::debug!(
        "Sinistra transform: {} staves, {} measures",
        mirrored.staves.len(),
        mirrored.measure_count()
    );
    SinistraScore::from_mirrored(mirrored)
}

impl SinistraScore {
    /// Undo the mirroring, recovering the left-to-right score
    pub fn to_dextra(&self) -> Score {
        mirror_score(&self.score)
    }
}

/// True when the score carries the transform marker
pub fn is_sinistra_score(score: &AnyScore) -> bool {
    matches!(score, AnyScore::Sinistra(s) if s.is_transformed)
}

/// Measures of one staff grouped into systems (visual lines)
#[derive(Debug, Clone, PartialEq)]
pub struct SystemLayout<'a> {
    pub systems: Vec<&'a [Measure]>,
}

/// Chunk a staff's measures into systems of `measures_per_system`
///
/// Works on the sequence as stored, so a mirrored staff is chunked from its
/// (already reversed) first measure. A chunk size of 0 is treated as 1.
pub fn calculate_system_layout(staff: &Staff, measures_per_system: usize) -> SystemLayout<'_> {
    SystemLayout {
        systems: staff.measures.chunks(measures_per_system.max(1)).collect(),
    }
}

/// Measure at a sequence position
///
/// Both orientations index the stored sequence directly: a mirrored staff is
/// already in right-to-left order.
pub fn get_measure_at_position(
    staff: &Staff,
    position: usize,
    _orientation: Orientation,
) -> Option<&Measure> {
    staff.measures.get(position)
}

impl Measure {
    /// Copy of the measure without its elements
    fn clone_context(&self) -> Measure {
        Measure {
            number: self.number,
            elements: Vec::new(),
            time_signature: self.time_signature,
            key_signature: self.key_signature,
            clef: self.clef,
        }
    }
}

impl Score {
    /// Copy of the score metadata without its staves
    fn clone_header(&self) -> Score {
        Score {
            title: self.title.clone(),
            composer: self.composer.clone(),
            time_signature: self.time_signature,
            key_signature: self.key_signature,
            tempo: self.tempo,
            staves: Vec::new(),
        }
    }
}
