//! Manual note entry
//!
//! An incremental, measure-by-measure score builder. Every transition takes
//! the current state by reference and returns a new state, so a host UI only
//! has to hold the latest value (and can keep older ones for its own history).
//!
//! None of the transitions fail. Cursor arithmetic self-heals: advancing past
//! stored measures appends storage, and undo on an empty first measure is a
//! no-op.

use serde::{Deserialize, Serialize};

use crate::models::{
    Accidental, Clef, KeySignature, Measure, MeasureElement, Mode, Note, NoteDuration, Pitch,
    Score, Staff, Step, TimeSignature,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualEntryState {
    /// 1-based index of the measure being appended to
    pub current_measure: usize,
    /// 1-based beat cursor; advisory only, never checked against the meter
    pub current_beat: u32,
    pub clef: Clef,
    pub time_signature: TimeSignature,
    pub key_signature: KeySignature,
    pub measures: Vec<Measure>,
}

impl Default for ManualEntryState {
    fn default() -> Self {
        create_empty_state()
    }
}

pub fn create_empty_state() -> ManualEntryState {
    ManualEntryState {
        current_measure: 1,
        current_beat: 1,
        clef: Clef::Treble,
        time_signature: TimeSignature::new(4, 4),
        key_signature: KeySignature::new(0, Mode::Major),
        measures: vec![Measure::new(1)],
    }
}

pub fn clear_state() -> ManualEntryState {
    create_empty_state()
}

/// Append an element to the current measure, creating it if the cursor is
/// past the stored measures
fn append_element(state: &ManualEntryState, element: MeasureElement) -> ManualEntryState {
    let mut measures = state.measures.clone();
    let idx = state.current_measure.saturating_sub(1);

    match measures.get_mut(idx) {
        Some(measure) => measure.elements.push(element),
        None => measures.push(Measure::with_elements(
            state.current_measure as u32,
            vec![element],
        )),
    }

    ManualEntryState {
        measures,
        ..state.clone()
    }
}

pub fn add_note(
    state: &ManualEntryState,
    step: Step,
    octave: i8,
    duration: NoteDuration,
    accidental: Option<Accidental>,
) -> ManualEntryState {
    let note = Note::pitched(Pitch::new(step, octave, accidental), duration);
    append_element(state, note.into())
}

pub fn add_rest(state: &ManualEntryState, duration: NoteDuration) -> ManualEntryState {
    append_element(state, Note::rest(duration).into())
}

pub fn next_measure(state: &ManualEntryState) -> ManualEntryState {
    let next = state.current_measure + 1;
    let mut measures = state.measures.clone();
    if next > measures.len() {
        measures.push(Measure::new(next as u32));
    }

    ManualEntryState {
        current_measure: next,
        current_beat: 1,
        measures,
        ..state.clone()
    }
}

pub fn set_clef(state: &ManualEntryState, clef: Clef) -> ManualEntryState {
    ManualEntryState {
        clef,
        ..state.clone()
    }
}

pub fn set_time_signature(state: &ManualEntryState, beats: u32, beat_type: u32) -> ManualEntryState {
    ManualEntryState {
        time_signature: TimeSignature::new(beats, beat_type),
        ..state.clone()
    }
}

pub fn set_key_signature(state: &ManualEntryState, fifths: i8, mode: Mode) -> ManualEntryState {
    ManualEntryState {
        key_signature: KeySignature::new(fifths, mode),
        ..state.clone()
    }
}

/// Undo the last entry
///
/// Drops the last element of the current measure. An empty current measure
/// other than the first is removed and the cursor steps back; an empty first
/// measure leaves the state unchanged.
pub fn remove_last_note(state: &ManualEntryState) -> ManualEntryState {
    let idx = state.current_measure.saturating_sub(1);
    let Some(measure) = state.measures.get(idx) else {
        return state.clone();
    };

    if !measure.elements.is_empty() {
        let mut measures = state.measures.clone();
        measures[idx].elements.pop();
        return ManualEntryState {
            measures,
            ..state.clone()
        };
    }

    if idx > 0 {
        let mut measures = state.measures.clone();
        measures.pop();
        return ManualEntryState {
            current_measure: state.current_measure - 1,
            measures,
            ..state.clone()
        };
    }

    state.clone()
}

/// Materialise the entry state as a single-staff score
///
/// Only the first measure announces clef, meter and key. Later setter calls
/// change what the first measure announces; they cannot place a change on a
/// later measure.
pub fn state_to_score(state: &ManualEntryState, title: Option<&str>) -> Score {
    let measures = state
        .measures
        .iter()
        .enumerate()
        .map(|(idx, m)| {
            let first = idx == 0;
            Measure {
                number: m.number,
                elements: m.elements.clone(),
                time_signature: first.then_some(state.time_signature),
                key_signature: first.then_some(state.key_signature),
                clef: first.then_some(state.clef),
            }
        })
        .collect();

    Score {
        title: title.map(str::to_string),
        composer: None,
        time_signature: state.time_signature,
        key_signature: state.key_signature,
        tempo: None,
        staves: vec![Staff::new(state.clef, measures)],
    }
}
