//! Manual entry operations for the WASM API
//!
//! The host UI keeps the current state object and passes it back into each
//! call; every call returns the next state and leaves the input untouched.

use wasm_bindgen::prelude::*;

use crate::api::helpers::{
    deserialize, js_error, parse_accidental, parse_clef, parse_duration, parse_mode, parse_step,
    serialize, validate_key_signature, validate_time_signature,
};
use crate::entry::{self, ManualEntryState};

fn load(state_js: JsValue) -> Result<ManualEntryState, JsValue> {
    deserialize(state_js, "Invalid entry state")
}

fn store(state: &ManualEntryState) -> Result<JsValue, JsValue> {
    serialize(state, "Failed to serialize entry state")
}

#[wasm_bindgen(js_name = createEmptyState)]
pub fn create_empty_state() -> Result<JsValue, JsValue> {
    store(&entry::create_empty_state())
}

#[wasm_bindgen(js_name = clearState)]
pub fn clear_state() -> Result<JsValue, JsValue> {
    store(&entry::clear_state())
}

/// Append a note to the current measure
///
/// # Arguments
/// * `step` - Letter name `C`..`B`
/// * `duration` - `whole`, `half`, `quarter`, `eighth`, `16th` or `32nd`
/// * `accidental` - Optional accidental name (`sharp`, `double-flat`, ...)
#[wasm_bindgen(js_name = addNote)]
pub fn add_note(
    state_js: JsValue,
    step: &str,
    octave: i8,
    duration: &str,
    accidental: Option<String>,
) -> Result<JsValue, JsValue> {
    let state = load(state_js)?;
    let step = parse_step(step).map_err(|e| js_error("addNote", e))?;
    let duration = parse_duration(duration).map_err(|e| js_error("addNote", e))?;
    let accidental = parse_accidental(accidental.as_deref()).map_err(|e| js_error("addNote", e))?;
    store(&entry::add_note(&state, step, octave, duration, accidental))
}

#[wasm_bindgen(js_name = addRest)]
pub fn add_rest(state_js: JsValue, duration: &str) -> Result<JsValue, JsValue> {
    let state = load(state_js)?;
    let duration = parse_duration(duration).map_err(|e| js_error("addRest", e))?;
    store(&entry::add_rest(&state, duration))
}

#[wasm_bindgen(js_name = nextMeasure)]
pub fn next_measure(state_js: JsValue) -> Result<JsValue, JsValue> {
    store(&entry::next_measure(&load(state_js)?))
}

#[wasm_bindgen(js_name = removeLastNote)]
pub fn remove_last_note(state_js: JsValue) -> Result<JsValue, JsValue> {
    store(&entry::remove_last_note(&load(state_js)?))
}

#[wasm_bindgen(js_name = setClef)]
pub fn set_clef(state_js: JsValue, clef: &str) -> Result<JsValue, JsValue> {
    let state = load(state_js)?;
    let clef = parse_clef(clef).map_err(|e| js_error("setClef", e))?;
    store(&entry::set_clef(&state, clef))
}

#[wasm_bindgen(js_name = setTimeSignature)]
pub fn set_time_signature(state_js: JsValue, beats: u32, beat_type: u32) -> Result<JsValue, JsValue> {
    let state = load(state_js)?;
    validate_time_signature(beats, beat_type).map_err(|e| js_error("setTimeSignature", e))?;
    store(&entry::set_time_signature(&state, beats, beat_type))
}

#[wasm_bindgen(js_name = setKeySignature)]
pub fn set_key_signature(state_js: JsValue, fifths: i8, mode: &str) -> Result<JsValue, JsValue> {
    let state = load(state_js)?;
    let mode = parse_mode(mode).map_err(|e| js_error("setKeySignature", e))?;
    let key = validate_key_signature(fifths, mode).map_err(|e| js_error("setKeySignature", e))?;
    store(&entry::set_key_signature(&state, key.fifths, key.mode))
}

/// Materialise the entry state as a single-staff score
#[wasm_bindgen(js_name = stateToScore)]
pub fn state_to_score(state_js: JsValue, title: Option<String>) -> Result<JsValue, JsValue> {
    let state = load(state_js)?;
    let score = entry::state_to_score(&state, title.as_deref());
    serialize(&score, "Failed to serialize score")
}
