//! Shared helpers for WASM API operations
//!
//! Serialization across the JS boundary, option parsing, and conversion of
//! string tokens coming from the host UI into model types.

use wasm_bindgen::prelude::*;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::models::{Accidental, Clef, KeySignature, Mode, NoteDuration, Step};

// ============================================================================
// Error Conversion
// ============================================================================

/// Log an error and turn it into a JS exception value
pub fn js_error(context: &str, err: impl std::fmt::Display) -> JsValue {
    let msg = format!("{}: {}", context, err);
    log::error!("{}", msg);
    JsValue::from_str(&msg)
}

// ============================================================================
// Serialization/Deserialization Helpers
// ============================================================================

/// Deserialize a value from JavaScript with automatic error handling
pub fn deserialize<T: DeserializeOwned>(value: JsValue, error_context: &str) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(|e| js_error(error_context, e))
}

/// Serialize a value to JavaScript with automatic error handling
///
/// Maps become plain objects, so flattened structs such as a Sinistra score
/// reach JavaScript with ordinary property access.
pub fn serialize<T: Serialize>(value: &T, error_context: &str) -> Result<JsValue, JsValue> {
    let serializer = serde_wasm_bindgen::Serializer::new().serialize_maps_as_objects(true);
    value.serialize(&serializer).map_err(|e| js_error(error_context, e))
}

/// Parse an optional JSON settings string, falling back to defaults
pub fn parse_settings<T: DeserializeOwned + Default>(settings_json: Option<String>) -> Result<T, String> {
    match settings_json.as_deref().map(str::trim) {
        None | Some("") => Ok(T::default()),
        Some(json) => serde_json::from_str(json).map_err(|e| format!("Invalid settings JSON: {}", e)),
    }
}

// ============================================================================
// Token Parsing
// ============================================================================

pub fn parse_step(token: &str) -> Result<Step, String> {
    Step::from_letter(token).ok_or_else(|| format!("Invalid step '{}' (expected C, D, E, F, G, A or B)", token))
}

pub fn parse_duration(token: &str) -> Result<NoteDuration, String> {
    NoteDuration::from_token(token).ok_or_else(|| {
        format!("Invalid duration '{}' (expected whole, half, quarter, eighth, 16th or 32nd)", token)
    })
}

/// Empty or absent means no accidental
pub fn parse_accidental(token: Option<&str>) -> Result<Option<Accidental>, String> {
    match token.map(str::trim) {
        None | Some("") | Some("none") => Ok(None),
        Some(name) => Accidental::from_name(name)
            .map(Some)
            .ok_or_else(|| format!("Invalid accidental '{}'", name)),
    }
}

pub fn parse_clef(token: &str) -> Result<Clef, String> {
    match token.trim().to_ascii_lowercase().as_str() {
        "treble" => Ok(Clef::Treble),
        "bass" => Ok(Clef::Bass),
        "alto" => Ok(Clef::Alto),
        "tenor" => Ok(Clef::Tenor),
        other => Err(format!("Invalid clef '{}' (expected treble, bass, alto or tenor)", other)),
    }
}

pub fn parse_mode(token: &str) -> Result<Mode, String> {
    match token.trim().to_ascii_lowercase().as_str() {
        "major" => Ok(Mode::Major),
        "minor" => Ok(Mode::Minor),
        other => Err(format!("Invalid mode '{}' (expected major or minor)", other)),
    }
}

// ============================================================================
// Validation Helpers
// ============================================================================

pub fn validate_time_signature(beats: u32, beat_type: u32) -> Result<(), String> {
    crate::models::TimeSignature::new(beats, beat_type)
        .validate()
        .map_err(|e| e.to_string())
}

/// Build the key signature the host asked for, checked before it is stored
pub fn validate_key_signature(fifths: i8, mode: Mode) -> Result<KeySignature, String> {
    let key = KeySignature::new(fifths, mode);
    key.validate().map_err(|e| e.to_string())?;
    Ok(key)
}
