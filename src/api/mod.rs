//! Notatio Sinistra WASM API
//!
//! The JavaScript-facing surface. Every function is a pure call: values go
//! in as JS objects or JSON strings and come back out; nothing is held on the
//! Rust side between calls.
//!
//! # Module Structure
//!
//! - `helpers`: serialization, option parsing, token parsing, error conversion
//! - `score`: import, transform, render and export
//! - `entry`: manual entry state transitions

pub mod entry;
pub mod helpers;
pub mod score;

pub use entry::{
    add_note, add_rest, clear_state, create_empty_state, next_measure, remove_last_note,
    set_clef, set_key_signature, set_time_signature, state_to_score,
};
pub use score::{
    export_score, import_file, is_sinistra_score, parse_midi, parse_musicxml, render_score,
    render_svg, transform_to_sinistra, validate_score, ExportedFile,
};
