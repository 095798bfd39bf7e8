//! Score construction by hand

pub mod manual;

pub use manual::{
    add_note, add_rest, clear_state, create_empty_state, next_measure, remove_last_note,
    set_clef, set_key_signature, set_time_signature, state_to_score, ManualEntryState,
};
