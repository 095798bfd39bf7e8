//! Directional transforms between reading orientations

pub mod sinistra;

pub use sinistra::{
    calculate_system_layout, get_measure_at_position, is_sinistra_score, transform_to_sinistra,
    SystemLayout,
};
