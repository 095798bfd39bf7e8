//! Notation data model
//!
//! The canonical in-memory score representation shared by the importers,
//! the Sinistra transform, manual entry and the renderers.

pub mod notation;
pub mod pitch;
pub mod score;
pub mod validation;

// Re-export commonly used types
pub use notation::*;
pub use pitch::{Accidental, Pitch, Step};
pub use score::{AnyScore, Direction, Orientation, SinistraScore, Score};
pub use validation::ModelError;
