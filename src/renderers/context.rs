//! Running clef/meter/key context
//!
//! Measures only carry context fields where something changes, so a reader
//! has to remember the last value it saw. [`ContextTracker`] does that scan
//! in musical order, which for a mirrored staff means walking the stored
//! sequence backwards.

use crate::models::{Clef, KeySignature, Measure, Orientation, Score, Staff, TimeSignature};

/// Context in effect for one measure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeasureContext {
    pub clef: Clef,
    pub time_signature: TimeSignature,
    pub key_signature: KeySignature,
}

impl MeasureContext {
    /// Staff-level defaults: the staff's clef with the score's meter and key
    pub fn staff_default(score: &Score, staff: &Staff) -> Self {
        Self {
            clef: staff.clef,
            time_signature: score.time_signature,
            key_signature: score.key_signature,
        }
    }

    fn apply(&self, measure: &Measure) -> Self {
        Self {
            clef: measure.clef.unwrap_or(self.clef),
            time_signature: measure.time_signature.unwrap_or(self.time_signature),
            key_signature: measure.key_signature.unwrap_or(self.key_signature),
        }
    }
}

/// Which fields changed relative to the previous measure in musical order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContextChange {
    pub clef: bool,
    pub time_signature: bool,
    pub key_signature: bool,
}

impl ContextChange {
    pub fn any(&self) -> bool {
        self.clef || self.time_signature || self.key_signature
    }
}

/// Per-measure context of one staff, indexed by stored sequence position
#[derive(Debug, Clone)]
pub struct ContextTracker {
    contexts: Vec<MeasureContext>,
    changes: Vec<ContextChange>,
}

impl ContextTracker {
    pub fn new(initial: MeasureContext, measures: &[Measure], orientation: Orientation) -> Self {
        let len = measures.len();
        let mut contexts = vec![initial; len];
        let mut changes = vec![ContextChange::default(); len];

        let order: Box<dyn Iterator<Item = usize>> = match orientation {
            Orientation::Dextra => Box::new(0..len),
            Orientation::Sinistra => Box::new((0..len).rev()),
        };

        let mut current = initial;
        for index in order {
            let next = current.apply(&measures[index]);
            changes[index] = ContextChange {
                clef: next.clef != current.clef,
                time_signature: next.time_signature != current.time_signature,
                key_signature: next.key_signature != current.key_signature,
            };
            contexts[index] = next;
            current = next;
        }

        Self { contexts, changes }
    }

    pub fn for_staff(score: &Score, staff: &Staff, orientation: Orientation) -> Self {
        Self::new(
            MeasureContext::staff_default(score, staff),
            &staff.measures,
            orientation,
        )
    }

    pub fn context(&self, index: usize) -> Option<&MeasureContext> {
        self.contexts.get(index)
    }

    pub fn change(&self, index: usize) -> ContextChange {
        self.changes.get(index).copied().unwrap_or_default()
    }
}
