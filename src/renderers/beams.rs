//! Beam grouping
//!
//! Explicit begin/continue/end markers are honoured when a measure has any.
//! A mirrored measure reads its markers end-first, so `Begin` and `End` are
//! both treated as group boundaries. Measures without markers get automatic
//! groups: runs of two or more consecutive beamable notes.
//!
//! A run that cannot be grouped is reported on its own and the caller draws
//! it unbeamed; other groups in the measure are unaffected.

use thiserror::Error;

use crate::models::{Beam, MeasureElement};

/// Inclusive range of element indices joined by one beam
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeamGroup {
    pub first: usize,
    pub last: usize,
}

impl BeamGroup {
    pub fn len(&self) -> usize {
        self.last - self.first + 1
    }

    pub fn contains(&self, index: usize) -> bool {
        (self.first..=self.last).contains(&index)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BeamError {
    #[error("beam opened at element {0} is never closed")]
    Unterminated(usize),
    #[error("beam continuation at element {0} outside a group")]
    StrayContinue(usize),
    #[error("unmarked element {index} interrupts the beam opened at {first}")]
    Interrupted { first: usize, index: usize },
    #[error("elements {first}..={last} include a rest or an unbeamable value")]
    Unbeamable { first: usize, last: usize },
    #[error("beam at element {0} joins a single note")]
    Single(usize),
}

fn beamable(element: &MeasureElement) -> bool {
    !element.is_rest() && element.duration().is_beamable()
}

/// Beam groups for a measure's elements
pub fn beam_groups(elements: &[MeasureElement]) -> Vec<Result<BeamGroup, BeamError>> {
    if elements.iter().any(|e| e.beam().is_some()) {
        groups_from_markers(elements)
    } else {
        automatic_groups(elements).into_iter().map(Ok).collect()
    }
}

fn groups_from_markers(elements: &[MeasureElement]) -> Vec<Result<BeamGroup, BeamError>> {
    let mut results = Vec::new();
    let mut open: Option<usize> = None;

    for (index, element) in elements.iter().enumerate() {
        match (element.beam(), open) {
            (Some(Beam::Begin) | Some(Beam::End), None) => open = Some(index),
            (Some(Beam::Begin) | Some(Beam::End), Some(first)) => {
                results.push(check_group(elements, first, index));
                open = None;
            }
            (Some(Beam::Continue), Some(_)) => {}
            (Some(Beam::Continue), None) => results.push(Err(BeamError::StrayContinue(index))),
            (None, Some(first)) => {
                results.push(Err(BeamError::Interrupted { first, index }));
                open = None;
            }
            (None, None) => {}
        }
    }

    if let Some(first) = open {
        results.push(Err(BeamError::Unterminated(first)));
    }
    results
}

fn check_group(elements: &[MeasureElement], first: usize, last: usize) -> Result<BeamGroup, BeamError> {
    if first == last {
        return Err(BeamError::Single(first));
    }
    if !elements[first..=last].iter().all(beamable) {
        return Err(BeamError::Unbeamable { first, last });
    }
    Ok(BeamGroup { first, last })
}

fn automatic_groups(elements: &[MeasureElement]) -> Vec<BeamGroup> {
    let mut groups = Vec::new();
    let mut run_start: Option<usize> = None;

    for (index, element) in elements.iter().enumerate() {
        match (beamable(element), run_start) {
            (true, None) => run_start = Some(index),
            (true, Some(_)) => {}
            (false, Some(first)) => {
                if index - first >= 2 {
                    groups.push(BeamGroup { first, last: index - 1 });
                }
                run_start = None;
            }
            (false, None) => {}
        }
    }
    if let Some(first) = run_start {
        if elements.len() - first >= 2 {
            groups.push(BeamGroup {
                first,
                last: elements.len() - 1,
            });
        }
    }
    groups
}
