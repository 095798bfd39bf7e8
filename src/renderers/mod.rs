//! Renderers for Sinistra and standard scores
//!
//! Rendering is split in two: the layout engine resolves a score into a
//! positioned [`DisplayList`], and output backends draw that list. Glyph
//! selection lives in [`glyphs`] and never looks at the orientation; only
//! measure placement does.

pub mod beams;
pub mod context;
pub mod display_list;
pub mod glyphs;
pub mod layout_engine;
pub mod options;
pub mod outlines;
pub mod svg;

use thiserror::Error;

use crate::models::AnyScore;

pub use display_list::{DisplayList, DocumentHeader, DrawCommand, RenderStave, TextAnchor};
pub use layout_engine::LayoutEngine;
pub use options::RenderOptions;
pub use svg::to_svg;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid render options: {0}")]
    InvalidOptions(String),
    #[error("svg serialisation failed: {0}")]
    Svg(String),
}

/// Lay out a score in its own orientation, unless the options force one
pub fn render(score: &AnyScore, options: &RenderOptions) -> Result<DisplayList, RenderError> {
    let orientation = options.orientation.unwrap_or_else(|| score.orientation());
    let engine = LayoutEngine::new(options)?;
    Ok(engine.compute_layout(score.score(), orientation))
}

/// Lay out a score and serialise it as SVG
pub fn render_svg(score: &AnyScore, options: &RenderOptions) -> Result<String, RenderError> {
    to_svg(&render(score, options)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Clef, Measure, Orientation, Score, Staff};
    use crate::transform::transform_to_sinistra;

    fn two_measures() -> Score {
        Score::new(vec![Staff::new(
            Clef::Treble,
            vec![Measure::new(1), Measure::new(2)],
        )])
    }

    #[test]
    fn test_orientation_follows_transform_marker() {
        let standard: AnyScore = two_measures().into();
        let mirrored: AnyScore = transform_to_sinistra(&two_measures()).into();
        let options = RenderOptions::default();
        assert_eq!(render(&standard, &options).unwrap().orientation, Orientation::Dextra);
        assert_eq!(render(&mirrored, &options).unwrap().orientation, Orientation::Sinistra);
    }

    #[test]
    fn test_orientation_override() {
        let standard: AnyScore = two_measures().into();
        let options = RenderOptions {
            orientation: Some(Orientation::Sinistra),
            ..RenderOptions::default()
        };
        let list = render(&standard, &options).unwrap();
        assert_eq!(list.orientation, Orientation::Sinistra);
        assert!(list.staves[0].x > list.staves[1].x);
    }

    #[test]
    fn test_invalid_options_fail_the_call() {
        let options = RenderOptions {
            stave_width: -1.0,
            ..RenderOptions::default()
        };
        let err = render_svg(&two_measures().into(), &options).unwrap_err();
        assert!(matches!(err, RenderError::InvalidOptions(_)));
    }
}
