//! Score aggregates and their reading orientation

use serde::{Deserialize, Serialize};

use super::notation::{KeySignature, Staff, TimeSignature};

/// Root aggregate owning every staff, measure and note
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composer: Option<String>,
    pub time_signature: TimeSignature,
    pub key_signature: KeySignature,
    /// Beats per minute
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tempo: Option<f64>,
    pub staves: Vec<Staff>,
}

impl Score {
    pub fn new(staves: Vec<Staff>) -> Self {
        Self {
            staves,
            ..Self::default()
        }
    }

    pub fn measure_count(&self) -> usize {
        self.staves.iter().map(|s| s.measures.len()).max().unwrap_or(0)
    }
}

/// Horizontal reading direction of a laid-out score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Standard left-to-right
    #[default]
    Dextra,
    /// Mirrored right-to-left
    Sinistra,
}

/// Reading direction a transformed score was derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Ltr,
}

/// A score mirrored for right-to-left reading
///
/// Always derived from exactly one [`Score`] by
/// [`crate::transform::transform_to_sinistra`]; serialised flat with the
/// `isTransformed` / `originalDirection` markers next to the score fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SinistraScore {
    #[serde(flatten)]
    pub score: Score,
    pub is_transformed: bool,
    pub original_direction: Direction,
}

impl SinistraScore {
    /// Tag an already mirrored score
    pub(crate) fn from_mirrored(score: Score) -> Self {
        Self {
            score,
            is_transformed: true,
            original_direction: Direction::Ltr,
        }
    }
}

impl std::ops::Deref for SinistraScore {
    type Target = Score;

    fn deref(&self) -> &Score {
        &self.score
    }
}

/// Either orientation of a score, for consumers that accept both
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnyScore {
    Sinistra(SinistraScore),
    Standard(Score),
}

impl AnyScore {
    pub fn score(&self) -> &Score {
        match self {
            AnyScore::Sinistra(s) => &s.score,
            AnyScore::Standard(s) => s,
        }
    }

    /// Orientation implied by the transform marker
    pub fn orientation(&self) -> Orientation {
        match self {
            AnyScore::Sinistra(s) if s.is_transformed => Orientation::Sinistra,
            _ => Orientation::Dextra,
        }
    }
}

impl From<Score> for AnyScore {
    fn from(score: Score) -> Self {
        AnyScore::Standard(score)
    }
}

impl From<SinistraScore> for AnyScore {
    fn from(score: SinistraScore) -> Self {
        AnyScore::Sinistra(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sinistra_serialises_flat_with_markers() {
        let sinistra = SinistraScore::from_mirrored(Score {
            title: Some("Etude".to_string()),
            ..Score::default()
        });
        let json = serde_json::to_value(&sinistra).unwrap();
        assert_eq!(json["isTransformed"], true);
        assert_eq!(json["originalDirection"], "ltr");
        assert_eq!(json["title"], "Etude");
        assert_eq!(json["timeSignature"]["beatType"], 4);
    }

    #[test]
    fn test_any_score_deserialises_by_shape() {
        let plain = serde_json::json!({
            "timeSignature": { "beats": 3, "beatType": 4 },
            "keySignature": { "fifths": -1, "mode": "minor" },
            "staves": []
        });
        let any: AnyScore = serde_json::from_value(plain.clone()).unwrap();
        assert_eq!(any.orientation(), Orientation::Dextra);

        let mut marked = plain;
        marked["isTransformed"] = serde_json::json!(true);
        marked["originalDirection"] = serde_json::json!("ltr");
        let any: AnyScore = serde_json::from_value(marked).unwrap();
        assert_eq!(any.orientation(), Orientation::Sinistra);
        assert_eq!(any.score().time_signature, TimeSignature::new(3, 4));
    }
}
