use serde::{Deserialize, Serialize};

use super::super::domain::{Axis, ScoreTriple};
use super::ScoringError;

/// Allowed distance from 100 for a triple to be classified.
pub const SUM_TOLERANCE: f64 = 0.1;

const STRONG_THRESHOLD: f64 = 70.0;
const MODERATE_FLOOR: f64 = 50.0;
const SECONDARY_GAP: f64 = 10.0;

/// How decisively the leading axis dominates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrengthTier {
    Pure,
    Strong,
    Moderate,
    Mixed,
}

impl StrengthTier {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pure => "Pure",
            Self::Strong => "Strong",
            Self::Moderate => "Moderate",
            Self::Mixed => "Mixed",
        }
    }
}

/// Classified perspective for a normalized triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Perspective {
    pub primary: Axis,
    pub strength: StrengthTier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary: Option<Axis>,
    pub scores: ScoreTriple,
}

impl Perspective {
    /// Human readable label, e.g. "Moderately Modern with PostModern influences".
    pub fn description(&self) -> String {
        match (self.strength, self.secondary) {
            (StrengthTier::Pure, _) => format!("Pure {}", self.primary),
            (StrengthTier::Mixed, _) => "Mixed Perspective".to_string(),
            (StrengthTier::Strong, _) => format!("Strongly {}", self.primary),
            (StrengthTier::Moderate, Some(secondary)) => format!(
                "Moderately {} with {} influences",
                self.primary, secondary
            ),
            (StrengthTier::Moderate, None) => format!("Moderately {}", self.primary),
        }
    }
}

/// Classify a percentage triple. Rules apply in order, first match wins:
/// 100 is Pure, above 70 is Strong, below 50 is Mixed, anything else is
/// Moderate with an optional secondary axis.
///
/// Ties for the maximum resolve in canonical axis order
/// (PreModern, Modern, PostModern).
pub fn classify(scores: ScoreTriple) -> Result<Perspective, ScoringError> {
    let sum = scores.total();
    if !sum.is_finite() || (sum - 100.0).abs() > SUM_TOLERANCE {
        return Err(ScoringError::InvalidTriple { sum });
    }

    let (primary, max_score) = leading_axis(&scores);

    let (strength, secondary) = if (max_score - 100.0).abs() < f64::EPSILON {
        (StrengthTier::Pure, None)
    } else if max_score > STRONG_THRESHOLD {
        (StrengthTier::Strong, None)
    } else if max_score < MODERATE_FLOOR {
        (StrengthTier::Mixed, None)
    } else {
        (StrengthTier::Moderate, secondary_axis(&scores, primary))
    };

    Ok(Perspective {
        primary,
        strength,
        secondary,
        scores,
    })
}

fn leading_axis(scores: &ScoreTriple) -> (Axis, f64) {
    let mut leader = Axis::PreModern;
    let mut max_score = scores.get(leader);
    for axis in Axis::ordered().into_iter().skip(1) {
        let value = scores.get(axis);
        // strict comparison keeps the earlier axis on ties
        if value > max_score {
            leader = axis;
            max_score = value;
        }
    }
    (leader, max_score)
}

fn secondary_axis(scores: &ScoreTriple, primary: Axis) -> Option<Axis> {
    let mut others = Axis::ordered().into_iter().filter(|axis| *axis != primary);
    let first = others.next()?;
    let second = others.next()?;
    let (a, b) = (scores.get(first), scores.get(second));

    if (a - b).abs() > SECONDARY_GAP {
        Some(if a > b { first } else { second })
    } else {
        None
    }
}
