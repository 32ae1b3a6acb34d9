use serde::{Deserialize, Serialize};

use super::super::domain::{NormalizedTriple, ScoreTriple};
use super::projection::{project, PlotCoordinate};
use super::ScoringError;

/// Whether an aggregate carries enough weight to be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateStatus {
    Scored,
    InsufficientData,
}

/// Output of aggregating one survey's selected responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub status: AggregateStatus,
    pub raw_sum: ScoreTriple,
    pub normalized: NormalizedTriple,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plot_coordinate: Option<PlotCoordinate>,
    pub individual_points: Vec<ScoreTriple>,
}

impl AggregateResult {
    pub fn is_scored(&self) -> bool {
        self.status == AggregateStatus::Scored
    }

    /// The normalized triple, or `InsufficientData` for a zero-weight aggregate.
    pub fn require_scored(&self) -> Result<NormalizedTriple, ScoringError> {
        match self.status {
            AggregateStatus::Scored => Ok(self.normalized),
            AggregateStatus::InsufficientData => Err(ScoringError::InsufficientData),
        }
    }
}

/// Sum the selected responses' weights and normalize them to percentages.
///
/// Partial input is fine: only the provided scores are aggregated. An empty
/// or all-zero input yields a zeroed result flagged `InsufficientData`.
pub fn aggregate<I>(scores: I) -> AggregateResult
where
    I: IntoIterator<Item = ScoreTriple>,
{
    let individual_points: Vec<ScoreTriple> = scores.into_iter().collect();
    let raw_sum = individual_points
        .iter()
        .fold(ScoreTriple::zero(), |sum, point| sum + *point);

    match normalize(raw_sum) {
        Some(normalized) => AggregateResult {
            status: AggregateStatus::Scored,
            raw_sum,
            normalized,
            plot_coordinate: project(normalized.as_triple()),
            individual_points,
        },
        None => AggregateResult {
            status: AggregateStatus::InsufficientData,
            raw_sum,
            normalized: NormalizedTriple::default(),
            plot_coordinate: None,
            individual_points,
        },
    }
}

/// Scale a raw triple to integer percentages summing to exactly 100.
///
/// PreModern and Modern are rounded independently; PostModern is always the
/// remainder. If both rounded shares overshoot 100 together, the share that
/// gained more from rounding gives the point back (Modern on a tie).
pub fn normalize(raw: ScoreTriple) -> Option<NormalizedTriple> {
    let total = raw.total();
    if !total.is_finite() || total <= 0.0 {
        return None;
    }

    let exact_pre = raw.pre_modern / total * 100.0;
    let exact_modern = raw.modern / total * 100.0;
    let mut pre = exact_pre.round();
    let mut modern = exact_modern.round();

    if pre + modern > 100.0 {
        if pre - exact_pre > modern - exact_modern {
            pre -= 1.0;
        } else {
            modern -= 1.0;
        }
    }

    let pre = pre.clamp(0.0, 100.0) as u8;
    let modern = modern.clamp(0.0, f64::from(100 - pre)) as u8;
    Some(NormalizedTriple::new(pre, modern, 100 - pre - modern))
}
