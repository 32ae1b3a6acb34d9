use serde::{Deserialize, Serialize};

use super::super::domain::ScoreTriple;

/// Cartesian position inside the unit triangle used by the ternary chart.
///
/// PreModern sits at the apex `(0.5, 1.0)`, Modern at `(0.0, 0.0)` and
/// PostModern at `(1.0, 0.0)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotCoordinate {
    pub x: f64,
    pub y: f64,
}

/// Barycentric to Cartesian projection: `x = (2*post + pre) / (2*total)`,
/// `y = pre / total`. Returns `None` when the triple carries no weight.
pub fn project(triple: ScoreTriple) -> Option<PlotCoordinate> {
    let total = triple.total();
    if !total.is_finite() || total <= 0.0 {
        return None;
    }

    Some(PlotCoordinate {
        x: (2.0 * triple.post_modern + triple.pre_modern) / (2.0 * total),
        y: triple.pre_modern / total,
    })
}
