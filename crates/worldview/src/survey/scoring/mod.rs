//! Scoring core: answers become a normalized worldview triple, a plot
//! coordinate on the ternary chart, and a classified perspective.
//!
//! Every function here is pure. Callers own any session state.

mod aggregate;
mod perspective;
mod projection;

pub use aggregate::{aggregate, normalize, AggregateResult, AggregateStatus};
pub use perspective::{classify, Perspective, StrengthTier, SUM_TOLERANCE};
pub use projection::{project, PlotCoordinate};

/// Errors surfaced by the scoring core.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoringError {
    #[error("insufficient data: no weighted answers to score")]
    InsufficientData,
    #[error("invalid score triple: components sum to {sum:.2}, expected 100")]
    InvalidTriple { sum: f64 },
}
