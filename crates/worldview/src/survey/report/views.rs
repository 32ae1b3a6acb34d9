use serde::Serialize;

use super::super::domain::{NormalizedTriple, ReportCategory, ScoreTriple};
use super::super::scoring::{Perspective, PlotCoordinate};

/// Where a category's narrative text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NarrativeSource {
    Blended,
    Primary,
    Answer,
    Placeholder,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryNarrative {
    pub category: ReportCategory,
    pub title: &'static str,
    pub narrative: String,
    pub source: NarrativeSource,
}

/// Fully assembled result for one survey, ready for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub perspective: Perspective,
    pub description: String,
    pub perspective_key: String,
    pub normalized: NormalizedTriple,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plot_coordinate: Option<PlotCoordinate>,
    pub individual_points: Vec<ScoreTriple>,
    pub categories: Vec<CategoryNarrative>,
}

impl Report {
    pub fn chart_payload(&self) -> ChartPayload {
        ChartPayload {
            individual_points: self.individual_points.clone(),
            aggregate_point: self.normalized.as_triple(),
        }
    }

    pub fn document_payload(&self) -> ReportPayload {
        ReportPayload {
            perspective_description: self.description.clone(),
            normalized_triple: self.normalized.as_triple(),
            category_narratives: self
                .categories
                .iter()
                .map(|entry| (entry.title.to_string(), entry.narrative.clone()))
                .collect(),
        }
    }
}

/// Input for chart renderers: raw per-question weights plus the aggregate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPayload {
    pub individual_points: Vec<ScoreTriple>,
    pub aggregate_point: ScoreTriple,
}

/// Input for document renderers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportPayload {
    pub perspective_description: String,
    pub normalized_triple: ScoreTriple,
    pub category_narratives: Vec<(String, String)>,
}
