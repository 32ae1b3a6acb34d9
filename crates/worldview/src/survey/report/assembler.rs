use std::collections::BTreeMap;

use super::super::catalog::Selection;
use super::super::domain::ReportCategory;
use super::super::scoring::{AggregateResult, Perspective, StrengthTier};
use super::narratives::NarrativeCatalog;
use super::views::{CategoryNarrative, NarrativeSource, Report};

/// Shown when neither a template nor the respondent's own answer exists.
pub const MISSING_NARRATIVE: &str = "No response recorded for this category.";

const BALANCED_KEY: &str = "Modern-Balanced";

/// Answer text the respondent selected, per report category.
pub type CategoryAnswers = BTreeMap<ReportCategory, String>;

/// Map resolved selections onto the report categories they feed.
pub fn category_answers(selections: &[Selection<'_>]) -> CategoryAnswers {
    ReportCategory::ordered()
        .into_iter()
        .filter_map(|category| {
            selections
                .iter()
                .find(|selection| selection.question.id.as_str() == category.question_key())
                .map(|selection| (category, selection.option.text.clone()))
        })
        .collect()
}

/// Narrative lookup key for a perspective.
///
/// Mixed profiles use the balanced key; moderate profiles with a secondary
/// axis use `{primary}-{secondary}`; everything else uses the bare primary.
pub fn perspective_key(perspective: &Perspective) -> String {
    match (perspective.strength, perspective.secondary) {
        (StrengthTier::Mixed, _) => BALANCED_KEY.to_string(),
        (StrengthTier::Strong | StrengthTier::Pure, _) | (_, None) => {
            perspective.primary.label().to_string()
        }
        (_, Some(secondary)) => format!("{}-{}", perspective.primary, secondary),
    }
}

/// Compose the final report. Pure: no persistence and no rendering.
///
/// Each category falls back from the blended key to the bare primary key,
/// then to the respondent's own answer, then to [`MISSING_NARRATIVE`].
pub fn assemble(
    aggregate: &AggregateResult,
    perspective: &Perspective,
    answers: &CategoryAnswers,
    narratives: &NarrativeCatalog,
) -> Report {
    let key = perspective_key(perspective);
    let primary = perspective.primary.label();

    let categories = ReportCategory::ordered()
        .into_iter()
        .map(|category| {
            let (narrative, source) = if let Some(text) = narratives.get_narrative(category, &key)
            {
                (text.to_string(), NarrativeSource::Blended)
            } else if let Some(text) = narratives.get_narrative(category, primary) {
                (text.to_string(), NarrativeSource::Primary)
            } else if let Some(text) = answers.get(&category).filter(|text| !text.trim().is_empty())
            {
                (text.clone(), NarrativeSource::Answer)
            } else {
                (MISSING_NARRATIVE.to_string(), NarrativeSource::Placeholder)
            };

            CategoryNarrative {
                category,
                title: category.label(),
                narrative,
                source,
            }
        })
        .collect();

    Report {
        perspective: perspective.clone(),
        description: perspective.description(),
        perspective_key: key,
        normalized: aggregate.normalized,
        plot_coordinate: aggregate.plot_coordinate,
        individual_points: aggregate.individual_points.clone(),
        categories,
    }
}
