use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::catalog::{CatalogError, ResponseCatalog, Selection};
use super::domain::{Answers, NormalizedTriple, QuestionId, ResponseId, ScoreTriple};
use super::render::{
    ChartRenderer, DocumentRenderer, PdfReportRenderer, Rendered, SvgTernaryChart,
};
use super::report::{assemble, category_answers, NarrativeCatalog, Report};
use super::scoring::{
    aggregate, classify, AggregateResult, AggregateStatus, Perspective, PlotCoordinate,
    ScoringError,
};
use super::store::{ChoiceRecord, RecordId, StoreError, SubmissionRecord, SubmissionSink};

pub const DEFAULT_SOURCE: &str = "web";

/// Answers posted by a respondent, optionally tagged with a session.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SurveySubmission {
    #[serde(default)]
    pub answers: Answers,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub browser: Option<String>,
}

impl SurveySubmission {
    pub fn new(answers: Answers) -> Self {
        Self {
            answers,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionReceipt {
    pub session_id: String,
    pub record_id: RecordId,
    pub report: Report,
}

/// Draft view over a possibly incomplete set of answers.
#[derive(Debug, Clone, Serialize)]
pub struct Preview {
    pub status: AggregateStatus,
    pub answered: usize,
    pub unanswered: Vec<QuestionId>,
    pub raw_sum: ScoreTriple,
    pub normalized: NormalizedTriple,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plot_coordinate: Option<PlotCoordinate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub perspective: Option<Perspective>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    pub id: QuestionId,
    pub text: String,
    pub options: Vec<OptionView>,
}

/// Response option without its weights.
#[derive(Debug, Clone, Serialize)]
pub struct OptionView {
    pub id: ResponseId,
    pub text: String,
}

/// Survey workflow over a catalog, narrative store and submission sink.
pub struct SurveyService<S> {
    catalog: Arc<ResponseCatalog>,
    narratives: Arc<NarrativeCatalog>,
    sink: Arc<S>,
    chart: Arc<dyn ChartRenderer>,
    document: Arc<dyn DocumentRenderer>,
    source: String,
}

impl<S> SurveyService<S>
where
    S: SubmissionSink + 'static,
{
    pub fn new(catalog: Arc<ResponseCatalog>, narratives: Arc<NarrativeCatalog>, sink: Arc<S>) -> Self {
        Self {
            catalog,
            narratives,
            sink,
            chart: Arc::new(SvgTernaryChart),
            document: Arc::new(PdfReportRenderer),
            source: DEFAULT_SOURCE.to_string(),
        }
    }

    /// Value written to the `source` column of stored records.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_renderers(
        mut self,
        chart: Arc<dyn ChartRenderer>,
        document: Arc<dyn DocumentRenderer>,
    ) -> Self {
        self.chart = chart;
        self.document = document;
        self
    }

    pub fn catalog(&self) -> &ResponseCatalog {
        &self.catalog
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Catalog questions with options in the display order for `seed`.
    pub fn questions(&self, seed: u64) -> Vec<QuestionView> {
        self.catalog
            .questions()
            .iter()
            .map(|question| {
                let options = self
                    .catalog
                    .presentation_order(&question.id, seed)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|option| OptionView {
                        id: option.id.clone(),
                        text: option.text.clone(),
                    })
                    .collect();
                QuestionView {
                    id: question.id.clone(),
                    text: question.text.clone(),
                    options,
                }
            })
            .collect()
    }

    /// Score whatever has been answered so far. Missing answers are fine;
    /// unknown identifiers are not.
    pub fn preview(&self, answers: &Answers) -> Result<Preview, SurveyServiceError> {
        let selections = self.catalog.resolve(answers)?;
        let result = aggregate_selections(&selections);

        let perspective = match result.require_scored() {
            Ok(normalized) => Some(classify(normalized.as_triple())?),
            Err(_) => {
                tracing::debug!(answered = selections.len(), "preview has insufficient data");
                None
            }
        };

        Ok(Preview {
            status: result.status,
            answered: selections.len(),
            unanswered: self.catalog.unanswered(answers),
            raw_sum: result.raw_sum,
            normalized: result.normalized,
            plot_coordinate: result.plot_coordinate,
            description: perspective.as_ref().map(Perspective::description),
            perspective,
        })
    }

    /// Full report for the given answers. Requires a scored aggregate.
    pub fn report(&self, answers: &Answers) -> Result<Report, SurveyServiceError> {
        let selections = self.catalog.resolve(answers)?;
        self.build_report(&selections)
    }

    pub fn chart(&self, answers: &Answers) -> Result<Rendered, SurveyServiceError> {
        let report = self.report(answers)?;
        Ok(self.chart.render(&report.chart_payload()))
    }

    pub fn document(
        &self,
        answers: &Answers,
        generated_on: NaiveDate,
    ) -> Result<Rendered, SurveyServiceError> {
        let report = self.report(answers)?;
        let chart = report.chart_payload();
        Ok(self
            .document
            .render(&report.document_payload(), Some(&chart), generated_on))
    }

    /// Score, assemble and persist a complete submission.
    pub fn submit(
        &self,
        submission: SurveySubmission,
    ) -> Result<SubmissionReceipt, SurveyServiceError> {
        let selections = self.catalog.resolve(&submission.answers)?;
        let missing = self.catalog.unanswered(&submission.answers);
        if !missing.is_empty() {
            return Err(SurveyServiceError::IncompleteSubmission { missing });
        }

        let report = self.build_report(&selections)?;
        let session_id = submission
            .session_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let plot = report.plot_coordinate.unwrap_or(PlotCoordinate { x: 0.0, y: 0.0 });
        let record = SubmissionRecord {
            session_id: session_id.clone(),
            choices: selections
                .iter()
                .map(|selection| ChoiceRecord {
                    question_id: selection.question.id.clone(),
                    response_id: selection.option.id.clone(),
                    choice_index: selection.choice_index(),
                })
                .collect(),
            normalized: report.normalized,
            plot_x: plot.x,
            plot_y: plot.y,
            source: self.source.clone(),
            browser: submission.browser,
            version: env!("CARGO_PKG_VERSION").to_string(),
            submitted_at: Utc::now(),
        };

        let record_id = self.sink.store(&record).map_err(|err| {
            tracing::warn!(session_id = %session_id, error = %err, "failed to store submission");
            SurveyServiceError::from(err)
        })?;

        tracing::info!(
            session_id = %session_id,
            record_id = %record_id,
            perspective = %report.description,
            "survey submission stored"
        );

        Ok(SubmissionReceipt {
            session_id,
            record_id,
            report,
        })
    }

    fn build_report(&self, selections: &[Selection<'_>]) -> Result<Report, SurveyServiceError> {
        let result = aggregate_selections(selections);
        let normalized = result.require_scored()?;
        let perspective = classify(normalized.as_triple())?;
        Ok(assemble(
            &result,
            &perspective,
            &category_answers(selections),
            &self.narratives,
        ))
    }
}

fn aggregate_selections(selections: &[Selection<'_>]) -> AggregateResult {
    aggregate(selections.iter().map(|selection| selection.option.scores))
}

/// Error raised by the survey service.
#[derive(Debug, thiserror::Error)]
pub enum SurveyServiceError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("please answer all questions (missing: {})", join_ids(.missing))]
    IncompleteSubmission { missing: Vec<QuestionId> },
}

fn join_ids(ids: &[QuestionId]) -> String {
    ids.iter()
        .map(QuestionId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
