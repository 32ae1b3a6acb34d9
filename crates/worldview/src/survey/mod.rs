//! Modernity worldview survey: catalog, scoring, report assembly, rendering
//! and persistence, plus the HTTP surface over them.

pub mod catalog;
pub mod domain;
pub mod render;
pub mod report;
pub mod router;
pub mod scoring;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use catalog::{
    choice_index, CatalogError, Question, ResponseCatalog, ResponseOption, Selection, MAX_WEIGHT,
};
pub use domain::{
    Answers, Axis, NormalizedTriple, QuestionId, ReportCategory, ResponseId, ScoreTriple,
};
pub use render::{
    ChartRenderer, DocumentRenderer, PdfReportRenderer, Rendered, SvgTernaryChart,
    TextReportRenderer,
};
pub use report::{
    assemble, category_answers, perspective_key, CategoryAnswers, CategoryNarrative,
    ChartPayload, NarrativeCatalog, NarrativeError, NarrativeSource, Report, ReportPayload,
    MISSING_NARRATIVE,
};
pub use router::survey_router;
pub use scoring::{
    aggregate, classify, normalize, project, AggregateResult, AggregateStatus, Perspective,
    PlotCoordinate, ScoringError, StrengthTier,
};
pub use service::{
    OptionView, Preview, QuestionView, SubmissionReceipt, SurveyService, SurveyServiceError,
    SurveySubmission, DEFAULT_SOURCE,
};
pub use store::{
    export_csv, ChoiceRecord, RecordId, SqliteSubmissionStore, StoreError, StoredSubmission,
    SubmissionRecord, SubmissionSink,
};
