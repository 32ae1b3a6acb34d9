use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use super::catalog::CatalogError;
use super::render::Rendered;
use super::scoring::ScoringError;
use super::service::{SurveyService, SurveyServiceError, SurveySubmission};
use super::store::SubmissionSink;

const ANSWER_ALL_PROMPT: &str = "please answer all questions";

/// Router exposing the survey endpoints under `/api/v1/survey`.
pub fn survey_router<S>(service: Arc<SurveyService<S>>) -> Router
where
    S: SubmissionSink + 'static,
{
    Router::new()
        .route("/api/v1/survey/questions", get(questions_handler::<S>))
        .route("/api/v1/survey/preview", post(preview_handler::<S>))
        .route("/api/v1/survey/report", post(report_handler::<S>))
        .route("/api/v1/survey/report/chart", post(chart_handler::<S>))
        .route("/api/v1/survey/report/document", post(document_handler::<S>))
        .route("/api/v1/survey/submissions", post(submit_handler::<S>))
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct QuestionsQuery {
    seed: Option<u64>,
}

pub(crate) async fn questions_handler<S>(
    State(service): State<Arc<SurveyService<S>>>,
    Query(query): Query<QuestionsQuery>,
) -> Response
where
    S: SubmissionSink + 'static,
{
    let seed = query.seed.unwrap_or_else(rand::random);
    let questions = service.questions(seed);
    (
        StatusCode::OK,
        axum::Json(json!({ "seed": seed, "questions": questions })),
    )
        .into_response()
}

pub(crate) async fn preview_handler<S>(
    State(service): State<Arc<SurveyService<S>>>,
    axum::Json(submission): axum::Json<SurveySubmission>,
) -> Response
where
    S: SubmissionSink + 'static,
{
    match service.preview(&submission.answers) {
        Ok(preview) => (StatusCode::OK, axum::Json(preview)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn report_handler<S>(
    State(service): State<Arc<SurveyService<S>>>,
    axum::Json(submission): axum::Json<SurveySubmission>,
) -> Response
where
    S: SubmissionSink + 'static,
{
    match service.report(&submission.answers) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn chart_handler<S>(
    State(service): State<Arc<SurveyService<S>>>,
    axum::Json(submission): axum::Json<SurveySubmission>,
) -> Response
where
    S: SubmissionSink + 'static,
{
    match service.chart(&submission.answers) {
        Ok(rendered) => rendered_response(rendered, false),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn document_handler<S>(
    State(service): State<Arc<SurveyService<S>>>,
    axum::Json(submission): axum::Json<SurveySubmission>,
) -> Response
where
    S: SubmissionSink + 'static,
{
    match service.document(&submission.answers, Utc::now().date_naive()) {
        Ok(rendered) => rendered_response(rendered, true),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn submit_handler<S>(
    State(service): State<Arc<SurveyService<S>>>,
    axum::Json(submission): axum::Json<SurveySubmission>,
) -> Response
where
    S: SubmissionSink + 'static,
{
    match service.submit(submission) {
        Ok(receipt) => (StatusCode::CREATED, axum::Json(receipt)).into_response(),
        Err(error) => error_response(error),
    }
}

fn rendered_response(rendered: Rendered, attachment: bool) -> Response {
    let content_type = rendered.content_type.to_string();
    if attachment {
        let disposition = format!("attachment; filename={}", rendered.file_name);
        (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, content_type),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            rendered.bytes,
        )
            .into_response()
    } else {
        (
            StatusCode::OK,
            [(header::CONTENT_TYPE, content_type)],
            rendered.bytes,
        )
            .into_response()
    }
}

fn error_response(error: SurveyServiceError) -> Response {
    let (status, payload) = match &error {
        SurveyServiceError::Scoring(ScoringError::InsufficientData) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({ "error": ANSWER_ALL_PROMPT }),
        ),
        SurveyServiceError::IncompleteSubmission { missing } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({ "error": ANSWER_ALL_PROMPT, "missing": missing }),
        ),
        SurveyServiceError::Scoring(ScoringError::InvalidTriple { .. }) => (
            StatusCode::BAD_REQUEST,
            json!({ "error": error.to_string() }),
        ),
        SurveyServiceError::Catalog(
            CatalogError::UnknownQuestion(_) | CatalogError::UnknownResponse { .. },
        ) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({ "error": error.to_string() }),
        ),
        SurveyServiceError::Catalog(_) | SurveyServiceError::Store(_) => {
            tracing::error!(error = %error, "survey request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": error.to_string() }),
            )
        }
    };
    (status, axum::Json(payload)).into_response()
}
