use std::sync::{Arc, Mutex};

use axum::response::Response;
use axum::Router;
use serde_json::Value;

use crate::survey::{
    survey_router, Answers, NarrativeCatalog, QuestionId, RecordId, ResponseCatalog, ResponseId,
    StoreError, StoredSubmission, SubmissionRecord, SubmissionSink, SurveyService,
};

/// Answers whose raw weights sum to 250/200/150.
pub(super) const REFERENCE_ANSWERS: [(&str, &str); 6] = [
    ("Q1", "Q1R1"),
    ("Q2", "Q2R1"),
    ("Q3", "Q3R4"),
    ("Q4", "Q4R2"),
    ("Q5", "Q5R3"),
    ("Q6", "Q6R5"),
];

/// Moderately PreModern with a PostModern lean (50/17/33).
pub(super) const PREMODERN_POSTMODERN_ANSWERS: [(&str, &str); 6] = [
    ("Q1", "Q1R1"),
    ("Q2", "Q2R1"),
    ("Q3", "Q3R1"),
    ("Q4", "Q4R3"),
    ("Q5", "Q5R3"),
    ("Q6", "Q6R2"),
];

pub(super) fn answers(pairs: &[(&str, &str)]) -> Answers {
    pairs
        .iter()
        .map(|(question, response)| (QuestionId::new(*question), ResponseId::new(*response)))
        .collect()
}

pub(super) fn catalog() -> Arc<ResponseCatalog> {
    Arc::new(ResponseCatalog::builtin().expect("builtin catalog parses"))
}

pub(super) fn narratives() -> Arc<NarrativeCatalog> {
    Arc::new(NarrativeCatalog::builtin().expect("builtin narratives parse"))
}

#[derive(Default)]
pub(super) struct MemorySink {
    records: Mutex<Vec<SubmissionRecord>>,
}

impl MemorySink {
    pub(super) fn records(&self) -> Vec<SubmissionRecord> {
        self.records.lock().expect("sink mutex poisoned").clone()
    }
}

impl SubmissionSink for MemorySink {
    fn store(&self, record: &SubmissionRecord) -> Result<RecordId, StoreError> {
        let mut guard = self.records.lock().expect("sink mutex poisoned");
        guard.push(record.clone());
        Ok(RecordId(guard.len() as i64))
    }

    fn recent(&self, limit: usize) -> Result<Vec<StoredSubmission>, StoreError> {
        let guard = self.records.lock().expect("sink mutex poisoned");
        Ok(guard
            .iter()
            .enumerate()
            .rev()
            .take(limit)
            .map(|(index, record)| StoredSubmission {
                id: RecordId(index as i64 + 1),
                record: record.clone(),
            })
            .collect())
    }
}

pub(super) struct UnavailableSink;

impl SubmissionSink for UnavailableSink {
    fn store(&self, _record: &SubmissionRecord) -> Result<RecordId, StoreError> {
        Err(StoreError::Unavailable("sink offline".to_string()))
    }

    fn recent(&self, _limit: usize) -> Result<Vec<StoredSubmission>, StoreError> {
        Err(StoreError::Unavailable("sink offline".to_string()))
    }
}

pub(super) fn build_service() -> (SurveyService<MemorySink>, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::default());
    let service = SurveyService::new(catalog(), narratives(), sink.clone()).with_source("test");
    (service, sink)
}

pub(super) fn router_with_service<S: SubmissionSink + 'static>(service: SurveyService<S>) -> Router {
    survey_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}
