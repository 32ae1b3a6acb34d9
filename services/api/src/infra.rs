use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use metrics_exporter_prometheus::PrometheusHandle;
use worldview::config::SurveyConfig;
use worldview::error::AppError;
use worldview::survey::{
    QuestionId, RecordId, ResponseId, SqliteSubmissionStore, StoreError, StoredSubmission,
    SubmissionRecord, SubmissionSink, SurveyService,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local sink used when no database is configured.
#[derive(Default, Clone)]
pub(crate) struct InMemorySubmissionSink {
    records: Arc<Mutex<Vec<SubmissionRecord>>>,
}

impl InMemorySubmissionSink {
    fn poisoned() -> StoreError {
        StoreError::Unavailable("submission mutex poisoned".to_string())
    }
}

impl SubmissionSink for InMemorySubmissionSink {
    fn store(&self, record: &SubmissionRecord) -> Result<RecordId, StoreError> {
        let mut guard = self.records.lock().map_err(|_| Self::poisoned())?;
        guard.push(record.clone());
        Ok(RecordId(i64::try_from(guard.len()).unwrap_or(i64::MAX)))
    }

    fn recent(&self, limit: usize) -> Result<Vec<StoredSubmission>, StoreError> {
        let guard = self.records.lock().map_err(|_| Self::poisoned())?;
        Ok(guard
            .iter()
            .enumerate()
            .rev()
            .take(limit)
            .map(|(index, record)| StoredSubmission {
                id: RecordId(i64::try_from(index + 1).unwrap_or(i64::MAX)),
                record: record.clone(),
            })
            .collect())
    }
}

/// Sink chosen at startup from `SURVEY_DB_PATH`.
pub(crate) enum ConfiguredSink {
    Memory(InMemorySubmissionSink),
    Sqlite(SqliteSubmissionStore),
}

impl ConfiguredSink {
    pub(crate) fn from_config(config: &SurveyConfig) -> Result<Self, StoreError> {
        match &config.db_path {
            Some(path) => Ok(Self::Sqlite(SqliteSubmissionStore::open(path)?)),
            None => Ok(Self::Memory(InMemorySubmissionSink::default())),
        }
    }

    pub(crate) fn label(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::Sqlite(_) => "sqlite",
        }
    }
}

impl SubmissionSink for ConfiguredSink {
    fn store(&self, record: &SubmissionRecord) -> Result<RecordId, StoreError> {
        match self {
            Self::Memory(sink) => sink.store(record),
            Self::Sqlite(sink) => sink.store(record),
        }
    }

    fn recent(&self, limit: usize) -> Result<Vec<StoredSubmission>, StoreError> {
        match self {
            Self::Memory(sink) => sink.recent(limit),
            Self::Sqlite(sink) => sink.recent(limit),
        }
    }
}

/// Load catalog and narratives from config and wire them to `sink`.
pub(crate) fn build_survey_service<S>(
    config: &SurveyConfig,
    sink: Arc<S>,
) -> Result<SurveyService<S>, AppError>
where
    S: SubmissionSink + 'static,
{
    let catalog = Arc::new(config.load_catalog()?);
    let narratives = Arc::new(config.load_narratives()?);
    Ok(SurveyService::new(catalog, narratives, sink).with_source(config.source.clone()))
}

/// Parse a `Q1=Q1R2` command-line answer.
pub(crate) fn parse_answer(raw: &str) -> Result<(QuestionId, ResponseId), String> {
    let (question, response) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected QUESTION=RESPONSE, got '{raw}'"))?;
    let (question, response) = (question.trim(), response.trim());
    if question.is_empty() || response.is_empty() {
        return Err(format!("expected QUESTION=RESPONSE, got '{raw}'"));
    }
    Ok((QuestionId::new(question), ResponseId::new(response)))
}
