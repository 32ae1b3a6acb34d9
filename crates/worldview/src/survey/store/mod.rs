//! Persistence for completed submissions.

mod export;
mod sqlite;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{NormalizedTriple, QuestionId, ResponseId};

pub use export::export_csv;
pub use sqlite::SqliteSubmissionStore;

/// Identifier assigned by a sink when a record is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub i64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One answered question within a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceRecord {
    pub question_id: QuestionId,
    pub response_id: ResponseId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choice_index: Option<u32>,
}

/// Everything persisted for a completed survey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub session_id: String,
    pub choices: Vec<ChoiceRecord>,
    pub normalized: NormalizedTriple,
    pub plot_x: f64,
    pub plot_y: f64,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub browser: Option<String>,
    pub version: String,
    pub submitted_at: DateTime<Utc>,
}

/// A record as read back from a sink.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredSubmission {
    pub id: RecordId,
    #[serde(flatten)]
    pub record: SubmissionRecord,
}

/// Destination for completed submissions. Writes are attempted once.
pub trait SubmissionSink: Send + Sync {
    fn store(&self, record: &SubmissionRecord) -> Result<RecordId, StoreError>;
    /// Most recent submissions first.
    fn recent(&self, limit: usize) -> Result<Vec<StoredSubmission>, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("corrupt stored value in {column}: {detail}")]
    Corrupt { column: &'static str, detail: String },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
