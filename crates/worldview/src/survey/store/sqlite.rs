use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use super::super::domain::{NormalizedTriple, QuestionId, ResponseId};
use super::{ChoiceRecord, RecordId, StoreError, StoredSubmission, SubmissionRecord, SubmissionSink};

const MIGRATIONS: &str = r#"
CREATE TABLE IF NOT EXISTS survey_results (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id TEXT NOT NULL,
    pre_modern INTEGER NOT NULL,
    modern INTEGER NOT NULL,
    post_modern INTEGER NOT NULL,
    plot_x REAL NOT NULL,
    plot_y REAL NOT NULL,
    source TEXT NOT NULL,
    browser TEXT,
    version TEXT NOT NULL,
    submitted_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS survey_choices (
    result_id INTEGER NOT NULL REFERENCES survey_results(id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    question_id TEXT NOT NULL,
    response_id TEXT NOT NULL,
    choice_index INTEGER,
    PRIMARY KEY (result_id, position)
);
CREATE INDEX IF NOT EXISTS idx_survey_results_session ON survey_results(session_id);
"#;

/// SQLite-backed sink. One connection, serialized behind a mutex.
pub struct SqliteSubmissionStore {
    conn: Mutex<Connection>,
}

impl SqliteSubmissionStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path.as_ref())?;
        Self::with_connection(conn)
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(MIGRATIONS)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("sqlite connection mutex poisoned".to_string()))
    }

    /// Number of stored submissions.
    pub fn count(&self) -> Result<usize, StoreError> {
        let conn = self.connection()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM survey_results", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    fn choices_for(conn: &Connection, id: RecordId) -> Result<Vec<ChoiceRecord>, StoreError> {
        let mut statement = conn.prepare(
            "SELECT question_id, response_id, choice_index FROM survey_choices \
             WHERE result_id = ?1 ORDER BY position",
        )?;
        let rows = statement.query_map(params![id.0], |row| {
            Ok(ChoiceRecord {
                question_id: QuestionId(row.get(0)?),
                response_id: ResponseId(row.get(1)?),
                choice_index: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

impl SubmissionSink for SqliteSubmissionStore {
    fn store(&self, record: &SubmissionRecord) -> Result<RecordId, StoreError> {
        let mut conn = self.connection()?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO survey_results (session_id, pre_modern, modern, post_modern, plot_x, \
             plot_y, source, browser, version, submitted_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                record.session_id,
                record.normalized.pre_modern,
                record.normalized.modern,
                record.normalized.post_modern,
                record.plot_x,
                record.plot_y,
                record.source,
                record.browser,
                record.version,
                record.submitted_at.to_rfc3339(),
            ],
        )?;
        let id = RecordId(tx.last_insert_rowid());

        {
            let mut insert = tx.prepare(
                "INSERT INTO survey_choices (result_id, position, question_id, response_id, \
                 choice_index) VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for (position, choice) in record.choices.iter().enumerate() {
                let position = i64::try_from(position).unwrap_or(i64::MAX);
                insert.execute(params![
                    id.0,
                    position,
                    choice.question_id.as_str(),
                    choice.response_id.as_str(),
                    choice.choice_index,
                ])?;
            }
        }

        tx.commit()?;
        Ok(id)
    }

    fn recent(&self, limit: usize) -> Result<Vec<StoredSubmission>, StoreError> {
        let conn = self.connection()?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut statement = conn.prepare(
            "SELECT id, session_id, pre_modern, modern, post_modern, plot_x, plot_y, source, \
             browser, version, submitted_at FROM survey_results ORDER BY id DESC LIMIT ?1",
        )?;
        let rows = statement.query_map(params![limit], |row| {
            Ok((
                RecordId(row.get(0)?),
                SubmissionRecord {
                    session_id: row.get(1)?,
                    choices: Vec::new(),
                    normalized: NormalizedTriple::new(row.get(2)?, row.get(3)?, row.get(4)?),
                    plot_x: row.get(5)?,
                    plot_y: row.get(6)?,
                    source: row.get(7)?,
                    browser: row.get(8)?,
                    version: row.get(9)?,
                    submitted_at: DateTime::<Utc>::default(),
                },
                row.get::<_, String>(10)?,
            ))
        })?;

        let mut stored = Vec::new();
        for row in rows {
            let (id, mut record, submitted_at) = row?;
            record.submitted_at = DateTime::parse_from_rfc3339(&submitted_at)
                .map_err(|err| StoreError::Corrupt {
                    column: "submitted_at",
                    detail: err.to_string(),
                })?
                .with_timezone(&Utc);
            record.choices = Self::choices_for(&conn, id)?;
            stored.push(StoredSubmission { id, record });
        }
        Ok(stored)
    }
}
