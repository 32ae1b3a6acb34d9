use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use super::super::domain::ReportCategory;

const BUILTIN_NARRATIVES: &str = include_str!("../../../data/narratives.json");

/// Narrative templates keyed by category and perspective key
/// (`PreModern`, `Modern-PostModern`, `Modern-Balanced`, ...).
#[derive(Debug, Clone, Default)]
pub struct NarrativeCatalog {
    entries: BTreeMap<ReportCategory, BTreeMap<String, String>>,
}

impl NarrativeCatalog {
    pub fn builtin() -> Result<Self, NarrativeError> {
        Self::from_json_str(BUILTIN_NARRATIVES)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, NarrativeError> {
        let file = File::open(path.as_ref()).map_err(|source| NarrativeError::Io {
            path: path.as_ref().display().to_string(),
            source,
        })?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, NarrativeError> {
        let raw: BTreeMap<String, BTreeMap<String, String>> = serde_json::from_reader(reader)?;
        Self::from_raw(raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, NarrativeError> {
        let raw: BTreeMap<String, BTreeMap<String, String>> = serde_json::from_str(raw)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: BTreeMap<String, BTreeMap<String, String>>) -> Result<Self, NarrativeError> {
        let mut entries = BTreeMap::new();
        for (label, templates) in raw {
            let category = ReportCategory::from_label(&label)
                .ok_or_else(|| NarrativeError::UnknownCategory(label.clone()))?;
            let templates = templates
                .into_iter()
                .filter(|(_, text)| !text.trim().is_empty())
                .collect();
            entries.insert(category, templates);
        }
        Ok(Self { entries })
    }

    pub fn insert(
        &mut self,
        category: ReportCategory,
        key: impl Into<String>,
        text: impl Into<String>,
    ) {
        self.entries
            .entry(category)
            .or_default()
            .insert(key.into(), text.into());
    }

    pub fn get_narrative(&self, category: ReportCategory, key: &str) -> Option<&str> {
        self.entries
            .get(&category)
            .and_then(|templates| templates.get(key))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NarrativeError {
    #[error("unable to read narratives at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed narratives: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("unknown report category '{0}'")]
    UnknownCategory(String),
}
