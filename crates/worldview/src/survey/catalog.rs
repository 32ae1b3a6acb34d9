use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::domain::{Answers, QuestionId, ResponseId, ScoreTriple};

const BUILTIN_CATALOG: &str = include_str!("../../data/questions_responses.json");

/// Largest weight a single option may carry on any axis. Keeps the summed
/// totals of a full answer set finite.
pub const MAX_WEIGHT: f64 = 1e6;

/// Weighted answer option for a single question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseOption {
    pub id: ResponseId,
    pub text: String,
    pub scores: ScoreTriple,
}

/// Question text plus its fixed list of weighted options.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    pub responses: Vec<ResponseOption>,
}

/// A resolved answer: the question and the option the respondent picked.
#[derive(Debug, Clone, Copy)]
pub struct Selection<'a> {
    pub question: &'a Question,
    pub option: &'a ResponseOption,
}

impl Selection<'_> {
    pub fn choice_index(&self) -> Option<u32> {
        choice_index(&self.option.id)
    }
}

/// Read-only question catalog loaded once at startup.
#[derive(Debug, Clone)]
pub struct ResponseCatalog {
    questions: Vec<Question>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    questions: BTreeMap<String, RawQuestion>,
}

#[derive(Debug, Deserialize)]
struct RawQuestion {
    text: String,
    responses: Vec<ResponseOption>,
}

impl ResponseCatalog {
    /// Catalog shipped with the crate (six questions, five options each).
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json_str(BUILTIN_CATALOG)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let file = File::open(path.as_ref()).map_err(|source| CatalogError::Io {
            path: path.as_ref().display().to_string(),
            source,
        })?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_reader(reader)?;
        Self::from_file(file)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(raw)?;
        Self::from_file(file)
    }

    fn from_file(file: CatalogFile) -> Result<Self, CatalogError> {
        if file.questions.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut questions = Vec::with_capacity(file.questions.len());
        for (key, raw) in file.questions {
            let id = QuestionId(key);
            if raw.responses.is_empty() {
                return Err(CatalogError::NoResponses(id));
            }

            let mut seen = HashSet::new();
            for option in &raw.responses {
                if !seen.insert(option.id.clone()) {
                    return Err(CatalogError::DuplicateResponse {
                        question: id,
                        response: option.id.clone(),
                    });
                }
                if !option.scores.is_non_negative() {
                    return Err(CatalogError::NegativeWeight {
                        question: id,
                        response: option.id.clone(),
                    });
                }
                if option
                    .scores
                    .components()
                    .iter()
                    .any(|value| *value > MAX_WEIGHT)
                {
                    return Err(CatalogError::WeightTooLarge {
                        question: id,
                        response: option.id.clone(),
                    });
                }
            }

            questions.push(Question {
                id,
                text: raw.text,
                responses: raw.responses,
            });
        }

        questions.sort_by(|a, b| question_order_key(&a.id).cmp(&question_order_key(&b.id)));

        Ok(Self { questions })
    }

    /// Questions in presentation order (`Q1`, `Q2`, ... `Q10`).
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn question_ids(&self) -> impl Iterator<Item = &QuestionId> {
        self.questions.iter().map(|question| &question.id)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn get_question(&self, id: &QuestionId) -> Option<&Question> {
        self.questions.iter().find(|question| &question.id == id)
    }

    pub fn get_responses(&self, id: &QuestionId) -> Option<&[ResponseOption]> {
        self.get_question(id)
            .map(|question| question.responses.as_slice())
    }

    /// Resolve an answer map into selections ordered by question.
    ///
    /// Unknown question or response identifiers are rejected rather than
    /// silently ignored so they never masquerade as "unanswered".
    pub fn resolve<'a>(&'a self, answers: &Answers) -> Result<Vec<Selection<'a>>, CatalogError> {
        if let Some(unknown) = answers
            .keys()
            .find(|question_id| self.get_question(question_id).is_none())
        {
            return Err(CatalogError::UnknownQuestion(unknown.clone()));
        }

        let mut selections = Vec::with_capacity(answers.len());
        for question in &self.questions {
            let Some(response_id) = answers.get(&question.id) else {
                continue;
            };
            let option = question
                .responses
                .iter()
                .find(|option| &option.id == response_id)
                .ok_or_else(|| CatalogError::UnknownResponse {
                    question: question.id.clone(),
                    response: response_id.clone(),
                })?;
            selections.push(Selection { question, option });
        }

        Ok(selections)
    }

    /// Questions with no entry in `answers`, in catalog order.
    pub fn unanswered(&self, answers: &Answers) -> Vec<QuestionId> {
        self.questions
            .iter()
            .filter(|question| !answers.contains_key(&question.id))
            .map(|question| question.id.clone())
            .collect()
    }

    /// Options shuffled for display. The same `seed` always yields the same
    /// order for a question; scoring never depends on it.
    pub fn presentation_order(&self, id: &QuestionId, seed: u64) -> Option<Vec<&ResponseOption>> {
        let (position, question) = self
            .questions
            .iter()
            .enumerate()
            .find(|(_, question)| &question.id == id)?;

        let mut options: Vec<&ResponseOption> = question.responses.iter().collect();
        let mut rng = StdRng::seed_from_u64(seed.wrapping_add(position as u64));
        options.shuffle(&mut rng);
        Some(options)
    }
}

/// Numeric choice encoded after the last `R` of a response id (`Q1R3` -> 3).
pub fn choice_index(id: &ResponseId) -> Option<u32> {
    id.as_str()
        .rsplit_once(['R', 'r'])
        .and_then(|(_, digits)| digits.parse().ok())
}

fn question_order_key(id: &QuestionId) -> (u64, String) {
    let digits: String = id
        .as_str()
        .chars()
        .skip_while(|ch| !ch.is_ascii_digit())
        .take_while(|ch| ch.is_ascii_digit())
        .collect();
    (digits.parse().unwrap_or(u64::MAX), id.0.clone())
}

/// Failures loading or querying the question catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("unable to read catalog at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed catalog: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("catalog contains no questions")]
    Empty,
    #[error("question {0} has no response options")]
    NoResponses(QuestionId),
    #[error("question {question} lists response {response} more than once")]
    DuplicateResponse {
        question: QuestionId,
        response: ResponseId,
    },
    #[error("response {response} of question {question} has a negative or non-finite weight")]
    NegativeWeight {
        question: QuestionId,
        response: ResponseId,
    },
    #[error("response {response} of question {question} has a weight above {max}", max = MAX_WEIGHT)]
    WeightTooLarge {
        question: QuestionId,
        response: ResponseId,
    },
    #[error("unknown question {0}")]
    UnknownQuestion(QuestionId),
    #[error("unknown response {response} for question {question}")]
    UnknownResponse {
        question: QuestionId,
        response: ResponseId,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answers(pairs: &[(&str, &str)]) -> Answers {
        pairs
            .iter()
            .map(|(q, r)| (QuestionId::new(*q), ResponseId::new(*r)))
            .collect()
    }

    #[test]
    fn builtin_catalog_has_six_questions_in_order() {
        let catalog = ResponseCatalog::builtin().expect("builtin catalog parses");
        let ids: Vec<&str> = catalog.question_ids().map(QuestionId::as_str).collect();
        assert_eq!(ids, vec!["Q1", "Q2", "Q3", "Q4", "Q5", "Q6"]);
        assert!(catalog
            .questions()
            .iter()
            .all(|question| question.responses.len() == 5));
    }

    #[test]
    fn numeric_suffix_orders_double_digit_questions() {
        let raw = r#"{"questions": {
            "Q10": {"text": "ten", "responses": [{"id": "Q10R1", "text": "a", "scores": [1, 0, 0]}]},
            "Q2": {"text": "two", "responses": [{"id": "Q2R1", "text": "b", "scores": [0, 1, 0]}]}
        }}"#;
        let catalog = ResponseCatalog::from_json_str(raw).expect("catalog parses");
        let ids: Vec<&str> = catalog.question_ids().map(QuestionId::as_str).collect();
        assert_eq!(ids, vec!["Q2", "Q10"]);
    }

    #[test]
    fn rejects_negative_weights() {
        let raw = r#"{"questions": {
            "Q1": {"text": "one", "responses": [{"id": "Q1R1", "text": "a", "scores": [-1, 0, 0]}]}
        }}"#;
        assert!(matches!(
            ResponseCatalog::from_json_str(raw),
            Err(CatalogError::NegativeWeight { .. })
        ));
    }

    #[test]
    fn rejects_weights_whose_sum_could_overflow() {
        let raw = r#"{"questions": {
            "Q1": {"text": "one", "responses": [{"id": "Q1R1", "text": "a", "scores": [1e308, 0, 0]}]},
            "Q2": {"text": "two", "responses": [{"id": "Q2R1", "text": "b", "scores": [1e308, 0, 0]}]}
        }}"#;
        let err = ResponseCatalog::from_json_str(raw).expect_err("oversized weight");
        assert!(matches!(err, CatalogError::WeightTooLarge { .. }));
        assert!(err.to_string().contains("Q1R1"));
    }

    #[test]
    fn accepts_weights_at_the_bound() {
        let raw = r#"{"questions": {
            "Q1": {"text": "one", "responses": [{"id": "Q1R1", "text": "a", "scores": [1000000, 0, 1]}]}
        }}"#;
        assert!(ResponseCatalog::from_json_str(raw).is_ok());
    }

    #[test]
    fn rejects_duplicate_response_ids() {
        let raw = r#"{"questions": {
            "Q1": {"text": "one", "responses": [
                {"id": "Q1R1", "text": "a", "scores": [1, 0, 0]},
                {"id": "Q1R1", "text": "b", "scores": [0, 1, 0]}
            ]}
        }}"#;
        assert!(matches!(
            ResponseCatalog::from_json_str(raw),
            Err(CatalogError::DuplicateResponse { .. })
        ));
    }

    #[test]
    fn resolve_orders_by_question_and_skips_unanswered() {
        let catalog = ResponseCatalog::builtin().expect("builtin catalog parses");
        let selections = catalog
            .resolve(&answers(&[("Q3", "Q3R2"), ("Q1", "Q1R4")]))
            .expect("answers resolve");

        assert_eq!(selections.len(), 2);
        assert_eq!(selections[0].question.id.as_str(), "Q1");
        assert_eq!(selections[0].option.scores, ScoreTriple::new(50.0, 50.0, 0.0));
        assert_eq!(selections[1].question.id.as_str(), "Q3");
        assert_eq!(selections[1].choice_index(), Some(2));
    }

    #[test]
    fn resolve_rejects_unknown_identifiers() {
        let catalog = ResponseCatalog::builtin().expect("builtin catalog parses");
        assert!(matches!(
            catalog.resolve(&answers(&[("Q9", "Q9R1")])),
            Err(CatalogError::UnknownQuestion(_))
        ));
        assert!(matches!(
            catalog.resolve(&answers(&[("Q1", "Q2R1")])),
            Err(CatalogError::UnknownResponse { .. })
        ));
    }

    #[test]
    fn presentation_order_is_a_stable_permutation() {
        let catalog = ResponseCatalog::builtin().expect("builtin catalog parses");
        let id = QuestionId::new("Q2");
        let first = catalog.presentation_order(&id, 42).expect("question exists");
        let second = catalog.presentation_order(&id, 42).expect("question exists");
        assert_eq!(first, second);

        let mut ids: Vec<&str> = first.iter().map(|option| option.id.as_str()).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec!["Q2R1", "Q2R2", "Q2R3", "Q2R4", "Q2R5"]);
    }

    #[test]
    fn choice_index_reads_trailing_digits() {
        assert_eq!(choice_index(&ResponseId::new("Q1R3")), Some(3));
        assert_eq!(choice_index(&ResponseId::new("Q12R10")), Some(10));
        assert_eq!(choice_index(&ResponseId::new("free-text")), None);
    }
}
