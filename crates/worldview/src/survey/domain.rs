use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

/// Identifier wrapper for catalog questions (e.g. `Q1`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QuestionId(pub String);

impl QuestionId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for response options (e.g. `Q1R3`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResponseId(pub String);

impl ResponseId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResponseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One chosen response per answered question. Unanswered questions are absent.
pub type Answers = BTreeMap<QuestionId, ResponseId>;

/// The three worldview axes in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Axis {
    PreModern,
    Modern,
    PostModern,
}

impl Axis {
    pub const fn ordered() -> [Self; 3] {
        [Self::PreModern, Self::Modern, Self::PostModern]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::PreModern => "PreModern",
            Self::Modern => "Modern",
            Self::PostModern => "PostModern",
        }
    }

    pub const fn index(self) -> usize {
        match self {
            Self::PreModern => 0,
            Self::Modern => 1,
            Self::PostModern => 2,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Relative weight along each axis, `(preModern, modern, postModern)`.
///
/// Serialized as a three element array to match the catalog format.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct ScoreTriple {
    pub pre_modern: f64,
    pub modern: f64,
    pub post_modern: f64,
}

impl ScoreTriple {
    pub const fn new(pre_modern: f64, modern: f64, post_modern: f64) -> Self {
        Self {
            pre_modern,
            modern,
            post_modern,
        }
    }

    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    pub fn get(&self, axis: Axis) -> f64 {
        match axis {
            Axis::PreModern => self.pre_modern,
            Axis::Modern => self.modern,
            Axis::PostModern => self.post_modern,
        }
    }

    pub fn components(&self) -> [f64; 3] {
        [self.pre_modern, self.modern, self.post_modern]
    }

    pub fn total(&self) -> f64 {
        self.pre_modern + self.modern + self.post_modern
    }

    pub fn is_non_negative(&self) -> bool {
        self.components()
            .iter()
            .all(|value| value.is_finite() && *value >= 0.0)
    }
}

impl From<[f64; 3]> for ScoreTriple {
    fn from(value: [f64; 3]) -> Self {
        Self::new(value[0], value[1], value[2])
    }
}

impl From<ScoreTriple> for [f64; 3] {
    fn from(value: ScoreTriple) -> Self {
        value.components()
    }
}

impl Add for ScoreTriple {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(
            self.pre_modern + rhs.pre_modern,
            self.modern + rhs.modern,
            self.post_modern + rhs.post_modern,
        )
    }
}

impl AddAssign for ScoreTriple {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

/// Integer percentages that always sum to exactly 100 once scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct NormalizedTriple {
    pub pre_modern: u8,
    pub modern: u8,
    pub post_modern: u8,
}

impl NormalizedTriple {
    pub const fn new(pre_modern: u8, modern: u8, post_modern: u8) -> Self {
        Self {
            pre_modern,
            modern,
            post_modern,
        }
    }

    pub fn components(&self) -> [u8; 3] {
        [self.pre_modern, self.modern, self.post_modern]
    }

    pub fn sum(&self) -> u16 {
        self.components().iter().map(|value| u16::from(*value)).sum()
    }

    pub fn as_triple(&self) -> ScoreTriple {
        ScoreTriple::new(
            f64::from(self.pre_modern),
            f64::from(self.modern),
            f64::from(self.post_modern),
        )
    }
}

impl From<[u8; 3]> for NormalizedTriple {
    fn from(value: [u8; 3]) -> Self {
        Self::new(value[0], value[1], value[2])
    }
}

impl From<NormalizedTriple> for [u8; 3] {
    fn from(value: NormalizedTriple) -> Self {
        value.components()
    }
}

/// The six report categories, each fed by one catalog question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportCategory {
    SourceOfTruth,
    UnderstandingTheWorld,
    KnowledgeAcquisition,
    WorldView,
    SocietalValues,
    Identity,
}

impl ReportCategory {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::SourceOfTruth,
            Self::UnderstandingTheWorld,
            Self::KnowledgeAcquisition,
            Self::WorldView,
            Self::SocietalValues,
            Self::Identity,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::SourceOfTruth => "Source of Truth",
            Self::UnderstandingTheWorld => "Understanding the World",
            Self::KnowledgeAcquisition => "Knowledge Acquisition",
            Self::WorldView => "World View",
            Self::SocietalValues => "Societal Values",
            Self::Identity => "Identity",
        }
    }

    /// Question whose selected answer backs this category.
    pub const fn question_key(self) -> &'static str {
        match self {
            Self::SourceOfTruth => "Q1",
            Self::UnderstandingTheWorld => "Q2",
            Self::KnowledgeAcquisition => "Q3",
            Self::WorldView => "Q4",
            Self::SocietalValues => "Q5",
            Self::Identity => "Q6",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|category| category.label().eq_ignore_ascii_case(label.trim()))
    }
}

impl fmt::Display for ReportCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
