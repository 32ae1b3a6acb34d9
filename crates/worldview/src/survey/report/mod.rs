//! Report assembly: classification plus per-category narratives, shaped for
//! the chart and document renderers.

mod assembler;
mod narratives;
pub mod views;

pub use assembler::{assemble, category_answers, perspective_key, CategoryAnswers, MISSING_NARRATIVE};
pub use narratives::{NarrativeCatalog, NarrativeError};
pub use views::{CategoryNarrative, ChartPayload, NarrativeSource, Report, ReportPayload};
