//! Renderers for the external chart and report collaborators.
//!
//! The defaults here produce an SVG ternary chart, a small PDF report and a
//! plain-text report. Anything implementing the traits can replace them.

mod chart;
mod pdf;
mod text;

use chrono::NaiveDate;
use mime::Mime;

use super::report::{ChartPayload, ReportPayload};

pub use chart::SvgTernaryChart;
pub use pdf::PdfReportRenderer;
pub use text::TextReportRenderer;

pub(crate) const REPORT_TITLE: &str = "Modernity Worldview Analysis";
pub(crate) const DISCLAIMER: &str = "The Worldview Analysis is not a scientific survey. It is designed as an experiment to provide directional insights.";

/// Rendered artifact plus the metadata needed to serve it.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub content_type: Mime,
    pub file_name: &'static str,
    pub bytes: Vec<u8>,
}

pub trait ChartRenderer: Send + Sync {
    fn render(&self, chart: &ChartPayload) -> Rendered;
}

pub trait DocumentRenderer: Send + Sync {
    fn render(
        &self,
        report: &ReportPayload,
        chart: Option<&ChartPayload>,
        generated_on: NaiveDate,
    ) -> Rendered;
}

pub(crate) fn score_lines(report: &ReportPayload) -> [String; 3] {
    let triple = report.normalized_triple;
    [
        format!("PreModern: {:.1}%", triple.pre_modern),
        format!("Modern: {:.1}%", triple.modern),
        format!("PostModern: {:.1}%", triple.post_modern),
    ]
}
