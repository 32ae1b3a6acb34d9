use chrono::NaiveDate;

use super::super::report::{ChartPayload, ReportPayload};
use super::chart::annotation;
use super::{score_lines, DocumentRenderer, Rendered, DISCLAIMER, REPORT_TITLE};

/// Plain-text rendition of the report, used by the CLI.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextReportRenderer;

impl TextReportRenderer {
    pub fn to_text(
        &self,
        report: &ReportPayload,
        chart: Option<&ChartPayload>,
        generated_on: NaiveDate,
    ) -> String {
        let mut out = String::new();
        out.push_str(&format!("{REPORT_TITLE}\n"));
        out.push_str(&format!("{}\n", "=".repeat(REPORT_TITLE.len())));
        out.push_str(&format!(
            "Survey results generated on {}\n",
            generated_on.format("%B %d, %Y")
        ));
        out.push('\n');
        out.push_str(&format!(
            "Your modernity worldview perspective is: {}\n",
            report.perspective_description
        ));
        out.push('\n');
        out.push_str("Your Perspective Scores:\n");
        for line in score_lines(report) {
            out.push_str(&format!("  {line}\n"));
        }
        if let Some(chart) = chart {
            out.push_str(&format!(
                "  ({} answered questions plotted; aggregate {})\n",
                chart.individual_points.len(),
                annotation(&chart.aggregate_point)
            ));
        }

        out.push_str("\nWorldview Category Analysis\n");
        out.push_str("---------------------------\n");
        for (category, narrative) in &report.category_narratives {
            out.push_str(&format!("\n{category}\n  {narrative}\n"));
        }

        out.push_str(&format!("\n{DISCLAIMER}\n"));
        out
    }
}

impl DocumentRenderer for TextReportRenderer {
    fn render(
        &self,
        report: &ReportPayload,
        chart: Option<&ChartPayload>,
        generated_on: NaiveDate,
    ) -> Rendered {
        Rendered {
            content_type: mime::TEXT_PLAIN_UTF_8,
            file_name: "worldview_analysis.txt",
            bytes: self.to_text(report, chart, generated_on).into_bytes(),
        }
    }
}
