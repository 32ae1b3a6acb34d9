use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use clap::{Args, ValueEnum};
use serde_json::json;
use worldview::config::{AppConfig, SurveyConfig};
use worldview::error::AppError;
use worldview::survey::{
    export_csv, Answers, ChartRenderer, DocumentRenderer, PdfReportRenderer, QuestionId, Report,
    ResponseId, SqliteSubmissionStore, StoreError, SubmissionSink, SurveyService,
    SvgTernaryChart, TextReportRenderer,
};

use crate::infra::{build_survey_service, parse_answer, InMemorySubmissionSink};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Answer as QUESTION=RESPONSE, e.g. Q1=Q1R2. Repeat per question.
    #[arg(long = "answer", value_parser = parse_answer, required = true)]
    pub(crate) answers: Vec<(QuestionId, ResponseId)>,
    /// Output format for the report
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub(crate) format: OutputFormat,
    /// Also write the PDF report to this path
    #[arg(long)]
    pub(crate) pdf: Option<PathBuf>,
    /// Also write the SVG chart to this path
    #[arg(long)]
    pub(crate) svg: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct QuestionsArgs {
    /// Shuffle options with this seed; catalog order when omitted
    #[arg(long)]
    pub(crate) seed: Option<u64>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ExportArgs {
    /// SQLite database to read (defaults to SURVEY_DB_PATH)
    #[arg(long)]
    pub(crate) db: Option<PathBuf>,
    /// Maximum number of submissions, newest first
    #[arg(long, default_value_t = 100)]
    pub(crate) limit: usize,
}

fn survey_service() -> Result<SurveyService<InMemorySubmissionSink>, AppError> {
    let config = AppConfig::load()?;
    build_survey_service(&config.survey, Arc::new(InMemorySubmissionSink::default()))
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let service = survey_service()?;
    let answers: Answers = args.answers.into_iter().collect();
    let today = Local::now().date_naive();

    let (report, missing) = score_report(&service, &answers)?;

    match args.format {
        OutputFormat::Text => print!("{}", render_text(&report, &missing, today)),
        OutputFormat::Json => println!("{}", render_json(&report, &missing)),
    }

    if let Some(path) = args.svg {
        let rendered = SvgTernaryChart.render(&report.chart_payload());
        std::fs::write(&path, rendered.bytes)?;
        println!("Chart written to {}", path.display());
    }
    if let Some(path) = args.pdf {
        let chart = report.chart_payload();
        let rendered = PdfReportRenderer.render(&report.document_payload(), Some(&chart), today);
        std::fs::write(&path, rendered.bytes)?;
        println!("Report written to {}", path.display());
    }

    Ok(())
}

/// Scores `answers` and lists the questions still unanswered. Unscorable
/// answer sets are errors so the process exits non-zero.
fn score_report<S: SubmissionSink + 'static>(
    service: &SurveyService<S>,
    answers: &Answers,
) -> Result<(Report, Vec<QuestionId>), AppError> {
    let report = service.report(answers)?;
    Ok((report, service.catalog().unanswered(answers)))
}

fn render_text(report: &Report, missing: &[QuestionId], today: NaiveDate) -> String {
    let mut out = TextReportRenderer.to_text(
        &report.document_payload(),
        Some(&report.chart_payload()),
        today,
    );
    if let Some(point) = report.plot_coordinate {
        out.push_str(&format!("\nPlot coordinate: ({:.4}, {:.4})\n", point.x, point.y));
    }
    if !missing.is_empty() {
        let ids: Vec<&str> = missing.iter().map(QuestionId::as_str).collect();
        out.push_str(&format!("Draft only, unanswered: {}\n", ids.join(", ")));
    }
    out
}

fn render_json(report: &Report, missing: &[QuestionId]) -> String {
    let payload = json!({
        "report": report,
        "unanswered": missing,
    });
    serde_json::to_string_pretty(&payload).unwrap_or_else(|_| payload.to_string())
}

pub(crate) fn run_questions(args: QuestionsArgs) -> Result<(), AppError> {
    let service = survey_service()?;
    let catalog = service.catalog();

    for question in catalog.questions() {
        println!("{}. {}", question.id, question.text);
        let options: Vec<_> = match args.seed {
            Some(seed) => catalog
                .presentation_order(&question.id, seed)
                .unwrap_or_default(),
            None => question.responses.iter().collect(),
        };
        for option in options {
            println!("   [{}] {}", option.id, option.text);
        }
        println!();
    }
    Ok(())
}

pub(crate) fn run_export(args: ExportArgs) -> Result<(), AppError> {
    let path = match args.db {
        Some(path) => path,
        None => database_path(&AppConfig::load()?.survey)?,
    };
    let store = SqliteSubmissionStore::open(&path)?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let written = export_csv(&store, &mut handle, args.limit)?;
    handle.flush()?;
    eprintln!("exported {written} submission(s) from {}", path.display());
    Ok(())
}

fn database_path(config: &SurveyConfig) -> Result<PathBuf, AppError> {
    config.db_path.clone().ok_or_else(|| {
        AppError::Store(StoreError::Unavailable(
            "no database configured: pass --db or set SURVEY_DB_PATH".to_string(),
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use worldview::survey::{NarrativeCatalog, ResponseCatalog, ScoringError, SurveyServiceError};

    fn service() -> SurveyService<InMemorySubmissionSink> {
        SurveyService::new(
            Arc::new(ResponseCatalog::builtin().expect("builtin catalog")),
            Arc::new(NarrativeCatalog::builtin().expect("builtin narratives")),
            Arc::new(InMemorySubmissionSink::default()),
        )
    }

    fn answers(pairs: &[&str]) -> Answers {
        pairs
            .iter()
            .map(|raw| parse_answer(raw).expect("valid answer"))
            .collect()
    }

    #[test]
    fn text_output_flags_draft_reports() {
        let service = service();
        let answers = answers(&["Q1=Q1R2", "Q2=Q2R2"]);
        let report = service.report(&answers).expect("report builds");
        let missing = service.catalog().unanswered(&answers);
        let date = NaiveDate::from_ymd_opt(2025, 4, 5).expect("valid date");

        let text = render_text(&report, &missing, date);
        assert!(text.contains("Pure Modern"));
        assert!(text.contains("Plot coordinate: (0.0000, 0.0000)"));
        assert!(text.contains("unanswered: Q3, Q4, Q5, Q6"));
    }

    #[test]
    fn json_output_carries_report_and_unanswered() {
        let service = service();
        let answers = answers(&["Q1=Q1R1", "Q2=Q2R1", "Q3=Q3R1", "Q4=Q4R1", "Q5=Q5R1", "Q6=Q6R1"]);
        let report = service.report(&answers).expect("report builds");

        let value: serde_json::Value =
            serde_json::from_str(&render_json(&report, &[])).expect("valid json");
        assert_eq!(value["report"]["description"], json!("Pure PreModern"));
        assert_eq!(value["unanswered"], json!([]));
    }

    #[test]
    fn zero_weight_answers_fail_scoring() {
        let raw = r#"{"questions": {
            "Q1": {"text": "one", "responses": [{"id": "Q1R1", "text": "a", "scores": [0, 0, 0]}]},
            "Q2": {"text": "two", "responses": [{"id": "Q2R1", "text": "b", "scores": [0, 0, 0]}]}
        }}"#;
        let service = SurveyService::new(
            Arc::new(ResponseCatalog::from_json_str(raw).expect("catalog parses")),
            Arc::new(NarrativeCatalog::builtin().expect("builtin narratives")),
            Arc::new(InMemorySubmissionSink::default()),
        );

        let err = score_report(&service, &answers(&["Q1=Q1R1", "Q2=Q2R1"]))
            .expect_err("nothing to score");
        assert!(matches!(
            err,
            AppError::Survey(SurveyServiceError::Scoring(ScoringError::InsufficientData))
        ));
    }

    #[test]
    fn unknown_answers_fail_scoring() {
        let err = score_report(&service(), &answers(&["Q1=Q1R9"])).expect_err("unknown option");
        assert!(matches!(err, AppError::Catalog(_)));
    }

    #[test]
    fn partial_answers_score_and_list_missing() {
        let (report, missing) =
            score_report(&service(), &answers(&["Q1=Q1R2"])).expect("report builds");
        assert_eq!(report.description, "Pure Modern");
        assert_eq!(missing.len(), 5);
    }

    #[test]
    fn export_requires_a_database() {
        let err = database_path(&SurveyConfig::default()).expect_err("no database");
        assert!(err.to_string().contains("SURVEY_DB_PATH"));
    }
}
