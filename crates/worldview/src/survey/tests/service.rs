use std::sync::Arc;

use super::common::*;
use crate::survey::{
    AggregateStatus, Answers, NarrativeCatalog, NarrativeSource, NormalizedTriple, ReportCategory,
    ScoringError, StoreError, StrengthTier, SurveyService, SurveyServiceError, SurveySubmission,
    MISSING_NARRATIVE,
};

#[test]
fn reference_answers_produce_a_mixed_report() {
    let (service, _) = build_service();
    let report = service
        .report(&answers(&REFERENCE_ANSWERS))
        .expect("report builds");

    assert_eq!(report.normalized, NormalizedTriple::new(42, 33, 25));
    assert_eq!(report.perspective.strength, StrengthTier::Mixed);
    assert_eq!(report.description, "Mixed Perspective");
    assert_eq!(report.perspective_key, "Modern-Balanced");
    assert_eq!(report.individual_points.len(), 6);
    assert_eq!(report.categories.len(), 6);
    assert!(report
        .categories
        .iter()
        .all(|entry| entry.source == NarrativeSource::Blended));
}

#[test]
fn absent_blend_falls_back_to_primary_narrative() {
    let (service, _) = build_service();
    let report = service
        .report(&answers(&PREMODERN_POSTMODERN_ANSWERS))
        .expect("report builds");

    assert_eq!(report.normalized, NormalizedTriple::new(50, 17, 33));
    assert_eq!(
        report.description,
        "Moderately PreModern with PostModern influences"
    );
    assert_eq!(report.perspective_key, "PreModern-PostModern");
    assert!(report
        .categories
        .iter()
        .all(|entry| entry.source == NarrativeSource::Primary));
}

#[test]
fn empty_narrative_store_uses_answers_then_placeholder() {
    let sink = Arc::new(MemorySink::default());
    let service = SurveyService::new(catalog(), Arc::new(NarrativeCatalog::default()), sink);

    let mut partial = answers(&REFERENCE_ANSWERS);
    partial.remove(&crate::survey::QuestionId::new("Q6"));
    let report = service.report(&partial).expect("partial report builds");

    let source_of_truth = &report.categories[0];
    assert_eq!(source_of_truth.category, ReportCategory::SourceOfTruth);
    assert_eq!(source_of_truth.source, NarrativeSource::Answer);
    assert!(!source_of_truth.narrative.is_empty());

    let identity = &report.categories[5];
    assert_eq!(identity.category, ReportCategory::Identity);
    assert_eq!(identity.source, NarrativeSource::Placeholder);
    assert_eq!(identity.narrative, MISSING_NARRATIVE);
}

#[test]
fn preview_tolerates_partial_and_empty_answers() {
    let (service, _) = build_service();

    let empty = service.preview(&Answers::new()).expect("empty preview");
    assert_eq!(empty.status, AggregateStatus::InsufficientData);
    assert_eq!(empty.normalized, NormalizedTriple::default());
    assert!(empty.perspective.is_none());
    assert_eq!(empty.unanswered.len(), 6);

    let partial = service
        .preview(&answers(&[("Q1", "Q1R2"), ("Q2", "Q2R4")]))
        .expect("partial preview");
    assert_eq!(partial.status, AggregateStatus::Scored);
    assert_eq!(partial.answered, 2);
    assert_eq!(partial.normalized, NormalizedTriple::new(25, 75, 0));
    assert_eq!(partial.description.as_deref(), Some("Strongly Modern"));
    assert_eq!(partial.unanswered.len(), 4);
}

#[test]
fn report_without_answers_is_insufficient_data() {
    let (service, _) = build_service();
    let error = service.report(&Answers::new()).expect_err("nothing to score");
    assert!(matches!(
        error,
        SurveyServiceError::Scoring(ScoringError::InsufficientData)
    ));
}

#[test]
fn unknown_response_is_rejected() {
    let (service, _) = build_service();
    let error = service
        .preview(&answers(&[("Q1", "Q1R9")]))
        .expect_err("unknown response");
    assert!(matches!(error, SurveyServiceError::Catalog(_)));
}

#[test]
fn submit_persists_record_and_generates_session() {
    let (service, sink) = build_service();
    let receipt = service
        .submit(SurveySubmission::new(answers(&REFERENCE_ANSWERS)))
        .expect("submission stored");

    assert!(!receipt.session_id.is_empty());
    assert_eq!(receipt.record_id.0, 1);

    let records = sink.records();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.session_id, receipt.session_id);
    assert_eq!(record.source, "test");
    assert_eq!(record.normalized, NormalizedTriple::new(42, 33, 25));
    assert_eq!(record.version, env!("CARGO_PKG_VERSION"));
    let indices: Vec<Option<u32>> = record.choices.iter().map(|choice| choice.choice_index).collect();
    assert_eq!(
        indices,
        vec![Some(1), Some(1), Some(4), Some(2), Some(3), Some(5)]
    );
    let plot = receipt.report.plot_coordinate.expect("scored report has a coordinate");
    assert!((record.plot_x - plot.x).abs() < f64::EPSILON);
    assert!((record.plot_y - 0.42).abs() < 1e-9);
}

#[test]
fn submit_keeps_caller_session_id() {
    let (service, sink) = build_service();
    let submission = SurveySubmission {
        answers: answers(&REFERENCE_ANSWERS),
        session_id: Some("session-abc".to_string()),
        browser: Some("Firefox".to_string()),
    };
    let receipt = service.submit(submission).expect("submission stored");
    assert_eq!(receipt.session_id, "session-abc");
    assert_eq!(sink.records()[0].browser.as_deref(), Some("Firefox"));
}

#[test]
fn submit_rejects_incomplete_answers() {
    let (service, sink) = build_service();
    let error = service
        .submit(SurveySubmission::new(answers(&REFERENCE_ANSWERS[..4])))
        .expect_err("incomplete submission");

    match error {
        SurveyServiceError::IncompleteSubmission { missing } => {
            let ids: Vec<&str> = missing.iter().map(|id| id.as_str()).collect();
            assert_eq!(ids, vec!["Q5", "Q6"]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(sink.records().is_empty());
}

#[test]
fn submit_surfaces_sink_failures() {
    let service = SurveyService::new(catalog(), narratives(), Arc::new(UnavailableSink));
    let error = service
        .submit(SurveySubmission::new(answers(&REFERENCE_ANSWERS)))
        .expect_err("sink is offline");
    assert!(matches!(
        error,
        SurveyServiceError::Store(StoreError::Unavailable(_))
    ));
}

#[test]
fn questions_follow_catalog_order_with_seeded_options() {
    let (service, _) = build_service();
    let first = service.questions(7);
    let again = service.questions(7);

    let ids: Vec<&str> = first.iter().map(|question| question.id.as_str()).collect();
    assert_eq!(ids, vec!["Q1", "Q2", "Q3", "Q4", "Q5", "Q6"]);

    let order = |views: &[crate::survey::QuestionView]| -> Vec<String> {
        views[0].options.iter().map(|option| option.id.to_string()).collect()
    };
    assert_eq!(order(&first), order(&again));
    assert_eq!(first[0].options.len(), 5);
}

#[test]
fn document_and_chart_render_for_complete_answers() {
    let (service, _) = build_service();
    let reference = answers(&REFERENCE_ANSWERS);

    let chart = service.chart(&reference).expect("chart renders");
    assert_eq!(chart.content_type, mime::IMAGE_SVG);

    let date = chrono::NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date");
    let document = service.document(&reference, date).expect("document renders");
    assert_eq!(document.file_name, "worldview_analysis.pdf");
    assert!(document.bytes.starts_with(b"%PDF-1.4"));
}
