use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::survey::router::submit_handler;
use crate::survey::{SurveyService, SurveySubmission};

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

fn reference_body() -> Value {
    let answers: serde_json::Map<String, Value> = REFERENCE_ANSWERS
        .iter()
        .map(|(question, response)| (question.to_string(), json!(response)))
        .collect();
    json!({ "answers": answers })
}

#[tokio::test]
async fn questions_route_is_seeded() {
    let (service, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(
            Request::get("/api/v1/survey/questions?seed=11")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["seed"], json!(11));
    assert_eq!(payload["questions"].as_array().map(Vec::len), Some(6));
    assert!(payload["questions"][0]["options"][0].get("scores").is_none());
}

#[tokio::test]
async fn preview_route_accepts_partial_answers() {
    let (service, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(post_json(
            "/api/v1/survey/preview",
            json!({ "answers": { "Q1": "Q1R3" } }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["status"], json!("scored"));
    assert_eq!(payload["normalized"], json!([0, 0, 100]));
    assert_eq!(payload["description"], json!("Pure PostModern"));
}

#[tokio::test]
async fn report_route_prompts_for_answers_when_empty() {
    let (service, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(post_json("/api/v1/survey/report", json!({ "answers": {} })))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["error"], json!("please answer all questions"));
}

#[tokio::test]
async fn report_route_rejects_unknown_responses() {
    let (service, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(post_json(
            "/api/v1/survey/report",
            json!({ "answers": { "Q1": "Q2R1" } }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .unwrap_or_default()
        .contains("Q2R1"));
}

#[tokio::test]
async fn submission_route_returns_created_receipt() {
    let (service, sink) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(post_json("/api/v1/survey/submissions", reference_body()))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["record_id"], json!(1));
    assert_eq!(payload["report"]["description"], json!("Mixed Perspective"));
    assert_eq!(sink.records().len(), 1);
}

#[tokio::test]
async fn submission_route_lists_missing_questions() {
    let (service, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(post_json(
            "/api/v1/survey/submissions",
            json!({ "answers": { "Q1": "Q1R1" } }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["missing"], json!(["Q2", "Q3", "Q4", "Q5", "Q6"]));
}

#[tokio::test]
async fn submit_handler_returns_internal_error_on_sink_failure() {
    let service = Arc::new(SurveyService::new(
        catalog(),
        narratives(),
        Arc::new(UnavailableSink),
    ));

    let response = submit_handler::<UnavailableSink>(
        State(service),
        axum::Json(SurveySubmission::new(answers(&REFERENCE_ANSWERS))),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn document_route_serves_pdf_attachment() {
    let (service, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(post_json("/api/v1/survey/report/document", reference_body()))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE),
        Some(&header::HeaderValue::from_static("application/pdf"))
    );
    assert_eq!(
        response.headers().get(header::CONTENT_DISPOSITION),
        Some(&header::HeaderValue::from_static(
            "attachment; filename=worldview_analysis.pdf"
        ))
    );
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    assert!(bytes.starts_with(b"%PDF-1.4"));
}

#[tokio::test]
async fn chart_route_serves_svg() {
    let (service, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(post_json("/api/v1/survey/report/chart", reference_body()))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE),
        Some(&header::HeaderValue::from_static("image/svg+xml"))
    );
}
