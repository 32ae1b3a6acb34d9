use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use tracing::info;
use worldview::config::AppConfig;
use worldview::error::AppError;
use worldview::telemetry;

use crate::cli::ServeArgs;
use crate::infra::{build_survey_service, AppState, ConfiguredSink};
use crate::routes::with_survey_routes;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let sink = Arc::new(ConfiguredSink::from_config(&config.survey)?);
    let sink_kind = sink.label();
    let survey_service = Arc::new(build_survey_service(&config.survey, sink)?);
    info!(
        questions = survey_service.catalog().len(),
        sink = sink_kind,
        "survey catalog loaded"
    );

    let app = with_survey_routes(survey_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "worldview survey service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
