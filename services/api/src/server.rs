use crate::cli::ServeArgs;
use crate::infra::{build_case_service, AppState};
use crate::routes::with_desk_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use dca_desk::config::AppConfig;
use dca_desk::error::AppError;
use dca_desk::telemetry;
use dca_desk::workflows::triage::TriageEngine;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

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
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let engine = Arc::new(TriageEngine::from_config(&config.triage));
    let case_service = Arc::new(build_case_service(&config, engine.clone())?);

    let app = with_desk_routes(case_service, engine.clone(), config.portfolio.trend_months)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        scoring = ?engine.source(),
        "dca desk ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
