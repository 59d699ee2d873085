use crate::infra::{AppState, DeskService};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use dca_desk::workflows::cases::case_router;
use dca_desk::workflows::portfolio::portfolio_router;
use dca_desk::workflows::triage::{prediction_router, TriageEngine};
use serde_json::json;
use std::sync::Arc;

/// Every workflow router plus the operational endpoints.
pub(crate) fn with_desk_routes(
    service: Arc<DeskService>,
    engine: Arc<TriageEngine>,
    trend_months: u32,
) -> Router {
    case_router(service.clone())
        .merge(prediction_router(engine))
        .merge(portfolio_router(service, trend_months))
        .route("/", get(service_info))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn service_info() -> Json<serde_json::Value> {
    Json(json!({
        "name": "DCA Desk",
        "description": "Case triage and portfolio analytics for debt collection agencies",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
