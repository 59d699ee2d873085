use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;

use super::{agency_performance, ageing_buckets, recovery_trend, sla_breaches, PortfolioSnapshot};
use crate::config::MAX_TREND_MONTHS;
use crate::workflows::cases::router::error_response;
use crate::workflows::cases::{AgencyDirectory, CaseRepository, CaseService};

struct AnalyticsState<R, D> {
    service: Arc<CaseService<R, D>>,
    trend_months: u32,
}

/// Router builder exposing the dashboard analytics endpoints.
pub fn portfolio_router<R, D>(service: Arc<CaseService<R, D>>, trend_months: u32) -> Router
where
    R: CaseRepository + 'static,
    D: AgencyDirectory + 'static,
{
    let state = Arc::new(AnalyticsState {
        service,
        trend_months,
    });

    Router::new()
        .route("/api/analytics/ageing-buckets", get(ageing_handler::<R, D>))
        .route("/api/analytics/recovery-rate", get(trend_handler::<R, D>))
        .route(
            "/api/analytics/dca-performance",
            get(agency_handler::<R, D>),
        )
        .route("/api/analytics/sla-breaches", get(breach_handler::<R, D>))
        .route("/api/analytics/summary", get(summary_handler::<R, D>))
        .with_state(state)
}

/// Optional overrides for the trend window.
#[derive(Debug, Default, Deserialize)]
struct TrendQuery {
    #[serde(default)]
    as_of: Option<String>,
    #[serde(default)]
    months: Option<u32>,
}

impl TrendQuery {
    fn resolve(&self, default_months: u32) -> Result<(NaiveDate, u32), String> {
        let as_of = match self.as_of.as_deref().map(str::trim) {
            None | Some("") => Utc::now().date_naive(),
            Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|_| format!("as_of must be YYYY-MM-DD, got '{raw}'"))?,
        };
        let months = self.months.unwrap_or(default_months);
        if !(1..=MAX_TREND_MONTHS).contains(&months) {
            return Err(format!("months must be between 1 and {MAX_TREND_MONTHS}"));
        }
        Ok((as_of, months))
    }
}

fn unprocessable(message: String) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "error": message })),
    )
        .into_response()
}

fn with_snapshot<R, D, T, F>(state: &AnalyticsState<R, D>, view: F) -> Response
where
    R: CaseRepository + 'static,
    D: AgencyDirectory + 'static,
    T: serde::Serialize,
    F: FnOnce(&PortfolioSnapshot) -> T,
{
    match state.service.snapshot() {
        Ok(snapshot) => (StatusCode::OK, Json(view(&snapshot))).into_response(),
        Err(err) => error_response(err),
    }
}

async fn ageing_handler<R, D>(State(state): State<Arc<AnalyticsState<R, D>>>) -> Response
where
    R: CaseRepository + 'static,
    D: AgencyDirectory + 'static,
{
    with_snapshot(&state, |snapshot| ageing_buckets(&snapshot.cases))
}

async fn trend_handler<R, D>(
    State(state): State<Arc<AnalyticsState<R, D>>>,
    Query(query): Query<TrendQuery>,
) -> Response
where
    R: CaseRepository + 'static,
    D: AgencyDirectory + 'static,
{
    match query.resolve(state.trend_months) {
        Ok((as_of, months)) => with_snapshot(&state, |snapshot| {
            recovery_trend(&snapshot.cases, as_of, months)
        }),
        Err(message) => unprocessable(message),
    }
}

async fn agency_handler<R, D>(State(state): State<Arc<AnalyticsState<R, D>>>) -> Response
where
    R: CaseRepository + 'static,
    D: AgencyDirectory + 'static,
{
    with_snapshot(&state, |snapshot| agency_performance(&snapshot.agencies))
}

async fn breach_handler<R, D>(State(state): State<Arc<AnalyticsState<R, D>>>) -> Response
where
    R: CaseRepository + 'static,
    D: AgencyDirectory + 'static,
{
    with_snapshot(&state, |snapshot| sla_breaches(&snapshot.cases))
}

async fn summary_handler<R, D>(
    State(state): State<Arc<AnalyticsState<R, D>>>,
    Query(query): Query<TrendQuery>,
) -> Response
where
    R: CaseRepository + 'static,
    D: AgencyDirectory + 'static,
{
    match query.resolve(state.trend_months) {
        Ok((as_of, months)) => with_snapshot(&state, |snapshot| snapshot.summary(as_of, months)),
        Err(message) => unprocessable(message),
    }
}
