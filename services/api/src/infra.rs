use chrono::NaiveDate;
use dca_desk::config::AppConfig;
use dca_desk::error::AppError;
use dca_desk::workflows::cases::{CaseService, MemoryCaseStore, DEFAULT_CASE_SEQUENCE_START};
use dca_desk::workflows::portfolio::{DemoPortfolio, DEFAULT_DEMO_CASES, DEFAULT_DEMO_SEED};
use dca_desk::workflows::triage::TriageEngine;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

pub(crate) type DeskService = CaseService<MemoryCaseStore, MemoryCaseStore>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Builds the in-memory store, seeding the demo portfolio when configured.
pub(crate) fn build_case_service(
    config: &AppConfig,
    engine: Arc<TriageEngine>,
) -> Result<DeskService, AppError> {
    let store = if config.portfolio.seed_demo_portfolio {
        DemoPortfolio::generate(DEFAULT_DEMO_CASES, DEFAULT_DEMO_SEED, chrono::Utc::now())
            .into_store()?
    } else {
        MemoryCaseStore::default()
    };

    Ok(service_over(store, engine))
}

/// Wraps `store` in a service whose id sequence starts past any loaded cases.
pub(crate) fn service_over(store: MemoryCaseStore, engine: Arc<TriageEngine>) -> DeskService {
    let sequence_start = DEFAULT_CASE_SEQUENCE_START + store.len() as u64;
    CaseService::with_sequence_start(
        Arc::new(store.clone()),
        Arc::new(store),
        engine,
        sequence_start,
    )
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
