use std::sync::Arc;

use axum::response::Response;
use axum::Router;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::cases::domain::{
    Agency, Case, CaseFilter, CaseId, NewCase, Page, SlaRecord,
};
use crate::workflows::cases::repository::{
    AgencyDirectory, CaseRepository, MemoryCaseStore, RepositoryError,
};
use crate::workflows::cases::{case_router, CaseService};
use crate::workflows::triage::TriageEngine;

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 4, 15, 9, 30, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn agencies() -> Vec<Agency> {
    vec![
        Agency {
            name: "DCA Alpha".to_string(),
            performance_score: 0.85,
            active_cases: 89,
            recovery_rate: 78.0,
            avg_resolution_days: 38,
        },
        Agency {
            name: "DCA Gamma".to_string(),
            performance_score: 0.70,
            active_cases: 82,
            recovery_rate: 65.0,
            avg_resolution_days: 56,
        },
    ]
}

pub(super) fn new_case() -> NewCase {
    NewCase {
        customer_name: "Northwind Traders".to_string(),
        amount: 60_000.0,
        overdue_days: 30,
        customer_segment: None,
        previous_defaults: None,
    }
}

pub(super) fn small_case() -> NewCase {
    NewCase {
        customer_name: "Contoso Ltd".to_string(),
        amount: 10_000.0,
        overdue_days: 95,
        customer_segment: Some("standard".to_string()),
        previous_defaults: Some(0),
    }
}

pub(super) fn build_service() -> (CaseService<MemoryCaseStore, MemoryCaseStore>, MemoryCaseStore) {
    let store = MemoryCaseStore::with_agencies(agencies());
    let service = CaseService::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(TriageEngine::rule_based()),
    );
    (service, store)
}

pub(super) fn case_router_with_service(
    service: CaseService<MemoryCaseStore, MemoryCaseStore>,
) -> Router {
    case_router(Arc::new(service))
}

pub(super) struct ConflictRepository;

impl CaseRepository for ConflictRepository {
    fn insert(&self, _case: Case) -> Result<Case, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn update(&self, _case: Case) -> Result<(), RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn fetch(&self, _id: &CaseId) -> Result<Option<Case>, RepositoryError> {
        Ok(None)
    }

    fn list(&self, _filter: &CaseFilter, _page: Page) -> Result<Vec<Case>, RepositoryError> {
        Ok(Vec::new())
    }

    fn all(&self) -> Result<Vec<Case>, RepositoryError> {
        Ok(Vec::new())
    }

    fn upsert_sla(&self, _record: SlaRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn fetch_sla(&self, _id: &CaseId) -> Result<Option<SlaRecord>, RepositoryError> {
        Ok(None)
    }

    fn slas(&self) -> Result<Vec<SlaRecord>, RepositoryError> {
        Ok(Vec::new())
    }
}

pub(super) struct UnavailableRepository;

impl CaseRepository for UnavailableRepository {
    fn insert(&self, _case: Case) -> Result<Case, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn update(&self, _case: Case) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn fetch(&self, _id: &CaseId) -> Result<Option<Case>, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn list(&self, _filter: &CaseFilter, _page: Page) -> Result<Vec<Case>, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn all(&self) -> Result<Vec<Case>, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn upsert_sla(&self, _record: SlaRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn fetch_sla(&self, _id: &CaseId) -> Result<Option<SlaRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn slas(&self) -> Result<Vec<SlaRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }
}

#[derive(Default)]
pub(super) struct EmptyDirectory;

impl AgencyDirectory for EmptyDirectory {
    fn agencies(&self) -> Result<Vec<Agency>, RepositoryError> {
        Ok(Vec::new())
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
