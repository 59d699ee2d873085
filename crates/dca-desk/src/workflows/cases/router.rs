use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::domain::{CaseFilter, CaseId, CasePatch, CaseStatus, NewCase, Page};
use super::repository::{AgencyDirectory, CaseRepository, RepositoryError};
use super::service::{CaseService, CaseServiceError};
use crate::workflows::triage::PriorityLabel;

/// Router builder exposing case CRUD, allocation, SLA, and agency endpoints.
pub fn case_router<R, D>(service: Arc<CaseService<R, D>>) -> Router
where
    R: CaseRepository + 'static,
    D: AgencyDirectory + 'static,
{
    Router::new()
        .route(
            "/api/cases",
            get(list_handler::<R, D>).post(create_handler::<R, D>),
        )
        .route(
            "/api/cases/:case_id",
            get(get_handler::<R, D>).put(update_handler::<R, D>),
        )
        .route("/api/cases/:case_id/allocate", post(allocate_handler::<R, D>))
        .route("/api/cases/:case_id/rescore", post(rescore_handler::<R, D>))
        .route(
            "/api/cases/:case_id/sla",
            get(sla_handler::<R, D>).post(register_sla_handler::<R, D>),
        )
        .route("/api/agencies", get(agencies_handler::<R, D>))
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListQuery {
    #[serde(default)]
    skip: Option<usize>,
    #[serde(default)]
    limit: Option<usize>,
    #[serde(default)]
    priority: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

impl ListQuery {
    fn into_parts(self) -> Result<(CaseFilter, Page), String> {
        let priority = match self.priority.as_deref() {
            None | Some("") => None,
            Some(raw) => Some(
                PriorityLabel::parse(raw).ok_or_else(|| format!("unknown priority '{raw}'"))?,
            ),
        };
        let status = match self.status.as_deref() {
            None | Some("") => None,
            Some(raw) => {
                Some(CaseStatus::parse(raw).ok_or_else(|| format!("unknown status '{raw}'"))?)
            }
        };
        let defaults = Page::default();
        let page = Page {
            skip: self.skip.unwrap_or(defaults.skip),
            limit: self.limit.unwrap_or(defaults.limit),
        };
        Ok((CaseFilter { priority, status }, page))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct AllocateQuery {
    dca_name: String,
}

pub(crate) fn error_response(err: CaseServiceError) -> Response {
    let status = match &err {
        CaseServiceError::NotFound(_) | CaseServiceError::SlaNotRecorded(_) => {
            StatusCode::NOT_FOUND
        }
        CaseServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        CaseServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        CaseServiceError::Repository(_) => {
            error!(error = %err, "case store failure");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({ "error": err.to_string() });
    (status, Json(payload)).into_response()
}

fn respond<T: serde::Serialize>(status: StatusCode, result: Result<T, CaseServiceError>) -> Response {
    match result {
        Ok(body) => (status, Json(body)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn list_handler<R, D>(
    State(service): State<Arc<CaseService<R, D>>>,
    Query(query): Query<ListQuery>,
) -> Response
where
    R: CaseRepository + 'static,
    D: AgencyDirectory + 'static,
{
    match query.into_parts() {
        Ok((filter, page)) => respond(StatusCode::OK, service.list(filter, page)),
        Err(message) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": message })),
        )
            .into_response(),
    }
}

pub(crate) async fn get_handler<R, D>(
    State(service): State<Arc<CaseService<R, D>>>,
    Path(case_id): Path<String>,
) -> Response
where
    R: CaseRepository + 'static,
    D: AgencyDirectory + 'static,
{
    respond(StatusCode::OK, service.get(&CaseId(case_id)))
}

pub(crate) async fn create_handler<R, D>(
    State(service): State<Arc<CaseService<R, D>>>,
    Json(request): Json<NewCase>,
) -> Response
where
    R: CaseRepository + 'static,
    D: AgencyDirectory + 'static,
{
    respond(StatusCode::CREATED, service.create(request, Utc::now()))
}

pub(crate) async fn update_handler<R, D>(
    State(service): State<Arc<CaseService<R, D>>>,
    Path(case_id): Path<String>,
    Json(patch): Json<CasePatch>,
) -> Response
where
    R: CaseRepository + 'static,
    D: AgencyDirectory + 'static,
{
    respond(
        StatusCode::OK,
        service.update(&CaseId(case_id), patch, Utc::now()),
    )
}

pub(crate) async fn allocate_handler<R, D>(
    State(service): State<Arc<CaseService<R, D>>>,
    Path(case_id): Path<String>,
    Query(query): Query<AllocateQuery>,
) -> Response
where
    R: CaseRepository + 'static,
    D: AgencyDirectory + 'static,
{
    let id = CaseId(case_id);
    match service.allocate(&id, &query.dca_name, Utc::now()) {
        Ok(case) => {
            let agency = case.assigned_agency.clone().unwrap_or_default();
            let payload = json!({
                "message": format!("Case {} allocated to {}", case.id, agency),
                "case": case,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn rescore_handler<R, D>(
    State(service): State<Arc<CaseService<R, D>>>,
    Path(case_id): Path<String>,
) -> Response
where
    R: CaseRepository + 'static,
    D: AgencyDirectory + 'static,
{
    respond(StatusCode::OK, service.rescore(&CaseId(case_id), Utc::now()))
}

pub(crate) async fn sla_handler<R, D>(
    State(service): State<Arc<CaseService<R, D>>>,
    Path(case_id): Path<String>,
) -> Response
where
    R: CaseRepository + 'static,
    D: AgencyDirectory + 'static,
{
    respond(StatusCode::OK, service.sla(&CaseId(case_id)))
}

pub(crate) async fn register_sla_handler<R, D>(
    State(service): State<Arc<CaseService<R, D>>>,
    Path(case_id): Path<String>,
) -> Response
where
    R: CaseRepository + 'static,
    D: AgencyDirectory + 'static,
{
    respond(StatusCode::OK, service.register_sla(&CaseId(case_id)))
}

pub(crate) async fn agencies_handler<R, D>(
    State(service): State<Arc<CaseService<R, D>>>,
) -> Response
where
    R: CaseRepository + 'static,
    D: AgencyDirectory + 'static,
{
    respond(StatusCode::OK, service.agencies())
}
