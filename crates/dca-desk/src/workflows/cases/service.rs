use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::domain::{
    Agency, Case, CaseFilter, CaseId, CasePatch, CaseStatus, NewCase, Page, SlaRecord,
};
use super::repository::{AgencyDirectory, CaseRepository, RepositoryError};
use super::sla::sla_record;
use crate::workflows::portfolio::PortfolioSnapshot;
use crate::workflows::triage::{CaseFeatures, FeatureError, TriageEngine};

/// First sequence number handed out for generated case ids.
pub const DEFAULT_CASE_SEQUENCE_START: u64 = 1000;

/// Largest sequence that still renders as four digits; later ids wrap back to
/// the default start and rely on conflict retries to skip taken ids.
pub const MAX_CASE_SEQUENCE: u64 = 9999;

const MAX_ID_ATTEMPTS: usize = 64;

/// Case lifecycle operations over the store, scored by the triage engine.
pub struct CaseService<R, D> {
    repository: Arc<R>,
    agencies: Arc<D>,
    engine: Arc<TriageEngine>,
    sequence: AtomicU64,
}

impl<R, D> CaseService<R, D>
where
    R: CaseRepository + 'static,
    D: AgencyDirectory + 'static,
{
    pub fn new(repository: Arc<R>, agencies: Arc<D>, engine: Arc<TriageEngine>) -> Self {
        Self::with_sequence_start(repository, agencies, engine, DEFAULT_CASE_SEQUENCE_START)
    }

    pub fn with_sequence_start(
        repository: Arc<R>,
        agencies: Arc<D>,
        engine: Arc<TriageEngine>,
        start: u64,
    ) -> Self {
        Self {
            repository,
            agencies,
            engine,
            sequence: AtomicU64::new(start),
        }
    }

    pub fn engine(&self) -> &TriageEngine {
        &self.engine
    }

    /// Opens a new case with a generated id and freshly computed triage fields.
    pub fn create(&self, request: NewCase, now: DateTime<Utc>) -> Result<Case, CaseServiceError> {
        let customer_name = non_blank(&request.customer_name)
            .ok_or(ValidationError::BlankCustomerName)?
            .to_string();
        let features = CaseFeatures::try_from_raw(
            request.amount,
            request.overdue_days,
            request.customer_segment.as_deref(),
            request.previous_defaults,
        )
        .map_err(ValidationError::from)?;

        let assessment = self.engine.assess(&features);

        for _ in 0..MAX_ID_ATTEMPTS {
            let id = CaseId::from_sequence(self.next_sequence());
            let case = Case {
                id,
                customer_name: customer_name.clone(),
                amount: features.amount,
                overdue_days: features.overdue_days,
                status: CaseStatus::Open,
                priority: assessment.priority.priority,
                assigned_agency: None,
                recovery_probability: Some(assessment.recovery.recovery_probability),
                customer_segment: features.segment,
                previous_defaults: features.previous_defaults,
                created_at: now,
                updated_at: now,
                resolved_at: None,
            };

            match self.repository.insert(case) {
                Ok(stored) => {
                    info!(case_id = %stored.id, priority = %stored.priority, "case opened");
                    return Ok(stored);
                }
                Err(RepositoryError::Conflict) => continue,
                Err(err) => return Err(err.into()),
            }
        }

        Err(RepositoryError::Conflict.into())
    }

    fn next_sequence(&self) -> u64 {
        let raw = self.sequence.fetch_add(1, Ordering::Relaxed);
        if raw <= MAX_CASE_SEQUENCE {
            return raw;
        }
        let span = MAX_CASE_SEQUENCE - DEFAULT_CASE_SEQUENCE_START + 1;
        DEFAULT_CASE_SEQUENCE_START + (raw - DEFAULT_CASE_SEQUENCE_START) % span
    }

    pub fn get(&self, id: &CaseId) -> Result<Case, CaseServiceError> {
        self.repository
            .fetch(id)?
            .ok_or_else(|| CaseServiceError::NotFound(id.clone()))
    }

    pub fn list(&self, filter: CaseFilter, page: Page) -> Result<Vec<Case>, CaseServiceError> {
        Ok(self.repository.list(&filter, page)?)
    }

    /// Applies only the fields present in `patch`.
    pub fn update(
        &self,
        id: &CaseId,
        patch: CasePatch,
        now: DateTime<Utc>,
    ) -> Result<Case, CaseServiceError> {
        let mut case = self.get(id)?;

        if let Some(name) = &patch.customer_name {
            case.customer_name = non_blank(name)
                .ok_or(ValidationError::BlankCustomerName)?
                .to_string();
        }
        if let Some(amount) = patch.amount {
            if !amount.is_finite() || amount <= 0.0 {
                return Err(ValidationError::from(FeatureError::NonPositiveAmount(amount)).into());
            }
            case.amount = amount;
        }
        if let Some(days) = patch.overdue_days {
            case.overdue_days = u32::try_from(days)
                .map_err(|_| ValidationError::from(FeatureError::InvalidOverdueDays(days)))?;
        }
        if let Some(probability) = patch.recovery_probability {
            if !(0.0..=1.0).contains(&probability) {
                return Err(ValidationError::RecoveryOutOfRange(probability).into());
            }
            case.recovery_probability = Some(probability);
        }
        if let Some(priority) = patch.priority {
            case.priority = priority;
        }
        if let Some(agency) = &patch.assigned_agency {
            case.assigned_agency = non_blank(agency).map(str::to_string);
        }
        if let Some(status) = patch.status {
            case.transition(status, now);
        }
        case.updated_at = now;

        self.store(case)
    }

    /// Hands the case to `agency_name` and marks it in progress, whatever its
    /// current status.
    pub fn allocate(
        &self,
        id: &CaseId,
        agency_name: &str,
        now: DateTime<Utc>,
    ) -> Result<Case, CaseServiceError> {
        let mut case = self.get(id)?;
        let agency_name = non_blank(agency_name).ok_or(ValidationError::BlankAgencyName)?;

        case.assigned_agency = Some(agency_name.to_string());
        case.transition(CaseStatus::InProgress, now);
        case.updated_at = now;

        let stored = self.store(case)?;
        info!(case_id = %stored.id, agency = agency_name, "case allocated");
        Ok(stored)
    }

    /// Recomputes priority and recovery probability, folding in the assigned
    /// agency's performance score when the agency is on the roster.
    pub fn rescore(&self, id: &CaseId, now: DateTime<Utc>) -> Result<Case, CaseServiceError> {
        let mut case = self.get(id)?;
        let performance = match &case.assigned_agency {
            Some(name) => self
                .agencies
                .find(name)?
                .map(|agency| agency.performance_score),
            None => None,
        };

        let assessment = self.engine.assess(&case.features(performance));
        case.priority = assessment.priority.priority;
        case.recovery_probability = Some(assessment.recovery.recovery_probability);
        case.updated_at = now;

        debug!(case_id = %case.id, agency_performance = ?performance, "case rescored");
        self.store(case)
    }

    /// Evaluates the case's SLA and stores it, replacing any earlier record.
    pub fn register_sla(&self, id: &CaseId) -> Result<SlaRecord, CaseServiceError> {
        let case = self.get(id)?;
        let record = sla_record(&case);
        self.repository.upsert_sla(record.clone())?;
        Ok(record)
    }

    pub fn sla(&self, id: &CaseId) -> Result<SlaRecord, CaseServiceError> {
        self.get(id)?;
        self.repository
            .fetch_sla(id)?
            .ok_or_else(|| CaseServiceError::SlaNotRecorded(id.clone()))
    }

    pub fn slas(&self) -> Result<Vec<SlaRecord>, CaseServiceError> {
        Ok(self.repository.slas()?)
    }

    pub fn agencies(&self) -> Result<Vec<Agency>, CaseServiceError> {
        Ok(self.agencies.agencies()?)
    }

    /// Consistent copy of every case and agency for one analytics computation.
    pub fn snapshot(&self) -> Result<PortfolioSnapshot, CaseServiceError> {
        Ok(PortfolioSnapshot::new(
            self.repository.all()?,
            self.agencies.agencies()?,
        ))
    }

    fn store(&self, case: Case) -> Result<Case, CaseServiceError> {
        match self.repository.update(case.clone()) {
            Ok(()) => Ok(case),
            Err(RepositoryError::NotFound) => Err(CaseServiceError::NotFound(case.id)),
            Err(err) => Err(err.into()),
        }
    }
}

fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Rejected case input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error(transparent)]
    Feature(#[from] FeatureError),
    #[error("customer_name must not be blank")]
    BlankCustomerName,
    #[error("agency name must not be blank")]
    BlankAgencyName,
    #[error("recovery_probability must be within [0, 1], got {0}")]
    RecoveryOutOfRange(f64),
}

/// Error raised by the case service.
#[derive(Debug, thiserror::Error)]
pub enum CaseServiceError {
    #[error("case {0} not found")]
    NotFound(CaseId),
    #[error("no SLA recorded for case {0}")]
    SlaNotRecorded(CaseId),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
