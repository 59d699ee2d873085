use chrono::{DateTime, Duration, Utc};

use super::domain::{Case, SlaRecord};
use crate::workflows::triage::thresholds::{
    SLA_BREACH_OVERDUE_DAYS, SLA_CRITICAL_OVERDUE_DAYS, SLA_GRACE_DAYS,
};

/// Deadline and breach flag for a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlaEvaluation {
    pub deadline: DateTime<Utc>,
    pub is_breached: bool,
}

pub fn evaluate_sla(created_at: DateTime<Utc>, overdue_days: u32) -> SlaEvaluation {
    SlaEvaluation {
        deadline: created_at + Duration::days(SLA_GRACE_DAYS),
        is_breached: is_breached(overdue_days),
    }
}

pub fn is_breached(overdue_days: u32) -> bool {
    overdue_days > SLA_BREACH_OVERDUE_DAYS
}

/// Severity used in breach reporting only; never stored on the record.
pub fn is_critical(overdue_days: u32) -> bool {
    overdue_days > SLA_CRITICAL_OVERDUE_DAYS
}

pub fn sla_record(case: &Case) -> SlaRecord {
    let evaluation = evaluate_sla(case.created_at, case.overdue_days);
    SlaRecord {
        case_id: case.id.clone(),
        deadline: evaluation.deadline,
        is_breached: evaluation.is_breached,
    }
}
