use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::workflows::triage::{CaseFeatures, CustomerSegment, PriorityLabel};

/// External case reference, `CASE-####`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaseId(pub String);

impl CaseId {
    pub fn from_sequence(sequence: u64) -> Self {
        Self(format!("CASE-{sequence:04}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl CaseStatus {
    pub const fn ordered() -> [Self; 4] {
        [Self::Open, Self::InProgress, Self::Resolved, Self::Closed]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "open" => Some(Self::Open),
            "in_progress" | "in progress" => Some(Self::InProgress),
            "resolved" => Some(Self::Resolved),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }

    /// Resolved and closed cases no longer need agency effort.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved | Self::Closed)
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A recovery case as held by the store. Priority and recovery probability are
/// the last values computed by the triage engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    pub id: CaseId,
    pub customer_name: String,
    pub amount: f64,
    pub overdue_days: u32,
    pub status: CaseStatus,
    pub priority: PriorityLabel,
    #[serde(rename = "dca_assigned")]
    pub assigned_agency: Option<String>,
    pub recovery_probability: Option<f64>,
    #[serde(default)]
    pub customer_segment: CustomerSegment,
    #[serde(default)]
    pub previous_defaults: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Case {
    /// Features for the triage engine, with the agency score when scoring at portfolio level.
    pub fn features(&self, agency_performance: Option<f64>) -> CaseFeatures {
        CaseFeatures::new(self.amount, self.overdue_days)
            .with_segment(self.customer_segment)
            .with_previous_defaults(self.previous_defaults)
            .with_agency_performance(agency_performance)
    }

    /// Moves to `status`, keeping `resolved_at` in step with terminal states.
    pub fn transition(&mut self, status: CaseStatus, now: DateTime<Utc>) {
        if status.is_terminal() {
            if self.resolved_at.is_none() {
                self.resolved_at = Some(now);
            }
        } else {
            self.resolved_at = None;
        }
        self.status = status;
    }

    /// Whole days between creation and resolution, if resolved.
    pub fn resolution_days(&self) -> Option<i64> {
        self.resolved_at
            .map(|resolved| (resolved - self.created_at).num_days().max(0))
    }
}

/// Debt collection agency (DCA) profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agency {
    pub name: String,
    pub performance_score: f64,
    pub active_cases: u32,
    pub recovery_rate: f64,
    pub avg_resolution_days: u32,
}

/// Service-level deadline attached to exactly one case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlaRecord {
    pub case_id: CaseId,
    #[serde(rename = "sla_deadline")]
    pub deadline: DateTime<Utc>,
    pub is_breached: bool,
}

/// Create payload. Numeric fields arrive signed so negative input can be reported
/// as a validation failure rather than a decode error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCase {
    pub customer_name: String,
    pub amount: f64,
    pub overdue_days: i64,
    #[serde(default)]
    pub customer_segment: Option<String>,
    #[serde(default)]
    pub previous_defaults: Option<i64>,
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CasePatch {
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub overdue_days: Option<i64>,
    #[serde(default)]
    pub status: Option<CaseStatus>,
    #[serde(default)]
    pub priority: Option<PriorityLabel>,
    #[serde(default, rename = "dca_assigned")]
    pub assigned_agency: Option<String>,
    #[serde(default)]
    pub recovery_probability: Option<f64>,
}

impl CasePatch {
    pub fn is_empty(&self) -> bool {
        self.customer_name.is_none()
            && self.amount.is_none()
            && self.overdue_days.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.assigned_agency.is_none()
            && self.recovery_probability.is_none()
    }
}

/// Listing filter mirroring the store's query parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CaseFilter {
    pub priority: Option<PriorityLabel>,
    pub status: Option<CaseStatus>,
}

impl CaseFilter {
    pub fn matches(&self, case: &Case) -> bool {
        self.priority.map_or(true, |priority| case.priority == priority)
            && self.status.map_or(true, |status| case.status == status)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub skip: usize,
    pub limit: usize,
}

impl Page {
    pub const DEFAULT_LIMIT: usize = 100;
}

impl Default for Page {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}
